use crate::{
    otp::{OtpMailer, OtpStore, valid_otp},
    portal::Portal,
};
use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use utoipa::ToSchema;

/// Shared state of the OTP endpoints.
#[derive(Debug)]
pub struct OtpState {
    mailer: OtpMailer,
    store: OtpStore,
}

impl OtpState {
    #[must_use]
    pub fn new(mailer: OtpMailer, store: OtpStore) -> Self {
        Self { mailer, store }
    }

    #[must_use]
    pub fn store(&self) -> &OtpStore {
        &self.store
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct OtpRequest {
    portal: Portal,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct OtpSent {
    pub sent: bool,
}

#[derive(ToSchema, Serialize, Deserialize)]
pub struct OtpVerifyRequest {
    portal: Portal,
    otp: String,
}

// Keep submitted codes out of logs.
impl std::fmt::Debug for OtpVerifyRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OtpVerifyRequest")
            .field("portal", &self.portal)
            .field("otp", &"***")
            .finish()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct OtpVerified {
    pub valid: bool,
}

#[utoipa::path(
    post,
    path= "/v1/otp",
    request_body = OtpRequest,
    responses (
        (status = 202, description = "OTP issued and emailed to the admin", body = OtpSent),
        (status = 400, description = "Missing or invalid payload", body = OtpSent),
        (status = 502, description = "OTP email could not be sent", body = OtpSent),
    ),
    tag= "otp"
)]
#[instrument(skip(state, payload))]
pub async fn request_otp(
    state: Extension<Arc<OtpState>>,
    payload: Result<Json<OtpRequest>, JsonRejection>,
) -> impl IntoResponse {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!("rejected OTP request: {rejection}");
            return (StatusCode::BAD_REQUEST, Json(OtpSent { sent: false }));
        }
    };

    let otp = state.store.issue(request.portal);

    if state.mailer.send_otp(&otp).await {
        (StatusCode::ACCEPTED, Json(OtpSent { sent: true }))
    } else {
        // Nobody received it, so it must not be usable.
        state.store.revoke(request.portal, otp.as_str());
        (StatusCode::BAD_GATEWAY, Json(OtpSent { sent: false }))
    }
}

#[utoipa::path(
    post,
    path= "/v1/otp/verify",
    request_body = OtpVerifyRequest,
    responses (
        (status = 200, description = "OTP accepted", body = OtpVerified),
        (status = 400, description = "Missing payload or malformed OTP", body = OtpVerified),
        (status = 401, description = "OTP unknown, expired or already used", body = OtpVerified),
    ),
    tag= "otp"
)]
#[instrument(skip(state, payload))]
pub async fn verify_otp(
    state: Extension<Arc<OtpState>>,
    payload: Result<Json<OtpVerifyRequest>, JsonRejection>,
) -> impl IntoResponse {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!("rejected OTP verification: {rejection}");
            return (StatusCode::BAD_REQUEST, Json(OtpVerified { valid: false }));
        }
    };

    let otp = request.otp.trim();
    if !valid_otp(otp) {
        return (StatusCode::BAD_REQUEST, Json(OtpVerified { valid: false }));
    }

    if state.store.verify(request.portal, otp) {
        debug!(portal = %request.portal, "OTP verified");
        (StatusCode::OK, Json(OtpVerified { valid: true }))
    } else {
        warn!(portal = %request.portal, "OTP verification failed");
        (StatusCode::UNAUTHORIZED, Json(OtpVerified { valid: false }))
    }
}
