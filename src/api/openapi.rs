use super::handlers::{health, otp};
use utoipa::openapi::{Contact, InfoBuilder, License, OpenApiBuilder, Tag};
use utoipa_axum::{router::OpenApiRouter, routes};

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    let (_router, openapi) = api_router().split_for_parts();
    openapi
}

/// Router for the documented JSON endpoints.
///
/// Endpoints registered here via `.routes(routes!(...))` are served and
/// included in the `OpenAPI` document. The HTML pages are added in `api::app`.
pub(crate) fn api_router() -> OpenApiRouter {
    let mut router = OpenApiRouter::with_openapi(cargo_openapi())
        .routes(routes!(health::health))
        .routes(routes!(otp::request_otp))
        .routes(routes!(otp::verify_otp));

    let mut health_tag = Tag::new("health");
    health_tag.description = Some("Service status and build metadata".to_string());

    let mut otp_tag = Tag::new("otp");
    otp_tag.description = Some("One-time password issue and verification".to_string());

    router.get_openapi_mut().tags = Some(vec![health_tag, otp_tag]);

    router
}

fn cargo_openapi() -> utoipa::openapi::OpenApi {
    let mut info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(non_empty(env!("CARGO_PKG_DESCRIPTION")))
        .build();

    info.contact = author_contact(env!("CARGO_PKG_AUTHORS"));
    info.license = non_empty(env!("CARGO_PKG_LICENSE")).map(|id| {
        let mut license = License::new(id);
        license.identifier = Some(id.to_string());
        license
    });

    OpenApiBuilder::new().info(info).build()
}

// Cargo authors are `:` separated, each maybe "Name <email>".
fn author_contact(authors: &str) -> Option<Contact> {
    let primary = authors.split(':').next().map(str::trim)?;
    let (name, email) = match primary.split_once('<') {
        Some((name, email)) => (name.trim(), email.trim_end_matches('>').trim()),
        None => (primary, ""),
    };

    if name.is_empty() && email.is_empty() {
        return None;
    }

    let mut contact = Contact::new();
    contact.name = non_empty(name).map(str::to_string);
    contact.email = non_empty(email).map(str::to_string);
    Some(contact)
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
