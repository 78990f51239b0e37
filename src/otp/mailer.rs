use super::{Otp, OtpMessage};
use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
    transport::smtp::{authentication::Credentials, response::Response},
};
use secrecy::{ExposeSecret, SecretString};
use std::{sync::Arc, time::Duration};
use tracing::{debug, error, info, instrument};
use ulid::Ulid;

const SMTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of a successful delivery.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Delivery {
    pub message_id: Option<String>,
    pub preview_url: Option<String>,
}

/// Mail delivery abstraction used by `OtpMailer`.
#[async_trait]
pub trait OtpTransport: Send + Sync {
    /// Deliver a message or return an error describing why it was not sent.
    async fn deliver(&self, message: &OtpMessage) -> Result<Delivery>;
}

/// Local dev transport that logs the message instead of sending real email.
#[derive(Clone, Debug)]
pub struct LogTransport;

#[async_trait]
impl OtpTransport for LogTransport {
    async fn deliver(&self, message: &OtpMessage) -> Result<Delivery> {
        info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            body = %message.html,
            "OTP email send stub"
        );
        Ok(Delivery::default())
    }
}

/// Fixed SMTP relay settings.
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub implicit_tls: bool,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("implicit_tls", &self.implicit_tls)
            .finish()
    }
}

/// Build an async SMTP transport.
///
/// `implicit_tls` selects SMTPS, otherwise the connection is upgraded with STARTTLS.
///
/// # Errors
/// Returns an error if the relay host cannot be used to build a TLS transport.
pub fn smtp_transport(
    host: &str,
    port: u16,
    credentials: Option<Credentials>,
    implicit_tls: bool,
) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
    let builder = if implicit_tls {
        AsyncSmtpTransport::<Tokio1Executor>::relay(host)
    } else {
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
    }
    .with_context(|| format!("invalid SMTP relay host: {host}"))?;

    let mut builder = builder.port(port).timeout(Some(SMTP_TIMEOUT));
    if let Some(credentials) = credentials {
        builder = builder.credentials(credentials);
    }

    Ok(builder.build())
}

/// Send a message over `mailer` and return the server reply text.
pub(super) async fn send_via(
    mailer: &AsyncSmtpTransport<Tokio1Executor>,
    message: &OtpMessage,
) -> Result<(String, String)> {
    let message_id = format!("<{}@{}>", Ulid::new(), message.sender_domain());
    let email = message.to_email(&message_id)?;

    let response: Response = mailer
        .send(email)
        .await
        .context("SMTP server rejected the OTP email")?;

    let reply = reply_text(&response);
    debug!(code = %response.code(), reply = %reply, "SMTP reply");

    Ok((message_id, reply))
}

/// All lines of an SMTP reply joined by spaces.
fn reply_text(response: &Response) -> String {
    response.message().collect::<Vec<_>>().join(" ")
}

/// Sends through a fixed relay.
#[derive(Clone)]
pub struct SmtpRelay {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpRelay {
    /// # Errors
    /// Returns an error if the transport cannot be built from `config`.
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let credentials = match (&config.username, &config.password) {
            (Some(username), Some(password)) => Some(Credentials::new(
                username.clone(),
                password.expose_secret().to_string(),
            )),
            _ => None,
        };

        Ok(Self {
            mailer: smtp_transport(&config.host, config.port, credentials, config.implicit_tls)?,
        })
    }
}

#[async_trait]
impl OtpTransport for SmtpRelay {
    async fn deliver(&self, message: &OtpMessage) -> Result<Delivery> {
        let (message_id, _reply) = send_via(&self.mailer, message).await?;
        Ok(Delivery {
            message_id: Some(message_id),
            preview_url: None,
        })
    }
}

/// Composes OTP emails for the admin address and reports delivery as a flag.
#[derive(Clone)]
pub struct OtpMailer {
    transport: Arc<dyn OtpTransport>,
    from: String,
    to: String,
}

impl OtpMailer {
    #[must_use]
    pub fn new(transport: Arc<dyn OtpTransport>, from: String, to: String) -> Self {
        Self {
            transport,
            from,
            to,
        }
    }

    /// Email `otp` to the admin address.
    ///
    /// Returns `true` when the transport accepted the message. Any failure is
    /// logged and turned into `false`; nothing is retried.
    #[instrument(skip(self, otp), fields(to = %self.to))]
    pub async fn send_otp(&self, otp: &Otp) -> bool {
        let message = OtpMessage::compose(otp, &self.from, &self.to);

        match self.transport.deliver(&message).await {
            Ok(delivery) => {
                let message_id = delivery.message_id.as_deref().unwrap_or("none");
                match delivery.preview_url {
                    Some(url) => info!(message_id, "OTP email sent, preview URL: {url}"),
                    None => info!(message_id, "OTP email sent"),
                }
                true
            }
            Err(err) => {
                error!("Error sending OTP email: {err:#}");
                false
            }
        }
    }
}

impl std::fmt::Debug for OtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OtpMailer")
            .field("from", &self.from)
            .field("to", &self.to)
            .finish_non_exhaustive()
    }
}
