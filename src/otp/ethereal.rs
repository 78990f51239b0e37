//! Ethereal test accounts.
//!
//! Ethereal is a fake SMTP service: it hands out throwaway accounts and
//! captures every message for preview on its website instead of delivering
//! it. A fresh account is created for each message, so no credentials need to
//! be configured.
use super::{Delivery, OtpMessage, OtpTransport, mailer::send_via, smtp_transport};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

pub const DEFAULT_ETHEREAL_API_URL: &str = "https://api.nodemailer.com/user";

#[derive(Deserialize, Debug)]
struct AccountResponse {
    status: String,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    pass: Option<String>,
    #[serde(default)]
    smtp: Option<ServerInfo>,
    #[serde(default)]
    web: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ServerInfo {
    host: String,
    port: u16,
    secure: bool,
}

/// Credentials and endpoints of a freshly created test account.
#[derive(Clone)]
pub struct TestAccount {
    pub user: String,
    pub pass: SecretString,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_secure: bool,
    pub web: String,
}

impl std::fmt::Debug for TestAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestAccount")
            .field("user", &self.user)
            .field("pass", &"***")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_secure", &self.smtp_secure)
            .field("web", &self.web)
            .finish()
    }
}

impl TryFrom<AccountResponse> for TestAccount {
    type Error = anyhow::Error;

    fn try_from(response: AccountResponse) -> Result<Self> {
        if response.status != "success" {
            return Err(anyhow!(
                "test account request failed: {}",
                response.error.unwrap_or(response.status)
            ));
        }

        let smtp = response
            .smtp
            .ok_or_else(|| anyhow!("test account response is missing SMTP settings"))?;

        Ok(Self {
            user: response
                .user
                .ok_or_else(|| anyhow!("test account response is missing user"))?,
            pass: SecretString::from(
                response
                    .pass
                    .ok_or_else(|| anyhow!("test account response is missing pass"))?,
            ),
            smtp_host: smtp.host,
            smtp_port: smtp.port,
            smtp_secure: smtp.secure,
            web: response
                .web
                .unwrap_or_else(|| "https://ethereal.email".to_string()),
        })
    }
}

/// Ask the Ethereal API for a new test account.
///
/// # Errors
/// Returns an error if the request fails or the response is not a usable account.
#[instrument(skip(client))]
pub async fn create_test_account(client: &Client, api_url: &str) -> Result<TestAccount> {
    let body = json!({
        "requestor": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    });

    let response = client
        .post(api_url)
        .json(&body)
        .send()
        .await
        .context("failed to reach the test account API")?
        .error_for_status()
        .context("test account API returned an error status")?
        .json::<AccountResponse>()
        .await
        .context("failed to decode the test account response")?;

    let account = TestAccount::try_from(response)?;
    debug!(user = %account.user, host = %account.smtp_host, "created test mail account");

    Ok(account)
}

/// Build the web preview link from an Ethereal SMTP reply.
///
/// Ethereal acknowledges accepted messages with `... [STATUS=new MSGID=<id>]`.
#[must_use]
pub fn preview_url(web: &str, reply: &str) -> Option<String> {
    let (_, rest) = reply.split_once("MSGID=")?;
    let msgid: String = rest
        .chars()
        .take_while(|c| !c.is_whitespace() && *c != ']')
        .collect();

    if msgid.is_empty() {
        return None;
    }

    Some(format!("{}/message/{msgid}", web.trim_end_matches('/')))
}

/// Creates a test account per message and sends through it.
#[derive(Clone, Debug)]
pub struct EtherealTransport {
    client: Client,
    api_url: String,
}

impl EtherealTransport {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_url: String) -> Result<Self> {
        let client = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self { client, api_url })
    }
}

#[async_trait]
impl OtpTransport for EtherealTransport {
    async fn deliver(&self, message: &OtpMessage) -> Result<Delivery> {
        let account = create_test_account(&self.client, &self.api_url).await?;

        let credentials = Credentials::new(
            account.user.clone(),
            account.pass.expose_secret().to_string(),
        );
        let mailer = smtp_transport(
            &account.smtp_host,
            account.smtp_port,
            Some(credentials),
            account.smtp_secure,
        )?;

        let (message_id, reply) = send_via(&mailer, message).await?;

        Ok(Delivery {
            message_id: Some(message_id),
            preview_url: preview_url(&account.web, &reply),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::otp::Otp;
    use httpmock::prelude::*;

    #[test]
    fn preview_url_from_reply() {
        let reply = "Accepted [STATUS=new MSGID=Yx1.abc-DEF.ghi]";
        assert_eq!(
            preview_url("https://ethereal.email", reply),
            Some("https://ethereal.email/message/Yx1.abc-DEF.ghi".to_string())
        );
    }

    #[test]
    fn preview_url_trims_trailing_slash_and_stops_at_space() {
        let reply = "Accepted MSGID=abc123 queued";
        assert_eq!(
            preview_url("https://ethereal.email/", reply),
            Some("https://ethereal.email/message/abc123".to_string())
        );
    }

    #[test]
    fn preview_url_none_without_msgid() {
        assert_eq!(preview_url("https://ethereal.email", "2.0.0 Ok: queued"), None);
        assert_eq!(preview_url("https://ethereal.email", "Accepted [MSGID=]"), None);
    }

    #[test]
    fn account_from_success_response() -> Result<()> {
        let response: AccountResponse = serde_json::from_value(json!({
            "status": "success",
            "user": "kaya.doe@ethereal.email",
            "pass": "s3cr3t",
            "smtp": { "host": "smtp.ethereal.email", "port": 587, "secure": false },
            "imap": { "host": "imap.ethereal.email", "port": 993, "secure": true },
            "web": "https://ethereal.email"
        }))?;

        let account = TestAccount::try_from(response)?;
        assert_eq!(account.user, "kaya.doe@ethereal.email");
        assert_eq!(account.pass.expose_secret(), "s3cr3t");
        assert_eq!(account.smtp_host, "smtp.ethereal.email");
        assert_eq!(account.smtp_port, 587);
        assert!(!account.smtp_secure);
        assert!(!format!("{account:?}").contains("s3cr3t"));
        Ok(())
    }

    #[test]
    fn account_from_error_response() -> Result<()> {
        let response: AccountResponse = serde_json::from_value(json!({
            "status": "error",
            "error": "rate limited"
        }))?;

        let result = TestAccount::try_from(response);
        assert!(result.is_err());
        if let Err(err) = result {
            assert!(err.to_string().contains("rate limited"));
        }
        Ok(())
    }

    #[test]
    fn account_missing_smtp_is_error() -> Result<()> {
        let response: AccountResponse = serde_json::from_value(json!({
            "status": "success",
            "user": "u",
            "pass": "p"
        }))?;

        assert!(TestAccount::try_from(response).is_err());
        Ok(())
    }

    #[tokio::test]
    async fn create_test_account_fails_when_api_unreachable() {
        let client = Client::new();
        let result = create_test_account(&client, "http://127.0.0.1:9/user").await;
        assert!(result.is_err());
    }

    fn account_request() -> serde_json::Value {
        json!({
            "requestor": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        })
    }

    #[tokio::test]
    async fn create_test_account_posts_requestor_and_decodes_account() -> Result<()> {
        let server = MockServer::start_async().await;
        let api = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/user")
                    .header("content-type", "application/json")
                    .json_body(account_request());
                then.status(200).json_body(json!({
                    "status": "success",
                    "user": "kaya.doe@ethereal.email",
                    "pass": "s3cr3t",
                    "smtp": { "host": "smtp.ethereal.email", "port": 587, "secure": false },
                    "web": "https://ethereal.email"
                }));
            })
            .await;

        let account = create_test_account(&Client::new(), &server.url("/user")).await?;

        api.assert_async().await;
        assert_eq!(account.user, "kaya.doe@ethereal.email");
        assert_eq!(account.pass.expose_secret(), "s3cr3t");
        assert_eq!(account.smtp_host, "smtp.ethereal.email");
        assert_eq!(account.smtp_port, 587);
        assert!(!account.smtp_secure);
        assert_eq!(account.web, "https://ethereal.email");
        Ok(())
    }

    #[tokio::test]
    async fn create_test_account_rejects_error_status_body() {
        let server = MockServer::start_async().await;
        let api = server
            .mock_async(|when, then| {
                when.method(POST).path("/user");
                then.status(200)
                    .json_body(json!({ "status": "error", "error": "too many accounts" }));
            })
            .await;

        let result = create_test_account(&Client::new(), &server.url("/user")).await;

        api.assert_async().await;
        assert!(result.is_err());
        if let Err(err) = result {
            assert!(err.to_string().contains("too many accounts"));
        }
    }

    #[tokio::test]
    async fn create_test_account_rejects_http_error() {
        let server = MockServer::start_async().await;
        let api = server
            .mock_async(|when, then| {
                when.method(POST).path("/user");
                then.status(503);
            })
            .await;

        let result = create_test_account(&Client::new(), &server.url("/user")).await;

        api.assert_async().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn ethereal_transport_fails_when_account_is_refused() -> Result<()> {
        let server = MockServer::start_async().await;
        let api = server
            .mock_async(|when, then| {
                when.method(POST).path("/user").json_body(account_request());
                then.status(200).json_body(json!({ "status": "error" }));
            })
            .await;

        let transport = EtherealTransport::new(server.url("/user"))?;
        let message = OtpMessage::compose(
            &Otp::from("123456"),
            "noreply@hostel.local",
            "admin@hostel.local",
        );

        assert!(transport.deliver(&message).await.is_err());
        api.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn ethereal_transport_fails_when_smtp_is_unreachable() -> Result<()> {
        let server = MockServer::start_async().await;
        let api = server
            .mock_async(|when, then| {
                when.method(POST).path("/user");
                then.status(200).json_body(json!({
                    "status": "success",
                    "user": "kaya.doe@ethereal.email",
                    "pass": "s3cr3t",
                    "smtp": { "host": "127.0.0.1", "port": 9, "secure": false },
                    "web": "https://ethereal.email"
                }));
            })
            .await;

        let transport = EtherealTransport::new(server.url("/user"))?;
        let message = OtpMessage::compose(
            &Otp::from("123456"),
            "noreply@hostel.local",
            "admin@hostel.local",
        );

        assert!(transport.deliver(&message).await.is_err());
        api.assert_async().await;
        Ok(())
    }
}
