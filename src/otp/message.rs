use super::Otp;
use anyhow::{Context, Result};
use lettre::{
    Message,
    message::{Mailbox, SinglePart},
};

pub const OTP_SUBJECT: &str = "Your login OTP";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OtpMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

impl OtpMessage {
    #[must_use]
    pub fn compose(otp: &Otp, from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            subject: OTP_SUBJECT.to_string(),
            html: render_html(otp),
        }
    }

    /// Build the wire message with the given `Message-ID`.
    ///
    /// # Errors
    /// Returns an error if an address does not parse or the message cannot be built.
    pub fn to_email(&self, message_id: &str) -> Result<Message> {
        let from = self
            .from
            .parse::<Mailbox>()
            .with_context(|| format!("invalid sender address: {}", self.from))?;
        let to = self
            .to
            .parse::<Mailbox>()
            .with_context(|| format!("invalid recipient address: {}", self.to))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(&self.subject)
            .message_id(Some(message_id.to_string()))
            .singlepart(SinglePart::html(self.html.clone()))
            .context("failed to build OTP email")
    }

    /// Domain part of the sender, used to mint message ids.
    #[must_use]
    pub fn sender_domain(&self) -> &str {
        self.from
            .rsplit_once('@')
            .map_or("localhost", |(_, domain)| domain.trim_end_matches('>').trim())
    }
}

/// HTML body for an OTP email. The code is embedded exactly as given.
#[must_use]
pub fn render_html(otp: &Otp) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{OTP_SUBJECT}</title>
</head>
<body style="margin: 0; padding: 24px; font-family: Arial, Helvetica, sans-serif; background-color: #f4f5f7;">
    <div style="max-width: 480px; margin: 0 auto; background-color: #ffffff; border-radius: 8px; padding: 24px;">
        <h2 style="margin: 0 0 16px 0; color: #1f2933;">Hostel login verification</h2>
        <p style="margin: 0 0 16px 0; color: #52606d;">Use the following one-time password to complete the login:</p>
        <p style="margin: 0 0 16px 0; font-size: 32px; font-weight: 700; letter-spacing: 4px; color: #1f2933;">{otp}</p>
        <p style="margin: 0; font-size: 12px; color: #9aa5b1;">If you did not request this code, ignore this email.</p>
    </div>
</body>
</html>"#
    )
}
