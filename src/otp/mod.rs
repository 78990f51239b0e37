//! One-time passwords and their delivery by email.
//!
//! An `Otp` is an opaque short code. `OtpMailer::send_otp` wraps it in an
//! HTML message for the admin address and hands it to an `OtpTransport`.
//! Every failure along the way is logged and reported as `false`.

mod ethereal;
mod mailer;
mod message;
mod store;

pub use self::ethereal::{
    DEFAULT_ETHEREAL_API_URL, EtherealTransport, TestAccount, create_test_account, preview_url,
};
pub use self::mailer::{
    Delivery, LogTransport, OtpMailer, OtpTransport, SmtpConfig, SmtpRelay, smtp_transport,
};
pub use self::message::{OTP_SUBJECT, OtpMessage, render_html};
pub use self::store::{MAX_OTP_TTL, OtpStore};

use rand::Rng;
use regex::Regex;
use std::fmt;

/// Number of digits in a generated code.
pub const OTP_DIGITS: usize = 6;

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Otp(String);

impl Otp {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generate a random, zero padded, 6 digit code.
    #[must_use]
    pub fn generate() -> Self {
        let code = rand::thread_rng().gen_range(0..1_000_000u32);
        Self(format!("{code:0width$}", width = OTP_DIGITS))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u32> for Otp {
    fn from(value: u32) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for Otp {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Otp {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for Otp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Keep codes out of logs.
impl fmt::Debug for Otp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Otp(***)")
    }
}

/// Shape check for codes submitted by clients.
#[must_use]
pub fn valid_otp(value: &str) -> bool {
    Regex::new(r"^[0-9]{4,10}$").is_ok_and(|re| re.is_match(value))
}
