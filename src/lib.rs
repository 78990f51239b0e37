//! # Hostel (Portal Login Service)
//!
//! `hostel` serves the login pages of the hostel management portal and
//! emails a one-time password (OTP) to the admin address for login
//! verification.
//!
//! ## Portals
//!
//! There are two login portals, **hostellers** and **wardens**. Each page is a
//! static layout that embeds the shared login form.
//!
//! ## OTP Delivery
//!
//! OTP mail is best effort: `OtpMailer::send_otp` never fails, it reports a
//! boolean and logs either the preview URL or the error. Delivery goes through
//! an `OtpTransport`:
//!
//! - **Ethereal** (default): creates a throwaway test account per message and
//!   logs the web preview link.
//! - **SMTP**: a fixed relay with optional credentials.
//! - **Log**: logs the message instead of sending it.
//!
//! Issued codes live in memory only, expire after a configurable TTL and are
//! single use.

pub mod api;
pub mod cli;
pub mod otp;
pub mod pages;
pub mod portal;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with("hostel/"));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
