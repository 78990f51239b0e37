use super::Otp;
use crate::portal::Portal;
use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};
use tracing::debug;

/// Longest lifetime an issued code may have.
pub const MAX_OTP_TTL: Duration = Duration::from_secs(86_400);

/// In-memory record of issued codes.
///
/// Codes are scoped to a portal, expire after `ttl` and are single use: any
/// verify attempt that finds a code removes it.
#[derive(Debug)]
pub struct OtpStore {
    ttl: Duration,
    issued: Mutex<HashMap<(Portal, String), Instant>>,
}

impl OtpStore {
    /// `ttl` is capped at `MAX_OTP_TTL`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl: ttl.min(MAX_OTP_TTL),
            issued: Mutex::new(HashMap::new()),
        }
    }

    /// Generate and record a new code for `portal`.
    pub fn issue(&self, portal: Portal) -> Otp {
        self.issue_at(portal, Instant::now())
    }

    /// Check `code` for `portal`, consuming it.
    pub fn verify(&self, portal: Portal, code: &str) -> bool {
        self.verify_at(portal, code, Instant::now())
    }

    /// Drop a code without checking it, e.g. when its email was never sent.
    pub fn revoke(&self, portal: Portal, code: &str) {
        self.lock().remove(&(portal, code.to_string()));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn issue_at(&self, portal: Portal, now: Instant) -> Otp {
        self.issue_with(portal, now, Otp::generate)
    }

    // Outstanding codes of a portal are distinct, so revoking one never
    // drops another.
    fn issue_with(
        &self,
        portal: Portal,
        now: Instant,
        mut generate: impl FnMut() -> Otp,
    ) -> Otp {
        let expires_at = now.checked_add(self.ttl).unwrap_or(now);
        let mut issued = self.lock();
        issued.retain(|_, expires_at| *expires_at > now);

        let mut otp = generate();
        while issued.contains_key(&(portal, otp.as_str().to_string())) {
            otp = generate();
        }

        issued.insert((portal, otp.as_str().to_string()), expires_at);
        debug!(%portal, outstanding = issued.len(), "issued OTP");
        otp
    }

    fn verify_at(&self, portal: Portal, code: &str, now: Instant) -> bool {
        match self.lock().remove(&(portal, code.to_string())) {
            Some(expires_at) => expires_at > now,
            None => false,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<(Portal, String), Instant>> {
        self.issued.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for OtpStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(300))
    }
}
