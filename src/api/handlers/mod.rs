//! API handlers.
//!
//! `otp` holds the JSON endpoints and their shared state, `pages` serves the
//! static login markup and `health` reports build metadata.

pub mod health;
pub mod otp;
pub mod pages;
