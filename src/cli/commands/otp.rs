use crate::otp::MAX_OTP_TTL;
use anyhow::{Result, bail};
use clap::{Arg, ArgMatches, Command};
use std::time::Duration;

pub const ARG_OTP_TTL_SECONDS: &str = "otp-ttl-seconds";

#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub ttl: Duration,
}

impl Options {
    /// # Errors
    /// Returns an error if the TTL is zero or longer than `MAX_OTP_TTL`.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let seconds = matches
            .get_one::<u64>(ARG_OTP_TTL_SECONDS)
            .copied()
            .unwrap_or(300);
        if seconds == 0 || seconds > MAX_OTP_TTL.as_secs() {
            bail!(
                "--{ARG_OTP_TTL_SECONDS} must be between 1 and {}",
                MAX_OTP_TTL.as_secs()
            );
        }

        Ok(Self {
            ttl: Duration::from_secs(seconds),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_OTP_TTL_SECONDS)
            .long(ARG_OTP_TTL_SECONDS)
            .help("How long an issued OTP stays valid, in seconds")
            .env("HOSTEL_OTP_TTL_SECONDS")
            .default_value("300")
            .value_parser(clap::value_parser!(u64).range(1..=MAX_OTP_TTL.as_secs())),
    )
}
