use crate::cli::{
    actions::{Action, server::Args},
    commands::{ARG_PORT, mail, otp},
};
use anyhow::Result;

/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    Ok(Action::Server(Args {
        port: matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080),
        mail: mail::Options::parse(matches)?,
        otp: otp::Options::parse(matches)?,
    }))
}
