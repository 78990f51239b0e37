use crate::otp::DEFAULT_ETHEREAL_API_URL;
use anyhow::{Context, Result, anyhow, bail};
use clap::{Arg, ArgAction, ArgMatches, Command, builder::PossibleValuesParser};
use secrecy::SecretString;
use std::str::FromStr;
use url::Url;

pub const ARG_ADMIN_EMAIL: &str = "admin-email";
pub const ARG_MAIL_FROM: &str = "mail-from";
pub const ARG_MAIL_TRANSPORT: &str = "mail-transport";
pub const ARG_ETHEREAL_API_URL: &str = "ethereal-api-url";
pub const ARG_SMTP_HOST: &str = "smtp-host";
pub const ARG_SMTP_PORT: &str = "smtp-port";
pub const ARG_SMTP_USERNAME: &str = "smtp-username";
pub const ARG_SMTP_PASSWORD: &str = "smtp-password";
pub const ARG_SMTP_IMPLICIT_TLS: &str = "smtp-implicit-tls";

/// How OTP emails leave the service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportKind {
    Ethereal,
    Smtp,
    Log,
}

impl TransportKind {
    pub const NAMES: [&'static str; 3] = ["ethereal", "smtp", "log"];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ethereal => "ethereal",
            Self::Smtp => "smtp",
            Self::Log => "log",
        }
    }
}

impl FromStr for TransportKind {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "ethereal" => Ok(Self::Ethereal),
            "smtp" => Ok(Self::Smtp),
            "log" => Ok(Self::Log),
            other => Err(anyhow!("unknown mail transport: {other}")),
        }
    }
}

#[derive(Clone)]
pub struct Options {
    pub admin_email: String,
    pub from: String,
    pub transport: TransportKind,
    pub ethereal_api_url: String,
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<SecretString>,
    pub smtp_implicit_tls: bool,
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("admin_email", &self.admin_email)
            .field("from", &self.from)
            .field("transport", &self.transport)
            .field("ethereal_api_url", &self.ethereal_api_url)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &self.smtp_password.as_ref().map(|_| "***"))
            .field("smtp_implicit_tls", &self.smtp_implicit_tls)
            .finish()
    }
}

impl Options {
    /// Parse mail arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the `smtp` transport lacks a host, if only one of
    /// username and password is set, or if the Ethereal API URL is not http(s).
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let read = |id: &str| -> Option<String> {
            matches
                .get_one::<String>(id)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let read_required = |id: &str| -> Result<String> {
            read(id).ok_or_else(|| anyhow!("missing required argument: --{id}"))
        };

        let transport = read_required(ARG_MAIL_TRANSPORT)?.parse::<TransportKind>()?;
        let smtp_host = read(ARG_SMTP_HOST);
        if transport == TransportKind::Smtp && smtp_host.is_none() {
            bail!("missing required argument: --{ARG_SMTP_HOST} (required by the smtp transport)");
        }

        let smtp_username = read(ARG_SMTP_USERNAME);
        let smtp_password = read(ARG_SMTP_PASSWORD).map(SecretString::from);
        if smtp_username.is_some() != smtp_password.is_some() {
            bail!("--{ARG_SMTP_USERNAME} and --{ARG_SMTP_PASSWORD} must be set together");
        }

        let ethereal_api_url = read_required(ARG_ETHEREAL_API_URL)?;
        let parsed = Url::parse(&ethereal_api_url)
            .with_context(|| format!("invalid --{ARG_ETHEREAL_API_URL}: {ethereal_api_url}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("--{ARG_ETHEREAL_API_URL} must be an http(s) URL");
        }

        Ok(Self {
            admin_email: read_required(ARG_ADMIN_EMAIL)?,
            from: read_required(ARG_MAIL_FROM)?,
            transport,
            ethereal_api_url,
            smtp_host,
            smtp_port: matches.get_one::<u16>(ARG_SMTP_PORT).copied().unwrap_or(587),
            smtp_username,
            smtp_password,
            smtp_implicit_tls: matches.get_flag(ARG_SMTP_IMPLICIT_TLS),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    let command = with_message_args(command);
    with_smtp_args(command)
}

fn with_message_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_ADMIN_EMAIL)
                .long(ARG_ADMIN_EMAIL)
                .help("Address that receives every login OTP")
                .env("HOSTEL_ADMIN_EMAIL")
                .default_value("admin@hostel.local"),
        )
        .arg(
            Arg::new(ARG_MAIL_FROM)
                .long(ARG_MAIL_FROM)
                .help("Sender of OTP emails")
                .env("HOSTEL_MAIL_FROM")
                .default_value("\"Hostel Admin\" <noreply@hostel.local>"),
        )
        .arg(
            Arg::new(ARG_MAIL_TRANSPORT)
                .long(ARG_MAIL_TRANSPORT)
                .help("Mail transport: ethereal (test account per message), smtp or log")
                .env("HOSTEL_MAIL_TRANSPORT")
                .default_value("ethereal")
                .value_parser(PossibleValuesParser::new(TransportKind::NAMES)),
        )
        .arg(
            Arg::new(ARG_ETHEREAL_API_URL)
                .long(ARG_ETHEREAL_API_URL)
                .help("Endpoint that creates Ethereal test accounts")
                .env("HOSTEL_ETHEREAL_API_URL")
                .default_value(DEFAULT_ETHEREAL_API_URL),
        )
}

fn with_smtp_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SMTP_HOST)
                .long(ARG_SMTP_HOST)
                .help("SMTP relay host (required by the smtp transport)")
                .env("HOSTEL_SMTP_HOST"),
        )
        .arg(
            Arg::new(ARG_SMTP_PORT)
                .long(ARG_SMTP_PORT)
                .help("SMTP relay port")
                .env("HOSTEL_SMTP_PORT")
                .default_value("587")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_SMTP_USERNAME)
                .long(ARG_SMTP_USERNAME)
                .help("SMTP username")
                .env("HOSTEL_SMTP_USERNAME"),
        )
        .arg(
            Arg::new(ARG_SMTP_PASSWORD)
                .long(ARG_SMTP_PASSWORD)
                .help("SMTP password")
                .env("HOSTEL_SMTP_PASSWORD")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_SMTP_IMPLICIT_TLS)
                .long(ARG_SMTP_IMPLICIT_TLS)
                .help("Use implicit TLS (SMTPS) instead of STARTTLS")
                .env("HOSTEL_SMTP_IMPLICIT_TLS")
                .action(ArgAction::SetTrue),
        )
}
