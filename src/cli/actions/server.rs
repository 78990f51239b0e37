use crate::{
    api::{self, OtpState},
    cli::commands::{mail, mail::TransportKind, otp},
    otp::{EtherealTransport, LogTransport, OtpMailer, OtpStore, OtpTransport, SmtpConfig, SmtpRelay},
};
use anyhow::{Context, Result};
use std::{fmt::Write, sync::Arc};
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub mail: mail::Options,
    pub otp: otp::Options,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the mail transport cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let transport = build_transport(&args.mail)?;
    let mailer = OtpMailer::new(transport, args.mail.from, args.mail.admin_email);
    let state = OtpState::new(mailer, OtpStore::new(args.otp.ttl));

    api::new(args.port, Arc::new(state)).await
}

/// Pick the OTP transport for the configured kind.
///
/// # Errors
/// Returns an error if the selected transport cannot be constructed.
pub fn build_transport(options: &mail::Options) -> Result<Arc<dyn OtpTransport>> {
    let transport: Arc<dyn OtpTransport> = match options.transport {
        TransportKind::Ethereal => Arc::new(EtherealTransport::new(
            options.ethereal_api_url.clone(),
        )?),
        TransportKind::Smtp => {
            let host = options
                .smtp_host
                .clone()
                .context("missing required argument: --smtp-host")?;
            Arc::new(SmtpRelay::new(&SmtpConfig {
                host,
                port: options.smtp_port,
                username: options.smtp_username.clone(),
                password: options.smtp_password.clone(),
                implicit_tls: options.smtp_implicit_tls,
            })?)
        }
        TransportKind::Log => Arc::new(LogTransport),
    };

    Ok(transport)
}

fn log_startup_args(args: &Args) {
    let smtp = match args.mail.transport {
        TransportKind::Smtp => format!(
            "{}:{} ({})",
            args.mail.smtp_host.as_deref().unwrap_or("none"),
            args.mail.smtp_port,
            if args.mail.smtp_implicit_tls {
                "implicit tls"
            } else {
                "starttls"
            }
        ),
        TransportKind::Ethereal | TransportKind::Log => "n/a".to_string(),
    };

    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        ("mail_transport", args.mail.transport.as_str().to_string()),
        ("admin_email", args.mail.admin_email.clone()),
        ("mail_from", args.mail.from.clone()),
        ("ethereal_api_url", args.mail.ethereal_api_url.clone()),
        ("smtp", smtp),
        (
            "smtp_username",
            args.mail
                .smtp_username
                .clone()
                .unwrap_or_else(|| "n/a".to_string()),
        ),
        (
            "smtp_password_set",
            args.mail.smtp_password.is_some().to_string(),
        ),
        ("otp_ttl", format!("{}s", args.otp.ttl.as_secs())),
    ];

    info!("{}", startup_message("Startup configuration", &entries));
}

fn startup_message(title: &str, entries: &[(&str, String)]) -> String {
    let width = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!("{}\n\n{title}:", banner());
    for (key, value) in entries {
        let padding = " ".repeat(width.saturating_sub(key.len()));
        let _ = write!(message, "\n  {key}:{padding} {value}");
    }
    message
}

fn banner() -> String {
    BANNER.replace(
        "{VERSION}",
        &format!(
            "{} - {}",
            env!("CARGO_PKG_VERSION"),
            short_commit(crate::GIT_COMMIT_HASH)
        ),
    )
}

fn short_commit(hash: &str) -> &str {
    let hash = hash.trim();
    hash.get(..7).unwrap_or(hash)
}

const BANNER: &str = r"
  _____________
 /_____________\
 |  _   _   _  |
 | |_| |_| |_| |   H O S T E L
 |  _   _   _  |   {VERSION}
 | |_| |_| |_| |
 |_____[ ]_____|";
