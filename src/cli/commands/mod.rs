pub mod logging;
pub mod mail;
pub mod otp;

use clap::{
    Arg, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

pub const ARG_PORT: &str = "port";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("hostel")
        .about("Hostel management portal with OTP login")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long(ARG_PORT)
                .help("Port to listen on")
                .default_value("8080")
                .env("HOSTEL_PORT")
                .value_parser(clap::value_parser!(u16)),
        );

    let command = mail::with_args(command);
    let command = otp::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mail::{
        ARG_ADMIN_EMAIL, ARG_MAIL_TRANSPORT, ARG_SMTP_HOST, ARG_SMTP_PASSWORD, ARG_SMTP_PORT, Options,
        TransportKind,
    };

    const ENV_VARS: [&str; 11] = [
        "HOSTEL_PORT",
        "HOSTEL_ADMIN_EMAIL",
        "HOSTEL_MAIL_FROM",
        "HOSTEL_MAIL_TRANSPORT",
        "HOSTEL_ETHEREAL_API_URL",
        "HOSTEL_SMTP_HOST",
        "HOSTEL_SMTP_PORT",
        "HOSTEL_SMTP_USERNAME",
        "HOSTEL_SMTP_PASSWORD",
        "HOSTEL_OTP_TTL_SECONDS",
        "HOSTEL_LOG_LEVEL",
    ];

    // Run `f` with every HOSTEL_* variable unset, plus `vars`.
    fn with_clean_env<F: FnOnce()>(vars: &[(&str, &str)], f: F) {
        let mut all: Vec<(&str, Option<&str>)> =
            ENV_VARS.iter().map(|name| (*name, None)).collect();
        for (name, value) in vars {
            all.retain(|(existing, _)| existing != name);
            all.push((name, Some(value)));
        }
        temp_env::with_vars(all, f);
    }

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "hostel");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some("Hostel management portal with OTP login".to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_defaults() {
        with_clean_env(&[], || {
            let matches = new().get_matches_from(vec!["hostel"]);
            assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(8080));
            assert_eq!(
                matches.get_one::<String>(ARG_ADMIN_EMAIL).cloned(),
                Some("admin@hostel.local".to_string())
            );
            assert_eq!(
                matches.get_one::<String>(ARG_MAIL_TRANSPORT).cloned(),
                Some("ethereal".to_string())
            );
            assert_eq!(matches.get_one::<u16>(ARG_SMTP_PORT).copied(), Some(587));
            assert_eq!(
                matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                Some(0)
            );
        });
    }

    #[test]
    fn test_check_env() {
        with_clean_env(
            &[
                ("HOSTEL_PORT", "443"),
                ("HOSTEL_ADMIN_EMAIL", "warden-office@hostel.local"),
                ("HOSTEL_MAIL_TRANSPORT", "smtp"),
                ("HOSTEL_SMTP_HOST", "smtp.hostel.local"),
                ("HOSTEL_SMTP_PORT", "2525"),
                ("HOSTEL_OTP_TTL_SECONDS", "120"),
                ("HOSTEL_LOG_LEVEL", "info"),
            ],
            || {
                let matches = new().get_matches_from(vec!["hostel"]);
                assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(443));
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );

                let mail = Options::parse(&matches);
                assert!(mail.is_ok());
                if let Ok(mail) = mail {
                    assert_eq!(mail.admin_email, "warden-office@hostel.local");
                    assert_eq!(mail.transport, TransportKind::Smtp);
                    assert_eq!(mail.smtp_host.as_deref(), Some("smtp.hostel.local"));
                    assert_eq!(mail.smtp_port, 2525);
                }

                let ttl = otp::Options::parse(&matches).map(|o| o.ttl.as_secs());
                assert_eq!(ttl.ok(), Some(120));
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        for (index, level) in logging::LEVEL_NAMES.iter().enumerate() {
            with_clean_env(&[("HOSTEL_LOG_LEVEL", level)], || {
                let matches = new().get_matches_from(vec!["hostel"]);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        for index in 0..logging::LEVEL_NAMES.len() {
            with_clean_env(&[], || {
                let mut args = vec!["hostel".to_string()];
                if index > 0 {
                    args.push(format!("-{}", "v".repeat(index)));
                }

                let matches = new().get_matches_from(args);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        with_clean_env(&[("HOSTEL_LOG_LEVEL", "loud")], || {
            assert!(new().try_get_matches_from(vec!["hostel"]).is_err());
        });
    }

    #[test]
    fn test_unknown_transport_rejected() {
        with_clean_env(&[], || {
            let result = new().try_get_matches_from(vec!["hostel", "--mail-transport", "pigeon"]);
            assert!(result.is_err());
        });
    }

    #[test]
    fn test_smtp_transport_requires_host() {
        with_clean_env(&[], || {
            let matches = new().get_matches_from(vec!["hostel", "--mail-transport", "smtp"]);
            let result = Options::parse(&matches);
            assert!(result.is_err());
            if let Err(err) = result {
                assert!(err.to_string().contains(ARG_SMTP_HOST));
            }
        });
    }

    #[test]
    fn test_smtp_credentials_set_together() {
        with_clean_env(&[], || {
            let matches = new().get_matches_from(vec![
                "hostel",
                "--mail-transport",
                "smtp",
                "--smtp-host",
                "smtp.hostel.local",
                "--smtp-username",
                "mailer",
            ]);
            let result = Options::parse(&matches);
            assert!(result.is_err());
            if let Err(err) = result {
                assert!(err.to_string().contains(ARG_SMTP_PASSWORD));
            }

            let matches = new().get_matches_from(vec![
                "hostel",
                "--smtp-username",
                "mailer",
                "--smtp-password",
                "hunter2",
            ]);
            let options = Options::parse(&matches);
            assert!(options.is_ok());
            if let Ok(options) = options {
                assert_eq!(options.smtp_username.as_deref(), Some("mailer"));
                assert!(!format!("{options:?}").contains("hunter2"));
            }
        });
    }

    #[test]
    fn test_out_of_range_ttl_rejected() {
        for ttl in ["0", "86401", "18446744073709551615"] {
            with_clean_env(&[], || {
                let result = new().try_get_matches_from(vec!["hostel", "--otp-ttl-seconds", ttl]);
                assert!(result.is_err(), "{ttl}");
            });
            with_clean_env(&[("HOSTEL_OTP_TTL_SECONDS", ttl)], || {
                assert!(new().try_get_matches_from(vec!["hostel"]).is_err(), "{ttl}");
            });
        }
    }

    #[test]
    fn test_max_ttl_accepted() {
        with_clean_env(&[], || {
            let matches = new().get_matches_from(vec!["hostel", "--otp-ttl-seconds", "86400"]);
            let ttl = otp::Options::parse(&matches).map(|o| o.ttl.as_secs());
            assert_eq!(ttl.ok(), Some(86_400));
        });
    }

    #[test]
    fn test_ethereal_api_url_must_be_http() {
        with_clean_env(&[("HOSTEL_ETHEREAL_API_URL", "ftp://api.nodemailer.com/user")], || {
            let matches = new().get_matches_from(vec!["hostel"]);
            assert!(Options::parse(&matches).is_err());
        });

        with_clean_env(&[("HOSTEL_ETHEREAL_API_URL", "not a url")], || {
            let matches = new().get_matches_from(vec!["hostel"]);
            assert!(Options::parse(&matches).is_err());
        });
    }
}
