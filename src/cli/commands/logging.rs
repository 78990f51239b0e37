use clap::{Arg, ArgAction, Command, builder::ValueParser};

pub const ARG_VERBOSITY: &str = "verbosity";

/// Level names accepted by `HOSTEL_LOG_LEVEL`, indexed by verbosity count.
pub const LEVEL_NAMES: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Accept either a count (0-5) or a level name.
#[must_use]
pub fn parse_log_level() -> ValueParser {
    ValueParser::from(|level: &str| -> Result<u8, String> {
        if let Some(count) = level.parse::<u8>().ok().filter(|count| *count <= 5) {
            return Ok(count);
        }

        let level = level.trim().to_lowercase();
        LEVEL_NAMES
            .iter()
            .position(|name| *name == level)
            .and_then(|index| u8::try_from(index).ok())
            .ok_or_else(|| format!("invalid log level: {level}"))
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
            .env("HOSTEL_LOG_LEVEL")
            .global(true)
            .action(ArgAction::Count)
            .value_parser(parse_log_level()),
    )
}
