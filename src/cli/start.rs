use crate::cli::{actions::Action, commands, dispatch, telemetry};
use anyhow::Result;
use tracing::Level;

/// Verbosity count to log level. Zero keeps the default (ERROR).
const fn log_level(verbosity: u8) -> Option<Level> {
    match verbosity {
        0 => None,
        1 => Some(Level::WARN),
        2 => Some(Level::INFO),
        3 => Some(Level::DEBUG),
        _ => Some(Level::TRACE),
    }
}

/// Parse arguments, install logging and return the action to run.
///
/// # Errors
///
/// Returns an error if telemetry cannot be initialized or the arguments are inconsistent
pub fn start() -> Result<Action> {
    let matches = commands::new().get_matches();

    let verbosity = matches
        .get_one::<u8>(commands::logging::ARG_VERBOSITY)
        .copied()
        .unwrap_or(0);

    telemetry::init(log_level(verbosity))?;

    dispatch::handler(&matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level() {
        assert_eq!(log_level(0), None);
        assert_eq!(log_level(1), Some(Level::WARN));
        assert_eq!(log_level(2), Some(Level::INFO));
        assert_eq!(log_level(3), Some(Level::DEBUG));
        assert_eq!(log_level(4), Some(Level::TRACE));
        assert_eq!(log_level(u8::MAX), Some(Level::TRACE));
    }
}
