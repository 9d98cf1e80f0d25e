use crate::cli::{actions::Action, commands, dispatch, telemetry};
use anyhow::Result;
use clap::{parser::ValueSource, ArgMatches};
use std::path::PathBuf;

/// Map verbosity count to tracing level
const fn get_verbosity_level(verbosity: u8) -> tracing::Level {
    match verbosity {
        0 => tracing::Level::ERROR,
        1 => tracing::Level::WARN,
        2 => tracing::Level::INFO,
        3 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    }
}

/// Level requested with `-v` or `TOTPGATE_LOG_LEVEL`; `None` when neither is set.
fn requested_level(matches: &ArgMatches) -> Option<tracing::Level> {
    let explicit = matches!(
        matches.value_source(commands::logging::ARG_VERBOSITY),
        Some(ValueSource::CommandLine | ValueSource::EnvVariable)
    );

    explicit.then(|| {
        get_verbosity_level(
            matches
                .get_one::<u8>(commands::logging::ARG_VERBOSITY)
                .copied()
                .unwrap_or(0),
        )
    })
}

/// Main entry point for the CLI - builds and returns the Action
///
/// # Errors
///
/// Returns an error if telemetry initialization or action dispatch fails
pub fn start() -> Result<Action> {
    // 1. Parse command-line arguments
    let matches = commands::new().get_matches();

    // 2. Extract verbosity level
    let verbosity_level = requested_level(&matches);

    let log_file = matches
        .get_one::<String>(commands::logging::ARG_LOG_FILE)
        .map(PathBuf::from);

    // 3. Initialize telemetry
    telemetry::init(verbosity_level, log_file.as_deref())?;

    // 4. Dispatch to appropriate action
    dispatch::handler(&matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    fn level_for(args: &[&str], env: Option<&str>) -> Option<Level> {
        temp_env::with_vars([("TOTPGATE_LOG_LEVEL", env)], || {
            let matches = commands::new().get_matches_from(args);
            requested_level(&matches)
        })
    }

    #[test]
    fn verbosity_levels() {
        assert_eq!(get_verbosity_level(0), Level::ERROR);
        assert_eq!(get_verbosity_level(1), Level::WARN);
        assert_eq!(get_verbosity_level(2), Level::INFO);
        assert_eq!(get_verbosity_level(3), Level::DEBUG);
        assert_eq!(get_verbosity_level(9), Level::TRACE);
    }

    #[test]
    fn no_flag_and_no_env_defers_to_telemetry_default() {
        assert_eq!(level_for(&["totpgate"], None), None);
    }

    #[test]
    fn flags_and_env_are_explicit() {
        assert_eq!(level_for(&["totpgate", "-v"], None), Some(Level::WARN));
        assert_eq!(level_for(&["totpgate", "-vvv"], None), Some(Level::DEBUG));
        assert_eq!(level_for(&["totpgate"], Some("error")), Some(Level::ERROR));
        assert_eq!(level_for(&["totpgate"], Some("trace")), Some(Level::TRACE));
    }
}
