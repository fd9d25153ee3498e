//! Logging initialization for the CLI.
//!
//! Verbose runs print debug output to stderr. Otherwise logs are appended
//! to a file in the platform log directory so stdout stays clean for JSON.

use atelier_util::log::{self, LogConfig, LogLevel};
use std::path::PathBuf;

/// Initialize logging based on verbosity and the configured level.
///
/// Returns the log file path if logging to file.
pub fn init_logging(verbose: bool, configured: Option<LogLevel>) -> Option<PathBuf> {
    let config = logging_config(verbose, configured, log::default_log_path());
    let file = config.file.clone();
    log::init(config);
    file
}

fn logging_config(
    verbose: bool,
    configured: Option<LogLevel>,
    log_file: Option<PathBuf>,
) -> LogConfig {
    if verbose {
        return LogConfig {
            print: true,
            level: LogLevel::Debug,
            include_location: true,
            file: None,
        };
    }

    LogConfig {
        print: false,
        level: configured.unwrap_or(LogLevel::Info),
        include_location: false,
        file: log_file,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_prints_debug() {
        let config = logging_config(true, Some(LogLevel::Error), Some(PathBuf::from("a.log")));
        assert!(config.print);
        assert_eq!(config.level, LogLevel::Debug);
        assert!(config.file.is_none());
    }

    #[test]
    fn test_quiet_logs_to_file_at_configured_level() {
        let config = logging_config(false, Some(LogLevel::Warn), Some(PathBuf::from("a.log")));
        assert!(!config.print);
        assert_eq!(config.level, LogLevel::Warn);
        assert_eq!(config.file, Some(PathBuf::from("a.log")));

        let config = logging_config(false, None, None);
        assert_eq!(config.level, LogLevel::Info);
    }
}
