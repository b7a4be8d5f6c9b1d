//! Logging setup for tarifdefteri.
//!
//! Everything logs through `tracing`. Store operations log at debug, session
//! and recipe lifecycle events at info, and swallowed failures (such as a
//! best-effort placeholder cleanup) at warn. Log lines go to stderr so that
//! command output on stdout stays machine-readable.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Crates whose events are shown at the chosen verbosity.
const OWN_TARGETS: &[&str] = &["tarifdefteri", "tarifdefteri_layout"];

/// Verbosity level for logging output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Info and above.
    #[default]
    Normal,
    /// Debug and above, including every store call.
    Verbose,
    /// Everything, including HTTP client internals.
    Trace,
}

impl Verbosity {
    /// Resolve verbosity from `--quiet` and the number of `-v` flags.
    #[must_use]
    pub fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Trace,
        }
    }

    /// The tracing level for our own crates.
    #[must_use]
    pub fn level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// Build the default filter directive string.
    ///
    /// Dependencies stay at warn unless tracing everything.
    #[must_use]
    pub fn filter_directives(self) -> String {
        let level = self.level();
        let mut directives: Vec<String> = OWN_TARGETS
            .iter()
            .map(|target| format!("{target}={level}"))
            .collect();
        let deps = if self == Self::Trace { "trace" } else { "warn" };
        directives.insert(0, deps.to_string());
        directives.join(",")
    }
}

/// Initialize the logging system.
///
/// Call once at startup. `RUST_LOG`, when set, replaces the filter derived
/// from `verbosity`. Repeated calls are ignored.
///
/// # Examples
///
/// ```no_run
/// use tarifdefteri::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::from_flags(false, 1));
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directives()));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(verbosity != Verbosity::Normal)
            .without_time(),
    );

    let _ = subscriber.try_init();
}

/// Initialize logging for tests, showing warnings through the test writer.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flags() {
        assert_eq!(Verbosity::from_flags(true, 3), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, 0), Verbosity::Normal);
        assert_eq!(Verbosity::from_flags(false, 1), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(false, 2), Verbosity::Trace);
        assert_eq!(Verbosity::from_flags(false, 9), Verbosity::Trace);
    }

    #[test]
    fn test_level() {
        assert_eq!(Verbosity::Quiet.level(), Level::ERROR);
        assert_eq!(Verbosity::Normal.level(), Level::INFO);
        assert_eq!(Verbosity::Verbose.level(), Level::DEBUG);
        assert_eq!(Verbosity::Trace.level(), Level::TRACE);
    }

    #[test]
    fn test_filter_directives() {
        let normal = Verbosity::Normal.filter_directives();
        assert_eq!(normal, "warn,tarifdefteri=INFO,tarifdefteri_layout=INFO");

        let trace = Verbosity::Trace.filter_directives();
        assert!(trace.starts_with("trace,"));
    }

    #[test]
    fn test_filter_directives_parse() {
        for v in [
            Verbosity::Quiet,
            Verbosity::Normal,
            Verbosity::Verbose,
            Verbosity::Trace,
        ] {
            assert!(EnvFilter::try_new(v.filter_directives()).is_ok());
        }
    }

    #[test]
    fn test_verbosity_default() {
        assert_eq!(Verbosity::default(), Verbosity::Normal);
    }

    #[test]
    fn test_init_logging_is_repeatable() {
        init_logging(Verbosity::Normal);
        init_logging(Verbosity::Verbose);
        init_test_logging();
    }
}
