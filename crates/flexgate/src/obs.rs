//! Logging bootstrap.

use crate::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber filtered by `config.filter`.
///
/// An unparsable filter falls back to `info`. Returns `false` when a global
/// subscriber was already installed, leaving it untouched.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_a_no_op() {
        let config = LoggingConfig {
            filter: "not a [valid filter".to_string(),
        };

        // Another test may have installed a subscriber first.
        let _ = init_logging(&config);

        assert!(!init_logging(&LoggingConfig::default()));
    }
}
