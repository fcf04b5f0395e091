//! Logger setup.

use crate::config::LogConfig;
use std::io::Write;

/// Build an `env_logger` builder from configuration.
///
/// `RUST_LOG`, when set, takes precedence over the configured level.
pub fn builder(config: &LogConfig) -> env_logger::Builder {
    let env = env_logger::Env::default().default_filter_or(config.level.clone());
    let mut builder = env_logger::Builder::from_env(env);

    if !config.timestamps {
        builder.format(|buf, record| {
            writeln!(buf, "[{} {}] {}", record.level(), record.target(), record.args())
        });
    }
    builder
}

/// Install the global logger. Calling this more than once is harmless.
pub fn init(config: &LogConfig) {
    if builder(config).try_init().is_err() {
        log::debug!("logger already initialised");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        let config = LogConfig {
            level: "debug".to_string(),
            timestamps: false,
        };
        init(&config);
        init(&config);
        log::info!("logger initialised in tests");
    }
}
