use std::env;

use dotenvy::dotenv;

const DEFAULT_RACES_KEY: &str = "races";
const DEFAULT_LOG_FILE: &str = "program.log";

/// # runtime configuration
/// read from the environment, a `.env` file is merged in first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `None` runs the service on the in-memory store
    pub redis_url: Option<String>,
    pub races_key: String,
    pub logging_level: log::LevelFilter,
    pub log_file: String,
}

impl Config {
    pub fn load() -> Config {
        dotenv().ok();
        Config::from_lookup(|key| env::var(key).ok())
    }

    /// build the config from any key lookup, blank values count as unset
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Config {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Config {
            redis_url: var("REDIS_URL"),
            races_key: var("RACES_KEY").unwrap_or_else(|| DEFAULT_RACES_KEY.to_string()),
            logging_level: parse_level(var("LOGGING_LEVEL").as_deref()),
            log_file: var("LOG_FILE").unwrap_or_else(|| DEFAULT_LOG_FILE.to_string()),
        }
    }
}

fn parse_level(verbosity: Option<&str>) -> log::LevelFilter {
    match verbosity.map(|v| v.trim().to_uppercase()).as_deref() {
        Some("OFF") => log::LevelFilter::Off,
        Some("ERROR") => log::LevelFilter::Error,
        Some("WARN") => log::LevelFilter::Warn,
        Some("DEBUG") => log::LevelFilter::Debug,
        Some("TRACE") => log::LevelFilter::Trace,
        // default to info
        _ => log::LevelFilter::Info,
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use super::Config;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]);
        assert_eq!(config.redis_url, None);
        assert_eq!(config.races_key, "races");
        assert_eq!(config.logging_level, log::LevelFilter::Info);
        assert_eq!(config.log_file, "program.log");
    }

    #[test]
    fn reads_values() {
        let config = config(&[
            ("REDIS_URL", "redis://127.0.0.1/"),
            ("RACES_KEY", "races:test"),
            ("LOGGING_LEVEL", "debug"),
            ("LOG_FILE", "/tmp/races.log"),
        ]);
        assert_eq!(config.redis_url.as_deref(), Some("redis://127.0.0.1/"));
        assert_eq!(config.races_key, "races:test");
        assert_eq!(config.logging_level, log::LevelFilter::Debug);
        assert_eq!(config.log_file, "/tmp/races.log");
    }

    #[test]
    fn blank_and_unknown_values_fall_back() {
        let config = config(&[("REDIS_URL", " "), ("LOGGING_LEVEL", "LOUD")]);
        assert_eq!(config.redis_url, None);
        assert_eq!(config.logging_level, log::LevelFilter::Info);
    }
}
