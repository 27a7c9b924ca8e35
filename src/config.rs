use std::env;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("EVENSPLIT_PORT must be a port number, got '{0}'")]
    InvalidPort(String),
    #[error("EVENSPLIT_CURRENCY must not be blank")]
    BlankCurrency,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub currency: String,
    /// Empty means any origin is allowed.
    pub cors_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "0.0.0.0".to_string(),
            port: 8080,
            currency: "kr".to_string(),
            cors_origins: vec![],
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let host = lookup("EVENSPLIT_HOST").unwrap_or(defaults.host);
        let port = match lookup("EVENSPLIT_PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => defaults.port,
        };
        let currency = match lookup("EVENSPLIT_CURRENCY") {
            Some(raw) if raw.trim().is_empty() => return Err(ConfigError::BlankCurrency),
            Some(raw) => raw.trim().to_string(),
            None => defaults.currency,
        };
        let cors_origins = lookup("EVENSPLIT_CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty() && s != "*")
                    .collect()
            })
            .unwrap_or_default();

        Ok(Config {
            host,
            port,
            currency,
            cors_origins,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(Config::from_lookup(lookup(&[])), Ok(Config::default()));
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("EVENSPLIT_HOST", "127.0.0.1"),
            ("EVENSPLIT_PORT", " 9000 "),
            ("EVENSPLIT_CURRENCY", "EUR"),
            ("EVENSPLIT_CORS_ORIGINS", "http://a.test, ,http://b.test"),
        ]))
        .unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9000);
        assert_eq!(config.currency, "EUR");
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn wildcard_origin_means_any() {
        let config = Config::from_lookup(lookup(&[("EVENSPLIT_CORS_ORIGINS", "*")])).unwrap();
        assert!(config.cors_origins.is_empty());
    }

    #[test]
    fn rejects_bad_values() {
        assert_eq!(
            Config::from_lookup(lookup(&[("EVENSPLIT_PORT", "eighty")])),
            Err(ConfigError::InvalidPort("eighty".to_string()))
        );
        assert_eq!(
            Config::from_lookup(lookup(&[("EVENSPLIT_CURRENCY", "  ")])),
            Err(ConfigError::BlankCurrency)
        );
    }
}
