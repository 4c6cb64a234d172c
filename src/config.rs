use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_CONCURRENCY: usize = 3;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub host: String,
    pub port: u16,
    /// Videos whose comments are fetched at the same time.
    pub concurrency: usize,
    pub max_retries: u32,
    pub retry_base_delay: Duration,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|s| !s.trim().is_empty());

        let api_key = var("YOUTUBE_API_KEY").ok_or(ConfigError::MissingApiKey)?;

        Ok(Self {
            api_key,
            base_url: var("YOUTUBE_API_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_var("PORT", var("PORT"), DEFAULT_PORT)?,
            concurrency: parse_var("CRAWL_CONCURRENCY", var("CRAWL_CONCURRENCY"), DEFAULT_CONCURRENCY)?
                .max(1),
            max_retries: parse_var("YOUTUBE_MAX_RETRIES", var("YOUTUBE_MAX_RETRIES"), DEFAULT_MAX_RETRIES)?,
            retry_base_delay: Duration::from_millis(1000),
            request_timeout: Duration::from_secs(parse_var(
                "YOUTUBE_TIMEOUT_SECS",
                var("YOUTUBE_TIMEOUT_SECS"),
                DEFAULT_TIMEOUT_SECS,
            )?),
        })
    }

    /// Config pointed at an arbitrary API root, used by tests and local mocks.
    pub fn for_base_url(api_key: &str, base_url: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: base_url.to_string(),
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            concurrency: DEFAULT_CONCURRENCY,
            max_retries: 0,
            retry_base_delay: Duration::from_millis(10),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError> {
    match value {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { name, value: raw }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let config = Config::from_lookup(lookup(&[("YOUTUBE_API_KEY", "abc")])).unwrap();
        assert_eq!(config.api_key, "abc");
        assert_eq!(config.port, 5000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.concurrency, 3);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn port_override_is_honoured() {
        let config = Config::from_lookup(lookup(&[("YOUTUBE_API_KEY", "abc"), ("PORT", "8081")])).unwrap();
        assert_eq!(config.port, 8081);
    }

    #[test]
    fn missing_or_blank_key_is_rejected() {
        assert!(matches!(Config::from_lookup(lookup(&[])), Err(ConfigError::MissingApiKey)));
        assert!(matches!(
            Config::from_lookup(lookup(&[("YOUTUBE_API_KEY", "  ")])),
            Err(ConfigError::MissingApiKey)
        ));
    }

    #[test]
    fn invalid_number_names_the_variable() {
        let err = Config::from_lookup(lookup(&[("YOUTUBE_API_KEY", "abc"), ("PORT", "http")])).unwrap_err();
        assert_eq!(err.to_string(), "invalid value for PORT: \"http\"");
    }

    #[test]
    fn zero_concurrency_is_clamped() {
        let config = Config::from_lookup(lookup(&[("YOUTUBE_API_KEY", "abc"), ("CRAWL_CONCURRENCY", "0")])).unwrap();
        assert_eq!(config.concurrency, 1);
    }
}
