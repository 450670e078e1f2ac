//! Server configuration from the environment.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_DATA_FILE: &str = "data/transit.json";
const DEFAULT_BIND_ADDR: SocketAddr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 3000));
const DEFAULT_RELOAD_SECS: u64 = 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is not valid: {value}")]
    Invalid { var: &'static str, value: String },
}

/// Settings for the HTTP server binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// JSON snapshot of stops and routes (`TRANSIT_DATA_FILE`).
    pub data_file: PathBuf,

    /// Listen address (`TRANSIT_BIND_ADDR`).
    pub bind_addr: SocketAddr,

    /// Per-search deadline (`TRANSIT_SEARCH_TIMEOUT_MS`), unbounded if unset.
    pub search_timeout: Option<Duration>,

    /// How often the data file is re-read (`TRANSIT_RELOAD_SECS`).
    pub reload_interval: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_file = lookup("TRANSIT_DATA_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE));

        let bind_addr = parse_var(&lookup, "TRANSIT_BIND_ADDR")?
            .unwrap_or(DEFAULT_BIND_ADDR);

        let search_timeout = parse_var::<u64, _>(&lookup, "TRANSIT_SEARCH_TIMEOUT_MS")?
            .map(Duration::from_millis);

        let reload_interval = parse_var::<u64, _>(&lookup, "TRANSIT_RELOAD_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_RELOAD_SECS));

        if reload_interval.is_zero() {
            return Err(ConfigError::Invalid {
                var: "TRANSIT_RELOAD_SECS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            data_file,
            bind_addr,
            search_timeout,
            reload_interval,
        })
    }
}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            bind_addr: DEFAULT_BIND_ADDR,
            search_timeout: None,
            reload_interval: Duration::from_secs(DEFAULT_RELOAD_SECS),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn reads_every_variable() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("TRANSIT_DATA_FILE", "/srv/navi.json"),
            ("TRANSIT_BIND_ADDR", "0.0.0.0:8080"),
            ("TRANSIT_SEARCH_TIMEOUT_MS", "250"),
            ("TRANSIT_RELOAD_SECS", "600"),
        ]))
        .unwrap();

        assert_eq!(config.data_file, PathBuf::from("/srv/navi.json"));
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.search_timeout, Some(Duration::from_millis(250)));
        assert_eq!(config.reload_interval, Duration::from_secs(600));
    }

    #[test]
    fn rejects_bad_values() {
        let err = ServerConfig::from_lookup(lookup(&[("TRANSIT_SEARCH_TIMEOUT_MS", "soon")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                var: "TRANSIT_SEARCH_TIMEOUT_MS",
                value: "soon".into()
            }
        );

        assert!(ServerConfig::from_lookup(lookup(&[("TRANSIT_BIND_ADDR", "nowhere")])).is_err());
        assert!(ServerConfig::from_lookup(lookup(&[("TRANSIT_RELOAD_SECS", "0")])).is_err());
    }
}
