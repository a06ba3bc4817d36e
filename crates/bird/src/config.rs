//! Server configuration.
//!
//! Every setting has a default; [`ServerConfig::from_env`] overrides them
//! from `BIRD_*` environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use bird_room::ManagerConfig;

/// Default interval between keep-alive comments on a live stream.
pub const DEFAULT_HEARTBEAT: Duration = Duration::from_secs(15);

/// Default bind address when neither `BIRD_ADDR` nor `PORT` is set.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// A setting that could not be parsed.
#[derive(Debug, thiserror::Error)]
#[error("invalid value for {name}: {value:?}")]
pub struct ConfigError {
    pub name: &'static str,
    pub value: String,
}

/// Shortest heartbeat period a stream will use.
pub const MIN_HEARTBEAT: Duration = Duration::from_millis(10);

/// Settings for the per-subscriber event streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    /// How often a keep-alive comment is written when nothing else is.
    /// Values below [`MIN_HEARTBEAT`] are treated as `MIN_HEARTBEAT`.
    pub heartbeat: Duration,
}

impl StreamConfig {
    pub(crate) fn heartbeat_period(&self) -> Duration {
        self.heartbeat.max(MIN_HEARTBEAT)
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            heartbeat: DEFAULT_HEARTBEAT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// HS256 secret for player tokens.
    pub jwt_secret: String,
    /// Where room snapshots are kept. `None` keeps rooms in memory only.
    pub data_dir: Option<PathBuf>,
    pub manager: ManagerConfig,
    pub stream: StreamConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            jwt_secret: "bird-dev-secret".to_string(),
            data_dir: None,
            manager: ManagerConfig::default(),
            stream: StreamConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Reads the process environment on top of the defaults.
    ///
    /// | Variable | Setting |
    /// |---|---|
    /// | `BIRD_ADDR` | bind address |
    /// | `PORT` | bind `0.0.0.0:$PORT` when `BIRD_ADDR` is unset |
    /// | `BIRD_JWT_SECRET` | token secret |
    /// | `BIRD_DATA_DIR` | snapshot directory |
    /// | `BIRD_HEARTBEAT_SECS` | stream heartbeat |
    /// | `BIRD_CHANNEL_CAPACITY` | per-subscriber buffer |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup("BIRD_ADDR") {
            config.bind_addr = addr;
        } else if let Some(port) = lookup("PORT") {
            let port: u16 = parse("PORT", &port)?;
            config.bind_addr = format!("0.0.0.0:{port}");
        }
        if let Some(secret) = lookup("BIRD_JWT_SECRET") {
            if secret.is_empty() {
                return Err(ConfigError {
                    name: "BIRD_JWT_SECRET",
                    value: secret,
                });
            }
            config.jwt_secret = secret;
        }
        if let Some(dir) = lookup("BIRD_DATA_DIR") {
            config.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(secs) = lookup("BIRD_HEARTBEAT_SECS") {
            let secs: u64 = parse("BIRD_HEARTBEAT_SECS", &secs)?;
            config.stream.heartbeat = Duration::from_secs(secs.max(1));
        }
        if let Some(capacity) = lookup("BIRD_CHANNEL_CAPACITY") {
            config.manager.channel_capacity = parse("BIRD_CHANNEL_CAPACITY", &capacity)?;
        }

        Ok(config)
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError {
        name,
        value: value.to_string(),
    })
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
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_from_lookup_empty_uses_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.stream.heartbeat, DEFAULT_HEARTBEAT);
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_from_lookup_port_binds_all_interfaces() {
        let config = ServerConfig::from_lookup(lookup(&[("PORT", "9000")])).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:9000");
    }

    #[test]
    fn test_from_lookup_addr_wins_over_port() {
        let config =
            ServerConfig::from_lookup(lookup(&[("PORT", "9000"), ("BIRD_ADDR", "10.0.0.1:1")]))
                .unwrap();
        assert_eq!(config.bind_addr, "10.0.0.1:1");
    }

    #[test]
    fn test_from_lookup_reads_every_setting() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("BIRD_JWT_SECRET", "s3cret"),
            ("BIRD_DATA_DIR", "/var/lib/bird"),
            ("BIRD_HEARTBEAT_SECS", "5"),
            ("BIRD_CHANNEL_CAPACITY", "8"),
        ]))
        .unwrap();
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.data_dir, Some(PathBuf::from("/var/lib/bird")));
        assert_eq!(config.stream.heartbeat, Duration::from_secs(5));
        assert_eq!(config.manager.channel_capacity, 8);
    }

    #[test]
    fn test_from_lookup_bad_number_names_variable() {
        let err = ServerConfig::from_lookup(lookup(&[("BIRD_HEARTBEAT_SECS", "soon")])).unwrap_err();
        assert_eq!(err.name, "BIRD_HEARTBEAT_SECS");
        assert!(err.to_string().contains("soon"));
    }

    #[test]
    fn test_stream_config_zero_heartbeat_clamps_to_minimum() {
        let config = StreamConfig {
            heartbeat: Duration::ZERO,
        };
        assert_eq!(config.heartbeat_period(), MIN_HEARTBEAT);
        assert_eq!(StreamConfig::default().heartbeat_period(), DEFAULT_HEARTBEAT);
    }

    #[test]
    fn test_from_lookup_empty_secret_is_rejected() {
        let err = ServerConfig::from_lookup(lookup(&[("BIRD_JWT_SECRET", "")])).unwrap_err();
        assert_eq!(err.name, "BIRD_JWT_SECRET");
    }
}
