use anyhow::Context;
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub simulation: SimulationSettings,
    pub dashboard: DashboardSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Directory served under `/static`
    pub static_dir: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 7000,
            static_dir: "static".to_string(),
        }
    }
}

impl ServerSettings {
    /// `host` must be an IPv4 or IPv6 literal
    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .with_context(|| format!("Invalid listen host {:?}", self.host))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SimulationSettings {
    pub enabled: bool,
    /// Real time spent on one simulated hour
    pub step_interval_ms: u64,
    /// Unix seconds of the first sample; defaults to startup time
    pub start_epoch: Option<i64>,
    /// Fixed seed for reproducible noise
    pub seed: Option<u64>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            step_interval_ms: 1000,
            start_epoch: None,
            seed: None,
        }
    }
}

impl SimulationSettings {
    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardSettings {
    pub enabled: bool,
    /// Backend base URL; the local server when unset
    pub backend_url: Option<String>,
    pub refresh_interval_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            backend_url: None,
            refresh_interval_ms: 2000,
            request_timeout_ms: 5000,
        }
    }
}

impl DashboardSettings {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn backend_url_for(&self, server: &ServerSettings) -> String {
        match &self.backend_url {
            Some(url) => url.clone(),
            None => {
                let host = match server.host.as_str() {
                    "0.0.0.0" | "::" => "127.0.0.1",
                    other => other,
                };
                format!("http://{}:{}", host, server.port)
            }
        }
    }
}

/// Reads `config/dashboard.{toml,yaml,json}` when present, then `CHP__*`
/// environment variables, e.g. `CHP__SERVER__PORT=8080`.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(config::Environment::with_prefix("CHP").separator("__"))
        .build()
        .context("Failed to read configuration")?;

    settings
        .try_deserialize()
        .context("Failed to parse configuration")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> AppConfig {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults_fill_missing_keys() {
        let config = parse(
            r#"
            [server]
            port = 8080

            [simulation]
            seed = 42
            "#,
        );

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.simulation.seed, Some(42));
        assert_eq!(config.simulation.step_interval(), Duration::from_secs(1));
        assert!(config.dashboard.enabled);
        assert_eq!(config.dashboard.refresh_interval(), Duration::from_secs(2));
    }

    #[test]
    fn test_backend_url_defaults_to_local_server() {
        let config = parse("[server]\nport = 7100\n");
        assert_eq!(
            config.dashboard.backend_url_for(&config.server),
            "http://127.0.0.1:7100"
        );
        assert_eq!(
            config.server.addr().unwrap(),
            "0.0.0.0:7100".parse::<SocketAddr>().unwrap()
        );

        let config = parse("[dashboard]\nbackend_url = \"http://plant.local:7000\"\n");
        assert_eq!(
            config.dashboard.backend_url_for(&config.server),
            "http://plant.local:7000"
        );
    }

    #[test]
    fn test_listen_address_accepts_ipv6() {
        let config = parse("[server]\nhost = \"::\"\nport = 7000\n");
        assert_eq!(
            config.server.addr().unwrap(),
            "[::]:7000".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(
            config.dashboard.backend_url_for(&config.server),
            "http://127.0.0.1:7000"
        );

        let config = parse("[server]\nhost = \"plant.local\"\n");
        assert!(config.server.addr().is_err());
    }
}
