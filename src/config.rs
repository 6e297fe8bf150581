use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub db: DbConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub enable_cors: bool,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            request_timeout_secs: 30,
            enable_cors: false,
        }
    }
}

/// Numeric solver parameters, injected into the optimizer at construction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SolverConfig {
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 100,
        }
    }
}

/// Constants for derived metrics.
///
/// The baseline loss and cost-per-MW² figures are operator heuristics with
/// no first-principles derivation, so they stay configurable rather than
/// hard-coded. Defaults correspond to a 100 MW historical supply/demand gap
/// and roughly 25k currency units of annual savings when it is closed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub baseline_losses_mw2: f64,
    pub cost_per_mw2: f64,
    pub target_efficiency_percent: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            baseline_losses_mw2: 10_000.0,
            cost_per_mw2: 2.5,
            target_efficiency_percent: 85.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    pub url: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://gridopt.db".to_string(),
        }
    }
}

impl Config {
    /// Defaults, overridden by `config/default.toml`, overridden by
    /// `GRIDOPT__`-prefixed environment variables.
    pub fn load() -> Result<Self> {
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("config/default.toml"))
            .merge(Env::prefixed("GRIDOPT__").split("__"));
        Ok(figment.extract()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_contract() {
        let cfg = Config::default();
        assert_eq!(cfg.solver.tolerance, 1e-6);
        assert_eq!(cfg.solver.max_iterations, 100);
        assert_eq!(cfg.metrics.baseline_losses_mw2, 10_000.0);
        assert_eq!(cfg.metrics.cost_per_mw2, 2.5);
        assert_eq!(cfg.server.port, 8000);
    }

    #[test]
    fn test_socket_addr_parses() {
        let cfg = ServerConfig::default();
        let addr = cfg.socket_addr().unwrap();
        assert_eq!(addr.port(), 8000);
    }
}
