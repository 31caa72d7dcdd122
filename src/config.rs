//! Configuration loaded from `skuforge.toml`.
//!
//! Every knob has a sensible default, so the file is optional. The
//! `SKUFORGE_USER` environment variable takes precedence over the file
//! for the acting user recorded in audit entries.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::SkuforgeError;
use crate::session::{SimulatedBackend, TickSettings};
use crate::store::BudgetLimits;

/// Top-level configuration for the console.
#[derive(Debug, Clone, Deserialize)]
pub struct SkuforgeConfig {
    /// User recorded on audit entries.
    #[serde(default = "default_user")]
    pub user: String,

    /// Simulation tick period in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// USD added to the running job per tick.
    #[serde(default = "default_cost_per_tick")]
    pub cost_per_tick: f64,

    /// Upper bound of the random token increment per tick.
    #[serde(default = "default_max_token_step")]
    pub max_token_step: u64,

    /// Simulated latency of a fix-request agent run, in milliseconds.
    #[serde(default = "default_fix_delay_ms")]
    pub fix_delay_ms: u64,

    /// Simulated latency of an export/publish run, in milliseconds.
    #[serde(default = "default_export_delay_ms")]
    pub export_delay_ms: u64,

    /// Workspace-wide token budget.
    #[serde(default = "default_token_limit")]
    pub token_limit: u64,

    /// Workspace-wide spend budget in USD.
    #[serde(default = "default_cost_limit")]
    pub cost_limit: f64,

    /// Workspace-wide API call budget.
    #[serde(default = "default_api_call_limit")]
    pub api_call_limit: u32,

    /// Per-SKU spend cap in USD, shown next to a running job's cost.
    #[serde(default = "default_max_spend_per_sku")]
    pub max_spend_per_sku: f64,

    /// Per-SKU execution cap in seconds.
    #[serde(default = "default_max_execution_secs")]
    pub max_execution_secs: u64,
}

fn default_user() -> String {
    "current-user".to_string()
}

fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_cost_per_tick() -> f64 {
    0.001
}

fn default_max_token_step() -> u64 {
    50
}

fn default_fix_delay_ms() -> u64 {
    2000
}

fn default_export_delay_ms() -> u64 {
    1000
}

fn default_token_limit() -> u64 {
    100_000
}

fn default_cost_limit() -> f64 {
    10.0
}

fn default_api_call_limit() -> u32 {
    500
}

fn default_max_spend_per_sku() -> f64 {
    0.50
}

fn default_max_execution_secs() -> u64 {
    600
}

impl Default for SkuforgeConfig {
    fn default() -> Self {
        Self {
            user: default_user(),
            tick_interval_ms: default_tick_interval_ms(),
            cost_per_tick: default_cost_per_tick(),
            max_token_step: default_max_token_step(),
            fix_delay_ms: default_fix_delay_ms(),
            export_delay_ms: default_export_delay_ms(),
            token_limit: default_token_limit(),
            cost_limit: default_cost_limit(),
            api_call_limit: default_api_call_limit(),
            max_spend_per_sku: default_max_spend_per_sku(),
            max_execution_secs: default_max_execution_secs(),
        }
    }
}

impl SkuforgeConfig {
    /// Loads `skuforge.toml` from the current directory, falling back
    /// to defaults when the file does not exist.
    pub fn load() -> Result<Self, SkuforgeError> {
        Self::load_from(Path::new("skuforge.toml"))
    }

    /// Loads configuration from the given path, falling back to
    /// defaults when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, SkuforgeError> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<SkuforgeConfig>(&contents)?
        } else {
            Self::default()
        };

        // Environment takes precedence over the file for the user.
        if let Ok(user) = std::env::var("SKUFORGE_USER")
            && !user.is_empty()
        {
            config.user = user;
        }

        Ok(config)
    }

    pub fn budget_limits(&self) -> BudgetLimits {
        BudgetLimits {
            token_limit: self.token_limit,
            cost_limit: self.cost_limit,
            api_call_limit: self.api_call_limit,
        }
    }

    pub fn tick_settings(&self) -> TickSettings {
        TickSettings {
            period: Duration::from_millis(self.tick_interval_ms),
            cost_step: self.cost_per_tick,
            max_token_step: self.max_token_step,
        }
    }

    pub fn backend(&self) -> SimulatedBackend {
        SimulatedBackend {
            fix_delay: Duration::from_millis(self.fix_delay_ms),
            export_delay: Duration::from_millis(self.export_delay_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_values() {
        let config = SkuforgeConfig::default();
        assert_eq!(config.user, "current-user");
        assert_eq!(config.tick_interval_ms, 1000);
        assert_eq!(config.cost_per_tick, 0.001);
        assert_eq!(config.max_token_step, 50);
        assert_eq!(config.token_limit, 100_000);
        assert_eq!(config.api_call_limit, 500);
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            user = "reviewer-7"
            tick_interval_ms = 250
            cost_limit = 25.0
        "#;
        let config: SkuforgeConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.user, "reviewer-7");
        assert_eq!(config.tick_interval_ms, 250);
        assert_eq!(config.cost_limit, 25.0);
        // Untouched knobs keep their defaults.
        assert_eq!(config.max_token_step, 50);
        assert_eq!(config.fix_delay_ms, 2000);
    }

    #[test]
    fn load_from_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = SkuforgeConfig::load_from(&dir.path().join("skuforge.toml")).unwrap();
        assert_eq!(config.tick_interval_ms, 1000);
    }

    #[test]
    fn load_from_reads_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skuforge.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "max_spend_per_sku = 1.25").unwrap();

        let config = SkuforgeConfig::load_from(&path).unwrap();
        assert_eq!(config.max_spend_per_sku, 1.25);
    }

    #[test]
    fn load_from_rejects_malformed_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skuforge.toml");
        std::fs::write(&path, "tick_interval_ms = \"soon\"").unwrap();
        assert!(SkuforgeConfig::load_from(&path).is_err());
    }

    #[test]
    fn derived_settings_mirror_the_config() {
        let config = SkuforgeConfig {
            tick_interval_ms: 500,
            cost_per_tick: 0.002,
            max_token_step: 10,
            ..SkuforgeConfig::default()
        };
        let settings = config.tick_settings();
        assert_eq!(settings.period, Duration::from_millis(500));
        assert_eq!(settings.cost_step, 0.002);
        assert_eq!(settings.max_token_step, 10);

        let limits = config.budget_limits();
        assert_eq!(limits.token_limit, 100_000);
    }
}
