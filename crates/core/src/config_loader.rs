use std::path::Path;

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};
use tracing::debug;

use crate::config::BacktestConfig;

/// Default location of the backtest configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config/Backtest.toml";

/// Prefix of environment variables overriding configuration values.
pub const ENV_PREFIX: &str = "TENNIS_EDGE_";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads backtest configuration by layering defaults, `config/Backtest.toml`
    /// and `TENNIS_EDGE_*` environment variables.
    ///
    /// A missing file is not an error; defaults apply.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or the merged values are invalid.
    pub fn load() -> Result<BacktestConfig> {
        Self::extract(Self::figment(Path::new(DEFAULT_CONFIG_PATH), ENV_PREFIX))
    }

    /// Loads backtest configuration from a specific TOML or JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist, cannot be parsed, or the
    /// merged values are invalid.
    pub fn load_from(path: impl AsRef<Path>) -> Result<BacktestConfig> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("config file not found: {}", path.display());
        }
        Self::extract(Self::figment(path, ENV_PREFIX))
            .with_context(|| format!("failed to load config from {}", path.display()))
    }

    fn figment(path: &Path, env_prefix: &str) -> Figment {
        let figment = Figment::from(Serialized::defaults(BacktestConfig::default()));
        let figment = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => figment.merge(Json::file(path)),
            _ => figment.merge(Toml::file(path)),
        };
        // Nested keys use a double underscore, e.g. TENNIS_EDGE_MODEL__KIND
        figment.merge(Env::prefixed(env_prefix).split("__"))
    }

    fn extract(figment: Figment) -> Result<BacktestConfig> {
        let config: BacktestConfig = figment.extract()?;
        config.validate()?;
        debug!(
            features = config.features.len(),
            edge_min = config.edge_min,
            model = ?config.model.kind,
            "loaded backtest configuration"
        );
        Ok(config)
    }
}
