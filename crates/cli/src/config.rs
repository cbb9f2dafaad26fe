use anyhow::{anyhow, Context as AnyhowContext, Result};
use insights_browser::BrowserConfig;
use insights_engine::EngineConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

pub(crate) const CONFIG_ENV: &str = "INSIGHTS_CONFIG";

/// File-level configuration; every section and key is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct InsightsConfig {
    pub engine: EngineConfig,
    pub browser: BrowserConfig,
}

impl InsightsConfig {
    /// Loads from `explicit`, else from `$INSIGHTS_CONFIG`, else defaults.
    pub(crate) fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let bytes = std::fs::read(&path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = parse_config(&bytes)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}

/// Accepts JSON or TOML.
fn parse_config(bytes: &[u8]) -> Result<InsightsConfig> {
    match serde_json::from_slice(bytes) {
        Ok(config) => Ok(config),
        Err(json_err) => {
            let utf8 = std::str::from_utf8(bytes).map_err(|err| anyhow!("{json_err}; {err}"))?;
            toml::from_str(utf8).map_err(|toml_err| {
                anyhow!("Config is not valid JSON or TOML ({json_err}); TOML parse error: {toml_err}")
            })
        }
    }
}
