//! Configuration Loader
//!
//! Layers an optional configuration file (TOML, YAML or JSON, picked by
//! extension) under `COMMAND_GATE__*` environment variables, then validates
//! the result.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use config::{Config, Environment, File};
use tracing::{debug, info};

use super::error::{ConfigResult, ConfigurationError};
use super::GateConfig;

/// Environment variable naming the configuration file for [`ConfigManager::load`]
pub const CONFIG_PATH_ENV: &str = "COMMAND_GATE_CONFIG";

const ENV_PREFIX: &str = "COMMAND_GATE";
const ENV_SEPARATOR: &str = "__";

/// Loaded, validated gate configuration
#[derive(Debug)]
pub struct ConfigManager {
    config: GateConfig,
    config_file: Option<PathBuf>,
}

impl ConfigManager {
    /// Load from the file named by `COMMAND_GATE_CONFIG` (if any) and the environment
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        let config_file = env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
        Self::load_layers(config_file, Self::environment())
    }

    /// Load from a specific file, with environment overrides on top
    pub fn load_from_file(path: impl AsRef<Path>) -> ConfigResult<Arc<ConfigManager>> {
        Self::load_layers(Some(path.as_ref().to_path_buf()), Self::environment())
    }

    /// Wrap an already built configuration after validating it
    pub fn from_config(config: GateConfig) -> ConfigResult<Arc<ConfigManager>> {
        config.validate()?;
        Ok(Arc::new(ConfigManager {
            config,
            config_file: None,
        }))
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR)
            .try_parsing(true)
    }

    fn load_layers(
        config_file: Option<PathBuf>,
        environment: Environment,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let source_name = config_file
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "environment".to_string());

        debug!("Loading gate configuration from {}", source_name);

        let mut builder = Config::builder();
        if let Some(path) = &config_file {
            builder = builder.add_source(File::from(path.as_path()).required(true));
        }

        let config: GateConfig = builder
            .add_source(environment)
            .build()
            .and_then(|layers| layers.try_deserialize())
            .map_err(|e| ConfigurationError::load_failed(&source_name, e))?;

        config.validate()?;

        debug!(
            "Configuration loaded successfully: {}",
            serde_json::to_string_pretty(&config)
                .unwrap_or_else(|_| "[serialization error]".to_string())
        );
        info!(
            source = %source_name,
            table_mode = ?config.table.mode,
            channel = ?config.channel.kind,
            "Gate configuration loaded"
        );

        Ok(Arc::new(ConfigManager {
            config,
            config_file,
        }))
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    /// Effective configuration as JSON, for diagnostics
    pub fn debug_config(&self) -> serde_json::Value {
        serde_json::to_value(&self.config).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChannelKind, TableMode};
    use std::io::Write;

    fn isolated_environment(vars: &[(&str, &str)]) -> Environment {
        let source = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<config::Map<String, String>>();
        ConfigManager::environment().source(Some(source))
    }

    fn write_config(extension: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(extension)
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_loads_yaml_file() {
        let file = write_config(
            ".yaml",
            "table:\n  mode: lazy\nchannel:\n  kind: queue\n  queue_capacity: 32\n",
        );

        let manager =
            ConfigManager::load_layers(Some(file.path().to_path_buf()), isolated_environment(&[]))
                .unwrap();

        assert_eq!(manager.config().table.mode, TableMode::Lazy);
        assert_eq!(manager.config().channel.kind, ChannelKind::Queue);
        assert_eq!(manager.config().channel.queue_capacity, Some(32));
        assert_eq!(manager.config_file(), Some(file.path()));
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = write_config(".toml", "[table]\nmode = \"lazy\"\n\n[channel]\nkind = \"inline\"\n");

        let manager = ConfigManager::load_layers(
            Some(file.path().to_path_buf()),
            isolated_environment(&[("COMMAND_GATE__CHANNEL__KIND", "tokio")]),
        )
        .unwrap();

        assert_eq!(manager.config().table.mode, TableMode::Lazy);
        assert_eq!(manager.config().channel.kind, ChannelKind::Tokio);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let manager = ConfigManager::load_layers(None, isolated_environment(&[])).unwrap();
        assert_eq!(manager.config(), &GateConfig::default());
        assert_eq!(manager.debug_config()["channel"]["kind"], "none");
    }

    #[test]
    fn test_missing_file_fails() {
        let result = ConfigManager::load_layers(
            Some(PathBuf::from("/nonexistent/command-gate.yaml")),
            isolated_environment(&[]),
        );
        assert!(matches!(result, Err(ConfigurationError::LoadFailed { .. })));
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let file = write_config(".json", r#"{"channel": {"kind": "queue", "queue_capacity": 0}}"#);

        let result =
            ConfigManager::load_layers(Some(file.path().to_path_buf()), isolated_environment(&[]));
        assert!(matches!(result, Err(ConfigurationError::InvalidValue { .. })));
    }

    #[test]
    fn test_unknown_channel_kind_fails() {
        let result = ConfigManager::load_layers(
            None,
            isolated_environment(&[("COMMAND_GATE__CHANNEL__KIND", "carrier_pigeon")]),
        );
        assert!(matches!(result, Err(ConfigurationError::LoadFailed { .. })));
    }
}
