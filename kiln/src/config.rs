//! Pass configuration is created with opinionated default values, which can then be overwritten
//! by environment variables prefixed with `KILN_` or a `kiln.json` file.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const CONFIG_ENV_PREFIX: &str = "KILN";

/// Name of the default config file.
pub const CONFIG_FILE: &str = "kiln.json";

/// Configuration for an ahead-of-time pass.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct AotConfig {
    /// Should a default tracing logger be installed in the scope of the pass.
    pub install_tracing_logger: bool,
    /// Overrides the filesystem path baked into generated provenance decorations. When absent,
    /// the current working directory is captured at generation time.
    pub provenance_path: Option<String>,
}

impl Default for AotConfig {
    fn default() -> Self {
        Self {
            install_tracing_logger: true,
            provenance_path: None,
        }
    }
}

impl From<OptionalAotConfig> for AotConfig {
    fn from(value: OptionalAotConfig) -> Self {
        let default = Self::default();
        Self {
            install_tracing_logger: value
                .install_tracing_logger
                .unwrap_or(default.install_tracing_logger),
            provenance_path: value.provenance_path.or(default.provenance_path),
        }
    }
}

impl AotConfig {
    pub fn init_from_environment() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(CONFIG_ENV_PREFIX))
            .build()
            .and_then(|config| config.try_deserialize::<OptionalAotConfig>())
            .map(|config| config.into())
    }
}

#[derive(Deserialize)]
struct OptionalAotConfig {
    install_tracing_logger: Option<bool>,
    provenance_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use crate::config::{AotConfig, OptionalAotConfig};

    #[test]
    fn should_overlay_partial_config_over_defaults() {
        let config: AotConfig = OptionalAotConfig {
            install_tracing_logger: None,
            provenance_path: Some("/build".to_string()),
        }
        .into();

        assert!(config.install_tracing_logger);
        assert_eq!(config.provenance_path.as_deref(), Some("/build"));
    }
}
