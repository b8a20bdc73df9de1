//! # Configuration
//!
//! TOML configuration for the builder, the render toggles and the entity
//! kinds.
//!
//! ```toml
//! [builder]
//! max_passenger_depth = 8
//!
//! [render]
//! pick_block_enabled = true
//!
//! [[kinds]]
//! id = "boat"
//! width = 1.375
//! height = 0.5625
//! mounted_y_offset = -0.1
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::context::RenderSettings;
use crate::error::{ConfigError, ConfigResult};
use crate::registry::{EntityRegistry, KindSpec};

/// Default limit on passenger nesting.
pub const DEFAULT_MAX_PASSENGER_DEPTH: usize = 32;

fn default_max_passenger_depth() -> usize {
    DEFAULT_MAX_PASSENGER_DEPTH
}

/// Tree builder limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// Deepest passenger accepted; the root is depth 0.
    #[serde(default = "default_max_passenger_depth")]
    pub max_passenger_depth: usize,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            max_passenger_depth: DEFAULT_MAX_PASSENGER_DEPTH,
        }
    }
}

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemataConfig {
    /// Tree builder limits.
    #[serde(default)]
    pub builder: BuilderConfig,
    /// Render toggles.
    #[serde(default)]
    pub render: RenderSettings,
    /// Data-driven entity kinds.
    #[serde(default)]
    pub kinds: Vec<KindSpec>,
}

impl SchemataConfig {
    /// Parses and validates a configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for bad TOML and `ConfigError::Invalid`
    /// for values that fail [`Self::validate`].
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read, otherwise as
    /// [`Self::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!("Loaded config from {} ({} kinds)", path.display(), config.kinds.len());
        Ok(config)
    }

    /// Checks limits and kinds.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for a zero depth cap, an invalid kind
    /// or a kind id listed twice.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.builder.max_passenger_depth == 0 {
            return Err(ConfigError::Invalid(
                "builder.max_passenger_depth must be at least 1".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for kind in &self.kinds {
            kind.validate()?;
            if !seen.insert(kind.id.as_str()) {
                return Err(ConfigError::Invalid(format!("kind {} listed twice", kind.id)));
            }
        }
        Ok(())
    }

    /// Builds the entity registry from the configured kinds.
    ///
    /// # Errors
    ///
    /// Returns an error if a kind is invalid.
    pub fn build_registry(&self) -> ConfigResult<EntityRegistry> {
        EntityRegistry::from_specs(self.kinds.iter().cloned())
    }
}
