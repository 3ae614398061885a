//! Registry configuration (reflex.toml)
//!
//! ```toml
//! [registry]
//! first_module_id = 10000
//! max_parameters = 16
//! strict_enum_values = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default first module id
pub const DEFAULT_FIRST_MODULE_ID: u32 = 10000;

/// Default upper bound on signature parameter counts
pub const DEFAULT_MAX_PARAMETERS: usize = 16;

/// Tunables of a [`ClassRegistry`](crate::ClassRegistry)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RegistryOptions {
    /// First id handed out by `unique_module_id`
    pub first_module_id: u32,

    /// Largest parameter count accepted for functions, constructors, events and slots
    pub max_parameters: usize,

    /// Reject typed writes of values missing from an enum table
    pub strict_enum_values: bool,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            first_module_id: DEFAULT_FIRST_MODULE_ID,
            max_parameters: DEFAULT_MAX_PARAMETERS,
            strict_enum_values: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    registry: RegistryOptions,
}

impl RegistryOptions {
    /// Load options from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse options from a TOML string
    ///
    /// A missing `[registry]` table yields the defaults.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        file.registry.validate()?;
        Ok(file.registry)
    }

    /// Validate the options
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.first_module_id == 0 {
            return Err(ConfigError::ValidationError(
                "first_module_id must be greater than zero".to_string(),
            ));
        }
        if self.max_parameters == 0 {
            return Err(ConfigError::ValidationError(
                "max_parameters must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
