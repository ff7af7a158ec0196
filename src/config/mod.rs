//! Configuration management for the bus debug service.
//!
//! Provides hierarchical configuration loading and validation with:
//! - Default values as code base
//! - Environment variable overrides
//! - Configuration file support
//! - Component-wise validation
mod buffer;
mod command;
mod log;
mod surface;
pub use buffer::*;
pub use command::*;
pub use log::*;
pub use surface::*;

use std::env;
use std::fmt::Debug;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Environment variable prefix, e.g. `BUSDBG__BUFFER__CAPACITY=8192`
pub(crate) const ENV_PREFIX: &str = "BUSDBG";

/// Main configuration container for the inspection service
///
/// Combines all subsystem configurations with hierarchical override support:
/// 1. Default values from code implementation
/// 2. Configuration file specified by `CONFIG_PATH`
/// 3. Environment variables (highest priority)
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct BusDbgConfig {
    /// Display buffer sizing shared by clients, fabrics and the rules file
    #[serde(default)]
    pub buffer: BufferConfig,
    /// Inspection tree naming
    #[serde(default)]
    pub surface: SurfaceConfig,
    /// Synthetic operator-driven client
    #[serde(default)]
    pub shell_client: ShellClientConfig,
    /// Update-request text protocol
    #[serde(default)]
    pub command: CommandConfig,
    /// Log output of the operator binary
    #[serde(default)]
    pub log: LogConfig,
}

impl Debug for BusDbgConfig {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("BusDbgConfig")
            .field("buffer", &self.buffer)
            .field("surface", &self.surface)
            .field("shell_client", &self.shell_client)
            .field("command", &self.command)
            .field("log", &self.log)
            .finish()
    }
}

impl BusDbgConfig {
    /// Loads configuration from hierarchical sources without validation.
    ///
    /// Configuration sources are merged in the following order (later sources override earlier):
    /// 1. Type defaults (lowest priority)
    /// 2. Configuration file from `CONFIG_PATH` environment variable (if set)
    /// 3. Environment variables with `BUSDBG__` prefix (highest priority)
    ///
    /// # Note
    /// Validation is deferred so further overrides can be applied with
    /// `with_override_config()`. Callers MUST call `validate()` before use.
    ///
    /// # Examples
    /// ```ignore
    /// std::env::set_var("BUSDBG__BUFFER__CAPACITY", "8192");
    /// let cfg = BusDbgConfig::new()?.validate()?;
    /// ```
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .ignore_empty(true)
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Applies additional configuration overrides from file without validation.
    ///
    /// Merging order (later sources override earlier):
    /// 1. Current configuration values
    /// 2. New configuration file
    /// 3. Latest environment variables (highest priority)
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Validates configuration and returns validated instance.
    pub fn validate(self) -> Result<Self> {
        self.buffer.validate()?;
        self.surface.validate()?;
        self.shell_client.validate()?;
        self.log.validate()?;
        Ok(self)
    }
}

/// Names become inspection entries, so they must be single path components.
pub(crate) fn validate_entry_name(
    value: &str,
    field: &str,
) -> Result<()> {
    if value.is_empty() {
        return Err(Error::InvalidConfig(format!("{field} cannot be empty")));
    }
    if value.contains('/') {
        return Err(Error::InvalidConfig(format!(
            "{field} must not contain '/': {value}"
        )));
    }
    Ok(())
}
