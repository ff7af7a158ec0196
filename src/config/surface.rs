use serde::Deserialize;
use serde::Serialize;

use super::validate_entry_name;
use crate::constants::DEFAULT_ROOT_DIR;
use crate::constants::SHELL_DEFAULT_NAME;
use crate::Result;

/// Inspection tree layout
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SurfaceConfig {
    /// Top-level directory holding every inspection entry
    #[serde(default = "default_root_dir")]
    pub root_dir: String,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
        }
    }
}

impl SurfaceConfig {
    pub fn validate(&self) -> Result<()> {
        validate_entry_name(&self.root_dir, "surface.root_dir")
    }
}

fn default_root_dir() -> String {
    DEFAULT_ROOT_DIR.to_string()
}

/// Synthetic operator-driven client
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ShellClientConfig {
    /// Name the shell client registers under with the scaling framework
    #[serde(default = "default_shell_name")]
    pub name: String,
}

impl Default for ShellClientConfig {
    fn default() -> Self {
        Self {
            name: default_shell_name(),
        }
    }
}

impl ShellClientConfig {
    pub fn validate(&self) -> Result<()> {
        validate_entry_name(&self.name, "shell_client.name")
    }
}

fn default_shell_name() -> String {
    SHELL_DEFAULT_NAME.to_string()
}
