//! Configuration file support.
//!
//! Two configuration file locations are read:
//! - Global: `~/.config/mfront-interfaces/config.toml` - User-wide defaults
//! - Project: `.mfront/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::targets::ManifestFormat;

/// Default architecture switch passed to Code_Aster and Cyrano sources.
pub const DEFAULT_ARCH: u32 = 64;

/// Default time spent waiting for the resource lock.
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 30_000;

/// Generator configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Generation settings
    pub generation: GenerationConfig,

    /// Resource lock settings
    pub lock: LockConfig,

    /// Host specific settings
    pub hosts: HostsConfig,
}

/// Generation-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Emit debugging comments and traces in generated wrappers
    pub debug: Option<bool>,

    /// Default for `@<Host>GenerateMTestFileOnFailure`
    pub generate_mtest_on_failure: Option<bool>,

    /// Output directory, relative to the current directory
    pub output_dir: Option<PathBuf>,

    /// Build manifest format
    pub manifest_format: Option<ManifestFormat>,
}

/// Resource lock configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    /// Lock file path (defaults to the system temporary directory)
    pub path: Option<PathBuf>,

    /// Time spent waiting for another generator, in milliseconds
    pub timeout_ms: Option<u64>,
}

/// Host-specific configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostsConfig {
    /// Value of the `ASTER_ARCH` preprocessor switch
    pub aster_arch: Option<u32>,

    /// Value of the `CYRANO_ARCH` preprocessor switch
    pub cyrano_arch: Option<u32>,

    /// Cast3M installation, overridden by the `CASTEM_ROOT` environment variable
    pub castem_root: Option<PathBuf>,
}

impl HostsConfig {
    pub fn aster_arch(&self) -> u32 {
        self.aster_arch.unwrap_or(DEFAULT_ARCH)
    }

    pub fn cyrano_arch(&self) -> u32 {
        self.cyrano_arch.unwrap_or(DEFAULT_ARCH)
    }

    /// Cast3M installation directory.
    ///
    /// The `CASTEM_ROOT` environment variable, read at generation time,
    /// takes precedence over the configuration file.
    pub fn castem_root(&self) -> Option<PathBuf> {
        match std::env::var_os("CASTEM_ROOT") {
            Some(v) if !v.is_empty() => Some(PathBuf::from(v)),
            _ => self.castem_root.clone(),
        }
    }
}

impl LockConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.unwrap_or(DEFAULT_LOCK_TIMEOUT_MS))
    }

    /// Lock file path.
    pub fn lock_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("mfront-interfaces.lock"))
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents =
            toml::to_string_pretty(self).with_context(|| "failed to serialize config")?;
        crate::util::fs::write_string(path, &contents)
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        // Generation settings
        if other.generation.debug.is_some() {
            self.generation.debug = other.generation.debug;
        }
        if other.generation.generate_mtest_on_failure.is_some() {
            self.generation.generate_mtest_on_failure = other.generation.generate_mtest_on_failure;
        }
        if other.generation.output_dir.is_some() {
            self.generation.output_dir = other.generation.output_dir;
        }
        if other.generation.manifest_format.is_some() {
            self.generation.manifest_format = other.generation.manifest_format;
        }

        // Lock settings
        if other.lock.path.is_some() {
            self.lock.path = other.lock.path;
        }
        if other.lock.timeout_ms.is_some() {
            self.lock.timeout_ms = other.lock.timeout_ms;
        }

        // Host settings
        if other.hosts.aster_arch.is_some() {
            self.hosts.aster_arch = other.hosts.aster_arch;
        }
        if other.hosts.cyrano_arch.is_some() {
            self.hosts.cyrano_arch = other.hosts.cyrano_arch;
        }
        if other.hosts.castem_root.is_some() {
            self.hosts.castem_root = other.hosts.castem_root;
        }
    }
}

/// Get the global config directory (`~/.config/mfront-interfaces`).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "mfront-interfaces")
        .map(|d| d.config_dir().to_path_buf())
}

/// Get the global config path.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (`.mfront/config.toml`).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".mfront").join("config.toml")
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.mfront/config.toml)
/// 2. Global config
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        if global_path.exists() {
            config.merge(Config::load_or_default(global_path));
        }
    }

    // Project config overrides global
    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}
