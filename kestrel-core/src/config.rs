//! src/config.rs
//! ============================================================================
//! # Config: Application Configuration Loader and Saver
//!
//! Loads and saves user-editable settings as TOML from the cross-platform
//! config path resolved with the [`directories`](https://docs.rs/directories)
//! crate. A default file is written on first run so users have something to
//! edit.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use tokio::fs as TokioFs;

/// Navigation behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorConfig {
    /// Show dotfiles in directory listings.
    #[serde(default)]
    pub show_hidden: bool,

    /// Sort directories before files in listings.
    #[serde(default = "default_true")]
    pub sort_directories_first: bool,

    /// Directory opened on startup; `~` expands to the home directory.
    /// Falls back to the home directory when unset.
    #[serde(default)]
    pub default_directory: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            show_hidden: false,
            sort_directories_first: true,
            default_directory: None,
        }
    }
}

/// Main configuration struct for the application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub behavior: BehaviorConfig,
}

impl Config {
    /// Loads config from the TOML file at the XDG-compliant app config dir,
    /// writing the defaults there first if no file exists yet.
    pub async fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            info!("Loading config from {}", path.display());
            let text = TokioFs::read_to_string(&path).await?;
            let cfg: Self = toml::from_str(&text)?;

            Ok(cfg)
        } else {
            info!(
                "No config file found at {}, using default configuration. Creating it now.",
                path.display()
            );

            let default_config = Self::default();
            default_config.save().await?;

            Ok(default_config)
        }
    }

    /// Saves config to the TOML file at the XDG-compliant app config dir.
    pub async fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_path()?;

        info!("Saving config to {}", path.display());

        if let Some(parent) = path.parent() {
            TokioFs::create_dir_all(parent).await?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        TokioFs::write(&path, toml_str).await?;

        Ok(())
    }

    /// Returns the canonical config file path using `directories::ProjectDirs`.
    pub fn config_path() -> anyhow::Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "kestrel", "kestrel")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory."))?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Returns the directory log files are written to.
    pub fn log_dir() -> anyhow::Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "kestrel", "kestrel")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory."))?;
        Ok(proj_dirs.data_dir().join("logs"))
    }

    /// Resolve the startup directory: `default_directory` with a leading `~`
    /// expanded against `home`, or `home` itself when unset.
    pub fn resolve_start_dir(&self, home: &Path) -> PathBuf {
        match self.behavior.default_directory.as_deref() {
            Some(dir) if dir.starts_with('~') => {
                let rest = dir.trim_start_matches('~').trim_start_matches('/');
                if rest.is_empty() {
                    home.to_path_buf()
                } else {
                    home.join(rest)
                }
            }
            Some(dir) => PathBuf::from(dir),
            None => home.to_path_buf(),
        }
    }
}
