//! src/config.rs
//! ============================================================================
//! # Config: Console Configuration Loader and Saver
//!
//! Manages all user-editable settings for the workforce console. Loads and
//! saves settings as TOML from the proper cross-platform config path using
//! the [`directories`](https://docs.rs/directories) crate.
//!
//! ## Features
//! - XDG-compliant config discovery and writing (Linux, macOS, Windows)
//! - Defaulting with write-back when no config file exists
//! - Per-screen shortcut tables and expansion policy
//! - Icon overrides checked against the closed icon table at load time
//!
//! ## Example
//! ```rust,ignore
//! let config = Config::load().await?;
//! config.save().await?;
//! ```

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::info;

use tokio::fs as TokioFs;

use crate::{
    error::AppError,
    model::{
        list_item::ItemStatus,
        shortcuts::ShortcutMap,
        status::{EmployeeStatus, RequestStatus},
    },
    navigation::{
        icons::Icon,
        menu::{MenuTree, ModuleId},
    },
};

/// Console color scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Default,

    Light,

    Dark,
}

/// Per-screen behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenConfig {
    /// Expanding a row collapses every other row.
    pub single_expansion: bool,

    /// Letter -> status code.
    pub shortcuts: BTreeMap<String, String>,
}

impl ScreenConfig {
    fn new<S: ItemStatus>(single_expansion: bool, bindings: &[(&str, S)]) -> Self {
        Self {
            single_expansion,
            shortcuts: bindings
                .iter()
                .map(|(key, status)| ((*key).to_string(), status.code().to_string()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreensConfig {
    pub regularization: ScreenConfig,
    pub shift_swap: ScreenConfig,
    pub employees: ScreenConfig,
}

impl Default for ScreensConfig {
    fn default() -> Self {
        let approvals = [("A", RequestStatus::Approved), ("R", RequestStatus::Rejected)];
        Self {
            regularization: ScreenConfig::new(true, &approvals),
            shift_swap: ScreenConfig::new(true, &approvals),
            employees: ScreenConfig::new(
                false,
                &[
                    ("A", EmployeeStatus::Active),
                    ("L", EmployeeStatus::OnLeave),
                    ("I", EmployeeStatus::Inactive),
                ],
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub dir: PathBuf,

    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
            level: "info".to_string(),
        }
    }
}

/// Main configuration struct for the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub theme: Theme,

    /// Module whose menu the sidebar shows at start-up.
    pub active_module: ModuleId,

    /// Rows per page in every list screen.
    pub page_size: usize,

    /// Simulated backend latency for bulk-transition sync.
    #[serde(with = "humantime_serde")]
    pub sync_latency: Duration,

    /// JSON seed file; the compiled-in seed is used when unset.
    #[serde(default)]
    pub data_file: Option<PathBuf>,

    pub export_dir: PathBuf,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub screens: ScreensConfig,

    /// Route -> icon name overrides for the sidebar.
    #[serde(default)]
    pub menu_icons: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::Default,
            active_module: ModuleId::TimeSync,
            page_size: 12,
            sync_latency: Duration::from_millis(600),
            data_file: None,
            export_dir: PathBuf::from("exports"),
            logging: LoggingConfig::default(),
            screens: ScreensConfig::default(),
            menu_icons: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Loads config from TOML file at the XDG-compliant app config dir, or returns defaults.
    ///
    /// The config is expected at `$XDG_CONFIG_HOME/FlexiHQ/config.toml`
    /// (Linux), or equivalent on Windows/macOS.
    pub async fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            Ok(Self::load_from(&path).await?)
        } else {
            info!(
                "No config file found at {}, using default configuration. Creating it now.",
                path.display()
            );

            let default_config = Self::default();
            default_config.save_to(&path).await?;

            Ok(default_config)
        }
    }

    /// Load and validate a config file at an explicit path.
    pub async fn load_from(path: &Path) -> Result<Self, AppError> {
        info!("Loading config from {}", path.display());

        let text = TokioFs::read_to_string(path)
            .await
            .map_err(|e| AppError::file_io(path, e))?;
        let cfg: Self = toml::from_str(&text)?;
        cfg.validate()?;

        Ok(cfg)
    }

    /// Saves config to TOML file at the XDG-compliant app config dir.
    pub async fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_path()?;
        self.save_to(&path).await?;
        Ok(())
    }

    pub async fn save_to(&self, path: &Path) -> Result<(), AppError> {
        info!("Saving config to {}", path.display());

        if let Some(parent) = path.parent() {
            TokioFs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::file_io(parent, e))?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        TokioFs::write(path, toml_str)
            .await
            .map_err(|e| AppError::file_io(path, e))?;

        Ok(())
    }

    /// Reject settings that parse but cannot be used: zero page size,
    /// malformed shortcut tables, unknown icons or routes.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.page_size == 0 {
            return Err(AppError::InvalidConfig("page_size must be at least 1".into()));
        }

        ShortcutMap::<RequestStatus>::from_codes(&self.screens.regularization.shortcuts, "regularization")?;
        ShortcutMap::<RequestStatus>::from_codes(&self.screens.shift_swap.shortcuts, "shift_swap")?;
        ShortcutMap::<EmployeeStatus>::from_codes(&self.screens.employees.shortcuts, "employees")?;

        let menu = MenuTree::standard();
        for (route, icon) in &self.menu_icons {
            Icon::from_str(icon)?;
            if menu.entry_by_route(route).is_none() {
                return Err(AppError::InvalidConfig(format!(
                    "menu_icons: no menu entry for route '{route}'"
                )));
            }
        }

        Ok(())
    }

    /// Returns the canonical config file path using `directories::ProjectDirs`.
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the config directory (without filename).
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "flexi", "FlexiHQ")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory."))?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_icon_typo_rejected() {
        let mut cfg = Config::default();
        cfg.menu_icons
            .insert("/hq/employees".into(), "userz".into());

        assert!(matches!(cfg.validate(), Err(AppError::UnknownIcon(_))));

        cfg.menu_icons
            .insert("/hq/employees".into(), "users".into());
        assert!(cfg.validate().is_ok());

        cfg.menu_icons.insert("/hq/nowhere".into(), "users".into());
        assert!(matches!(cfg.validate(), Err(AppError::InvalidConfig(_))));
    }

    #[test]
    fn test_reserved_shortcut_rejected() {
        let mut cfg = Config::default();
        cfg.screens
            .employees
            .shortcuts
            .insert("Q".into(), "INACTIVE".into());

        assert!(matches!(cfg.validate(), Err(AppError::InvalidShortcut { .. })));
    }

    #[tokio::test]
    async fn test_save_then_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.page_size = 25;
        cfg.screens.regularization.single_expansion = false;
        cfg.save_to(&path).await.unwrap();

        let loaded = Config::load_from(&path).await.unwrap();
        assert_eq!(loaded, cfg);
    }

    #[tokio::test]
    async fn test_partial_file_falls_back_to_section_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        tokio::fs::write(
            &path,
            "theme = \"dark\"\nactive_module = \"flexi_hq\"\npage_size = 5\nsync_latency = \"250ms\"\nexport_dir = \"out\"\n",
        )
        .await
        .unwrap();

        let loaded = Config::load_from(&path).await.unwrap();
        assert_eq!(loaded.theme, Theme::Dark);
        assert_eq!(loaded.active_module, ModuleId::FlexiHq);
        assert_eq!(loaded.sync_latency, Duration::from_millis(250));
        assert_eq!(loaded.screens, ScreensConfig::default());
    }
}
