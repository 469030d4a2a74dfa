use crate::core::analytics::{GroupBy, SummaryOptions};
use crate::core::expense::{CategoryRef, Session};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

/// Environment variable holding the access token for a remote store.
pub const ACCESS_TOKEN_ENV: &str = "XPENSE_ACCESS_TOKEN";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct RemoteStoreConfig {
    pub base_url: String,
    pub api_key: String,
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreConfig {
    #[default]
    Local,
    Remote(RemoteStoreConfig),
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub user_id: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub group_by: GroupBy,
    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryRef>,
    pub data_path: Option<String>,
}

fn default_currency() -> String {
    "$".to_string()
}

pub fn default_categories() -> Vec<CategoryRef> {
    [
        ("food", "Food", "#FF6384", "🍔"),
        ("transport", "Transport", "#36A2EB", "🚗"),
        ("shopping", "Shopping", "#FFCE56", "🛍️"),
        ("entertainment", "Entertainment", "#4BC0C0", "🎬"),
        ("bills", "Bills", "#9966FF", "💡"),
        ("health", "Health", "#FF9F40", "💊"),
        ("other", "Other", "#C9CBCF", "📦"),
    ]
    .into_iter()
    .map(|(id, name, color, icon)| CategoryRef::new(name, color, icon).with_id(id))
    .collect()
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "xpense", "xpense")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("in", "xpense", "xpense")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        if config.user_id.trim().is_empty() {
            anyhow::bail!("Config file {} has an empty user_id", path.as_ref().display());
        }
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Session for the configured user. A token in the environment takes
    /// precedence over one in the file.
    pub fn session(&self) -> Session {
        let session = Session::new(&self.user_id);
        let token = std::env::var(ACCESS_TOKEN_ENV).ok().or_else(|| match &self.store {
            StoreConfig::Remote(remote) => remote.access_token.clone(),
            StoreConfig::Local => None,
        });
        match token {
            Some(token) => session.with_access_token(&token),
            None => session,
        }
    }

    pub fn summary_options(&self) -> SummaryOptions {
        SummaryOptions {
            group_by: self.group_by,
        }
    }

    /// Looks up a configured category by name, ignoring case.
    pub fn find_category(&self, name: &str) -> Option<&CategoryRef> {
        self.categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
    }
}
