use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use url::Url;

use crate::list::DEFAULT_PAGE_SIZE;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_IMAGE_URL: &str = "http://localhost:5000/";

/// Runtime settings. TOML file first, then `GREENTECH_*` environment overrides.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub api_base_url: String,
    /// Prefix for the relative image paths stored on records.
    pub image_base_url: String,
    /// Local store for the session token; platform data dir when unset.
    pub database_url: Option<String>,
    pub page_size: usize,
    pub request_timeout_secs: Option<u64>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            image_base_url: DEFAULT_IMAGE_URL.to_string(),
            database_url: None,
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout_secs: None,
        }
    }
}

impl AdminConfig {
    /// Read `path` (or the default config file when it exists) and apply env overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => Some(p.to_path_buf()),
            None => default_config_path().filter(|p| p.is_file()),
        };
        let mut config = match file {
            Some(p) => Self::from_file(&p)?,
            None => Self::default(),
        };
        config.apply_env(|k| std::env::var(k).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config: {}", path.display()))
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let var = |k: &str| lookup(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        if let Some(v) = var("GREENTECH_API_URL") {
            self.api_base_url = v;
        }
        if let Some(v) = var("GREENTECH_IMAGE_URL") {
            self.image_base_url = v;
        }
        if let Some(v) = var("GREENTECH_DATABASE_URL") {
            self.database_url = Some(v);
        }
        if let Some(v) = var("GREENTECH_PAGE_SIZE") {
            self.page_size = v
                .parse()
                .with_context(|| format!("GREENTECH_PAGE_SIZE is not a number: {v}"))?;
        }
        if let Some(v) = var("GREENTECH_TIMEOUT_SECS") {
            let secs = v
                .parse()
                .with_context(|| format!("GREENTECH_TIMEOUT_SECS is not a number: {v}"))?;
            self.request_timeout_secs = Some(secs);
        }
        if self.page_size == 0 {
            self.page_size = DEFAULT_PAGE_SIZE;
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> { self.request_timeout_secs.map(Duration::from_secs) }

    /// Absolute URL for a stored image path such as `uploads/hero/1.png`.
    pub fn image_url(&self, path: &str) -> Result<Url> {
        if let Ok(abs) = Url::parse(path) {
            return Ok(abs);
        }
        let mut base = self.image_base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base)
            .with_context(|| format!("invalid image base URL `{}`", self.image_base_url))?;
        base.join(path.trim_start_matches('/'))
            .with_context(|| format!("invalid image path `{path}`"))
    }
}

fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "greentech", "greentech-admin")
        .map(|p| p.config_dir().join("config.toml"))
}
