use crate::domain::{CardLayout, LinkTarget, SortingOption};
use crate::settings::ConfigDefaults;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const BUILTIN_CONFIG: &str = include_str!("default_config.toml");

/// A catalog entry as written in the config file. `href` and `title` are
/// optional here so one bad record cannot reject the whole file; the catalog
/// drops incomplete records when it is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkRecord {
    pub href: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub company_name: Option<String>,
    pub company_logo: Option<String>,
    pub github_edit_url: Option<String>,
    pub category_sorting: Option<SortingOption>,
    pub link_sorting: Option<SortingOption>,
    pub categories: Vec<String>,
    pub grid_columns: Option<u16>,
    pub card_layout: Option<CardLayout>,
    pub link_target: Option<LinkTarget>,
    pub links: Vec<LinkRecord>,
}

impl AppConfig {
    /// Sample catalog used when no config file exists yet.
    pub fn builtin() -> Self {
        // The bundled file is covered by a unit test, so an empty config is
        // only reachable if that test is failing.
        toml::from_str(BUILTIN_CONFIG).unwrap_or_default()
    }

    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => config_path()?,
        };
        if !path.exists() {
            tracing::info!(path = %path.display(), "no config file, using built-in catalog");
            return Ok(Self::builtin());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        let parsed = toml::from_str::<AppConfig>(&raw)
            .with_context(|| format!("failed to parse config: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            links = parsed.links.len(),
            "loaded config"
        );
        Ok(parsed)
    }

    pub fn defaults(&self) -> ConfigDefaults {
        ConfigDefaults {
            grid_columns: self.grid_columns,
            card_layout: self.card_layout,
            link_target: self.link_target,
            link_sorting: self.link_sorting,
            category_sorting: self.category_sorting,
            categories: self.categories.clone(),
        }
    }

    pub fn title(&self) -> String {
        match self.company_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => format!("{name} Resource Hub"),
            _ => "Resource Hub".to_string(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let base = dirs::config_dir().context("could not resolve config directory")?;
    Ok(base.join("resource-hub").join("config.toml"))
}
