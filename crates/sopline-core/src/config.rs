use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Switches the client factory to the in-memory mock.
pub const ENV_DEV_MOCK: &str = "SOPLINE_DEV_MOCK";
/// Hosted backend URL.
pub const ENV_BACKEND_URL: &str = "SOPLINE_URL";
pub const ENV_STARTER_PRICE_ID: &str = "STRIPE_STARTER_PRICE_ID";
pub const ENV_PRO_PRICE_ID: &str = "STRIPE_PRO_PRICE_ID";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub billing: BillingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Serve every client from the in-memory record store.
    #[serde(default)]
    pub dev_mock: bool,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingConfig {
    #[serde(default)]
    pub starter_price_id: Option<String>,
    #[serde(default)]
    pub pro_price_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub project: ProjectConfig,
    pub user: UserConfig,
}

#[must_use]
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".sopline/config.toml")
}

/// `<config_dir>/sopline/config.toml`, when the platform has a config dir.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sopline/config.toml"))
}

pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_config_path(project_root);
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn load_user_config() -> Result<UserConfig> {
    let Some(path) = user_config_path() else {
        return Ok(UserConfig::default());
    };
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Overlay environment variables on file configuration.
///
/// `lookup` is `std::env::var` in production; tests pass a closure over a
/// fixed map.
#[must_use]
pub fn apply_env_overrides(
    mut project: ProjectConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> ProjectConfig {
    if let Some(raw) = lookup(ENV_DEV_MOCK) {
        project.backend.dev_mock = parse_flag(&raw);
    }
    if let Some(url) = lookup(ENV_BACKEND_URL).filter(|url| !url.trim().is_empty()) {
        project.backend.url = Some(url);
    }
    if let Some(id) = lookup(ENV_STARTER_PRICE_ID).filter(|id| !id.is_empty()) {
        project.billing.starter_price_id = Some(id);
    }
    if let Some(id) = lookup(ENV_PRO_PRICE_ID).filter(|id| !id.is_empty()) {
        project.billing.pro_price_id = Some(id);
    }
    project
}

/// Project config with environment overrides applied, plus the user config.
///
/// The output mode is not decided here; the CLI owns that precedence.
///
/// # Errors
///
/// Returns an error if either config file exists but cannot be read or parsed.
pub fn resolve_config(project_root: &Path) -> Result<EffectiveConfig> {
    let project = apply_env_overrides(load_project_config(project_root)?, |key| env::var(key).ok());
    let user = load_user_config()?;
    Ok(EffectiveConfig { project, user })
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on")
}
