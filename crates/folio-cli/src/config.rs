use std::path::{Path, PathBuf};

use folio_core::BootstrapAdmin;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const ENV_TOKEN_SECRET: &str = "FOLIO_TOKEN_SECRET";
pub const ENV_MODE: &str = "FOLIO_MODE";
pub const ENV_ADMIN_EMAIL: &str = "FOLIO_ADMIN_EMAIL";
pub const ENV_ADMIN_PASSWORD: &str = "FOLIO_ADMIN_PASSWORD";
pub const ENV_ADMIN_NAME: &str = "FOLIO_ADMIN_NAME";

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FolioConfig {
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub server: ServerSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StoreSection {
    pub path: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default)]
    pub mode: RunMode,
}

/// Development mode allows well-known bootstrap credentials; production
/// requires them to be supplied.
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Development,
    #[default]
    Production,
}

impl RunMode {
    pub fn parse(value: &str) -> anyhow::Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(RunMode::Development),
            "production" | "prod" => Ok(RunMode::Production),
            other => Err(anyhow::anyhow!(
                "Invalid {} value: {} (use development or production)",
                ENV_MODE,
                other
            )),
        }
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_store_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("store"))
}

/// Read the config file, or defaults when it does not exist.
pub fn read_config(path: &Path) -> anyhow::Result<FolioConfig> {
    if !path.exists() {
        return Ok(FolioConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Some(value) = env_value("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(value).join("folio"));
    }
    Ok(home_dir()?.join(".config").join("folio"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Some(value) = env_value("XDG_DATA_HOME") {
        return Ok(PathBuf::from(value).join("folio"));
    }
    Ok(home_dir()?.join(".local").join("share").join("folio"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}

/// A non-blank environment variable.
pub fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

/// The run mode from `FOLIO_MODE`, falling back to the config file.
pub fn resolve_mode(config: &FolioConfig) -> anyhow::Result<RunMode> {
    match env_value(ENV_MODE) {
        Some(value) => RunMode::parse(&value),
        None => Ok(config.server.mode),
    }
}

/// The token signing secret. Its absence is fatal at startup.
pub fn require_token_secret() -> anyhow::Result<String> {
    env_value(ENV_TOKEN_SECRET).ok_or_else(|| {
        anyhow::anyhow!(
            "{} is not set. A token signing secret is required to start.",
            ENV_TOKEN_SECRET
        )
    })
}

/// Bootstrap admin credentials from the environment.
///
/// In development mode missing values fall back to the well-known defaults;
/// in production the email and password must be set.
pub fn resolve_bootstrap_admin(mode: RunMode) -> anyhow::Result<BootstrapAdmin> {
    let email = env_value(ENV_ADMIN_EMAIL);
    let password = env_value(ENV_ADMIN_PASSWORD);
    let name =
        env_value(ENV_ADMIN_NAME).unwrap_or_else(|| BootstrapAdmin::DEFAULT_NAME.to_string());

    match (email, password, mode) {
        (Some(email), Some(password), _) => Ok(BootstrapAdmin::new(email, password, name)),
        (email, password, RunMode::Development) => {
            warn!("Bootstrap admin credentials not fully set; using development defaults");
            let defaults = BootstrapAdmin::development_default();
            Ok(BootstrapAdmin::new(
                email.unwrap_or(defaults.email),
                password.unwrap_or(defaults.password),
                name,
            ))
        }
        (_, _, RunMode::Production) => Err(anyhow::anyhow!(
            "{} and {} must be set in production mode",
            ENV_ADMIN_EMAIL,
            ENV_ADMIN_PASSWORD
        )),
    }
}
