pub mod init;
mod schema;

pub use init::run_init_wizard;
pub use schema::{ApiConfig, Config, DEFAULT_TIMEOUT_SECS};

use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::PathBuf;

use crate::drafts::check_key_part;

/// Environment variable that overrides `user_id` from the config file
pub const ENV_USER_VAR: &str = "INSPECT_SCORE_USER";

/// Get the config directory path (~/.config/inspect-score/)
pub fn get_config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("inspect-score"))
}

/// Get the default config file path (~/.config/inspect-score/config.yaml)
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.yaml"))
}

/// Ensure the directory holding `path` exists
pub fn ensure_parent_dir(path: &std::path::Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.exists() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory at {}", dir.display()))?;
        }
    }
    Ok(())
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses default path (~/.config/inspect-score/config.yaml)
///
/// A missing file at the default path yields the default configuration. A
/// missing file at an explicitly given path is an error.
///
/// # Errors
///
/// Returns an error if:
/// - An explicit config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let explicit = path.is_some();
    let config_path = match path {
        Some(p) => p,
        None => get_config_path()?,
    };

    if !config_path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", config_path.display());
        }
        debug!(
            "No config file at {}, using defaults",
            config_path.display()
        );
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content).with_context(|| {
        format!(
            "Failed to parse config: invalid YAML in {}",
            config_path.display()
        )
    })?;

    debug!("Loaded config from {}", config_path.display());
    Ok(config)
}

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(ref user) = config.user_id {
        if user.trim().is_empty() {
            errors.push("user_id: must not be empty".to_string());
        } else if user.contains(':') {
            errors.push(format!("user_id: must not contain ':' (got '{}')", user));
        }
    }

    if let Some(ref api) = config.api {
        if !(api.base_url.starts_with("http://") || api.base_url.starts_with("https://")) {
            errors.push(format!(
                "api.base_url: must start with http:// or https:// (got '{}')",
                api.base_url
            ));
        }
        if api.timeout_secs == Some(0) {
            errors.push("api.timeout_secs: must be positive".to_string());
        }
    }

    if let Some(ref weights) = config.weights {
        if let Err(e) = weights.validate() {
            errors.push(format!("weights: {}", e));
        }
    }

    if let Some(ref dir) = config.rubric_dir {
        if !dir.is_dir() {
            errors.push(format!("rubric_dir: {} is not a directory", dir.display()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Resolve the acting user: `INSPECT_SCORE_USER` first, then `user_id`.
///
/// Either source must be usable as part of a draft key.
pub fn resolve_user_id(config: &Config) -> Result<String> {
    let from_env = std::env::var(ENV_USER_VAR)
        .ok()
        .map(|user| user.trim().to_string())
        .filter(|user| !user.is_empty());

    let user = match from_env {
        Some(user) => user,
        None => config.user_id.clone().with_context(|| {
            format!(
                "No user configured. Run `inspect-score init` or set {}",
                ENV_USER_VAR
            )
        })?,
    };
    check_key_part("User id", &user)?;
    Ok(user)
}
