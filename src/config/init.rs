use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::Write;
use std::path::PathBuf;

use super::{ensure_parent_dir, get_config_path, ApiConfig, Config, DEFAULT_TIMEOUT_SECS};
use crate::prompt::{prompt, prompt_with_default, prompt_yes_no};
use crate::scoring::Weights;

/// Run the interactive init wizard to create a config file.
///
/// If `default_path` is Some, uses that as the config file path.
/// Otherwise, prompts the user with the default config path.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    println!();
    println!("inspect-score configuration");
    println!("===========================");
    println!();

    // 1. Who is filling the evaluations
    let user_id = loop {
        let input = prompt("Your inspector/user id: ")?;
        if input.is_empty() {
            println!("  User id is required.");
        } else if input.contains(':') {
            println!("  User id must not contain ':'. Try again.");
        } else {
            break input;
        }
    };

    // 2. Submission endpoint
    println!();
    println!("Submitted evaluations are sent to a REST endpoint.");
    let api = if prompt_yes_no("Configure the submission endpoint now?", true)? {
        let base_url = loop {
            let input = prompt("API base URL (e.g. https://inspections.example.org/api): ")?;
            if input.starts_with("http://") || input.starts_with("https://") {
                break input.trim_end_matches('/').to_string();
            }
            println!("  Invalid: must start with http:// or https://. Try again.");
        };
        let timeout_secs = loop {
            let default_timeout = DEFAULT_TIMEOUT_SECS.to_string();
            let input = prompt_with_default("Request timeout in seconds", &default_timeout)?;
            match input.parse::<u64>() {
                Ok(v) if v > 0 => break v,
                _ => println!("  Invalid: must be a positive whole number. Try again."),
            }
        };
        Some(ApiConfig {
            base_url,
            timeout_secs: Some(timeout_secs),
        })
    } else {
        None
    };

    // 3. Weights
    println!();
    println!("Items where both judgments apply split their marks between availability and quality.");
    let standard = prompt_yes_no("Use the standard split (availability 0.4, quality 0.6)?", true)?;
    let weights = if standard {
        None
    } else {
        let w = loop {
            let input = prompt_with_default("Availability weight (quality gets the rest)", "0.4")?;
            match input.parse::<f64>() {
                Ok(a) => match Weights::new(a, 1.0 - a) {
                    Ok(w) => break w,
                    Err(e) => println!("  {}. Try again.", e),
                },
                Err(_) => println!("  Invalid: must be a number between 0 and 1. Try again."),
            }
        };
        Some(w)
    };

    // 4. Config path
    let default_config_path = match default_path {
        Some(p) => p,
        None => get_config_path()?,
    };
    println!();
    let path_str = prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    if config_path.exists() {
        let overwrite = prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    // 5. Write config
    let config = Config {
        user_id: Some(user_id),
        api,
        weights,
        rubric_dir: None,
    };
    write_config(&config_path, &config)?;

    println!();
    println!("Config written to {}", config_path.display());
    println!("Run `inspect-score new <kind> <subject>` to start an evaluation.");

    Ok(())
}

/// Serialize `config` as YAML and replace the file at `path` atomically.
pub fn write_config(path: &std::path::Path, config: &Config) -> Result<()> {
    let yaml = serde_saphyr::to_string(config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    ensure_parent_dir(path)?;

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(yaml.as_bytes())
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    file.commit()
        .with_context(|| format!("Failed to save config to {}", path.display()))?;

    Ok(())
}
