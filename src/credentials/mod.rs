pub mod prompt;

use anyhow::Result;
use log::debug;

/// Environment variable name for providing the API token without a prompt
pub const ENV_TOKEN_VAR: &str = "INSPECT_SCORE_TOKEN";

pub use prompt::prompt_for_token;

/// Check for an API token in the INSPECT_SCORE_TOKEN environment variable.
/// Returns Some(token) if the env var is set and non-empty, None otherwise.
pub fn get_token_from_env() -> Option<String> {
    std::env::var(ENV_TOKEN_VAR)
        .ok()
        .and_then(|val| non_empty(&val))
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Token from the environment, falling back to an interactive prompt
pub fn resolve_token() -> Result<String> {
    match get_token_from_env() {
        Some(token) => {
            debug!("Using API token from {}", ENV_TOKEN_VAR);
            Ok(token)
        }
        None => prompt_for_token(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty("  abc \n"), Some("abc".to_string()));
        assert_eq!(non_empty("   "), None);
        assert_eq!(non_empty(""), None);
    }
}
