use anyhow::{Context, Result};

/// Prompts user to enter the API token used for submissions
pub fn prompt_for_token() -> Result<String> {
    println!("An API token is required to submit evaluations.");
    println!(
        "Ask your administrator for one, or set {} to skip this prompt.",
        super::ENV_TOKEN_VAR
    );
    println!();

    let token = rpassword::prompt_password("Enter token: ")
        .context("Failed to read token from terminal")?;

    let token = token.trim();

    if token.is_empty() {
        anyhow::bail!("Token cannot be empty");
    }

    Ok(token.to_string())
}
