//! Line-based terminal prompts shared by the config wizard and the
//! evaluation form.

use anyhow::{Context, Result};
use std::io::{BufRead, Write};

use crate::scoring::BinaryMark;

/// Prompt user with a message and return their trimmed input.
pub fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout()
        .flush()
        .context("Failed to flush stdout")?;
    let mut input = String::new();
    let read = std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    if read == 0 {
        anyhow::bail!("Input closed");
    }
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
pub fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
pub fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// Interpret a judgment answer. Empty input keeps `current`.
pub fn parse_judgment(input: &str, current: BinaryMark) -> Option<BinaryMark> {
    match input.trim().to_lowercase().as_str() {
        "" => Some(current),
        "y" | "yes" => Some(BinaryMark::YES),
        "n" | "no" => Some(BinaryMark::NO),
        other => other.parse().ok(),
    }
}

/// Ask for a 0/1 judgment until a valid answer is given.
pub fn prompt_judgment(message: &str, current: BinaryMark) -> Result<BinaryMark> {
    loop {
        let input = prompt(&format!("{} (1/0, y/n) [{}]: ", message, current))?;
        match parse_judgment(&input, current) {
            Some(mark) => return Ok(mark),
            None => println!("  Invalid: answer 1 or 0. Try again."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_judgment() {
        assert_eq!(parse_judgment("", BinaryMark::YES), Some(BinaryMark::YES));
        assert_eq!(parse_judgment("Y", BinaryMark::NO), Some(BinaryMark::YES));
        assert_eq!(parse_judgment("no", BinaryMark::YES), Some(BinaryMark::NO));
        assert_eq!(parse_judgment("1", BinaryMark::NO), Some(BinaryMark::YES));
        assert_eq!(parse_judgment("0", BinaryMark::YES), Some(BinaryMark::NO));
        assert_eq!(parse_judgment("2", BinaryMark::NO), None);
        assert_eq!(parse_judgment("maybe", BinaryMark::NO), None);
    }
}
