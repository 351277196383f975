pub mod file;

use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Structured input from `--input <file>` if given, else from piped stdin.
/// `None` when neither is available.
pub fn read_structured<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return Ok(Some(file::read_input(path)?));
    }
    match read_stdin()? {
        // YAML is a superset of JSON, so one parser covers both
        Some(text) => Ok(Some(
            serde_yaml::from_str(&text).map_err(|e| format!("Failed to parse stdin: {e}"))?,
        )),
        None => Ok(None),
    }
}

/// Piped stdin as text; `None` for an interactive terminal or empty input.
fn read_stdin() -> io::Result<Option<String>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Ok(Some(trimmed.to_string()))
}
