pub mod http;

use anyhow::{Context, Result};
use std::path::PathBuf;

pub fn get_chatrelay_home() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os("CHATRELAY_HOME") {
        return Ok(PathBuf::from(home));
    }
    Ok(dirs::home_dir()
        .context("Could not determine home directory")?
        .join(".chatrelay"))
}

/// Shorten `text` to at most `max_chars` characters for log lines.
pub fn truncate_for_log(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}
