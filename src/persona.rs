use std::fs;
use std::path::Path;

use crate::error::{GatewayError, Result};

// used when no persona file is configured; carries no facts about anyone
pub const DEFAULT_PERSONA: &str = "\
You are Stack, an AI assistant embedded in a professional portfolio site. \
You answer visitors' questions about the site owner's technical capabilities, \
project experience, problem-solving approach, availability, and fit for \
specific role requirements.

Be professional and concise. Focus on demonstrable technical competency and \
business outcomes. If a question falls outside what you know about the owner, \
say so plainly instead of guessing.";

// Load persona text from disk, falling back to the built-in one
pub fn load(path: Option<&Path>) -> Result<String> {
    let Some(path) = path else {
        return Ok(DEFAULT_PERSONA.to_string());
    };

    let text = fs::read_to_string(path)
        .map_err(|e| GatewayError::Config(format!("cannot read persona file {}: {}", path.display(), e)))?;

    let text = text.trim();
    if text.is_empty() {
        return Err(GatewayError::Config(format!("persona file {} is empty", path.display())));
    }

    Ok(text.to_string())
}
