use crate::error::FileManagerError;
use crate::remote_path::is_within_scope;

const FORBIDDEN_NAME_CHARS: &[char] = &['/', '\\', '\0'];

pub fn validate_entry_name(name: &str) -> Result<(), FileManagerError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(FileManagerError::InvalidInput("name is empty".to_string()));
    }

    if trimmed == "." || trimmed == ".." {
        return Err(FileManagerError::InvalidInput(format!(
            "'{trimmed}' is not a valid name"
        )));
    }

    if let Some(c) = trimmed.chars().find(|c| FORBIDDEN_NAME_CHARS.contains(c)) {
        return Err(FileManagerError::InvalidInput(format!(
            "name contains forbidden character: {}",
            c.escape_default()
        )));
    }

    Ok(())
}

/// Rejects moving or copying a directory into itself or one of its children.
pub fn validate_transfer_target(from: &str, to: &str, is_directory: bool) -> Result<(), FileManagerError> {
    if from == to {
        return Err(FileManagerError::InvalidInput(
            "source and destination are the same".to_string(),
        ));
    }

    if is_directory && is_within_scope(to, from) {
        return Err(FileManagerError::InvalidInput(format!(
            "cannot place {from} inside itself"
        )));
    }

    Ok(())
}

/// Accepts an octal permission mode such as `755` or `0644`.
pub fn validate_mode(mode: &str) -> Result<(), FileManagerError> {
    let mode = mode.trim();
    let valid_len = (3..=4).contains(&mode.len());
    if !valid_len || !mode.chars().all(|c| ('0'..='7').contains(&c)) {
        return Err(FileManagerError::InvalidInput(format!(
            "invalid permission mode '{mode}' (expected octal such as 755)"
        )));
    }
    Ok(())
}
