use serde::Serialize;

use crate::models::operation::FileAction;

#[derive(Debug, thiserror::Error)]
pub enum FileManagerError {
    #[error("Failed to load directory: {0}")]
    List(String),

    #[error("Failed to read file: {0}")]
    Read(String),

    #[error("Failed to save file: {0}")]
    Write(String),

    #[error("Failed to {} {target}: {message}", action.verb())]
    Operation {
        action: FileAction,
        target: String,
        message: String,
    },

    #[error("Failed to upload {file}: {message}")]
    Upload { file: String, message: String },

    #[error("Failed to download {file}: {message}")]
    Download { file: String, message: String },

    #[error("Cannot {} {name}: {reason}", action.verb())]
    Rejected {
        action: FileAction,
        name: String,
        reason: String,
    },

    #[error("{0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl FileManagerError {
    pub fn operation(action: FileAction, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Operation {
            action,
            target: target.into(),
            message: message.into(),
        }
    }

    pub fn rejected(action: FileAction, name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            action,
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

impl Serialize for FileManagerError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
