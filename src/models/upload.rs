use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::FileManagerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    Pending,
    Uploading,
    Complete,
    Error,
}

impl UploadStatus {
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Complete | Self::Error)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadTask {
    pub id: Uuid,
    pub file_name: String,
    pub size: u64,
    /// Percentage in `0..=100`.
    pub progress: u8,
    pub status: UploadStatus,
    pub error: Option<String>,
}

impl UploadTask {
    pub fn pending(file: &UploadFile) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_name: file.name.clone(),
            size: file.data.len() as u64,
            progress: 0,
            status: UploadStatus::Pending,
            error: None,
        }
    }
}

/// A local file picked or dropped by the user, held in memory until uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub data: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, FileManagerError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| {
                FileManagerError::InvalidInput(format!("not a file path: {}", path.display()))
            })?;
        let data = tokio::fs::read(path).await?;
        Ok(Self { name, data })
    }
}

pub fn progress_percent(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    ((sent.min(total) * 100) / total) as u8
}
