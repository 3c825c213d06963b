//! Request and response bodies of the node-agent filesystem API.

use serde::{Deserialize, Serialize};

use super::file_entry::FileEntry;

#[derive(Debug, Deserialize)]
pub struct ListResponse {
    #[serde(default)]
    pub contents: Vec<FileEntry>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<FileEntry>,
}

#[derive(Debug, Serialize)]
pub struct TransferRequest<'a> {
    pub from: &'a str,
    pub to: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ChmodRequest<'a> {
    pub path: &'a str,
    pub mode: &'a str,
}

#[derive(Debug, Serialize)]
pub struct CompressRequest<'a> {
    pub files: &'a [String],
    pub destination: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ExtractRequest<'a> {
    pub file: &'a str,
}

/// Optional error body some agent endpoints return alongside a non-2xx status.
#[derive(Debug, Default, Deserialize)]
pub struct AgentErrorBody {
    pub error: Option<String>,
    pub message: Option<String>,
}

impl AgentErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.error
            .or(self.message)
            .filter(|m| !m.trim().is_empty())
    }
}
