use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::error::FileManagerError;

/// Address of the node agent hosting a server instance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NodeAddress {
    pub fqdn: String,
    pub port: u16,
    #[serde(default)]
    pub ssl: bool,
}

/// The server record handed over by the page shell. Read-only for the
/// lifetime of a file-manager session.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerContext {
    pub internal_id: String,
    pub validation_token: String,
    pub node: NodeAddress,
}

impl ServerContext {
    pub fn from_json(json: &str) -> Result<Self, FileManagerError> {
        let server: Self = serde_json::from_str(json)?;
        if server.internal_id.trim().is_empty() {
            return Err(FileManagerError::Config("server internalId is empty".to_string()));
        }
        if server.node.fqdn.trim().is_empty() {
            return Err(FileManagerError::Config("node fqdn is empty".to_string()));
        }
        Ok(server)
    }

    pub fn filesystem_base_url(&self) -> String {
        let scheme = if self.node.ssl { "https" } else { "http" };
        format!(
            "{scheme}://{}:{}/api/v1/filesystem/{}",
            self.node.fqdn, self.node.port, self.internal_id
        )
    }
}

impl fmt::Debug for ServerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerContext")
            .field("internal_id", &self.internal_id)
            .field("validation_token", &"<redacted>")
            .field("node", &self.node)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FileManagerConfig {
    pub show_hidden: bool,
    pub search_debounce_ms: u64,
    /// Queries shorter than this never reach the agent.
    pub min_search_chars: usize,
    pub upload_sweep_delay_ms: u64,
    pub notification_ttl_ms: u64,
    pub request_timeout_secs: u64,
    pub download_dir: PathBuf,
}

impl Default for FileManagerConfig {
    fn default() -> Self {
        Self {
            show_hidden: false,
            search_debounce_ms: 500,
            min_search_chars: 3,
            upload_sweep_delay_ms: 3000,
            notification_ttl_ms: 3000,
            request_timeout_secs: 30,
            download_dir: PathBuf::from("."),
        }
    }
}

impl FileManagerConfig {
    pub fn from_json(json: &str) -> Result<Self, FileManagerError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn upload_sweep_delay(&self) -> Duration {
        Duration::from_millis(self.upload_sweep_delay_ms)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ttl_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
