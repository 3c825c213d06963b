//! File manager core for a game server's node agent.
//!
//! [`FileManagerState`] holds the browsing session for one server: the
//! current directory and its listing, the selection, open dialogs, uploads
//! and notifications. The functions under [`services`] drive it against a
//! [`FilesystemApi`], normally the HTTP [`NodeAgentClient`].

pub mod config;
pub mod error;
pub mod models;
pub mod remote_path;
pub mod services;
pub mod state;
pub mod ui;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{FileManagerConfig, NodeAddress, ServerContext};
pub use error::FileManagerError;
pub use models::file_entry::FileEntry;
pub use models::operation::FileAction;
pub use models::upload::{UploadFile, UploadStatus, UploadTask};
pub use remote_path::RemotePath;
pub use services::filesystem_client::{FilesystemApi, NodeAgentClient};
pub use state::{Catalog, CatalogStatus, FileManagerState};
