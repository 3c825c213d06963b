//! Scripted in-memory node agent for service tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::config::FileManagerConfig;
use crate::error::FileManagerError;
use crate::models::file_entry::FileEntry;
use crate::models::operation::FileAction;
use crate::models::upload::UploadFile;
use crate::remote_path::RemotePath;
use crate::services::filesystem_client::FilesystemApi;
use crate::state::{lock, FileManagerState};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List { path: String },
    Search { query: String, path: String },
    Read { path: String },
    Write { path: String, content: String },
    CreateDirectory { path: String },
    Rename { from: String, to: String },
    Copy { from: String, to: String },
    Delete { path: String },
    Chmod { path: String, mode: String },
    Compress { files: Vec<String>, destination: String },
    Extract { path: String },
    Upload { path: String },
    Download { path: String },
}

/// Listings are keyed by directory (`/`, `/plugins`), failures and delays by
/// the absolute path an operation targets.
#[derive(Default)]
pub struct MockFilesystem {
    listings: Mutex<HashMap<String, Vec<FileEntry>>>,
    search_results: Mutex<Vec<FileEntry>>,
    contents: Mutex<HashMap<String, String>>,
    delays: Mutex<HashMap<String, Duration>>,
    failing: Mutex<HashSet<String>>,
    calls: Mutex<Vec<Call>>,
}

impl MockFilesystem {
    pub fn with_listing(self, path: &str, entries: Vec<FileEntry>) -> Self {
        self.set_listing(path, entries);
        self
    }

    pub fn with_search_results(self, entries: Vec<FileEntry>) -> Self {
        *lock(&self.search_results) = entries;
        self
    }

    pub fn with_contents(self, path: &str, content: &str) -> Self {
        lock(&self.contents).insert(path.to_string(), content.to_string());
        self
    }

    pub fn with_delay(self, target: &str, delay: Duration) -> Self {
        lock(&self.delays).insert(target.to_string(), delay);
        self
    }

    pub fn failing(self, target: &str) -> Self {
        lock(&self.failing).insert(target.to_string());
        self
    }

    pub fn set_listing(&self, path: &str, entries: Vec<FileEntry>) {
        lock(&self.listings).insert(path.to_string(), entries);
    }

    pub fn calls(&self) -> Vec<Call> {
        lock(&self.calls).clone()
    }

    pub fn list_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::List { .. } | Call::Search { .. }))
            .count()
    }

    /// Calls that change remote state.
    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| {
                !matches!(
                    c,
                    Call::List { .. } | Call::Search { .. } | Call::Read { .. } | Call::Download { .. }
                )
            })
            .collect()
    }

    fn record(&self, call: Call) {
        lock(&self.calls).push(call);
    }

    async fn settle(&self, target: &str) -> Result<(), String> {
        let delay = lock(&self.delays).get(target).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if lock(&self.failing).contains(target) {
            return Err("HTTP 500 Internal Server Error".to_string());
        }
        Ok(())
    }
}

#[async_trait]
impl FilesystemApi for MockFilesystem {
    async fn list(&self, path: &RemotePath, _show_hidden: bool) -> Result<Vec<FileEntry>, FileManagerError> {
        let key = path.to_string();
        self.record(Call::List { path: key.clone() });
        self.settle(&key).await.map_err(FileManagerError::List)?;
        Ok(lock(&self.listings).get(&key).cloned().unwrap_or_default())
    }

    async fn search(
        &self,
        query: &str,
        path: &RemotePath,
        _show_hidden: bool,
    ) -> Result<Vec<FileEntry>, FileManagerError> {
        let key = path.to_string();
        self.record(Call::Search {
            query: query.to_string(),
            path: key.clone(),
        });
        self.settle(&key).await.map_err(FileManagerError::List)?;
        Ok(lock(&self.search_results).clone())
    }

    async fn read_contents(&self, path: &RemotePath, name: &str) -> Result<String, FileManagerError> {
        let target = path.child(name);
        self.record(Call::Read { path: target.clone() });
        self.settle(&target).await.map_err(FileManagerError::Read)?;
        Ok(lock(&self.contents).get(&target).cloned().unwrap_or_default())
    }

    async fn write(&self, path: &RemotePath, name: &str, content: &str) -> Result<(), FileManagerError> {
        let target = path.child(name);
        self.record(Call::Write {
            path: target.clone(),
            content: content.to_string(),
        });
        self.settle(&target).await.map_err(FileManagerError::Write)
    }

    async fn create_directory(&self, path: &RemotePath, name: &str) -> Result<(), FileManagerError> {
        let target = path.child(name);
        self.record(Call::CreateDirectory { path: target.clone() });
        self.settle(&target)
            .await
            .map_err(|m| FileManagerError::operation(FileAction::CreateDirectory, &target, m))
    }

    async fn rename(&self, from: &str, to: &str) -> Result<(), FileManagerError> {
        self.record(Call::Rename {
            from: from.to_string(),
            to: to.to_string(),
        });
        self.settle(from)
            .await
            .map_err(|m| FileManagerError::operation(FileAction::Rename, from, m))
    }

    async fn copy(&self, from: &str, to: &str) -> Result<(), FileManagerError> {
        self.record(Call::Copy {
            from: from.to_string(),
            to: to.to_string(),
        });
        self.settle(from)
            .await
            .map_err(|m| FileManagerError::operation(FileAction::Copy, from, m))
    }

    async fn delete(&self, path: &RemotePath, name: &str) -> Result<(), FileManagerError> {
        let target = path.child(name);
        self.record(Call::Delete { path: target.clone() });
        self.settle(&target)
            .await
            .map_err(|m| FileManagerError::operation(FileAction::Delete, &target, m))
    }

    async fn chmod(&self, path: &str, mode: &str) -> Result<(), FileManagerError> {
        self.record(Call::Chmod {
            path: path.to_string(),
            mode: mode.to_string(),
        });
        self.settle(path)
            .await
            .map_err(|m| FileManagerError::operation(FileAction::Chmod, path, m))
    }

    async fn compress(&self, files: &[String], destination: &str) -> Result<(), FileManagerError> {
        self.record(Call::Compress {
            files: files.to_vec(),
            destination: destination.to_string(),
        });
        self.settle(destination)
            .await
            .map_err(|m| FileManagerError::operation(FileAction::Compress, destination, m))
    }

    async fn extract(&self, path: &RemotePath, file: &str) -> Result<(), FileManagerError> {
        let target = path.child(file);
        self.record(Call::Extract { path: target.clone() });
        self.settle(&target)
            .await
            .map_err(|m| FileManagerError::operation(FileAction::Extract, &target, m))
    }

    async fn upload(
        &self,
        path: &RemotePath,
        file: &UploadFile,
        progress: &(dyn Fn(u64, u64) + Send + Sync),
    ) -> Result<(), FileManagerError> {
        let target = path.child(&file.name);
        self.record(Call::Upload { path: target.clone() });
        let total = file.data.len() as u64;
        progress(total / 2, total);
        self.settle(&target).await.map_err(|message| FileManagerError::Upload {
            file: file.name.clone(),
            message,
        })?;
        progress(total, total);
        Ok(())
    }

    async fn download(&self, path: &RemotePath, name: &str) -> Result<Vec<u8>, FileManagerError> {
        let target = path.child(name);
        self.record(Call::Download { path: target.clone() });
        self.settle(&target).await.map_err(|message| FileManagerError::Download {
            file: name.to_string(),
            message,
        })?;
        Ok(lock(&self.contents)
            .get(&target)
            .cloned()
            .unwrap_or_default()
            .into_bytes())
    }
}

pub fn state_with(fs: MockFilesystem) -> (FileManagerState, Arc<MockFilesystem>) {
    state_with_config(fs, FileManagerConfig::default())
}

pub fn state_with_config(
    fs: MockFilesystem,
    config: FileManagerConfig,
) -> (FileManagerState, Arc<MockFilesystem>) {
    let fs = Arc::new(fs);
    let state = FileManagerState::new(fs.clone(), config);
    (state, fs)
}
