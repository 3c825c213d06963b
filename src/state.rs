use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

use crate::config::{FileManagerConfig, ServerContext};
use crate::error::FileManagerError;
use crate::models::file_entry::FileEntry;
use crate::models::upload::UploadTask;
use crate::remote_path::RemotePath;
use crate::services::filesystem_client::{FilesystemApi, NodeAgentClient};
use crate::services::notification_service::{Notification, NotificationSink};
use crate::services::upload_service::UploadQueue;
use crate::ui::context_menu::ContextMenu;
use crate::ui::modal::{Modal, ModalKind, ModalState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogStatus {
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

/// The last listing fetched, tied to the path it was fetched for.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub path: RemotePath,
    pub entries: Vec<FileEntry>,
    pub status: CatalogStatus,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            path: RemotePath::root(),
            entries: Vec::new(),
            status: CatalogStatus::Idle,
        }
    }
}

impl Catalog {
    pub fn find(&self, name: &str) -> Option<&FileEntry> {
        self.entries.iter().find(|e| e.name == name)
    }
}

#[derive(Debug, Default)]
pub struct BrowserState {
    pub path: RemotePath,
    pub catalog: Catalog,
    pub selection: BTreeSet<String>,
    pub search_query: String,
    pub show_hidden: bool,
    /// Bumped for every list/search issued; only the newest may land.
    pub(crate) fetch_generation: u64,
    /// Bumped for every query change; supersedes pending debounced searches.
    pub(crate) search_generation: u64,
}

pub struct FileManagerState {
    pub(crate) client: Arc<dyn FilesystemApi>,
    pub(crate) config: FileManagerConfig,
    browser: Mutex<BrowserState>,
    uploads: Mutex<UploadQueue>,
    notifications: Mutex<NotificationSink>,
    modal: Mutex<ModalState>,
    context_menu: Mutex<Option<ContextMenu>>,
}

impl FileManagerState {
    pub fn new(client: Arc<dyn FilesystemApi>, config: FileManagerConfig) -> Self {
        let browser = BrowserState {
            show_hidden: config.show_hidden,
            ..BrowserState::default()
        };
        Self {
            client,
            browser: Mutex::new(browser),
            uploads: Mutex::new(UploadQueue::default()),
            notifications: Mutex::new(NotificationSink::new(config.notification_ttl())),
            modal: Mutex::new(ModalState::default()),
            context_menu: Mutex::new(None),
            config,
        }
    }

    pub fn connect(server: &ServerContext, config: FileManagerConfig) -> Result<Self, FileManagerError> {
        let client = NodeAgentClient::new(server, &config)?;
        Ok(Self::new(Arc::new(client), config))
    }

    pub fn config(&self) -> &FileManagerConfig {
        &self.config
    }

    pub(crate) fn browser(&self) -> MutexGuard<'_, BrowserState> {
        lock(&self.browser)
    }

    pub(crate) fn uploads(&self) -> MutexGuard<'_, UploadQueue> {
        lock(&self.uploads)
    }

    pub(crate) fn modal(&self) -> MutexGuard<'_, ModalState> {
        lock(&self.modal)
    }

    pub(crate) fn context_menu(&self) -> MutexGuard<'_, Option<ContextMenu>> {
        lock(&self.context_menu)
    }

    pub(crate) fn notify_success(&self, message: impl Into<String>) {
        lock(&self.notifications).success(message);
    }

    pub(crate) fn notify_error(&self, message: impl Into<String>) {
        lock(&self.notifications).error(message);
    }

    pub fn current_path(&self) -> RemotePath {
        self.browser().path.clone()
    }

    pub fn catalog(&self) -> Catalog {
        self.browser().catalog.clone()
    }

    pub fn selection(&self) -> BTreeSet<String> {
        self.browser().selection.clone()
    }

    pub fn search_query(&self) -> String {
        self.browser().search_query.clone()
    }

    pub fn upload_tasks(&self) -> Vec<UploadTask> {
        self.uploads().tasks().to_vec()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        lock(&self.notifications).active()
    }

    pub fn dismiss_notification(&self, id: Uuid) -> bool {
        lock(&self.notifications).dismiss(id)
    }

    pub fn active_modal(&self) -> Option<Modal> {
        self.modal().active().cloned()
    }

    pub fn modal_kind(&self) -> Option<ModalKind> {
        self.modal().kind()
    }

    pub fn is_modal_loading(&self) -> bool {
        self.modal().is_loading()
    }

    /// Closing before submission never fires the request.
    pub fn cancel_modal(&self) -> bool {
        self.modal().cancel()
    }

    pub fn set_editor_content(&self, content: String) -> Result<(), FileManagerError> {
        self.modal().set_editor_content(content)
    }

    pub fn active_context_menu(&self) -> Option<ContextMenu> {
        self.context_menu().clone()
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockFilesystem;

    #[test]
    fn new_state_starts_at_root_with_config_defaults() {
        let config = FileManagerConfig {
            show_hidden: true,
            ..FileManagerConfig::default()
        };
        let state = FileManagerState::new(Arc::new(MockFilesystem::default()), config);

        assert!(state.current_path().is_root());
        assert_eq!(state.catalog().status, CatalogStatus::Idle);
        assert!(state.browser().show_hidden);
        assert!(state.selection().is_empty());
        assert!(state.active_modal().is_none());
    }

    #[test]
    fn poisoned_lock_is_recovered() {
        let state = Arc::new(FileManagerState::new(
            Arc::new(MockFilesystem::default()),
            FileManagerConfig::default(),
        ));
        let poisoner = state.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.browser();
            panic!("poison the browser lock");
        })
        .join();

        assert!(state.current_path().is_root());
    }

    #[test]
    fn connect_builds_http_client() {
        let server = ServerContext::from_json(
            r#"{"internalId":"abc","validationToken":"t","node":{"fqdn":"node.local","port":8080}}"#,
        )
        .unwrap();
        assert!(FileManagerState::connect(&server, FileManagerConfig::default()).is_ok());
    }
}
