use crate::error::FileManagerError;
use crate::models::file_entry::FileEntry;
use crate::remote_path::RemotePath;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    NewFolder,
    NewFile,
    FileEditor,
    Compress,
    Rename,
    Move,
    Chmod,
}

/// The input form of one pending operation, with the data it works on.
/// `dir` is the directory the modal was opened in; submission acts there
/// even if the user has navigated away since.
#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    NewFolder { dir: RemotePath },
    NewFile { dir: RemotePath },
    FileEditor { dir: RemotePath, entry: FileEntry, content: String },
    Compress { dir: RemotePath, files: Vec<String> },
    Rename { dir: RemotePath, entry: FileEntry },
    Move { dir: RemotePath, entry: FileEntry, is_copy: bool },
    Chmod { dir: RemotePath, entry: FileEntry },
}

impl Modal {
    pub fn kind(&self) -> ModalKind {
        match self {
            Self::NewFolder { .. } => ModalKind::NewFolder,
            Self::NewFile { .. } => ModalKind::NewFile,
            Self::FileEditor { .. } => ModalKind::FileEditor,
            Self::Compress { .. } => ModalKind::Compress,
            Self::Rename { .. } => ModalKind::Rename,
            Self::Move { .. } => ModalKind::Move,
            Self::Chmod { .. } => ModalKind::Chmod,
        }
    }
}

/// At most one modal is open. While `loading`, a second submit and a cancel
/// are both refused.
#[derive(Debug, Default)]
pub struct ModalState {
    active: Option<Modal>,
    loading: bool,
}

impl ModalState {
    pub fn active(&self) -> Option<&Modal> {
        self.active.as_ref()
    }

    pub fn kind(&self) -> Option<ModalKind> {
        self.active.as_ref().map(Modal::kind)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn open(&mut self, modal: Modal) -> Result<(), FileManagerError> {
        if let Some(current) = &self.active {
            return Err(FileManagerError::InvalidInput(format!(
                "another dialog is already open ({:?})",
                current.kind()
            )));
        }
        self.active = Some(modal);
        self.loading = false;
        Ok(())
    }

    pub fn cancel(&mut self) -> bool {
        if self.loading || self.active.is_none() {
            return false;
        }
        self.active = None;
        true
    }

    pub fn set_editor_content(&mut self, new_content: String) -> Result<(), FileManagerError> {
        match &mut self.active {
            Some(Modal::FileEditor { content, .. }) if !self.loading => {
                *content = new_content;
                Ok(())
            }
            _ => Err(FileManagerError::InvalidInput(
                "no editable file is open".to_string(),
            )),
        }
    }

    /// Marks the open modal as submitting and hands back its data.
    pub fn begin_submit(&mut self, kind: ModalKind) -> Result<Modal, FileManagerError> {
        if self.loading {
            return Err(FileManagerError::InvalidInput(
                "a submission is already in progress".to_string(),
            ));
        }
        match &self.active {
            Some(modal) if modal.kind() == kind => {
                self.loading = true;
                Ok(modal.clone())
            }
            _ => Err(FileManagerError::InvalidInput(format!(
                "no {kind:?} dialog is open"
            ))),
        }
    }

    /// A failed submission leaves the modal open for another attempt.
    pub fn finish_submit(&mut self, succeeded: bool) {
        self.loading = false;
        if succeeded {
            self.active = None;
        }
    }
}
