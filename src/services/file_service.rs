//! Operations on entries of the current directory.
//!
//! Entry flags are checked before any request is made; the agent checks them
//! again. A successful mutation refreshes the catalog from the agent, a
//! failed one only notifies. Targets are resolved against the directory the
//! entry was listed in, and a modal keeps that directory until it is
//! submitted.

use std::future::Future;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::error::FileManagerError;
use crate::models::file_entry::FileEntry;
use crate::models::operation::FileAction;
use crate::remote_path::RemotePath;
use crate::services::catalog_service;
use crate::services::file_types::{is_archive, is_editable, MAX_EDITABLE_SIZE};
use crate::state::FileManagerState;
use crate::ui::context_menu::{ContextMenu, Point, Size};
use crate::ui::modal::{Modal, ModalKind};
use crate::validation::{validate_entry_name, validate_mode, validate_transfer_target};

const ENTRY_ACTIONS: &[FileAction] = &[
    FileAction::Edit,
    FileAction::Download,
    FileAction::Copy,
    FileAction::Rename,
    FileAction::Move,
    FileAction::Delete,
    FileAction::Extract,
    FileAction::Chmod,
];

fn edit_refusal(entry: &FileEntry) -> &'static str {
    if entry.is_directory() {
        "directories cannot be edited"
    } else if entry.size >= MAX_EDITABLE_SIZE {
        "file is too large to edit"
    } else {
        "file type is not editable"
    }
}

pub fn check_action(action: FileAction, entry: &FileEntry) -> Result<(), FileManagerError> {
    let reject = |reason: &str| Err(FileManagerError::rejected(action, &entry.name, reason));

    match action {
        FileAction::Edit if !is_editable(entry) => reject(edit_refusal(entry)),
        FileAction::Rename | FileAction::Move if !entry.can_modify() => {
            if entry.readonly {
                reject("file is read-only")
            } else {
                reject("file is protected from deletion")
            }
        }
        FileAction::Delete if !entry.can_delete() => reject("file is protected from deletion"),
        FileAction::Extract if !is_archive(entry) => reject("not a supported archive"),
        _ => Ok(()),
    }
}

/// Context-menu actions for `entry`. Anything `check_action` refuses is left out.
pub fn available_actions(entry: &FileEntry) -> Vec<FileAction> {
    ENTRY_ACTIONS
        .iter()
        .copied()
        .filter(|action| check_action(*action, entry).is_ok())
        .collect()
}

fn refuse(state: &FileManagerState, err: FileManagerError) -> FileManagerError {
    warn!(error = %err, "operation refused");
    state.notify_error(err.to_string());
    err
}

/// The directory the shown entries were listed from. It trails the browser
/// path while a navigation fetch is still loading.
fn listed_dir(state: &FileManagerState) -> RemotePath {
    state.browser().catalog.path.clone()
}

fn entry_named(state: &FileManagerState, name: &str) -> Result<(RemotePath, FileEntry), FileManagerError> {
    let browser = state.browser();
    let entry = browser
        .catalog
        .find(name)
        .cloned()
        .ok_or_else(|| FileManagerError::InvalidInput(format!("{name} is not in the current listing")))?;
    Ok((browser.catalog.path.clone(), entry))
}

fn checked_entry(
    state: &FileManagerState,
    action: FileAction,
    name: &str,
) -> Result<(RemotePath, FileEntry), FileManagerError> {
    let (dir, entry) = entry_named(state, name).map_err(|e| refuse(state, e))?;
    check_action(action, &entry).map_err(|e| refuse(state, e))?;
    Ok((dir, entry))
}

async fn finish_operation(
    state: &FileManagerState,
    result: Result<String, FileManagerError>,
) -> Result<(), FileManagerError> {
    match result {
        Ok(success) => {
            info!(summary = %success, "operation complete");
            state.notify_success(success);
            catalog_service::refresh(state).await;
            Ok(())
        }
        Err(err) => {
            state.notify_error(err.to_string());
            Err(err)
        }
    }
}

/// Runs the submission of the open `kind` modal. The modal stays in its
/// loading state for the duration of `op` and closes only on success.
async fn submit_modal<F, Fut>(state: &FileManagerState, kind: ModalKind, op: F) -> Result<(), FileManagerError>
where
    F: FnOnce(Modal) -> Fut,
    Fut: Future<Output = Result<String, FileManagerError>>,
{
    let modal = state.modal().begin_submit(kind)?;
    let result = op(modal).await;
    state.modal().finish_submit(result.is_ok());
    finish_operation(state, result).await
}

fn open_modal(state: &FileManagerState, modal: Modal) -> Result<(), FileManagerError> {
    state.context_menu().take();
    state.modal().open(modal).map_err(|e| refuse(state, e))
}

/// Resolves the move/copy destination typed by the user. A trailing `/`
/// means "into this directory, keeping the name"; otherwise the input is the
/// entry's new path. Relative input is taken from `current`.
pub fn resolve_destination(current: &RemotePath, input: &str, name: &str) -> Result<String, FileManagerError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(FileManagerError::InvalidInput("destination is empty".to_string()));
    }

    let path = if input.starts_with('/') {
        RemotePath::parse(input)
    } else {
        RemotePath::parse(&format!("{current}/{input}"))
    };

    if input.ends_with('/') {
        return Ok(path.child(name));
    }
    if path.is_root() {
        return Err(FileManagerError::InvalidInput(
            "destination must name a file or end with '/'".to_string(),
        ));
    }
    Ok(path.to_string())
}

pub fn open_context_menu(state: &FileManagerState, name: &str, at: Point) -> Result<ContextMenu, FileManagerError> {
    let (_, entry) = entry_named(state, name)?;
    let menu = ContextMenu::new(name, at, available_actions(&entry));
    *state.context_menu() = Some(menu.clone());
    Ok(menu)
}

/// Clamps the open menu into the viewport once its size is known.
pub fn layout_context_menu(state: &FileManagerState, menu: Size, viewport: Size) -> Option<Point> {
    let mut guard = state.context_menu();
    let open = guard.as_mut()?;
    open.apply_layout(menu, viewport);
    Some(open.position)
}

pub fn close_context_menu(state: &FileManagerState) {
    state.context_menu().take();
}

/// Runs the item picked from the open context menu, given its action id.
/// The menu closes whatever the outcome.
pub async fn run_menu_action(state: &FileManagerState, action_id: &str) -> Result<(), FileManagerError> {
    let menu = state
        .context_menu()
        .take()
        .ok_or_else(|| FileManagerError::InvalidInput("no context menu is open".to_string()))?;
    let action: FileAction = action_id.parse().map_err(FileManagerError::InvalidInput)?;
    if !menu.actions.contains(&action) {
        return Err(refuse(
            state,
            FileManagerError::rejected(action, &menu.target, "not available for this entry"),
        ));
    }

    let name = menu.target.as_str();
    match action {
        FileAction::Edit => open_editor(state, name).await.map(|_| ()),
        FileAction::Download => download_entry(state, name).await.map(|_| ()),
        FileAction::Copy => request_copy(state, name),
        FileAction::Rename => request_rename(state, name),
        FileAction::Move => request_move(state, name),
        FileAction::Delete => delete_entry(state, name).await,
        FileAction::Extract => extract_entry(state, name).await,
        FileAction::Chmod => request_chmod(state, name),
        FileAction::CreateDirectory | FileAction::CreateFile | FileAction::Compress => Err(
            FileManagerError::InvalidInput(format!("{action} is not an entry action")),
        ),
    }
}

/// Reads the file and opens it in the editor. Returns `false` when the user
/// left the directory while the read was in flight; the contents are then
/// dropped and no modal opens.
pub async fn open_editor(state: &FileManagerState, name: &str) -> Result<bool, FileManagerError> {
    let (dir, entry) = checked_entry(state, FileAction::Edit, name)?;
    let content = match state.client.read_contents(&dir, name).await {
        Ok(content) => content,
        Err(err) => {
            state.notify_error(err.to_string());
            return Err(err);
        }
    };

    if state.current_path() != dir {
        debug!(path = %dir, file = name, "discarding contents read for a previous directory");
        return Ok(false);
    }
    open_modal(state, Modal::FileEditor { dir, entry, content })?;
    Ok(true)
}

pub async fn save_editor(state: &FileManagerState) -> Result<(), FileManagerError> {
    submit_modal(state, ModalKind::FileEditor, |modal| async move {
        let Modal::FileEditor { dir, entry, content } = modal else {
            return Err(FileManagerError::InvalidInput("no file is open".to_string()));
        };
        if entry.readonly {
            return Err(FileManagerError::rejected(
                FileAction::Edit,
                &entry.name,
                "file is read-only",
            ));
        }
        state.client.write(&dir, &entry.name, &content).await?;
        Ok(format!("Saved {}", dir.child(&entry.name)))
    })
    .await
}

/// Saves the file under its original name inside the configured download
/// directory.
pub async fn download_entry(state: &FileManagerState, name: &str) -> Result<PathBuf, FileManagerError> {
    let (dir, _) = checked_entry(state, FileAction::Download, name)?;
    validate_entry_name(name).map_err(|e| refuse(state, e))?;

    let result = async {
        let bytes = state.client.download(&dir, name).await?;
        let target_dir = &state.config.download_dir;
        tokio::fs::create_dir_all(target_dir).await?;
        let destination = target_dir.join(name);
        tokio::fs::write(&destination, bytes).await?;
        Ok::<_, FileManagerError>(destination)
    }
    .await;

    match result {
        Ok(destination) => {
            info!(file = name, destination = %destination.display(), "download saved");
            state.notify_success(format!("Downloaded {name}"));
            Ok(destination)
        }
        Err(err) => {
            state.notify_error(err.to_string());
            Err(err)
        }
    }
}

pub async fn delete_entry(state: &FileManagerState, name: &str) -> Result<(), FileManagerError> {
    let (dir, _) = checked_entry(state, FileAction::Delete, name)?;
    let result = state.client.delete(&dir, name).await;
    finish_operation(state, result.map(|()| format!("Deleted {name}"))).await
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct BatchReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<(String, String)>,
}

/// Deletes every selected entry. Each deletion is attempted on its own and
/// failures are reported one by one; the selection is cleared and the
/// catalog refreshed once at the end regardless.
pub async fn delete_selected(state: &FileManagerState) -> BatchReport {
    let mut report = BatchReport::default();
    let (dir, names) = {
        let browser = state.browser();
        (
            browser.catalog.path.clone(),
            browser.selection.iter().cloned().collect::<Vec<_>>(),
        )
    };
    if names.is_empty() {
        return report;
    }

    for name in names {
        let entry = state.browser().catalog.find(&name).cloned();
        let result = match entry {
            Some(entry) => match check_action(FileAction::Delete, &entry) {
                Ok(()) => state.client.delete(&dir, &name).await,
                Err(err) => Err(err),
            },
            None => Err(FileManagerError::InvalidInput(format!(
                "{name} is not in the current listing"
            ))),
        };

        match result {
            Ok(()) => report.succeeded.push(name),
            Err(err) => {
                warn!(file = %name, error = %err, "batch delete item failed");
                state.notify_error(err.to_string());
                report.failed.push((name, err.to_string()));
            }
        }
    }

    catalog_service::clear_selection(state);
    if !report.succeeded.is_empty() {
        state.notify_success(format!("Deleted {} item(s)", report.succeeded.len()));
    }
    catalog_service::refresh(state).await;
    report
}

pub async fn extract_entry(state: &FileManagerState, name: &str) -> Result<(), FileManagerError> {
    let (dir, _) = checked_entry(state, FileAction::Extract, name)?;
    let result = state.client.extract(&dir, name).await;
    finish_operation(state, result.map(|()| format!("Extracted {name}"))).await
}

pub fn request_new_folder(state: &FileManagerState) -> Result<(), FileManagerError> {
    open_modal(state, Modal::NewFolder { dir: listed_dir(state) })
}

pub fn request_new_file(state: &FileManagerState) -> Result<(), FileManagerError> {
    open_modal(state, Modal::NewFile { dir: listed_dir(state) })
}

pub fn request_rename(state: &FileManagerState, name: &str) -> Result<(), FileManagerError> {
    let (dir, entry) = checked_entry(state, FileAction::Rename, name)?;
    open_modal(state, Modal::Rename { dir, entry })
}

pub fn request_move(state: &FileManagerState, name: &str) -> Result<(), FileManagerError> {
    let (dir, entry) = checked_entry(state, FileAction::Move, name)?;
    open_modal(state, Modal::Move { dir, entry, is_copy: false })
}

pub fn request_copy(state: &FileManagerState, name: &str) -> Result<(), FileManagerError> {
    let (dir, entry) = checked_entry(state, FileAction::Copy, name)?;
    open_modal(state, Modal::Move { dir, entry, is_copy: true })
}

pub fn request_chmod(state: &FileManagerState, name: &str) -> Result<(), FileManagerError> {
    let (dir, entry) = checked_entry(state, FileAction::Chmod, name)?;
    open_modal(state, Modal::Chmod { dir, entry })
}

pub fn request_compress(state: &FileManagerState) -> Result<(), FileManagerError> {
    let files = catalog_service::selected_paths(state);
    if files.is_empty() {
        return Err(refuse(
            state,
            FileManagerError::InvalidInput("select at least one file to compress".to_string()),
        ));
    }
    open_modal(state, Modal::Compress { dir: listed_dir(state), files })
}

/// Only checked while `dir` is still the listed directory; the agent
/// rejects collisions it can see either way.
fn ensure_name_free(state: &FileManagerState, dir: &RemotePath, name: &str) -> Result<(), FileManagerError> {
    let browser = state.browser();
    if browser.catalog.path == *dir && browser.catalog.find(name).is_some() {
        return Err(FileManagerError::InvalidInput(format!("{name} already exists")));
    }
    Ok(())
}

pub async fn submit_new_folder(state: &FileManagerState, name: &str) -> Result<(), FileManagerError> {
    submit_modal(state, ModalKind::NewFolder, |modal| async move {
        let Modal::NewFolder { dir } = modal else {
            return Err(FileManagerError::InvalidInput("no new folder in progress".to_string()));
        };
        let name = name.trim();
        validate_entry_name(name)?;
        ensure_name_free(state, &dir, name)?;
        state.client.create_directory(&dir, name).await?;
        Ok(format!("Created folder {name}"))
    })
    .await
}

pub async fn submit_new_file(state: &FileManagerState, name: &str) -> Result<(), FileManagerError> {
    submit_modal(state, ModalKind::NewFile, |modal| async move {
        let Modal::NewFile { dir } = modal else {
            return Err(FileManagerError::InvalidInput("no new file in progress".to_string()));
        };
        let name = name.trim();
        validate_entry_name(name)?;
        ensure_name_free(state, &dir, name)?;
        state.client.write(&dir, name, "").await?;
        Ok(format!("Created {name}"))
    })
    .await
}

pub async fn submit_rename(state: &FileManagerState, new_name: &str) -> Result<(), FileManagerError> {
    submit_modal(state, ModalKind::Rename, |modal| async move {
        let Modal::Rename { dir, entry } = modal else {
            return Err(FileManagerError::InvalidInput("no rename in progress".to_string()));
        };
        check_action(FileAction::Rename, &entry)?;
        let new_name = new_name.trim();
        validate_entry_name(new_name)?;
        if new_name == entry.name {
            return Err(FileManagerError::InvalidInput(
                "new name is the same as the old one".to_string(),
            ));
        }
        ensure_name_free(state, &dir, new_name)?;

        let from = dir.child(&entry.name);
        let to = dir.child(new_name);
        state.client.rename(&from, &to).await?;
        Ok(format!("Renamed {} to {new_name}", entry.name))
    })
    .await
}

/// Submits the move modal, copying instead when it was opened for a copy.
pub async fn submit_move(state: &FileManagerState, destination: &str) -> Result<(), FileManagerError> {
    submit_modal(state, ModalKind::Move, |modal| async move {
        let Modal::Move { dir, entry, is_copy } = modal else {
            return Err(FileManagerError::InvalidInput("no move in progress".to_string()));
        };
        let action = if is_copy { FileAction::Copy } else { FileAction::Move };
        check_action(action, &entry)?;

        let from = dir.child(&entry.name);
        let to = resolve_destination(&dir, destination, &entry.name)?;
        validate_transfer_target(&from, &to, entry.is_directory())?;

        if is_copy {
            state.client.copy(&from, &to).await?;
            return Ok(format!("Copied {} to {to}", entry.name));
        }

        // The agent moves through its rename endpoint.
        state.client.rename(&from, &to).await.map_err(|err| match err {
            FileManagerError::Operation { target, message, .. } => {
                FileManagerError::operation(FileAction::Move, target, message)
            }
            other => other,
        })?;
        Ok(format!("Moved {} to {to}", entry.name))
    })
    .await
}

pub async fn submit_chmod(state: &FileManagerState, mode: &str) -> Result<(), FileManagerError> {
    submit_modal(state, ModalKind::Chmod, |modal| async move {
        let Modal::Chmod { dir, entry } = modal else {
            return Err(FileManagerError::InvalidInput("no permission change in progress".to_string()));
        };
        let mode = mode.trim();
        validate_mode(mode)?;
        let target = dir.child(&entry.name);
        state.client.chmod(&target, mode).await?;
        Ok(format!("Changed permissions of {} to {mode}", entry.name))
    })
    .await
}

/// Compresses the files captured when the modal opened into
/// `<archive_name>.zip` in the directory they were listed in.
pub async fn submit_compress(state: &FileManagerState, archive_name: &str) -> Result<(), FileManagerError> {
    submit_modal(state, ModalKind::Compress, |modal| async move {
        let Modal::Compress { dir, files } = modal else {
            return Err(FileManagerError::InvalidInput("no compression in progress".to_string()));
        };
        let base = archive_name.trim();
        let base = base.strip_suffix(".zip").unwrap_or(base);
        validate_entry_name(base)?;

        let archive = format!("{base}.zip");
        let destination = dir.child(&archive);
        state.client.compress(&files, &destination).await?;
        catalog_service::clear_selection(state);
        Ok(format!("Compressed {} item(s) into {archive}", files.len()))
    })
    .await
}
