use tracing::{debug, info};
use uuid::Uuid;

use crate::models::upload::{progress_percent, UploadFile, UploadStatus, UploadTask};
use crate::services::catalog_service;
use crate::state::FileManagerState;
use crate::validation::validate_entry_name;

/// Nesting depth of drag events over the drop target. Nested elements each
/// fire their own enter/leave, so the overlay shows while `depth > 0`.
#[derive(Debug, Default)]
pub struct DropZone {
    depth: u32,
}

impl DropZone {
    pub fn drag_enter(&mut self) {
        self.depth = self.depth.saturating_add(1);
    }

    pub fn drag_leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn reset(&mut self) {
        self.depth = 0;
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn is_active(&self) -> bool {
        self.depth > 0
    }
}

/// Upload tasks in submission order. Only settled tasks are ever swept.
#[derive(Debug, Default)]
pub struct UploadQueue {
    tasks: Vec<UploadTask>,
    drop_zone: DropZone,
}

impl UploadQueue {
    pub fn tasks(&self) -> &[UploadTask] {
        &self.tasks
    }

    pub fn drop_zone(&self) -> &DropZone {
        &self.drop_zone
    }

    pub fn drop_zone_mut(&mut self) -> &mut DropZone {
        &mut self.drop_zone
    }

    pub fn enqueue(&mut self, files: &[UploadFile]) -> Vec<Uuid> {
        files
            .iter()
            .map(|file| {
                let task = UploadTask::pending(file);
                let id = task.id;
                self.tasks.push(task);
                id
            })
            .collect()
    }

    fn update(&mut self, id: Uuid, apply: impl FnOnce(&mut UploadTask)) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            apply(task);
        }
    }

    pub fn mark_uploading(&mut self, id: Uuid) {
        self.update(id, |task| {
            task.status = UploadStatus::Uploading;
            task.progress = 0;
        });
    }

    pub fn set_progress(&mut self, id: Uuid, progress: u8) {
        self.update(id, |task| {
            if task.status == UploadStatus::Uploading {
                task.progress = progress.min(100);
            }
        });
    }

    pub fn mark_complete(&mut self, id: Uuid) {
        self.update(id, |task| {
            task.status = UploadStatus::Complete;
            task.progress = 100;
        });
    }

    pub fn mark_failed(&mut self, id: Uuid, message: String) {
        self.update(id, |task| {
            task.status = UploadStatus::Error;
            task.error = Some(message);
        });
    }

    /// Removes complete and failed tasks, keeping pending and uploading ones.
    pub fn sweep_settled(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| !task.status.is_settled());
        before - self.tasks.len()
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct UploadReport {
    pub uploaded: Vec<String>,
    pub failed: Vec<(String, String)>,
}

pub fn drag_enter(state: &FileManagerState) {
    state.uploads().drop_zone_mut().drag_enter();
}

pub fn drag_leave(state: &FileManagerState) {
    state.uploads().drop_zone_mut().drag_leave();
}

pub fn is_drop_zone_active(state: &FileManagerState) -> bool {
    state.uploads().drop_zone().is_active()
}

pub async fn handle_drop(state: &FileManagerState, files: Vec<UploadFile>) -> UploadReport {
    state.uploads().drop_zone_mut().reset();
    upload_files(state, files).await
}

/// Uploads `files` one after another into the current directory, refreshes
/// the catalog once all of them settled, then sweeps settled tasks after the
/// configured delay.
pub async fn upload_files(state: &FileManagerState, files: Vec<UploadFile>) -> UploadReport {
    let mut report = UploadReport::default();
    if files.is_empty() {
        return report;
    }

    let target = state.current_path();
    let ids = state.uploads().enqueue(&files);
    debug!(count = files.len(), path = %target, "uploads queued");

    for (id, file) in ids.into_iter().zip(files.iter()) {
        if let Err(err) = validate_entry_name(&file.name) {
            state.uploads().mark_failed(id, err.to_string());
            state.notify_error(format!("Cannot upload {}: {err}", file.name));
            report.failed.push((file.name.clone(), err.to_string()));
            continue;
        }

        state.uploads().mark_uploading(id);
        let on_progress = |sent: u64, total: u64| {
            state.uploads().set_progress(id, progress_percent(sent, total));
        };

        match state.client.upload(&target, file, &on_progress).await {
            Ok(()) => {
                state.uploads().mark_complete(id);
                report.uploaded.push(file.name.clone());
            }
            Err(err) => {
                state.uploads().mark_failed(id, err.to_string());
                state.notify_error(err.to_string());
                report.failed.push((file.name.clone(), err.to_string()));
            }
        }
    }

    if !report.uploaded.is_empty() {
        info!(count = report.uploaded.len(), path = %target, "uploads complete");
        state.notify_success(format!("Uploaded {} file(s)", report.uploaded.len()));
    }

    catalog_service::refresh(state).await;

    tokio::time::sleep(state.config.upload_sweep_delay()).await;
    let swept = state.uploads().sweep_settled();
    debug!(swept, "settled uploads swept");

    report
}
