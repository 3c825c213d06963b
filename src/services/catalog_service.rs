//! Navigation, listing and selection over the current remote directory.
//!
//! Every list/search is tagged with the fetch generation current when it was
//! issued. A response whose generation is no longer current is dropped, so a
//! slow listing for a previous path can never overwrite the catalog.

use tracing::{debug, warn};

use crate::error::FileManagerError;
use crate::models::file_entry::FileEntry;
use crate::remote_path::RemotePath;
use crate::state::{Catalog, CatalogStatus, FileManagerState};

#[derive(Debug, Clone)]
struct FetchTicket {
    generation: u64,
    path: RemotePath,
    query: Option<String>,
    show_hidden: bool,
}

/// Directories first, then files, each group ascending by name.
pub fn display_order(entries: &[FileEntry]) -> Vec<FileEntry> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| {
        b.is_directory()
            .cmp(&a.is_directory())
            .then_with(|| a.name.cmp(&b.name))
    });
    sorted
}

pub fn visible_entries(state: &FileManagerState) -> Vec<FileEntry> {
    display_order(&state.browser().catalog.entries)
}

fn begin_fetch(state: &FileManagerState) -> FetchTicket {
    let mut browser = state.browser();
    browser.fetch_generation += 1;
    browser.catalog.status = CatalogStatus::Loading;

    let query = browser.search_query.trim();
    let query = (query.chars().count() >= state.config.min_search_chars).then(|| query.to_string());

    FetchTicket {
        generation: browser.fetch_generation,
        path: browser.path.clone(),
        query,
        show_hidden: browser.show_hidden,
    }
}

fn apply_fetch(
    state: &FileManagerState,
    ticket: FetchTicket,
    result: Result<Vec<FileEntry>, FileManagerError>,
) -> bool {
    let mut browser = state.browser();
    if ticket.generation != browser.fetch_generation || ticket.path != browser.path {
        debug!(
            path = %ticket.path,
            generation = ticket.generation,
            current = browser.fetch_generation,
            "discarding stale listing"
        );
        return false;
    }

    match result {
        Ok(entries) => {
            browser
                .selection
                .retain(|name| entries.iter().any(|e| &e.name == name));
            browser.catalog = Catalog {
                path: ticket.path,
                entries,
                status: CatalogStatus::Loaded,
            };
            true
        }
        Err(err) => {
            warn!(path = %ticket.path, error = %err, "listing failed");
            browser.catalog = Catalog {
                path: ticket.path,
                entries: Vec::new(),
                status: CatalogStatus::Failed(err.to_string()),
            };
            drop(browser);
            state.notify_error(err.to_string());
            true
        }
    }
}

/// Re-issues the fetch navigation would run: `search` while a long enough
/// query is active, `list` otherwise. Returns whether the result was applied.
pub async fn refresh(state: &FileManagerState) -> bool {
    let ticket = begin_fetch(state);
    let result = match &ticket.query {
        Some(query) => {
            state
                .client
                .search(query, &ticket.path, ticket.show_hidden)
                .await
        }
        None => state.client.list(&ticket.path, ticket.show_hidden).await,
    };
    apply_fetch(state, ticket, result)
}

pub async fn navigate_to(state: &FileManagerState, path: RemotePath) -> bool {
    {
        let mut browser = state.browser();
        debug!(from = %browser.path, to = %path, "navigate");
        browser.path = path;
        browser.selection.clear();
        browser.search_query.clear();
        browser.search_generation += 1;
    }
    state.context_menu().take();
    refresh(state).await
}

pub async fn navigate_to_path(state: &FileManagerState, typed: &str) -> bool {
    navigate_to(state, RemotePath::parse(typed)).await
}

/// No-op at root.
pub async fn navigate_up(state: &FileManagerState) -> bool {
    match state.current_path().parent() {
        Some(parent) => navigate_to(state, parent).await,
        None => false,
    }
}

pub async fn open_directory(state: &FileManagerState, name: &str) -> Result<bool, FileManagerError> {
    let target = {
        let browser = state.browser();
        match browser.catalog.find(name) {
            Some(entry) if entry.is_directory() => browser.catalog.path.join(name),
            Some(_) => {
                return Err(FileManagerError::InvalidInput(format!(
                    "{name} is not a directory"
                )))
            }
            None => {
                return Err(FileManagerError::InvalidInput(format!(
                    "{name} is not in the current listing"
                )))
            }
        }
    };
    Ok(navigate_to(state, target).await)
}

/// Updates the search text. Queries long enough to search wait out the
/// debounce delay and only fire if no newer query arrived meanwhile; an
/// emptied query lists the directory again immediately.
pub async fn set_search_query(state: &FileManagerState, query: &str) -> bool {
    let generation = {
        let mut browser = state.browser();
        browser.search_query = query.to_string();
        browser.search_generation += 1;
        browser.search_generation
    };

    let length = query.trim().chars().count();
    if length == 0 {
        return refresh(state).await;
    }
    if length < state.config.min_search_chars {
        return false;
    }

    tokio::time::sleep(state.config.search_debounce()).await;
    if state.browser().search_generation != generation {
        debug!(query, "search superseded");
        return false;
    }
    refresh(state).await
}

pub async fn set_show_hidden(state: &FileManagerState, show_hidden: bool) -> bool {
    state.browser().show_hidden = show_hidden;
    refresh(state).await
}

/// Names outside the current listing are ignored. Returns whether `name` is
/// selected afterwards.
pub fn toggle_selection(state: &FileManagerState, name: &str) -> bool {
    let mut browser = state.browser();
    if browser.catalog.find(name).is_none() {
        return false;
    }
    if browser.selection.remove(name) {
        false
    } else {
        browser.selection.insert(name.to_string());
        true
    }
}

pub fn toggle_select_all(state: &FileManagerState) {
    let mut browser = state.browser();
    if browser.selection.len() == browser.catalog.entries.len() {
        browser.selection.clear();
    } else {
        let names = browser.catalog.entries.iter().map(|e| e.name.clone()).collect();
        browser.selection = names;
    }
}

pub fn clear_selection(state: &FileManagerState) {
    state.browser().selection.clear();
}

/// Absolute paths of the selected entries, in name order.
pub fn selected_paths(state: &FileManagerState) -> Vec<String> {
    let browser = state.browser();
    browser
        .selection
        .iter()
        .map(|name| browser.catalog.path.child(name))
        .collect()
}
