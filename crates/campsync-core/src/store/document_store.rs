use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::{error, info};

use super::backup::{self, BackupError};
use crate::api::DocumentClient;
use crate::models::CampDocument;

/// User-visible problem raised by a load or save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    LoadFailed(String),
    SaveFailed(String),
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Alert::LoadFailed(reason) => write!(f, "Could not load the camp plan: {}", reason),
            Alert::SaveFailed(reason) => write!(f, "Could not save changes to the server: {}", reason),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Failed,
    /// No document in memory, nothing was sent
    NothingToSave,
}

/// What editors should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    Loading,
    Ready,
    /// Loading finished but there is no document to edit
    Unavailable,
}

#[derive(Debug)]
struct StoreState {
    document: Option<CampDocument>,
    loading: bool,
    saves_in_flight: usize,
    alert: Option<Alert>,
}

/// Single authoritative in-memory copy of the camp document.
///
/// Network failures never escape: they become an [`Alert`] plus an outcome
/// value. Only backup parsing reports errors to the caller.
pub struct DocumentStore {
    client: DocumentClient,
    state: Mutex<StoreState>,
}

impl DocumentStore {
    /// Create a store that has not loaded yet (status `Loading`)
    pub fn new(client: DocumentClient) -> Self {
        Self {
            client,
            state: Mutex::new(StoreState {
                document: None,
                loading: true,
                saves_in_flight: 0,
                alert: None,
            }),
        }
    }

    /// Create a store around a document that is already in hand
    pub fn from_document(client: DocumentClient, document: CampDocument) -> Self {
        let store = Self::new(client);
        {
            let mut state = store.state();
            state.document = Some(document);
            state.loading = false;
        }
        store
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fetch the document once. No retry on failure.
    pub async fn load(&self) -> LoadOutcome {
        self.state().loading = true;
        let result = self.client.fetch_document().await;

        let mut state = self.state();
        state.loading = false;
        match result {
            Ok(document) => {
                info!(entries = document.entry_count(), "Camp document loaded");
                state.document = Some(document);
                LoadOutcome::Loaded
            }
            Err(e) => {
                error!(error = %e, "Failed to load camp document");
                state.alert = Some(Alert::LoadFailed(e.to_string()));
                LoadOutcome::Failed
            }
        }
    }

    /// Apply a pure updater to the current document.
    ///
    /// Runs entirely under the state lock, so the updater always sees the
    /// result of the previous mutation. The updater works on a copy; if it
    /// panics the stored document is left as it was. Returns false (and
    /// does nothing) when no document is loaded.
    pub fn mutate<F>(&self, updater: F) -> bool
    where
        F: FnOnce(CampDocument) -> CampDocument,
    {
        let mut state = self.state();
        match state.document.clone() {
            Some(document) => {
                state.document = Some(updater(document));
                true
            }
            None => false,
        }
    }

    /// Send the whole current document to the endpoint.
    ///
    /// The body is the document as it is at the moment of the call. Saves
    /// are neither queued nor serialized; concurrent saves all go out.
    pub async fn save(&self) -> SaveOutcome {
        let snapshot = {
            let mut state = self.state();
            match state.document.clone() {
                Some(document) => {
                    state.saves_in_flight += 1;
                    document
                }
                None => return SaveOutcome::NothingToSave,
            }
        };

        let result = self.client.put_document(&snapshot).await;

        let mut state = self.state();
        state.saves_in_flight = state.saves_in_flight.saturating_sub(1);
        match result {
            Ok(()) => {
                info!("Camp document saved");
                SaveOutcome::Saved
            }
            Err(e) => {
                error!(error = %e, network = e.is_network(), "Failed to save camp document");
                state.alert = Some(Alert::SaveFailed(e.to_string()));
                SaveOutcome::Failed
            }
        }
    }

    /// Pretty-printed JSON of the current document
    pub fn export_backup_json(&self) -> Result<String, BackupError> {
        let state = self.state();
        let document = state.document.as_ref().ok_or(BackupError::NoDocument)?;
        Ok(document.to_pretty_json()?)
    }

    /// Write the current document to `<dir>/camp-backup.json`
    pub fn export_backup(&self, dir: &Path) -> Result<PathBuf, BackupError> {
        let document = self.document().ok_or(BackupError::NoDocument)?;
        let path = backup::write_backup(&document, dir)?;
        info!(path = %path.display(), "Backup exported");
        Ok(path)
    }

    /// Restore a backup and persist it immediately.
    ///
    /// The in-memory document is replaced only after the JSON parsed.
    pub async fn import_backup_json(&self, json: &str) -> Result<SaveOutcome, BackupError> {
        let document = CampDocument::from_json(json)?;
        self.replace(document);
        Ok(self.save().await)
    }

    pub async fn import_backup(&self, path: &Path) -> Result<SaveOutcome, BackupError> {
        let document = backup::read_backup(path)?;
        info!(path = %path.display(), "Backup imported");
        self.replace(document);
        Ok(self.save().await)
    }

    fn replace(&self, document: CampDocument) {
        let mut state = self.state();
        state.document = Some(document);
        state.loading = false;
    }

    /// Copy of the current document
    pub fn document(&self) -> Option<CampDocument> {
        self.state().document.clone()
    }

    /// Read the current document without cloning it
    pub fn with_document<R>(&self, read: impl FnOnce(&CampDocument) -> R) -> Option<R> {
        self.state().document.as_ref().map(read)
    }

    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    pub fn is_saving(&self) -> bool {
        self.state().saves_in_flight > 0
    }

    pub fn status(&self) -> StoreStatus {
        let state = self.state();
        if state.loading {
            StoreStatus::Loading
        } else if state.document.is_some() {
            StoreStatus::Ready
        } else {
            StoreStatus::Unavailable
        }
    }

    /// Take the pending alert, if any
    pub fn take_alert(&self) -> Option<Alert> {
        self.state().alert.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BoozeItem, EntityList, RuleItem};
    use reqwest::Client;

    fn offline_client() -> DocumentClient {
        // Never contacted by these tests
        DocumentClient::with_client(Client::new(), "http://127.0.0.1:9")
    }

    fn store_with(document: CampDocument) -> DocumentStore {
        DocumentStore::from_document(offline_client(), document)
    }

    #[test]
    fn test_new_store_is_loading() {
        let store = DocumentStore::new(offline_client());
        assert_eq!(store.status(), StoreStatus::Loading);
        assert!(store.is_loading());
        assert!(!store.is_saving());
    }

    #[test]
    fn test_mutate_without_document_is_noop() {
        let store = DocumentStore::new(offline_client());
        let mut called = false;
        let applied = store.mutate(|doc| {
            called = true;
            doc
        });
        assert!(!applied);
        assert!(!called);
        assert!(store.document().is_none());
    }

    #[test]
    fn test_booze_append_then_remove() {
        let store = store_with(CampDocument::default());

        store.mutate(|mut doc| {
            let mut item = BoozeItem::new("Whiskey", "Bulleit", "1");
            item.id = "b1".into();
            doc.booze = doc.booze.with_pushed(item);
            doc
        });

        let booze = store.with_document(|doc| doc.booze.clone()).expect("document present");
        assert_eq!(booze.len(), 1);
        assert_eq!(booze[0].id.as_str(), "b1");
        assert_eq!(booze[0].kind, "Whiskey");
        assert_eq!(booze[0].label, "Bulleit");
        assert_eq!(booze[0].quantity, "1");

        store.mutate(|mut doc| {
            doc.booze = doc.booze.without_id("b1");
            doc
        });
        assert_eq!(store.with_document(|doc| doc.booze.len()), Some(0));
    }

    #[test]
    fn test_mutations_fold_in_order() {
        let initial = CampDocument::default();
        let updaters: Vec<Box<dyn Fn(CampDocument) -> CampDocument>> = vec![
            Box::new(|mut d| {
                d.event.title = "Camp".to_string();
                d
            }),
            Box::new(|mut d| {
                d.event.title.push_str(" 2025");
                d
            }),
            Box::new(|mut d| {
                let text = format!("Welcome to {}", d.event.title);
                d.rules.push(RuleItem::new(text));
                d
            }),
        ];

        let store = store_with(initial.clone());
        for updater in &updaters {
            store.mutate(|d| updater(d));
        }
        let expected = updaters.iter().fold(initial, |d, f| f(d));

        // Rule ids are random, so compare the visible values
        let actual = store.document().expect("document present");
        assert_eq!(actual.event, expected.event);
        assert_eq!(actual.rules.len(), 1);
        assert_eq!(actual.rules[0].text, "Welcome to Camp 2025");
        assert_eq!(actual.rules[0].text, expected.rules[0].text);
    }

    #[test]
    fn test_panicking_updater_keeps_document() {
        let mut doc = CampDocument::default();
        doc.event.title = "Unsaved edits".to_string();
        let store = store_with(doc.clone());

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            store.mutate(|_| panic!("updater failed"));
        }));
        assert!(result.is_err());

        assert_eq!(store.status(), StoreStatus::Ready);
        assert_eq!(store.document(), Some(doc));

        // The store keeps working afterwards
        assert!(store.mutate(|mut d| {
            d.event.location = "Lake".to_string();
            d
        }));
        assert_eq!(store.with_document(|d| d.event.location.clone()).as_deref(), Some("Lake"));
    }

    #[test]
    fn test_export_without_document() {
        let store = DocumentStore::new(offline_client());
        assert!(matches!(store.export_backup_json(), Err(BackupError::NoDocument)));
    }

    #[tokio::test]
    async fn test_save_without_document_sends_nothing() {
        let store = DocumentStore::new(offline_client());
        assert_eq!(store.save().await, SaveOutcome::NothingToSave);
        assert!(store.take_alert().is_none());
    }

    #[tokio::test]
    async fn test_bad_import_leaves_document_untouched() {
        let mut doc = CampDocument::default();
        doc.event.title = "Original".to_string();
        let store = store_with(doc.clone());

        let result = store.import_backup_json("[1, 2").await;
        assert!(matches!(result, Err(BackupError::Parse(_))));
        assert_eq!(store.document(), Some(doc));
    }

    #[test]
    fn test_alert_messages() {
        let alert = Alert::SaveFailed("Server error: boom".to_string());
        assert_eq!(alert.to_string(), "Could not save changes to the server: Server error: boom");
    }
}
