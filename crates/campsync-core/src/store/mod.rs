//! Optimistic client state for the camp document.
//!
//! `DocumentStore` holds the single in-memory copy of the document. Editors
//! change it only through `mutate`, which never touches the network; the
//! whole document goes back to the endpoint on an explicit `save`. Backups
//! export the document verbatim and import it as "restore and persist".
//!
//! Saves are last-write-wins. Two sessions saving concurrently silently
//! overwrite each other; no merge is attempted.

pub mod backup;
pub mod document_store;

pub use backup::{BackupError, BACKUP_FILE_NAME};
pub use document_store::{Alert, DocumentStore, LoadOutcome, SaveOutcome, StoreStatus};
