//! campsync core - offline shell caching and camp document sync.
//!
//! Two cooperating halves:
//!
//! - [`cache::CacheManager`] keeps the client shell available offline:
//!   versioned pre-caching, eviction of old generations, network-first
//!   navigations and cache-first assets, plus a new-version broadcast to
//!   open pages ([`signal`]).
//! - [`store::DocumentStore`] holds the camp document in memory, applies
//!   local edits, saves the whole document on request and handles backups.

pub mod api;
pub mod cache;
pub mod config;
pub mod models;
pub mod session;
pub mod signal;
pub mod store;
pub mod utils;

pub use api::{ApiError, DocumentClient};
pub use cache::{CacheError, CacheManager, CacheStorage, FetchOutcome, FetchRequest, ShellManifest};
pub use config::Config;
pub use models::CampDocument;
pub use signal::{ClientRegistry, VersionWatcher};
pub use store::{DocumentStore, LoadOutcome, SaveOutcome};
