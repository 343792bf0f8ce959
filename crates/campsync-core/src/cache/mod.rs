//! Offline shell cache for the installable client.
//!
//! This module provides the `CacheManager`, which keeps the application
//! shell available offline:
//!
//! - **install** pre-caches every asset of the [`ShellManifest`] under the
//!   current generation, all or nothing
//! - **activate** deletes every other generation, claims open pages and
//!   tells them a new version is live
//! - **handle_fetch** answers same-origin GETs: navigations network-first,
//!   everything else cache-first
//!
//! Generations are stored on disk by `CacheStorage`, one directory each.

pub mod error;
pub mod manager;
pub mod manifest;
pub mod request;
pub mod storage;

pub use error::CacheError;
pub use manager::{ActivationReport, CacheManager, CacheStatus, GenerationStatus, LifecyclePhase};
pub use manifest::{ShellManifest, SHELL_ASSETS};
pub use request::{FetchOutcome, FetchRequest, RequestMode, ResponseSource};
pub use storage::{CacheStorage, ShellResponse};
