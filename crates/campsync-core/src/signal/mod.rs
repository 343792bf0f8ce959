//! Version signaling between the cache manager and open pages.
//!
//! After activation the cache manager sends `{ "type": "NEW_VERSION" }` to
//! every registered page client. Each page consumes its messages through a
//! [`VersionWatcher`], which yields at most one reload per page session no
//! matter how many notifications arrive. Delivery is best effort: a page
//! that misses the message keeps running the old shell until its next
//! natural reload.

pub mod clients;
pub mod message;
pub mod watcher;

pub use clients::{ClientId, ClientRegistry, PageConnection};
pub use message::ServiceMessage;
pub use watcher::{ReloadRequest, VersionWatcher};
