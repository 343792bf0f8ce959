use tokio::sync::mpsc;
use tracing::{debug, info};

use super::clients::PageConnection;
use super::ServiceMessage;
use crate::session::ReloadGuard;

/// Instruction for the page to reload itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadRequest;

/// Page-side consumer of version notifications.
pub struct VersionWatcher {
    inbox: mpsc::UnboundedReceiver<String>,
    guard: ReloadGuard,
}

impl VersionWatcher {
    pub fn new(connection: PageConnection, guard: ReloadGuard) -> Self {
        Self {
            inbox: connection.inbox,
            guard,
        }
    }

    /// Wait for a notification that should reload the page.
    ///
    /// Yields at most once per session; later notifications are swallowed.
    /// Returns `None` once the background context goes away.
    pub async fn next_reload(&mut self) -> Option<ReloadRequest> {
        while let Some(raw) = self.inbox.recv().await {
            if let Some(request) = self.handle(&raw) {
                return Some(request);
            }
        }
        None
    }

    /// Drain already-delivered notifications without waiting
    pub fn poll_reload(&mut self) -> Option<ReloadRequest> {
        while let Ok(raw) = self.inbox.try_recv() {
            if let Some(request) = self.handle(&raw) {
                return Some(request);
            }
        }
        None
    }

    fn handle(&self, raw: &str) -> Option<ReloadRequest> {
        match serde_json::from_str::<ServiceMessage>(raw) {
            Ok(ServiceMessage::NewVersion) => {
                if self.guard.try_arm() {
                    info!("New version available, reloading");
                    Some(ReloadRequest)
                } else {
                    debug!("Ignoring new-version notice, reload already triggered this session");
                    None
                }
            }
            Err(e) => {
                debug!(error = %e, message = raw, "Ignoring unknown client message");
                None
            }
        }
    }
}
