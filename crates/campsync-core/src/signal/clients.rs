use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::ServiceMessage;

/// Identifier of an open page client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(u64);

struct ClientEntry {
    id: ClientId,
    /// Generation controlling this page, None until claimed
    controller: Option<String>,
    sender: mpsc::UnboundedSender<String>,
}

#[derive(Default)]
struct RegistryInner {
    next_id: u64,
    clients: Vec<ClientEntry>,
}

/// Open page clients reachable from the background context.
/// Clone is cheap and shares the registry.
#[derive(Clone, Default)]
pub struct ClientRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

/// Page side of a registration: the client id and its message inbox.
pub struct PageConnection {
    pub id: ClientId,
    pub inbox: mpsc::UnboundedReceiver<String>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register an open page, optionally already controlled by a generation
    pub fn connect(&self, controller: Option<String>) -> PageConnection {
        let (sender, inbox) = mpsc::unbounded_channel();
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = ClientId(inner.next_id);
        inner.clients.push(ClientEntry {
            id,
            controller,
            sender,
        });
        debug!(client = id.0, "Page client connected");
        PageConnection { id, inbox }
    }

    /// Number of pages whose inbox is still open
    pub fn len(&self) -> usize {
        let mut inner = self.lock();
        inner.clients.retain(|c| !c.sender.is_closed());
        inner.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn controller_of(&self, id: ClientId) -> Option<String> {
        self.lock()
            .clients
            .iter()
            .find(|c| c.id == id)
            .and_then(|c| c.controller.clone())
    }

    /// Take control of every open page for `generation`. Returns the number
    /// of pages that were controlled by something else before.
    pub fn claim(&self, generation: &str) -> usize {
        let mut inner = self.lock();
        inner.clients.retain(|c| !c.sender.is_closed());
        let mut switched = 0;
        for client in inner.clients.iter_mut() {
            if client.controller.as_deref() != Some(generation) {
                client.controller = Some(generation.to_string());
                switched += 1;
            }
        }
        switched
    }

    /// Send a message to every open page. Pages that went away are dropped.
    /// Returns how many pages it was delivered to.
    pub fn broadcast(&self, message: &ServiceMessage) -> usize {
        let payload = match message.to_json() {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Failed to encode client message");
                return 0;
            }
        };

        let mut inner = self.lock();
        inner
            .clients
            .retain(|client| match client.sender.send(payload.clone()) {
                Ok(()) => true,
                Err(_) => {
                    debug!(client = client.id.0, "Dropping closed page client");
                    false
                }
            });
        inner.clients.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_and_broadcast() {
        let registry = ClientRegistry::new();
        let mut old_page = registry.connect(Some("camp-shell-v3".to_string()));
        let mut fresh_page = registry.connect(None);

        assert_eq!(registry.claim("camp-shell-v4"), 2);
        assert_eq!(registry.controller_of(old_page.id).as_deref(), Some("camp-shell-v4"));
        // Claiming again changes nothing
        assert_eq!(registry.claim("camp-shell-v4"), 0);

        assert_eq!(registry.broadcast(&ServiceMessage::NewVersion), 2);
        assert_eq!(old_page.inbox.try_recv().ok().as_deref(), Some(r#"{"type":"NEW_VERSION"}"#));
        assert!(fresh_page.inbox.try_recv().is_ok());
    }

    #[test]
    fn test_closed_pages_are_dropped() {
        let registry = ClientRegistry::new();
        let page = registry.connect(None);
        let _kept = registry.connect(None);
        drop(page);

        assert_eq!(registry.broadcast(&ServiceMessage::NewVersion), 1);
        assert_eq!(registry.len(), 1);
    }
}
