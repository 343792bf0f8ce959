use std::sync::{Mutex, MutexGuard};

use tokio::sync::Notify;

/// Holds the most recent deferred install prompt until it is consumed.
///
/// A capture arriving before consumption replaces the pending prompt.
/// Consumption takes the prompt out, so each prompt is used at most once.
#[derive(Debug)]
pub struct InstallPromptSlot<T> {
    pending: Mutex<Option<T>>,
    captured: Notify,
}

impl<T> Default for InstallPromptSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> InstallPromptSlot<T> {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(None),
            captured: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<T>> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Store a prompt, returning the one it replaced
    pub fn capture(&self, prompt: T) -> Option<T> {
        let replaced = self.lock().replace(prompt);
        self.captured.notify_one();
        replaced
    }

    pub fn take(&self) -> Option<T> {
        self.lock().take()
    }

    pub fn is_pending(&self) -> bool {
        self.lock().is_some()
    }

    /// Wait until a prompt is available and consume it
    pub async fn wait(&self) -> T {
        loop {
            if let Some(prompt) = self.take() {
                return prompt;
            }
            self.captured.notified().await;
        }
    }
}
