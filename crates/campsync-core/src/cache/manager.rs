//! Lifecycle and fetch policy for the offline shell cache.

use std::sync::{Mutex, MutexGuard};

use futures::future::try_join_all;
use reqwest::{Client, Method, Url};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::manifest::{ShellManifest, ROOT_PATH};
use super::request::{cache_key, FetchOutcome, FetchRequest, RequestMode, ResponseSource};
use super::storage::{CacheStorage, ShellResponse};
use super::CacheError;
use crate::signal::{ClientRegistry, ServiceMessage};

/// Where the cache manager is in its install/activate lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    Parsed,
    Installing,
    Installed,
    /// Install aborted; the previous generation stays in charge
    InstallFailed,
    Activating,
    Activated,
}

/// Result of an activation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationReport {
    pub deleted: Vec<String>,
    /// Pages that switched to the current generation
    pub claimed: usize,
    /// Pages the new-version notice was delivered to
    pub notified: usize,
}

#[derive(Debug, Clone)]
pub struct GenerationStatus {
    pub name: String,
    pub current: bool,
    pub entries: Vec<ShellResponse>,
}

impl GenerationStatus {
    pub fn total_bytes(&self) -> u64 {
        self.entries.iter().map(|e| e.body.len() as u64).sum()
    }

    /// Age of the most recently stored entry
    pub fn last_updated(&self) -> String {
        self.entries
            .iter()
            .max_by_key(|e| e.fetched_at)
            .map(|e| e.age_display())
            .unwrap_or_else(|| "never".to_string())
    }
}

/// Holds a transitional phase while work is in progress.
///
/// Dropping the guard without [`PhaseGuard::finish`] (an early `?` return,
/// a panic, or the future being cancelled) falls back to `on_abort`, so the
/// manager never stays stuck in `Installing` or `Activating`.
struct PhaseGuard<'a> {
    phase: &'a Mutex<LifecyclePhase>,
    on_abort: LifecyclePhase,
    finished: bool,
}

impl<'a> PhaseGuard<'a> {
    fn enter(phase: &'a Mutex<LifecyclePhase>, during: LifecyclePhase, on_abort: LifecyclePhase) -> Self {
        *lock_phase(phase) = during;
        Self {
            phase,
            on_abort,
            finished: false,
        }
    }

    fn finish(mut self, phase: LifecyclePhase) {
        *lock_phase(self.phase) = phase;
        self.finished = true;
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            *lock_phase(self.phase) = self.on_abort;
        }
    }
}

fn lock_phase(phase: &Mutex<LifecyclePhase>) -> MutexGuard<'_, LifecyclePhase> {
    phase.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Clone)]
pub struct CacheStatus {
    pub phase: LifecyclePhase,
    pub generations: Vec<GenerationStatus>,
}

/// Keeps the application shell available offline.
///
/// Storage sits behind an async `RwLock`: fetch handling reads, install
/// writes and activation take the write lock for the whole eviction pass, so
/// no fetch ever sees a half-deleted set of generations.
pub struct CacheManager {
    storage: RwLock<CacheStorage>,
    client: Client,
    origin: Url,
    generation: String,
    manifest: ShellManifest,
    phase: Mutex<LifecyclePhase>,
}

impl CacheManager {
    pub fn new(
        storage: CacheStorage,
        client: Client,
        origin: &str,
        generation: impl Into<String>,
        manifest: ShellManifest,
    ) -> Result<Self, CacheError> {
        let origin = Url::parse(origin)
            .map_err(|e| CacheError::InvalidUrl(format!("{}: {}", origin, e)))?;
        Ok(Self {
            storage: RwLock::new(storage),
            client,
            origin,
            generation: generation.into(),
            manifest,
            phase: Mutex::new(LifecyclePhase::Parsed),
        })
    }

    pub fn generation(&self) -> &str {
        &self.generation
    }

    pub fn manifest(&self) -> &ShellManifest {
        &self.manifest
    }

    pub fn phase(&self) -> LifecyclePhase {
        *lock_phase(&self.phase)
    }

    fn url_for(&self, path: &str) -> Result<Url, CacheError> {
        self.origin
            .join(path)
            .map_err(|e| CacheError::InvalidUrl(format!("{}: {}", path, e)))
    }

    /// Send + read the whole body; any failure here counts as the network failing
    async fn fetch_network(&self, url: &Url, key: &str) -> reqwest::Result<ShellResponse> {
        let response = self.client.get(url.clone()).send().await?;
        ShellResponse::from_response(key, response).await
    }

    async fn fetch_asset(&self, path: &str) -> Result<ShellResponse, CacheError> {
        let url = self.url_for(path)?;
        let response = self
            .fetch_network(&url, &cache_key(&url))
            .await
            .map_err(|e| CacheError::ShellUnavailable {
                path: path.to_string(),
                reason: e.to_string(),
            })?;

        if !response.is_success() {
            return Err(CacheError::ShellUnavailable {
                path: path.to_string(),
                reason: format!("status {}", response.status),
            });
        }
        debug!(path = path, bytes = response.body.len(), "Fetched shell asset");
        Ok(response)
    }

    /// Pre-cache every manifest asset under the current generation.
    ///
    /// Nothing is stored unless every asset was fetched successfully, and
    /// the generation is swapped in whole: re-installing an existing tag
    /// either replaces all of it or leaves it untouched.
    pub async fn install(&self) -> Result<(), CacheError> {
        let phase = PhaseGuard::enter(&self.phase, LifecyclePhase::Installing, LifecyclePhase::InstallFailed);
        info!(generation = %self.generation, assets = self.manifest.paths().len(), "Installing shell");

        let fetches = self.manifest.paths().iter().map(|path| self.fetch_asset(path));
        let responses = match try_join_all(fetches).await {
            Ok(responses) => responses,
            Err(e) => {
                warn!(generation = %self.generation, error = %e, "Shell install aborted");
                return Err(e);
            }
        };

        let storage = self.storage.write().await;
        if let Err(e) = storage.replace_all(&self.generation, &responses) {
            warn!(generation = %self.generation, error = %e, "Failed to store shell assets");
            return Err(e.into());
        }

        phase.finish(LifecyclePhase::Installed);
        info!(generation = %self.generation, "Shell installed");
        Ok(())
    }

    /// Evict every other generation, claim open pages and tell them a new
    /// version is live. Running it again is harmless.
    ///
    /// If eviction fails part-way the phase drops back to `Installed`: the
    /// current generation is intact and activation can be retried.
    pub async fn activate(&self, clients: &ClientRegistry) -> Result<ActivationReport, CacheError> {
        let storage = self.storage.write().await;
        if !storage.has(&self.generation) {
            return Err(CacheError::NotInstalled(self.generation.clone()));
        }
        let phase = PhaseGuard::enter(&self.phase, LifecyclePhase::Activating, LifecyclePhase::Installed);

        let mut deleted = Vec::new();
        for key in storage.keys()? {
            if key != self.generation {
                storage.delete(&key)?;
                deleted.push(key);
            }
        }
        drop(storage);

        let claimed = clients.claim(&self.generation);
        let notified = clients.broadcast(&ServiceMessage::NewVersion);
        phase.finish(LifecyclePhase::Activated);

        info!(
            generation = %self.generation,
            deleted = deleted.len(),
            claimed,
            notified,
            "Shell activated"
        );
        Ok(ActivationReport {
            deleted,
            claimed,
            notified,
        })
    }

    /// Install then activate straight away, without waiting for old pages to close
    pub async fn update(&self, clients: &ClientRegistry) -> Result<ActivationReport, CacheError> {
        self.install().await?;
        self.activate(clients).await
    }

    /// Decide how to answer one intercepted request.
    pub async fn handle_fetch(&self, request: &FetchRequest) -> Result<FetchOutcome, CacheError> {
        if request.method != Method::GET || request.url.origin() != self.origin.origin() {
            return Ok(FetchOutcome::Passthrough);
        }

        match request.mode {
            RequestMode::Navigate => self.network_first(request).await,
            RequestMode::Subresource => self.cache_first(request).await,
        }
    }

    async fn network_first(&self, request: &FetchRequest) -> Result<FetchOutcome, CacheError> {
        let key = request.cache_key();
        match self.fetch_network(&request.url, &key).await {
            Ok(response) => {
                if response.is_success() {
                    let storage = self.storage.write().await;
                    // A failed write must not cost the page its fresh shell
                    if let Err(e) = storage.put(&self.generation, &response) {
                        warn!(key = %key, error = %e, "Failed to cache navigation response");
                    }
                }
                Ok(FetchOutcome::Respond {
                    response,
                    source: ResponseSource::Network,
                })
            }
            Err(e) => {
                debug!(key = %key, error = %e, "Navigation fetch failed, falling back to cache");
                let storage = self.storage.read().await;
                let cached = match storage.match_key(&key, &self.generation)? {
                    Some(cached) => Some(cached),
                    None => storage.match_key(ROOT_PATH, &self.generation)?,
                };
                match cached {
                    Some(response) => Ok(FetchOutcome::Respond {
                        response,
                        source: ResponseSource::Cache,
                    }),
                    None => Err(CacheError::Offline(key)),
                }
            }
        }
    }

    async fn cache_first(&self, request: &FetchRequest) -> Result<FetchOutcome, CacheError> {
        let key = request.cache_key();
        {
            let storage = self.storage.read().await;
            if let Some(response) = storage.match_key(&key, &self.generation)? {
                return Ok(FetchOutcome::Respond {
                    response,
                    source: ResponseSource::Cache,
                });
            }
        }

        // Misses are not stored; only manifest assets and navigations are cached
        let response = self.fetch_network(&request.url, &key).await?;
        Ok(FetchOutcome::Respond {
            response,
            source: ResponseSource::Network,
        })
    }

    /// Cached response for a path, if any generation holds one
    pub async fn lookup(&self, path: &str) -> Result<Option<ShellResponse>, CacheError> {
        let storage = self.storage.read().await;
        Ok(storage.match_key(path, &self.generation)?)
    }

    pub async fn generations(&self) -> Result<Vec<String>, CacheError> {
        Ok(self.storage.read().await.keys()?)
    }

    pub async fn status(&self) -> Result<CacheStatus, CacheError> {
        let storage = self.storage.read().await;
        let mut generations = Vec::new();
        for name in storage.keys()? {
            let entries = storage.entries(&name)?;
            generations.push(GenerationStatus {
                current: name == self.generation,
                name,
                entries,
            });
        }
        Ok(CacheStatus {
            phase: self.phase(),
            generations,
        })
    }
}
