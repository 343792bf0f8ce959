use reqwest::{Method, Url};

use super::storage::ShellResponse;
use super::CacheError;

/// How the page issued a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    /// Top-level document load or reload
    Navigate,
    /// Subresource (script, stylesheet, icon, API call)
    Subresource,
}

/// A request seen by the cache manager.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: Method,
    pub url: Url,
    pub mode: RequestMode,
}

impl FetchRequest {
    pub fn new(method: Method, url: &str, mode: RequestMode) -> Result<Self, CacheError> {
        let url = Url::parse(url).map_err(|e| CacheError::InvalidUrl(format!("{}: {}", url, e)))?;
        Ok(Self { method, url, mode })
    }

    pub fn navigate(url: &str) -> Result<Self, CacheError> {
        Self::new(Method::GET, url, RequestMode::Navigate)
    }

    pub fn get(url: &str) -> Result<Self, CacheError> {
        Self::new(Method::GET, url, RequestMode::Subresource)
    }

    /// Cache key: path plus query, so `/` and `/?source=pwa` are distinct entries
    pub fn cache_key(&self) -> String {
        cache_key(&self.url)
    }
}

pub(crate) fn cache_key(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Network,
    Cache,
}

/// Decision taken for an intercepted request.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// Not handled; the caller performs the request itself.
    Passthrough,
    Respond {
        response: ShellResponse,
        source: ResponseSource,
    },
}

impl FetchOutcome {
    pub fn response(&self) -> Option<&ShellResponse> {
        match self {
            FetchOutcome::Passthrough => None,
            FetchOutcome::Respond { response, .. } => Some(response),
        }
    }

    pub fn source(&self) -> Option<ResponseSource> {
        match self {
            FetchOutcome::Passthrough => None,
            FetchOutcome::Respond { source, .. } => Some(*source),
        }
    }
}
