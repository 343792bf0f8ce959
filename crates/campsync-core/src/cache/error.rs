use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    /// A manifest asset could not be fetched; the install is abandoned.
    #[error("Shell asset unavailable: {path} ({reason})")]
    ShellUnavailable { path: String, reason: String },

    #[error("Generation {0} is not installed")]
    NotInstalled(String),

    /// Network failed and nothing cached can stand in.
    #[error("Offline with no cached response for {0}")]
    Offline(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Cache storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}
