//! On-disk storage for cache generations.
//!
//! Layout: `<root>/<generation>/<key>.json`, where both the generation name
//! and the request key are URL-safe base64 so any tag or path is a valid
//! file name. Each entry file holds one [`ShellResponse`].

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Entry file extension
const ENTRY_EXTENSION: &str = "json";

/// Prefix for directories that are not generations (staged or retired
/// installs). Never produced by the base64 encoding.
const SCRATCH_PREFIX: char = '.';

/// A stored (or freshly fetched) HTTP response for a shell request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellResponse {
    /// Request path plus query
    pub key: String,
    pub status: u16,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    #[serde(with = "body_base64")]
    pub body: Vec<u8>,
    pub fetched_at: DateTime<Utc>,
}

impl ShellResponse {
    pub fn new(key: impl Into<String>, status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            status,
            headers: Vec::new(),
            body: body.into(),
            fetched_at: Utc::now(),
        }
    }

    /// Read a network response fully into memory
    pub async fn from_response(key: impl Into<String>, response: reqwest::Response) -> reqwest::Result<Self> {
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await?.to_vec();
        Ok(Self {
            key: key.into(),
            status,
            headers,
            body,
            fetched_at: Utc::now(),
        })
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.fetched_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Negative covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            if (minutes % 1440) / 60 >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }
}

mod body_base64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(body: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(body))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

/// Named cache generations on disk.
pub struct CacheStorage {
    root: PathBuf,
}

impl CacheStorage {
    pub fn new(root: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create cache root: {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn encode(name: &str) -> String {
        URL_SAFE_NO_PAD.encode(name.as_bytes())
    }

    fn decode(encoded: &str) -> Option<String> {
        URL_SAFE_NO_PAD
            .decode(encoded)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
    }

    fn generation_dir(&self, generation: &str) -> PathBuf {
        self.root.join(Self::encode(generation))
    }

    fn entry_path(&self, generation: &str, key: &str) -> PathBuf {
        Self::entry_file(&self.generation_dir(generation), key)
    }

    fn entry_file(dir: &Path, key: &str) -> PathBuf {
        dir.join(format!("{}.{}", Self::encode(key), ENTRY_EXTENSION))
    }

    /// Where a replacement for `generation` is written before it goes live
    pub fn staging_dir(&self, generation: &str) -> PathBuf {
        self.root
            .join(format!("{}staging-{}", SCRATCH_PREFIX, Self::encode(generation)))
    }

    fn retired_dir(&self, generation: &str) -> PathBuf {
        self.root
            .join(format!("{}retired-{}", SCRATCH_PREFIX, Self::encode(generation)))
    }

    /// Names of all stored generations, sorted
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in std::fs::read_dir(&self.root).context("Failed to list cache generations")? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name();
            if name.to_str().is_some_and(|n| n.starts_with(SCRATCH_PREFIX)) {
                continue;
            }
            match name.to_str().and_then(Self::decode) {
                Some(generation) => keys.push(generation),
                None => warn!(dir = ?name, "Skipping unrecognized cache directory"),
            }
        }
        keys.sort();
        Ok(keys)
    }

    pub fn has(&self, generation: &str) -> bool {
        self.generation_dir(generation).is_dir()
    }

    /// Create the generation if it does not exist yet
    pub fn open(&self, generation: &str) -> Result<()> {
        std::fs::create_dir_all(self.generation_dir(generation))
            .with_context(|| format!("Failed to open cache generation: {}", generation))
    }

    /// Delete a generation and everything in it. Returns false if it did not exist.
    pub fn delete(&self, generation: &str) -> Result<bool> {
        let dir = self.generation_dir(generation);
        if !dir.exists() {
            return Ok(false);
        }
        std::fs::remove_dir_all(&dir)
            .with_context(|| format!("Failed to delete cache generation: {}", generation))?;
        debug!(generation = generation, "Deleted cache generation");
        Ok(true)
    }

    pub fn put(&self, generation: &str, response: &ShellResponse) -> Result<()> {
        self.open(generation)?;
        let path = self.entry_path(generation, &response.key);
        let contents = serde_json::to_string(response)?;
        // Write then rename so a reader never sees a half-written entry
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, contents)
            .with_context(|| format!("Failed to write cache entry: {}", response.key))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to commit cache entry: {}", response.key))?;
        Ok(())
    }

    /// Replace a generation's whole contents with `responses`.
    ///
    /// Entries are written to a staging directory that is renamed into
    /// place only after every write succeeded. On failure the existing
    /// generation (if any) is left exactly as it was.
    pub fn replace_all(&self, generation: &str, responses: &[ShellResponse]) -> Result<()> {
        let staging = self.staging_dir(generation);
        if staging.is_dir() {
            std::fs::remove_dir_all(&staging)
                .with_context(|| format!("Failed to clear stale staging for: {}", generation))?;
        }

        let staged = Self::write_entries(&staging, responses);
        if let Err(e) = staged {
            if staging.is_dir() {
                if let Err(cleanup) = std::fs::remove_dir_all(&staging) {
                    warn!(error = %cleanup, "Failed to remove staged generation");
                }
            }
            return Err(e);
        }

        let live = self.generation_dir(generation);
        if !live.exists() {
            std::fs::rename(&staging, &live)
                .with_context(|| format!("Failed to commit cache generation: {}", generation))?;
            return Ok(());
        }

        let retired = self.retired_dir(generation);
        if retired.exists() {
            std::fs::remove_dir_all(&retired)
                .with_context(|| format!("Failed to clear retired generation: {}", generation))?;
        }
        std::fs::rename(&live, &retired)
            .with_context(|| format!("Failed to retire cache generation: {}", generation))?;
        if let Err(e) = std::fs::rename(&staging, &live) {
            // Put the previous contents back
            if let Err(restore) = std::fs::rename(&retired, &live) {
                warn!(generation = generation, error = %restore, "Failed to restore cache generation");
            }
            if let Err(cleanup) = std::fs::remove_dir_all(&staging) {
                warn!(error = %cleanup, "Failed to remove staged generation");
            }
            return Err(anyhow::Error::new(e)
                .context(format!("Failed to commit cache generation: {}", generation)));
        }
        if let Err(e) = std::fs::remove_dir_all(&retired) {
            warn!(generation = generation, error = %e, "Failed to remove retired generation");
        }
        debug!(generation = generation, entries = responses.len(), "Replaced cache generation");
        Ok(())
    }

    fn write_entries(dir: &Path, responses: &[ShellResponse]) -> Result<()> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create staging directory: {}", dir.display()))?;
        for response in responses {
            let contents = serde_json::to_string(response)?;
            std::fs::write(Self::entry_file(dir, &response.key), contents)
                .with_context(|| format!("Failed to write cache entry: {}", response.key))?;
        }
        Ok(())
    }

    pub fn get(&self, generation: &str, key: &str) -> Result<Option<ShellResponse>> {
        let path = self.entry_path(generation, key);
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache entry: {}", key))?;
        let response = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache entry: {}", key))?;
        Ok(Some(response))
    }

    /// Look a key up across every generation, trying `preferred` first
    pub fn match_key(&self, key: &str, preferred: &str) -> Result<Option<ShellResponse>> {
        if let Some(found) = self.get(preferred, key)? {
            return Ok(Some(found));
        }
        for generation in self.keys()? {
            if generation == preferred {
                continue;
            }
            if let Some(found) = self.get(&generation, key)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// All entries of a generation, sorted by key
    pub fn entries(&self, generation: &str) -> Result<Vec<ShellResponse>> {
        let dir = self.generation_dir(generation);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(ENTRY_EXTENSION) {
                continue;
            }
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read cache entry: {}", path.display()))?;
            match serde_json::from_str::<ShellResponse>(&contents) {
                Ok(response) => entries.push(response),
                Err(e) => debug!(path = %path.display(), error = %e, "Skipping unreadable cache entry"),
            }
        }
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn storage() -> (tempfile::TempDir, CacheStorage) {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let storage = CacheStorage::new(dir.path().join("shell")).expect("Failed to create storage");
        (dir, storage)
    }

    #[test]
    fn test_put_get_binary_body() {
        let (_dir, storage) = storage();
        let icon = ShellResponse::new("/icon-192.png", 200, vec![0x89, b'P', b'N', b'G', 0, 255]);
        storage.put("v1", &icon).expect("put");

        let loaded = storage.get("v1", "/icon-192.png").expect("get").expect("entry present");
        assert_eq!(loaded.body, icon.body);
        assert!(storage.get("v1", "/icon-512.png").expect("get").is_none());
        assert!(storage.get("v2", "/icon-192.png").expect("get").is_none());
    }

    #[test]
    fn test_keys_and_delete() {
        let (_dir, storage) = storage();
        storage.open("camp-shell-v3").expect("open");
        storage.put("camp-shell-v4", &ShellResponse::new("/", 200, "<html>")).expect("put");

        assert_eq!(storage.keys().expect("keys"), vec!["camp-shell-v3", "camp-shell-v4"]);
        assert!(storage.delete("camp-shell-v3").expect("delete"));
        assert!(!storage.delete("camp-shell-v3").expect("delete again"));
        assert_eq!(storage.keys().expect("keys"), vec!["camp-shell-v4"]);
    }

    #[test]
    fn test_generation_names_with_slashes_are_safe() {
        let (_dir, storage) = storage();
        storage.open("release/2024-06").expect("open");
        assert_eq!(storage.keys().expect("keys"), vec!["release/2024-06"]);
    }

    #[test]
    fn test_replace_all_swaps_whole_generation() {
        let (_dir, storage) = storage();
        storage.put("v4", &ShellResponse::new("/", 200, "old /")).expect("put");
        storage.put("v4", &ShellResponse::new("/trip", 200, "old trip")).expect("put");

        let fresh = vec![
            ShellResponse::new("/", 200, "new /"),
            ShellResponse::new("/manifest.json", 200, "{}"),
        ];
        storage.replace_all("v4", &fresh).expect("replace");

        let keys: Vec<String> = storage.entries("v4").expect("entries").into_iter().map(|e| e.key).collect();
        assert_eq!(keys, vec!["/", "/manifest.json"]);
        assert_eq!(storage.get("v4", "/").expect("get").expect("root").body, b"new /");
        assert_eq!(storage.keys().expect("keys"), vec!["v4"]);
    }

    #[test]
    fn test_failed_replace_leaves_generation_untouched() {
        let (_dir, storage) = storage();
        storage.put("v4", &ShellResponse::new("/", 200, "old /")).expect("put");
        storage.put("v4", &ShellResponse::new("/icon-192.png", 200, "old icon")).expect("put");

        // The second entry's file name is too long for the filesystem
        let fresh = vec![
            ShellResponse::new("/", 200, "new /"),
            ShellResponse::new(format!("/{}", "x".repeat(400)), 200, "too long"),
        ];
        assert!(storage.replace_all("v4", &fresh).is_err());

        let entries = storage.entries("v4").expect("entries");
        let bodies: Vec<&[u8]> = entries.iter().map(|e| e.body.as_slice()).collect();
        assert_eq!(bodies, vec![b"old /".as_slice(), b"old icon".as_slice()]);
        assert!(!storage.staging_dir("v4").exists());
        assert_eq!(storage.keys().expect("keys"), vec!["v4"]);
    }

    #[test]
    fn test_scratch_directories_are_not_generations() {
        let (_dir, storage) = storage();
        storage.open("v4").expect("open");
        std::fs::create_dir_all(storage.staging_dir("v5")).expect("create staging");
        assert_eq!(storage.keys().expect("keys"), vec!["v4"]);
    }

    #[test]
    fn test_match_key_prefers_given_generation() {
        let (_dir, storage) = storage();
        storage.put("old", &ShellResponse::new("/", 200, "old shell")).expect("put");
        storage.put("new", &ShellResponse::new("/", 200, "new shell")).expect("put");
        storage.put("old", &ShellResponse::new("/legacy.css", 200, "body{}")).expect("put");

        let root = storage.match_key("/", "new").expect("match").expect("root present");
        assert_eq!(root.body, b"new shell");
        let css = storage.match_key("/legacy.css", "new").expect("match");
        assert!(css.is_some());
        assert!(storage.match_key("/missing", "new").expect("match").is_none());
    }

    #[test]
    fn test_entries_sorted() {
        let (_dir, storage) = storage();
        storage.put("v1", &ShellResponse::new("/manifest.json", 200, "{}")).expect("put");
        storage.put("v1", &ShellResponse::new("/", 200, "<html>")).expect("put");
        let keys: Vec<String> = storage.entries("v1").expect("entries").into_iter().map(|e| e.key).collect();
        assert_eq!(keys, vec!["/", "/manifest.json"]);
    }

    #[test]
    fn test_age_display() {
        let mut response = ShellResponse::new("/", 200, "");
        assert_eq!(response.age_display(), "just now");

        response.fetched_at = Utc::now() - Duration::minutes(45);
        assert_eq!(response.age_display(), "45m ago");

        response.fetched_at = Utc::now() - Duration::minutes(95);
        assert_eq!(response.age_display(), "2h ago");

        response.fetched_at = Utc::now() - Duration::hours(30);
        assert_eq!(response.age_display(), "1d ago");
    }

    #[test]
    fn test_header_lookup_case_insensitive() {
        let mut response = ShellResponse::new("/", 200, "");
        response.headers.push(("content-type".to_string(), "text/html".to_string()));
        assert_eq!(response.header("Content-Type"), Some("text/html"));
        assert_eq!(response.header("etag"), None);
    }
}
