use std::path::Path;

/// Shell assets pre-cached on install. Anything the shell needs offline
/// must be listed here.
pub const SHELL_ASSETS: &[&str] = &[
    "/",
    "/index.html",
    "/manifest.json",
    "/icon-192.png",
    "/icon-512.png",
    "/icon-192-dark.png",
    "/icon-512-dark.png",
];

/// Root document, the last-resort fallback for offline navigations
pub const ROOT_PATH: &str = "/";

/// Fixed list of shell asset paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellManifest {
    paths: Vec<String>,
}

impl Default for ShellManifest {
    fn default() -> Self {
        Self::new(SHELL_ASSETS.iter().copied())
    }
}

impl ShellManifest {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    /// Manifest paths with no matching file under a built public directory.
    /// The root path is served by `index.html`.
    pub fn missing_in(&self, public_dir: &Path) -> Vec<&str> {
        self.paths
            .iter()
            .map(String::as_str)
            .filter(|path| {
                let relative = path.trim_start_matches('/');
                let file = if relative.is_empty() {
                    public_dir.join("index.html")
                } else {
                    public_dir.join(relative)
                };
                !file.is_file()
            })
            .collect()
    }
}
