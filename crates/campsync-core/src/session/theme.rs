use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

/// Platform dark-mode hint for terminals.
///
/// `COLORFGBG` is "fg;bg"; a background of 0-6 or 8 means a dark terminal.
pub fn platform_prefers_dark() -> bool {
    std::env::var("COLORFGBG")
        .ok()
        .and_then(|value| value.rsplit(';').next().and_then(|bg| bg.parse::<u8>().ok()))
        .map(|bg| bg <= 6 || bg == 8)
        .unwrap_or(false)
}

/// Theme preference backed by the config file.
///
/// Read once at startup; every change is written straight back.
pub struct ThemeState {
    config_path: PathBuf,
    current: Theme,
}

impl ThemeState {
    /// Load the stored preference, falling back to the platform hint
    pub fn load(config_path: PathBuf, prefers_dark: bool) -> Result<Self> {
        let config = Config::load_from(&config_path)?;
        let current = config.theme.unwrap_or_else(|| {
            debug!(prefers_dark, "No stored theme, using platform hint");
            if prefers_dark {
                Theme::Dark
            } else {
                Theme::Light
            }
        });
        Ok(Self {
            config_path,
            current,
        })
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    pub fn set(&mut self, theme: Theme) -> Result<()> {
        let mut config = Config::load_from(&self.config_path)?;
        config.theme = Some(theme);
        config.save_to(&self.config_path)?;
        self.current = theme;
        Ok(())
    }

    pub fn toggle(&mut self) -> Result<Theme> {
        let next = self.current.toggled();
        self.set(next)?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_falls_back_to_platform_hint() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("config.json");

        assert_eq!(ThemeState::load(path.clone(), true).expect("load").current(), Theme::Dark);
        assert_eq!(ThemeState::load(path, false).expect("load").current(), Theme::Light);
    }

    #[test]
    fn test_toggle_persists() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("config.json");

        let mut state = ThemeState::load(path.clone(), false).expect("load");
        assert_eq!(state.toggle().expect("toggle"), Theme::Dark);

        // Stored value wins over the hint on the next startup
        let reloaded = ThemeState::load(path.clone(), false).expect("reload");
        assert_eq!(reloaded.current(), Theme::Dark);

        let config = Config::load_from(&path).expect("config");
        assert_eq!(config.theme, Some(Theme::Dark));
    }

    #[test]
    fn test_theme_wire_names() {
        assert_eq!(serde_json::to_string(&Theme::Dark).expect("serialize"), r#""dark""#);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
    }
}
