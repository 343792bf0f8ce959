//! Session-scoped client state.
//!
//! These replace ambient globals with explicit objects handed to the
//! components that need them:
//!
//! - `ReloadGuard`: lives for one page session; allows a single reload
//! - `InstallPromptSlot`: holds at most one pending install prompt
//! - `ThemeState`: light/dark preference persisted in the config file

pub mod prompt;
pub mod reload;
pub mod theme;

pub use prompt::InstallPromptSlot;
pub use reload::ReloadGuard;
pub use theme::{platform_prefers_dark, Theme, ThemeState};
