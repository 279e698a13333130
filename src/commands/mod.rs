//! Tauri IPC command handlers, organized by functional domain.
//!
//! - `firewall`: groups, rules and rule drafts
//! - `settings`: API/proxy settings, locale, theme, dev panel
//! - `system`: clipboard, notifications, window focus, autostart, public IP lookup
//! - `state`: Shared `AppState` definition

pub(crate) mod firewall;
pub(crate) mod settings;
mod state;
pub(crate) mod system;

pub use state::AppState;
