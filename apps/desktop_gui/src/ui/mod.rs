//! UI layer for the desktop app: app shell, themes, and reusable widgets.

pub mod app;
pub mod theme;
pub mod widgets;

pub use app::{AppPaths, RentalDeskApp, StartupConfig};
