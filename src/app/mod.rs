//! Application module
//!
//! Contains the main application window and theming.

pub mod oralia_app;
pub mod theme;

pub use oralia_app::OraliaApp;
