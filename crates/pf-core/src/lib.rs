//! Core page routing for pageflow
//!
//! This crate provides page registration, navigation history, the
//! mount-cache and the boundary to the UI toolkit that actually builds
//! pages. It has no UI dependency of its own.

pub mod config;
pub mod controller;
pub mod events;
pub mod navigation;
pub mod params;
pub mod renderer;
pub mod state;

use thiserror::Error;

// Re-export commonly used types
pub use config::{ConfigError, NavigatorConfig};
pub use controller::{Controller, NavRequest};
pub use events::EventBus;
pub use navigation::{
    HistoryStack, MountCache, NavigateOptions, NavigationEntry, NavigationOutcome,
    Navigator, PageRegistry,
};
pub use params::{PageParams, ParamError, ValueKind};
pub use renderer::{FactoryFor, HeadlessRenderer, Page, PageFactory, Renderer};
pub use state::{AppState, StateError, StateSnapshot};

/// The requested page name was never registered
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown page '{name}'")]
pub struct UnknownPageError {
    pub name: String,
}

/// A page factory or its `build` failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to construct page '{page}': {message}")]
pub struct PageConstructionError {
    pub page: String,
    pub message: String,
}

/// A cached frame no longer references a live mount target
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cached frame for '{page}' no longer has a mount target")]
pub struct CacheInconsistencyError {
    pub page: String,
}
