//! egui front end for pageflow
//!
//! This crate provides the egui renderer that pages build into, plus the
//! application shell around it: menu bar, status bar and theme.

pub mod renderer;
pub mod shell;
pub mod theme;

pub use renderer::{EguiPageFactory, EguiRenderer, MountedPage, PageSlot, PageView};
pub use shell::{AppShell, MenuAction, NavStatus, ShellConfig, HOME_PAGE};
pub use theme::{Theme, apply_theme};

/// Navigator driven by the egui renderer
pub type EguiNavigator = pf_core::Navigator<EguiRenderer>;
