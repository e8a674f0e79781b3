//! Demo pages registered by the application

use anyhow::{bail, Result};
use egui::{RichText, Ui};
use pf_core::state::keys;
use pf_core::{Controller, Page, PageFactory, PageParams};
use pf_ui::{theme, EguiNavigator, PageSlot, PageView, HOME_PAGE};
use serde_json::{json, Value};

pub const SETTINGS_PAGE: &str = "settings";
pub const PROFILE_PAGE: &str = "profile";
pub const ERROR_PAGE: &str = "error";
pub const BROKEN_PAGE: &str = "broken";

const SETTINGS_TABS: [&str; 3] = ["general", "display", "audio"];

type View = Box<dyn PageView>;

/// Register every demo page with the navigator
pub fn register_all(navigator: &mut EguiNavigator) {
    navigator.register(HOME_PAGE, PageFactory::new(|controller| Ok(HomePage { controller })));
    navigator.register(SETTINGS_PAGE, PageFactory::new(|controller| Ok(SettingsPage { controller })));
    navigator.register(PROFILE_PAGE, PageFactory::new(|controller| Ok(ProfilePage { controller })));
    navigator.register(ERROR_PAGE, PageFactory::new(|controller| Ok(ErrorPage { controller })));
    navigator.register(BROKEN_PAGE, PageFactory::new(|_| Ok(BrokenPage)));
}

fn nav_button(ui: &mut Ui, controller: &Controller, label: &str, page: &str, params: PageParams) {
    if ui.button(label).clicked() {
        controller.navigate(page, params);
    }
}

// ---------------------------------------------------------------------------
// Home
// ---------------------------------------------------------------------------

struct HomePage {
    controller: Controller,
}

impl Page<PageSlot, View> for HomePage {
    fn build(&mut self, _slot: &mut PageSlot, _params: &PageParams) -> Result<View> {
        Ok(Box::new(HomeView {
            controller: self.controller.clone(),
        }))
    }
}

struct HomeView {
    controller: Controller,
}

impl PageView for HomeView {
    fn ui(&mut self, ui: &mut Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(60.0);
            ui.heading("Pageflow");
            ui.add_space(12.0);
            ui.label("Pick a page. Back and forward live in the View menu.");
            ui.add_space(24.0);

            nav_button(ui, &self.controller, "Settings", SETTINGS_PAGE, PageParams::new().with("tab", "general"));
            nav_button(ui, &self.controller, "Profile", PROFILE_PAGE, PageParams::new());
            nav_button(ui, &self.controller, "Broken page", BROKEN_PAGE, PageParams::new());
        });
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

struct SettingsPage {
    controller: Controller,
}

impl Page<PageSlot, View> for SettingsPage {
    fn build(&mut self, _slot: &mut PageSlot, params: &PageParams) -> Result<View> {
        let tab = params.str("tab")?.unwrap_or("general");
        if !SETTINGS_TABS.contains(&tab) {
            bail!("unknown settings tab '{}'", tab);
        }

        Ok(Box::new(SettingsView {
            controller: self.controller.clone(),
            tab: tab.to_string(),
        }))
    }
}

struct SettingsView {
    controller: Controller,
    tab: String,
}

impl SettingsView {
    /// Switch tabs inside the mounted view; the `tab` param only picks the
    /// tab a fresh build opens on
    fn select_tab(&mut self, tab: &str) {
        if self.tab != tab {
            tracing::debug!("Settings tab: {} -> {}", self.tab, tab);
            self.tab = tab.to_string();
        }
    }
}

impl PageView for SettingsView {
    fn ui(&mut self, ui: &mut Ui) {
        ui.heading("Settings");
        ui.horizontal(|ui| {
            for tab in SETTINGS_TABS {
                if ui.selectable_label(self.tab == tab, tab).clicked() {
                    self.select_tab(tab);
                }
            }
        });
        ui.separator();

        match self.tab.as_str() {
            "display" => {
                let theme = self
                    .controller
                    .get_state(keys::THEME)
                    .ok()
                    .and_then(|v| v.as_str().map(str::to_string))
                    .unwrap_or_default();

                ui.label(format!("Theme: {}", theme));
                if ui.button("Switch theme").clicked() {
                    let next = if theme == "light" { "dark" } else { "light" };
                    if let Err(err) = self.controller.set_state(keys::THEME, next) {
                        tracing::warn!("Failed to change theme: {}", err);
                    }
                }
            }
            "audio" => {
                ui.label("No audio devices configured.");
            }
            _ => {
                let mut debug = self
                    .controller
                    .get_state(keys::DEBUG_MODE)
                    .ok()
                    .and_then(|v| v.as_bool())
                    .unwrap_or(false);
                if ui.checkbox(&mut debug, "Debug mode").changed() {
                    if let Err(err) = self.controller.set_state(keys::DEBUG_MODE, debug) {
                        tracing::warn!("Failed to change debug mode: {}", err);
                    }
                }
            }
        }

        ui.add_space(12.0);
        nav_button(ui, &self.controller, "Home", HOME_PAGE, PageParams::new());
    }
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

struct ProfilePage {
    controller: Controller,
}

impl Page<PageSlot, View> for ProfilePage {
    fn build(&mut self, _slot: &mut PageSlot, _params: &PageParams) -> Result<View> {
        let session = self.controller.get_state(keys::SESSION_DATA)?;
        let name = session
            .get("user")
            .and_then(Value::as_str)
            .unwrap_or("guest")
            .to_string();

        Ok(Box::new(ProfileView {
            controller: self.controller.clone(),
            name,
        }))
    }
}

struct ProfileView {
    controller: Controller,
    name: String,
}

impl PageView for ProfileView {
    fn ui(&mut self, ui: &mut Ui) {
        ui.heading("Profile");
        ui.horizontal(|ui| {
            ui.label("Display name:");
            if ui.text_edit_singleline(&mut self.name).lost_focus() {
                let session = json!({ "user": self.name });
                if let Err(err) = self.controller.set_state(keys::SESSION_DATA, session) {
                    tracing::warn!("Failed to store profile: {}", err);
                }
            }
        });

        ui.add_space(12.0);
        if ui.button("Back").clicked() {
            self.controller.back();
        }
    }
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

struct ErrorPage {
    controller: Controller,
}

impl Page<PageSlot, View> for ErrorPage {
    fn build(&mut self, _slot: &mut PageSlot, params: &PageParams) -> Result<View> {
        Ok(Box::new(ErrorView {
            controller: self.controller.clone(),
            page: params.str("page")?.unwrap_or("unknown").to_string(),
            message: params.require_str("message")?.to_string(),
        }))
    }
}

struct ErrorView {
    controller: Controller,
    page: String,
    message: String,
}

impl PageView for ErrorView {
    fn ui(&mut self, ui: &mut Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(60.0);
            ui.label(RichText::new("⚠").size(32.0).color(theme::error_color()));
            ui.heading(format!("Could not open '{}'", self.page));
            ui.label(&self.message);
            ui.add_space(24.0);

            ui.horizontal(|ui| {
                if ui.button("Back").clicked() {
                    self.controller.back();
                }
                nav_button(ui, &self.controller, "Home", HOME_PAGE, PageParams::new());
            });
        });
    }
}

// ---------------------------------------------------------------------------
// Broken
// ---------------------------------------------------------------------------

/// Requires a parameter nothing passes, so it always fails to build
struct BrokenPage;

impl Page<PageSlot, View> for BrokenPage {
    fn build(&mut self, _slot: &mut PageSlot, params: &PageParams) -> Result<View> {
        let report = params.require_str("report_id")?;
        bail!("report '{}' could not be loaded", report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::{NavigateOptions, NavigationOutcome, Navigator, NavigatorConfig};
    use pf_ui::EguiRenderer;

    fn navigator() -> EguiNavigator {
        let mut navigator = Navigator::new(EguiRenderer::new(egui::Context::default()), NavigatorConfig::default());
        register_all(&mut navigator);
        navigator
    }

    #[test]
    fn test_all_pages_registered_in_order() {
        let navigator = navigator();
        assert_eq!(
            navigator.registered_pages(),
            vec![HOME_PAGE, SETTINGS_PAGE, PROFILE_PAGE, ERROR_PAGE, BROKEN_PAGE]
        );
    }

    fn rebuild() -> NavigateOptions {
        NavigateOptions {
            force_reload: true,
            add_to_history: true,
        }
    }

    #[test]
    fn test_settings_validates_tab() {
        let mut navigator = navigator();

        let bad = navigator
            .navigate(SETTINGS_PAGE, PageParams::new().with("tab", "secret"))
            .unwrap();
        assert_eq!(
            bad,
            NavigationOutcome::ErrorPage {
                failed: SETTINGS_PAGE.into(),
                message: "unknown settings tab 'secret'".into(),
            }
        );
        assert!(!navigator.is_cached(SETTINGS_PAGE));

        let ok = navigator
            .navigate(SETTINGS_PAGE, PageParams::new().with("tab", "display"))
            .unwrap();
        assert_eq!(ok, NavigationOutcome::Built { page: SETTINGS_PAGE.into() });

        let rebuilt = navigator
            .navigate_with(SETTINGS_PAGE, PageParams::new().with("tab", "secret"), rebuild())
            .unwrap();
        assert!(matches!(rebuilt, NavigationOutcome::ErrorPage { .. }));
        assert_eq!(navigator.current_page(), Some(ERROR_PAGE));
    }

    #[test]
    fn test_settings_opened_twice_with_different_tabs() {
        let mut navigator = navigator();
        navigator
            .navigate(SETTINGS_PAGE, PageParams::new().with("tab", "general"))
            .unwrap();

        let outcome = navigator
            .navigate_with(SETTINGS_PAGE, PageParams::new().with("tab", "audio"), rebuild())
            .unwrap();
        assert_eq!(outcome, NavigationOutcome::Built { page: SETTINGS_PAGE.into() });

        let entry = navigator.history().current().unwrap();
        assert_eq!(entry.params().require_str("tab").unwrap(), "audio");
        assert_eq!(navigator.history().len(), 2);
        assert_eq!(navigator.renderer().mounted().map(|m| m.page()), Some(SETTINGS_PAGE));
    }

    #[test]
    fn test_settings_tab_switch_stays_on_the_view() {
        let navigator = navigator();
        let controller = navigator.controller();
        let mut view = SettingsView {
            controller: controller.clone(),
            tab: "general".into(),
        };

        view.select_tab("audio");
        view.select_tab("audio");

        assert_eq!(view.tab, "audio");
        assert_eq!(controller.pending_requests(), 0);
        assert!(navigator.history().is_empty());
    }

    #[test]
    fn test_broken_page_shows_error_page() {
        let mut navigator = navigator();
        navigator.navigate(HOME_PAGE, PageParams::new()).unwrap();

        let outcome = navigator.navigate(BROKEN_PAGE, PageParams::new()).unwrap();
        assert_eq!(
            outcome,
            NavigationOutcome::ErrorPage {
                failed: BROKEN_PAGE.into(),
                message: "missing parameter 'report_id'".into(),
            }
        );
        assert_eq!(navigator.current_page(), Some(ERROR_PAGE));
        assert!(navigator.can_go_back());
    }

    #[test]
    fn test_profile_reads_session_state() {
        let mut navigator = navigator();
        navigator
            .controller()
            .set_state(keys::SESSION_DATA, json!({ "user": "ada" }))
            .unwrap();

        assert!(navigator.navigate(PROFILE_PAGE, PageParams::new()).unwrap().is_success());
    }
}
