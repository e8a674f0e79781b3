use egui::{Context, TopBottomPanel, CentralPanel, Key};
use pf_core::{Navigator, Renderer};

use crate::renderer::EguiRenderer;

/// Commands the menu bar and keyboard shortcuts can issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Exit,
    Home,
    Back,
    Forward,
    Reload,
    ClearCache,
    ToggleTheme,
}

/// Snapshot of navigator state the shell needs for one frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavStatus {
    pub current_page: Option<String>,
    pub history_index: Option<usize>,
    pub history_len: usize,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    pub has_home: bool,
    pub cached_pages: usize,
}

impl NavStatus {
    pub fn from_navigator<R: Renderer>(navigator: &Navigator<R>) -> Self {
        Self {
            current_page: navigator.current_page().map(str::to_string),
            history_index: navigator.history().cursor(),
            history_len: navigator.history().len(),
            can_go_back: navigator.can_go_back(),
            can_go_forward: navigator.can_go_forward(),
            has_home: navigator.is_registered(HOME_PAGE),
            cached_pages: navigator.cached_pages(),
        }
    }

    /// "2/5" style history position
    pub fn position_label(&self) -> String {
        match self.history_index {
            Some(index) => format!("{}/{}", index + 1, self.history_len),
            None => "-".to_string(),
        }
    }
}

/// Page the Home command navigates to
pub const HOME_PAGE: &str = "home";

/// Shell configuration
pub struct ShellConfig {
    pub app_name: String,
    pub app_version: String,
    pub show_status_bar: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            app_name: "Pageflow".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            show_status_bar: true,
        }
    }
}

/// Application shell: menu bar, status bar and the page area
pub struct AppShell {
    config: ShellConfig,
    show_about: bool,
}

impl AppShell {
    pub fn new(config: ShellConfig) -> Self {
        Self {
            config,
            show_about: false,
        }
    }

    /// Draw the whole shell around the mounted page. Returns the command
    /// chosen this frame, if any.
    pub fn show(&mut self, ctx: &Context, status: &NavStatus, renderer: &EguiRenderer) -> Option<MenuAction> {
        let mut action = shortcuts(ctx, status);

        if let Some(chosen) = self.menu_bar(ctx, status) {
            action = Some(chosen);
        }

        if self.config.show_status_bar {
            status_bar(ctx, status);
        }

        CentralPanel::default().show(ctx, |ui| renderer.show(ui));

        self.about_window(ctx);
        action
    }

    fn menu_bar(&mut self, ctx: &Context, status: &NavStatus) -> Option<MenuAction> {
        let mut action = None;

        TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Exit").clicked() {
                        action = Some(MenuAction::Exit);
                        ui.close_menu();
                    }
                });

                ui.menu_button("View", |ui| {
                    let home = egui::Button::new("Home").shortcut_text("Alt+Home");
                    if ui.add_enabled(status.has_home, home).clicked() {
                        action = Some(MenuAction::Home);
                        ui.close_menu();
                    }

                    let back = egui::Button::new("Back").shortcut_text("Alt+Left");
                    if ui.add_enabled(status.can_go_back, back).clicked() {
                        action = Some(MenuAction::Back);
                        ui.close_menu();
                    }

                    let forward = egui::Button::new("Forward").shortcut_text("Alt+Right");
                    if ui.add_enabled(status.can_go_forward, forward).clicked() {
                        action = Some(MenuAction::Forward);
                        ui.close_menu();
                    }

                    let reload = egui::Button::new("Reload").shortcut_text("F5");
                    if ui.add_enabled(status.current_page.is_some(), reload).clicked() {
                        action = Some(MenuAction::Reload);
                        ui.close_menu();
                    }

                    ui.separator();

                    if ui.button("Clear Page Cache").clicked() {
                        action = Some(MenuAction::ClearCache);
                        ui.close_menu();
                    }

                    if ui.button("Toggle Theme").clicked() {
                        action = Some(MenuAction::ToggleTheme);
                        ui.close_menu();
                    }
                });

                ui.menu_button("Help", |ui| {
                    if ui.button("About").clicked() {
                        self.show_about = true;
                        ui.close_menu();
                    }
                });
            });
        });

        if action == Some(MenuAction::Exit) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
        action
    }

    fn about_window(&mut self, ctx: &Context) {
        let mut open = self.show_about;
        egui::Window::new("About")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.heading(&self.config.app_name);
                ui.label(format!("Version {}", self.config.app_version));
            });
        self.show_about = open;
    }
}

/// Map keyboard shortcuts to commands
pub fn shortcuts(ctx: &Context, status: &NavStatus) -> Option<MenuAction> {
    ctx.input(|i| {
        if i.modifiers.alt && i.key_pressed(Key::ArrowLeft) && status.can_go_back {
            Some(MenuAction::Back)
        } else if i.modifiers.alt && i.key_pressed(Key::ArrowRight) && status.can_go_forward {
            Some(MenuAction::Forward)
        } else if i.modifiers.alt && i.key_pressed(Key::Home) && status.has_home {
            Some(MenuAction::Home)
        } else if i.key_pressed(Key::F5) && status.current_page.is_some() {
            Some(MenuAction::Reload)
        } else {
            None
        }
    })
}

/// Render the bottom status bar
pub fn status_bar(ctx: &Context, status: &NavStatus) {
    TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            let page = status.current_page.as_deref().unwrap_or("(none)");
            ui.label(format!("Page: {}", page));
            ui.separator();
            ui.label(format!("History: {}", status.position_label()));

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("{} cached", status.cached_pages))
                    .on_hover_text("Built pages kept for reuse");
            });
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_label() {
        let mut status = NavStatus::default();
        assert_eq!(status.position_label(), "-");

        status.history_index = Some(1);
        status.history_len = 4;
        assert_eq!(status.position_label(), "2/4");
    }

    #[test]
    fn test_no_shortcut_without_input() {
        let ctx = Context::default();
        let status = NavStatus {
            can_go_back: true,
            current_page: Some("home".into()),
            ..NavStatus::default()
        };
        assert_eq!(shortcuts(&ctx, &status), None);
    }
}
