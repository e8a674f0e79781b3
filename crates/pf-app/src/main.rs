//! Main application entry point

use std::path::PathBuf;
use eframe::egui::{self, Context};
use anyhow::Result;
use tracing::{info, warn, error};

use pf_core::state::keys;
use pf_core::{Navigator, NavigatorConfig, PageParams};
use pf_ui::{
    apply_theme, AppShell, EguiNavigator, EguiRenderer, MenuAction, NavStatus, ShellConfig,
    Theme, HOME_PAGE,
};

mod pages;

/// Environment variable naming a navigator config file
const CONFIG_ENV: &str = "PAGEFLOW_CONFIG";

/// Environment variable naming the file app state is persisted to
const STATE_ENV: &str = "PAGEFLOW_STATE";

/// Main application state
struct PageflowApp {
    /// Page routing, history and cache
    navigator: EguiNavigator,

    /// Menu bar, status bar and about window
    shell: AppShell,

    /// Theme currently applied to the context
    theme: Theme,

    /// Where app state is saved on exit
    state_path: Option<PathBuf>,
}

impl PageflowApp {
    fn new(cc: &eframe::CreationContext<'_>, config: NavigatorConfig, state_path: Option<PathBuf>) -> Self {
        let mut navigator = Navigator::new(EguiRenderer::new(cc.egui_ctx.clone()), config);
        pages::register_all(&mut navigator);

        if let Some(path) = state_path.as_ref().filter(|p| p.exists()) {
            if let Err(e) = navigator.app_state().write().load_from_json(path) {
                warn!("Ignoring saved state {:?}: {}", path, e);
            }
        }

        let theme = current_theme(&navigator);
        apply_theme(&cc.egui_ctx, &theme);

        if let Err(e) = navigator.navigate(HOME_PAGE, PageParams::new()) {
            error!("Failed to open start page: {}", e);
        }

        Self {
            navigator,
            shell: AppShell::new(ShellConfig::default()),
            theme,
            state_path,
        }
    }

    /// Handle menu actions
    fn handle_action(&mut self, action: MenuAction) {
        info!("Menu action: {:?}", action);

        match action {
            MenuAction::Home => {
                if let Err(e) = self.navigator.navigate(HOME_PAGE, PageParams::new()) {
                    warn!("Home page not available: {}", e);
                }
            }
            MenuAction::Back => {
                self.navigator.back();
            }
            MenuAction::Forward => {
                self.navigator.forward();
            }
            MenuAction::Reload => {
                self.navigator.reload();
            }
            MenuAction::ClearCache => self.navigator.clear_cache(None),
            MenuAction::ToggleTheme => {
                let next = self.theme.toggled();
                if let Err(e) = self.navigator.controller().set_state(keys::THEME, next.name) {
                    warn!("Failed to toggle theme: {}", e);
                }
            }
            // the shell already asked the viewport to close
            MenuAction::Exit => {}
        }
    }

    /// Re-apply the theme when a page or the menu changed it
    fn sync_theme(&mut self, ctx: &Context) {
        let theme = current_theme(&self.navigator);
        if theme != self.theme {
            info!("Switching theme to {}", theme.name);
            apply_theme(ctx, &theme);
            // pages read the theme while building
            self.navigator.renderer_mut().invalidate_all();
            self.theme = theme;
        }
    }
}

fn current_theme(navigator: &EguiNavigator) -> Theme {
    let state = navigator.app_state();
    let state = state.read();
    let name = state
        .get_state(keys::THEME)
        .ok()
        .and_then(|v| v.as_str())
        .unwrap_or("dark");
    Theme::from_name(name)
}

impl eframe::App for PageflowApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let status = NavStatus::from_navigator(&self.navigator);

        if let Some(action) = self.shell.show(ctx, &status, self.navigator.renderer()) {
            self.handle_action(action);
        }

        // Requests queued by pages during this frame
        for result in self.navigator.process_requests() {
            if let Err(e) = result {
                warn!("Page requested an unknown page: {}", e);
            }
        }

        self.sync_theme(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Some(path) = &self.state_path {
            match self.navigator.app_state().read().save_to_json(path) {
                Ok(()) => info!("Saved state to {:?}", path),
                Err(e) => error!("Failed to save state to {:?}: {}", path, e),
            }
        }
    }
}

fn load_config() -> NavigatorConfig {
    let Some(path) = std::env::var_os(CONFIG_ENV).map(PathBuf::from) else {
        return NavigatorConfig::default();
    };

    match NavigatorConfig::from_json_file(&path) {
        Ok(config) => {
            info!("Loaded navigator config from {:?}", path);
            config
        }
        Err(e) => {
            warn!("{}; using defaults", e);
            NavigatorConfig::default()
        }
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting Pageflow");

    let config = load_config();
    let state_path = std::env::var_os(STATE_ENV).map(PathBuf::from);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([960.0, 640.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Pageflow",
        options,
        Box::new(move |cc| {
            Box::new(PageflowApp::new(cc, config, state_path))
        }),
    ).map_err(|e| anyhow::anyhow!("Failed to run app: {}", e))?;

    Ok(())
}
