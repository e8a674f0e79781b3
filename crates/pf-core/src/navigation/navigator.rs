//! Page navigation controller

use std::sync::Arc;
use parking_lot::RwLock;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use super::{HistoryStack, MountCache, NavigateOptions, NavigationEntry, NavigationOutcome, PageRegistry};
use crate::config::NavigatorConfig;
use crate::controller::{Controller, NavRequest};
use crate::events::events::{CacheCleared, HistoryMoved, PageFailed, PageMounted};
use crate::events::EventBus;
use crate::params::PageParams;
use crate::renderer::{FactoryFor, Renderer};
use crate::state::{keys, AppState, StateError};
use crate::{PageConstructionError, UnknownPageError};

/// Rounds of request draining before re-queued requests are dropped
const MAX_REQUEST_ROUNDS: usize = 8;

/// The single entry point for page transitions.
///
/// Owns the registry, the history and the mount-cache; UI construction goes
/// through the injected renderer. All calls are expected on the UI thread.
pub struct Navigator<R: Renderer> {
    renderer: R,
    config: NavigatorConfig,
    registry: PageRegistry<R::Mount, R::Output>,
    cache: MountCache<R::Frame>,
    history: HistoryStack,
    next_seq: u64,
    /// Page and params currently attached to the window
    mounted: Option<(String, PageParams)>,
    /// Frame on screen that the cache does not hold, released once replaced
    detached: Option<(String, R::Frame)>,
    state: Arc<RwLock<AppState>>,
    controller: Controller,
    events: Arc<EventBus>,
}

impl<R: Renderer> Navigator<R> {
    /// Create a navigator with fresh application state
    pub fn new(renderer: R, config: NavigatorConfig) -> Self {
        Self::with_state(renderer, config, Arc::new(RwLock::new(AppState::new())))
    }

    /// Create a navigator sharing an existing application state
    pub fn with_state(renderer: R, config: NavigatorConfig, state: Arc<RwLock<AppState>>) -> Self {
        info!(
            "Navigator initialised (cache={}, error_page={:?}, max_history={})",
            config.enable_cache, config.error_page, config.max_history
        );

        Self {
            renderer,
            registry: PageRegistry::new(),
            cache: MountCache::new(),
            history: HistoryStack::with_limit(config.max_history),
            next_seq: 0,
            mounted: None,
            detached: None,
            controller: Controller::new(state.clone()),
            state,
            events: Arc::new(EventBus::new()),
            config,
        }
    }

    // ---------------------------------------------------------------------
    // Registration
    // ---------------------------------------------------------------------

    pub fn register(&mut self, name: impl Into<String>, factory: FactoryFor<R>) {
        self.registry.register(name, factory);
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.registry.is_registered(name)
    }

    pub fn registered_pages(&self) -> Vec<String> {
        self.registry.list_names()
    }

    // ---------------------------------------------------------------------
    // Navigation
    // ---------------------------------------------------------------------

    /// Navigate to a registered page, recording it in history
    pub fn navigate(&mut self, name: &str, params: PageParams) -> Result<NavigationOutcome, UnknownPageError> {
        self.navigate_with(name, params, NavigateOptions::default())
    }

    /// Navigate with explicit cache and history switches.
    ///
    /// Only an unregistered `name` is returned as an error. Construction
    /// failures are logged and routed to the configured error page.
    pub fn navigate_with(
        &mut self,
        name: &str,
        params: PageParams,
        options: NavigateOptions,
    ) -> Result<NavigationOutcome, UnknownPageError> {
        let factory = match self.registry.resolve(name) {
            Ok(factory) => factory.clone(),
            Err(err) if self.config.route_unknown_to_error_page && !self.is_error_page(name) => {
                warn!("{}; showing error page", err);
                return Ok(self.show_error_page(name, err.to_string(), options));
            }
            Err(err) => {
                warn!("Navigation rejected: {}", err);
                return Err(err);
            }
        };

        info!(
            "Navigating to '{}' (params={}, force_reload={})",
            name, params, options.force_reload
        );

        let outcome = if !options.force_reload && self.remount_cached(name) {
            NavigationOutcome::Remounted { page: name.to_string() }
        } else {
            if options.force_reload {
                if let Some(frame) = self.cache.remove(name) {
                    debug!("Invalidated cached frame for '{}'", name);
                    self.evict(name, frame);
                }
            }

            let built = self
                .renderer
                .build_and_mount(name, &factory, self.controller.clone(), &params)
                .map_err(|err| PageConstructionError {
                    page: name.to_string(),
                    message: format!("{err:#}"),
                });

            match built {
                Ok(frame) => {
                    if self.config.enable_cache && !self.is_error_page(name) {
                        self.cache.insert(name, frame);
                        self.track_mounted(name, None);
                        debug!("Cached page: '{}'", name);
                    } else {
                        self.track_mounted(name, Some(frame));
                    }
                    NavigationOutcome::Built { page: name.to_string() }
                }
                Err(err) => {
                    error!("{} (params={})", err, params);
                    return Ok(self.show_error_page(name, err.message, options));
                }
            }
        };

        let from_cache = matches!(outcome, NavigationOutcome::Remounted { .. });
        let seq = self.finish_transition(name, params, options.add_to_history);
        self.events.publish(PageMounted {
            page: name.to_string(),
            from_cache,
            seq,
        });

        info!("Navigation complete: '{}'", name);
        Ok(outcome)
    }

    /// Step back through history. `None` at the start of history.
    pub fn back(&mut self) -> Option<NavigationOutcome> {
        let Some(entry) = self.history.back().cloned() else {
            debug!("Cannot go back: at start of history");
            return None;
        };

        info!("Going back to '{}'", entry.page());
        Some(self.revisit(entry))
    }

    /// Step forward through history. `None` at the end of history.
    pub fn forward(&mut self) -> Option<NavigationOutcome> {
        let Some(entry) = self.history.forward().cloned() else {
            debug!("Cannot go forward: at end of history");
            return None;
        };

        info!("Going forward to '{}'", entry.page());
        Some(self.revisit(entry))
    }

    /// Rebuild the mounted page, bypassing the cache and leaving history
    /// alone. `None` when nothing is mounted.
    pub fn reload(&mut self) -> Option<NavigationOutcome> {
        let Some((page, params)) = self.mounted.clone() else {
            warn!("Cannot reload: no current page");
            return None;
        };

        info!("Reloading page: '{}'", page);
        Some(self.settle(&page, params, NavigateOptions::reload()))
    }

    /// Drop one page's cached frame, or every cached frame for `None`
    pub fn clear_cache(&mut self, name: Option<&str>) {
        match name {
            Some(page) => {
                if let Some(frame) = self.cache.remove(page) {
                    self.evict(page, frame);
                    info!("Cleared cache for page: '{}'", page);
                    self.events.publish(CacheCleared {
                        page: Some(page.to_string()),
                    });
                }
            }
            None => {
                let frames = self.cache.drain();
                let count = frames.len();
                for (page, frame) in frames {
                    self.evict(&page, frame);
                }
                info!("Cleared all page cache ({} frames)", count);
                self.events.publish(CacheCleared { page: None });
            }
        }
    }

    /// Run the navigation requests queued through controllers, in order.
    ///
    /// Requests queued while processing (redirects from a page's `build`)
    /// run in the same call. Back/forward requests that were no-ops produce
    /// no result.
    pub fn process_requests(&mut self) -> Vec<Result<NavigationOutcome, UnknownPageError>> {
        let mut results = Vec::new();

        for _ in 0..MAX_REQUEST_ROUNDS {
            let requests = self.controller.take_requests();
            if requests.is_empty() {
                return results;
            }

            for request in requests {
                let result = match request {
                    NavRequest::Navigate { page, params } => Some(self.navigate(&page, params)),
                    NavRequest::Back => self.back().map(Ok),
                    NavRequest::Forward => self.forward().map(Ok),
                };
                if let Some(Err(err)) = &result {
                    warn!("Queued navigation failed: {}", err);
                }
                results.extend(result);
            }
        }

        let dropped = self.controller.take_requests().len();
        if dropped > 0 {
            warn!(
                "Navigation requests kept re-queueing after {} rounds; dropped {}",
                MAX_REQUEST_ROUNDS, dropped
            );
        }
        results
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    /// Name of the page attached to the window
    pub fn current_page(&self) -> Option<&str> {
        self.mounted.as_ref().map(|(page, _)| page.as_str())
    }

    /// Page that was mounted before the current one
    pub fn previous_page(&self) -> Option<String> {
        self.state
            .read()
            .get_state(keys::PREVIOUS_PAGE)
            .ok()
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    pub fn can_go_back(&self) -> bool {
        self.history.can_go_back()
    }

    pub fn can_go_forward(&self) -> bool {
        self.history.can_go_forward()
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn is_cached(&self, name: &str) -> bool {
        self.cache.contains(name)
    }

    pub fn cached_pages(&self) -> usize {
        self.cache.len()
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    /// A controller handle for hosts and pages
    pub fn controller(&self) -> Controller {
        self.controller.clone()
    }

    pub fn app_state(&self) -> Arc<RwLock<AppState>> {
        self.state.clone()
    }

    pub fn events(&self) -> Arc<EventBus> {
        self.events.clone()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn is_error_page(&self, name: &str) -> bool {
        self.config.error_page.as_deref() == Some(name)
    }

    /// Mount the cached frame for `name`. A stale frame is evicted and
    /// reported as a miss.
    fn remount_cached(&mut self, name: &str) -> bool {
        if !self.config.enable_cache {
            return false;
        }
        let Some(frame) = self.cache.get(name) else {
            return false;
        };

        match self.renderer.remount(name, frame) {
            Ok(()) => {
                debug!("Using cached page: '{}'", name);
                self.track_mounted(name, None);
                true
            }
            Err(err) => {
                warn!("{}; rebuilding", err);
                if let Some(stale) = self.cache.remove(name) {
                    self.evict(name, stale);
                }
                false
            }
        }
    }

    /// Transition to a page already known to be registered
    fn revisit(&mut self, entry: NavigationEntry) -> NavigationOutcome {
        let outcome = self.settle(entry.page(), entry.params().clone(), NavigateOptions::redirect());
        if let Some(index) = self.history.cursor() {
            self.events.publish(HistoryMoved {
                index,
                len: self.history.len(),
                page: entry.page().to_string(),
                mounted: outcome.is_success(),
            });
        }
        outcome
    }

    fn settle(&mut self, page: &str, params: PageParams, options: NavigateOptions) -> NavigationOutcome {
        self.navigate_with(page, params, options).unwrap_or_else(|err| {
            error!("History refers to {}", err);
            NavigationOutcome::Failed {
                page: page.to_string(),
                message: err.to_string(),
            }
        })
    }

    /// Mount the configured error page in place of `failed`
    fn show_error_page(&mut self, failed: &str, message: String, options: NavigateOptions) -> NavigationOutcome {
        self.events.publish(PageFailed {
            page: failed.to_string(),
            message: message.clone(),
        });

        let fallback = |reason: &str| {
            error!("Cannot show error page for '{}': {}", failed, reason);
            NavigationOutcome::Failed {
                page: failed.to_string(),
                message: message.clone(),
            }
        };

        let Some(error_page) = self.config.error_page.clone() else {
            return fallback("no error page configured");
        };
        if error_page == failed {
            return fallback("the error page itself failed");
        }
        let Ok(factory) = self.registry.resolve(&error_page).cloned() else {
            return fallback("error page is not registered");
        };

        let params = PageParams::new()
            .with("message", message.clone())
            .with("page", failed);

        let frame = match self
            .renderer
            .build_and_mount(&error_page, &factory, self.controller.clone(), &params)
        {
            Ok(frame) => frame,
            Err(err) => return fallback(&format!("{err:#}")),
        };
        self.track_mounted(&error_page, Some(frame));

        error!("Mounted error page '{}' for '{}'", error_page, failed);
        let seq = self.finish_transition(&error_page, params, options.add_to_history);
        self.events.publish(PageMounted {
            page: error_page,
            from_cache: false,
            seq,
        });

        NavigationOutcome::ErrorPage {
            failed: failed.to_string(),
            message,
        }
    }

    /// Record a completed transition in history and state
    fn finish_transition(&mut self, page: &str, params: PageParams, add_to_history: bool) -> Option<u64> {
        let seq = add_to_history.then(|| {
            let seq = self.next_seq;
            self.next_seq += 1;
            self.history.push(NavigationEntry::new(seq, page, params.clone()));
            debug!(
                "History updated: index={:?}, length={}",
                self.history.cursor(),
                self.history.len()
            );
            seq
        });

        if seq.is_some() {
            let entries: Vec<Value> = self
                .history
                .entries()
                .map(|e| json!({ "page": e.page(), "params": e.params() }))
                .collect();
            self.state_mirror(keys::NAVIGATION_HISTORY, entries);
        }

        if let Some((previous, _)) = self.mounted.replace((page.to_string(), params)) {
            self.state_mirror(keys::PREVIOUS_PAGE, previous);
        }
        self.state_mirror(keys::CURRENT_PAGE, page);
        let index = self.history.cursor().map_or(-1, |i| i as i64);
        self.state_mirror(keys::HISTORY_INDEX, index);
        seq
    }

    /// Note the frame now on screen and release the one it replaced, if the
    /// cache does not hold it. `frame` is `None` for cached frames.
    fn track_mounted(&mut self, page: &str, frame: Option<R::Frame>) {
        if let Some((previous, old)) = self.detached.take() {
            self.renderer.release(&previous, &old);
        }
        self.detached = frame.map(|frame| (page.to_string(), frame));
    }

    /// Hand a frame dropped from the cache back to the renderer. The frame
    /// on screen is kept until something replaces it.
    fn evict(&mut self, page: &str, frame: R::Frame) {
        if self.detached.is_none() && self.current_page() == Some(page) {
            self.detached = Some((page.to_string(), frame));
        } else {
            self.renderer.release(page, &frame);
        }
    }

    /// Write a navigation key, tolerating schemas that do not declare it
    fn state_mirror(&self, key: &str, value: impl Into<Value>) {
        match self.state.write().set_state(key, value) {
            Ok(()) => {}
            Err(StateError::UnknownKey { .. }) => debug!("State has no '{}' key; not mirrored", key),
            Err(err) => warn!("Failed to mirror navigation state: {}", err),
        }
    }
}
