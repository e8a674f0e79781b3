//! The capability handed to pages
//!
//! A page never sees the navigator. It gets a [`Controller`] that can queue
//! navigation requests and read or write application state. Queued requests
//! run when the host calls [`Navigator::process_requests`](crate::Navigator::process_requests),
//! so a page may ask to navigate from inside its own UI callbacks.

use std::collections::VecDeque;
use std::sync::Arc;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;

use crate::params::PageParams;
use crate::state::{AppState, StateError};

/// A navigation action queued by a page
#[derive(Debug, Clone, PartialEq)]
pub enum NavRequest {
    Navigate { page: String, params: PageParams },
    Back,
    Forward,
}

#[derive(Clone)]
pub struct Controller {
    requests: Arc<Mutex<VecDeque<NavRequest>>>,
    state: Arc<RwLock<AppState>>,
}

impl Controller {
    pub fn new(state: Arc<RwLock<AppState>>) -> Self {
        Self {
            requests: Arc::new(Mutex::new(VecDeque::new())),
            state,
        }
    }

    /// Queue a navigation to `page`
    pub fn navigate(&self, page: impl Into<String>, params: PageParams) {
        self.requests.lock().push_back(NavRequest::Navigate {
            page: page.into(),
            params,
        });
    }

    /// Queue a step back through history
    pub fn back(&self) {
        self.requests.lock().push_back(NavRequest::Back);
    }

    /// Queue a step forward through history
    pub fn forward(&self) {
        self.requests.lock().push_back(NavRequest::Forward);
    }

    /// Read a state value
    pub fn get_state(&self, key: &str) -> Result<Value, StateError> {
        self.state.read().get_state(key).cloned()
    }

    /// Write a state value, validated against the schema
    pub fn set_state(&self, key: &str, value: impl Into<Value>) -> Result<(), StateError> {
        self.state.write().set_state(key, value)
    }

    /// Number of requests waiting to be processed
    pub fn pending_requests(&self) -> usize {
        self.requests.lock().len()
    }

    pub(crate) fn take_requests(&self) -> Vec<NavRequest> {
        self.requests.lock().drain(..).collect()
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("pending_requests", &self.pending_requests())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::keys;
    use serde_json::json;

    #[test]
    fn test_requests_are_queued_in_order() {
        let controller = Controller::new(Arc::new(RwLock::new(AppState::new())));
        controller.navigate("settings", PageParams::new().with("tab", "general"));
        controller.back();
        controller.forward();

        assert_eq!(controller.pending_requests(), 3);
        let requests = controller.take_requests();
        assert_eq!(
            requests,
            vec![
                NavRequest::Navigate {
                    page: "settings".into(),
                    params: PageParams::new().with("tab", "general"),
                },
                NavRequest::Back,
                NavRequest::Forward,
            ]
        );
        assert_eq!(controller.pending_requests(), 0);
    }

    #[test]
    fn test_state_is_shared_between_clones() {
        let state = Arc::new(RwLock::new(AppState::new()));
        let a = Controller::new(state.clone());
        let b = a.clone();

        a.set_state(keys::THEME, "light").unwrap();
        assert_eq!(b.get_state(keys::THEME).unwrap(), json!("light"));
        assert_eq!(state.read().get_state(keys::THEME).unwrap(), &json!("light"));
        assert!(b.set_state(keys::THEME, 3).is_err());
    }
}
