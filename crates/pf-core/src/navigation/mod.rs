use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

use crate::params::PageParams;

mod cache;
mod history;
mod navigator;
mod registry;

pub use cache::MountCache;
pub use history::{HistoryStack, DEFAULT_HISTORY_LIMIT};
pub use navigator::Navigator;
pub use registry::PageRegistry;

/// One record in the navigation history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationEntry {
    seq: u64,
    page: String,
    params: PageParams,
    created_at: DateTime<Utc>,
}

impl NavigationEntry {
    pub fn new(seq: u64, page: impl Into<String>, params: PageParams) -> Self {
        Self {
            seq,
            page: page.into(),
            params,
            created_at: Utc::now(),
        }
    }

    /// Monotonic sequence number assigned by the navigator
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn page(&self) -> &str {
        &self.page
    }

    pub fn params(&self) -> &PageParams {
        &self.params
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Switches for a single navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Rebuild the page even if a cached frame exists
    pub force_reload: bool,
    /// Record the transition so it can be reached with back/forward
    pub add_to_history: bool,
}

impl Default for NavigateOptions {
    fn default() -> Self {
        Self {
            force_reload: false,
            add_to_history: true,
        }
    }
}

impl NavigateOptions {
    /// Rebuild in place without touching history
    pub fn reload() -> Self {
        Self {
            force_reload: true,
            add_to_history: false,
        }
    }

    /// A transition that cannot be returned to with back()
    pub fn redirect() -> Self {
        Self {
            force_reload: false,
            add_to_history: false,
        }
    }
}

/// What a navigation ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The page was constructed and mounted
    Built { page: String },
    /// A cached frame was mounted again
    Remounted { page: String },
    /// Construction failed and the error page was shown instead
    ErrorPage { failed: String, message: String },
    /// Construction failed and no error page could be shown
    Failed { page: String, message: String },
}

impl NavigationOutcome {
    /// Whether the requested page itself is now mounted
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Built { .. } | Self::Remounted { .. })
    }
}
