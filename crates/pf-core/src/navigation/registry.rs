//! Page name to factory table

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::renderer::PageFactory;
use crate::UnknownPageError;

/// Registered pages, in registration order
pub struct PageRegistry<M, O> {
    pages: IndexMap<String, PageFactory<M, O>>,
}

impl<M, O> PageRegistry<M, O> {
    pub fn new() -> Self {
        Self {
            pages: IndexMap::new(),
        }
    }

    /// Register a page. An existing registration under `name` is replaced
    /// and keeps its position.
    pub fn register(&mut self, name: impl Into<String>, factory: PageFactory<M, O>) {
        let name = name.into();
        if self.pages.insert(name.clone(), factory).is_some() {
            debug!("Replaced page registration: '{}'", name);
        } else {
            info!("Registered page: '{}'", name);
        }
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.pages.contains_key(name)
    }

    pub fn resolve(&self, name: &str) -> Result<&PageFactory<M, O>, UnknownPageError> {
        self.pages.get(name).ok_or_else(|| UnknownPageError {
            name: name.to_string(),
        })
    }

    /// Names in registration order
    pub fn list_names(&self) -> Vec<String> {
        self.pages.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl<M, O> Default for PageRegistry<M, O> {
    fn default() -> Self {
        Self::new()
    }
}
