//! Mount-cache of built frames

use ahash::AHashMap;

/// Frames built earlier, keyed by page name
#[derive(Debug, Clone)]
pub struct MountCache<F> {
    frames: AHashMap<String, F>,
}

impl<F> MountCache<F> {
    pub fn new() -> Self {
        Self {
            frames: AHashMap::new(),
        }
    }

    pub fn get(&self, page: &str) -> Option<&F> {
        self.frames.get(page)
    }

    pub fn insert(&mut self, page: impl Into<String>, frame: F) -> Option<F> {
        self.frames.insert(page.into(), frame)
    }

    pub fn remove(&mut self, page: &str) -> Option<F> {
        self.frames.remove(page)
    }

    /// Remove every entry, handing back the frames
    pub fn drain(&mut self) -> Vec<(String, F)> {
        self.frames.drain().collect()
    }

    pub fn contains(&self, page: &str) -> bool {
        self.frames.contains_key(page)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl<F> Default for MountCache<F> {
    fn default() -> Self {
        Self::new()
    }
}
