//! Toolkit-free renderer
//!
//! Pages write lines into a [`ContentArea`]; the renderer stores the result in
//! a frame slot and hands back a numbered [`FrameHandle`]. Destroying a slot
//! models the host window tearing the frame down.

use ahash::AHashMap;
use tracing::{debug, info};

use super::{PageFactory, Renderer};
use crate::controller::Controller;
use crate::params::PageParams;
use crate::CacheInconsistencyError;

/// Mount point handed to pages by [`HeadlessRenderer`]
#[derive(Debug, Default)]
pub struct ContentArea {
    lines: Vec<String>,
}

impl ContentArea {
    pub fn push_line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

/// Handle to a frame held by [`HeadlessRenderer`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrameHandle {
    id: u64,
    page: String,
}

impl FrameHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn page(&self) -> &str {
        &self.page
    }
}

#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    slots: AHashMap<u64, Vec<String>>,
    mounted: Option<FrameHandle>,
    next_id: u64,
    mount_count: usize,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The frame currently attached to the window
    pub fn mounted(&self) -> Option<&FrameHandle> {
        self.mounted.as_ref()
    }

    /// Content of the mounted frame
    pub fn mounted_content(&self) -> Option<&[String]> {
        let handle = self.mounted.as_ref()?;
        self.slots.get(&handle.id).map(Vec::as_slice)
    }

    /// Total number of mounts, fresh or cached
    pub fn mount_count(&self) -> usize {
        self.mount_count
    }

    pub fn live_frames(&self) -> usize {
        self.slots.len()
    }

    /// Tear a frame down, leaving any cached handle to it stale
    pub fn destroy(&mut self, frame: &FrameHandle) -> bool {
        if self.mounted.as_ref() == Some(frame) {
            self.mounted = None;
        }
        self.slots.remove(&frame.id).is_some()
    }

    fn attach(&mut self, frame: FrameHandle) {
        self.mount_count += 1;
        self.mounted = Some(frame);
    }
}

impl Renderer for HeadlessRenderer {
    type Mount = ContentArea;
    type Output = ();
    type Frame = FrameHandle;

    fn build_and_mount(
        &mut self,
        page: &str,
        factory: &PageFactory<ContentArea, ()>,
        controller: Controller,
        params: &PageParams,
    ) -> anyhow::Result<FrameHandle> {
        info!("Rendering page: {}", page);

        let mut instance = factory.create(controller)?;
        let mut area = ContentArea::default();
        instance.build(&mut area, params)?;

        let frame = FrameHandle {
            id: self.next_id,
            page: page.to_string(),
        };
        self.next_id += 1;
        self.slots.insert(frame.id, area.lines);
        self.attach(frame.clone());

        debug!("Mounted frame {} for {}", frame.id, page);
        Ok(frame)
    }

    fn remount(&mut self, page: &str, frame: &FrameHandle) -> Result<(), CacheInconsistencyError> {
        if !self.slots.contains_key(&frame.id) {
            return Err(CacheInconsistencyError {
                page: page.to_string(),
            });
        }

        debug!("Mounting cached frame {} for {}", frame.id, page);
        self.attach(frame.clone());
        Ok(())
    }

    fn release(&mut self, page: &str, frame: &FrameHandle) {
        if self.slots.remove(&frame.id).is_some() {
            debug!("Released frame {} for {}", frame.id, page);
        }
    }
}
