//! egui implementation of the renderer boundary
//!
//! egui redraws every frame, so "building" a page produces a retained
//! [`PageView`] that the renderer draws into the central panel until another
//! frame is mounted.

use std::cell::RefCell;
use std::rc::Rc;

use egui::Context;
use pf_core::{CacheInconsistencyError, Controller, PageFactory, PageParams, Renderer};
use tracing::{debug, info};

/// A built page, drawn once per UI frame while mounted
pub trait PageView {
    fn ui(&mut self, ui: &mut egui::Ui);
}

/// The content area handed to pages while they build
pub struct PageSlot {
    page: String,
    ctx: Context,
}

impl PageSlot {
    /// Registered name of the page being built
    pub fn page(&self) -> &str {
        &self.page
    }

    pub fn ctx(&self) -> &Context {
        &self.ctx
    }
}

/// Cache handle for a built page
#[derive(Clone)]
pub struct MountedPage {
    id: u64,
    generation: u64,
    page: String,
    view: Rc<RefCell<Box<dyn PageView>>>,
}

impl MountedPage {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn page(&self) -> &str {
        &self.page
    }
}

impl std::fmt::Debug for MountedPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MountedPage")
            .field("id", &self.id)
            .field("generation", &self.generation)
            .field("page", &self.page)
            .finish()
    }
}

/// Page factory type for the egui renderer
pub type EguiPageFactory = PageFactory<PageSlot, Box<dyn PageView>>;

pub struct EguiRenderer {
    ctx: Context,
    mounted: Option<MountedPage>,
    generation: u64,
    next_id: u64,
}

impl EguiRenderer {
    pub fn new(ctx: Context) -> Self {
        Self {
            ctx,
            mounted: None,
            generation: 0,
            next_id: 0,
        }
    }

    /// The mounted page, if any
    pub fn mounted(&self) -> Option<&MountedPage> {
        self.mounted.as_ref()
    }

    /// Tear down every built frame. Cached handles become stale and are
    /// rebuilt on their next visit; the mounted page stays on screen.
    pub fn invalidate_all(&mut self) {
        self.generation += 1;
        info!("Invalidated all built frames (generation {})", self.generation);
    }

    /// Draw the mounted page
    pub fn show(&self, ui: &mut egui::Ui) {
        match &self.mounted {
            Some(mounted) => mounted.view.borrow_mut().ui(ui),
            None => {
                ui.centered_and_justified(|ui| {
                    ui.weak("No page mounted");
                });
            }
        }
    }
}

impl Renderer for EguiRenderer {
    type Mount = PageSlot;
    type Output = Box<dyn PageView>;
    type Frame = MountedPage;

    fn build_and_mount(
        &mut self,
        page: &str,
        factory: &EguiPageFactory,
        controller: Controller,
        params: &PageParams,
    ) -> anyhow::Result<MountedPage> {
        info!("Rendering page: {}", page);

        let mut instance = factory.create(controller)?;
        let mut slot = PageSlot {
            page: page.to_string(),
            ctx: self.ctx.clone(),
        };
        let view = instance.build(&mut slot, params)?;

        let mounted = MountedPage {
            id: self.next_id,
            generation: self.generation,
            page: page.to_string(),
            view: Rc::new(RefCell::new(view)),
        };
        self.next_id += 1;
        self.mounted = Some(mounted.clone());
        self.ctx.request_repaint();

        debug!("Mounted frame {} for {}", mounted.id, page);
        Ok(mounted)
    }

    fn remount(&mut self, page: &str, frame: &MountedPage) -> Result<(), CacheInconsistencyError> {
        if frame.generation != self.generation {
            return Err(CacheInconsistencyError {
                page: page.to_string(),
            });
        }

        debug!("Mounting cached frame {} for {}", frame.id, page);
        self.mounted = Some(frame.clone());
        self.ctx.request_repaint();
        Ok(())
    }
}
