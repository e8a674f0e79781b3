//! The boundary between the navigator and a UI toolkit
//!
//! The navigator never touches UI primitives. It hands a page factory to a
//! [`Renderer`], which instantiates the page, lets it build into the mount
//! point, attaches the result to the window and returns a frame handle the
//! navigator may cache.

use std::rc::Rc;

use crate::controller::Controller;
use crate::params::PageParams;
use crate::CacheInconsistencyError;

mod headless;

pub use headless::{ContentArea, FrameHandle, HeadlessRenderer};

/// A unit of UI content that can build itself into a mount point
pub trait Page<M, O> {
    /// Build the page's content. `params` should be narrowed here.
    fn build(&mut self, mount: &mut M, params: &PageParams) -> anyhow::Result<O>;
}

type CreateFn<M, O> = dyn Fn(Controller) -> anyhow::Result<Box<dyn Page<M, O>>>;

/// Produces page instances from a controller
pub struct PageFactory<M, O> {
    create: Rc<CreateFn<M, O>>,
}

impl<M: 'static, O: 'static> PageFactory<M, O> {
    pub fn new<P, C>(create: C) -> Self
    where
        P: Page<M, O> + 'static,
        C: Fn(Controller) -> anyhow::Result<P> + 'static,
    {
        Self {
            create: Rc::new(move |controller| {
                let page = create(controller)?;
                Ok(Box::new(page) as Box<dyn Page<M, O>>)
            }),
        }
    }
}

impl<M, O> PageFactory<M, O> {
    /// Instantiate a page
    pub fn create(&self, controller: Controller) -> anyhow::Result<Box<dyn Page<M, O>>> {
        (self.create)(controller)
    }

    /// Whether two factories are the same registration
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.create, &other.create)
    }
}

impl<M, O> Clone for PageFactory<M, O> {
    fn clone(&self) -> Self {
        Self {
            create: self.create.clone(),
        }
    }
}

impl<M, O> std::fmt::Debug for PageFactory<M, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageFactory").finish_non_exhaustive()
    }
}

/// Construction and mounting capability injected into the navigator
pub trait Renderer {
    /// What pages build into
    type Mount;
    /// What a page's `build` returns
    type Output;
    /// Handle to a mounted frame, kept in the mount-cache
    type Frame: Clone;

    /// Instantiate a page, build it with `params` and mount the result
    fn build_and_mount(
        &mut self,
        page: &str,
        factory: &PageFactory<Self::Mount, Self::Output>,
        controller: Controller,
        params: &PageParams,
    ) -> anyhow::Result<Self::Frame>;

    /// Mount a previously built frame again
    fn remount(&mut self, page: &str, frame: &Self::Frame) -> Result<(), CacheInconsistencyError>;

    /// Tear down a frame the navigator will never mount again. Never called
    /// for the frame currently on screen.
    fn release(&mut self, _page: &str, _frame: &Self::Frame) {}
}

/// Factory type accepted by a given renderer
pub type FactoryFor<R> = PageFactory<<R as Renderer>::Mount, <R as Renderer>::Output>;
