use std::sync::Arc;
use parking_lot::Mutex;
use ahash::AHashMap;

/// Navigation event bus.
///
/// Handlers run synchronously inside `publish` while the handler table is
/// locked, so a handler must not publish or subscribe itself.
pub struct EventBus {
    handlers: Arc<Mutex<AHashMap<std::any::TypeId, Vec<Box<dyn EventHandler>>>>>,
}

/// Event trait that all events must implement
pub trait Event: Send + Sync + 'static {
    fn as_any(&self) -> &dyn std::any::Any;
}

/// Handler trait for event handlers
pub trait EventHandler: Send + Sync {
    fn handle(&mut self, event: &dyn Event);
}

/// Events published by the navigator
pub mod events {
    use super::Event;

    /// A page was mounted, either freshly built or from the mount-cache
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct PageMounted {
        pub page: String,
        pub from_cache: bool,
        /// Sequence number of the history entry, if one was pushed
        pub seq: Option<u64>,
    }

    /// A page failed to construct and the error path was taken
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct PageFailed {
        pub page: String,
        pub message: String,
    }

    /// The history cursor moved through back/forward
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct HistoryMoved {
        pub index: usize,
        pub len: usize,
        /// Page of the entry the cursor now points at
        pub page: String,
        /// False when that page failed to mount and the error path ran
        pub mounted: bool,
    }

    /// Mount-cache entries were dropped; `page` is `None` for a full clear
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct CacheCleared {
        pub page: Option<String>,
    }

    macro_rules! impl_event {
        ($($t:ty),*) => {
            $(
                impl Event for $t {
                    fn as_any(&self) -> &dyn std::any::Any {
                        self
                    }
                }
            )*
        }
    }

    impl_event!(PageMounted, PageFailed, HistoryMoved, CacheCleared);
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Mutex::new(AHashMap::new())),
        }
    }

    /// Subscribe to events of a specific type
    pub fn subscribe<E: Event>(&self, handler: Box<dyn EventHandler>) {
        let type_id = std::any::TypeId::of::<E>();
        let mut handlers = self.handlers.lock();
        handlers.entry(type_id).or_insert_with(Vec::new).push(handler);
    }

    /// Subscribe a closure that receives the concrete event type
    pub fn subscribe_fn<E, F>(&self, mut f: F)
    where
        E: Event,
        F: FnMut(&E) + Send + Sync + 'static,
    {
        self.subscribe::<E>(handler_from_fn(move |event| {
            if let Some(event) = event.as_any().downcast_ref::<E>() {
                f(event);
            }
        }));
    }

    /// Publish an event
    pub fn publish<E: Event>(&self, event: E) {
        let type_id = std::any::TypeId::of::<E>();
        let mut handlers = self.handlers.lock();

        if let Some(event_handlers) = handlers.get_mut(&type_id) {
            for handler in event_handlers.iter_mut() {
                handler.handle(&event);
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper struct for creating event handlers from closures
pub struct ClosureEventHandler<F> {
    handler: F,
}

impl<F> EventHandler for ClosureEventHandler<F>
where
    F: FnMut(&dyn Event) + Send + Sync,
{
    fn handle(&mut self, event: &dyn Event) {
        (self.handler)(event);
    }
}

/// Create an event handler from a closure
pub fn handler_from_fn<F>(f: F) -> Box<dyn EventHandler>
where
    F: FnMut(&dyn Event) + Send + Sync + 'static,
{
    Box::new(ClosureEventHandler { handler: f })
}
