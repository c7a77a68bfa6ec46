use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

type Factory<C> = Box<dyn Fn() -> C + Send + Sync>;

struct Slot<C> {
    controller: Arc<C>,
    touched: Instant,
}

/// Per-session controller instances, keyed by the session's workspace id.
///
/// Sessions never share a controller, so query state and banners stay
/// private to the operator who produced them. Entries not touched for the
/// idle period are dropped, matching the session store's inactivity expiry.
pub struct ControllerRegistry<C> {
    controllers: DashMap<String, Slot<C>>,
    factory: Factory<C>,
    idle: Duration,
}

impl<C> ControllerRegistry<C> {
    pub fn new(idle: Duration, factory: impl Fn() -> C + Send + Sync + 'static) -> Self {
        Self {
            controllers: DashMap::new(),
            factory: Box::new(factory),
            idle,
        }
    }

    pub fn get_or_create(&self, key: &str) -> Arc<C> {
        self.evict_idle();

        let mut slot = self
            .controllers
            .entry(key.to_string())
            .or_insert_with(|| Slot {
                controller: Arc::new((self.factory)()),
                touched: Instant::now(),
            });
        slot.touched = Instant::now();
        slot.controller.clone()
    }

    pub fn remove(&self, key: &str) -> Option<Arc<C>> {
        self.controllers.remove(key).map(|(_, slot)| slot.controller)
    }

    /// Drops every controller idle for longer than the configured period.
    /// Returns how many were dropped.
    pub fn evict_idle(&self) -> usize {
        if self.is_empty() {
            return 0;
        }

        let before = self.len();
        self.controllers
            .retain(|_, slot| slot.touched.elapsed() < self.idle);
        let evicted = before.saturating_sub(self.len());

        if evicted > 0 {
            tracing::debug!(evicted, remaining = self.len(), "Dropped idle controllers");
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}
