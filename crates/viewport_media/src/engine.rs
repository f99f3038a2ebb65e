//! The engine façade: owns the caches, the override store and the change notifier
//! for one viewport provider.

use crate::handle::MediaQueryList;
use crate::notifier::ChangeNotifier;
use crate::overrides::OverrideStore;
use crate::provider::ViewportProvider;
use crate::registry::QueryRegistry;
use crate::utilities::config::EngineConfig;
use crate::utilities::scheduler::FrameClock;
use core::cell::{Cell, RefCell};
use core::mem::take;
use css_media_queries::{FeatureOverrides, MediaEnvironment, MediaQuery, ViewportSize, evaluate};
use log::{debug, trace, warn};
use std::rc::{Rc, Weak};
use tracing::info_span;

/// What triggered a sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SweepReason {
    Resize,
    Overrides,
}

impl SweepReason {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Resize => "resize",
            Self::Overrides => "overrides",
        }
    }
}

/// Counters describing the engine's activity since construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Lists currently cached.
    pub lists: usize,
    /// Distinct raw strings in the parse cache (including failures).
    pub parsed_queries: usize,
    /// Raw resize signals received from the provider.
    pub resize_signals: u64,
    /// Signals absorbed by an already scheduled frame.
    pub coalesced_signals: u64,
    /// Completed sweep passes, follow-ups included.
    pub sweeps: u64,
    /// Number of override replacements.
    pub override_revision: u64,
}

struct EngineState {
    provider: Rc<dyn ViewportProvider>,
    clock: Rc<dyn FrameClock>,
    config: EngineConfig,
    registry: RefCell<QueryRegistry>,
    overrides: RefCell<OverrideStore>,
    notifier: RefCell<ChangeNotifier>,
    /// Set while a sweep is dispatching; nested requests become follow-ups.
    sweeping: Cell<bool>,
    follow_up: Cell<bool>,
    sweeps: Cell<u64>,
    /// Bumped on teardown so an in-flight sweep stops touching stale lists.
    generation: Cell<u64>,
    destroyed: Cell<bool>,
}

/// Evaluates media queries against a virtual viewport and keeps the lists it
/// hands out up to date. Clones share the same engine.
#[derive(Clone)]
pub struct MediaEngine {
    state: Rc<EngineState>,
}

impl MediaEngine {
    /// Create an engine with the default configuration.
    pub fn new(provider: Rc<dyn ViewportProvider>, clock: Rc<dyn FrameClock>) -> Self {
        Self::with_config(provider, clock, EngineConfig::default())
    }

    /// Create an engine and start observing `provider` for size changes.
    pub fn with_config(
        provider: Rc<dyn ViewportProvider>,
        clock: Rc<dyn FrameClock>,
        config: EngineConfig,
    ) -> Self {
        let state = Rc::new(EngineState {
            provider,
            clock,
            config,
            registry: RefCell::new(QueryRegistry::default()),
            overrides: RefCell::new(OverrideStore::default()),
            notifier: RefCell::new(ChangeNotifier::default()),
            sweeping: Cell::new(false),
            follow_up: Cell::new(false),
            sweeps: Cell::new(0),
            generation: Cell::new(0),
            destroyed: Cell::new(false),
        });
        let weak = Rc::downgrade(&state);
        let unobserve = state.provider.observe(Rc::new(move || {
            if let Some(engine) = weak.upgrade() {
                engine.on_resize_signal();
            }
        }));
        state.notifier.borrow_mut().attach(unobserve);
        debug!("media engine attached to viewport {:?}", state.provider.size());
        Self { state }
    }

    /// `matchMedia`: return the cached list for `query`, creating it on first use.
    ///
    /// Never fails. A query that does not parse yields a list that never matches.
    ///
    /// The engine owns every list and a list owns its listeners, so a listener
    /// that captures a [`MediaEngine`] keeps the engine alive until [`Self::destroy`].
    /// Capture a [`WeakMediaEngine`] from [`Self::downgrade`] instead.
    pub fn match_media(&self, query: &str) -> MediaQueryList {
        self.state.register(query)
    }

    /// Replace (not merge) the override map and re-sweep synchronously.
    ///
    /// Called from inside a listener, the sweep is queued and runs once the
    /// current sweep finishes. At most [`EngineConfig::max_follow_up_sweeps`]
    /// queued sweeps run back to back; further requests are dropped with a
    /// warning and lists keep their last value until the next trigger.
    pub fn set_overrides(&self, overrides: FeatureOverrides) {
        self.state.overrides.borrow_mut().replace(overrides);
        self.state
            .sweep(self.state.provider.size(), SweepReason::Overrides);
    }

    /// A copy of the current override map.
    pub fn overrides(&self) -> FeatureOverrides {
        self.state.overrides.borrow().current().clone()
    }

    /// Stop observing the viewport, cancel any scheduled sweep and drop both caches.
    ///
    /// Lists handed out earlier stay readable but are never updated again.
    /// `match_media` keeps working on fresh caches, and a later call drops those too.
    pub fn destroy(&self) {
        self.state.destroy();
    }

    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.state.destroyed.get()
    }

    /// Whether the engine is still subscribed to the provider's size changes.
    #[inline]
    pub fn is_observing(&self) -> bool {
        self.state.notifier.borrow().is_attached()
    }

    /// Whether a size-driven sweep is waiting for the next frame.
    #[inline]
    pub fn has_pending_sweep(&self) -> bool {
        self.state.notifier.borrow().is_pending()
    }

    /// Number of cached lists.
    #[inline]
    pub fn list_count(&self) -> usize {
        self.state.registry.borrow().len()
    }

    /// The viewport size as currently reported by the provider.
    #[inline]
    pub fn viewport(&self) -> ViewportSize {
        self.state.provider.size()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.state.config
    }

    /// A handle that does not keep the engine alive.
    pub fn downgrade(&self) -> WeakMediaEngine {
        WeakMediaEngine {
            state: Rc::downgrade(&self.state),
        }
    }

    pub fn stats(&self) -> EngineStats {
        let registry = self.state.registry.borrow();
        let notifier = self.state.notifier.borrow();
        EngineStats {
            lists: registry.len(),
            parsed_queries: registry.parsed_len(),
            resize_signals: notifier.signals(),
            coalesced_signals: notifier.coalesced(),
            sweeps: self.state.sweeps.get(),
            override_revision: self.state.overrides.borrow().revision(),
        }
    }
}

/// Non-owning reference to a [`MediaEngine`], for listeners that call back into it.
#[derive(Clone)]
pub struct WeakMediaEngine {
    state: Weak<EngineState>,
}

impl WeakMediaEngine {
    /// The engine, if any strong [`MediaEngine`] is still alive.
    pub fn upgrade(&self) -> Option<MediaEngine> {
        self.state.upgrade().map(|state| MediaEngine { state })
    }
}

impl EngineState {
    fn register(&self, raw_query: &str) -> MediaQueryList {
        if let Some(list) = self.registry.borrow().get(raw_query) {
            trace!("media query cache hit for {raw_query:?}");
            return list;
        }
        let viewport = self.provider.size();
        let predicate = self.registry.borrow_mut().predicate_for(raw_query);
        let matches = predicate
            .as_deref()
            .is_some_and(|tree| self.evaluate(tree, viewport));
        let list = MediaQueryList::new(raw_query.to_owned(), predicate, matches);
        self.registry.borrow_mut().insert(list.clone());
        debug!("registered media query {raw_query:?} (matches: {matches})");
        list
    }

    fn evaluate(&self, tree: &MediaQuery, viewport: ViewportSize) -> bool {
        let overrides = self.overrides.borrow();
        let env = MediaEnvironment::new(overrides.current(), &self.config.ambient);
        evaluate(tree, viewport, &env)
    }

    fn on_resize_signal(self: &Rc<Self>) {
        if self.destroyed.get() {
            return;
        }
        let must_request = self.notifier.borrow_mut().signal();
        if !must_request {
            trace!("resize signal coalesced into the scheduled frame");
            return;
        }
        let weak = Rc::downgrade(self);
        let request = self.clock.request_frame(Box::new(move || {
            if let Some(engine) = weak.upgrade() {
                engine.on_frame();
            }
        }));
        self.notifier.borrow_mut().set_request(request);
        trace!("scheduled media sweep for the next frame");
    }

    fn on_frame(&self) {
        if self.destroyed.get() || !self.notifier.borrow_mut().take_frame() {
            return;
        }
        self.sweep(self.provider.size(), SweepReason::Resize);
    }

    /// Re-evaluate every cached list in registration order.
    ///
    /// Requests made while a sweep is dispatching are queued and run as
    /// follow-up passes against the then-current size.
    fn sweep(&self, viewport: ViewportSize, reason: SweepReason) {
        if self.sweeping.get() {
            debug!("{} sweep requested during a sweep; queued", reason.as_str());
            self.follow_up.set(true);
            return;
        }
        self.sweeping.set(true);
        let _span = info_span!("media_sweep", reason = reason.as_str()).entered();
        let generation = self.generation.get();
        let mut current = viewport;
        let mut follow_ups: u32 = 0;
        loop {
            self.follow_up.set(false);
            let flipped = self.sweep_once(current, generation);
            self.sweeps.set(self.sweeps.get().saturating_add(1));
            trace!(
                "{} sweep at {}x{} flipped {flipped} lists",
                reason.as_str(),
                current.width,
                current.height
            );
            if !self.follow_up.get() || self.generation.get() != generation {
                break;
            }
            if follow_ups >= self.config.max_follow_up_sweeps {
                warn!(
                    "dropping follow-up media sweep after {follow_ups} re-entrant requests; \
                     up to {} lists may be stale until the next resize or override change",
                    self.registry.borrow().len()
                );
                break;
            }
            follow_ups = follow_ups.saturating_add(1);
            current = self.provider.size();
        }
        self.follow_up.set(false);
        self.sweeping.set(false);
    }

    fn sweep_once(&self, viewport: ViewportSize, generation: u64) -> usize {
        let lists = self.registry.borrow().lists();
        let mut flipped = 0;
        for list in lists {
            if self.generation.get() != generation {
                break;
            }
            let matches = list
                .predicate()
                .is_some_and(|tree| self.evaluate(tree, viewport));
            if list.update(matches) {
                flipped += 1;
                list.dispatch_change();
            }
        }
        flipped
    }

    fn destroy(&self) {
        if self.destroyed.replace(true) {
            debug!("media engine destroyed again; dropping lists registered since");
        }
        let (unobserve, request) = self.notifier.borrow_mut().detach();
        if let Some(unobserve) = unobserve {
            unobserve();
        }
        if let Some(request) = request {
            self.clock.cancel_frame(request);
        }
        self.generation.set(self.generation.get().saturating_add(1));
        let stale = take(&mut *self.registry.borrow_mut());
        *self.overrides.borrow_mut() = OverrideStore::default();
        debug!(
            "media engine destroyed; dropped {} lists and {} parsed queries",
            stale.len(),
            stale.parsed_len()
        );
        drop(stale);
    }
}

impl Drop for EngineState {
    fn drop(&mut self) {
        let (unobserve, request) = self.notifier.get_mut().detach();
        if let Some(unobserve) = unobserve {
            unobserve();
        }
        if let Some(request) = request {
            self.clock.cancel_frame(request);
        }
    }
}
