//! Live media query lists handed out by [`MediaEngine::match_media`](crate::MediaEngine::match_media).
//!
//! A list's `matches` value is only ever written by the engine's sweep; callers
//! can read it and subscribe to changes but cannot force a re-evaluation.

use core::any::Any;
use core::cell::{Cell, RefCell};
use core::fmt;
use css_media_queries::MediaQuery;
use log::{debug, error, warn};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

/// Event type accepted by the `*_event_listener` methods.
pub const CHANGE_EVENT: &str = "change";

/// Payload delivered to change listeners.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaQueryListEvent {
    pub matches: bool,
    pub media: String,
}

/// A change callback. Identity (for de-duplication and removal) is the `Rc` allocation.
pub type ChangeListener = Rc<dyn Fn(&MediaQueryListEvent) -> anyhow::Result<()>>;

/// Wrap a closure as a [`ChangeListener`].
pub fn change_listener<F>(callback: F) -> ChangeListener
where
    F: Fn(&MediaQueryListEvent) -> anyhow::Result<()> + 'static,
{
    Rc::new(callback)
}

struct ListState {
    media: String,
    predicate: Option<Rc<MediaQuery>>,
    matches: Cell<bool>,
    /// Ordered, de-duplicated by `Rc` identity.
    listeners: RefCell<Vec<ChangeListener>>,
    onchange: RefCell<Option<ChangeListener>>,
}

/// A cached, change-notifying media query. Clones share the same list.
#[derive(Clone)]
pub struct MediaQueryList {
    state: Rc<ListState>,
}

impl MediaQueryList {
    pub(crate) fn new(media: String, predicate: Option<Rc<MediaQuery>>, matches: bool) -> Self {
        Self {
            state: Rc::new(ListState {
                media,
                predicate,
                matches: Cell::new(matches),
                listeners: RefCell::new(Vec::new()),
                onchange: RefCell::new(None),
            }),
        }
    }

    /// The query exactly as it was passed to `match_media`.
    #[inline]
    pub fn media(&self) -> &str {
        &self.state.media
    }

    #[inline]
    pub fn matches(&self) -> bool {
        self.state.matches.get()
    }

    /// The parsed tree, or `None` when the query failed to parse (it never matches).
    #[inline]
    pub fn predicate(&self) -> Option<&MediaQuery> {
        self.state.predicate.as_deref()
    }

    /// True if both values refer to the same cached list.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    /// Append a listener. Adding one that is already registered is a no-op.
    pub fn add_listener(&self, listener: &ChangeListener) {
        let mut listeners = self.state.listeners.borrow_mut();
        if listeners.iter().any(|known| Rc::ptr_eq(known, listener)) {
            return;
        }
        listeners.push(Rc::clone(listener));
    }

    /// Remove a listener. No-op if it is not registered.
    pub fn remove_listener(&self, listener: &ChangeListener) {
        self.state
            .listeners
            .borrow_mut()
            .retain(|known| !Rc::ptr_eq(known, listener));
    }

    /// `addEventListener("change", ..)`; shares the listener set with [`Self::add_listener`].
    pub fn add_event_listener(&self, event_type: &str, listener: &ChangeListener) {
        if event_type == CHANGE_EVENT {
            self.add_listener(listener);
        } else {
            debug!("ignoring {event_type:?} listener on media query {:?}", self.media());
        }
    }

    /// `removeEventListener("change", ..)`; shares the listener set with [`Self::remove_listener`].
    pub fn remove_event_listener(&self, event_type: &str, listener: &ChangeListener) {
        if event_type == CHANGE_EVENT {
            self.remove_listener(listener);
        }
    }

    /// Assign or clear the single `onchange` slot. Last write wins.
    pub fn set_onchange(&self, listener: Option<ChangeListener>) {
        *self.state.onchange.borrow_mut() = listener;
    }

    pub fn onchange(&self) -> Option<ChangeListener> {
        self.state.onchange.borrow().as_ref().map(Rc::clone)
    }

    #[inline]
    pub fn listener_count(&self) -> usize {
        self.state.listeners.borrow().len()
    }

    /// Store a freshly evaluated value. Returns whether it flipped.
    pub(crate) fn update(&self, matches: bool) -> bool {
        self.state.matches.replace(matches) != matches
    }

    /// Fire `onchange`, then every listener in add order.
    ///
    /// Callbacks are snapshotted first, so they may add or remove listeners freely.
    /// Errors and panics are logged per callback and never reach the caller.
    pub(crate) fn dispatch_change(&self) {
        let event = MediaQueryListEvent {
            matches: self.matches(),
            media: self.state.media.clone(),
        };
        let onchange = self.onchange();
        let listeners: Vec<ChangeListener> = self
            .state
            .listeners
            .borrow()
            .iter()
            .map(Rc::clone)
            .collect();
        for listener in onchange.iter().chain(listeners.iter()) {
            invoke_listener(listener, &event);
        }
    }
}

fn invoke_listener(listener: &ChangeListener, event: &MediaQueryListEvent) {
    match panic::catch_unwind(AssertUnwindSafe(|| listener(event))) {
        Ok(Ok(())) => {}
        Ok(Err(err)) => warn!("change listener for {:?} failed: {err:#}", event.media),
        Err(payload) => error!(
            "change listener for {:?} panicked: {}",
            event.media,
            panic_message(payload.as_ref())
        ),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "<non-string panic payload>"
    }
}

impl fmt::Debug for MediaQueryList {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("MediaQueryList")
            .field("media", &self.state.media)
            .field("matches", &self.matches())
            .field("parsed", &self.state.predicate.is_some())
            .field("listeners", &self.listener_count())
            .field("onchange", &self.state.onchange.borrow().is_some())
            .finish()
    }
}
