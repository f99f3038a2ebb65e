//! The boundary with the container that owns the virtual viewport.

use core::cell::{Cell, RefCell};
use css_media_queries::ViewportSize;
use log::trace;
use std::rc::Rc;

/// Callback invoked by a provider whenever the viewport size changes.
pub type ResizeObserver = Rc<dyn Fn()>;

/// Stops a subscription created by [`ViewportProvider::observe`].
pub type Unobserve = Box<dyn FnOnce()>;

/// Supplies the current virtual viewport size and size-change notifications.
pub trait ViewportProvider {
    /// Current size of the virtual viewport.
    fn size(&self) -> ViewportSize;

    /// Subscribe to size changes. Calling the returned closure unsubscribes.
    fn observe(&self, on_resize: ResizeObserver) -> Unobserve;
}

type ObserverList = RefCell<Vec<(u64, ResizeObserver)>>;

/// An in-memory viewport that a container (or a test) resizes explicitly.
pub struct SharedViewport {
    size: Cell<ViewportSize>,
    observers: Rc<ObserverList>,
    next_observer: Cell<u64>,
}

impl SharedViewport {
    #[inline]
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Cell::new(ViewportSize::new(width, height)),
            observers: Rc::new(RefCell::new(Vec::new())),
            next_observer: Cell::new(0),
        }
    }

    /// Resize the viewport, notifying observers if the size actually changed.
    /// Returns whether observers were notified.
    pub fn set_size(&self, width: f32, height: f32) -> bool {
        let size = ViewportSize::new(width, height);
        if self.size.get() == size {
            trace!("viewport already {width}x{height}");
            return false;
        }
        self.size.set(size);
        let observers: Vec<ResizeObserver> = self
            .observers
            .borrow()
            .iter()
            .map(|(_, observer)| Rc::clone(observer))
            .collect();
        trace!("viewport resized to {width}x{height}; {} observers", observers.len());
        for observer in observers {
            observer();
        }
        true
    }

    /// Number of live subscriptions.
    #[inline]
    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }
}

impl ViewportProvider for SharedViewport {
    fn size(&self) -> ViewportSize {
        self.size.get()
    }

    fn observe(&self, on_resize: ResizeObserver) -> Unobserve {
        let id = self.next_observer.get();
        self.next_observer.set(id.saturating_add(1));
        self.observers.borrow_mut().push((id, on_resize));
        let observers = Rc::downgrade(&self.observers);
        Box::new(move || {
            if let Some(list) = observers.upgrade() {
                list.borrow_mut().retain(|(observer_id, _)| *observer_id != id);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observers_fire_only_on_change() {
        let viewport = SharedViewport::new(100.0, 100.0);
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let unobserve = viewport.observe(Rc::new(move || counter.set(counter.get() + 1)));
        assert!(!viewport.set_size(100.0, 100.0));
        assert!(viewport.set_size(200.0, 100.0));
        assert_eq!(hits.get(), 1);
        unobserve();
        assert_eq!(viewport.observer_count(), 0);
        viewport.set_size(300.0, 100.0);
        assert_eq!(hits.get(), 1);
        assert_eq!(viewport.size(), ViewportSize::new(300.0, 100.0));
    }
}
