use core::cell::{Cell, RefCell};
use core::mem::take;
use log::trace;

/// Identifier returned by [`FrameClock::request_frame`], used to cancel the request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameRequestId(u64);

/// Work to run at the next animation frame.
pub type FrameCallback = Box<dyn FnOnce()>;

/// Source of animation-frame boundaries supplied by the host.
///
/// Size-driven sweeps are deferred to the next frame so that a burst of
/// resize signals produces a single sweep.
pub trait FrameClock {
    /// Run `callback` once at the next frame.
    fn request_frame(&self, callback: FrameCallback) -> FrameRequestId;

    /// Drop a pending request. No-op if it already ran or was cancelled.
    fn cancel_frame(&self, request: FrameRequestId);
}

/// A frame clock driven explicitly by the host's render loop.
///
/// Callbacks requested during [`FrameQueue::run_frame`] wait for the following frame.
#[derive(Default)]
pub struct FrameQueue {
    next_id: Cell<u64>,
    pending: RefCell<Vec<(FrameRequestId, FrameCallback)>>,
    frames_run: Cell<u64>,
}

impl FrameQueue {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every callback queued before this call. Returns how many ran.
    pub fn run_frame(&self) -> usize {
        let callbacks = take(&mut *self.pending.borrow_mut());
        let count = callbacks.len();
        self.frames_run.set(self.frames_run.get().saturating_add(1));
        trace!("frame {} running {count} callbacks", self.frames_run.get());
        for (_, callback) in callbacks {
            callback();
        }
        count
    }

    /// Number of callbacks waiting for the next frame.
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Number of frames run so far.
    #[inline]
    pub fn frames_run(&self) -> u64 {
        self.frames_run.get()
    }
}

impl FrameClock for FrameQueue {
    fn request_frame(&self, callback: FrameCallback) -> FrameRequestId {
        let request = FrameRequestId(self.next_id.get());
        self.next_id.set(self.next_id.get().saturating_add(1));
        self.pending.borrow_mut().push((request, callback));
        request
    }

    fn cancel_frame(&self, request: FrameRequestId) {
        self.pending.borrow_mut().retain(|(queued, _)| *queued != request);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn run_frame_drains_queue() {
        let queue = FrameQueue::default();
        let hits = Rc::new(Cell::new(0));
        for _ in 0..3 {
            let counter = Rc::clone(&hits);
            queue.request_frame(Box::new(move || counter.set(counter.get() + 1)));
        }
        assert_eq!(queue.pending_count(), 3);
        assert_eq!(queue.run_frame(), 3);
        assert_eq!(hits.get(), 3);
        assert_eq!(queue.pending_count(), 0);
        assert_eq!(queue.frames_run(), 1);
    }

    #[test]
    fn cancelled_request_never_runs() {
        let queue = FrameQueue::new();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let request = queue.request_frame(Box::new(move || counter.set(1)));
        queue.cancel_frame(request);
        assert_eq!(queue.run_frame(), 0);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn callbacks_requested_during_a_frame_wait_for_the_next() {
        let queue = Rc::new(FrameQueue::new());
        let hits = Rc::new(Cell::new(0));
        let inner_queue = Rc::clone(&queue);
        let counter = Rc::clone(&hits);
        queue.request_frame(Box::new(move || {
            let counter = Rc::clone(&counter);
            inner_queue.request_frame(Box::new(move || counter.set(counter.get() + 1)));
        }));
        assert_eq!(queue.run_frame(), 1);
        assert_eq!(hits.get(), 0);
        assert_eq!(queue.pending_count(), 1);
        assert_eq!(queue.run_frame(), 1);
        assert_eq!(hits.get(), 1);
    }
}
