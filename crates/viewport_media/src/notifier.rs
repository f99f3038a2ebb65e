//! Bookkeeping for size-driven sweeps: the viewport subscription and the
//! single outstanding frame request that coalesces a burst of resize signals.

use crate::provider::Unobserve;
use crate::utilities::scheduler::FrameRequestId;
use core::mem;

#[derive(Default)]
pub(crate) struct ChangeNotifier {
    unobserve: Option<Unobserve>,
    /// Set from the first signal until the frame callback runs.
    pending: bool,
    request: Option<FrameRequestId>,
    signals: u64,
    coalesced: u64,
}

impl ChangeNotifier {
    pub(crate) fn attach(&mut self, unobserve: Unobserve) {
        self.unobserve = Some(unobserve);
    }

    /// Record a resize signal. Returns `true` if the caller must request a frame.
    pub(crate) fn signal(&mut self) -> bool {
        self.signals = self.signals.saturating_add(1);
        if self.pending {
            self.coalesced = self.coalesced.saturating_add(1);
            return false;
        }
        self.pending = true;
        true
    }

    /// Remember the frame request so teardown can cancel it.
    pub(crate) fn set_request(&mut self, request: FrameRequestId) {
        if self.pending {
            self.request = Some(request);
        }
    }

    /// Called from the frame callback. Returns whether a sweep is due.
    pub(crate) fn take_frame(&mut self) -> bool {
        self.request = None;
        mem::replace(&mut self.pending, false)
    }

    /// Stop observing; returns the subscription and any outstanding request to cancel.
    pub(crate) fn detach(&mut self) -> (Option<Unobserve>, Option<FrameRequestId>) {
        self.pending = false;
        (self.unobserve.take(), self.request.take())
    }

    #[inline]
    pub(crate) const fn is_pending(&self) -> bool {
        self.pending
    }

    #[inline]
    pub(crate) const fn is_attached(&self) -> bool {
        self.unobserve.is_some()
    }

    #[inline]
    pub(crate) const fn signals(&self) -> u64 {
        self.signals
    }

    #[inline]
    pub(crate) const fn coalesced(&self) -> u64 {
        self.coalesced
    }
}
