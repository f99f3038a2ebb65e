//! Live media query lists for an embedded preview viewport.
//!
//! Queries are evaluated against the size of a *virtual* viewport supplied by a
//! [`ViewportProvider`] rather than the real display, so responsive logic can be
//! exercised deterministically inside an isolated content area.
//!
//! # Architecture
//!
//! ```text
//! match_media(query) ─▶ parse cache ─▶ list cache ─▶ MediaQueryList
//!                                                        ▲
//! provider resize signal ─▶ notifier ─▶ next frame ─▶ sweep (registration order)
//! set_overrides(map) ───────────────────────────────▶ sweep (synchronous)
//! ```
//!
//! A sweep re-evaluates every cached list and, for each list whose value flips,
//! fires `onchange` and then every listener in add order. Sweeps requested while a
//! sweep is dispatching are queued as follow-ups instead of recursing.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use viewport_media::{FrameClock, FrameQueue, MediaEngine, SharedViewport, ViewportProvider};
//!
//! let viewport = Rc::new(SharedViewport::new(600.0, 800.0));
//! let frames = Rc::new(FrameQueue::default());
//! let provider: Rc<dyn ViewportProvider> = Rc::<SharedViewport>::clone(&viewport);
//! let clock: Rc<dyn FrameClock> = Rc::<FrameQueue>::clone(&frames);
//! let engine = MediaEngine::new(provider, clock);
//!
//! let wide = engine.match_media("(min-width: 700px)");
//! assert!(!wide.matches());
//!
//! viewport.set_size(900.0, 800.0);
//! frames.run_frame();
//! assert!(wide.matches());
//! ```

#![allow(
    clippy::module_name_repetitions,
    reason = "MediaQueryListEvent mirrors the platform name"
)]

mod engine;
mod handle;
mod notifier;
mod overrides;
mod provider;
mod registry;

pub mod utilities;

pub use engine::{EngineStats, MediaEngine, WeakMediaEngine};
pub use handle::{
    CHANGE_EVENT, ChangeListener, MediaQueryList, MediaQueryListEvent, change_listener,
};
pub use provider::{ResizeObserver, SharedViewport, Unobserve, ViewportProvider};
pub use utilities::config::EngineConfig;
pub use utilities::scheduler::{FrameCallback, FrameClock, FrameQueue, FrameRequestId};

pub use css_media_queries::{
    AmbientPreferences, FeatureOverrides, MediaQuery, ParseError, ViewportSize, parse_media_query,
};
