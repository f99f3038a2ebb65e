//! Host-facing helpers: runtime configuration and frame scheduling.

pub mod config;
pub mod scheduler;
