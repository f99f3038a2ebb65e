//! Configuration settings for the media engine.
//!
//! This module defines the cap on re-entrant follow-up sweeps and the host's
//! ambient user preferences.
//! Configuration can be loaded from environment variables or constructed programmatically.

use css_media_queries::AmbientPreferences;
use std::env;

/// Runtime configuration for a [`MediaEngine`](crate::MediaEngine).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Follow-up sweeps allowed when sweeps are requested from inside a sweep
    pub max_follow_up_sweeps: u32,
    /// User preferences reported by the host environment
    pub ambient: AmbientPreferences,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_follow_up_sweeps: 8,
            ambient: AmbientPreferences::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `VIEWPORT_MEDIA_MAX_FOLLOW_UP_SWEEPS`: Follow-up sweep cap (default: 8)
    /// - `VIEWPORT_MEDIA_PREFERS_COLOR_SCHEME`: Host color scheme (`light`/`dark`)
    /// - `VIEWPORT_MEDIA_PREFERS_REDUCED_MOTION`: Host motion preference
    /// - `VIEWPORT_MEDIA_PREFERS_CONTRAST`: Host contrast preference
    #[inline]
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let max_follow_up_sweeps = lookup("VIEWPORT_MEDIA_MAX_FOLLOW_UP_SWEEPS")
            .and_then(|val| val.trim().parse::<u32>().ok())
            .unwrap_or(defaults.max_follow_up_sweeps);
        let preference = |name: &str| {
            lookup(name)
                .map(|val| val.trim().to_ascii_lowercase())
                .filter(|val| !val.is_empty())
        };
        let ambient = AmbientPreferences {
            color_scheme: preference("VIEWPORT_MEDIA_PREFERS_COLOR_SCHEME"),
            reduced_motion: preference("VIEWPORT_MEDIA_PREFERS_REDUCED_MOTION"),
            contrast: preference("VIEWPORT_MEDIA_PREFERS_CONTRAST"),
        };
        Self {
            max_follow_up_sweeps,
            ambient,
        }
    }
}
