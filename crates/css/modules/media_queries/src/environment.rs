//! Values for features that cannot be derived from the viewport size.
//! Spec: Section 11 (user preference media features) and Section 5 (interaction media features)

use crate::FeatureName;
use std::collections::HashMap;

/// Static feature values supplied by the host, keyed by feature name
/// (`prefers-color-scheme`, `hover`, ...). Keys are stored lowercased.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeatureOverrides {
    values: HashMap<String, String>,
}

impl FeatureOverrides {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a single feature value, returning the previous one.
    pub fn insert(&mut self, feature: &str, value: &str) -> Option<String> {
        self.values
            .insert(feature.trim().to_ascii_lowercase(), value.trim().to_owned())
    }

    /// Builder form of [`Self::insert`].
    #[must_use]
    pub fn with(mut self, feature: &str, value: &str) -> Self {
        self.insert(feature, value);
        self
    }

    #[inline]
    pub fn get(&self, feature: &str) -> Option<&str> {
        self.values
            .get(&feature.to_ascii_lowercase())
            .map(String::as_str)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Iterate over `(feature, value)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .map(|(feature, value)| (feature.as_str(), value.as_str()))
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for FeatureOverrides {
    fn from_iter<T: IntoIterator<Item = (&'a str, &'a str)>>(iter: T) -> Self {
        let mut overrides = Self::new();
        for (feature, value) in iter {
            overrides.insert(feature, value);
        }
        overrides
    }
}

/// The host environment's own user preferences, when it exposes them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AmbientPreferences {
    pub color_scheme: Option<String>,
    pub reduced_motion: Option<String>,
    pub contrast: Option<String>,
}

/// Everything besides the viewport size that evaluation consults.
#[derive(Clone, Copy, Debug)]
pub struct MediaEnvironment<'a> {
    pub overrides: &'a FeatureOverrides,
    pub ambient: &'a AmbientPreferences,
}

impl<'a> MediaEnvironment<'a> {
    #[inline]
    pub const fn new(overrides: &'a FeatureOverrides, ambient: &'a AmbientPreferences) -> Self {
        Self { overrides, ambient }
    }

    /// Resolve a static feature: override first, then the ambient preference,
    /// then a desktop-like default (`hover`, `fine` pointer, light, no preference).
    /// Returns `None` for size-derived features.
    pub fn static_value(&self, feature: FeatureName) -> Option<&'a str> {
        if !feature.is_static() {
            return None;
        }
        let overrides: &'a FeatureOverrides = self.overrides;
        if let Some(value) = overrides.get(feature.as_str()) {
            return Some(value);
        }
        let preferences: &'a AmbientPreferences = self.ambient;
        let ambient = match feature {
            FeatureName::PrefersColorScheme => preferences.color_scheme.as_deref(),
            FeatureName::PrefersReducedMotion => preferences.reduced_motion.as_deref(),
            FeatureName::PrefersContrast => preferences.contrast.as_deref(),
            FeatureName::Width
            | FeatureName::Height
            | FeatureName::AspectRatio
            | FeatureName::Orientation
            | FeatureName::Hover
            | FeatureName::Pointer => None,
        };
        Some(ambient.unwrap_or_else(|| default_value(feature)))
    }
}

/// Desktop-like defaults used when neither an override nor an ambient preference exists.
const fn default_value(feature: FeatureName) -> &'static str {
    match feature {
        FeatureName::Hover => "hover",
        FeatureName::Pointer => "fine",
        FeatureName::PrefersColorScheme => "light",
        FeatureName::PrefersReducedMotion | FeatureName::PrefersContrast => "no-preference",
        FeatureName::Width
        | FeatureName::Height
        | FeatureName::AspectRatio
        | FeatureName::Orientation => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_over_ambient() {
        let overrides = FeatureOverrides::new().with("prefers-color-scheme", "dark");
        let ambient = AmbientPreferences {
            color_scheme: Some("light".to_owned()),
            ..AmbientPreferences::default()
        };
        let env = MediaEnvironment::new(&overrides, &ambient);
        assert_eq!(env.static_value(FeatureName::PrefersColorScheme), Some("dark"));
    }

    #[test]
    fn ambient_then_defaults() {
        let overrides = FeatureOverrides::new();
        let ambient = AmbientPreferences {
            reduced_motion: Some("reduce".to_owned()),
            ..AmbientPreferences::default()
        };
        let env = MediaEnvironment::new(&overrides, &ambient);
        assert_eq!(env.static_value(FeatureName::PrefersReducedMotion), Some("reduce"));
        assert_eq!(env.static_value(FeatureName::PrefersColorScheme), Some("light"));
        assert_eq!(env.static_value(FeatureName::PrefersContrast), Some("no-preference"));
        assert_eq!(env.static_value(FeatureName::Hover), Some("hover"));
        assert_eq!(env.static_value(FeatureName::Pointer), Some("fine"));
        assert_eq!(env.static_value(FeatureName::Width), None);
    }

    #[test]
    fn override_keys_are_case_insensitive() {
        let overrides: FeatureOverrides = [("Hover", " none ")].into_iter().collect();
        assert_eq!(overrides.get("hover"), Some("none"));
        assert_eq!(overrides.len(), 1);
    }
}
