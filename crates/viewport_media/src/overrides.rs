//! Host-supplied values for static media features.

use core::mem;
use css_media_queries::FeatureOverrides;
use log::debug;

/// Holds the current override map. Each replacement bumps the revision.
#[derive(Debug, Default)]
pub(crate) struct OverrideStore {
    current: FeatureOverrides,
    revision: u64,
}

impl OverrideStore {
    /// Replace the whole map (no merging) and return the previous one.
    pub(crate) fn replace(&mut self, overrides: FeatureOverrides) -> FeatureOverrides {
        self.revision = self.revision.saturating_add(1);
        debug!(
            "feature overrides revision {} with {} entries",
            self.revision,
            overrides.len()
        );
        mem::replace(&mut self.current, overrides)
    }

    #[inline]
    pub(crate) const fn current(&self) -> &FeatureOverrides {
        &self.current
    }

    #[inline]
    pub(crate) const fn revision(&self) -> u64 {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_discards_previous_entries() {
        let mut store = OverrideStore::default();
        store.replace(FeatureOverrides::new().with("hover", "none"));
        let previous = store.replace(FeatureOverrides::new().with("pointer", "coarse"));
        assert_eq!(previous.get("hover"), Some("none"));
        assert_eq!(store.current().get("hover"), None);
        assert_eq!(store.current().get("pointer"), Some("coarse"));
        assert_eq!(store.revision(), 2);
    }
}
