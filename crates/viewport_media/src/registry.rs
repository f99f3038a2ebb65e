//! Parse cache and list cache, both keyed by the raw query string.
//!
//! Keys are not normalised: `"(min-width: 1px)"` and `" (min-width: 1px)"` are
//! two entries with identical trees.

use crate::handle::MediaQueryList;
use css_media_queries::{MediaQuery, parse_media_query};
use log::{trace, warn};
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Default)]
pub(crate) struct QueryRegistry {
    /// `None` records a query that failed to parse, so it is reported once.
    parsed: HashMap<String, Option<Rc<MediaQuery>>>,
    /// Lists in registration order.
    lists: Vec<MediaQueryList>,
    by_query: HashMap<String, usize>,
}

impl QueryRegistry {
    pub(crate) fn get(&self, raw_query: &str) -> Option<MediaQueryList> {
        self.by_query
            .get(raw_query)
            .and_then(|&index| self.lists.get(index))
            .cloned()
    }

    /// Parse `raw_query` on first use and cache the outcome.
    pub(crate) fn predicate_for(&mut self, raw_query: &str) -> Option<Rc<MediaQuery>> {
        if let Some(cached) = self.parsed.get(raw_query) {
            trace!("parse cache hit for {raw_query:?}");
            return cached.as_ref().map(Rc::clone);
        }
        let parsed = match parse_media_query(raw_query) {
            Ok(tree) => Some(Rc::new(tree)),
            Err(err) => {
                let fragment = err.fragment().unwrap_or(raw_query);
                warn!(
                    "media query {raw_query:?} will never match: rejected at {fragment:?} ({err})"
                );
                None
            }
        };
        self.parsed
            .insert(raw_query.to_owned(), parsed.as_ref().map(Rc::clone));
        parsed
    }

    pub(crate) fn insert(&mut self, list: MediaQueryList) {
        self.by_query.insert(list.media().to_owned(), self.lists.len());
        self.lists.push(list);
    }

    /// Snapshot of every list in registration order.
    pub(crate) fn lists(&self) -> Vec<MediaQueryList> {
        self.lists.clone()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.lists.len()
    }

    #[inline]
    pub(crate) fn parsed_len(&self) -> usize {
        self.parsed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_parses_are_cached() {
        let mut registry = QueryRegistry::default();
        assert!(registry.predicate_for("nonsense").is_none());
        assert!(registry.predicate_for("nonsense").is_none());
        assert_eq!(registry.parsed_len(), 1);
    }

    #[test]
    fn predicates_are_shared_per_raw_string() {
        let mut registry = QueryRegistry::default();
        let first = registry.predicate_for("(min-width: 1px)");
        let second = registry.predicate_for("(min-width: 1px)");
        let spaced = registry.predicate_for(" (min-width: 1px)");
        assert!(matches!((&first, &second), (Some(left), Some(right)) if Rc::ptr_eq(left, right)));
        assert_eq!(first.as_deref(), spaced.as_deref());
        assert_eq!(registry.parsed_len(), 2);
    }

    #[test]
    fn lists_keep_registration_order() {
        let mut registry = QueryRegistry::default();
        registry.insert(MediaQueryList::new("b".to_owned(), None, false));
        registry.insert(MediaQueryList::new("a".to_owned(), None, false));
        let media: Vec<String> = registry
            .lists()
            .iter()
            .map(|list| list.media().to_owned())
            .collect();
        assert_eq!(media, vec!["b", "a"]);
        assert!(registry.get("a").is_some_and(|list| list.media() == "a"));
        assert_eq!(registry.len(), 2);
    }
}
