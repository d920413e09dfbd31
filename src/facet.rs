//! Derived facet view over an entry set.
//!
//! The facet index is never persisted; it is recomputed on demand from the
//! currently active entry subset as resolution narrows it down.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::entry::Entry;

/// Facet keys selectable from `entries`, minus keys already bound in the
/// current query state.
pub fn valid_keys(entries: &[Arc<Entry>], bound: &BTreeSet<String>) -> BTreeSet<String> {
    entries
        .iter()
        .flat_map(|entry| entry.metadata().keys())
        .filter(|key| !bound.contains(*key))
        .cloned()
        .collect()
}

/// Union of the values observed for `key` across `entries`.
pub fn valid_values(entries: &[Arc<Entry>], key: &str) -> BTreeSet<String> {
    entries
        .iter()
        .filter_map(|entry| entry.metadata().get(key))
        .flat_map(|values| values.iter().cloned())
        .collect()
}

/// Keeps the entries whose value set for `key` intersects `chosen`. This is
/// how a closed OR-group is applied as a single filter.
pub fn narrow(entries: Vec<Arc<Entry>>, key: &str, chosen: &BTreeSet<String>) -> Vec<Arc<Entry>> {
    entries
        .into_iter()
        .filter(|entry| {
            entry
                .metadata()
                .get(key)
                .is_some_and(|values| !values.is_disjoint(chosen))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::NameTuple;
    use crate::types::Metadata;
    use std::path::PathBuf;

    fn entry(path: &str, facets: &[(&str, &[&str])]) -> Arc<Entry> {
        let mut metadata = Metadata::new();
        for (key, values) in facets {
            metadata.insert(
                key.to_string(),
                values.iter().map(|v| v.to_string()).collect(),
            );
        }
        Arc::new(Entry::new(
            PathBuf::from(path),
            BTreeSet::new(),
            metadata,
            vec![NameTuple {
                name: path.rsplit('/').next().unwrap_or(path).to_string(),
                index: 0,
            }],
        ))
    }

    #[test]
    fn valid_keys_excludes_bound() {
        let entries = vec![
            entry("/a", &[("genre", &["Comedy"]), ("year", &["1999"])]),
            entry("/b", &[("genre", &["Drama"])]),
        ];
        let bound = BTreeSet::from(["genre".to_string()]);
        assert_eq!(
            valid_keys(&entries, &bound),
            BTreeSet::from(["year".to_string()])
        );
    }

    #[test]
    fn valid_values_unions_across_entries() {
        let entries = vec![
            entry("/a", &[("genre", &["Comedy"])]),
            entry("/b", &[("genre", &["Drama", "Comedy"])]),
        ];
        assert_eq!(
            valid_values(&entries, "genre"),
            BTreeSet::from(["Comedy".to_string(), "Drama".to_string()])
        );
    }

    #[test]
    fn narrow_applies_or_group_as_one_filter() {
        let entries = vec![
            entry("/a", &[("genre", &["Comedy"])]),
            entry("/b", &[("genre", &["Drama"])]),
            entry("/c", &[("mood", &["quiet"])]),
        ];
        let chosen = BTreeSet::from(["Comedy".to_string(), "Drama".to_string()]);
        let kept = narrow(entries, "genre", &chosen);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].item_path(), PathBuf::from("/a"));
        assert_eq!(kept[1].item_path(), PathBuf::from("/b"));
    }
}
