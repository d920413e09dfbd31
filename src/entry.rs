//! Indexed entries and display-name disambiguation.
//!
//! An `Entry` is the immutable product of one pipeline run over one item:
//! the item's real path, the metadata derived for it, and the display names
//! under which it appears in listings. Entries are never mutated; a refresh
//! builds replacement entries and carries disambiguation indices forward for
//! names that survive.

use std::collections::hash_map::Entry as Slot;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::types::{Metadata, ResultNode};

/// A display name plus the disambiguation index it was issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTuple {
    pub name: String,
    pub index: u64,
}

impl NameTuple {
    /// The name as exposed through the filesystem. Index 0 is suppressed;
    /// later collisions render as `"name (index)"`.
    pub fn render(&self) -> String {
        if self.index == 0 {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.index)
        }
    }
}

/// One indexed item with its processed metadata and display names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    item_path: PathBuf,
    metadata_source_paths: BTreeSet<PathBuf>,
    metadata: Metadata,
    name_tuples: Vec<NameTuple>,
}

impl Entry {
    /// Constructs an entry. `name_tuples` must be non-empty; the pipeline
    /// runner drops items that clean down to zero valid names.
    pub fn new(
        item_path: PathBuf,
        metadata_source_paths: BTreeSet<PathBuf>,
        metadata: Metadata,
        name_tuples: Vec<NameTuple>,
    ) -> Self {
        debug_assert!(!name_tuples.is_empty());
        Self {
            item_path,
            metadata_source_paths,
            metadata,
            name_tuples,
        }
    }

    pub fn item_path(&self) -> &Path {
        &self.item_path
    }

    pub fn metadata_source_paths(&self) -> &BTreeSet<PathBuf> {
        &self.metadata_source_paths
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn name_tuples(&self) -> &[NameTuple] {
        &self.name_tuples
    }

    /// Looks up the tuple for a literal (pre-render) name, if present.
    pub fn name_tuple(&self, name: &str) -> Option<&NameTuple> {
        self.name_tuples.iter().find(|tuple| tuple.name == name)
    }

    /// The listing nodes for this entry, one symlink per display name.
    pub fn results(&self) -> Vec<ResultNode> {
        self.name_tuples
            .iter()
            .map(|tuple| ResultNode::link(tuple.render(), self.item_path.clone()))
            .collect()
    }

    /// Whether any rendered display name equals `name`.
    pub fn has_rendered_name(&self, name: &str) -> bool {
        self.name_tuples.iter().any(|tuple| tuple.render() == name)
    }
}

/// Process-wide table of the highest disambiguation index issued per literal
/// display name. Indices are monotonic and never reused, which keeps names
/// collision-free and stable across refreshes within one process lifetime.
#[derive(Debug, Default)]
pub struct Disambiguator {
    issued: HashMap<String, u64>,
}

impl Disambiguator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the next index for `name`: 0 for the first occurrence, then
    /// 1, 2, ... for each collision.
    pub fn assign(&mut self, name: &str) -> u64 {
        match self.issued.entry(name.to_string()) {
            Slot::Vacant(slot) => {
                slot.insert(0);
                0
            }
            Slot::Occupied(mut slot) => {
                let next = *slot.get() + 1;
                slot.insert(next);
                next
            }
        }
    }
}

/// Flattens the display results of a list of entries, in entry order.
pub fn all_results(entries: &[Arc<Entry>]) -> Vec<ResultNode> {
    entries.iter().flat_map(|entry| entry.results()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn minimal_entry(name: &str, index: u64) -> Entry {
        Entry::new(
            PathBuf::from("/data/item"),
            BTreeSet::new(),
            BTreeMap::new(),
            vec![NameTuple {
                name: name.to_string(),
                index,
            }],
        )
    }

    #[test]
    fn render_suppresses_index_zero() {
        let tuple = NameTuple {
            name: "Alpha".to_string(),
            index: 0,
        };
        assert_eq!(tuple.render(), "Alpha");
    }

    #[test]
    fn render_appends_collision_index() {
        let tuple = NameTuple {
            name: "Alpha".to_string(),
            index: 2,
        };
        assert_eq!(tuple.render(), "Alpha (2)");
    }

    #[test]
    fn assign_is_monotonic_per_name() {
        let mut names = Disambiguator::new();
        assert_eq!(names.assign("X"), 0);
        assert_eq!(names.assign("X"), 1);
        assert_eq!(names.assign("Y"), 0);
        assert_eq!(names.assign("X"), 2);
    }

    #[test]
    fn results_target_the_item_path() {
        let entry = minimal_entry("Alpha", 1);
        let results = entry.results();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Alpha (1)");
        assert_eq!(results[0].target.as_deref(), Some(Path::new("/data/item")));
    }

    #[test]
    fn rendered_name_lookup() {
        let entry = minimal_entry("Alpha", 1);
        assert!(entry.has_rendered_name("Alpha (1)"));
        assert!(!entry.has_rendered_name("Alpha"));
    }
}
