//! Contracts for the six pipeline stages.
//!
//! Implementations are registered by name in a
//! [`ComponentRegistry`](crate::plugins::ComponentRegistry) and instantiated
//! once per mount from that mount's options. Stages must not abort the whole
//! pipeline on malformed input: non-convertible keys and values are dropped
//! with a diagnostic, and only the contracts that return `Result` may fail
//! an individual item or source.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::types::Metadata;

/// Finds the items to be indexed under a source directory.
///
/// Must be deterministic for a given filesystem state and have no side
/// effects; implementations return item paths in a stable order.
pub trait Indexer: Send {
    fn index(&self, source: &Path) -> Result<Vec<PathBuf>>;
}

/// Locates the raw metadata sources associated with one item.
pub trait Matcher: Send {
    fn matches(&self, item: &Path) -> Result<BTreeSet<PathBuf>>;
}

/// Converts one raw metadata source into key/value-set form.
pub trait Extractor: Send {
    fn extract(&self, source: &Path) -> Result<Metadata>;
}

/// Combines the extracted metadata of multiple sources for one item.
///
/// Union-of-sets per key is the default policy; domain-specific reduction
/// belongs in an explicit post-step, not hidden in the union.
pub trait Merger: Send {
    fn merge(&self, raw: &BTreeMap<PathBuf, Metadata>) -> Metadata;
}

/// Optional transformation stage applied after merging, e.g. deriving a
/// `year` facet from a date value. The default implementation is identity.
pub trait Munger: Send {
    fn mung(&self, merged: Metadata) -> Metadata;
}

/// Produces candidate display names for an item.
pub trait Formatter: Send {
    fn format(&self, item: &Path, metadata: &Metadata) -> Vec<String>;
}

/// The instantiated pipeline components for one mount, exactly one per role.
pub struct ComponentSet {
    pub indexer: Box<dyn Indexer>,
    pub matcher: Box<dyn Matcher>,
    pub extractor: Box<dyn Extractor>,
    pub merger: Box<dyn Merger>,
    pub munger: Box<dyn Munger>,
    pub formatter: Box<dyn Formatter>,
}

impl std::fmt::Debug for ComponentSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentSet").finish_non_exhaustive()
    }
}
