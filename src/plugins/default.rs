//! Glob-based indexers/matchers and the default merge/mung/format stages.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use ignore::WalkBuilder;

use crate::error::{FacetError, Result};
use crate::pipeline::{Formatter, Indexer, Matcher, Merger, Munger};
use crate::types::Metadata;

fn compile_glob(raw: &str) -> Result<Pattern> {
    Pattern::new(raw)
        .map_err(|error| FacetError::Configuration(format!("invalid glob {raw:?}: {error}")))
}

fn file_name_matches(pattern: &Pattern, path: &Path) -> bool {
    path.file_name()
        .map(|name| pattern.matches(&name.to_string_lossy()))
        .unwrap_or(false)
}

/// Walks a source tree and yields every file path, logging and skipping
/// unreadable entries. Hidden files are included; the walk is sorted so
/// indexing is deterministic for a given filesystem state.
fn walk_files(source: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let walk = WalkBuilder::new(source)
        .standard_filters(false)
        .sort_by_file_name(std::ffi::OsStr::cmp)
        .build();
    for result in walk {
        match result {
            Ok(entry) => {
                if entry.file_type().is_some_and(|kind| kind.is_file()) {
                    files.push(entry.into_path());
                }
            }
            Err(error) => log::warn!("skipping unreadable path under {}: {error}", source.display()),
        }
    }
    files
}

/// Indexes directories that contain at least one child file matching a glob,
/// e.g. every directory holding a `metadata.json`.
pub struct GlobDirectoryIndexer {
    pattern: Pattern,
}

impl GlobDirectoryIndexer {
    pub fn new(glob: &str) -> Result<Self> {
        Ok(Self {
            pattern: compile_glob(glob)?,
        })
    }
}

impl Indexer for GlobDirectoryIndexer {
    fn index(&self, source: &Path) -> Result<Vec<PathBuf>> {
        let mut directories = BTreeSet::new();
        for file in walk_files(source) {
            if file_name_matches(&self.pattern, &file) {
                if let Some(parent) = file.parent() {
                    directories.insert(parent.to_path_buf());
                }
            }
        }
        Ok(directories.into_iter().collect())
    }
}

/// Indexes individual files matching a glob, e.g. loose media files.
pub struct GlobFileIndexer {
    pattern: Pattern,
}

impl GlobFileIndexer {
    pub fn new(glob: &str) -> Result<Self> {
        Ok(Self {
            pattern: compile_glob(glob)?,
        })
    }
}

impl Indexer for GlobFileIndexer {
    fn index(&self, source: &Path) -> Result<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = walk_files(source)
            .into_iter()
            .filter(|file| file_name_matches(&self.pattern, file))
            .collect();
        files.sort();
        Ok(files)
    }
}

/// The default matcher: the item path itself is the metadata source.
pub struct SelfMatcher;

impl Matcher for SelfMatcher {
    fn matches(&self, item: &Path) -> Result<BTreeSet<PathBuf>> {
        Ok(BTreeSet::from([item.to_path_buf()]))
    }
}

/// Matches child files of an item directory against a glob. Non-directory
/// items have no matching sources.
pub struct GlobFileMatcher {
    pattern: Pattern,
}

impl GlobFileMatcher {
    pub fn new(glob: &str) -> Result<Self> {
        Ok(Self {
            pattern: compile_glob(glob)?,
        })
    }
}

impl Matcher for GlobFileMatcher {
    fn matches(&self, item: &Path) -> Result<BTreeSet<PathBuf>> {
        if !item.is_dir() {
            return Ok(BTreeSet::new());
        }
        let mut sources = BTreeSet::new();
        for child in fs::read_dir(item)? {
            let child = child?;
            let path = child.path();
            if path.is_file() && file_name_matches(&self.pattern, &path) {
                sources.insert(path);
            }
        }
        Ok(sources)
    }
}

/// The default merger: per-key set union across all sources.
pub struct UnionMerger;

impl Merger for UnionMerger {
    fn merge(&self, raw: &BTreeMap<PathBuf, Metadata>) -> Metadata {
        let mut merged = Metadata::new();
        for extracted in raw.values() {
            for (key, values) in extracted {
                merged
                    .entry(key.clone())
                    .or_default()
                    .extend(values.iter().cloned());
            }
        }
        merged
    }
}

/// The default munger: identity.
pub struct IdentityMunger;

impl Munger for IdentityMunger {
    fn mung(&self, merged: Metadata) -> Metadata {
        merged
    }
}

/// The default formatter: the item's on-disk basename.
pub struct BasenameFormatter;

impl Formatter for BasenameFormatter {
    fn format(&self, item: &Path, _metadata: &Metadata) -> Vec<String> {
        item.file_name()
            .map(|name| vec![name.to_string_lossy().into_owned()])
            .unwrap_or_default()
    }
}

/// Formats names from metadata: one candidate per value of `name_key`, with
/// the values of `detail_keys` appended in parentheses. Returns no
/// candidates when `name_key` is absent, which makes the pipeline runner
/// fall back to the basename.
pub struct KeyFormatter {
    name_key: String,
    detail_keys: Vec<String>,
}

impl KeyFormatter {
    pub fn new(name_key: &str, detail_keys: Vec<String>) -> Self {
        Self {
            name_key: name_key.to_string(),
            detail_keys,
        }
    }
}

impl Formatter for KeyFormatter {
    fn format(&self, _item: &Path, metadata: &Metadata) -> Vec<String> {
        let Some(names) = metadata.get(&self.name_key) else {
            return Vec::new();
        };
        let details: Vec<String> = self
            .detail_keys
            .iter()
            .filter_map(|key| metadata.get(key))
            .map(|values| values.iter().cloned().collect::<Vec<_>>().join(", "))
            .collect();
        names
            .iter()
            .map(|name| {
                if details.is_empty() {
                    name.clone()
                } else {
                    format!("{name} ({})", details.join(", "))
                }
            })
            .collect()
    }
}
