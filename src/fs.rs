//! The faceted filesystem service.
//!
//! `FacetFs` owns the mounts, the listing cache, and the name table behind a
//! single mutex, and exposes the read-only operations a filesystem adapter
//! needs: resolve, list, stat, readlink, and access checks. All paths are
//! virtual; the only real filesystem contact happens during indexing.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::cache::ResultCache;
use crate::entry::Disambiguator;
use crate::error::{FacetError, Result};
use crate::mount::{Mount, MountOptions};
use crate::pipeline::index_source;
use crate::plugins::ComponentRegistry;
use crate::resolver;
use crate::types::{NodeAttr, ResultNode, CURRENT_TOKEN, PARENT_TOKEN};

struct FsState {
    mounts: Vec<Mount>,
    cache: ResultCache,
    names: Disambiguator,
}

impl FsState {
    /// Rebuilds the entries of every mount whose refresh interval has
    /// elapsed. A failed rebuild keeps the previous entries and logs; the
    /// cache is cleared once if any mount actually swapped.
    fn refresh_due_mounts(&mut self) {
        let now = Instant::now();
        let mut swapped = false;
        for mount in &mut self.mounts {
            if !mount.refresh_due(now) {
                continue;
            }
            mount.last_refresh = now;
            match index_source(
                &mount.options.source,
                &mount.components,
                &mount.entries,
                &mut self.names,
            ) {
                Ok(entries) => {
                    mount.entries = entries;
                    swapped = true;
                }
                Err(error) => log::warn!(
                    "refresh of {} failed, keeping stale entries: {error}",
                    mount.options.source.display()
                ),
            }
        }
        if swapped {
            self.cache.clear();
        }
    }

    fn all_entries(&self) -> Vec<std::sync::Arc<crate::entry::Entry>> {
        self.mounts
            .iter()
            .flat_map(|mount| mount.entries.iter().cloned())
            .collect()
    }

    fn resolve(&mut self, segments: Vec<String>) -> Result<Vec<ResultNode>> {
        self.refresh_due_mounts();
        if let Some(results) = self.cache.get(&segments) {
            return Ok(results);
        }
        let entries = self.all_entries();
        let results = resolver::resolve(&entries, &segments)?;
        self.cache.insert(segments, results.clone());
        Ok(results)
    }
}

/// A read-only faceted view over one or more mounted sources.
pub struct FacetFs {
    state: Mutex<FsState>,
}

impl FacetFs {
    /// Builds components and the initial entry set for every mount.
    /// Configuration and indexing errors here are fatal; after construction
    /// the filesystem only degrades, never fails wholesale.
    pub fn new(
        registry: &ComponentRegistry,
        mounts: Vec<MountOptions>,
        cache_expiry: Duration,
    ) -> Result<Self> {
        if mounts.is_empty() {
            return Err(FacetError::Configuration(
                "at least one mount is required".to_string(),
            ));
        }

        let mut names = Disambiguator::new();
        let mut configured = Vec::with_capacity(mounts.len());
        for options in mounts {
            let components = registry.build(&options)?;
            let entries = index_source(&options.source, &components, &[], &mut names)?;
            log::info!(
                "mounted {}: {} entries",
                options.source.display(),
                entries.len()
            );
            configured.push(Mount {
                options,
                components,
                entries,
                last_refresh: Instant::now(),
            });
        }

        Ok(Self {
            state: Mutex::new(FsState {
                mounts: configured,
                cache: ResultCache::new(cache_expiry),
                names,
            }),
        })
    }

    /// Resolves a virtual path to its listing. Terminal entry names resolve
    /// to a single CURRENT-named symlink node.
    pub fn resolve(&self, path: &str) -> Result<Vec<ResultNode>> {
        self.state.lock().resolve(split_path(path))
    }

    /// Forces an immediate rebuild of every mount's entries.
    pub fn refresh(&self) -> Result<()> {
        let mut state = self.state.lock();
        let FsState {
            mounts,
            cache,
            names,
        } = &mut *state;
        let mut failure = None;
        for mount in mounts.iter_mut() {
            mount.last_refresh = Instant::now();
            match index_source(
                &mount.options.source,
                &mount.components,
                &mount.entries,
                names,
            ) {
                Ok(entries) => mount.entries = entries,
                Err(error) => {
                    failure = Some(error);
                    break;
                }
            }
        }
        // Entries may have swapped even on failure, so the cache always goes.
        cache.clear();
        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Stat-style attributes for a virtual path.
    pub fn attributes(&self, path: &str) -> Result<NodeAttr> {
        let results = self.resolve(path)?;
        results
            .iter()
            .find(|node| node.name == CURRENT_TOKEN)
            .map(ResultNode::attr)
            .ok_or_else(|| FacetError::InvalidPath(format!("no such path [{path}]")))
    }

    /// The child names visible under a virtual directory, excluding the
    /// dot entries.
    pub fn list_directory(&self, path: &str) -> Result<Vec<String>> {
        let results = self.resolve(path)?;
        let current = results.iter().find(|node| node.name == CURRENT_TOKEN);
        if current.is_none_or(ResultNode::is_link) {
            return Err(FacetError::InvalidPath(format!(
                "not a directory [{path}]"
            )));
        }
        Ok(results
            .into_iter()
            .filter(|node| node.name != CURRENT_TOKEN && node.name != PARENT_TOKEN)
            .map(|node| node.name)
            .collect())
    }

    /// The symlink target for a path that names an entry.
    pub fn read_link(&self, path: &str) -> Result<PathBuf> {
        let results = self.resolve(path)?;
        results
            .into_iter()
            .find(|node| node.name == CURRENT_TOKEN && node.is_link())
            .and_then(|node| node.target)
            .ok_or_else(|| FacetError::InvalidPath(format!("not a symlink [{path}]")))
    }

    /// Access check: the filesystem is read-only, so any write intent is
    /// rejected; read access just requires the path to resolve.
    pub fn check_access(&self, path: &str, write_intent: bool) -> Result<()> {
        if write_intent {
            return Err(FacetError::ReadOnly);
        }
        self.resolve(path).map(|_| ())
    }
}

/// Splits a virtual path into normalized segments: empty segments and `.`
/// disappear, `..` removes the preceding segment.
fn split_path(path: &str) -> Vec<String> {
    let mut segments = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | CURRENT_TOKEN => {}
            PARENT_TOKEN => {
                segments.pop();
            }
            other => segments.push(other.to_string()),
        }
    }
    segments
}
