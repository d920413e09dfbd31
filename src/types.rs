//! Core listing types returned by path resolution.
//!
//! A resolved path produces a list of `ResultNode`s, one per child visible at
//! that point in the facet hierarchy. A node is either a virtual directory
//! (a facet key, facet value, or control token) or a symlink-equivalent
//! pointing at the real on-disk item.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Processed metadata for one item: facet key to the set of observed values.
pub type Metadata = BTreeMap<String, BTreeSet<String>>;

/// Begins a new facet-key conjunction.
pub const AND_TOKEN: &str = "^";
/// Adds an alternative value for the currently selected facet key.
pub const OR_TOKEN: &str = "+";
/// The current directory.
pub const CURRENT_TOKEN: &str = ".";
/// The parent directory.
pub const PARENT_TOKEN: &str = "..";

/// Reported size of virtual directories, in bytes.
pub const DIR_SIZE: u64 = 4096;

const DIR_MODE: u32 = 0o040_755;
const LINK_MODE: u32 = 0o120_777;

/// One node in a resolved directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultNode {
    /// Display name of the node.
    pub name: String,
    /// Target of the symlink, if the node links to a real item.
    pub target: Option<PathBuf>,
}

impl ResultNode {
    /// Creates a virtual directory node.
    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: None,
        }
    }

    /// Creates a symlink node pointing at a real on-disk item.
    pub fn link(name: impl Into<String>, target: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            target: Some(target.into()),
        }
    }

    pub fn is_link(&self) -> bool {
        self.target.is_some()
    }

    /// Stat-style attributes for this node. A symlink reports its name length
    /// as its size, without a terminating null byte; directories report the
    /// conventional fixed size.
    pub fn attr(&self) -> NodeAttr {
        if self.is_link() {
            NodeAttr {
                kind: NodeKind::Symlink,
                mode: LINK_MODE,
                size: self.name.len() as u64,
            }
        } else {
            NodeAttr {
                kind: NodeKind::Directory,
                mode: DIR_MODE,
                size: DIR_SIZE,
            }
        }
    }
}

/// Node kind enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Directory,
    Symlink,
}

/// Stat-style attributes derived from a `ResultNode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeAttr {
    pub kind: NodeKind,
    pub mode: u32,
    pub size: u64,
}
