//! A read-only faceted-navigation virtual filesystem engine.
//!
//! Items found under mounted source directories are indexed through a
//! pluggable metadata pipeline, then exposed through a path grammar in which
//! directories are facet keys and values:
//!
//! - `^` starts a new facet-key conjunction
//! - `+` adds an alternative value for the selected key (logical OR)
//! - any other segment is a facet key, a facet value, or a terminal entry
//!   name that resolves to a symlink at the real item
//!
//! The crate is adapter-agnostic: [`FacetFs`] exposes resolve/list/stat/
//! readlink operations over virtual paths, and a FUSE or NFS layer can be
//! bolted on top without touching the engine.

pub mod cache;
pub mod entry;
pub mod error;
pub mod facet;
pub mod fs;
pub mod mount;
pub mod pipeline;
pub mod plugins;
pub mod resolver;
pub mod types;

pub use entry::{Disambiguator, Entry, NameTuple};
pub use error::{FacetError, Result};
pub use fs::FacetFs;
pub use mount::MountOptions;
pub use plugins::ComponentRegistry;
pub use types::{Metadata, NodeAttr, NodeKind, ResultNode};
