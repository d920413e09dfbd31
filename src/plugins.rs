//! Built-in pipeline components and the component registry.
//!
//! There is no runtime plugin discovery: components are constructed through
//! an explicit name-to-factory registry. The built-ins cover glob-based
//! indexing and matching, JSON extraction, union merging, date munging, and
//! basename/metadata-key formatting. External code can register additional
//! factories before mounts are configured.

mod default;
mod json;
mod registry;

pub use default::{
    BasenameFormatter, GlobDirectoryIndexer, GlobFileIndexer, GlobFileMatcher, IdentityMunger,
    KeyFormatter, SelfMatcher, UnionMerger,
};
pub use json::{JsonExtractor, YearMunger};
pub use registry::ComponentRegistry;
