//! The metadata processing pipeline.
//!
//! Each mounted source is indexed by driving every item through six stages:
//! match (locate metadata sources), extract (raw key/value sets), merge
//! (combine sources), mung (reshape), clean (strip disallowed characters),
//! and format (produce display names). The stages are pluggable via the
//! contracts in [`contracts`]; [`runner`] wires them together and applies
//! the cleaning and name-disambiguation rules.

mod clean;
mod contracts;
mod runner;

pub use clean::{clean_metadata, clean_names, clean_string};
pub use contracts::{ComponentSet, Extractor, Formatter, Indexer, Matcher, Merger, Munger};
pub use runner::{build_entry, index_source};
