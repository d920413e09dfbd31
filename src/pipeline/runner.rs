//! Drives items through the pipeline stages to build entries.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;

use crate::entry::{Disambiguator, Entry, NameTuple};
use crate::error::Result;

use super::clean::{clean_metadata, clean_names, clean_string};
use super::contracts::ComponentSet;

/// Builds one entry for `item`, or `None` when the item cleans down to zero
/// valid display names even after the basename fallback.
///
/// When `previous` is supplied (the refresh case), cleaned names that already
/// exist in the previous entry keep their disambiguation index; only
/// genuinely new names consume indices from `names`.
pub fn build_entry(
    item: &Path,
    components: &ComponentSet,
    previous: Option<&Entry>,
    names: &mut Disambiguator,
) -> Option<Entry> {
    let sources = match components.matcher.matches(item) {
        Ok(sources) => sources,
        Err(error) => {
            log::warn!("matcher failed for {}: {error}", item.display());
            BTreeSet::new()
        }
    };

    let mut raw = BTreeMap::new();
    for source in &sources {
        match components.extractor.extract(source) {
            Ok(extracted) => {
                raw.insert(source.clone(), extracted);
            }
            Err(error) => {
                log::warn!("extractor failed for {}: {error}", source.display());
            }
        }
    }

    let merged = components.merger.merge(&raw);
    let munged = components.munger.mung(merged);
    let metadata = clean_metadata(munged);

    let raw_names = components.formatter.format(item, &metadata);
    let mut cleaned = clean_names(&raw_names);
    if cleaned.is_empty() {
        // Fall back to the on-disk basename so the item stays reachable.
        cleaned = item
            .file_name()
            .and_then(|name| clean_string(&name.to_string_lossy()))
            .into_iter()
            .collect();
    }
    if cleaned.is_empty() {
        log::warn!(
            "dropping {}: no display name survived cleaning",
            item.display()
        );
        return None;
    }

    let name_tuples = cleaned
        .into_iter()
        .map(|name| {
            let index = match previous.and_then(|entry| entry.name_tuple(&name)) {
                Some(tuple) => tuple.index,
                None => names.assign(&name),
            };
            NameTuple { name, index }
        })
        .collect();

    Some(Entry::new(
        item.to_path_buf(),
        sources,
        metadata,
        name_tuples,
    ))
}

/// Indexes a source directory and builds one entry per item.
///
/// `previous` entries are matched by exact item path so that a refresh
/// preserves name identity. An indexer failure is returned to the caller;
/// per-item failures only degrade that item.
pub fn index_source(
    source: &Path,
    components: &ComponentSet,
    previous: &[Arc<Entry>],
    names: &mut Disambiguator,
) -> Result<Vec<Arc<Entry>>> {
    let items = components.indexer.index(source)?;
    log::debug!("indexed {}: {} items", source.display(), items.len());

    let previous_by_path: HashMap<&Path, &Arc<Entry>> = previous
        .iter()
        .map(|entry| (entry.item_path(), entry))
        .collect();

    let mut entries = Vec::with_capacity(items.len());
    for item in &items {
        let prior = previous_by_path
            .get(item.as_path())
            .map(|entry| entry.as_ref());
        if let Some(entry) = build_entry(item, components, prior, names) {
            entries.push(Arc::new(entry));
        }
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FacetError;
    use crate::types::Metadata;
    use std::path::PathBuf;

    struct FixedIndexer(Vec<PathBuf>);
    impl super::super::Indexer for FixedIndexer {
        fn index(&self, _source: &Path) -> Result<Vec<PathBuf>> {
            Ok(self.0.clone())
        }
    }

    struct SelfSource;
    impl super::super::Matcher for SelfSource {
        fn matches(&self, item: &Path) -> Result<BTreeSet<PathBuf>> {
            Ok(BTreeSet::from([item.to_path_buf()]))
        }
    }

    struct FixedExtractor(Metadata);
    impl super::super::Extractor for FixedExtractor {
        fn extract(&self, _source: &Path) -> Result<Metadata> {
            Ok(self.0.clone())
        }
    }

    struct FailingExtractor;
    impl super::super::Extractor for FailingExtractor {
        fn extract(&self, source: &Path) -> Result<Metadata> {
            Err(FacetError::Extract {
                path: source.to_path_buf(),
                reason: "unreadable".to_string(),
            })
        }
    }

    struct Union;
    impl super::super::Merger for Union {
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

    struct Identity;
    impl super::super::Munger for Identity {
        fn mung(&self, merged: Metadata) -> Metadata {
            merged
        }
    }

    struct TitleFormatter;
    impl super::super::Formatter for TitleFormatter {
        fn format(&self, _item: &Path, metadata: &Metadata) -> Vec<String> {
            metadata
                .get("title")
                .map(|titles| titles.iter().cloned().collect())
                .unwrap_or_default()
        }
    }

    fn components(items: Vec<PathBuf>, metadata: Metadata) -> ComponentSet {
        ComponentSet {
            indexer: Box::new(FixedIndexer(items)),
            matcher: Box::new(SelfSource),
            extractor: Box::new(FixedExtractor(metadata)),
            merger: Box::new(Union),
            munger: Box::new(Identity),
            formatter: Box::new(TitleFormatter),
        }
    }

    fn title_metadata(title: &str) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert("title".to_string(), BTreeSet::from([title.to_string()]));
        metadata
    }

    #[test]
    fn builds_entry_with_formatted_name() {
        let set = components(vec![], title_metadata("Alpha"));
        let mut names = Disambiguator::new();
        let entry = build_entry(Path::new("/data/a"), &set, None, &mut names).expect("entry");
        assert_eq!(entry.name_tuples().len(), 1);
        assert_eq!(entry.name_tuples()[0].name, "Alpha");
        assert_eq!(entry.name_tuples()[0].index, 0);
        assert_eq!(entry.metadata().get("title").unwrap().len(), 1);
    }

    #[test]
    fn extraction_failure_falls_back_to_basename() {
        let set = ComponentSet {
            indexer: Box::new(FixedIndexer(vec![])),
            matcher: Box::new(SelfSource),
            extractor: Box::new(FailingExtractor),
            merger: Box::new(Union),
            munger: Box::new(Identity),
            formatter: Box::new(TitleFormatter),
        };
        let mut names = Disambiguator::new();
        let entry = build_entry(Path::new("/data/alpha"), &set, None, &mut names).expect("entry");
        assert!(entry.metadata().is_empty());
        assert_eq!(entry.name_tuples()[0].name, "alpha");
    }

    #[test]
    fn colliding_names_get_distinct_indices_in_build_order() {
        let items = vec![PathBuf::from("/data/a"), PathBuf::from("/data/b")];
        let set = components(items, title_metadata("X"));
        let mut names = Disambiguator::new();
        let entries = index_source(Path::new("/data"), &set, &[], &mut names).expect("entries");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name_tuples()[0].render(), "X");
        assert_eq!(entries[1].name_tuples()[0].render(), "X (1)");
    }

    #[test]
    fn refresh_preserves_indices_for_unchanged_items() {
        let items = vec![PathBuf::from("/data/a"), PathBuf::from("/data/b")];
        let set = components(items.clone(), title_metadata("X"));
        let mut names = Disambiguator::new();
        let first = index_source(Path::new("/data"), &set, &[], &mut names).expect("entries");

        let second = index_source(Path::new("/data"), &set, &first, &mut names).expect("entries");
        assert_eq!(second[0].name_tuples()[0].index, 0);
        assert_eq!(second[1].name_tuples()[0].index, 1);

        // A genuinely new item with the same name advances the table.
        let grown = vec![
            PathBuf::from("/data/a"),
            PathBuf::from("/data/b"),
            PathBuf::from("/data/c"),
        ];
        let set = components(grown, title_metadata("X"));
        let third = index_source(Path::new("/data"), &set, &second, &mut names).expect("entries");
        assert_eq!(third[0].name_tuples()[0].index, 0);
        assert_eq!(third[1].name_tuples()[0].index, 1);
        assert_eq!(third[2].name_tuples()[0].index, 2);
    }
}
