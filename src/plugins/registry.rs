//! Name-to-factory registry for pipeline components.

use std::collections::{BTreeMap, HashMap};

use crate::error::{FacetError, Result};
use crate::mount::MountOptions;
use crate::pipeline::{
    ComponentSet, Extractor, Formatter, Indexer, Matcher, Merger, Munger,
};
use crate::plugins::default::{
    BasenameFormatter, GlobDirectoryIndexer, GlobFileIndexer, GlobFileMatcher, IdentityMunger,
    KeyFormatter, SelfMatcher, UnionMerger,
};
use crate::plugins::json::{JsonExtractor, YearMunger};

type Options = BTreeMap<String, String>;
type Factory<T> = Box<dyn Fn(&Options) -> Result<Box<T>> + Send + Sync>;

fn required_option<'a>(options: &'a Options, name: &str, role: &str) -> Result<&'a str> {
    options
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| FacetError::Configuration(format!("{role} requires option {name:?}")))
}

/// Maps component names to factories, one table per pipeline role.
///
/// [`ComponentRegistry::builtin`] registers the stock components; callers can
/// add their own factories before constructing a
/// [`FacetFs`](crate::fs::FacetFs).
pub struct ComponentRegistry {
    indexers: HashMap<String, Factory<dyn Indexer>>,
    matchers: HashMap<String, Factory<dyn Matcher>>,
    extractors: HashMap<String, Factory<dyn Extractor>>,
    mergers: HashMap<String, Factory<dyn Merger>>,
    mungers: HashMap<String, Factory<dyn Munger>>,
    formatters: HashMap<String, Factory<dyn Formatter>>,
}

impl ComponentRegistry {
    pub fn empty() -> Self {
        Self {
            indexers: HashMap::new(),
            matchers: HashMap::new(),
            extractors: HashMap::new(),
            mergers: HashMap::new(),
            mungers: HashMap::new(),
            formatters: HashMap::new(),
        }
    }

    /// A registry pre-populated with the stock components.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register_indexer("glob-dirs", |options| {
            let glob = required_option(options, "glob", "glob-dirs indexer")?;
            Ok(Box::new(GlobDirectoryIndexer::new(glob)?))
        });
        registry.register_indexer("glob-files", |options| {
            let glob = required_option(options, "glob", "glob-files indexer")?;
            Ok(Box::new(GlobFileIndexer::new(glob)?))
        });
        registry.register_indexer("json", |_| {
            Ok(Box::new(GlobDirectoryIndexer::new("*.json")?))
        });
        registry.register_matcher("self", |_| Ok(Box::new(SelfMatcher)));
        registry.register_matcher("glob", |options| {
            let glob = required_option(options, "glob", "glob matcher")?;
            Ok(Box::new(GlobFileMatcher::new(glob)?))
        });
        registry.register_matcher("json", |_| Ok(Box::new(GlobFileMatcher::new("*.json")?)));
        registry.register_extractor("json", |_| Ok(Box::new(JsonExtractor)));
        registry.register_merger("union", |_| Ok(Box::new(UnionMerger)));
        registry.register_munger("identity", |_| Ok(Box::new(IdentityMunger)));
        registry.register_munger("year", |options| {
            let source_key = options.get("year_from").map(String::as_str).unwrap_or("date");
            Ok(Box::new(YearMunger::new(source_key)))
        });
        registry.register_formatter("basename", |_| Ok(Box::new(BasenameFormatter)));
        registry.register_formatter("keys", |options| {
            let name_key = required_option(options, "name_key", "keys formatter")?;
            let detail_keys = options
                .get("detail_keys")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|key| !key.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            Ok(Box::new(KeyFormatter::new(name_key, detail_keys)))
        });
        registry
    }

    pub fn register_indexer<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&Options) -> Result<Box<dyn Indexer>> + Send + Sync + 'static,
    {
        self.indexers.insert(name.to_string(), Box::new(factory));
    }

    pub fn register_matcher<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&Options) -> Result<Box<dyn Matcher>> + Send + Sync + 'static,
    {
        self.matchers.insert(name.to_string(), Box::new(factory));
    }

    pub fn register_extractor<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&Options) -> Result<Box<dyn Extractor>> + Send + Sync + 'static,
    {
        self.extractors.insert(name.to_string(), Box::new(factory));
    }

    pub fn register_merger<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&Options) -> Result<Box<dyn Merger>> + Send + Sync + 'static,
    {
        self.mergers.insert(name.to_string(), Box::new(factory));
    }

    pub fn register_munger<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&Options) -> Result<Box<dyn Munger>> + Send + Sync + 'static,
    {
        self.mungers.insert(name.to_string(), Box::new(factory));
    }

    pub fn register_formatter<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&Options) -> Result<Box<dyn Formatter>> + Send + Sync + 'static,
    {
        self.formatters.insert(name.to_string(), Box::new(factory));
    }

    /// Instantiates all six components named by a mount's options.
    pub fn build(&self, options: &MountOptions) -> Result<ComponentSet> {
        Ok(ComponentSet {
            indexer: build_role(&self.indexers, "indexer", &options.indexer, &options.options)?,
            matcher: build_role(&self.matchers, "matcher", &options.matcher, &options.options)?,
            extractor: build_role(
                &self.extractors,
                "extractor",
                &options.extractor,
                &options.options,
            )?,
            merger: build_role(&self.mergers, "merger", &options.merger, &options.options)?,
            munger: build_role(&self.mungers, "munger", &options.munger, &options.options)?,
            formatter: build_role(
                &self.formatters,
                "formatter",
                &options.formatter,
                &options.options,
            )?,
        })
    }
}

fn build_role<T: ?Sized>(
    factories: &HashMap<String, Factory<T>>,
    role: &str,
    name: &str,
    options: &Options,
) -> Result<Box<T>> {
    let factory = factories
        .get(name)
        .ok_or_else(|| FacetError::Configuration(format!("unknown {role} {name:?}")))?;
    factory(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_the_default_json_pipeline() {
        let registry = ComponentRegistry::builtin();
        let options = MountOptions::new("/srv/media", "json", "json");
        registry.build(&options).expect("component set");
    }

    #[test]
    fn unknown_component_name_is_a_configuration_error() {
        let registry = ComponentRegistry::builtin();
        let options = MountOptions::new("/srv/media", "nonexistent", "json");
        let error = registry.build(&options).expect_err("unknown indexer");
        assert!(matches!(error, FacetError::Configuration(_)));
        assert!(error.to_string().contains("indexer"));
    }

    #[test]
    fn glob_indexer_requires_its_glob_option() {
        let registry = ComponentRegistry::builtin();
        let options = MountOptions::new("/srv/media", "glob-dirs", "json");
        let error = registry.build(&options).expect_err("missing glob");
        assert!(matches!(error, FacetError::Configuration(_)));
    }

    #[test]
    fn keys_formatter_parses_detail_keys() {
        let registry = ComponentRegistry::builtin();
        let mut options = MountOptions::new("/srv/media", "json", "json");
        options.formatter = "keys".to_string();
        options
            .options
            .insert("name_key".to_string(), "title".to_string());
        options
            .options
            .insert("detail_keys".to_string(), "year, director".to_string());
        registry.build(&options).expect("component set");
    }

    #[test]
    fn external_factories_can_be_registered() {
        let mut registry = ComponentRegistry::builtin();
        registry.register_munger("noop", |_| Ok(Box::new(IdentityMunger)));
        let mut options = MountOptions::new("/srv/media", "json", "json");
        options.munger = "noop".to_string();
        registry.build(&options).expect("component set");
    }
}
