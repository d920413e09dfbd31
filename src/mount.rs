//! Mount configuration: one faceted view over one source directory.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::entry::Entry;
use crate::pipeline::ComponentSet;

fn default_matcher() -> String {
    "self".to_string()
}

fn default_merger() -> String {
    "union".to_string()
}

fn default_munger() -> String {
    "identity".to_string()
}

fn default_formatter() -> String {
    "basename".to_string()
}

/// Options for one mounted source, as supplied by the external
/// configuration loader. Component fields name factories in the
/// [`ComponentRegistry`](crate::plugins::ComponentRegistry); the indexer and
/// extractor have no default and must be named explicitly.
#[derive(Debug, Clone, Deserialize)]
pub struct MountOptions {
    /// Source directory to index.
    pub source: PathBuf,

    pub indexer: String,
    #[serde(default = "default_matcher")]
    pub matcher: String,
    pub extractor: String,
    #[serde(default = "default_merger")]
    pub merger: String,
    #[serde(default = "default_munger")]
    pub munger: String,
    #[serde(default = "default_formatter")]
    pub formatter: String,

    /// Opaque options passed to every component factory.
    #[serde(default)]
    pub options: BTreeMap<String, String>,

    /// Seconds between entry rebuilds; 0 disables refresh.
    #[serde(default)]
    pub refresh_interval_secs: u64,
}

impl MountOptions {
    /// Minimal options with the default matcher/merger/munger/formatter.
    pub fn new(source: impl Into<PathBuf>, indexer: &str, extractor: &str) -> Self {
        Self {
            source: source.into(),
            indexer: indexer.to_string(),
            matcher: default_matcher(),
            extractor: extractor.to_string(),
            merger: default_merger(),
            munger: default_munger(),
            formatter: default_formatter(),
            options: BTreeMap::new(),
            refresh_interval_secs: 0,
        }
    }
}

/// A configured mount: its options, instantiated components, and the current
/// entry list. The entry list is replaced atomically by refresh, never
/// mutated in place.
pub(crate) struct Mount {
    pub options: MountOptions,
    pub components: ComponentSet,
    pub entries: Vec<Arc<Entry>>,
    pub last_refresh: Instant,
}

impl Mount {
    pub fn refresh_due(&self, now: Instant) -> bool {
        if self.options.refresh_interval_secs == 0 {
            return false;
        }
        let interval = Duration::from_secs(self.options.refresh_interval_secs);
        now.duration_since(self.last_refresh) > interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_with_role_defaults() {
        let options: MountOptions = serde_json::from_str(
            r#"{"source": "/srv/media", "indexer": "json", "extractor": "json"}"#,
        )
        .expect("options");
        assert_eq!(options.matcher, "self");
        assert_eq!(options.merger, "union");
        assert_eq!(options.munger, "identity");
        assert_eq!(options.formatter, "basename");
        assert_eq!(options.refresh_interval_secs, 0);
    }

    #[test]
    fn missing_required_role_fails_deserialization() {
        let result = serde_json::from_str::<MountOptions>(r#"{"source": "/srv/media"}"#);
        assert!(result.is_err());
    }
}
