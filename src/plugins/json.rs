//! JSON metadata extraction and date munging.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::{Datelike, NaiveDate};

use crate::error::{FacetError, Result};
use crate::pipeline::{Extractor, Munger};
use crate::types::Metadata;

/// Extracts a flat JSON object into key/value-set metadata.
///
/// Scalar values and arrays of scalars convert to strings; nested objects,
/// nested arrays, and nulls are dropped with a diagnostic, never fatally.
pub struct JsonExtractor;

impl Extractor for JsonExtractor {
    fn extract(&self, source: &Path) -> Result<Metadata> {
        let file = File::open(source)?;
        let value: serde_json::Value =
            serde_json::from_reader(BufReader::new(file)).map_err(|error| FacetError::Extract {
                path: source.to_path_buf(),
                reason: error.to_string(),
            })?;
        let serde_json::Value::Object(object) = value else {
            return Err(FacetError::Extract {
                path: source.to_path_buf(),
                reason: "top-level JSON value is not an object".to_string(),
            });
        };

        let mut metadata = Metadata::new();
        for (key, value) in object {
            let values = scalar_strings(&key, &value);
            if values.is_empty() {
                continue;
            }
            metadata.entry(key).or_default().extend(values);
        }
        Ok(metadata)
    }
}

fn scalar_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn scalar_strings(key: &str, value: &serde_json::Value) -> BTreeSet<String> {
    match value {
        serde_json::Value::Array(items) => items
            .iter()
            .filter_map(|item| {
                let converted = scalar_string(item);
                if converted.is_none() {
                    log::warn!("dropping non-scalar array element under key {key:?}");
                }
                converted
            })
            .collect(),
        serde_json::Value::Null => BTreeSet::new(),
        other => match scalar_string(other) {
            Some(converted) => BTreeSet::from([converted]),
            None => {
                log::warn!("dropping non-scalar value under key {key:?}");
                BTreeSet::new()
            }
        },
    }
}

/// Derives a `year` facet from a date-valued key, keeping the original key.
pub struct YearMunger {
    source_key: String,
}

impl YearMunger {
    pub fn new(source_key: &str) -> Self {
        Self {
            source_key: source_key.to_string(),
        }
    }
}

impl Munger for YearMunger {
    fn mung(&self, mut merged: Metadata) -> Metadata {
        let Some(dates) = merged.get(&self.source_key).cloned() else {
            return merged;
        };
        let mut years = BTreeSet::new();
        for date in &dates {
            match parse_year(date) {
                Some(year) => {
                    years.insert(year);
                }
                None => log::debug!("no year derivable from {date:?}"),
            }
        }
        if !years.is_empty() {
            merged.entry("year".to_string()).or_default().extend(years);
        }
        merged
    }
}

fn parse_year(raw: &str) -> Option<String> {
    for format in ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date.year().to_string());
        }
    }
    // A bare four-digit year is already what we want.
    raw.parse::<i32>()
        .ok()
        .filter(|year| (1000..=9999).contains(year))
        .map(|year| year.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn extracts_scalars_and_arrays() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("meta.json");
        let mut file = File::create(&path).expect("create");
        file.write_all(
            br#"{"title": "Alpha", "year": 1999, "genre": ["Comedy", "Drama"], "seen": true,
                "nested": {"ignored": 1}, "empty": null}"#,
        )
        .expect("write");

        let metadata = JsonExtractor.extract(&path).expect("extract");
        assert_eq!(
            metadata.get("title"),
            Some(&BTreeSet::from(["Alpha".to_string()]))
        );
        assert_eq!(
            metadata.get("year"),
            Some(&BTreeSet::from(["1999".to_string()]))
        );
        assert_eq!(
            metadata.get("genre"),
            Some(&BTreeSet::from([
                "Comedy".to_string(),
                "Drama".to_string()
            ]))
        );
        assert_eq!(
            metadata.get("seen"),
            Some(&BTreeSet::from(["true".to_string()]))
        );
        assert!(metadata.get("nested").is_none());
        assert!(metadata.get("empty").is_none());
    }

    #[test]
    fn non_object_top_level_is_an_extraction_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("meta.json");
        File::create(&path)
            .expect("create")
            .write_all(b"[1, 2, 3]")
            .expect("write");

        let error = JsonExtractor.extract(&path).expect_err("not an object");
        assert!(matches!(error, FacetError::Extract { .. }));
    }

    #[test]
    fn year_munger_derives_year_facet() {
        let mut merged = Metadata::new();
        merged.insert(
            "release_date".to_string(),
            BTreeSet::from(["1999-10-15".to_string()]),
        );

        let munged = YearMunger::new("release_date").mung(merged);
        assert_eq!(
            munged.get("year"),
            Some(&BTreeSet::from(["1999".to_string()]))
        );
        assert!(munged.contains_key("release_date"));
    }

    #[test]
    fn year_munger_ignores_unparseable_dates() {
        let mut merged = Metadata::new();
        merged.insert(
            "release_date".to_string(),
            BTreeSet::from(["someday".to_string()]),
        );

        let munged = YearMunger::new("release_date").mung(merged);
        assert!(munged.get("year").is_none());
    }
}
