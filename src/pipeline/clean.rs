//! Cleaning rules for metadata keys, values, and display names.
//!
//! Every string exposed as a path segment has disallowed characters
//! stripped, is trimmed, and must not collide with a reserved control token.
//! Names are cleaned to a fixed point so that alternating runs of
//! disallowed characters and whitespace cannot survive a single pass.

use crate::types::{Metadata, AND_TOKEN, CURRENT_TOKEN, OR_TOKEN, PARENT_TOKEN};

/// Characters never allowed in an exposed path segment.
const DISALLOWED: &[char] = &['/', '\\', '?', '%', '*', ':', '|', '"', '<', '>'];

fn strip_pass(raw: &str) -> String {
    let stripped: String = raw
        .chars()
        .filter(|c| !DISALLOWED.contains(c) && !c.is_control())
        .collect();
    stripped.trim().to_string()
}

fn is_reserved(segment: &str) -> bool {
    matches!(segment, t if t == AND_TOKEN || t == OR_TOKEN || t == CURRENT_TOKEN || t == PARENT_TOKEN)
}

/// Cleans one key, value, or name. Returns `None` when the string reduces to
/// nothing or to a reserved token.
pub fn clean_string(raw: &str) -> Option<String> {
    let mut current = raw.to_string();
    loop {
        let next = strip_pass(&current);
        if next == current {
            break;
        }
        current = next;
    }
    if current.is_empty() || is_reserved(&current) {
        None
    } else {
        Some(current)
    }
}

/// Cleans every key and value of a metadata map. Keys whose value set becomes
/// empty are dropped; keys that clean to the same string are merged.
pub fn clean_metadata(raw: Metadata) -> Metadata {
    let mut cleaned = Metadata::new();
    for (key, values) in raw {
        let Some(clean_key) = clean_string(&key) else {
            log::warn!("dropping metadata key that cleaned to nothing: {key:?}");
            continue;
        };
        let clean_values: std::collections::BTreeSet<String> = values
            .iter()
            .filter_map(|value| {
                let cleaned_value = clean_string(value);
                if cleaned_value.is_none() {
                    log::warn!("dropping metadata value that cleaned to nothing: {value:?}");
                }
                cleaned_value
            })
            .collect();
        if clean_values.is_empty() {
            log::warn!("dropping metadata key {clean_key:?}: no values survived cleaning");
            continue;
        }
        cleaned.entry(clean_key).or_default().extend(clean_values);
    }
    cleaned
}

/// Cleans candidate display names, preserving order and dropping duplicates.
pub fn clean_names(raw: &[String]) -> Vec<String> {
    let mut seen = std::collections::BTreeSet::new();
    let mut names = Vec::new();
    for name in raw {
        let Some(cleaned) = clean_string(name) else {
            log::warn!("dropping display name that cleaned to nothing: {name:?}");
            continue;
        };
        if seen.insert(cleaned.clone()) {
            names.push(cleaned);
        }
    }
    names
}
