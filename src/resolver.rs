//! Path resolution over the facet grammar.
//!
//! A decomposed path is consumed left to right by an explicit state machine.
//! `^` opens a new facet-key conjunction, a key segment binds the key, value
//! segments select values, and `+` adds an alternative value for the bound
//! key. Any other segment is a terminal literal naming an entry. At each
//! depth the resolver either returns the listing for the final segment or
//! narrows the active entry subset and moves on.
//!
//! Narrowing by a chosen value is deferred until its OR-group closes: a
//! value segment only filters the entry subset when the *next* segment is
//! not `+`. This one piece of lookahead is what makes `key/a/+/b` mean
//! "a or b" as a single filter instead of two sequential filters.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::entry::{all_results, Entry};
use crate::error::{FacetError, Result};
use crate::facet;
use crate::types::{ResultNode, AND_TOKEN, CURRENT_TOKEN, OR_TOKEN, PARENT_TOKEN};

/// What the previous segment was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResolveState {
    /// Nothing consumed yet.
    None,
    /// Just consumed `^`.
    And,
    /// Just consumed a facet key.
    Key,
    /// Just consumed `+`.
    Or,
    /// Just consumed a facet value.
    Val,
}

/// Resolves normalized path segments against an entry set.
///
/// Returns the directory listing for the deepest segment, or a single
/// CURRENT-named symlink result when the path terminates in an entry name.
/// Any grammar violation yields [`FacetError::InvalidPath`].
pub fn resolve(entries: &[Arc<Entry>], segments: &[String]) -> Result<Vec<ResultNode>> {
    if segments.is_empty() {
        return Ok(root_listing(entries));
    }

    let mut found: Vec<Arc<Entry>> = entries.to_vec();
    let mut bound: BTreeSet<String> = BTreeSet::new();
    let mut chosen: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut valid_keys: BTreeSet<String> = BTreeSet::new();
    let mut valid_values: BTreeSet<String> = BTreeSet::new();
    let mut current_key: Option<String> = None;
    let mut state = ResolveState::None;
    let last_index = segments.len() - 1;

    for (index, segment) in segments.iter().enumerate() {
        let is_last = index == last_index;

        if segment == AND_TOKEN {
            // Reset the key selection and offer the keys still unbound.
            state = ResolveState::And;
            current_key = None;
            valid_values.clear();
            valid_keys = facet::valid_keys(&found, &bound);
            if is_last {
                return Ok(key_listing(&valid_keys));
            }
            continue;
        }

        match state {
            ResolveState::And => {
                if !valid_keys.remove(segment) {
                    if bound.contains(segment) {
                        return Err(FacetError::InvalidPath(format!(
                            "duplicate key [{segment}]"
                        )));
                    }
                    return Err(FacetError::InvalidPath(format!("invalid key [{segment}]")));
                }
                bound.insert(segment.clone());
                chosen.insert(segment.clone(), BTreeSet::new());
                valid_values = facet::valid_values(&found, segment);
                current_key = Some(segment.clone());
                state = ResolveState::Key;
                if is_last {
                    return Ok(value_listing(&valid_values));
                }
            }
            ResolveState::Val if segment == OR_TOKEN => {
                state = ResolveState::Or;
                if is_last {
                    return Ok(value_listing(&valid_values));
                }
            }
            ResolveState::Key | ResolveState::Or => {
                if !valid_values.remove(segment) {
                    return Err(FacetError::InvalidPath(format!(
                        "invalid value [{segment}]"
                    )));
                }
                let Some(key) = current_key.clone() else {
                    return Err(FacetError::InvalidPath(format!(
                        "value [{segment}] without a selected key"
                    )));
                };
                if let Some(values) = chosen.get_mut(&key) {
                    values.insert(segment.clone());
                }
                // Lookahead: only narrow once the OR-group is complete.
                let next_is_or = segments
                    .get(index + 1)
                    .is_some_and(|next| next == OR_TOKEN);
                if !next_is_or {
                    if let Some(values) = chosen.get(&key) {
                        log::debug!("narrowing by {key} -> {values:?}");
                        found = facet::narrow(found, &key, values);
                    }
                }
                state = ResolveState::Val;
                if is_last {
                    let mut results = all_results(&found);
                    results.push(ResultNode::dir(CURRENT_TOKEN));
                    results.push(ResultNode::dir(PARENT_TOKEN));
                    if !valid_values.is_empty() {
                        results.push(ResultNode::dir(OR_TOKEN));
                    }
                    if !valid_keys.is_empty() {
                        results.push(ResultNode::dir(AND_TOKEN));
                    }
                    return Ok(results);
                }
            }
            ResolveState::None | ResolveState::Val => {
                // A terminal literal: the display name of an entry.
                if !is_last {
                    return Err(FacetError::InvalidPath(format!(
                        "segments after terminal name [{segment}]"
                    )));
                }
                for entry in &found {
                    if entry.has_rendered_name(segment) {
                        return Ok(vec![ResultNode::link(CURRENT_TOKEN, entry.item_path())]);
                    }
                }
                return Err(FacetError::InvalidPath(format!(
                    "unknown name [{segment}]"
                )));
            }
        }
    }

    // Every arm above returns on the last segment.
    Err(FacetError::InvalidPath(
        "resolution ended in a non-terminal state".to_string(),
    ))
}

fn root_listing(entries: &[Arc<Entry>]) -> Vec<ResultNode> {
    let mut results = all_results(entries);
    results.push(ResultNode::dir(AND_TOKEN));
    results.push(ResultNode::dir(CURRENT_TOKEN));
    results.push(ResultNode::dir(PARENT_TOKEN));
    results
}

fn key_listing(keys: &BTreeSet<String>) -> Vec<ResultNode> {
    let mut results: Vec<ResultNode> = keys.iter().map(ResultNode::dir).collect();
    results.push(ResultNode::dir(CURRENT_TOKEN));
    results.push(ResultNode::dir(PARENT_TOKEN));
    results
}

fn value_listing(values: &BTreeSet<String>) -> Vec<ResultNode> {
    let mut results: Vec<ResultNode> = values.iter().map(ResultNode::dir).collect();
    results.push(ResultNode::dir(CURRENT_TOKEN));
    results.push(ResultNode::dir(PARENT_TOKEN));
    results
}
