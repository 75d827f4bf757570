//! schema.org JSON-LD fallbacks for video metadata.
//!
//! Inputs are the raw bodies of `application/ld+json` script blocks.
//! Malformed blocks are skipped.

use serde_json::Value;

/// Top-level items of every block, with arrays and `@graph` containers
/// flattened.
fn items(blocks: &[String]) -> Vec<Value> {
    let mut out = Vec::new();
    for block in blocks {
        let value: Value = match serde_json::from_str(block) {
            Ok(v) => v,
            Err(err) => {
                tracing::debug!(error = %err, "skipping malformed structured data block");
                continue;
            }
        };
        let mut candidates = match value {
            Value::Array(values) => values,
            other => vec![other],
        };
        let graphs: Vec<Value> = candidates
            .iter()
            .filter_map(|item| item.get("@graph").and_then(Value::as_array))
            .flatten()
            .cloned()
            .collect();
        candidates.extend(graphs);
        out.extend(candidates);
    }
    out
}

fn one_or_many(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(values) => values.iter().collect(),
        other => vec![other],
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// `interactionType` is either an IRI string or a typed object.
fn is_interaction(counter: &Value, kind: &str) -> bool {
    match counter.get("interactionType") {
        Some(Value::String(s)) => s.ends_with(kind),
        Some(obj @ Value::Object(_)) => obj
            .get("@type")
            .and_then(Value::as_str)
            .is_some_and(|t| t.ends_with(kind)),
        _ => false,
    }
}

/// `userInteractionCount` of the first `interactionStatistic` whose type ends
/// with `kind` (e.g. `"LikeAction"`).
pub(crate) fn interaction_count(blocks: &[String], kind: &str) -> Option<String> {
    items(blocks).iter().find_map(|item| {
        let stats = item.get("interactionStatistic")?;
        one_or_many(stats)
            .into_iter()
            .filter(|counter| is_interaction(counter, kind))
            .find_map(|counter| counter.get("userInteractionCount").and_then(scalar_string))
    })
}

/// Name of the first item's author; `author` may be a string, an object or
/// an array of either.
pub(crate) fn author_name(blocks: &[String]) -> Option<String> {
    items(blocks).iter().find_map(|item| {
        let author = item.get("author")?;
        one_or_many(author).into_iter().find_map(|a| match a {
            Value::Object(_) => a.get("name").and_then(scalar_string),
            other => scalar_string(other),
        })
    })
}
