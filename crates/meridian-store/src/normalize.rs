//! Legacy serialization tag normalization
//!
//! Some documents were dumped by a runtime that tags ordered maps as
//! `!!python/object/apply:collections.OrderedDict` (and tuples as
//! `!!python/tuple`). Only that runtime can rebuild those objects, so on load
//! the tags are mapped onto plain YAML mappings/sequences and recorded as
//! [`LegacyArtifact`]s. Saves always emit the plain form.

use meridian_domain::{FieldPath, LegacyArtifact};
use serde_yaml::value::TaggedValue;
use serde_yaml::{Mapping, Value};
use std::borrow::Cow;

/// Global tag prefix written by the legacy runtime
pub const LEGACY_TAG_MARKER: &str = "!!python/";

const LOCAL_TAG_MARKER: &str = "!python/";

/// Turn legacy global tags into local tags so the YAML parser keeps them as
/// tagged values instead of rejecting them
///
/// Only occurrences in tag position are touched: at the start of a line, after
/// `key:` or `- `, or inside a flow collection after `[`, `{` or `,`. Every
/// such occurrence on a line is rewritten. Prose that merely mentions the
/// marker is left alone.
pub fn rewrite_legacy_tags(raw: &str) -> Cow<'_, str> {
    if !raw.contains(LEGACY_TAG_MARKER) {
        return Cow::Borrowed(raw);
    }

    let mut out = String::with_capacity(raw.len());
    for line in raw.split_inclusive('\n') {
        out.push_str(&rewrite_line(line));
    }
    Cow::Owned(out)
}

fn rewrite_line(line: &str) -> Cow<'_, str> {
    if !line.contains(LEGACY_TAG_MARKER) {
        return Cow::Borrowed(line);
    }

    let mut rewritten = String::with_capacity(line.len());
    let mut changed = false;
    let mut cursor = 0;
    while let Some(offset) = line[cursor..].find(LEGACY_TAG_MARKER) {
        let at = cursor + offset;
        rewritten.push_str(&line[cursor..at]);
        if in_tag_position(&line[..at]) {
            rewritten.push_str(LOCAL_TAG_MARKER);
            changed = true;
        } else {
            rewritten.push_str(LEGACY_TAG_MARKER);
        }
        cursor = at + LEGACY_TAG_MARKER.len();
    }
    rewritten.push_str(&line[cursor..]);

    if changed {
        Cow::Owned(rewritten)
    } else {
        Cow::Borrowed(line)
    }
}

/// Whether a tag may start right after `before` (the line up to the marker)
fn in_tag_position(before: &str) -> bool {
    let before = before.trim_end();
    before.is_empty()
        || before == "---"
        || before.ends_with(|c: char| matches!(c, ':' | '-' | '[' | '{' | ','))
}

/// Normalize every legacy-tagged value in a top-level mapping
pub fn normalize_mapping(map: Mapping, path: &FieldPath, found: &mut Vec<LegacyArtifact>) -> Mapping {
    map.into_iter()
        .map(|(key, value)| {
            let child = match key.as_str() {
                Some(name) => path.key(name),
                None => path.clone(),
            };
            let value = normalize_value(value, &child, found);
            (key, value)
        })
        .collect()
}

/// Normalize one value, recursing into containers
pub fn normalize_value(value: Value, path: &FieldPath, found: &mut Vec<LegacyArtifact>) -> Value {
    match value {
        Value::Tagged(tagged) => {
            let TaggedValue { tag, value } = *tagged;
            let rendered = tag.to_string();
            let bare = rendered.trim_start_matches('!');
            if bare.starts_with("python/") {
                found.push(LegacyArtifact {
                    path: path.clone(),
                    tag: format!("!!{}", bare),
                });
                let inner = normalize_value(value, path, found);
                unwrap_legacy(bare, inner)
            } else {
                let value = normalize_value(value, path, found);
                Value::Tagged(Box::new(TaggedValue { tag, value }))
            }
        }
        Value::Mapping(map) => Value::Mapping(normalize_mapping(map, path, found)),
        Value::Sequence(seq) => Value::Sequence(
            seq.into_iter()
                .enumerate()
                .map(|(i, item)| normalize_value(item, &path.index(i), found))
                .collect(),
        ),
        other => other,
    }
}

/// Map the payload of a legacy object onto a portable value
fn unwrap_legacy(tag: &str, value: Value) -> Value {
    if tag.ends_with("OrderedDict") || tag.ends_with("dict") {
        return match value {
            Value::Sequence(seq) => match pairs_to_mapping(&seq) {
                Some(map) => Value::Mapping(map),
                None => Value::Sequence(seq),
            },
            Value::Mapping(map) => dictitems(map),
            Value::Null => Value::Mapping(Mapping::new()),
            other => other,
        };
    }
    match value {
        Value::Mapping(map) => dictitems(map),
        other => other,
    }
}

/// `{dictitems: {...}}` / `{state: {...}}` wrappers used by the object form
fn dictitems(map: Mapping) -> Value {
    for wrapper in ["dictitems", "state"] {
        if map.len() == 1 {
            if let Some(Value::Mapping(inner)) = map.get(wrapper) {
                return Value::Mapping(inner.clone());
            }
        }
    }
    Value::Mapping(map)
}

/// Accept both `[[k, v], ...]` and the apply-args form `[[[k, v], ...]]`
fn pairs_to_mapping(seq: &[Value]) -> Option<Mapping> {
    if seq.is_empty() {
        return Some(Mapping::new());
    }
    if let [Value::Sequence(args)] = seq {
        if let Some(map) = collect_pairs(args) {
            return Some(map);
        }
    }
    collect_pairs(seq)
}

fn collect_pairs(items: &[Value]) -> Option<Mapping> {
    let mut map = Mapping::new();
    for item in items {
        match item {
            Value::Sequence(pair) if pair.len() == 2 && is_scalar(&pair[0]) => {
                map.insert(pair[0].clone(), pair[1].clone());
            }
            _ => return None,
        }
    }
    Some(map)
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}
