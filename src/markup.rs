//! Tolerant extraction of tag-delimited records from oracle free text.
//!
//! The oracle is a language model with no schema enforcement: responses carry
//! ad hoc markup (`<axis>...</axis>`, `<option>...</option>`,
//! `<tag dimension="...">...</tag>`) embedded in arbitrary prose, and
//! malformed or truncated blocks are routine. Every function here is a
//! best-effort scanner: well-formed blocks are extracted, everything else is
//! silently skipped, and zero matches yield an empty collection. None of
//! these functions can fail.

use crate::space::{AxisStatus, AxisUpdate, Tag};
use std::str::FromStr;

/// Extract the names inside plain `<axis>...</axis>` blocks, in document
/// order, whitespace-trimmed. Unterminated blocks are skipped. Duplicates are
/// NOT filtered; callers that need uniqueness must enforce it themselves.
pub fn extract_axis_names(text: &str) -> Vec<String> {
    let mut names = Vec::new();
    for segment in text.split("<axis>").skip(1) {
        if let Some((inner, _)) = segment.split_once("</axis>") {
            let name = inner.trim();
            if !name.is_empty() {
                names.push(name.to_string());
            }
        }
    }
    names
}

/// Extract `<axis name="..." status="...">value</axis>` blocks into ordered
/// `(name, update)` pairs.
///
/// The `name` attribute is required; blocks without it are skipped. `status`
/// defaults to `unconstrained` when absent or unrecognized. The value is the
/// inner text, whitespace-trimmed. Later entries for the same name win when
/// applied sequentially, matching mapping semantics.
pub fn extract_axis_updates(text: &str) -> Vec<(String, AxisUpdate)> {
    let mut updates = Vec::new();
    for segment in text.split("<axis").skip(1) {
        let Some((block, _)) = segment.split_once("</axis>") else {
            continue;
        };
        let Some((head, value)) = block.split_once('>') else {
            continue;
        };
        let Some(name) = attribute(head, "name") else {
            continue;
        };
        if name.is_empty() {
            continue;
        }
        let status = attribute(head, "status")
            .and_then(|raw| AxisStatus::from_str(raw).ok())
            .unwrap_or(AxisStatus::Unconstrained);
        updates.push((
            name.to_string(),
            AxisUpdate {
                status,
                value: value.trim().to_string(),
            },
        ));
    }
    updates
}

/// Extract all `<option>...</option>` values inside an `<options>` wrapper,
/// in document order. An absent wrapper yields an empty list.
pub fn extract_options(text: &str) -> Vec<String> {
    let mut options = Vec::new();
    for segment in text.split("<options").skip(1) {
        let Some((inner, _)) = segment.split_once("</options>") else {
            continue;
        };
        for candidate in inner.split("<option>").skip(1) {
            if let Some((value, _)) = candidate.split_once("</option>") {
                let value = value.trim();
                if !value.is_empty() {
                    options.push(value.to_string());
                }
            }
        }
    }
    options
}

/// Extract `<tag dimension="...">value</tag>` blocks. The `dimension`
/// attribute is required; blocks without it are skipped. Values are trimmed
/// and lower-cased before storage.
pub fn extract_tags(text: &str) -> Vec<Tag> {
    let mut tags = Vec::new();
    for segment in text.split("<tag").skip(1) {
        let Some((block, _)) = segment.split_once("</tag>") else {
            continue;
        };
        let Some((head, value)) = block.split_once('>') else {
            continue;
        };
        let Some(dimension) = attribute(head, "dimension") else {
            continue;
        };
        if dimension.is_empty() {
            continue;
        }
        tags.push(Tag {
            dimension: dimension.to_string(),
            value: value.trim().to_lowercase(),
        });
    }
    tags
}

/// Find a `key="value"` attribute in a tag head. A quoted-substring scan, not
/// an attribute grammar; good enough for model output and never fails.
fn attribute<'a>(head: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!("{name}=\"");
    let start = head.find(&needle)? + needle.len();
    let rest = &head[start..];
    rest.find('"').map(|end| &rest[..end])
}
