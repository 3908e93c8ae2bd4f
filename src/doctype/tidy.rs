//! Normalization of intersections and unions.

use crate::error::ParseError;
use crate::types::ArtifactRegistry;

use super::supertypes::{compare_types, super_types};

/// Umbrella types and the members that together make them up.  `scalar`
/// is checked after `array-key` so it can see a synthesized one.
const UMBRELLAS: [(&str, &[&str]); 3] = [
    ("array-key", &["int", "string"]),
    ("scalar", &["bool", "float", "array-key"]),
    ("iterable", &["\\Traversable", "array"]),
];

/// Normalize the members of one intersection.
///
/// Every member must be object-like.  Members that are supertypes of
/// another member are dropped, the rest are sorted and deduplicated.
pub fn tidy_intersection(
    artifacts: &ArtifactRegistry,
    members: Vec<String>,
) -> Result<Vec<String>, ParseError> {
    if members.len() <= 1 {
        return Ok(members);
    }

    let mut kept = members.clone();
    for member in &members {
        let supers = super_types(artifacts, member);
        let object_like = matches!(member.as_str(), "object" | "iterable" | "callable")
            || supers.iter().any(|s| s == "object");
        if !object_like {
            return Err(ParseError::IntersectionNonObject(member.clone()));
        }
        for sup in &supers {
            if let Some(pos) = kept.iter().position(|k| k == sup) {
                kept.remove(pos);
            }
        }
    }

    kept.sort();
    kept.dedup();
    if kept.iter().any(|k| k == "never") {
        return Ok(vec!["never".to_string()]);
    }
    if kept.len() > 1 {
        kept.retain(|k| k != "mixed");
    }
    Ok(kept)
}

/// Normalize the members of a union.
///
/// Synthesizes the umbrella types `array-key`, `scalar` and `iterable`
/// when their parts are all present, then applies the `mixed` / `never`
/// absorption rules and drops members covered by a wider member.
///
/// An umbrella whose parts are all present never absorbs anything, so
/// `(int|string)|null` and `int|string|null` come out the same.
pub fn tidy_union(artifacts: &ArtifactRegistry, mut members: Vec<String>) -> Vec<String> {
    if members.len() <= 1 {
        return members;
    }

    let has = |members: &[String], name: &str| members.iter().any(|m| m == name);
    let mut covered: Vec<&str> = Vec::new();
    for (umbrella, parts) in UMBRELLAS {
        if parts.iter().all(|p| has(&members, p)) {
            if !has(&members, umbrella) {
                members.push(umbrella.to_string());
            }
            covered.push(umbrella);
        }
    }

    members.sort();
    members.dedup();
    if has(&members, "mixed") {
        return vec!["mixed".to_string()];
    }
    if members.len() > 1 {
        members.retain(|m| m != "never");
    }

    let mut removed = vec![false; members.len()];
    for wide in 0..members.len() {
        if removed[wide] || covered.contains(&members[wide].as_str()) {
            continue;
        }
        for narrow in 0..members.len() {
            if removed[narrow] || members[narrow] == members[wide] {
                continue;
            }
            if compare_types(artifacts, Some(&members[wide]), Some(&members[narrow])) {
                removed[narrow] = true;
            }
        }
    }

    members
        .into_iter()
        .zip(removed)
        .filter_map(|(member, gone)| (!gone).then_some(member))
        .collect()
}
