//! `${name}` property expression evaluation for build descriptors.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::provider::Model;

// A `${` with no closing brace never matches and is left untouched.
static PROPERTY_REF: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").ok());

/// Nesting depth after which references are considered circular.
const MAX_EXPANSIONS: usize = 16;

/// Effective property table of a manifest.
pub type Properties = BTreeMap<String, String>;

/// Whether `value` still contains a property reference.
pub fn is_expression(value: &str) -> bool {
    value.contains("${")
}

/// Expand every `${name}` in `expr` using `properties`.
///
/// Returns `None` when any reference is undefined, circular, or the input is
/// empty, so callers never see a partially expanded value.
pub fn resolve(expr: &str, properties: &Properties) -> Option<String> {
    let re = PROPERTY_REF.as_ref()?;
    let mut value = expr.trim().to_string();
    if value.is_empty() {
        return None;
    }
    for _ in 0..MAX_EXPANSIONS {
        if !is_expression(&value) {
            return Some(value);
        }
        let mut missing = false;
        let expanded = re.replace_all(&value, |caps: &regex::Captures<'_>| {
            match properties.get(&caps[1]) {
                Some(v) => v.clone(),
                None => {
                    missing = true;
                    caps[0].to_string()
                }
            }
        });
        if missing || expanded == value {
            return None;
        }
        value = expanded.into_owned();
    }
    None
}

/// Declared properties, overlaid by default-active profiles, overlaid by
/// the manifest's `project.version` and `project.groupId`.
pub fn model_properties(group_id: &str, version: &str, model: &Model) -> Properties {
    let mut properties = model.properties.clone();
    for profile in model.profiles.iter().filter(|p| p.active_by_default) {
        properties.extend(profile.properties.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    properties.insert("project.version".to_string(), version.to_string());
    properties.insert("project.groupId".to_string(), group_id.to_string());
    properties
}

/// `child` over `parent`: child entries win.
pub fn merge_under(parent: &Properties, child: Properties) -> Properties {
    let mut merged = parent.clone();
    merged.extend(child);
    merged
}
