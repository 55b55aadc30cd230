use std::collections::BTreeMap;

use serde_json::Value;

/// Paths that start with this prefix are queries against the execution-result
/// tree; anything else is a literal the caller embedded in its config.
pub const PATH_PREFIX: &str = "execution.";

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Resolved<'a> {
    /// The path had no `execution.` prefix and is returned unchanged.
    Literal(&'a str),
    /// The path resolved to a value in the tree (arrays returned as-is).
    Value(&'a Value),
    /// A segment was absent, or the walk hit a scalar before the path ended.
    NotFound,
}

impl Resolved<'_> {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Resolved::NotFound)
    }
}

/// Structured-mode resolution. Malformed paths degrade to `NotFound`, never
/// panic.
pub fn resolve<'a>(path: &'a str, tree: &'a Value) -> Resolved<'a> {
    let Some(rest) = path.strip_prefix(PATH_PREFIX) else {
        return Resolved::Literal(path);
    };

    let mut current = tree;
    for segment in rest.split('.') {
        if segment.is_empty() {
            return Resolved::NotFound;
        }
        current = match current {
            Value::Object(map) => match map.get(segment) {
                Some(v) => v,
                None => return Resolved::NotFound,
            },
            Value::Array(items) => {
                match segment.parse::<usize>().ok().and_then(|i| items.get(i)) {
                    Some(v) => v,
                    None => return Resolved::NotFound,
                }
            }
            _ => return Resolved::NotFound,
        };
    }
    Resolved::Value(current)
}

/// Template-mode resolution: always yields display text. Misses render as the
/// original path wrapped in braces so broken placeholders stay visible.
pub fn resolve_display(path: &str, tree: &Value) -> String {
    match resolve(path, tree) {
        Resolved::Literal(s) => s.to_string(),
        Resolved::Value(v) => display_value(v),
        Resolved::NotFound => format!("{{{path}}}"),
    }
}

/// Canonical display form. Arrays comma-join their elements, which makes
/// `[1,2]` and `"1,2"` indistinguishable; the dashboard match marking depends
/// on exactly that.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(","),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Expands `{key}` references in a template using template-mode resolution of
/// each placeholder path.
pub fn substitute(template: &str, placeholders: &BTreeMap<String, String>, tree: &Value) -> String {
    let mut out = template.to_string();
    for (key, path) in placeholders {
        let needle = format!("{{{key}}}");
        if out.contains(&needle) {
            out = out.replace(&needle, &resolve_display(path, tree));
        }
    }
    out
}
