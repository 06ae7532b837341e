//! Stable text rendering of directive maps.

use super::{CustomDirectives, DirectiveMap};

/// `key=value` lines sorted by the whole line.
pub fn format_defaults(defaults: &DirectiveMap) -> String {
    let mut lines: Vec<String> = defaults.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    lines.sort();
    lines.join("\n")
}

/// `key=value` lines, keys sorted, values of one key in recorded order.
pub fn format_custom(custom: &CustomDirectives) -> String {
    let mut lines = Vec::new();
    for (key, values) in custom.iter() {
        for value in values {
            lines.push(format!("{}={}", key, value));
        }
    }
    lines.join("\n")
}
