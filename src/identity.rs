//! Service naming.
//!
//! The canonical name is used for the unit file, the system user and every
//! path derived from the service; the label is what humans read in
//! `Description=` and the generated scripts.

use regex::Regex;
use std::sync::OnceLock;

/// Name used when the raw input has no usable characters.
pub const DEFAULT_SERVICE_NAME: &str = "service";

/// Prefix for names that would otherwise start with a digit.
pub const DIGIT_PREFIX: &str = "svc_";

/// Canonical name plus display label, both derived from one raw name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceIdentity {
    name: String,
    label: String,
}

impl ServiceIdentity {
    pub fn new(raw: &str) -> Self {
        let name = canonical_name(raw);
        let mut label = display_label(raw);
        if label.is_empty() {
            label = display_label(&name);
        }
        Self { name, label }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Lowercase, filesystem-safe service name.
///
/// Dots and spaces become underscores, then everything outside
/// `[a-z0-9_-]` is dropped.
pub fn canonical_name(raw: &str) -> String {
    static DISALLOWED: OnceLock<Regex> = OnceLock::new();
    let disallowed =
        DISALLOWED.get_or_init(|| Regex::new(r"[^a-z0-9_-]").expect("valid name pattern"));

    let lowered = raw.to_lowercase().replace(['.', ' '], "_");
    let mut name = disallowed.replace_all(&lowered, "").into_owned();

    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert_str(0, DIGIT_PREFIX);
    }
    if name.is_empty() {
        name = DEFAULT_SERVICE_NAME.to_string();
    }
    name
}

/// Human-readable label: split on whitespace, `_` and `-`, capitalize each word.
pub fn display_label(raw: &str) -> String {
    raw.split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_name() {
        assert_eq!(canonical_name("My App"), "my_app");
        assert_eq!(canonical_name("web.api-v2"), "web_api-v2");
        assert_eq!(canonical_name("Ünïcode!$"), "ncode");
        assert_eq!(canonical_name("3proxy"), "svc_3proxy");
        assert_eq!(canonical_name("a\tb/c"), "abc");
    }

    #[test]
    fn test_empty_name_falls_back() {
        let identity = ServiceIdentity::new("");
        assert_eq!(identity.name(), DEFAULT_SERVICE_NAME);
        assert_eq!(identity.label(), "Service");

        assert_eq!(canonical_name("!!!"), DEFAULT_SERVICE_NAME);
    }

    #[test]
    fn test_label_from_raw_name() {
        assert_eq!(ServiceIdentity::new("my_cool-app").label(), "My Cool App");
        assert_eq!(ServiceIdentity::new("  image  server ").label(), "Image Server");
    }

    #[test]
    fn test_identity_is_pure() {
        assert_eq!(ServiceIdentity::new("Demo Svc"), ServiceIdentity::new("Demo Svc"));
    }
}
