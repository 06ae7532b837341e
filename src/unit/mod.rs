//! Directive reconciliation for generated unit files.
//!
//! Regenerating a unit must be idempotent: directives the generator owns are
//! recomputed from the feature flags, and anything a user added or changed by
//! hand survives as a custom directive.
//!
//! The pipeline runs leaf-first:
//! - `target` - identity, root path and flags of a run
//! - `registry` - which `[Service]` keys and values the generator emits
//! - `baseline` - resource-limit defaults and ordering seeds from the flags
//! - `parser` - classify a previously generated file into managed vs. custom
//! - `reconcile` - merge the two
//! - `format` - stable text blocks for template injection

pub mod baseline;
pub mod format;
pub mod parser;
pub mod reconcile;
pub mod registry;
pub mod target;

pub use baseline::Baseline;
pub use parser::Preserved;
pub use reconcile::{Reconciled, Reconciler};
pub use registry::{ManagedKeys, ManagedValues};
pub use target::UnitTarget;

use std::collections::BTreeMap;

/// Directives the generator fully owns, one value per key.
pub type DirectiveMap = BTreeMap<String, String>;

/// Directives preserved verbatim. Keys may repeat, so each key keeps its
/// values in the order they were recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomDirectives {
    entries: BTreeMap<String, Vec<String>>,
}

impl CustomDirectives {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record another value for `key`.
    pub fn push(&mut self, key: &str, value: &str) {
        self.entries
            .entry(key.to_string())
            .or_default()
            .push(value.to_string());
    }

    /// Set `key` to `values` unless the key already has custom values.
    ///
    /// Returns true if the values were inserted.
    pub fn seed(&mut self, key: &str, values: &[&str]) -> bool {
        if self.entries.contains_key(key) {
            return false;
        }
        self.entries.insert(
            key.to_string(),
            values.iter().map(|v| v.to_string()).collect(),
        );
        true
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in lexicographic order, each with its values in recorded order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// Startup ordering constraints (`After=` / `Requires=`).
///
/// Both lists keep insertion order and never hold the same unit twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderingSet {
    after: Vec<String>,
    requires: Vec<String>,
}

impl OrderingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_after(&mut self, unit: &str) {
        push_unique(&mut self.after, unit);
    }

    pub fn add_requires(&mut self, unit: &str) {
        push_unique(&mut self.requires, unit);
    }

    /// Append every whitespace-separated token of `line` to `After`.
    pub fn extend_after(&mut self, line: &str) {
        for unit in line.split_whitespace() {
            self.add_after(unit);
        }
    }

    /// Append every whitespace-separated token of `line` to `Requires`.
    pub fn extend_requires(&mut self, line: &str) {
        for unit in line.split_whitespace() {
            self.add_requires(unit);
        }
    }

    /// Append the units of `other` that are not already present.
    ///
    /// Entries already in `self` keep their position, so a freshly required
    /// unit is never displaced by a preserved one.
    pub fn merge(&mut self, other: &OrderingSet) {
        for unit in &other.after {
            self.add_after(unit);
        }
        for unit in &other.requires {
            self.add_requires(unit);
        }
    }

    pub fn after(&self) -> &[String] {
        &self.after
    }

    pub fn requires(&self) -> &[String] {
        &self.requires
    }

    /// `After=` value, space separated.
    pub fn after_line(&self) -> String {
        self.after.join(" ")
    }

    /// `Requires=` value, space separated.
    pub fn requires_line(&self) -> String {
        self.requires.join(" ")
    }
}

fn push_unique(list: &mut Vec<String>, unit: &str) {
    if !unit.is_empty() && !list.iter().any(|u| u == unit) {
        list.push(unit.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_first_occurrence_wins() {
        let mut ordering = OrderingSet::new();
        ordering.extend_after("a.target b.target a.target");
        ordering.add_after("b.target");
        ordering.add_after("c.target");
        assert_eq!(ordering.after_line(), "a.target b.target c.target");
    }

    #[test]
    fn test_ordering_merge_keeps_existing_first() {
        let mut seed = OrderingSet::new();
        seed.add_after("network-online.target");
        seed.add_requires("network-online.target");

        let mut preserved = OrderingSet::new();
        preserved.extend_after("foo.target network-online.target");
        preserved.extend_requires("network-online.target");

        seed.merge(&preserved);
        assert_eq!(seed.after_line(), "network-online.target foo.target");
        assert_eq!(seed.requires_line(), "network-online.target");
    }

    #[test]
    fn test_custom_seed_does_not_overwrite() {
        let mut custom = CustomDirectives::new();
        custom.push("DeviceAllow", "char-usb rw");
        assert!(!custom.seed("DeviceAllow", &["char-tty rwm"]));
        assert_eq!(custom.get("DeviceAllow").unwrap(), ["char-usb rw"]);

        assert!(custom.seed("SupplementaryGroups", &["dialout", "plugdev"]));
        assert_eq!(custom.get("SupplementaryGroups").unwrap().len(), 2);
    }
}
