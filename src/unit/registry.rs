//! Registry of directive keys the generator owns.
//!
//! Built once per run from the service template: every `Key=value` line inside
//! the `[Service]` section is a managed key. The registry keeps those template
//! lines so that, given the variables of a run, it can say exactly which
//! values the generator writes for each key.

use anyhow::{Context as _, Result};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

use super::target::UnitTarget;
use crate::template::{self, Context};

const SECTION_START: &str = "[Service]";
const SECTION_END: &str = "[Install]";

/// Immutable set of managed keys with the template lines that emit each one.
#[derive(Debug, Clone, Default)]
pub struct ManagedKeys {
    lines: BTreeMap<String, Vec<String>>,
}

impl ManagedKeys {
    /// Registry for the built-in service template.
    pub fn service() -> Result<Self> {
        Self::from_template(template::SERVICE)
    }

    /// Scan `text` for directive keys.
    ///
    /// A missing `[Service]` marker scans from the start; a missing `[Install]`
    /// marker scans to the end. Finding no keys is not an error.
    pub fn from_template(text: &str) -> Result<Self> {
        let start = text.find(SECTION_START).unwrap_or(0);
        let end = text[start..]
            .find(SECTION_END)
            .map(|i| start + i)
            .unwrap_or(text.len());

        let key_re = Regex::new(r"(?m)(?:^|\})(\w+)=(.*)$")?;

        let mut lines: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for line in text[start..end].lines() {
            if let Some(caps) = key_re.captures(line) {
                lines
                    .entry(caps[1].to_string())
                    .or_default()
                    .push(line.trim().to_string());
            }
        }

        Ok(Self { lines })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lines.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Managed keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        self.lines.keys().map(String::as_str).collect()
    }

    /// The values the template emits for `target`.
    pub fn resolve(&self, target: &UnitTarget) -> Result<ManagedValues> {
        self.resolve_with(&target.context())
    }

    /// Render every managed line against `ctx` and keep the ones that survive
    /// their guards.
    pub fn resolve_with(&self, ctx: &Context) -> Result<ManagedValues> {
        let mut values = ManagedValues::default();
        for (key, lines) in &self.lines {
            for line in lines {
                let rendered = template::render(line, ctx)
                    .with_context(|| format!("resolving managed value for {}", key))?;
                if let Some((_, value)) = rendered.trim_end().split_once('=') {
                    values.insert(key, value.trim());
                }
            }
        }
        Ok(values)
    }
}

/// Concrete `key=value` pairs the generator writes.
///
/// A directive on disk that matches one of these exactly is generator output
/// and is recomputed; anything else belongs to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManagedValues {
    values: BTreeMap<String, BTreeSet<String>>,
}

impl ManagedValues {
    pub fn insert(&mut self, key: &str, value: &str) {
        self.values
            .entry(key.to_string())
            .or_default()
            .insert(value.to_string());
    }

    /// True if the generator writes exactly `key=value`.
    pub fn owns(&self, key: &str, value: &str) -> bool {
        self.values.get(key).is_some_and(|values| values.contains(value))
    }

    /// Add every pair of `other`.
    pub fn extend(&mut self, other: ManagedValues) {
        for (key, values) in other.values {
            self.values.entry(key).or_default().extend(values);
        }
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
