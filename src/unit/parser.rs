//! Classify the directives of a previously generated unit file.
//!
//! Only the shape this tool writes is understood: `[Unit]` carries the
//! ordering keys and `[Service]` carries directives. Everything else
//! (other sections, blank lines, comments, lines without `=`) is skipped
//! so hand-edited or truncated files never abort a regeneration.

use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use super::{CustomDirectives, DirectiveMap, ManagedValues, OrderingSet};

/// What a previous unit file contributes to the next one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preserved {
    /// `After=` / `Requires=` tokens in file order, repeated keys concatenated.
    pub ordering: OrderingSet,
    pub custom: CustomDirectives,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Ordering,
    Directives,
    Other,
}

impl Section {
    fn from_header(header: &str) -> Self {
        match header {
            "[Unit]" => Section::Ordering,
            "[Service]" => Section::Directives,
            _ => Section::Other,
        }
    }
}

/// Read a prior unit file.
///
/// A missing file is `Ok(None)`: the first run has nothing to preserve.
/// Any other read failure is returned to the caller.
pub fn read_existing(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
    }
}

/// Split `content` into ordering entries and custom directives.
///
/// A `[Service]` directive is dropped when it is exactly what the generator
/// would write: the baseline value for its key, or one of the concrete
/// values in `managed`. Anything else is kept as custom, and a key that had
/// a baseline default loses it so the stale default is not emitted next to
/// the user's value.
pub fn classify(content: &str, managed: &ManagedValues, defaults: &mut DirectiveMap) -> Preserved {
    let mut preserved = Preserved::default();
    let mut section = Section::None;

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();

        if line.starts_with('[') && line.ends_with(']') {
            section = Section::from_header(line);
            continue;
        }
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            debug!("skipping line {} without '=': {}", idx + 1, line);
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        match section {
            Section::Ordering => match key {
                "After" => preserved.ordering.extend_after(value),
                "Requires" => preserved.ordering.extend_requires(value),
                _ => {}
            },
            Section::Directives => {
                let is_default = defaults.get(key).is_some_and(|d| d == value);
                if is_default || managed.owns(key, value) {
                    continue;
                }
                preserved.custom.push(key, value);
                defaults.remove(key);
            }
            Section::None | Section::Other => {
                debug!("skipping line {} outside known sections: {}", idx + 1, line);
            }
        }
    }

    preserved
}
