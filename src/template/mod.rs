//! Line-oriented templates for the generated service artifacts.
//!
//! The syntax is deliberately small:
//!
//! - `{{?var}}` at the start of a line keeps the line only when `var` is truthy.
//! - `{{!var}}` at the start of a line keeps the line only when `var` is falsy.
//! - `{{var}}` anywhere in a line is replaced by the value of `var`.
//!
//! Guards chain (`{{?devices}}{{!full_devices}}DevicePolicy=closed`) and all of
//! them must pass. A line made of a single placeholder whose value is empty is
//! dropped entirely, so optional multi-line blocks leave no blank line behind.

use anyhow::{bail, Context as _, Result};
use std::collections::BTreeMap;

/// Unit file template. The managed key registry is derived from its `[Service]` section.
pub const SERVICE: &str = include_str!("../../templates/service.tmpl");
/// sysusers.d entry creating the service account.
pub const SYSUSERS: &str = include_str!("../../templates/sysusers.tmpl");
/// logrotate snippet for the service's log files.
pub const LOGROTATE: &str = include_str!("../../templates/logrotate.tmpl");
/// Installer script.
pub const SETUP: &str = include_str!("../../templates/setup.tmpl");
/// Removal script.
pub const UNINSTALL: &str = include_str!("../../templates/uninstall.tmpl");

/// A template variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Flag(bool),
    Text(String),
}

impl Value {
    fn is_truthy(&self) -> bool {
        match self {
            Value::Flag(b) => *b,
            Value::Text(s) => !s.is_empty(),
        }
    }

    fn render(&self) -> &str {
        match self {
            Value::Flag(true) => "yes",
            Value::Flag(false) => "no",
            Value::Text(s) => s,
        }
    }
}

/// Variables available to a template.
#[derive(Debug, Clone, Default)]
pub struct Context {
    vars: BTreeMap<&'static str, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flag(&mut self, name: &'static str, value: bool) -> &mut Self {
        self.vars.insert(name, Value::Flag(value));
        self
    }

    pub fn text(&mut self, name: &'static str, value: impl Into<String>) -> &mut Self {
        self.vars.insert(name, Value::Text(value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Result<&Value> {
        match self.vars.get(name) {
            Some(value) => Ok(value),
            None => bail!("unknown template variable '{}'", name),
        }
    }
}

/// A leading line guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Guard<'a> {
    pub name: &'a str,
    /// Truthiness the variable must have for the line to survive.
    pub expect: bool,
}

/// A piece of a line body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

/// Split the leading guards off a template line.
pub(crate) fn split_guards(line: &str) -> (Vec<Guard<'_>>, &str) {
    let mut guards = Vec::new();
    let mut rest = line;

    loop {
        let expect = if rest.starts_with("{{?") {
            true
        } else if rest.starts_with("{{!") {
            false
        } else {
            break;
        };
        let Some(end) = rest.find("}}") else {
            break;
        };
        guards.push(Guard {
            name: rest[3..end].trim(),
            expect,
        });
        rest = &rest[end + 2..];
    }

    (guards, rest)
}

/// Split a line body into literal text and placeholders.
pub(crate) fn segments(body: &str) -> Result<Vec<Segment<'_>>> {
    let mut out = Vec::new();
    let mut rest = body;

    while let Some(start) = rest.find("{{") {
        if start > 0 {
            out.push(Segment::Literal(&rest[..start]));
        }
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            bail!("unterminated placeholder in '{}'", body);
        };
        out.push(Segment::Placeholder(after[..end].trim()));
        rest = &after[end + 2..];
    }
    if !rest.is_empty() {
        out.push(Segment::Literal(rest));
    }

    Ok(out)
}

/// Render `source` against `ctx`.
pub fn render(source: &str, ctx: &Context) -> Result<String> {
    let mut out = String::with_capacity(source.len());

    for (idx, line) in source.lines().enumerate() {
        let rendered =
            render_line(line, ctx).with_context(|| format!("template line {}", idx + 1))?;
        if let Some(text) = rendered {
            out.push_str(&text);
            out.push('\n');
        }
    }

    Ok(out)
}

fn render_line(line: &str, ctx: &Context) -> Result<Option<String>> {
    let (guards, body) = split_guards(line);

    let mut keep = true;
    for guard in &guards {
        if ctx.get(guard.name)?.is_truthy() != guard.expect {
            keep = false;
        }
    }
    if !keep {
        return Ok(None);
    }

    let parts = segments(body)?;
    if let [Segment::Placeholder(name)] = parts.as_slice() {
        let value = ctx.get(name)?.render();
        if value.is_empty() {
            return Ok(None);
        }
        return Ok(Some(value.to_string()));
    }

    let mut text = String::with_capacity(body.len());
    for part in parts {
        match part {
            Segment::Literal(s) => text.push_str(s),
            Segment::Placeholder(name) => text.push_str(ctx.get(name)?.render()),
        }
    }
    Ok(Some(text))
}
