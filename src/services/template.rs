// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Page templates used by the report builder.
//!
//! Rendering is an injected strategy: the report builder hands a flat map of
//! named string values and a [`TemplateId`] to a [`Renderer`]. Any
//! `Fn(&View, TemplateId) -> Result<String>` closure is a renderer, and
//! [`PlaceholderRenderer`] is a bundled one that fills `{{name}}` slots.

use crate::error::Result;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;

/// Named values handed to a template.
pub type View = BTreeMap<String, String>;

/// Which page or fragment is being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateId {
    /// Summary page (distance mode)
    Index,
    /// Summary page (score mode)
    Scoreboard,
    /// One club's roster and totals
    Club,
    /// One athlete's activity log
    Person,
    /// Leaders for one sport
    Leaders,
    /// Top activities for one sport
    Activities,
}

impl TemplateId {
    pub const ALL: [TemplateId; 6] = [
        TemplateId::Index,
        TemplateId::Scoreboard,
        TemplateId::Club,
        TemplateId::Person,
        TemplateId::Leaders,
        TemplateId::Activities,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TemplateId::Index => "index",
            TemplateId::Scoreboard => "scoreboard",
            TemplateId::Club => "club",
            TemplateId::Person => "person",
            TemplateId::Leaders => "leaders",
            TemplateId::Activities => "activities",
        }
    }

    /// Fragments embedded inside a full page rather than written on their own.
    pub fn is_fragment(self) -> bool {
        matches!(
            self,
            TemplateId::Club | TemplateId::Leaders | TemplateId::Activities
        )
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Produces the final string for a view.
pub trait Renderer {
    fn render(&self, view: &View, template: TemplateId) -> Result<String>;
}

impl<F> Renderer for F
where
    F: Fn(&View, TemplateId) -> Result<String>,
{
    fn render(&self, view: &View, template: TemplateId) -> Result<String> {
        self(view, template)
    }
}

/// Replace every `{{key}}` in `template` with its value from `view`.
///
/// The template is scanned once, left to right, and substituted values are
/// never scanned again. Unknown placeholders are left as they are.
pub fn fill_placeholders(template: &str, view: &View) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            out.push_str(&rest[open..]);
            return out;
        };
        let token = &rest[open..open + close + 4];
        match view.get(&after[..close]) {
            Some(value) => out.push_str(value),
            None => out.push_str(token),
        }
        rest = &rest[open + token.len()..];
    }
    out.push_str(rest);
    out
}

/// Renderer that loads `<dir>/<template>.html` and fills `{{key}}` placeholders.
///
/// Fragments (club, leaders, activities) are just their `content` value.
#[derive(Debug, Clone)]
pub struct PlaceholderRenderer {
    dir: PathBuf,
}

impl PlaceholderRenderer {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn template_path(&self, template: TemplateId) -> PathBuf {
        self.dir.join(format!("{}.html", template))
    }
}

impl Renderer for PlaceholderRenderer {
    fn render(&self, view: &View, template: TemplateId) -> Result<String> {
        let source = if template.is_fragment() {
            "{{content}}".to_string()
        } else {
            let path = self.template_path(template);
            tracing::debug!(template = %template, file = %path.display(), "Loading template");
            fs::read_to_string(path)?
        };
        Ok(fill_placeholders(&source, view))
    }
}
