//! Responsive breakpoints.
//!
//! A breakpoint is a named width range. When several breakpoints match the
//! same viewport, the narrower one has to win, so rules are emitted from the
//! widest range to the narrowest.

use std::cmp::{Ordering, Reverse};

use serde::{Deserialize, Serialize};

/// A named responsive range, emitted as an `@media` query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakpoint {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<u32>,
}

impl Breakpoint {
    /// A `max-width` breakpoint (applies at and below `px`).
    pub fn max(name: impl Into<String>, px: u32) -> Self {
        Self {
            name: name.into(),
            min_width: None,
            max_width: Some(px),
        }
    }

    /// A `min-width` breakpoint (applies at and above `px`).
    pub fn min(name: impl Into<String>, px: u32) -> Self {
        Self {
            name: name.into(),
            min_width: Some(px),
            max_width: None,
        }
    }

    /// The media query text, e.g. `(min-width:661px) and (max-width:800px)`.
    pub fn media_query(&self) -> String {
        match (self.min_width, self.max_width) {
            (Some(min), Some(max)) => format!("(min-width:{}px) and (max-width:{}px)", min, max),
            (Some(min), None) => format!("(min-width:{}px)", min),
            (None, Some(max)) => format!("(max-width:{}px)", max),
            (None, None) => "all".to_string(),
        }
    }

    /// Width of the viewport range this breakpoint applies to.
    pub fn span(&self) -> u64 {
        let min = u64::from(self.min_width.unwrap_or(0));
        let max = self.max_width.map_or(u64::from(u32::MAX), u64::from);
        max.saturating_sub(min)
    }

    /// Emission order between two breakpoints: wider first, narrower last.
    pub fn specificity_cmp(&self, other: &Breakpoint) -> Ordering {
        Reverse(self.span())
            .cmp(&Reverse(other.span()))
            .then_with(|| self.name.cmp(&other.name))
    }
}

/// The breakpoint table for a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Breakpoints {
    entries: Vec<Breakpoint>,
}

impl Breakpoints {
    pub fn new(entries: Vec<Breakpoint>) -> Self {
        Self { entries }
    }

    /// Looks up a breakpoint by name; a leading `$` is ignored.
    pub fn get(&self, name: &str) -> Option<&Breakpoint> {
        let name = name.trim_start_matches('$');
        self.entries.iter().find(|b| b.name == name)
    }

    /// Breakpoints in emission order.
    pub fn ranked(&self) -> Vec<&Breakpoint> {
        let mut ranked: Vec<&Breakpoint> = self.entries.iter().collect();
        ranked.sort_by(|a, b| a.specificity_cmp(b));
        ranked
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self::new(vec![
            Breakpoint::max("xs", 660),
            Breakpoint::max("sm", 800),
            Breakpoint::max("md", 1020),
            Breakpoint::max("lg", 1280),
            Breakpoint::max("xl", 1420),
            Breakpoint::max("xxl", 1600),
            Breakpoint::min("gtXs", 661),
            Breakpoint::min("gtSm", 801),
            Breakpoint::min("gtMd", 1021),
            Breakpoint::min("gtLg", 1281),
        ])
    }
}
