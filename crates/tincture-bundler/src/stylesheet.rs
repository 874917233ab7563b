//! Stylesheet assembly.
//!
//! Rules from every module of a build are gathered into one ordered list of
//! blocks. Order carries precedence between rules of equal specificity, so
//! every transformation here keeps the relative order of blocks intact.

use std::collections::HashSet;
use std::fmt::Write as _;

use serde::Serialize;
use tincture::AtomicRule;

/// One CSS rule: a selector list and its declaration block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleBlock {
    pub media: Option<String>,
    pub selectors: Vec<String>,
    pub declaration: String,
}

impl StyleBlock {
    pub fn from_rule(rule: &AtomicRule) -> Self {
        Self {
            media: rule.media_query(),
            selectors: vec![rule.selector()],
            declaration: rule.declaration_text(),
        }
    }

    fn write_rule(&self, out: &mut String, pretty: bool) {
        if pretty {
            let _ = write!(out, "{} {{ {} }}", self.selectors.join(", "), self.declaration);
        } else {
            let declaration = self.declaration.trim_end_matches(';');
            let _ = write!(out, "{}{{{}}}", self.selectors.join(","), declaration);
        }
    }
}

/// An ordered list of style blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Stylesheet {
    blocks: Vec<StyleBlock>,
}

impl Stylesheet {
    /// Builds a stylesheet from rules, deduplicated by identifier and
    /// sorted into emission order.
    pub fn assemble<'a, I>(rules: I) -> Self
    where
        I: IntoIterator<Item = &'a AtomicRule>,
    {
        let mut seen = HashSet::new();
        let mut unique: Vec<&AtomicRule> = rules
            .into_iter()
            .filter(|rule| seen.insert(rule.identifier.clone()))
            .collect();
        unique.sort_by(|a, b| a.emission_cmp(b));

        Self {
            blocks: unique.into_iter().map(StyleBlock::from_rule).collect(),
        }
    }

    pub fn from_blocks(blocks: Vec<StyleBlock>) -> Self {
        Self { blocks }
    }

    /// The production pass.
    ///
    /// Drops repeated blocks (keeping the first), then merges neighbouring
    /// blocks that share a media context and a declaration into one
    /// selector list.
    pub fn minify(self) -> Self {
        let mut seen = HashSet::new();
        let mut blocks: Vec<StyleBlock> = Vec::with_capacity(self.blocks.len());

        for block in self.blocks {
            let key = (block.media.clone(), block.selectors.clone(), block.declaration.clone());
            if !seen.insert(key) {
                continue;
            }
            match blocks.last_mut() {
                Some(last) if last.media == block.media && last.declaration == block.declaration => {
                    for selector in block.selectors {
                        if !last.selectors.contains(&selector) {
                            last.selectors.push(selector);
                        }
                    }
                }
                _ => blocks.push(block),
            }
        }
        Self { blocks }
    }

    pub fn blocks(&self) -> &[StyleBlock] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Renders CSS. Consecutive blocks with the same media query share
    /// one `@media` group.
    ///
    /// `pretty` writes one rule per line for development builds; otherwise
    /// all optional whitespace is dropped.
    pub fn to_css(&self, pretty: bool) -> String {
        let mut out = String::new();
        let mut index = 0;
        while index < self.blocks.len() {
            let media = &self.blocks[index].media;
            let end = self.blocks[index..]
                .iter()
                .position(|b| &b.media != media)
                .map_or(self.blocks.len(), |offset| index + offset);
            let group = &self.blocks[index..end];

            match (media, pretty) {
                (None, _) => {
                    for block in group {
                        block.write_rule(&mut out, pretty);
                        if pretty {
                            out.push('\n');
                        }
                    }
                }
                (Some(query), true) => {
                    let _ = writeln!(out, "@media {} {{", query);
                    for block in group {
                        out.push_str("  ");
                        block.write_rule(&mut out, true);
                        out.push('\n');
                    }
                    out.push_str("}\n");
                }
                (Some(query), false) => {
                    let _ = write!(out, "@media {}{{", query);
                    for block in group {
                        block.write_rule(&mut out, false);
                    }
                    out.push('}');
                }
            }
            index = end;
        }
        out
    }

    /// Renders an HTML `<style>` tag for inlined output.
    pub fn to_style_tag(&self, pretty: bool) -> String {
        format!("<style data-tincture>{}</style>", self.to_css(pretty))
    }
}
