//! The per-build compilation scope.
//!
//! A [`StyleSession`] is created once per build and dropped when the build
//! ends. It owns the normalizer caches, the deduplication table of emitted
//! rules, and the runtime resolution table, so nothing leaks between builds
//! and separate builds can run side by side.
//!
//! # Thread Safety
//!
//! Sessions are `Send + Sync`. Modules can be compiled from many threads at
//! once; inserts take a short exclusive lock and reads share the lock.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use super::compiler::{CompiledStyle, RuleCompiler};
use super::declaration::StyleDeclaration;
use super::rule::{AtomicRule, RuleId};
use super::runtime::RuntimeTable;
use crate::state::Breakpoints;
use crate::target::{Mode, Platform};
use crate::value::{selector_class, Normalizer, StyleValue};

/// Compilation scope for one build.
#[derive(Debug)]
pub struct StyleSession {
    normalizer: Normalizer,
    breakpoints: Breakpoints,
    rules: RwLock<BTreeMap<RuleId, Arc<AtomicRule>>>,
    runtime: RwLock<RuntimeTable>,
}

impl StyleSession {
    /// Creates a session with the default breakpoint table.
    pub fn new(platform: Platform, mode: Mode) -> Self {
        Self::with_breakpoints(platform, mode, Breakpoints::default())
    }

    pub fn with_breakpoints(platform: Platform, mode: Mode, breakpoints: Breakpoints) -> Self {
        Self {
            normalizer: Normalizer::new(platform, mode),
            breakpoints,
            rules: RwLock::new(BTreeMap::new()),
            runtime: RwLock::new(RuntimeTable::new()),
        }
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn breakpoints(&self) -> &Breakpoints {
        &self.breakpoints
    }

    pub fn platform(&self) -> Platform {
        self.normalizer.platform()
    }

    pub fn mode(&self) -> Mode {
        self.normalizer.mode()
    }

    pub fn compiler(&self) -> RuleCompiler<'_> {
        RuleCompiler::new(&self.normalizer, &self.breakpoints)
    }

    /// Compiles a declaration for static extraction.
    ///
    /// Rules already emitted by another component are reused, so identical
    /// styles anywhere in the build share one rule. New rules are recorded
    /// for reverse mapping.
    pub fn compile(&self, declaration: &StyleDeclaration) -> CompiledStyle {
        let rules = self.compiler().compile(declaration);
        let mut table = write(&self.rules);

        let shared = rules
            .into_iter()
            .map(|rule| match table.entry(rule.identifier.clone()) {
                Entry::Occupied(existing) => {
                    let existing = existing.get();
                    if !existing.same_content(&rule) {
                        warn!(
                            identifier = %rule.identifier,
                            kept = %existing.declaration_text(),
                            dropped = %rule.declaration_text(),
                            "rule identifier collision, keeping the first rule"
                        );
                    }
                    Arc::clone(existing)
                }
                Entry::Vacant(slot) => {
                    self.normalizer
                        .record_rule(rule.identifier.as_str(), &rule.declaration_text());
                    debug!(identifier = %rule.identifier, property = %rule.property, "new atomic rule");
                    Arc::clone(slot.insert(Arc::new(rule)))
                }
            })
            .collect();

        CompiledStyle::new(shared)
    }

    /// Compiles a declaration for runtime resolution.
    ///
    /// The rules go into the runtime table only; they are neither emitted
    /// nor recorded for reverse mapping.
    pub fn compile_deferred(&self, declaration: &StyleDeclaration) -> CompiledStyle {
        let rules = self.compiler().compile(declaration);
        let mut runtime = write(&self.runtime);
        for rule in &rules {
            runtime.insert(rule);
        }
        CompiledStyle::new(rules.into_iter().map(Arc::new).collect())
    }

    /// All extracted rules in emission order.
    pub fn stylesheet_rules(&self) -> Vec<Arc<AtomicRule>> {
        let mut rules: Vec<Arc<AtomicRule>> = read(&self.rules).values().cloned().collect();
        rules.sort_by(|a, b| a.emission_cmp(b));
        rules
    }

    /// Looks up an extracted rule by identifier or selector.
    pub fn rule(&self, identifier: &str) -> Option<Arc<AtomicRule>> {
        read(&self.rules).get(selector_class(identifier)).cloned()
    }

    pub fn rule_count(&self) -> usize {
        read(&self.rules).len()
    }

    /// A snapshot of the runtime resolution table.
    pub fn runtime_table(&self) -> RuntimeTable {
        read(&self.runtime).clone()
    }

    /// Recovers the value behind an emitted rule; see
    /// [`Normalizer::reverse_resolve`].
    pub fn reverse_resolve(&self, property: &str, identifier: &str) -> Option<StyleValue> {
        self.normalizer.reverse_resolve(property, identifier)
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
