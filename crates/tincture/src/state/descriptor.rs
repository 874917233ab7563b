//! The state descriptor registry.
//!
//! A closed table built into the binary: it never changes at runtime and is
//! safe to read from any thread.
//!
//! | Style key | Name | Priority | State key | Selector |
//! |-----------|------|----------|-----------|----------|
//! | `hoverStyle` | hover | 1 | - | `:hover` |
//! | `pressStyle` | press | 2 | `press` | `:active` |
//! | `focusStyle` | focus | 3 | - | `:focus` |
//! | `enterStyle` | enter | 4 | `presence` | `[data-presence="enter"]` |
//! | `exitStyle` | exit | 5 | `presence` | `[data-presence="exit"]` |
//!
//! Descriptors sharing a state key are mutually exclusive: an element is
//! never entering and exiting at the same time, so only the higher priority
//! one contributes a rule for a given property.

use std::cmp::Ordering;
use std::collections::HashMap;

/// Ordering metadata for one interaction state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateDescriptor {
    /// Key used in style objects, e.g. `hoverStyle`.
    pub key: &'static str,
    /// Short name, e.g. `hover`.
    pub name: &'static str,
    /// Higher priority is emitted later and wins on equal specificity.
    pub priority: u8,
    /// Mutual exclusion group.
    pub state_key: Option<&'static str>,
    /// Selector suffix appended to the rule's class.
    pub selector: &'static str,
}

impl StateDescriptor {
    /// Returns `true` if `self` and `other` can never be active together.
    pub fn excludes(&self, other: &StateDescriptor) -> bool {
        self != other && self.state_key.is_some() && self.state_key == other.state_key
    }
}

impl PartialOrd for StateDescriptor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StateDescriptor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| self.state_key.cmp(&other.state_key))
            .then_with(|| self.name.cmp(other.name))
    }
}

static DESCRIPTORS: [StateDescriptor; 5] = [
    StateDescriptor {
        key: "hoverStyle",
        name: "hover",
        priority: 1,
        state_key: None,
        selector: ":hover",
    },
    StateDescriptor {
        key: "pressStyle",
        name: "press",
        priority: 2,
        state_key: Some("press"),
        selector: ":active",
    },
    StateDescriptor {
        key: "focusStyle",
        name: "focus",
        priority: 3,
        state_key: None,
        selector: ":focus",
    },
    StateDescriptor {
        key: "enterStyle",
        name: "enter",
        priority: 4,
        state_key: Some("presence"),
        selector: "[data-presence=\"enter\"]",
    },
    StateDescriptor {
        key: "exitStyle",
        name: "exit",
        priority: 5,
        state_key: Some("presence"),
        selector: "[data-presence=\"exit\"]",
    },
];

/// All descriptors in ascending priority order.
pub fn all_descriptors() -> &'static [StateDescriptor] {
    &DESCRIPTORS
}

/// Looks up a descriptor by style key (`hoverStyle`) or short name (`hover`).
pub fn resolve_state(name: &str) -> Option<&'static StateDescriptor> {
    DESCRIPTORS.iter().find(|d| d.key == name || d.name == name)
}

/// Applies mutual exclusion to a set of simultaneously active states.
///
/// Within each state-key group only the highest priority descriptor
/// survives; ungrouped descriptors are all kept. The result is sorted in
/// ascending priority, which is the emission order.
pub fn exclusive_winners(
    active: impl IntoIterator<Item = &'static StateDescriptor>,
) -> Vec<&'static StateDescriptor> {
    let mut grouped: HashMap<&'static str, &'static StateDescriptor> = HashMap::new();
    let mut winners = Vec::new();

    for descriptor in active {
        match descriptor.state_key {
            Some(group) => {
                let slot = grouped.entry(group).or_insert(descriptor);
                if descriptor.priority > slot.priority {
                    *slot = descriptor;
                }
            }
            None => winners.push(descriptor),
        }
    }

    winners.extend(grouped.into_values());
    winners.sort();
    winners.dedup();
    winners
}
