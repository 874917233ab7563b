//! Pseudo-state and responsive variant metadata.
//!
//! - [`StateDescriptor`]: The fixed registry of interaction states
//! - [`Breakpoint`] / [`Breakpoints`]: Named media ranges and their ranking

mod breakpoint;
mod descriptor;

pub use breakpoint::{Breakpoint, Breakpoints};
pub use descriptor::{all_descriptors, exclusive_winners, resolve_state, StateDescriptor};
