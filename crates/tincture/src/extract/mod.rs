//! Static extraction decisions.
//!
//! Decides, per source module and declaration, whether styles are compiled
//! into the build-time stylesheet or deferred to the runtime resolver.
//!
//! # Precedence
//!
//! 1. The host override ([`ExtractionPolicy`]) wins when it answers. It is
//!    trusted as is; staticness is not re-checked.
//! 2. Modules inside a configured component package are always eligible.
//! 3. Otherwise the default exclusion applies: `node_modules` and files
//!    that are not scripts are excluded.
//! 4. Eligible declarations are extracted only if every value is static.

mod decider;
mod policy;
mod roots;

pub use decider::{Decision, DeferReason, ExtractionDecider};
pub use policy::{is_excluded_by_default, ExtractionPolicy, NoOverride, SCRIPT_EXTENSIONS};
pub use roots::ComponentRoots;
