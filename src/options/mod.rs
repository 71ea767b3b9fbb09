//! # Options Module
//!
//! Layered route configuration. Each nesting level (globals, domain, group,
//! route) contributes an [`OptionFragment`]; a route's effective
//! configuration is the ordered fold of the fragments that were active when it
//! was bound, see [`merge_fragments`].
//!
//! ## Merge rules
//!
//! | key | rule |
//! |---|---|
//! | `secure`, `constraints` | overwrite |
//! | `methods`, `middleware` | list algebra: literals replace, `add:`/`del:`/`clear:*` edit |
//! | `auth` | append |
//!
//! ```
//! use switchyard::options::{merge_fragments, OptionFragment};
//!
//! let global = OptionFragment::new().middleware(["A"]).unwrap();
//! let route = OptionFragment::new().middleware(["add:B", "add:C"]).unwrap();
//!
//! let merged = merge_fragments([&global, &route]);
//! assert_eq!(merged.middleware, ["A", "B", "C"]);
//! ```

mod fragment;
mod merge;

pub use fragment::{AuthPredicate, AuthRequest, Constraint, ListEntry, OptionFragment, OP_SEPARATOR};
pub use merge::{apply_list, merge_fragments, EffectiveOptions};
