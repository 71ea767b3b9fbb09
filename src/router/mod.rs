//! # Router Module
//!
//! Route registration, the compiled routing table and request resolution.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Registering routes through [`RouteBuilder`] (verbs, groups, domains,
//!   controllers, resources and the fallback route)
//! - Freezing each route's scope fragments and merging them into an
//!   immutable [`RouteTable`]
//! - Resolving a [`RequestContext`](crate::request::RequestContext) to a
//!   [`Resolution`]: a route plus a [`Classification`]
//!
//! ## Architecture
//!
//! The router uses a two-phase approach:
//!
//! 1. **Registration**: templates are compiled into prefix patterns, table keys
//!    (`<domain>/` + compiled pattern) are checked for collisions per method,
//!    and configuration fragments are queued. `build()` merges them once.
//!
//! 2. **Resolution**: the request path is normalized, candidates allowing the
//!    request method are scanned in descending key order, and each one runs
//!    through the check pipeline. Path and domain mismatches move on; every
//!    other failed check ends the scan at the fallback route with a
//!    classification.
//!
//! ## Example
//!
//! ```rust
//! use switchyard::options::OptionFragment;
//! use switchyard::request::RequestContext;
//! use switchyard::router::{Classification, RouteBuilder};
//!
//! # fn main() -> Result<(), switchyard::RouteError> {
//! let mut builder = RouteBuilder::new();
//! builder
//!     .get("/pets/:id", "Pets::show")?
//!     .with_secure(true)
//!     .otherwise("Errors::fallback", OptionFragment::new());
//! let table = builder.build();
//!
//! let resolution = table.resolve(&RequestContext::get("/pets/12"));
//! assert_eq!(resolution.classification, Classification::Secure);
//! assert_eq!(resolution.route.handler_name(), Some("Errors::fallback"));
//!
//! let resolution = table.resolve(&RequestContext::get("/pets/12").secure(true));
//! assert!(resolution.is_match());
//! # Ok(())
//! # }
//! ```
//!
//! ## Ordering
//!
//! Sorting keys in descending order tends to put longer, more specific
//! patterns first. It is a heuristic: a literal route can still be shadowed by
//! a placeholder route whose key sorts higher.

mod builder;
mod core;
mod matcher;

pub use builder::{RouteBuilder, DEFAULT_METHODS, DEFAULT_RESOURCE_PARAM};
pub use core::{
    Classification, HandlerRef, Resolution, Route, RouteKind, RouteMatch, RouteTable,
};
