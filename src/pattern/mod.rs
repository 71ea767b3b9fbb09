//! # Pattern Module
//!
//! Path templates, their compiled patterns and the parameters bound from a
//! request path.
//!
//! ## Template syntax
//!
//! Templates are `/`-delimited:
//!
//! - `/:name` is a **mandatory placeholder** and compiles to `/[\w]+`
//! - `(/:name)` is an **optional placeholder** and compiles to `(/[\w]+)?`
//! - anything else is inserted into the pattern verbatim (no escaping)
//!
//! ```text
//! /api/:user/auth/:key(/:opt)   ->   /api/[\w]+/auth/[\w]+(/[\w]+)?
//! ```
//!
//! Parameter *positions* are taken from the uncompiled template, so binding a
//! request is a matter of splitting its path on `/` and reading the recorded
//! segment indexes.
//!
//! ## Example
//!
//! ```
//! use switchyard::pattern::{bind_params, CompiledPattern};
//!
//! let pattern = CompiledPattern::new("/api/:user(/:page)").unwrap();
//! let prefix = pattern.match_prefix("/api/john").unwrap();
//! let params = bind_params(pattern.placeholders(), None, "/api/john", prefix);
//!
//! assert_eq!(params.get("user"), Some("john"));
//! assert!(params.value("page").unwrap().is_absent());
//! ```

mod core;

pub use core::{
    bind_params, compile_template, extract_placeholders, normalize, CompiledPattern, ParamValue,
    Params, Placeholders, MAX_INLINE_PARAMS,
};
pub(crate) use core::word_chars;
