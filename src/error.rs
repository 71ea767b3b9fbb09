//! Registration-time errors.
//!
//! Everything in here is fatal: it is raised synchronously by the builder call
//! (or loader) that caused it. Resolution never produces a [`RouteError`]; a
//! failed resolution is reported through
//! [`Classification`](crate::router::Classification) instead.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal route-table configuration error
#[derive(Debug, Error)]
pub enum RouteError {
    /// Two routes produce the same table key and share at least one method
    #[error("route {key} already exists")]
    DuplicateRoute {
        /// Domain prefix plus compiled pattern of the colliding route
        key: String,
    },

    /// A compiled template or domain filter is not a valid regular expression
    ///
    /// Template literals are inserted into the pattern verbatim, so a template
    /// containing unbalanced metacharacters ends up here.
    #[error("path template {template:?} does not compile: {source}")]
    InvalidPattern {
        /// The offending template (or domain filter)
        template: String,
        /// Underlying regex error
        #[source]
        source: regex::Error,
    },

    /// A `where` constraint regex does not compile
    #[error("constraint for parameter {param:?} does not compile: {source}")]
    InvalidConstraint {
        /// Parameter the constraint was attached to
        param: String,
        /// Underlying regex error
        #[source]
        source: regex::Error,
    },

    /// A method name is not a valid HTTP method token
    #[error("invalid HTTP method {method:?}")]
    InvalidMethod {
        /// Method name as given
        method: String,
    },

    /// An `op:item` list entry with an unknown operation
    #[error("invalid list entry {entry:?}: expected add:<item>, del:<item> or clear:*")]
    InvalidListEntry {
        /// The entry as given
        entry: String,
    },

    /// A route-level modifier was called before any route was bound
    #[error("{operation} requires a bound route")]
    NoRouteBound {
        /// Name of the builder operation
        operation: &'static str,
    },

    /// Malformed declarative route document
    #[error("error while parsing {file}:{line}:{column} with message: {message}")]
    Parse {
        /// Source document
        file: String,
        /// 1-based line
        line: u32,
        /// 1-based column
        column: u32,
        /// Parser message
        message: String,
    },

    /// Route document could not be read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path that was being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl RouteError {
    /// Build a [`RouteError::Parse`] for `file` at the given position
    pub(crate) fn parse(file: &str, line: u32, column: u32, message: impl Into<String>) -> Self {
        RouteError::Parse {
            file: file.to_string(),
            line,
            column,
            message: message.into(),
        }
    }
}

/// Convenience alias for registration results
pub type Result<T, E = RouteError> = std::result::Result<T, E>;
