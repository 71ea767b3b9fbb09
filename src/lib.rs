//! # switchyard
//!
//! **switchyard** is the dispatch core of a request-routing layer: it compiles
//! path templates, merges layered route options and resolves each request to a
//! handler reference, or to a fallback route together with the reason nothing
//! matched.
//!
//! ## Overview
//!
//! switchyard decides *which* handler runs with *which* parameters and
//! configuration. It never receives raw HTTP traffic and never calls a
//! handler; the transport layer hands it a [`RequestContext`] and acts on the
//! returned [`Resolution`].
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - **[`pattern`]** - Path templates, compiled prefix patterns and parameter binding
//! - **[`options`]** - Option fragments and the merge algebra (secure, constraints,
//!   methods, middleware, authorization)
//! - **[`router`]** - [`RouteBuilder`], the immutable [`RouteTable`] and the resolution pipeline
//! - **[`registry`]** - Controller actions declared at startup
//! - **[`request`]** - The request descriptor and URI normalization
//! - **[`loader`]** - XML route documents translated into builder calls
//! - **[`config`]** / **[`logging`]** - YAML and environment configuration, tracing setup
//! - **[`cli`]** - The `switchyard` binary (`inspect`, `resolve`)
//!
//! ### Resolution Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Transport
//!     participant Table as RouteTable
//!     participant Matcher
//!
//!     Transport->>Table: resolve(RequestContext)
//!     Table->>Table: strip query, percent-decode,<br/>drop trailing slash
//!     loop candidates allowing the method, descending key order
//!         Table->>Matcher: evaluate(route)
//!         alt path or domain mismatch
//!             Matcher-->>Table: skip
//!         else secure / controller / rest / where / auth check fails
//!             Matcher-->>Table: fail(classification)
//!             Table-->>Transport: fallback route + classification
//!         else all checks pass
//!             Matcher-->>Table: pass(handler, params)
//!             Table-->>Transport: route + Classification::None
//!         end
//!     end
//!     Table-->>Transport: fallback route + NotFound
//! ```
//!
//! ### Key Architectural Patterns
//!
//! 1. **Build once, resolve many**: registration produces an immutable table; resolving
//!    is a pure function of the table and the request, so the table can be shared
//!    across threads behind an `Arc`.
//! 2. **Frozen scopes**: a route keeps the fragments of the scopes it was bound in;
//!    later `globals` or scope changes never reach back into it.
//! 3. **Failures are values**: configuration mistakes surface as [`RouteError`] at
//!    registration; a request that cannot be served yields a [`Classification`].
//!
//! ## Quick Start
//!
//! ```rust
//! use switchyard::options::OptionFragment;
//! use switchyard::request::RequestContext;
//! use switchyard::router::{Classification, RouteBuilder};
//!
//! # fn main() -> Result<(), switchyard::RouteError> {
//! let mut builder = RouteBuilder::new();
//! builder.globals(OptionFragment::new().middleware(["session"])?);
//! builder.register_actions("Photos", ["index", "show"]);
//!
//! builder.group("/api", OptionFragment::new().middleware(["add:auth"])?, |api| {
//!     api.get("/users/:id", "Users::show")?
//!         .constraint("id", r"^\d+$", None)?;
//!     api.resource("/photos", "Photos", OptionFragment::new())?;
//!     Ok(())
//! })?;
//! builder.otherwise("Errors::notFound", OptionFragment::new());
//!
//! let table = builder.build();
//!
//! let hit = table.resolve(&RequestContext::get("/api/users/42?verbose=1"));
//! assert_eq!(hit.route.handler_name(), Some("Users::show"));
//! assert_eq!(hit.route.params.get("id"), Some("42"));
//! assert_eq!(hit.route.middleware(), ["session", "auth"]);
//!
//! let rejected = table.resolve(&RequestContext::get("/api/users/abc"));
//! assert_eq!(rejected.classification, Classification::WhereRegex);
//! assert_eq!(rejected.route.handler_name(), Some("Errors::notFound"));
//!
//! let photo = table.resolve(&RequestContext::get("/api/photos/7"));
//! assert_eq!(photo.route.handler_name(), Some("Photos::show"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Classifications
//!
//! | classification | code | meaning |
//! |---|---|---|
//! | `None` | 0 | a route matched |
//! | `NotFound` | 1 | no route matched path, host and method |
//! | `Secure` | 2 | secure-only route, insecure request |
//! | `ControllerResolve` | 4 | controller route without a registered action segment |
//! | `WhereRegex` | 8 | a constraint rejected a parameter without default |
//! | `RestResolve` | 16 | resource route whose action is not registered |
//! | `Auth` | 32 | an authorization predicate returned `false` |
//!
//! Mapping these to HTTP statuses is left to the transport layer.

pub mod cli;
pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod options;
pub mod pattern;
pub mod registry;
pub mod request;
pub mod router;

pub use config::RouterConfig;
pub use error::RouteError;
pub use loader::{load_file, load_str};
pub use registry::{ActionProvider, ActionRegistry};
pub use request::RequestContext;
pub use router::{Classification, Resolution, RouteBuilder, RouteMatch, RouteTable};
