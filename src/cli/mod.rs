//! # CLI Module
//!
//! Command-line access to route documents, mainly for checking what a
//! document compiles to and how a given request would be dispatched.
//!
//! ## Commands
//!
//! ### `inspect`
//!
//! Print the compiled routing table in scan order:
//!
//! ```bash
//! switchyard inspect --routes routes.xml
//! ```
//!
//! ### `resolve`
//!
//! Resolve a single request:
//!
//! ```bash
//! switchyard resolve --routes routes.xml --path /api/users/42 --method GET \
//!     --host api.example.com --secure
//! ```
//!
//! Options shared by both commands:
//! - `--config <FILE>` - YAML configuration (also `SWITCHYARD_CONFIG`)
//! - `--actions <HANDLER=a,b>` - declare controller actions (repeatable)
//! - `--json` - machine readable output
//!
//! ## Usage from Code
//!
//! ```rust
//! use clap::Parser;
//! use switchyard::cli::{Cli, Commands};
//!
//! let cli = Cli::try_parse_from(["switchyard", "inspect", "--routes", "routes.xml"]).unwrap();
//! assert!(matches!(cli.command, Commands::Inspect { .. }));
//! ```

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{execute, run_cli, Cli, Commands};
