//! # Loader Module
//!
//! Declarative route documents. An XML file is translated into the same
//! [`RouteBuilder`](crate::router::RouteBuilder) calls as the programmatic
//! API, so everything the builder enforces (duplicate keys, constraint
//! regexes, method names) applies to loaded routes as well.
//!
//! ## Document format
//!
//! The root element can have any name; routes live in its `<route>` child.
//!
//! ```xml
//! <routes>
//!   <route>
//!     <options>
//!       <middleware value="session"/>
//!     </options>
//!     <get path="/" call="Home::index"/>
//!     <match method="get,post" path="/search" call="Search::run"/>
//!     <group prefix="/api">
//!       <options>
//!         <secure value="true"/>
//!         <middleware value="add:auth"/>
//!       </options>
//!       <get path="/users/:id" call="Users::show">
//!         <options>
//!           <where>
//!             <id regexp="^\d+$"/>
//!           </where>
//!         </options>
//!       </get>
//!     </group>
//!     <domain host="admin\.example\.com">
//!       <controller path="/panel" call="Admin"/>
//!       <resource path="/photos" call="Photos"/>
//!     </domain>
//!   </route>
//! </routes>
//! ```
//!
//! | element | builder call |
//! |---|---|
//! | `<options>` under `<route>` | `globals` |
//! | `<group prefix>` | `group` |
//! | `<domain host>` | `domain` |
//! | `<get>` ... `<head>` | `match_methods` with that verb |
//! | `<match method="a,b">` | `match_methods` |
//! | `<on>` | `bind` |
//! | `<controller>` / `<resource>` | `controller` / `resource` |
//!
//! `where` regexes use Rust [`regex`] syntax without delimiters.
//!
//! Malformed XML, unknown elements and missing attributes are reported as
//! [`RouteError::Parse`](crate::RouteError::Parse) with the file name, line
//! and column of the offending node.

mod load;
#[cfg(test)]
mod tests;

pub use load::{load_file, load_str};
