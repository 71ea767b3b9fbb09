use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use http::Method;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::matcher::{evaluate, Verdict};
use crate::options::{AuthPredicate, Constraint, EffectiveOptions};
use crate::pattern::{CompiledPattern, Params};
use crate::registry::ActionRegistry;
use crate::request::RequestContext;

/// Opaque handler identifier (`UserController`, `Photos::show`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerRef(Arc<str>);

impl HandlerRef {
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self(Arc::from(id))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `handler::action`
    #[must_use]
    pub fn with_action(&self, action: &str) -> Self {
        Self(Arc::from(format!("{}::{action}", self.0)))
    }
}

impl From<&str> for HandlerRef {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for HandlerRef {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which extra matcher stages a route switches on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteKind {
    #[default]
    Plain,
    /// Action taken from the segment after the route prefix
    Controller,
    /// One of the seven conventional resource routes
    Resource,
}

/// A registered route with its merged configuration
pub struct Route {
    /// `None` only for the fallback route
    pub(crate) pattern: Option<CompiledPattern>,
    pub(crate) domain: Option<String>,
    pub(crate) domain_matcher: Option<Regex>,
    pub(crate) key: String,
    pub(crate) handler: Option<HandlerRef>,
    pub(crate) kind: RouteKind,
    /// Base handler id and conventional action of a resource route
    pub(crate) rest_action: Option<(HandlerRef, &'static str)>,
    pub(crate) wildcard: Option<Arc<str>>,
    pub(crate) methods: Vec<Method>,
    pub(crate) options: EffectiveOptions,
    /// Registration order
    pub(crate) seq: usize,
}

impl Route {
    /// Table key: optional `<domain>/` prefix plus the compiled pattern
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The uncompiled template (empty for the fallback route)
    #[must_use]
    pub fn template(&self) -> &str {
        self.pattern.as_ref().map_or("", CompiledPattern::template)
    }

    /// The compiled pattern string (empty for the fallback route)
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.pattern.as_ref().map_or("", CompiledPattern::as_str)
    }

    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    #[must_use]
    pub fn handler(&self) -> Option<&HandlerRef> {
        self.handler.as_ref()
    }

    #[must_use]
    pub fn kind(&self) -> RouteKind {
        self.kind
    }

    #[must_use]
    pub fn is_controller(&self) -> bool {
        self.kind == RouteKind::Controller
    }

    #[must_use]
    pub fn is_resource(&self) -> bool {
        self.kind == RouteKind::Resource
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.pattern.is_none()
    }

    #[must_use]
    pub fn wildcard(&self) -> Option<&str> {
        self.wildcard.as_deref()
    }

    #[must_use]
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    #[must_use]
    pub fn allows(&self, method: &Method) -> bool {
        self.methods.contains(method)
    }

    #[must_use]
    pub fn secure(&self) -> bool {
        self.options.secure
    }

    /// Middleware identifiers in application order
    #[must_use]
    pub fn middleware(&self) -> &[String] {
        &self.options.middleware
    }

    #[must_use]
    pub fn constraints(&self) -> &BTreeMap<String, Constraint> {
        &self.options.constraints
    }

    #[must_use]
    pub fn auth_chain(&self) -> &[AuthPredicate] {
        &self.options.auth
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("key", &self.key)
            .field("template", &self.template())
            .field("handler", &self.handler)
            .field("kind", &self.kind)
            .field("methods", &self.methods)
            .field("wildcard", &self.wildcard)
            .field("options", &self.options)
            .finish()
    }
}

/// Why a resolution ended at the fallback route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// A route matched
    None,
    /// No route matched the path, host and method
    NotFound,
    /// Secure-only route requested over insecure transport
    Secure,
    /// Controller route without a usable action segment
    ControllerResolve,
    /// A constraint rejected a parameter that has no default
    WhereRegex,
    /// Resource route whose handler action is not registered
    RestResolve,
    /// An authorization predicate returned `false`
    Auth,
}

impl Classification {
    /// Stable numeric code (`0` for a match, one bit per failure kind)
    #[must_use]
    pub fn code(self) -> u32 {
        match self {
            Classification::None => 0,
            Classification::NotFound => 1,
            Classification::Secure => 2,
            Classification::ControllerResolve => 4,
            Classification::WhereRegex => 8,
            Classification::RestResolve => 16,
            Classification::Auth => 32,
        }
    }

    #[must_use]
    pub fn is_failure(self) -> bool {
        self != Classification::None
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Classification::None => "none",
            Classification::NotFound => "not_found",
            Classification::Secure => "secure",
            Classification::ControllerResolve => "controller_resolve",
            Classification::WhereRegex => "where_regex",
            Classification::RestResolve => "rest_resolve",
            Classification::Auth => "auth",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A route together with what one resolution bound for it
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: Arc<Route>,
    /// Handler after controller-action rewriting
    pub handler: Option<HandlerRef>,
    pub params: Params,
}

impl RouteMatch {
    pub(crate) fn fallback(route: &Arc<Route>) -> Self {
        Self {
            handler: route.handler.clone(),
            route: Arc::clone(route),
            params: Params::default(),
        }
    }

    #[must_use]
    pub fn handler_name(&self) -> Option<&str> {
        self.handler.as_ref().map(HandlerRef::as_str)
    }

    #[must_use]
    pub fn middleware(&self) -> &[String] {
        self.route.middleware()
    }
}

/// Result of [`RouteTable::resolve`]: always a route, plus a classification
#[derive(Debug, Clone)]
pub struct Resolution {
    pub route: RouteMatch,
    pub classification: Classification,
}

impl Resolution {
    /// `true` when a registered route matched
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.classification == Classification::None
    }

    /// Split into the matched route or the fallback with its classification
    ///
    /// # Errors
    ///
    /// Returns the fallback route and classification when nothing matched.
    pub fn into_result(self) -> Result<RouteMatch, (Classification, RouteMatch)> {
        if self.is_match() {
            Ok(self.route)
        } else {
            Err((self.classification, self.route))
        }
    }
}

/// Immutable compiled routing table
///
/// Built once by [`RouteBuilder`](super::RouteBuilder); resolution is a pure
/// function of the table and a [`RequestContext`], so one table can serve any
/// number of requests concurrently.
#[derive(Debug, Clone)]
pub struct RouteTable {
    /// Candidates in scan order: descending key, then registration order
    pub(crate) routes: Vec<Arc<Route>>,
    pub(crate) fallback: Arc<Route>,
    pub(crate) actions: ActionRegistry,
}

impl RouteTable {
    pub(crate) fn new(
        mut routes: Vec<Arc<Route>>,
        fallback: Arc<Route>,
        actions: ActionRegistry,
    ) -> Self {
        // Approximates "more specific first"; not a longest-prefix guarantee.
        routes.sort_by(|a, b| b.key.cmp(&a.key).then(a.seq.cmp(&b.seq)));

        let routes_summary: Vec<String> = routes
            .iter()
            .take(10)
            .map(|r| format!("{:?} {}", r.methods, r.key))
            .collect();
        info!(
            routes_count = routes.len(),
            routes_summary = ?routes_summary,
            fallback_middleware = ?fallback.middleware(),
            "Routing table compiled"
        );

        Self {
            routes,
            fallback,
            actions,
        }
    }

    /// Routes in scan order
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter().map(AsRef::as_ref)
    }

    #[must_use]
    pub fn fallback(&self) -> &Route {
        &self.fallback
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    #[must_use]
    pub fn actions(&self) -> &ActionRegistry {
        &self.actions
    }

    /// One line per route, in scan order
    #[must_use]
    pub fn dump(&self) -> String {
        let mut out = format!("[routes] count={}\n", self.routes.len());
        for route in &self.routes {
            let methods: Vec<&str> = route.methods.iter().map(Method::as_str).collect();
            out.push_str(&format!(
                "[route] {} {} ({}) -> {}",
                methods.join(","),
                route.key,
                route.template(),
                route.handler.as_ref().map_or("-", HandlerRef::as_str)
            ));
            if !route.middleware().is_empty() {
                out.push_str(&format!(" middleware={:?}", route.middleware()));
            }
            out.push('\n');
        }
        out.push_str(&format!(
            "[fallback] -> {} middleware={:?}\n",
            self.fallback.handler.as_ref().map_or("-", HandlerRef::as_str),
            self.fallback.middleware()
        ));
        out
    }

    /// Resolve a request to a route or to the fallback with a classification.
    ///
    /// Candidates that do not allow the request method are invisible. Path and
    /// domain mismatches move on to the next candidate; every later check
    /// stops the scan with its classification.
    ///
    /// ```
    /// use switchyard::request::RequestContext;
    /// use switchyard::router::{Classification, RouteBuilder};
    ///
    /// let mut builder = RouteBuilder::new();
    /// builder.get("/users/:id", "Users::show").unwrap();
    /// let table = builder.build();
    ///
    /// let hit = table.resolve(&RequestContext::get("/users/42/"));
    /// assert!(hit.is_match());
    /// assert_eq!(hit.route.params.get("id"), Some("42"));
    ///
    /// let miss = table.resolve(&RequestContext::get("/nope"));
    /// assert_eq!(miss.classification, Classification::NotFound);
    /// ```
    #[must_use]
    pub fn resolve(&self, request: &RequestContext) -> Resolution {
        let path = request.normalized_path();
        debug!(
            method = %request.method,
            uri = %request.uri,
            path = %path,
            host = ?request.host,
            secure = request.secure,
            "Route match attempt"
        );

        let match_start = Instant::now();

        for route in self.routes.iter().filter(|r| r.allows(&request.method)) {
            match evaluate(route, request, &path, &self.actions) {
                Verdict::Skip => continue,
                Verdict::Pass(matched) => {
                    let duration = match_start.elapsed();
                    if duration > Duration::from_millis(1) {
                        warn!(
                            method = %request.method,
                            path = %path,
                            handler = ?matched.handler_name(),
                            route_key = %route.key,
                            duration_us = duration.as_micros(),
                            "Slow route matching detected"
                        );
                    } else {
                        info!(
                            method = %request.method,
                            path = %path,
                            handler = ?matched.handler_name(),
                            route_key = %route.key,
                            params = ?matched.params,
                            duration_us = duration.as_micros(),
                            "Route matched"
                        );
                    }
                    return Resolution {
                        route: matched,
                        classification: Classification::None,
                    };
                }
                Verdict::Fail(classification) => {
                    warn!(
                        method = %request.method,
                        path = %path,
                        route_key = %route.key,
                        classification = %classification,
                        "Route rejected request, using fallback"
                    );
                    return self.fall_back(classification);
                }
            }
        }

        warn!(
            method = %request.method,
            path = %path,
            duration_us = match_start.elapsed().as_micros(),
            "No route matched"
        );
        self.fall_back(Classification::NotFound)
    }

    fn fall_back(&self, classification: Classification) -> Resolution {
        Resolution {
            route: RouteMatch::fallback(&self.fallback),
            classification,
        }
    }
}
