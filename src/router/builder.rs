use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use http::Method;
use regex::Regex;
use tracing::{debug, warn};

use super::core::{HandlerRef, Route, RouteKind, RouteTable};
use crate::config::RouterConfig;
use crate::error::{Result, RouteError};
use crate::options::{apply_list, merge_fragments, AuthRequest, EffectiveOptions, ListEntry, OptionFragment};
use crate::pattern::{normalize, CompiledPattern};
use crate::registry::ActionRegistry;

/// Methods used by method-agnostic registrations
pub const DEFAULT_METHODS: [&str; 4] = ["GET", "POST", "PUT", "DELETE"];

/// Default name of the resource id placeholder
pub const DEFAULT_RESOURCE_PARAM: &str = "id";

/// Conventional resource routes: (suffix, needs id, verb, action)
const RESOURCE_ROUTES: [(&str, bool, &str, &str); 7] = [
    ("", false, "GET", "index"),
    ("/create", false, "GET", "create"),
    ("", false, "POST", "store"),
    ("", true, "GET", "show"),
    ("/edit", true, "GET", "edit"),
    ("", true, "PUT", "update"),
    ("", true, "DELETE", "destroy"),
];

/// Where modifier calls land
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    /// Innermost open scope (or the root fragment)
    Scope,
    /// A bound route's own fragment
    Route(usize),
    /// The fallback route's own fragment
    Fallback,
}

/// A bound route waiting for [`RouteBuilder::build`]
struct PendingRoute {
    pattern: CompiledPattern,
    domain: Option<(String, Regex)>,
    key: String,
    handler: HandlerRef,
    kind: RouteKind,
    rest_action: Option<(HandlerRef, &'static str)>,
    wildcard: Option<Arc<str>>,
    methods: Vec<Method>,
    /// Scope fragments frozen at bind time, outermost first
    chain: Vec<OptionFragment>,
    own: OptionFragment,
}

#[derive(Default)]
struct PendingFallback {
    handler: Option<HandlerRef>,
    chain: Vec<OptionFragment>,
    own: OptionFragment,
}

/// Registration surface for a [`RouteTable`].
///
/// Registration calls return `Result<&mut Self>` so they chain with `?`;
/// a duplicate route fails on the call that introduces it. Modifiers such as
/// [`constraint`](Self::constraint) or [`with_middleware`](Self::with_middleware)
/// apply to the most recently bound route, to the fallback after
/// [`otherwise`](Self::otherwise), or to the innermost scope opened since.
///
/// ```
/// use switchyard::options::OptionFragment;
/// use switchyard::request::RequestContext;
/// use switchyard::router::RouteBuilder;
///
/// # fn main() -> Result<(), switchyard::RouteError> {
/// let mut builder = RouteBuilder::new();
/// builder
///     .globals(OptionFragment::new().middleware(["session"])?)
///     .group("/api", OptionFragment::new(), |api| {
///         api.get("/users/:id", "Users::show")?
///             .constraint("id", r"^\d+$", None)?
///             .with_middleware(["auth"]);
///         Ok(())
///     })?
///     .otherwise("NotFound", OptionFragment::new());
///
/// let table = builder.build();
/// let resolution = table.resolve(&RequestContext::get("/api/users/7"));
/// assert_eq!(resolution.route.handler_name(), Some("Users::show"));
/// assert_eq!(resolution.route.middleware(), ["session", "auth"]);
/// # Ok(())
/// # }
/// ```
pub struct RouteBuilder {
    prefixes: Vec<String>,
    domains: Vec<String>,
    root: OptionFragment,
    scopes: Vec<OptionFragment>,
    cursor: Cursor,
    pending: Vec<PendingRoute>,
    fallback: PendingFallback,
    actions: ActionRegistry,
    resource_param: String,
    default_methods: Vec<String>,
}

impl Default for RouteBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            prefixes: Vec::new(),
            domains: Vec::new(),
            root: OptionFragment::default(),
            scopes: Vec::new(),
            cursor: Cursor::Scope,
            pending: Vec::new(),
            fallback: PendingFallback::default(),
            actions: ActionRegistry::new(),
            resource_param: DEFAULT_RESOURCE_PARAM.to_string(),
            default_methods: DEFAULT_METHODS.iter().map(|m| (*m).to_string()).collect(),
        }
    }

    /// Take the resource id name and default method list from `config`
    #[must_use]
    pub fn with_config(mut self, config: &RouterConfig) -> Self {
        self.resource_param.clone_from(&config.resource_id_param);
        self.default_methods = config
            .default_methods
            .iter()
            .map(|m| m.to_ascii_uppercase())
            .collect();
        self
    }

    /// Use `actions` for controller and resource checks
    #[must_use]
    pub fn with_actions(mut self, actions: ActionRegistry) -> Self {
        self.actions = actions;
        self
    }

    /// Declare the actions a handler exposes
    pub fn register_actions<I, S>(&mut self, handler_id: &str, actions: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actions.register(handler_id, actions);
        self
    }

    /// Number of bound routes so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    // ----------------------------------------------------------------------
    // Registration
    // ----------------------------------------------------------------------

    /// Bind `path` using the method list of `options`, or the default
    /// method-agnostic list when `options` names none. A method list made
    /// only of operations (`add:PATCH`, `del:DELETE`) edits the defaults.
    ///
    /// # Errors
    ///
    /// See [`RouteError`]; most commonly [`RouteError::DuplicateRoute`].
    pub fn bind(
        &mut self,
        path: &str,
        handler: impl Into<HandlerRef>,
        mut options: OptionFragment,
    ) -> Result<&mut Self> {
        self.seed_default_methods(&mut options);
        self.register(path, handler.into(), options, RouteKind::Plain)
    }

    /// Method-agnostic bind without options
    ///
    /// # Errors
    ///
    /// See [`RouteBuilder::bind`].
    pub fn on(&mut self, path: &str, handler: impl Into<HandlerRef>) -> Result<&mut Self> {
        self.bind(path, handler, OptionFragment::new())
    }

    /// Bind `path` for exactly `methods`
    ///
    /// # Errors
    ///
    /// See [`RouteBuilder::bind`].
    pub fn match_methods<S: AsRef<str>>(
        &mut self,
        methods: &[S],
        path: &str,
        handler: impl Into<HandlerRef>,
        mut options: OptionFragment,
    ) -> Result<&mut Self> {
        let methods: Vec<String> = methods.iter().map(|m| m.as_ref().to_string()).collect();
        options.set_method_literals(&methods);
        self.register(path, handler.into(), options, RouteKind::Plain)
    }

    /// # Errors
    ///
    /// See [`RouteBuilder::bind`].
    pub fn get(&mut self, path: &str, handler: impl Into<HandlerRef>) -> Result<&mut Self> {
        self.match_methods(&["GET"], path, handler, OptionFragment::new())
    }

    /// # Errors
    ///
    /// See [`RouteBuilder::bind`].
    pub fn post(&mut self, path: &str, handler: impl Into<HandlerRef>) -> Result<&mut Self> {
        self.match_methods(&["POST"], path, handler, OptionFragment::new())
    }

    /// # Errors
    ///
    /// See [`RouteBuilder::bind`].
    pub fn put(&mut self, path: &str, handler: impl Into<HandlerRef>) -> Result<&mut Self> {
        self.match_methods(&["PUT"], path, handler, OptionFragment::new())
    }

    /// # Errors
    ///
    /// See [`RouteBuilder::bind`].
    pub fn delete(&mut self, path: &str, handler: impl Into<HandlerRef>) -> Result<&mut Self> {
        self.match_methods(&["DELETE"], path, handler, OptionFragment::new())
    }

    /// # Errors
    ///
    /// See [`RouteBuilder::bind`].
    pub fn patch(&mut self, path: &str, handler: impl Into<HandlerRef>) -> Result<&mut Self> {
        self.match_methods(&["PATCH"], path, handler, OptionFragment::new())
    }

    /// # Errors
    ///
    /// See [`RouteBuilder::bind`].
    pub fn head(&mut self, path: &str, handler: impl Into<HandlerRef>) -> Result<&mut Self> {
        self.match_methods(&["HEAD"], path, handler, OptionFragment::new())
    }

    /// Bind a controller route: the segment after `path` names the action
    /// of `handler_id`, which must be registered in the action registry.
    ///
    /// # Errors
    ///
    /// See [`RouteBuilder::bind`].
    pub fn controller(
        &mut self,
        path: &str,
        handler_id: &str,
        mut options: OptionFragment,
    ) -> Result<&mut Self> {
        self.seed_default_methods(&mut options);
        self.register(path, HandlerRef::new(handler_id), options, RouteKind::Controller)
    }

    /// Bind the seven conventional resource routes using the configured id
    /// placeholder name.
    ///
    /// # Errors
    ///
    /// See [`RouteBuilder::bind`].
    pub fn resource(
        &mut self,
        path: &str,
        handler_id: &str,
        options: OptionFragment,
    ) -> Result<&mut Self> {
        let id_param = self.resource_param.clone();
        self.resource_named(path, handler_id, &id_param, options)
    }

    /// [`resource`](Self::resource) with an explicit id placeholder name
    ///
    /// | verb | path | action |
    /// |---|---|---|
    /// | GET | `P` | `index` |
    /// | GET | `P/create` | `create` |
    /// | POST | `P` | `store` |
    /// | GET | `P/:id` | `show` |
    /// | GET | `P/:id/edit` | `edit` |
    /// | PUT | `P/:id` | `update` |
    /// | DELETE | `P/:id` | `destroy` |
    ///
    /// # Errors
    ///
    /// See [`RouteBuilder::bind`].
    pub fn resource_named(
        &mut self,
        path: &str,
        handler_id: &str,
        id_param: &str,
        options: OptionFragment,
    ) -> Result<&mut Self> {
        let base = normalize(path).trim_end_matches('/');
        let handler = HandlerRef::new(handler_id);

        for (suffix, with_id, verb, action) in RESOURCE_ROUTES {
            let route_path = if with_id {
                format!("{base}/:{id_param}{suffix}")
            } else {
                format!("{base}{suffix}")
            };
            let mut own = options.clone();
            own.set_method_literals(&[verb.to_string()]);
            self.register(&route_path, handler.with_action(action), own, RouteKind::Resource)?;
            if let Some(pending) = self.pending.last_mut() {
                pending.rest_action = Some((handler.clone(), action));
            }
        }
        Ok(self)
    }

    /// Configure the fallback route returned by every failed resolution
    pub fn otherwise(
        &mut self,
        handler: impl Into<HandlerRef>,
        options: OptionFragment,
    ) -> &mut Self {
        self.fallback = PendingFallback {
            handler: Some(handler.into()),
            chain: self.snapshot(),
            own: options,
        };
        self.cursor = Cursor::Fallback;
        self
    }

    // ----------------------------------------------------------------------
    // Scopes
    // ----------------------------------------------------------------------

    /// Push a fragment that stays active until the enclosing scope closes
    pub fn globals(&mut self, options: OptionFragment) -> &mut Self {
        self.scopes.push(options);
        self.cursor = Cursor::Scope;
        self
    }

    /// Register routes under `prefix` with `options` layered on top.
    ///
    /// The prefix and fragment are popped when `f` returns, fails or panics.
    ///
    /// # Errors
    ///
    /// Whatever `f` returns.
    pub fn group<F>(&mut self, prefix: &str, options: OptionFragment, f: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let depth = self.depth();
        self.prefixes.push(prefix.to_string());
        self.scopes.push(options);
        self.cursor = Cursor::Scope;
        debug!(prefix, "Entering route group");
        self.scoped(depth, f)
    }

    /// Register routes that only match when the request host matches `host`
    /// (a regex, anchored at both ends).
    ///
    /// # Errors
    ///
    /// Whatever `f` returns.
    pub fn domain<F>(&mut self, host: &str, options: OptionFragment, f: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let depth = self.depth();
        self.domains.push(host.to_string());
        self.scopes.push(options);
        self.cursor = Cursor::Scope;
        debug!(host, "Entering domain scope");
        self.scoped(depth, f)
    }

    fn depth(&self) -> (usize, usize, usize) {
        (self.prefixes.len(), self.domains.len(), self.scopes.len())
    }

    fn scoped<F>(&mut self, depth: (usize, usize, usize), f: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| f(&mut *self)));

        let (prefixes, domains, scopes) = depth;
        self.prefixes.truncate(prefixes);
        self.domains.truncate(domains);
        self.scopes.truncate(scopes);
        self.cursor = Cursor::Scope;

        match outcome {
            Ok(result) => result.map(|()| self),
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    // ----------------------------------------------------------------------
    // Modifiers
    // ----------------------------------------------------------------------

    /// Constrain `param` to `regexp`, substituting `default` on mismatch
    ///
    /// # Errors
    ///
    /// [`RouteError::InvalidConstraint`] when `regexp` does not compile.
    pub fn constraint(
        &mut self,
        param: &str,
        regexp: &str,
        default: Option<&str>,
    ) -> Result<&mut Self> {
        self.cursor_fragment().insert_constraint(param, regexp, default)?;
        Ok(self)
    }

    /// Capture the segments after the last bound route's prefix as `name`
    ///
    /// # Errors
    ///
    /// [`RouteError::NoRouteBound`] unless the cursor is on a route.
    pub fn wildcard(&mut self, name: &str) -> Result<&mut Self> {
        let Cursor::Route(idx) = self.cursor else {
            return Err(RouteError::NoRouteBound {
                operation: "wildcard",
            });
        };
        if let Some(route) = self.pending.get_mut(idx) {
            route.wildcard = Some(Arc::from(name));
        }
        Ok(self)
    }

    /// Append an authorization predicate
    pub fn auth<F>(&mut self, predicate: F) -> &mut Self
    where
        F: Fn(&AuthRequest<'_>) -> bool + Send + Sync + 'static,
    {
        self.cursor_fragment().auth.push(Arc::new(predicate));
        self
    }

    pub fn with_secure(&mut self, flag: bool) -> &mut Self {
        self.cursor_fragment().secure = Some(flag);
        self
    }

    pub fn with_middleware<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fragment = self.cursor_fragment();
        for name in names {
            fragment.push_middleware(ListEntry::Add(name.into()));
        }
        self
    }

    pub fn without_middleware<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fragment = self.cursor_fragment();
        for name in names {
            fragment.push_middleware(ListEntry::Del(name.into()));
        }
        self
    }

    pub fn without_any_middleware(&mut self) -> &mut Self {
        self.cursor_fragment().push_middleware(ListEntry::Clear);
        self
    }

    fn cursor_fragment(&mut self) -> &mut OptionFragment {
        match self.cursor {
            Cursor::Route(idx) if idx < self.pending.len() => &mut self.pending[idx].own,
            Cursor::Fallback => &mut self.fallback.own,
            _ => match self.scopes.last_mut() {
                Some(fragment) => fragment,
                None => &mut self.root,
            },
        }
    }

    // ----------------------------------------------------------------------
    // Core
    // ----------------------------------------------------------------------

    /// Resolve a method-agnostic registration's method list against the
    /// defaults; literal lists are left alone.
    fn seed_default_methods(&self, options: &mut OptionFragment) {
        let methods = match &options.methods {
            None => self.default_methods.clone(),
            Some(entries) if !entries.iter().any(ListEntry::is_literal) => {
                let mut methods = self.default_methods.clone();
                apply_list(&mut methods, entries);
                methods
            }
            Some(_) => return,
        };
        options.set_method_literals(&methods);
    }

    fn snapshot(&self) -> Vec<OptionFragment> {
        std::iter::once(&self.root)
            .chain(self.scopes.iter())
            .cloned()
            .collect()
    }

    fn register(
        &mut self,
        path: &str,
        handler: HandlerRef,
        own: OptionFragment,
        kind: RouteKind,
    ) -> Result<&mut Self> {
        let joined = format!("{}{}", self.prefixes.concat(), normalize(path));
        let template = normalize(&joined);
        let pattern = CompiledPattern::new(template)?;

        let domain = match self.domains.last() {
            Some(host) => {
                let matcher = Regex::new(&format!("^(?:{host})$")).map_err(|source| {
                    RouteError::InvalidPattern {
                        template: host.clone(),
                        source,
                    }
                })?;
                Some((host.clone(), matcher))
            }
            None => None,
        };

        let key = match &domain {
            Some((host, _)) => format!("<{host}>/{}", pattern.as_str()),
            None => pattern.as_str().to_string(),
        };

        let chain = self.snapshot();
        let methods = effective_methods(&chain, &own)?;

        if let Some(existing) = self
            .pending
            .iter()
            .find(|r| r.key == key && r.methods.iter().any(|m| methods.contains(m)))
        {
            warn!(key = %key, existing_handler = %existing.handler, handler = %handler, "Duplicate route");
            return Err(RouteError::DuplicateRoute { key });
        }

        if methods.is_empty() {
            warn!(key = %key, handler = %handler, "Route allows no methods and can never match");
        }

        debug!(
            key = %key,
            template = %pattern.template(),
            handler = %handler,
            kind = ?kind,
            methods = ?methods,
            "Route bound"
        );

        self.pending.push(PendingRoute {
            pattern,
            domain,
            key,
            handler,
            kind,
            rest_action: None,
            wildcard: None,
            methods,
            chain,
            own,
        });
        self.cursor = Cursor::Route(self.pending.len() - 1);
        Ok(self)
    }

    /// Merge every frozen fragment chain and compile the table
    #[must_use]
    pub fn build(self) -> RouteTable {
        let routes = self
            .pending
            .into_iter()
            .enumerate()
            .map(|(seq, pending)| {
                let options = merge_fragments(pending.chain.iter().chain(std::iter::once(&pending.own)));
                let (domain, domain_matcher) = match pending.domain {
                    Some((host, matcher)) => (Some(host), Some(matcher)),
                    None => (None, None),
                };
                Arc::new(Route {
                    pattern: Some(pending.pattern),
                    domain,
                    domain_matcher,
                    key: pending.key,
                    handler: Some(pending.handler),
                    kind: pending.kind,
                    rest_action: pending.rest_action,
                    wildcard: pending.wildcard,
                    methods: pending.methods,
                    options,
                    seq,
                })
            })
            .collect();

        let fallback_options: EffectiveOptions = if self.fallback.chain.is_empty() {
            merge_fragments(
                std::iter::once(&self.root)
                    .chain(self.scopes.iter())
                    .chain(std::iter::once(&self.fallback.own)),
            )
        } else {
            merge_fragments(
                self.fallback
                    .chain
                    .iter()
                    .chain(std::iter::once(&self.fallback.own)),
            )
        };
        let fallback = Arc::new(Route {
            pattern: None,
            domain: None,
            domain_matcher: None,
            key: String::new(),
            handler: self.fallback.handler,
            kind: RouteKind::Plain,
            rest_action: None,
            wildcard: None,
            methods: Vec::new(),
            options: fallback_options,
            seq: usize::MAX,
        });

        RouteTable::new(routes, fallback, self.actions)
    }
}

/// Method set a route will have: the method lists of its chain and own
/// fragment folded, parsed and de-duplicated.
fn effective_methods(chain: &[OptionFragment], own: &OptionFragment) -> Result<Vec<Method>> {
    let merged = merge_fragments(chain.iter().chain(std::iter::once(own)));
    let mut methods: Vec<Method> = Vec::with_capacity(merged.methods.len());
    for name in &merged.methods {
        let method = Method::from_bytes(name.as_bytes()).map_err(|_| RouteError::InvalidMethod {
            method: name.clone(),
        })?;
        if !methods.contains(&method) {
            methods.push(method);
        }
    }
    Ok(methods)
}
