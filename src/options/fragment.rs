use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::error::RouteError;
use crate::pattern::Params;
use crate::request::RequestContext;
use crate::router::{HandlerRef, Route};

/// Separator between an operation and its item (`add:auth`)
pub const OP_SEPARATOR: char = ':';

/// One entry of an incremental `method` / `middleware` list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEntry {
    /// Plain value; any literal in a fragment replaces the accumulated list
    Literal(String),
    /// `add:item` appends `item`
    Add(String),
    /// `del:item` removes every occurrence of `item`
    Del(String),
    /// `clear:*` empties the accumulated list
    Clear,
}

impl ListEntry {
    /// Parse the textual form used by route documents.
    ///
    /// # Errors
    ///
    /// [`RouteError::InvalidListEntry`] for an `op:item` entry whose operation
    /// is not `add`, `del` or `clear`.
    pub fn parse(entry: &str) -> Result<Self, RouteError> {
        let entry = entry.trim();
        let Some((op, item)) = entry.split_once(OP_SEPARATOR) else {
            return Ok(ListEntry::Literal(entry.to_string()));
        };
        match op {
            "add" => Ok(ListEntry::Add(item.to_string())),
            "del" => Ok(ListEntry::Del(item.to_string())),
            "clear" => Ok(ListEntry::Clear),
            _ => Err(RouteError::InvalidListEntry {
                entry: entry.to_string(),
            }),
        }
    }

    #[must_use]
    pub fn is_literal(&self) -> bool {
        matches!(self, ListEntry::Literal(_))
    }

    fn map_item(self, f: impl Fn(String) -> String) -> Self {
        match self {
            ListEntry::Literal(s) => ListEntry::Literal(f(s)),
            ListEntry::Add(s) => ListEntry::Add(f(s)),
            ListEntry::Del(s) => ListEntry::Del(f(s)),
            ListEntry::Clear => ListEntry::Clear,
        }
    }
}

impl fmt::Display for ListEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListEntry::Literal(s) => write!(f, "{s}"),
            ListEntry::Add(s) => write!(f, "add{OP_SEPARATOR}{s}"),
            ListEntry::Del(s) => write!(f, "del{OP_SEPARATOR}{s}"),
            ListEntry::Clear => write!(f, "clear{OP_SEPARATOR}*"),
        }
    }
}

/// Per-parameter validation regex with an optional default substitution
#[derive(Debug, Clone)]
pub struct Constraint {
    regex: Regex,
    default: Option<String>,
}

impl Constraint {
    /// # Errors
    ///
    /// [`RouteError::InvalidConstraint`] when `regexp` does not compile.
    pub fn new(param: &str, regexp: &str, default: Option<String>) -> Result<Self, RouteError> {
        let regex = Regex::new(regexp).map_err(|source| RouteError::InvalidConstraint {
            param: param.to_string(),
            source,
        })?;
        Ok(Self { regex, default })
    }

    /// `true` when `value` satisfies the regex (unanchored unless the
    /// expression anchors itself)
    #[must_use]
    pub fn is_satisfied_by(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }

    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// Everything an authorization predicate can look at
pub struct AuthRequest<'a> {
    /// Candidate route
    pub route: &'a Route,
    /// Handler after controller-action rewriting
    pub handler: Option<&'a HandlerRef>,
    /// Parameters bound (and constraint-defaulted) for this request
    pub params: &'a Params,
    /// The request being resolved
    pub request: &'a RequestContext,
}

/// Authorization predicate; every predicate in a route's chain must pass
pub type AuthPredicate = Arc<dyn Fn(&AuthRequest<'_>) -> bool + Send + Sync>;

/// Unmerged configuration delta for one nesting level.
///
/// Fields left as `None` do not take part in the merge. `auth` is
/// append-only, so an empty vector contributes nothing.
///
/// ```
/// use switchyard::options::OptionFragment;
///
/// let fragment = OptionFragment::new()
///     .secure(true)
///     .middleware(["add:session", "del:cache"])
///     .unwrap()
///     .constraint("id", r"^\d+$", Some("1"))
///     .unwrap();
/// assert_eq!(fragment.secure, Some(true));
/// ```
#[derive(Clone, Default)]
pub struct OptionFragment {
    /// Overwrites the accumulated flag
    pub secure: Option<bool>,
    /// Overwrites the accumulated map as a whole
    pub constraints: Option<BTreeMap<String, Constraint>>,
    /// Incremental method list (upper-cased)
    pub methods: Option<Vec<ListEntry>>,
    /// Incremental middleware list
    pub middleware: Option<Vec<ListEntry>>,
    /// Appended to the accumulated chain
    pub auth: Vec<AuthPredicate>,
}

impl OptionFragment {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn secure(mut self, flag: bool) -> Self {
        self.secure = Some(flag);
        self
    }

    /// Set the method list from textual entries (`GET`, `add:patch`, ...)
    ///
    /// # Errors
    ///
    /// [`RouteError::InvalidListEntry`] for an unknown operation.
    pub fn methods<I, S>(mut self, entries: I) -> Result<Self, RouteError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed = parse_entries(entries)?
            .into_iter()
            .map(|e| e.map_item(|s| s.to_ascii_uppercase()))
            .collect();
        self.methods = Some(parsed);
        Ok(self)
    }

    /// Set the middleware list from textual entries (`auth`, `add:csrf`, ...)
    ///
    /// # Errors
    ///
    /// [`RouteError::InvalidListEntry`] for an unknown operation.
    pub fn middleware<I, S>(mut self, entries: I) -> Result<Self, RouteError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.middleware = Some(parse_entries(entries)?);
        Ok(self)
    }

    /// Add a `where` constraint
    ///
    /// # Errors
    ///
    /// [`RouteError::InvalidConstraint`] when `regexp` does not compile.
    pub fn constraint(
        mut self,
        param: &str,
        regexp: &str,
        default: Option<&str>,
    ) -> Result<Self, RouteError> {
        self.insert_constraint(param, regexp, default)?;
        Ok(self)
    }

    #[must_use]
    pub fn auth<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&AuthRequest<'_>) -> bool + Send + Sync + 'static,
    {
        self.auth.push(Arc::new(predicate));
        self
    }

    pub(crate) fn insert_constraint(
        &mut self,
        param: &str,
        regexp: &str,
        default: Option<&str>,
    ) -> Result<(), RouteError> {
        let constraint = Constraint::new(param, regexp, default.map(str::to_string))?;
        self.constraints
            .get_or_insert_with(BTreeMap::new)
            .insert(param.to_string(), constraint);
        Ok(())
    }

    pub(crate) fn push_middleware(&mut self, entry: ListEntry) {
        self.middleware.get_or_insert_with(Vec::new).push(entry);
    }

    /// Replace the method list with exactly `methods`; an empty slice clears it
    pub(crate) fn set_method_literals(&mut self, methods: &[String]) {
        if methods.is_empty() {
            self.methods = Some(vec![ListEntry::Clear]);
            return;
        }
        self.methods = Some(
            methods
                .iter()
                .map(|m| ListEntry::Literal(m.to_ascii_uppercase()))
                .collect(),
        );
    }
}

impl fmt::Debug for OptionFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionFragment")
            .field("secure", &self.secure)
            .field("constraints", &self.constraints)
            .field("methods", &self.methods)
            .field("middleware", &self.middleware)
            .field("auth", &format_args!("<{} predicate(s)>", self.auth.len()))
            .finish()
    }
}

fn parse_entries<I, S>(entries: I) -> Result<Vec<ListEntry>, RouteError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    entries
        .into_iter()
        .filter(|e| !e.as_ref().trim().is_empty())
        .map(|e| ListEntry::parse(e.as_ref()))
        .collect()
}
