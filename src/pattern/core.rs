use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::ser::{Serialize, SerializeMap, Serializer};
use smallvec::SmallVec;

use crate::error::RouteError;

/// Maximum number of bound parameters before heap allocation.
/// Templates rarely carry more than a handful of placeholders.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Atom every placeholder compiles to: one non-empty word-character segment
const SEGMENT_ATOM: &str = r"/[\w]+";

/// Mandatory `/:name` or optional `(/:name)` placeholder occurrence
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(?/:[\w)]*").expect("placeholder regex is valid"));

/// Strip a trailing slash from a template or request path.
///
/// The root path `/` is the single exception and is returned unchanged.
#[inline]
#[must_use]
pub fn normalize(path: &str) -> &str {
    if path == "/" {
        return path;
    }
    path.trim_end_matches('/')
}

/// Keep only word characters (letters, digits, underscore)
#[must_use]
pub(crate) fn word_chars(s: &str) -> String {
    s.chars().filter(|c| c.is_alphanumeric() || *c == '_').collect()
}

/// Compile a path template into its pattern string.
///
/// Each `/:name` becomes `/[\w]+` and each `(/:name)` becomes `(/[\w]+)?`.
/// Everything else is copied verbatim: literal segments are *not* escaped, so
/// regex metacharacters in a template keep their regex meaning.
///
/// ```
/// use switchyard::pattern::compile_template;
///
/// assert_eq!(
///     compile_template("/api/:user/auth/:key(/:opt)"),
///     r"/api/[\w]+/auth/[\w]+(/[\w]+)?"
/// );
/// assert_eq!(compile_template(""), "");
/// ```
#[must_use]
pub fn compile_template(template: &str) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            let occurrence = &caps[0];
            if occurrence.starts_with('(') && occurrence.ends_with(')') {
                format!("({SEGMENT_ATOM})?")
            } else {
                SEGMENT_ATOM.to_string()
            }
        })
        .into_owned()
}

/// Placeholder names and their zero-based segment positions in a template
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placeholders {
    entries: Vec<(Arc<str>, usize)>,
}

impl Placeholders {
    /// Iterate `(name, segment index)` pairs in template order
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(name, idx)| (name.as_ref(), *idx))
    }

    /// Segment index recorded for `name`
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(n, _)| n.as_ref() == name)
            .map(|(_, idx)| *idx)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the left-most placeholder segment
    fn first_index(&self) -> Option<usize> {
        self.entries.iter().map(|(_, idx)| *idx).min()
    }
}

/// Record the segment position of every placeholder in `template`.
///
/// The *uncompiled* template is split on `/`; a segment starting with `:`
/// names a placeholder once its non-word characters are stripped. A name that
/// occurs twice keeps its first slot but takes the later index.
#[must_use]
pub fn extract_placeholders(template: &str) -> Placeholders {
    let mut entries: Vec<(Arc<str>, usize)> = Vec::new();

    for (idx, segment) in template.split('/').enumerate() {
        let Some(rest) = segment.strip_prefix(':') else {
            continue;
        };
        let name = word_chars(rest);
        if name.is_empty() {
            continue;
        }
        match entries.iter_mut().find(|(n, _)| n.as_ref() == name) {
            Some(slot) => slot.1 = idx,
            None => entries.push((Arc::from(name), idx)),
        }
    }

    Placeholders { entries }
}

/// Value bound to a parameter for one resolution
///
/// Serializes as `null`, a string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Optional placeholder whose segment is missing from the request
    Absent,
    /// A single path segment
    Segment(String),
    /// Trailing segments captured by a wildcard
    Sequence(Vec<String>),
}

impl ParamValue {
    /// The segment text, if this is a single segment
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Segment(s) => Some(s.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, ParamValue::Absent)
    }
}

/// Parameters bound for a single resolution attempt.
///
/// Named values keep template order. `extra` holds the request segments from
/// the first placeholder position onward, mirroring the positional view of the
/// same path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    values: SmallVec<[(Arc<str>, ParamValue); MAX_INLINE_PARAMS]>,
    extra: Vec<String>,
}

impl Params {
    /// Value bound to `name`
    #[inline]
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&ParamValue> {
        self.values
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v)
    }

    /// Segment bound to `name`; `None` when unbound, absent or a sequence
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.value(name).and_then(ParamValue::as_str)
    }

    /// Sequence bound to a wildcard name
    #[must_use]
    pub fn sequence(&self, name: &str) -> Option<&[String]> {
        match self.value(name) {
            Some(ParamValue::Sequence(items)) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// `true` when `name` is bound (including to an absent value)
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.value(name).is_some()
    }

    /// Iterate bound `(name, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_ref(), v))
    }

    /// Positional segments from the first placeholder onward
    #[must_use]
    pub fn extra(&self) -> &[String] {
        &self.extra
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.extra.is_empty()
    }

    /// Bind `name`, replacing an existing binding
    pub(crate) fn set(&mut self, name: Arc<str>, value: ParamValue) {
        match self.values.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name, value)),
        }
    }
}

/// Serializes as a name to value map; a rebound name keeps its last value.
impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (idx, (name, value)) in self.values.iter().enumerate() {
            if self.values[idx + 1..].iter().any(|(later, _)| later == name) {
                continue;
            }
            map.serialize_entry(name.as_ref(), value)?;
        }
        map.end()
    }
}

/// Bind placeholders and an optional wildcard against a normalized request path.
///
/// `prefix_len` is the byte length of the request prefix matched by the
/// compiled pattern; the wildcard captures the non-empty segments after it.
#[must_use]
pub fn bind_params(
    placeholders: &Placeholders,
    wildcard: Option<&Arc<str>>,
    path: &str,
    prefix_len: usize,
) -> Params {
    let segments: Vec<&str> = path.split('/').collect();
    let mut params = Params::default();

    for (name, idx) in &placeholders.entries {
        let value = match segments.get(*idx) {
            Some(seg) => ParamValue::Segment((*seg).to_string()),
            None => ParamValue::Absent,
        };
        params.values.push((Arc::clone(name), value));
    }

    if let Some(first) = placeholders.first_index() {
        params.extra = segments
            .iter()
            .skip(first)
            .map(|s| (*s).to_string())
            .collect();
    }

    if let Some(name) = wildcard {
        let tail = path.get(prefix_len..).unwrap_or_default();
        let items = tail
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        params.set(Arc::clone(name), ParamValue::Sequence(items));
    }

    params
}

/// A path template compiled for matching
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    template: String,
    pattern: String,
    matcher: Regex,
    placeholders: Placeholders,
}

impl CompiledPattern {
    /// Compile `template` (already prefixed and normalized).
    ///
    /// # Errors
    ///
    /// [`RouteError::InvalidPattern`] when the verbatim template text does not
    /// form a valid regex.
    pub fn new(template: &str) -> Result<Self, RouteError> {
        let pattern = compile_template(template);
        // Group 1 spans the matched prefix; placeholder groups nest inside it.
        let matcher = Regex::new(&format!("^({pattern})(?:/|$)")).map_err(|source| {
            RouteError::InvalidPattern {
                template: template.to_string(),
                source,
            }
        })?;

        Ok(Self {
            template: template.to_string(),
            placeholders: extract_placeholders(template),
            pattern,
            matcher,
        })
    }

    /// The uncompiled template
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The compiled pattern string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn placeholders(&self) -> &Placeholders {
        &self.placeholders
    }

    /// Length of the request prefix matched by the pattern.
    ///
    /// The prefix must be followed by `/` or the end of the path.
    #[must_use]
    pub fn match_prefix(&self, path: &str) -> Option<usize> {
        self.matcher
            .captures(path)
            .and_then(|caps| caps.get(1))
            .map(|m| m.end())
    }
}
