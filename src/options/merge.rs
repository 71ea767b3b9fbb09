use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::fragment::{AuthPredicate, Constraint, ListEntry, OptionFragment};

/// Effective configuration after folding a fragment stack
#[derive(Clone, Default)]
pub struct EffectiveOptions {
    pub secure: bool,
    pub constraints: Arc<BTreeMap<String, Constraint>>,
    /// Upper-cased method names in merge order
    pub methods: Vec<String>,
    /// Middleware identifiers in application order
    pub middleware: Vec<String>,
    pub auth: Vec<AuthPredicate>,
}

impl fmt::Debug for EffectiveOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectiveOptions")
            .field("secure", &self.secure)
            .field("constraints", &self.constraints)
            .field("methods", &self.methods)
            .field("middleware", &self.middleware)
            .field("auth", &format_args!("<{} predicate(s)>", self.auth.len()))
            .finish()
    }
}

/// Fold fragments, outermost first, into one effective configuration.
///
/// - `secure` and `constraints` are overwritten by every fragment that sets them
/// - `methods` and `middleware` follow the list algebra of [`apply_list`]
/// - `auth` predicates accumulate in fragment order
pub fn merge_fragments<'a, I>(fragments: I) -> EffectiveOptions
where
    I: IntoIterator<Item = &'a OptionFragment>,
{
    let mut secure = false;
    let mut constraints: Option<&BTreeMap<String, Constraint>> = None;
    let mut methods = Vec::new();
    let mut middleware = Vec::new();
    let mut auth = Vec::new();

    for fragment in fragments {
        if let Some(flag) = fragment.secure {
            secure = flag;
        }
        if let Some(map) = &fragment.constraints {
            constraints = Some(map);
        }
        if let Some(entries) = &fragment.methods {
            apply_list(&mut methods, entries);
        }
        if let Some(entries) = &fragment.middleware {
            apply_list(&mut middleware, entries);
        }
        auth.extend(fragment.auth.iter().map(Arc::clone));
    }

    EffectiveOptions {
        secure,
        constraints: Arc::new(constraints.cloned().unwrap_or_default()),
        methods,
        middleware,
        auth,
    }
}

/// Apply one fragment's entries to an accumulated list.
///
/// If the fragment holds any literal, the accumulated list becomes exactly
/// those literals and the fragment's operations are dropped. Otherwise the
/// operations run in order; `clear` empties the list at the point it appears.
pub fn apply_list(acc: &mut Vec<String>, entries: &[ListEntry]) {
    if entries.iter().any(ListEntry::is_literal) {
        *acc = entries
            .iter()
            .filter_map(|e| match e {
                ListEntry::Literal(s) => Some(s.clone()),
                _ => None,
            })
            .collect();
        return;
    }

    for entry in entries {
        match entry {
            ListEntry::Add(item) => acc.push(item.clone()),
            ListEntry::Del(item) => acc.retain(|m| m != item),
            ListEntry::Clear => acc.clear(),
            ListEntry::Literal(_) => {}
        }
    }
}
