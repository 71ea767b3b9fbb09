//! The per-candidate check pipeline.
//!
//! Order: path, domain, secure, controller action, resource action, parameter
//! binding, constraints, authorization. Path and domain mismatches are skips;
//! everything after them terminates the scan with a classification.

use std::sync::Arc;

use tracing::debug;

use super::core::{Classification, HandlerRef, Route, RouteMatch};
use crate::options::AuthRequest;
use crate::pattern::{bind_params, word_chars, ParamValue, Params};
use crate::registry::ActionRegistry;
use crate::request::RequestContext;

/// Outcome of running one candidate through the pipeline
#[derive(Debug)]
pub(crate) enum Verdict {
    /// Try the next candidate
    Skip,
    /// Stop scanning and return the fallback
    Fail(Classification),
    /// Resolution result
    Pass(RouteMatch),
}

pub(crate) fn evaluate(
    route: &Arc<Route>,
    request: &RequestContext,
    path: &str,
    actions: &ActionRegistry,
) -> Verdict {
    let Some(pattern) = route.pattern.as_ref() else {
        return Verdict::Skip;
    };
    let Some(prefix_len) = pattern.match_prefix(path) else {
        return Verdict::Skip;
    };

    if !check_domain(route, request.host.as_deref()) {
        debug!(route_key = %route.key, host = ?request.host, "Domain mismatch");
        return Verdict::Skip;
    }

    if !check_secure(route, request.secure) {
        return Verdict::Fail(Classification::Secure);
    }

    let mut handler = route.handler.clone();

    if route.is_controller() {
        match resolve_controller_action(route, path, prefix_len, actions) {
            Some(rewritten) => handler = Some(rewritten),
            None => return Verdict::Fail(Classification::ControllerResolve),
        }
    }

    if route.is_resource() && !check_rest(route, actions) {
        return Verdict::Fail(Classification::RestResolve);
    }

    let mut params = bind_params(
        pattern.placeholders(),
        route.wildcard.as_ref(),
        path,
        prefix_len,
    );

    if !apply_constraints(route, &mut params) {
        return Verdict::Fail(Classification::WhereRegex);
    }

    let auth_request = AuthRequest {
        route,
        handler: handler.as_ref(),
        params: &params,
        request,
    };
    if !check_auth(route, &auth_request) {
        return Verdict::Fail(Classification::Auth);
    }

    Verdict::Pass(RouteMatch {
        route: Arc::clone(route),
        handler,
        params,
    })
}

/// Anchored host match; routes without a domain accept any host
fn check_domain(route: &Route, host: Option<&str>) -> bool {
    match (&route.domain_matcher, host) {
        (None, _) => true,
        (Some(matcher), Some(host)) => matcher.is_match(host),
        (Some(_), None) => false,
    }
}

fn check_secure(route: &Route, secure: bool) -> bool {
    !route.secure() || secure
}

/// The first segment after the prefix, reduced to word characters, must name
/// a registered action of the route's handler.
fn resolve_controller_action(
    route: &Route,
    path: &str,
    prefix_len: usize,
    actions: &ActionRegistry,
) -> Option<HandlerRef> {
    let handler = route.handler.as_ref()?;
    let slice = path.get(prefix_len..)?;
    let segment = slice.split('/').find(|s| !s.is_empty())?;
    let action = word_chars(segment);
    if action.is_empty() {
        return None;
    }

    if !actions.has_action(handler.as_str(), &action) {
        debug!(handler = %handler, action = %action, "Controller action not registered");
        return None;
    }

    Some(handler.with_action(&action))
}

fn check_rest(route: &Route, actions: &ActionRegistry) -> bool {
    route
        .rest_action
        .as_ref()
        .is_some_and(|(handler_id, action)| actions.has_action(handler_id.as_str(), action))
}

/// Validate bound segments; a rejected value takes the constraint default.
///
/// Absent optional values are validated as the empty string. Wildcard
/// sequences are not constrained.
fn apply_constraints(route: &Route, params: &mut Params) -> bool {
    let constraints = route.constraints();
    if constraints.is_empty() {
        return true;
    }

    let mut substitutions = Vec::new();
    for (name, value) in params.iter() {
        let Some(constraint) = constraints.get(name) else {
            continue;
        };
        let text = match value {
            ParamValue::Segment(s) => s.as_str(),
            ParamValue::Absent => "",
            ParamValue::Sequence(_) => continue,
        };
        if constraint.is_satisfied_by(text) {
            continue;
        }
        match constraint.default_value() {
            Some(default) => substitutions.push((Arc::<str>::from(name), default.to_string())),
            None => {
                debug!(
                    param = %name,
                    value = %text,
                    regexp = %constraint.as_str(),
                    "Constraint rejected parameter"
                );
                return false;
            }
        }
    }

    for (name, default) in substitutions {
        params.set(name, ParamValue::Segment(default));
    }
    true
}

/// Every predicate in the chain must pass
fn check_auth(route: &Route, request: &AuthRequest<'_>) -> bool {
    route.auth_chain().iter().all(|predicate| predicate(request))
}
