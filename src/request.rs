//! Request descriptor handed to [`RouteTable::resolve`](crate::router::RouteTable::resolve).

use std::borrow::Cow;

use http::Method;

use crate::pattern::normalize;

/// The parts of an incoming request routing cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Raw request URI (may carry a query string and percent-escapes)
    pub uri: String,
    pub method: Method,
    /// Host name without port; `None` never matches a domain-bound route
    pub host: Option<String>,
    /// Whether the request arrived over secure transport
    pub secure: bool,
}

impl RequestContext {
    #[must_use]
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            method,
            host: None,
            secure: false,
        }
    }

    /// Shorthand for a GET request
    #[must_use]
    pub fn get(uri: impl Into<String>) -> Self {
        Self::new(Method::GET, uri)
    }

    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    #[must_use]
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// The request path as matched against the table
    #[must_use]
    pub fn normalized_path(&self) -> String {
        normalize_uri(&self.uri)
    }
}

/// Strip the query component, percent-decode and drop any trailing slash.
///
/// The root path `/` is kept as-is.
///
/// ```
/// use switchyard::request::normalize_uri;
///
/// assert_eq!(normalize_uri("/api/users/?page=2"), "/api/users");
/// assert_eq!(normalize_uri("/caf%C3%A9"), "/café");
/// assert_eq!(normalize_uri("/"), "/");
/// ```
#[must_use]
pub fn normalize_uri(uri: &str) -> String {
    let path = match uri.split_once('?') {
        Some((path, _query)) => path,
        None => uri,
    };

    let decoded: Cow<'_, str> = match urlencoding::decode(path) {
        Ok(decoded) => decoded,
        Err(_) => {
            let bytes = urlencoding::decode_binary(path.as_bytes());
            Cow::Owned(String::from_utf8_lossy(&bytes).into_owned())
        }
    };

    normalize(&decoded).to_string()
}
