use std::sync::Arc;
use std::thread;

use http::Method;
use switchyard::options::OptionFragment;
use switchyard::pattern::ParamValue;
use switchyard::router::{Classification, RouteBuilder, RouteTable};
use switchyard::{RequestContext, RouteError};

fn fragment() -> OptionFragment {
    OptionFragment::new()
}

fn blog_table() -> RouteTable {
    let mut builder = RouteBuilder::new();
    builder.globals(fragment().middleware(["A"]).unwrap());
    builder
        .get("/posts/:year/:slug", "Posts::show")
        .unwrap()
        .constraint("year", r"^\d{4}$", None)
        .unwrap();
    builder
        .get("/archive(/:page)", "Posts::archive")
        .unwrap()
        .constraint("page", r"^\d+$", Some("1"))
        .unwrap();
    builder
        .get("/files", "Files::serve")
        .unwrap()
        .wildcard("tail")
        .unwrap();
    builder
        .group("/admin", fragment().secure(true).middleware(["add:B", "add:C"]).unwrap(), |admin| {
            admin.get("/dashboard", "Admin::dashboard")?;
            admin.group("/tools", fragment().middleware(["del:A"]).unwrap(), |tools| {
                tools.get("/cache", "Tools::cache")?;
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();
    builder
        .get("/reset", "Account::reset")
        .unwrap()
        .without_any_middleware()
        .with_middleware(["D"]);
    builder.otherwise("Errors::notFound", fragment().middleware(["add:F"]).unwrap());
    builder.build()
}

#[test]
fn test_mandatory_placeholders_bind_segments() {
    let table = blog_table();
    let resolution = table.resolve(&RequestContext::get("/posts/2024/hello_world"));
    assert!(resolution.is_match());
    assert_eq!(resolution.route.params.get("year"), Some("2024"));
    assert_eq!(resolution.route.params.get("slug"), Some("hello_world"));
}

#[test]
fn test_optional_placeholder_absent_and_present() {
    let table = blog_table();

    let first = table.resolve(&RequestContext::get("/archive"));
    assert!(first.is_match());
    assert_eq!(first.route.params.get("page"), Some("1"));

    let third = table.resolve(&RequestContext::get("/archive/3"));
    assert_eq!(third.route.params.get("page"), Some("3"));

    let bad = table.resolve(&RequestContext::get("/archive/last"));
    assert_eq!(bad.route.params.get("page"), Some("1"));
}

#[test]
fn test_constraint_without_default_classifies() {
    let table = blog_table();
    let resolution = table.resolve(&RequestContext::get("/posts/24/hello"));
    assert_eq!(resolution.classification, Classification::WhereRegex);
    assert_eq!(resolution.route.handler_name(), Some("Errors::notFound"));
}

#[test]
fn test_wildcard_sequence() {
    let table = blog_table();

    let deep = table.resolve(&RequestContext::get("/files/css/site.css"));
    assert_eq!(
        deep.route.params.value("tail"),
        Some(&ParamValue::Sequence(vec!["css".into(), "site.css".into()]))
    );

    let empty = table.resolve(&RequestContext::get("/files/"));
    assert_eq!(empty.route.params.sequence("tail").map(<[String]>::len), Some(0));
}

#[test]
fn test_middleware_layers() {
    let table = blog_table();
    let secure = |path: &str| table.resolve(&RequestContext::get(path).secure(true));

    assert_eq!(secure("/admin/dashboard").route.middleware(), ["A", "B", "C"]);
    assert_eq!(secure("/admin/tools/cache").route.middleware(), ["B", "C"]);
    assert_eq!(secure("/reset").route.middleware(), ["D"]);
    assert_eq!(secure("/posts/2024/x").route.middleware(), ["A"]);
}

#[test]
fn test_secure_scope_requires_secure_transport() {
    let table = blog_table();
    let resolution = table.resolve(&RequestContext::get("/admin/dashboard"));
    assert_eq!(resolution.classification, Classification::Secure);
    assert_eq!(resolution.route.middleware(), ["A", "F"]);
}

#[test]
fn test_not_found_carries_fallback_middleware() {
    let table = blog_table();
    let resolution = table.resolve(&RequestContext::new(Method::DELETE, "/posts/2024/x"));
    assert_eq!(resolution.classification, Classification::NotFound);
    assert!(resolution.route.route.is_fallback());
    assert_eq!(resolution.route.middleware(), ["A", "F"]);
}

#[test]
fn test_duplicate_registration_is_fatal() {
    let mut builder = RouteBuilder::new();
    builder.on("/status", "Status::show").unwrap();
    let err = builder.get("/status/", "Status::other").err().unwrap();
    assert!(matches!(err, RouteError::DuplicateRoute { .. }));
    assert_eq!(err.to_string(), "route /status already exists");
}

#[test]
fn test_table_is_shareable_across_threads() {
    let table = Arc::new(blog_table());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let table = Arc::clone(&table);
            thread::spawn(move || {
                let path = format!("/posts/202{i}/entry");
                let ok = table.resolve(&RequestContext::get(path));
                let denied = table.resolve(&RequestContext::get("/admin/dashboard"));
                (ok.classification, denied.classification)
            })
        })
        .collect();

    for handle in handles {
        let (ok, denied) = handle.join().unwrap();
        assert_eq!(ok, Classification::None);
        assert_eq!(denied, Classification::Secure);
    }
}

#[test]
fn test_auth_sees_bound_params() {
    let mut builder = RouteBuilder::new();
    builder
        .get("/teams/:team/members", "Teams::members")
        .unwrap()
        .auth(|req| req.params.get("team") == req.request.host.as_deref());
    let table = builder.build();

    let allowed = table.resolve(&RequestContext::get("/teams/red/members").host("red"));
    assert!(allowed.is_match());

    let denied = table.resolve(&RequestContext::get("/teams/red/members").host("blue"));
    assert_eq!(denied.classification, Classification::Auth);
}

#[test]
fn test_config_drives_defaults() {
    let config = switchyard::RouterConfig::from_yaml(
        "resource_id_param: key\ndefault_methods: [get]\n",
    )
    .unwrap();
    let mut builder = RouteBuilder::new().with_config(&config);
    builder.on("/ping", "Health::ping").unwrap();
    builder.register_actions("Keys", ["show"]);
    builder.resource("/keys", "Keys", fragment()).unwrap();
    let table = builder.build();

    let post = table.resolve(&RequestContext::new(Method::POST, "/ping"));
    assert_eq!(post.classification, Classification::NotFound);

    let show = table.resolve(&RequestContext::get("/keys/abc"));
    assert_eq!(show.route.params.get("key"), Some("abc"));
}
