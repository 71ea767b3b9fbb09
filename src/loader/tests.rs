use http::Method;

use super::*;
use crate::error::RouteError;
use crate::request::RequestContext;
use crate::router::{Classification, RouteBuilder};

const ROUTES: &str = r#"<?xml version="1.0"?>
<routes>
  <route>
    <options>
      <middleware value="A"/>
    </options>
    <get path="/" call="Home::index">
      <options>
        <middleware value="add:B,add:C"/>
      </options>
    </get>
    <match method="get,post" path="/search" call="Search::run"/>
    <group prefix="/api">
      <options>
        <middleware value="add:E"/>
      </options>
      <on path="/user" call="Api::user">
        <options>
          <middleware value="del:A"/>
        </options>
      </on>
      <get path="/users/:id" call="Users::show">
        <options>
          <where>
            <id regexp="^\d+$" default="0"/>
          </where>
        </options>
      </get>
    </group>
    <domain host="admin\.example\.com">
      <options>
        <secure value="true"/>
      </options>
      <get path="/panel" call="Admin::panel"/>
    </domain>
  </route>
</routes>
"#;

fn load(source: &str) -> Result<RouteBuilder, RouteError> {
    let mut builder = RouteBuilder::new();
    load_str(source, "routes.xml", &mut builder)?;
    Ok(builder)
}

#[test]
fn test_document_registers_all_routes() {
    let builder = load(ROUTES).unwrap();
    assert_eq!(builder.len(), 5);
}

#[test]
fn test_options_are_layered() {
    let table = load(ROUTES).unwrap().build();

    let home = table.resolve(&RequestContext::get("/"));
    assert_eq!(home.route.handler_name(), Some("Home::index"));
    assert_eq!(home.route.middleware(), ["A", "B", "C"]);

    let user = table.resolve(&RequestContext::get("/api/user"));
    assert_eq!(user.route.middleware(), ["E"]);
}

#[test]
fn test_match_element_methods() {
    let table = load(ROUTES).unwrap().build();
    let post = table.resolve(&RequestContext::new(Method::POST, "/search"));
    assert_eq!(post.route.handler_name(), Some("Search::run"));
    let put = table.resolve(&RequestContext::new(Method::PUT, "/search"));
    assert_eq!(put.classification, Classification::NotFound);
}

#[test]
fn test_where_default_applies() {
    let table = load(ROUTES).unwrap().build();
    let resolution = table.resolve(&RequestContext::get("/api/users/abc"));
    assert!(resolution.is_match());
    assert_eq!(resolution.route.params.get("id"), Some("0"));
}

#[test]
fn test_domain_options() {
    let table = load(ROUTES).unwrap().build();

    let plain = table.resolve(&RequestContext::get("/panel").host("admin.example.com"));
    assert_eq!(plain.classification, Classification::Secure);

    let secure = table.resolve(
        &RequestContext::get("/panel")
            .host("admin.example.com")
            .secure(true),
    );
    assert_eq!(secure.route.handler_name(), Some("Admin::panel"));
}

#[test]
fn test_malformed_xml_reports_position() {
    let err = load("<routes>\n  <route>\n    <get path=\"/\" call=\"A::b\">\n</routes>").err().unwrap();
    match err {
        RouteError::Parse { file, line, .. } => {
            assert_eq!(file, "routes.xml");
            assert_eq!(line, 4);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_unknown_route_element() {
    let err = load("<routes>\n<route>\n  <fetch path=\"/\" call=\"A::b\"/>\n</route>\n</routes>")
        .err()
        .unwrap();
    match err {
        RouteError::Parse {
            line,
            column,
            message,
            ..
        } => {
            assert_eq!((line, column), (3, 3));
            assert!(message.contains("<fetch>"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_missing_attribute() {
    let err = load("<routes><route><get call=\"A::b\"/></route></routes>")
        .err()
        .unwrap();
    assert!(err.to_string().contains("'path'"));
}

#[test]
fn test_invalid_list_entry() {
    let source = r#"<routes><route>
        <get path="/" call="A::b"><options><middleware value="push:x"/></options></get>
    </route></routes>"#;
    assert!(matches!(
        load(source),
        Err(RouteError::InvalidListEntry { .. })
    ));
}

#[test]
fn test_duplicate_route_in_document() {
    let source = r#"<routes><route>
        <get path="/a" call="A::one"/>
        <get path="/a/" call="A::two"/>
    </route></routes>"#;
    assert!(matches!(
        load(source),
        Err(RouteError::DuplicateRoute { .. })
    ));
}

#[test]
fn test_document_without_route_section() {
    let builder = load("<routes/>").unwrap();
    assert!(builder.is_empty());
}

#[test]
fn test_load_file_missing() {
    let mut builder = RouteBuilder::new();
    let err = load_file("/definitely/not/here.xml", &mut builder)
        .err()
        .unwrap();
    assert!(matches!(err, RouteError::Io { .. }));
}
