mod common;

use common::fixtures::SHOP_ROUTES;
use common::temp_files::create_temp_xml;
use http::Method;
use switchyard::router::{Classification, RouteBuilder};
use switchyard::{load_file, RequestContext, RouteError};

fn shop_builder() -> RouteBuilder {
    let file = create_temp_xml(SHOP_ROUTES);
    let mut builder = RouteBuilder::new();
    builder.register_actions(
        "Addresses",
        ["index", "create", "store", "show", "edit", "update", "destroy"],
    );
    builder.register_actions("Search", ["products", "brands"]);
    load_file(file.path(), &mut builder).unwrap();
    builder
}

#[test]
fn test_loads_every_route() {
    // 2 plain + orders + 7 resource + controller + domain route
    assert_eq!(shop_builder().len(), 12);
}

#[test]
fn test_optional_variant_default() {
    let table = shop_builder().build();

    let plain = table.resolve(&RequestContext::get("/products/teapot"));
    assert_eq!(plain.route.handler_name(), Some("Products::show"));
    assert_eq!(plain.route.params.get("variant"), Some("standard"));

    let red = table.resolve(&RequestContext::get("/products/teapot/red"));
    assert_eq!(red.route.params.get("variant"), Some("red"));
}

#[test]
fn test_secure_group_with_resource() {
    let table = shop_builder().build();

    let insecure = table.resolve(&RequestContext::get("/account/orders"));
    assert_eq!(insecure.classification, Classification::Secure);

    let update = table.resolve(&RequestContext::new(Method::PUT, "/account/addresses/5").secure(true));
    assert_eq!(update.route.handler_name(), Some("Addresses::update"));
    assert_eq!(update.route.params.get("id"), Some("5"));
    assert_eq!(update.route.middleware(), ["session", "csrf", "auth"]);
}

#[test]
fn test_controller_group_clears_middleware() {
    let table = shop_builder().build();

    let search = table.resolve(&RequestContext::get("/api/search/brands"));
    assert_eq!(search.route.handler_name(), Some("Search::brands"));
    assert_eq!(search.route.middleware(), ["api_key"]);

    let unknown = table.resolve(&RequestContext::get("/api/search/stores"));
    assert_eq!(unknown.classification, Classification::ControllerResolve);
}

#[test]
fn test_domain_routes_need_matching_host() {
    let table = shop_builder().build();

    let hit = table.resolve(&RequestContext::get("/assets").host("static.shop.test"));
    assert_eq!(hit.route.handler_name(), Some("Assets::serve"));

    let miss = table.resolve(&RequestContext::get("/assets").host("shop.test"));
    assert_eq!(miss.classification, Classification::NotFound);
}

#[test]
fn test_parse_error_names_file() {
    let file = create_temp_xml("<routes>\n  <route>\n");
    let mut builder = RouteBuilder::new();
    let err = load_file(file.path(), &mut builder).err().unwrap();

    match &err {
        RouteError::Parse { file: name, line, .. } => {
            assert_eq!(name, &file.path().display().to_string());
            assert!(*line >= 2);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().starts_with("error while parsing "));
}
