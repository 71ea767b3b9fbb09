mod common;

use std::process::Command;

use common::fixtures::SHOP_ROUTES;
use common::temp_files::{create_temp_xml, create_temp_yaml};

fn switchyard() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_switchyard"));
    command.env("SWITCHYARD_LOG_LEVEL", "error").env_remove("RUST_LOG");
    command
}

#[test]
fn test_cli_inspect_lists_routes() {
    let routes = create_temp_xml(SHOP_ROUTES);
    let output = switchyard()
        .arg("inspect")
        .arg("--routes")
        .arg(routes.path())
        .output()
        .expect("run cli");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("[routes] count=12"));
    assert!(stdout.contains("Orders::index"));
}

#[test]
fn test_cli_resolve_json() {
    let routes = create_temp_xml(SHOP_ROUTES);
    let output = switchyard()
        .args(["resolve", "--json", "--secure", "--path", "/account/orders?page=2"])
        .arg("--routes")
        .arg(routes.path())
        .output()
        .expect("run cli");

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["handler"], "Orders::index");
    assert_eq!(value["classification"], "none");
}

#[test]
fn test_cli_resolve_with_config() {
    let routes = create_temp_xml(
        r#"<routes><route><resource path="/photos" call="Photos"/></route></routes>"#,
    );
    let config = create_temp_yaml("resource_id_param: photo\n");
    let output = switchyard()
        .args(["resolve", "--json", "--path", "/photos/3", "--actions", "Photos=show"])
        .arg("--routes")
        .arg(routes.path())
        .arg("--config")
        .arg(config.path())
        .output()
        .expect("run cli");

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["params"]["photo"], "3");
}

#[test]
fn test_cli_missing_routes_file_fails() {
    let output = switchyard()
        .args(["inspect", "--routes", "/definitely/not/here.xml"])
        .output()
        .expect("run cli");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load routes"));
}
