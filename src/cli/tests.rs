//! Unit tests for CLI commands

use std::io::Write as _;

use clap::Parser;
use tempfile::NamedTempFile;

use crate::cli::{execute, Cli, Commands};
use crate::config::RouterConfig;

const ROUTES: &str = r#"<routes>
  <route>
    <options><middleware value="session"/></options>
    <get path="/users/:id" call="Users::show"/>
    <controller path="/admin" call="Admin"/>
  </route>
</routes>"#;

fn routes_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(ROUTES.as_bytes()).unwrap();
    file
}

fn run(args: &[&str]) -> String {
    let cli = Cli::try_parse_from(args).unwrap();
    let mut out = Vec::new();
    execute(&cli, &RouterConfig::default(), &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_inspect_command_parses() {
    let cli = Cli::try_parse_from(["switchyard", "inspect", "--routes", "r.xml", "--json"]).unwrap();
    match cli.command {
        Commands::Inspect { routes, json, .. } => {
            assert_eq!(routes.to_string_lossy(), "r.xml");
            assert!(json);
        }
        _ => panic!("Expected Inspect command"),
    }
}

#[test]
fn test_resolve_command_defaults() {
    let cli = Cli::try_parse_from(["switchyard", "resolve", "--routes", "r.xml", "--path", "/"]).unwrap();
    match cli.command {
        Commands::Resolve {
            method,
            host,
            secure,
            actions,
            ..
        } => {
            assert_eq!(method, "GET");
            assert_eq!(host, None);
            assert!(!secure);
            assert!(actions.is_empty());
        }
        _ => panic!("Expected Resolve command"),
    }
}

#[test]
fn test_resolve_requires_path() {
    assert!(Cli::try_parse_from(["switchyard", "resolve", "--routes", "r.xml"]).is_err());
}

#[test]
fn test_inspect_text_output() {
    let file = routes_file();
    let path = file.path().to_string_lossy().to_string();
    let output = run(&["switchyard", "inspect", "--routes", &path]);

    assert!(output.starts_with("[routes] count=2\n"));
    assert!(output.contains("Users::show"));
    assert!(output.contains("[fallback]"));
}

#[test]
fn test_inspect_json_output() {
    let file = routes_file();
    let path = file.path().to_string_lossy().to_string();
    let output = run(&["switchyard", "inspect", "--routes", &path, "--json"]);

    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    let routes = value["routes"].as_array().unwrap();
    assert_eq!(routes.len(), 2);
    assert_eq!(routes[0]["kind"], "plain");
    assert_eq!(routes[0]["middleware"][0], "session");
}

#[test]
fn test_resolve_text_output() {
    let file = routes_file();
    let path = file.path().to_string_lossy().to_string();
    let output = run(&["switchyard", "resolve", "--routes", &path, "--path", "/users/42"]);

    assert!(output.contains("classification: none (0)"));
    assert!(output.contains("handler: Users::show"));
    assert!(output.contains("  id = 42"));
    assert!(output.contains("middleware: [session]"));
}

#[test]
fn test_resolve_json_with_actions() {
    let file = routes_file();
    let path = file.path().to_string_lossy().to_string();
    let output = run(&[
        "switchyard",
        "resolve",
        "--routes",
        &path,
        "--path",
        "/admin/stats",
        "--actions",
        "Admin=stats,users",
        "--json",
    ]);

    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["classification"], "none");
    assert_eq!(value["handler"], "Admin::stats");
}

#[test]
fn test_resolve_not_found_json() {
    let file = routes_file();
    let path = file.path().to_string_lossy().to_string();
    let output = run(&["switchyard", "resolve", "--routes", &path, "--path", "/nope", "--json"]);

    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["classification"], "not_found");
    assert_eq!(value["code"], 1);
    assert!(value["route"].is_null());
    assert_eq!(value["middleware"][0], "session");
}

#[test]
fn test_invalid_method_is_an_error() {
    let file = routes_file();
    let path = file.path().to_string_lossy().to_string();
    let cli = Cli::try_parse_from([
        "switchyard", "resolve", "--routes", &path, "--path", "/", "--method", "BAD METHOD",
    ])
    .unwrap();
    let mut out = Vec::new();
    assert!(execute(&cli, &RouterConfig::default(), &mut out).is_err());
}
