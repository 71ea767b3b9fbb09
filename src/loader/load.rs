use std::path::Path;

use roxmltree::{Document, Node};
use tracing::{debug, info};

use crate::error::{Result, RouteError};
use crate::options::OptionFragment;
use crate::router::RouteBuilder;

/// Elements that bind exactly one HTTP method
const VERBS: [&str; 6] = ["get", "post", "put", "delete", "patch", "head"];

/// Read `path` and register its routes on `builder`.
///
/// # Errors
///
/// [`RouteError::Io`] when the file cannot be read, [`RouteError::Parse`] for
/// malformed documents, or any registration error raised by the builder.
pub fn load_file(path: impl AsRef<Path>, builder: &mut RouteBuilder) -> Result<()> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|source| RouteError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_str(&source, &path.display().to_string(), builder)
}

/// Register the routes of an in-memory document; `file` names it in errors.
///
/// # Errors
///
/// See [`load_file`].
pub fn load_str(source: &str, file: &str, builder: &mut RouteBuilder) -> Result<()> {
    let doc = Document::parse(source).map_err(|err| {
        let pos = err.pos();
        RouteError::parse(file, pos.row, pos.col, err.to_string())
    })?;

    let before = builder.len();
    let Some(routes) = doc
        .root_element()
        .children()
        .find(|n| n.has_tag_name("route"))
    else {
        debug!(file, "Route document has no <route> section");
        return Ok(());
    };

    for node in routes.children().filter(Node::is_element) {
        match node.tag_name().name() {
            "options" => {
                builder.globals(parse_options(node, file)?);
            }
            "group" => load_group(node, file, builder)?,
            "domain" => load_domain(node, file, builder)?,
            _ => load_route(node, file, builder)?,
        }
    }

    info!(
        file,
        routes_added = builder.len() - before,
        "Loaded route document"
    );
    Ok(())
}

/// Children of a `<group>` or `<domain>`; `<options>` were already consumed
fn load_children(parent: Node<'_, '_>, file: &str, builder: &mut RouteBuilder) -> Result<()> {
    for node in parent.children().filter(Node::is_element) {
        match node.tag_name().name() {
            "options" => {}
            "group" => load_group(node, file, builder)?,
            "domain" => load_domain(node, file, builder)?,
            _ => load_route(node, file, builder)?,
        }
    }
    Ok(())
}

fn load_group(node: Node<'_, '_>, file: &str, builder: &mut RouteBuilder) -> Result<()> {
    let prefix = node.attribute("prefix").unwrap_or_default();
    let options = scope_options(node, file)?;
    builder.group(prefix, options, |group| load_children(node, file, group))?;
    Ok(())
}

fn load_domain(node: Node<'_, '_>, file: &str, builder: &mut RouteBuilder) -> Result<()> {
    let host = required(node, "host", file)?;
    let options = scope_options(node, file)?;
    builder.domain(host, options, |domain| load_children(node, file, domain))?;
    Ok(())
}

fn load_route(node: Node<'_, '_>, file: &str, builder: &mut RouteBuilder) -> Result<()> {
    let tag = node.tag_name().name();
    let path = required(node, "path", file)?;
    let call = required(node, "call", file)?;
    let options = scope_options(node, file)?;

    match tag {
        verb if VERBS.contains(&verb) => {
            builder.match_methods(&[verb], path, call, options)?;
        }
        "match" => {
            let methods: Vec<&str> = required(node, "method", file)?
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .collect();
            builder.match_methods(methods.as_slice(), path, call, options)?;
        }
        "on" => {
            builder.bind(path, call, options)?;
        }
        "controller" => {
            builder.controller(path, call, options)?;
        }
        "resource" => {
            builder.resource(path, call, options)?;
        }
        other => {
            return Err(error_at(node, file, format!("unknown route element <{other}>")));
        }
    }
    Ok(())
}

/// The `<options>` child of a scope or route element, if any
fn scope_options(node: Node<'_, '_>, file: &str) -> Result<OptionFragment> {
    match node.children().find(|n| n.has_tag_name("options")) {
        Some(options) => parse_options(options, file),
        None => Ok(OptionFragment::new()),
    }
}

/// Translate an `<options>` block into a fragment.
///
/// ```xml
/// <options>
///   <secure value="true"/>
///   <method value="GET,add:HEAD"/>
///   <middleware value="add:auth,del:cache"/>
///   <where>
///     <id regexp="^\d+$" default="1"/>
///   </where>
/// </options>
/// ```
fn parse_options(node: Node<'_, '_>, file: &str) -> Result<OptionFragment> {
    let mut fragment = OptionFragment::new();

    for option in node.children().filter(Node::is_element) {
        match option.tag_name().name() {
            "secure" => {
                fragment = fragment.secure(option.attribute("value") == Some("true"));
            }
            "method" => {
                fragment = fragment.methods(split_list(option))?;
            }
            "middleware" => {
                fragment = fragment.middleware(split_list(option))?;
            }
            "where" => {
                for param in option.children().filter(Node::is_element) {
                    let name = param.tag_name().name();
                    let regexp = required(param, "regexp", file)?;
                    fragment = fragment.constraint(name, regexp, param.attribute("default"))?;
                }
            }
            other => {
                return Err(error_at(option, file, format!("unknown option <{other}>")));
            }
        }
    }

    Ok(fragment)
}

fn split_list<'a>(node: Node<'a, '_>) -> impl Iterator<Item = &'a str> {
    node.attribute("value").unwrap_or_default().split(',')
}

fn required<'a>(node: Node<'a, '_>, attribute: &str, file: &str) -> Result<&'a str> {
    node.attribute(attribute).ok_or_else(|| {
        error_at(
            node,
            file,
            format!(
                "<{}> is missing the '{attribute}' attribute",
                node.tag_name().name()
            ),
        )
    })
}

fn error_at(node: Node<'_, '_>, file: &str, message: String) -> RouteError {
    let pos = node.document().text_pos_at(node.range().start);
    RouteError::parse(file, pos.row, pos.col, message)
}
