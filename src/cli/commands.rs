use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use http::Method;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::RouterConfig;
use crate::loader::load_file;
use crate::logging::init_logging;
use crate::pattern::ParamValue;
use crate::request::RequestContext;
use crate::router::{Resolution, RouteBuilder, RouteTable};

/// Command-line interface for switchyard
///
/// Loads an XML route document and either lists the compiled table or
/// resolves a single request against it.
#[derive(Parser)]
#[command(name = "switchyard")]
#[command(about = "Inspect route documents and resolve requests against them", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Print the compiled routing table in scan order
    Inspect {
        /// Path to the XML route document
        #[arg(short, long)]
        routes: PathBuf,

        /// Optional YAML configuration file
        #[arg(short, long, env = "SWITCHYARD_CONFIG")]
        config: Option<PathBuf>,

        /// Controller actions as `Handler=action1,action2` (repeatable)
        #[arg(long = "actions", value_name = "HANDLER=ACTIONS")]
        actions: Vec<String>,

        /// Emit JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Resolve one request and print the outcome
    Resolve {
        /// Path to the XML route document
        #[arg(short, long)]
        routes: PathBuf,

        /// Request URI (query string allowed)
        #[arg(short, long)]
        path: String,

        /// HTTP method
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Request host
        #[arg(long)]
        host: Option<String>,

        /// Treat the request as arriving over secure transport
        #[arg(long, default_value_t = false)]
        secure: bool,

        /// Optional YAML configuration file
        #[arg(short, long, env = "SWITCHYARD_CONFIG")]
        config: Option<PathBuf>,

        /// Controller actions as `Handler=action1,action2` (repeatable)
        #[arg(long = "actions", value_name = "HANDLER=ACTIONS")]
        actions: Vec<String>,

        /// Emit JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

impl Commands {
    fn config_path(&self) -> Option<&Path> {
        match self {
            Commands::Inspect { config, .. } | Commands::Resolve { config, .. } => {
                config.as_deref()
            }
        }
    }
}

/// Parse the process arguments, initialise logging and run the command
///
/// # Errors
///
/// Any configuration, document or I/O error, with context.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.command.config_path())?;
    init_logging(&config.log)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(&cli, &config, &mut out)
}

/// Run `cli` with an already loaded configuration, writing to `out`
///
/// # Errors
///
/// Any document, argument or I/O error, with context.
pub fn execute(cli: &Cli, config: &RouterConfig, out: &mut impl Write) -> Result<()> {
    match &cli.command {
        Commands::Inspect {
            routes,
            actions,
            json,
            ..
        } => {
            let table = build_table(routes, actions, config)?;
            if *json {
                writeln!(out, "{}", serde_json::to_string_pretty(&table_json(&table))?)?;
            } else {
                write!(out, "{}", table.dump())?;
            }
        }
        Commands::Resolve {
            routes,
            path,
            method,
            host,
            secure,
            actions,
            json,
            ..
        } => {
            let table = build_table(routes, actions, config)?;
            let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
                .with_context(|| format!("Invalid HTTP method {method:?}"))?;

            let mut request = RequestContext::new(method, path.as_str()).secure(*secure);
            if let Some(host) = host {
                request = request.host(host.as_str());
            }

            let resolution = table.resolve(&request);
            if *json {
                writeln!(
                    out,
                    "{}",
                    serde_json::to_string_pretty(&resolution_json(&resolution))?
                )?;
            } else {
                write_resolution(out, &resolution)?;
            }
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<RouterConfig> {
    let config = match path {
        Some(path) => RouterConfig::load(path)?,
        None => RouterConfig::default(),
    };
    Ok(config.apply_env())
}

fn build_table(routes: &Path, actions: &[String], config: &RouterConfig) -> Result<RouteTable> {
    let mut builder = RouteBuilder::new().with_config(config);
    for spec in actions {
        let (handler, list) = spec
            .split_once('=')
            .ok_or_else(|| anyhow!("Invalid --actions value {spec:?}, expected HANDLER=a,b"))?;
        builder.register_actions(
            handler.trim(),
            list.split(',').map(str::trim).filter(|a| !a.is_empty()),
        );
    }

    load_file(routes, &mut builder)
        .with_context(|| format!("Failed to load routes from {}", routes.display()))?;
    debug!(routes = builder.len(), "Route document loaded");
    Ok(builder.build())
}

fn table_json(table: &RouteTable) -> Value {
    let routes: Vec<Value> = table
        .routes()
        .map(|route| {
            json!({
                "key": route.key(),
                "template": route.template(),
                "methods": route.methods().iter().map(Method::as_str).collect::<Vec<_>>(),
                "handler": route.handler().map(|h| h.as_str()),
                "kind": route.kind(),
                "domain": route.domain(),
                "secure": route.secure(),
                "wildcard": route.wildcard(),
                "middleware": route.middleware(),
            })
        })
        .collect();

    let fallback = table.fallback();
    json!({
        "routes": routes,
        "fallback": {
            "handler": fallback.handler().map(|h| h.as_str()),
            "middleware": fallback.middleware(),
        },
    })
}

fn resolution_json(resolution: &Resolution) -> Value {
    let matched = &resolution.route;
    json!({
        "classification": resolution.classification,
        "code": resolution.classification.code(),
        "handler": matched.handler_name(),
        "route": (!matched.route.is_fallback()).then(|| matched.route.key()),
        "params": &matched.params,
        "extra": matched.params.extra(),
        "middleware": matched.middleware(),
    })
}

fn write_resolution(out: &mut impl Write, resolution: &Resolution) -> Result<()> {
    let matched = &resolution.route;
    writeln!(
        out,
        "classification: {} ({})",
        resolution.classification,
        resolution.classification.code()
    )?;
    writeln!(out, "handler: {}", matched.handler_name().unwrap_or("-"))?;
    if !matched.route.is_fallback() {
        writeln!(out, "route: {}", matched.route.key())?;
    }
    if !matched.params.is_empty() {
        writeln!(out, "params:")?;
        for (name, value) in matched.params.iter() {
            match value {
                ParamValue::Absent => writeln!(out, "  {name} = <absent>")?,
                ParamValue::Segment(s) => writeln!(out, "  {name} = {s}")?,
                ParamValue::Sequence(items) => writeln!(out, "  {name} = [{}]", items.join(", "))?,
            }
        }
    }
    writeln!(out, "middleware: [{}]", matched.middleware().join(", "))?;
    Ok(())
}
