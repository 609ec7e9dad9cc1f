use crate::{
    hot_reload::watch_route_table,
    router::{SharedRouter, TreeRouter, VirtualPathContext},
    runtime_config::RouterConfig,
    table::load_route_table,
    values::RouteValues,
};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Command-line interface for treerouter
///
/// Every command loads a route table file and works on the router built
/// from it.
#[derive(Parser)]
#[command(name = "treerouter")]
#[command(about = "Tree router CLI", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Match a request path and print the selected route and its values
    Match {
        /// Route table file (YAML, TOML or JSON)
        #[arg(short, long)]
        routes: PathBuf,

        /// Request path, e.g. /products/7
        path: String,
    },
    /// Generate a link from route values
    Link {
        /// Route table file (YAML, TOML or JSON)
        #[arg(short, long)]
        routes: PathBuf,

        /// Only try the route with this name
        #[arg(short, long)]
        name: Option<String>,

        /// Explicit value as key=value (repeatable)
        #[arg(long = "value", value_parser = parse_key_value)]
        values: Vec<(String, String)>,

        /// Ambient value of the current request as key=value (repeatable)
        #[arg(long = "ambient", value_parser = parse_key_value)]
        ambient: Vec<(String, String)>,
    },
    /// Print every route in the table
    Routes {
        /// Route table file (YAML, TOML or JSON)
        #[arg(short, long)]
        routes: PathBuf,
    },
    /// Build the table and report errors
    Check {
        /// Route table file (YAML, TOML or JSON)
        #[arg(short, long)]
        routes: PathBuf,
    },
    /// Match paths read from stdin, reloading the table when the file changes
    Watch {
        /// Route table file (YAML, TOML or JSON)
        #[arg(short, long)]
        routes: PathBuf,
    },
}

/// Parse a `key=value` argument
pub(crate) fn parse_key_value(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{arg}'")),
    }
}

fn build_router(path: &Path) -> anyhow::Result<TreeRouter<String>> {
    load_route_table(path)?.build_router(RouterConfig::from_env())
}

/// Run a parsed command, writing its output to `out`
pub fn execute<W: Write>(command: &Commands, out: &mut W) -> anyhow::Result<()> {
    match command {
        Commands::Match { routes, path } => {
            let router = build_router(routes)?;
            write_match(&router, path, out)
        }
        Commands::Link {
            routes,
            name,
            values,
            ambient,
        } => {
            let router = build_router(routes)?;
            let mut context = VirtualPathContext::new(values.iter().cloned().collect());
            if let Some(name) = name {
                context = context.with_route_name(name.clone());
            }
            if !ambient.is_empty() {
                context = context.with_ambient_values(ambient.iter().cloned().collect());
            }
            match router.get_virtual_path(&context)? {
                Some(data) => writeln!(
                    out,
                    "{} (template: {})",
                    data.path,
                    data.entry().route_template.text()
                )?,
                None => writeln!(out, "no link")?,
            }
            Ok(())
        }
        Commands::Routes { routes } => {
            let router = build_router(routes)?;
            router.dump_routes(out)?;
            Ok(())
        }
        Commands::Check { routes } => {
            let router = build_router(routes)
                .with_context(|| format!("route table {} is invalid", routes.display()))?;
            writeln!(
                out,
                "ok: {} inbound, {} outbound, {} order buckets",
                router.inbound_entries().count(),
                router.outbound_entries().count(),
                router.trees().len()
            )?;
            Ok(())
        }
        Commands::Watch { routes } => {
            let config = RouterConfig::from_env();
            let shared = SharedRouter::new(load_route_table(routes)?.build_router(config)?);
            let _watcher = watch_route_table(routes, shared.clone(), config)?;
            for line in io::stdin().lock().lines() {
                let line = line?;
                let path = line.trim();
                if path.is_empty() {
                    continue;
                }
                write_match(&shared.load(), path, out)?;
                out.flush()?;
            }
            Ok(())
        }
    }
}

fn write_match<W: Write>(
    router: &TreeRouter<String>,
    path: &str,
    out: &mut W,
) -> anyhow::Result<()> {
    let mut values = RouteValues::new();
    match router.route(path, &mut values)? {
        Some(entry) => {
            let rendered: Vec<String> = values.iter().map(|(k, v)| format!("{k}={v}")).collect();
            writeln!(
                out,
                "{} -> {} (template: {}){} {{{}}}",
                path,
                entry.handler,
                entry.route_template.text(),
                name_suffix(entry.route_name.as_deref()),
                rendered.join(", ")
            )?;
        }
        None => writeln!(out, "{path} -> no match")?,
    }
    Ok(())
}

fn name_suffix(name: Option<&str>) -> String {
    name.map(|n| format!(" name={n}")).unwrap_or_default()
}

/// Run the CLI application
///
/// Parses command-line arguments and executes the requested command.
///
/// # Errors
///
/// Returns an error if:
/// - The route table cannot be read or parsed
/// - The route table does not build
/// - A constraint fails to evaluate
/// - The file watcher cannot be set up
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(&cli.command, &mut out)
}
