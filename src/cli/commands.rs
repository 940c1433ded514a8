use crate::config::RouterConfig;
use crate::route::{Parameter, ParameterSource, RouteDefinition, RouteTable};
use crate::router::{CommandArgs, MatchResult, Matcher, RouteCollection};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Command-line interface for routeflow route tables
#[derive(Debug, Parser)]
#[command(name = "routeflow")]
#[command(about = "Inspect, test and compile routeflow route tables", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List every route in match order
    Inspect {
        /// Route table file (YAML or JSON)
        #[arg(short, long)]
        routes: PathBuf,
    },
    /// Match one path or command line against a route table
    Match {
        /// Route table file (YAML or JSON)
        #[arg(short, long)]
        routes: PathBuf,

        /// Treat the input as a command name followed by its arguments
        #[arg(long, default_value_t = false)]
        command: bool,

        /// Path to match, or command name and arguments with --command
        #[arg(
            required = true,
            num_args = 1..,
            trailing_var_arg = true,
            allow_hyphen_values = true
        )]
        input: Vec<String>,
    },
    /// Validate a route table and write it as a cache file
    Compile {
        /// Hand-authored route table (YAML or JSON)
        #[arg(short, long)]
        routes: PathBuf,

        /// Output file; `.yaml`/`.yml` writes YAML, anything else JSON
        #[arg(short, long)]
        out: PathBuf,
    },
}

/// Parse process arguments and run, writing results to stdout
///
/// # Errors
///
/// Any failure of the selected subcommand, with context.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(cli, &mut out)
}

/// Run an already parsed command line
///
/// # Errors
///
/// Unreadable or invalid route tables, unwritable output, or a match that
/// fails on the input (for example a parameter that does not cast).
pub fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    let config = RouterConfig::from_env();
    match cli.command {
        Commands::Inspect { routes } => {
            let collection = load_collection(&routes, &config)?;
            for route in collection.all() {
                writeln!(out, "{}", describe_route(route))?;
            }
            writeln!(out, "{} route(s)", collection.len())?;
        }
        Commands::Match {
            routes,
            command,
            input,
        } => {
            let collection = load_collection(&routes, &config)?;
            let matcher = Matcher::with_config(Arc::new(collection), &config);
            let result = if command {
                let (name, args) = input.split_first().context("missing command name")?;
                matcher.match_command(name, &CommandArgs::parse(args))
            } else {
                matcher.match_route(&input.join(" "))
            }
            .with_context(|| format!("matching '{}'", input.join(" ")))?;
            write!(out, "{}", describe_match(&result))?;
        }
        Commands::Compile { routes, out: path } => {
            let collection = load_collection(&routes, &config)?;
            collection
                .to_table()
                .save(&path)
                .with_context(|| format!("writing {}", path.display()))?;
            writeln!(
                out,
                "compiled {} route(s) to {}",
                collection.len(),
                path.display()
            )?;
        }
    }
    Ok(())
}

/// Load a route table file into a validated collection
///
/// # Errors
///
/// Unreadable file, unsupported version, or any registration error.
pub fn load_collection(path: &Path, config: &RouterConfig) -> Result<RouteCollection> {
    let table =
        RouteTable::load(path).with_context(|| format!("loading route table {}", path.display()))?;
    RouteCollection::from_table(table, config)
        .with_context(|| format!("registering routes from {}", path.display()))
}

/// One line per route: kind, key, target, then parameters and middleware
#[must_use]
pub fn describe_route(route: &RouteDefinition) -> String {
    let kind = if route.is_dynamic() { "dynamic" } else { "exact" };
    let mut line = format!("{kind:<7} {} -> {}", route.key, route.target);
    if !route.target.dependencies.is_empty() {
        line.push_str(&format!(" (needs {})", route.target.dependencies.join(", ")));
    }
    for parameter in &route.parameters {
        line.push_str(&format!("\n        {}", describe_parameter(parameter)));
    }
    for (stage, names) in &route.middleware {
        line.push_str(&format!("\n        {}: {}", stage.as_str(), names.join(", ")));
    }
    line
}

fn describe_parameter(parameter: &Parameter) -> String {
    let source = match &parameter.source {
        ParameterSource::Capture { group } => format!("capture #{group}"),
        ParameterSource::Positional { index } => format!("argument #{index}"),
        ParameterSource::Option { long, aliases } if aliases.is_empty() => format!("--{long}"),
        ParameterSource::Option { long, aliases } => {
            format!("--{long} (-{})", aliases.join(", -"))
        }
    };
    let mut text = format!("{}: {source}", parameter.name);
    if parameter.array {
        text.push_str(", array");
    }
    if parameter.optional {
        text.push_str(", optional");
    }
    if let Some(default) = &parameter.default {
        text.push_str(&format!(", default {default}"));
    }
    text
}

/// Matched route and bound parameters, or `no match`
#[must_use]
pub fn describe_match(result: &MatchResult) -> String {
    match result {
        MatchResult::NoMatch => "no match\n".to_string(),
        MatchResult::Matched { route, params } => {
            let mut text = format!("matched {} -> {}\n", route.key, route.target);
            for (name, value) in params.iter() {
                text.push_str(&format!("  {name} = {value}\n"));
            }
            text
        }
    }
}
