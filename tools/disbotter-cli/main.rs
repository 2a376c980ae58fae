use clap::{Args, Parser, Subcommand};
use disbotter_flow::codec::MissingTypePolicy;
use disbotter_flow::prelude::*;
use itertools::Itertools;
use std::fs;
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Inspect and check Disbotter projects from the command line
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log every accepted mutation and fallback decision
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Print a summary of every command in a project
    Inspect(ProjectArgs),
    /// Exit with a non-zero status if any flow breaks a connection invariant
    Validate(ProjectArgs),
    /// List the node types of a declaration feed
    Catalog {
        /// Path to the node declaration feed JSON file
        nodes_path: String,
    },
}

#[derive(Args, Debug)]
struct ProjectArgs {
    /// Path to the .dbp project file
    project_path: String,

    /// Path to the node declaration feed JSON file
    #[arg(short, long, default_value = "data/nodes.json")]
    nodes: String,

    /// Drop nodes of unknown type instead of substituting the first catalog entry
    #[arg(long)]
    skip_unknown: bool,

    /// Resolve a renamed node type, given as OLD=NEW (repeatable)
    #[arg(long = "alias", value_name = "OLD=NEW")]
    aliases: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        CliCommand::Inspect(args) => run_inspect(&args),
        CliCommand::Validate(args) => run_validate(&args),
        CliCommand::Catalog { nodes_path } => run_catalog(&nodes_path),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_catalog(nodes_path: &str) -> Arc<Catalog> {
    let feed = fs::read_to_string(nodes_path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read node feed '{}': {}", nodes_path, e))
    });
    let catalog = Catalog::from_feed_str(&feed)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load node feed: {}", e)));
    Arc::new(catalog)
}

fn load_project(args: &ProjectArgs) -> Project {
    let mut builder = Decoder::builder(load_catalog(&args.nodes));
    for alias in &args.aliases {
        let Some((old_id, new_id)) = alias.split_once('=') else {
            exit_with_error(&format!("Alias '{}' is not of the form OLD=NEW", alias));
        };
        builder = builder.with_type_alias(old_id, new_id);
    }
    if args.skip_unknown {
        builder = builder.with_missing_type_policy(MissingTypePolicy::Skip);
    }

    let json = fs::read_to_string(&args.project_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read project file '{}': {}",
            args.project_path, e
        ))
    });
    builder
        .build()
        .parse_project(&json)
        .unwrap_or_else(|e| exit_with_error(&e.to_string()))
}

fn run_inspect(args: &ProjectArgs) {
    let project = load_project(args);

    println!("Project: {}", project.name);
    println!("Commands: {}", project.commands().len());
    for command in project.commands() {
        let flow = command.flow();
        let pending = flow.pending_connections().len();

        println!("\n/{} ({})", command.name, command.uid());
        if !command.description.is_empty() {
            println!("  {}", command.description);
        }
        for option in command.options() {
            let required = if option.required { ", required" } else { "" };
            println!("  option {}: {:?}{}", option.name, option.option_type, required);
        }
        println!(
            "  nodes: {}  connections: {}  pending: {}",
            flow.nodes().len(),
            flow.connections().len(),
            pending
        );
        for node in flow.nodes() {
            let position = node.position();
            println!(
                "    {} [{}] at ({}, {})",
                node.uid(),
                node.type_id(),
                position.x,
                position.y
            );
        }
    }
}

fn run_validate(args: &ProjectArgs) {
    let project = load_project(args);

    let mut total = 0;
    for command in project.commands() {
        let flow = command.flow();
        let violations = flow.violations();
        for index in flow.pending_connections() {
            warn!(
                command = command.name.as_str(),
                index,
                "Connection has an unresolved endpoint"
            );
        }
        if violations.is_empty() {
            println!("/{}: ok", command.name);
            continue;
        }
        println!("/{}: {} violation(s)", command.name, violations.len());
        for violation in &violations {
            println!("  - {}", violation);
        }
        total += violations.len();
    }

    if total > 0 {
        exit_with_error(&format!("{} invariant violation(s) found", total));
    }
}

fn run_catalog(nodes_path: &str) {
    let catalog = load_catalog(nodes_path);

    println!("{} node type(s)", catalog.len());
    for descriptor in catalog.iter() {
        let category = if descriptor.category.is_empty() {
            "-"
        } else {
            descriptor.category.as_str()
        };
        println!(
            "  {:<24} {:<12} in: {}  out: {}",
            descriptor.id,
            category,
            descriptor.inputs.keys().join(", "),
            descriptor.outputs.keys().join(", ")
        );
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
