use clap::Parser;
use disbotter_flow::prelude::*;
use rand::{Rng, rngs::ThreadRng};
use std::fs;
use std::sync::Arc;

/// A CLI tool to generate random Disbotter projects for codec and invariant runs
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the node declaration feed JSON file
    #[arg(short, long, default_value = "data/nodes.json")]
    nodes: String,

    /// The path to write the generated project to
    #[arg(short, long, default_value = "generated.dbp")]
    output: String,

    /// Number of commands to generate
    #[arg(long, default_value_t = 3)]
    commands: usize,

    /// Number of nodes placed in every flow
    #[arg(long, default_value_t = 12)]
    nodes_per_flow: usize,

    /// Number of connection attempts per flow; rejected attempts are skipped
    #[arg(long, default_value_t = 30)]
    attempts: usize,
}

const OPTION_TYPES: [CommandOptionType; 3] = [
    CommandOptionType::String,
    CommandOptionType::User,
    CommandOptionType::Channel,
];

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut rng = rand::rng();

    let feed = fs::read_to_string(&cli.nodes)?;
    let catalog = Arc::new(Catalog::from_feed_str(&feed)?);
    if catalog.is_empty() {
        eprintln!("Error: node feed '{}' declares no node types", cli.nodes);
        std::process::exit(1);
    }

    println!(
        "Generating {} command(s) with {} node(s) each from {} node type(s)...",
        cli.commands,
        cli.nodes_per_flow,
        catalog.len()
    );

    let mut project = Project::with_catalog("Generated Bot", catalog);
    let mut connected = 0;
    for index in 0..cli.commands {
        let command = project.create_command(
            format!("command{}", index),
            format!("Generated command {}", index),
        );
        for _ in 0..rng.random_range(0..=3) {
            let option_type = OPTION_TYPES[rng.random_range(0..OPTION_TYPES.len())];
            command.add_option(CommandOption::new("value", option_type))?;
        }
        populate_flow(&mut rng, command.flow_mut(), cli.nodes_per_flow);
        connect_randomly(&mut rng, command.flow_mut(), cli.attempts);
        connected += command.flow().connections().len();
    }

    fs::write(&cli.output, to_json_string(&project)?)?;

    println!(
        "Successfully generated {} connection(s) and saved the project to '{}'",
        connected, cli.output
    );
    Ok(())
}

fn populate_flow(rng: &mut ThreadRng, flow: &mut NodeFlow, count: usize) {
    let types: Vec<Arc<NodeTypeDescriptor>> = flow.available_nodes().cloned().collect();
    for _ in 0..count {
        let descriptor = &types[rng.random_range(0..types.len())];
        let position = (
            rng.random_range(0.0..1600.0_f64).round(),
            rng.random_range(0.0..900.0_f64).round(),
        );
        let id = flow.add_node(descriptor, position);

        let text_inputs: Vec<String> = descriptor
            .inputs
            .iter()
            .filter(|(_, port)| port.port_type() == PortType::Text)
            .map(|(key, _)| key.to_string())
            .collect();
        for key in text_inputs {
            if rng.random_bool(0.5) {
                let value = serde_json::json!(format!("text-{}", rng.random_range(0..1000)));
                // The key comes from the node's own descriptor.
                let _ = flow.set_hardcoded(id, &key, value);
            }
        }
    }
}

fn connect_randomly(rng: &mut ThreadRng, flow: &mut NodeFlow, attempts: usize) {
    let nodes: Vec<(NodeId, Vec<String>, Vec<String>)> = flow
        .nodes()
        .iter()
        .map(|n| {
            let descriptor = n.descriptor();
            (
                n.id(),
                descriptor.outputs.keys().map(str::to_string).collect(),
                descriptor.inputs.keys().map(str::to_string).collect(),
            )
        })
        .collect();
    let sources: Vec<_> = nodes.iter().filter(|(_, outputs, _)| !outputs.is_empty()).collect();
    let targets: Vec<_> = nodes.iter().filter(|(_, _, inputs)| !inputs.is_empty()).collect();
    if sources.is_empty() || targets.is_empty() {
        return;
    }

    for _ in 0..attempts {
        let (from, outputs, _) = sources[rng.random_range(0..sources.len())];
        let (to, _, inputs) = targets[rng.random_range(0..targets.len())];
        let candidate = ConnectionCandidate::new(
            *from,
            outputs[rng.random_range(0..outputs.len())].clone(),
            *to,
            inputs[rng.random_range(0..inputs.len())].clone(),
        );
        // Incompatible pairs are rejected and leave the flow untouched.
        let _ = flow.create_or_toggle_connection(candidate);
    }
}
