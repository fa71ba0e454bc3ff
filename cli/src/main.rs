use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use terminal_network_core::{Colony, ConsoleNotifier, NetworkCheckpoint, NetworkConfig, NetworkEvent, Notifier, Resource, TerminalNetwork};

#[derive(Parser)]
#[command(name = "terminal-network", about = "CLI for the terminal network resource simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a fixed demo network for a number of ticks and print a summary.
    Run {
        #[arg(long, default_value_t = 10)]
        ticks: usize,
        #[arg(long, default_value_t = 1)]
        seed: u64,
    },
    /// Run the demo network and write a checkpoint to a JSON file.
    Checkpoint {
        #[arg(long, default_value_t = 10)]
        ticks: usize,
        #[arg(long, default_value_t = 1)]
        seed: u64,
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run { ticks, seed } => run_cmd(ticks, seed),
        Commands::Checkpoint { ticks, seed, out } => checkpoint_cmd(ticks, seed, &out),
    }
}

fn demo_network(seed: u64) -> Result<TerminalNetwork> {
    let config = NetworkConfig {
        rng_seed: seed,
        ..NetworkConfig::default()
    };
    let mut network = TerminalNetwork::new(config);

    let provider = Colony::new("W1N1", 8, "W1N1")
        .with_terminal(HashMap::from([(Resource::Hydrogen, 50_000)]))
        .with_storage()
        .with_assets(HashMap::from([(Resource::Hydrogen, 50_000), (Resource::Energy, 400_000)]));
    let requestor = Colony::new("W1N2", 8, "W1N2")
        .with_terminal(HashMap::from([(Resource::Hydrogen, 0)]))
        .with_storage()
        .with_assets(HashMap::from([(Resource::Energy, 200_000)]));

    network.add_colony(provider).context("registering provider colony")?;
    network.add_colony(requestor).context("registering requestor colony")?;
    Ok(network)
}

fn run_cmd(ticks: usize, seed: u64) -> Result<()> {
    if ticks == 0 {
        bail!("--ticks must be at least 1");
    }

    let mut network = demo_network(seed)?;
    let mut notifier = ConsoleNotifier;
    for _ in 0..ticks {
        network.begin_tick();
        network.end_overrides();
        let report = network.run_tick()?;
        println!(
            "tick {}: {} transfers, {} notifications, overloaded={:?}",
            report.tick, report.transfers_executed, report.notifications_emitted, report.overloaded
        );
        for event in network.events().events() {
            if let NetworkEvent::NotificationEmitted { text } = event {
                notifier.notify(text.clone());
            }
        }
    }

    println!("\n{}", network.summarize());
    Ok(())
}

fn checkpoint_cmd(ticks: usize, seed: u64, out: &PathBuf) -> Result<()> {
    let mut network = demo_network(seed)?;
    let config = NetworkConfig {
        rng_seed: seed,
        ..NetworkConfig::default()
    };

    for _ in 0..ticks {
        network.begin_tick();
        network.end_overrides();
        network.run_tick()?;
    }

    let checkpoint = NetworkCheckpoint::capture(&network, &config)?;
    let json = checkpoint.to_json()?;
    fs::write(out, json).with_context(|| format!("writing checkpoint to {}", out.display()))?;
    println!("wrote checkpoint to {}", out.display());
    Ok(())
}
