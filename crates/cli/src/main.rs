//! cachetrace command-line driver.
//!
//! This binary wires the simulation engine to the filesystem. It performs:
//! 1. **Option handling:** config/trace paths and victim-selection policy.
//! 2. **Configuration:** reads and validates the JSON cache configuration.
//! 3. **Replay:** streams the trace through the two-level hierarchy,
//!    printing each access outcome and the per-cache summary at the end.

use std::error::Error;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cachetrace_core::{PolicyKind, SimConfig, TraceReader, TwoLevel};

#[derive(Parser, Debug)]
#[command(
    name = "cachetrace",
    version,
    about = "Two-level exclusive cache hierarchy simulator",
    long_about = "Replay a memory-access trace against a simulated L1/L2 cache pair \
                  with an exclusive inclusion policy.\n\nExamples:\n  \
                  cachetrace -c 2-level.config -t example.trace\n  \
                  cachetrace -c 2-level.config -t example.trace -F --quiet"
)]
struct Cli {
    /// JSON cache configuration file.
    #[arg(short, long, default_value = "2-level.config")]
    config: PathBuf,

    /// Memory-access trace file.
    #[arg(short, long, default_value = "example.trace")]
    trace: PathBuf,

    /// Use least-recently-used victim selection (default).
    #[arg(short = 'L', long = "lru", conflicts_with = "lfu")]
    lru: bool,

    /// Use least-frequently-used victim selection.
    #[arg(short = 'F', long = "lfu")]
    lfu: bool,

    /// Suppress per-access output; print only the final summary.
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Loads the configuration, replays the trace, prints the summaries.
fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let payload = fs::read_to_string(&cli.config)
        .map_err(|e| format!("reading {}: {e}", cli.config.display()))?;
    let mut config = SimConfig::from_json(&payload)?;

    if cli.lfu {
        config.policy = PolicyKind::Lfu;
    } else if cli.lru {
        config.policy = PolicyKind::Lru;
    }

    println!("# Configuration");
    println!("  L1: {} set bits, {} ways", config.l1_set_bits, config.l1_ways);
    println!("  L2: {} set bits, {} ways", config.l2_set_bits, config.l2_ways);
    println!("  block bits: {}   policy: {:?}", config.block_bits, config.policy);

    let mut hierarchy = TwoLevel::new(&config)?;

    let trace = File::open(&cli.trace)
        .map_err(|e| format!("reading {}: {e}", cli.trace.display()))?;
    for record in TraceReader::new(BufReader::new(trace)) {
        let record = record?;
        let result = hierarchy.access(&record);

        if !cli.quiet {
            print!(
                "{} {:x},{} | L1 {}",
                record.op.as_char(),
                record.addr,
                record.size,
                result.l1
            );
            if let Some(r2) = result.l2 {
                print!(" | L2 {r2}");
            }
            println!();
        }
    }

    for summary in hierarchy.summaries() {
        println!("{summary}");
    }
    Ok(())
}
