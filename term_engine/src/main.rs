/// Term counting: command line entry point.
///
/// Builds the root term for (a, b, c, sources), expands it either for a
/// fixed number of rounds or to fixpoint, and prints the aggregate.

use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use term_engine::domain::{DeadEndPolicy, ExpansionConfig, InitialConfig, Term};
use term_engine::engine::{terminal_weight, Expander};
use term_engine::hashing::canonical_hash;

#[derive(Parser)]
#[command(name = "term-count")]
#[command(about = "Count contraction paths for a configuration of legs and sources")]
#[command(allow_negative_numbers = true)]
struct Cli {
    /// Legs of initial degree 2
    a: i64,
    /// Legs of initial degree 4
    b: i64,
    /// Legs of initial degree 6
    c: i64,
    /// Shared source pool
    sources: i64,

    /// Run exactly this many rounds instead of running to fixpoint
    #[arg(short, long)]
    rounds: Option<u64>,

    /// Expansion config as JSON (flags below override it)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Expand rounds across the rayon thread pool
    #[arg(long)]
    parallel: bool,

    /// Drop dead-end terms instead of failing
    #[arg(long)]
    prune_dead_ends: bool,

    /// Print every term of the final frontier
    #[arg(long)]
    show_frontier: bool,
}

fn main() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str::<ExpansionConfig>(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => ExpansionConfig::default(),
    };
    if cli.parallel {
        config.parallel = true;
    }
    if cli.prune_dead_ends {
        config.dead_end = DeadEndPolicy::Prune;
    }

    let initial = InitialConfig::new(cli.a, cli.b, cli.c, cli.sources)?;
    let mut expander = Expander::new(&initial, config);

    match cli.rounds {
        Some(rounds) => expander.run(rounds)?,
        None => {
            expander.run_to_fixpoint()?;
        }
    }

    let frontier = expander.frontier();
    if cli.show_frontier {
        for (idx, term) in frontier.iter().enumerate() {
            println!("[{}]\n{}", idx, render(term));
        }
    }

    println!("rounds   = {}", expander.round());
    println!("frontier = {}", frontier.len());
    println!("hash     = {}", canonical_hash(frontier));
    if expander.is_complete() {
        println!("total    = {}", expander.aggregate()?);
    } else {
        let live = frontier.iter().filter(|t| !t.is_terminal()).count();
        println!(
            "partial  = {} ({} of {} terms still live)",
            terminal_weight(frontier),
            live,
            frontier.len()
        );
    }
    Ok(())
}

fn render(term: &Term) -> String {
    let rows: Vec<String> = term.pairing_rows().map(|r| format!("{:?}", r)).collect();
    format!(
        "  factor  = {}\n  legs    = {:?}\n  sources = {}\n  markers = {:?}\n  pairings = [{}]\n  terminal = {}",
        term.factor(),
        term.legs(),
        term.sources_remaining(),
        term.markers(),
        rows.join(", "),
        term.is_terminal()
    )
}
