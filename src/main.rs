use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ragreduce::{EditorGraph, FallbackPolicy, Reducer, ReductionOutcome, ResourceAllocationGraph};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "ragreduce - Deadlock analysis for resource allocation graphs"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Reduce a graph and report removals and deadlocked processes
    Reduce {
        /// Path to the graph file saved by the editor
        graph: PathBuf,
        /// What to do when no process can be satisfied
        #[arg(long, value_enum, default_value_t = Fallback::DeclareDeadlock)]
        fallback: Fallback,
        /// Write a JSON-lines log of every removal step
        #[arg(long)]
        log: Option<PathBuf>,
        /// Pause between removals, in milliseconds
        #[arg(long, default_value_t = 0)]
        delay_ms: u64,
        /// Save the graph with the removed processes' edges deleted
        #[arg(long)]
        output: Option<PathBuf>,
        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print nodes, edges, capacities, allocations and requests
    Info {
        /// Path to the graph file saved by the editor
        graph: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Fallback {
    DeclareDeadlock,
    FewestAllocations,
}

impl From<Fallback> for FallbackPolicy {
    fn from(value: Fallback) -> Self {
        match value {
            Fallback::DeclareDeadlock => FallbackPolicy::DeclareDeadlock,
            Fallback::FewestAllocations => FallbackPolicy::FewestAllocations,
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Command::Reduce {
            graph,
            fallback,
            log,
            delay_ms,
            output,
            json,
        } => reduce(graph, fallback, log, delay_ms, output, json),
        Command::Info { graph } => info(graph).map(|_| ExitCode::SUCCESS),
    }
}

fn reduce(
    graph: PathBuf,
    fallback: Fallback,
    log: Option<PathBuf>,
    delay_ms: u64,
    output: Option<PathBuf>,
    json: bool,
) -> Result<ExitCode> {
    let mut document = EditorGraph::load(&graph)?;
    let snapshot = document.extract().context("Failed to read graph")?;

    let mut reducer = Reducer::new()
        .fallback(fallback.into())
        .step_delay(Duration::from_millis(delay_ms));
    if !json {
        reducer = reducer.on_removal(|event| {
            println!("Removing process {} ({:?})", event.process, event.kind);
        });
    }
    if let Some(log) = log {
        reducer = reducer.with_log(log);
    }

    let outcome = reducer.run(&snapshot).context("Failed to reduce graph")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }

    if let Some(output) = output {
        for process in &outcome.removed_trace {
            document.remove_process_edges(process);
        }
        document.save(&output)?;
    }

    Ok(if outcome.is_resolved() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

fn print_outcome(outcome: &ReductionOutcome) {
    println!("Removal order: {:?}", outcome.removed_trace);
    if outcome.is_resolved() {
        if outcome.deadlock_detected() {
            println!("Deadlock broken by forcing processes out.");
        } else {
            println!("Graph fully reduced, no deadlock.");
        }
    } else {
        println!("Deadlock found in processes {:?}", outcome.deadlocked_subset);
    }
}

fn info(graph: PathBuf) -> Result<()> {
    let document = EditorGraph::load(&graph)?;
    let snapshot = document.extract().context("Failed to read graph")?;
    snapshot.validate().context("Invalid graph")?;

    let rag = ResourceAllocationGraph::new(&snapshot);
    let allocation = rag.allocation_map();
    let request = rag.request_map();

    println!("Processes: {:?}", snapshot.processes);
    println!("Resources:");
    for resource in &snapshot.resources {
        println!(
            "  {resource}: capacity {}",
            snapshot.capacities.get(resource).copied().unwrap_or(0)
        );
    }
    println!("Edges | Total: {}", snapshot.edges.len());
    for (from, to) in &snapshot.edges {
        println!("  {from} -> {to}");
    }
    for process in &snapshot.processes {
        println!(
            "  {process}: holds {:?}, requests {:?}",
            allocation.get(process).cloned().unwrap_or_default(),
            request.get(process).cloned().unwrap_or_default()
        );
    }
    Ok(())
}
