use std::path::PathBuf;

use anyhow::Context;
use serde::Serialize;
use sokofess_engine::{to_lurd, verify_solution};
use sokofess_evaluator::DeadlockMode;
use sokofess_search::{
    FessSolver, SearchProgress, SearchStatistics, SearchStatus, SolverConfig,
};
use tracing::{info, warn};

use crate::util;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct SolveArg {
    /// Level file in the common text format
    level: PathBuf,
    /// Solver configuration JSON; the flags below override its fields
    #[arg(long)]
    config: Option<PathBuf>,
    /// Time budget in seconds
    #[arg(long)]
    max_time: Option<f64>,
    /// Budget on the number of search tree nodes
    #[arg(long)]
    max_nodes: Option<usize>,
    /// Pushes one macro move may chain (1 to 3)
    #[arg(long)]
    max_chain_pushes: Option<usize>,
    /// Run all five deadlock techniques instead of patterns and freeze only
    #[arg(long)]
    aggressive_deadlocks: bool,
    /// Write a JSON report of the run to this file
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct SolveReport {
    level: String,
    status: SearchStatus,
    moves: Vec<String>,
    lurd: Option<String>,
    config: SolverConfig,
    statistics: SearchStatistics,
}

pub(crate) fn run(arg: &SolveArg) -> anyhow::Result<()> {
    let SolveArg {
        level: level_path,
        config: config_path,
        max_time,
        max_nodes,
        max_chain_pushes,
        aggressive_deadlocks,
        output,
    } = arg;

    let level = util::read_level(level_path)?;
    let mut config = match config_path {
        Some(path) => SolverConfig::from_json_file(path)
            .with_context(|| format!("Failed to load solver config: {}", path.display()))?,
        None => SolverConfig::default(),
    };
    if let Some(secs) = max_time {
        config.max_time_secs = *secs;
    }
    if let Some(nodes) = max_nodes {
        config.max_nodes = *nodes;
    }
    if let Some(pushes) = max_chain_pushes {
        config.max_chain_pushes = *pushes;
    }
    if *aggressive_deadlocks {
        config.deadlock_mode = DeadlockMode::Aggressive;
    }

    let mut solver = FessSolver::new(&level, config.clone());
    let outcome = solver.solve_with_progress(&mut |progress: &SearchProgress| {
        info!("{progress}");
    });

    let lurd = match outcome.solution() {
        Some(moves) => {
            if !verify_solution(&level, moves) {
                warn!("solution does not replay to a solved state");
            }
            Some(to_lurd(&level, moves).context("Failed to render solution as LURD")?)
        }
        None => None,
    };
    let notation: Vec<String> = outcome.moves.iter().map(ToString::to_string).collect();

    println!("Status: {}", outcome.status);
    if outcome.is_solved() {
        println!("Solution ({} macro moves):", notation.len());
        for (i, mv) in notation.iter().enumerate() {
            println!("  {:3}: {mv}", i + 1);
        }
    }
    if let Some(lurd) = &lurd {
        println!("LURD: {lurd}");
    }
    print_statistics(&outcome.statistics);

    if let Some(path) = output {
        let report = SolveReport {
            level: level_path.display().to_string(),
            status: outcome.status,
            moves: notation,
            lurd,
            config,
            statistics: outcome.statistics,
        };
        util::write_json_file("report", path, &report)?;
        eprintln!("Report written to {}", path.display());
    }
    Ok(())
}

fn print_statistics(stats: &SearchStatistics) {
    println!("Statistics:");
    println!("  Time:              {:.3}s", stats.search_time);
    println!("  Nodes expanded:    {}", stats.nodes_expanded);
    println!("  Total nodes:       {}", stats.total_nodes);
    println!("  Feature cells:     {}", stats.feature_space_cells);
    println!("  Deadlocks:         {}", stats.deadlocks_detected);
    println!("  Advised moves:     {}", stats.advisor_moves_used);
    println!("  Difficult moves:   {}", stats.difficult_moves_used);
    println!("  Infeasible moves:  {}", stats.infeasible_moves);
    println!("  Solution length:   {}", stats.solution_length);
    println!("  Solution pushes:   {}", stats.solution_pushes);
}
