//! Flow simulator CLI - plays seeded flowboard sessions in memory and writes
//! per-session metrics for comparing play strategies.

mod metrics;
mod output;
mod simulator;
mod types;

use clap::Parser;
use flowboard::GameConfig;
use metrics::build_session_metrics;
use output::OutputWriter;
use simulator::{SessionResult, Simulator};
use std::time::Instant;
use tracing::{info, warn};
use types::{MetricsLevel, OutputFormat, Strategy};

#[derive(Parser)]
#[command(name = "flow-simulator")]
#[command(about = "Seeded in-memory flowboard session simulator")]
struct Args {
    /// Number of sessions to simulate
    #[arg(short, long, default_value = "1")]
    sessions: u32,

    /// Turns played per session
    #[arg(short, long, default_value = "10")]
    turns: u32,

    /// New cards arriving in the funnel each turn
    #[arg(long, default_value = "2")]
    arrivals: u32,

    /// How tokens and technical debt are used
    #[arg(long, default_value = "mitigating")]
    strategy: Strategy,

    /// Base seed; session N uses seed + N. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Show output summary and file paths
    #[arg(long)]
    show_output: bool,

    /// Output directory for results
    #[arg(long, default_value = "./simulation-results")]
    output_dir: String,

    /// Output format
    #[arg(long, default_value = "jsonl")]
    output_format: OutputFormat,

    /// Compress output files
    #[arg(long)]
    compress: bool,

    /// Metrics detail level
    #[arg(long, default_value = "detailed")]
    metrics_level: MetricsLevel,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = if args.verbose {
        "debug"
    } else if args.show_output {
        "info"
    } else {
        "warn"
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = GameConfig::from_env()?;
    let base_seed = args.seed.unwrap_or_else(rand::random);
    if args.show_output {
        info!(
            sessions = args.sessions,
            turns = args.turns,
            strategy = ?args.strategy,
            base_seed,
            "Starting flow simulator"
        );
    }

    let mut output_writer =
        OutputWriter::new(&args.output_dir, &args.output_format, args.compress)?;

    let start = Instant::now();
    let mut results = Vec::new();
    let mut errors = 0;

    for session_no in 1..=args.sessions {
        let session_start = Instant::now();
        let seed = base_seed.wrapping_add(u64::from(session_no));
        let simulator = Simulator::new(session_no, seed, config.clone())
            .with_turns(args.turns)
            .with_arrivals(args.arrivals)
            .with_strategy(args.strategy);

        match simulator.simulate_session() {
            Ok(result) => {
                let duration_ms = session_start.elapsed().as_secs_f64() * 1000.0;
                if args.verbose {
                    info!(
                        session_no,
                        score = result.metrics.accumulated_score,
                        "Session completed"
                    );
                }
                let metrics = build_session_metrics(result.clone(), &args.metrics_level, duration_ms);
                if let Err(e) = output_writer.write_session(metrics) {
                    warn!("Failed to write metrics for session {}: {}", session_no, e);
                }
                results.push(result);
            }
            Err(e) => {
                errors += 1;
                warn!("Session {} failed: {}", session_no, e);
            }
        }
    }

    let elapsed = start.elapsed();
    let (detail_path, csv_path) = output_writer.output_paths();
    let (detail_path, csv_path) = (detail_path.to_path_buf(), csv_path.to_path_buf());
    output_writer.finish()?;

    if args.show_output {
        info!("Detailed results written to: {}", detail_path.display());
        info!("Summary CSV written to: {}", csv_path.display());
        print_summary(&results, errors, elapsed, args.sessions);
    }

    Ok(())
}

fn print_summary(
    results: &[SessionResult],
    errors: u32,
    elapsed: std::time::Duration,
    total: u32,
) {
    println!("\n=== Simulation Summary ===");
    println!("Sessions completed: {}/{}", results.len(), total);
    if errors > 0 {
        println!("Errors: {}", errors);
    }
    println!("Total time: {:?}", elapsed);
    if results.is_empty() {
        return;
    }
    println!(
        "Average time per session: {:?}",
        elapsed / results.len() as u32
    );

    let n = results.len() as f64;
    let scores: Vec<u32> = results.iter().map(|r| r.metrics.accumulated_score).collect();
    let total_score: u64 = scores.iter().map(|&s| u64::from(s)).sum();
    let min_score = scores.iter().min().copied().unwrap_or(0);
    let max_score = scores.iter().max().copied().unwrap_or(0);
    let rolls: u64 = results.iter().map(|r| u64::from(r.stats.rolls)).sum();
    let reverts: u64 = results.iter().map(|r| u64::from(r.stats.reverts)).sum();
    let tokens: u64 = results.iter().map(|r| u64::from(r.stats.tokens_spent)).sum();

    println!("\n=== Flow ===");
    println!(
        "Score: avg={:.1}, min={}, max={}",
        total_score as f64 / n,
        min_score,
        max_score
    );
    let revert_rate = if rolls == 0 {
        0.0
    } else {
        reverts as f64 / rolls as f64 * 100.0
    };
    println!(
        "Rolls: {} ({:.1}% reverted), tokens spent: {}",
        rolls, revert_rate, tokens
    );

    let cycle: Vec<f64> = results
        .iter()
        .filter_map(|r| r.metrics.average_cycle_time)
        .collect();
    if !cycle.is_empty() {
        println!(
            "Average cycle time: {:.2} turns",
            cycle.iter().sum::<f64>() / cycle.len() as f64
        );
    }
}
