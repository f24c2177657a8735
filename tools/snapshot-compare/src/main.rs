//! snapshot-compare: fast period snapshot diff for trend reviews
//!
//! Usage:
//!   snapshot-compare <previous> <current>      # per-category deltas
//!   snapshot-compare <previous> <current> -q   # quiet: exit 0 if all flat, 1 otherwise
//!
//! Uses the same ±5% flat band as the team report. Exit code 2 on unreadable
//! or malformed snapshot files.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use trend_engine::trend::{self, FLAT_BAND};
use trend_engine::types::{Direction, TrendDelta};
use trend_engine::PeriodSnapshot;

#[derive(Parser)]
#[command(name = "snapshot-compare", about = "Compare two period snapshot files")]
struct Args {
    previous: PathBuf,
    current: PathBuf,
    /// Quiet: only exit code (0=all flat, 1=changed)
    #[arg(short, long)]
    quiet: bool,
    /// Flat band in percent.
    #[arg(long, default_value_t = FLAT_BAND)]
    band: f64,
}

fn load(path: &Path) -> PeriodSnapshot {
    let name = path.display().to_string();
    let contents = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("snapshot-compare: cannot read {}: {}", name, e);
        process::exit(2);
    });
    PeriodSnapshot::from_json_str(&name, &contents).unwrap_or_else(|e| {
        eprintln!("snapshot-compare: {}", e);
        process::exit(2);
    })
}

struct Row {
    name: String,
    previous: Option<u64>,
    current: u64,
    delta: TrendDelta,
}

/// Every category in either snapshot; ones that vanished compare against zero.
fn compare(previous: &PeriodSnapshot, current: &PeriodSnapshot, band: f64) -> Vec<Row> {
    let mut names: Vec<&String> = current.categories.keys().collect();
    for name in previous.categories.keys() {
        if !current.categories.contains_key(name) {
            names.push(name);
        }
    }

    names
        .into_iter()
        .map(|name| {
            let prev = previous.categories.get(name).map(|c| c.total_mentions);
            let cur = current.categories.get(name).map(|c| c.total_mentions).unwrap_or(0);
            Row {
                name: name.clone(),
                previous: prev,
                current: cur,
                delta: trend::compare_with_band(cur as f64, prev.map(|p| p as f64), band),
            }
        })
        .collect()
}

fn describe(delta: &TrendDelta) -> String {
    match delta.direction {
        Direction::New => "NEW".to_string(),
        _ => format!("{} ({:+.1}%)", delta.direction.arrow(), delta.percent_change),
    }
}

fn main() {
    let args = Args::parse();
    let previous = load(&args.previous);
    let current = load(&args.current);

    let total = trend::compare_with_band(
        current.total_documents as f64,
        Some(previous.total_documents as f64),
        args.band,
    );
    let rows = compare(&previous, &current, args.band);

    let all_flat = total.direction == Direction::Flat
        && rows.iter().all(|r| r.delta.direction == Direction::Flat);

    if args.quiet {
        process::exit(if all_flat { 0 } else { 1 });
    }

    println!(
        "Total: {} -> {} {}",
        previous.total_documents,
        current.total_documents,
        describe(&total)
    );
    for row in &rows {
        let prev = row
            .previous
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("  {}: {} -> {} {}", row.name, prev, row.current, describe(&row.delta));
    }

    if all_flat {
        println!("No significant changes.");
        process::exit(0);
    }
    process::exit(1);
}
