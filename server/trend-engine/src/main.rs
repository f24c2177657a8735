//! Binary entrypoint: wire files and stdin to the trend engine.
//!
//! `report` reads one InboundDocument JSON object per line (from `--documents`
//! or stdin), runs the engine and writes the team report to stdout, or into
//! `--out-dir` together with per-issue reports and affected-document CSVs.
//! `keywords` and `template` write starter config files.
//!
//! Logs go to stderr so stdout stays clean for report output.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use trend_engine::export;
use trend_engine::normalize::{self, Batch};
use trend_engine::render;
use trend_engine::{
  Cadence, Config, Engine, IssueDefinition, KeywordCategoryIndex, PeriodSnapshot, ReportContext,
};

#[derive(Parser)]
#[command(name = "trend-engine", version, about = "Keyword trend reports over support document batches")]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Classify a batch and assemble the team report.
  Report(ReportArgs),
  /// Write the default keyword categories as JSON.
  Keywords {
    #[arg(long, default_value = "keywords.json")]
    out: PathBuf,
  },
  /// Write a sample issue definition as JSON.
  Template {
    #[arg(long, default_value = "issue_template.json")]
    out: PathBuf,
  },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
  Text,
  Json,
}

#[derive(clap::Args)]
struct ReportArgs {
  /// JSON-lines document file; stdin when omitted.
  #[arg(long)]
  documents: Option<PathBuf>,
  /// Keyword category file; built-in categories when omitted or missing.
  #[arg(long)]
  keywords: Option<PathBuf>,
  /// Issue definition file to track (repeatable).
  #[arg(long = "issue")]
  issues: Vec<PathBuf>,
  /// Previous period snapshot to compare against.
  #[arg(long)]
  previous: Option<PathBuf>,
  /// Where to save this period's snapshot.
  #[arg(long)]
  save_snapshot: Option<PathBuf>,
  /// weekly or monthly.
  #[arg(long, default_value = "weekly", value_parser = parse_cadence)]
  cadence: Cadence,
  /// Ranked categories shown; cadence default when omitted.
  #[arg(long)]
  top_n: Option<usize>,
  /// Write the report, issue reports and CSVs here instead of stdout.
  #[arg(long)]
  out_dir: Option<PathBuf>,
  #[arg(long, value_enum, default_value = "text")]
  format: Format,
}

fn parse_cadence(s: &str) -> Result<Cadence, String> {
  Cadence::from_str_loose(s).ok_or_else(|| format!("unknown cadence '{}' (weekly|monthly)", s))
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(io::stderr)
    .init();

  let cli = Cli::parse();
  match cli.command {
    Command::Report(args) => run_report(args),
    Command::Keywords { out } => {
      KeywordCategoryIndex::default()
        .save(&out)
        .with_context(|| format!("writing {}", out.display()))
    }
    Command::Template { out } => {
      IssueDefinition::template()
        .save(&out)
        .with_context(|| format!("writing {}", out.display()))
    }
  }
}

fn read_batch(path: Option<&Path>) -> Result<Batch> {
  let batch = match path {
    Some(p) => {
      let file = File::open(p).with_context(|| format!("opening {}", p.display()))?;
      normalize::read_documents(BufReader::new(file))?
    }
    None => normalize::read_documents(io::stdin().lock())?,
  };
  Ok(batch)
}

/// A malformed snapshot must not sink the run: warn and compare against nothing.
fn load_previous(path: Option<&Path>) -> Result<Option<PeriodSnapshot>> {
  let Some(path) = path else {
    return Ok(None);
  };
  match PeriodSnapshot::load_optional(path) {
    Ok(snapshot) => Ok(snapshot),
    Err(e) if e.is_config() => {
      warn!(error = %e, "ignoring unusable previous snapshot; all trends are NEW");
      Ok(None)
    }
    Err(e) => Err(e.into()),
  }
}

fn run_report(args: ReportArgs) -> Result<()> {
  let index = KeywordCategoryIndex::load_or_default(args.keywords.as_deref())?;
  let issues = args
    .issues
    .iter()
    .map(|p| IssueDefinition::load(p))
    .collect::<Result<Vec<_>, _>>()?;
  let previous = load_previous(args.previous.as_deref())?;
  let batch = read_batch(args.documents.as_deref())?;

  let now = Utc::now();
  let stamp = now.format("%Y%m%d").to_string();
  let ext = match args.format {
    Format::Text => "txt",
    Format::Json => "json",
  };
  let report_name = format!(
    "{}_report_{}.{}",
    args.cadence.label().to_lowercase(),
    stamp,
    ext
  );

  let mut artifacts = Vec::new();
  if args.out_dir.is_some() {
    artifacts.push(report_name.clone());
    for def in &issues {
      artifacts.push(format!("{}_report_{}.txt", def.issue_id, stamp));
      artifacts.push(format!("{}_affected_{}.csv", def.issue_id, stamp));
    }
  }

  let engine = Engine::new(Config::default(), index, issues);
  let ctx = ReportContext::new(args.cadence, now)
    .with_top_n(args.top_n)
    .with_skipped(batch.skipped)
    .with_artifacts(artifacts);
  let output = engine.run(&batch.documents, previous.as_ref(), ctx);

  let rendered = match args.format {
    Format::Text => render::render_text(&output.report),
    Format::Json => serde_json::to_string_pretty(&output.report)?,
  };

  match &args.out_dir {
    Some(dir) => {
      std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
      export::write_report(&dir.join(&report_name), &rendered)?;
      for (report, def) in output.issue_reports.iter().zip(engine.issues()) {
        let text =
          render::render_issue_report(report, def, engine.config(), &output.report.generated_at);
        export::write_report(&dir.join(format!("{}_report_{}.txt", def.issue_id, stamp)), &text)?;
        export::export_affected_documents(
          &dir.join(format!("{}_affected_{}.csv", def.issue_id, stamp)),
          &report.matches,
        )?;
      }
    }
    None => {
      let mut out = io::stdout().lock();
      out.write_all(rendered.as_bytes())?;
      if !rendered.ends_with('\n') {
        writeln!(out)?;
      }
      out.flush()?;
    }
  }

  if let Some(path) = &args.save_snapshot {
    output.snapshot.save(path)?;
  }

  info!(
    report_id = %output.report.report_id,
    documents = batch.documents.len(),
    skipped = batch.skipped,
    "report finished"
  );
  Ok(())
}
