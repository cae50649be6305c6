// Entry point and high-level CLI flow.
//
// - Loads already-fetched grievance records from a JSON or CSV file.
// - Assembles the report view for the chosen trend window and department.
// - Prints a markdown preview and, with --out-dir, exports every table.
use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Parser;
use grievance_report::{assemble, loader, output, util, ReportError, TrendWindow};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "grievance-report")]
#[command(about = "Grievance analytics: trends, department efficiency and leaderboards", long_about = None)]
struct Cli {
    /// JSON array or CSV file of grievance records
    input: PathBuf,
    /// Trend window: 7D, 30D, 6M or YTD
    #[arg(long, default_value = "7D")]
    window: TrendWindow,
    /// Restrict the department table to one department ("All" for none)
    #[arg(long)]
    department: Option<String>,
    /// Reference instant in RFC 3339 (defaults to now)
    #[arg(long, value_parser = parse_reference)]
    reference: Option<DateTime<Utc>>,
    /// Directory to write report.json, CSV tables and report.md into
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Rows per table in the console preview
    #[arg(long, default_value_t = 5)]
    preview_rows: usize,
}

fn parse_reference(s: &str) -> Result<DateTime<Utc>, ReportError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ReportError::InvalidReference(s.to_string()))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let (records, load_report) = loader::load_records(&cli.input)
        .with_context(|| format!("failed to load records from {}", cli.input.display()))?;
    info!(
        "Loaded {} of {} records ({} skipped)",
        util::format_int(load_report.loaded_rows),
        util::format_int(load_report.total_rows),
        util::format_int(load_report.parse_errors)
    );

    let department = cli
        .department
        .as_deref()
        .filter(|d| !d.eq_ignore_ascii_case("all"));
    let view = assemble(&records, cli.window, department, cli.reference);

    print!("{}", output::render_markdown(&view, cli.preview_rows));

    if let Some(dir) = &cli.out_dir {
        let files = output::export_all(dir, &view, usize::MAX)
            .with_context(|| format!("failed to export report to {}", dir.display()))?;
        info!("Exported {} files to {}", files.len(), dir.display());
    }

    Ok(())
}
