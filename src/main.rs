mod demo;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use review_report::charts::SiteBranding;
use review_report::config::AppConfig;
use review_report::error::AppError;
use review_report::i18n::PassThrough;
use review_report::report::{parse_questionnaire_filter, ReportInputs, ReportSnapshot, SnapshotBuilder};
use review_report::{generate_report, ReportOptions};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "Review Report",
    about = "Render performance review analytics reports from exported review data",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a PDF analytics report from a JSON request file
    Render(RenderArgs),
    /// Print the aggregated report snapshot as JSON
    Snapshot(SnapshotArgs),
    /// Render a report from a built-in synthetic dataset
    Demo(DemoArgs),
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// JSON file with questionnaires, responses, users and optional branding
    #[arg(long)]
    input: PathBuf,
    /// Questionnaire id to focus on (falls back to the first questionnaire)
    #[arg(long)]
    questionnaire: Option<String>,
    /// Include the per-participant leaderboard
    #[arg(long)]
    details: bool,
    /// Logo image to place in the page header
    #[arg(long)]
    logo: Option<PathBuf>,
    /// Output file (defaults to the suggested name in the output directory)
    #[arg(long)]
    out: Option<PathBuf>,
    /// Render tables instead of chart images
    #[arg(long)]
    no_charts: bool,
}

#[derive(Args, Debug)]
struct SnapshotArgs {
    /// JSON file with questionnaires, responses, users and optional branding
    #[arg(long)]
    input: PathBuf,
    /// Questionnaire id to focus on
    #[arg(long)]
    questionnaire: Option<String>,
    /// Include the per-participant leaderboard
    #[arg(long)]
    details: bool,
}

#[derive(Args, Debug)]
struct DemoArgs {
    /// Output file (defaults to the suggested name in the output directory)
    #[arg(long)]
    out: Option<PathBuf>,
}

/// Request file layout: the report rows plus optional site branding.
#[derive(Debug, Deserialize)]
struct ReportRequest {
    #[serde(flatten)]
    inputs: ReportInputs,
    #[serde(default)]
    branding: SiteBranding,
}

fn main() {
    if let Err(err) = run_cli() {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    review_report::telemetry::init(&config.telemetry)?;

    match cli.command {
        Command::Render(args) => run_render(&config, args),
        Command::Snapshot(args) => run_snapshot(args),
        Command::Demo(args) => run_demo(&config, args),
    }
}

fn load_request(path: &Path) -> Result<ReportRequest, AppError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn run_render(config: &AppConfig, args: RenderArgs) -> Result<(), AppError> {
    let RenderArgs {
        input,
        questionnaire,
        details,
        logo,
        out,
        no_charts,
    } = args;

    let request = load_request(&input)?;
    let logo = logo.map(fs::read).transpose()?;
    let options = ReportOptions {
        charts_enabled: config.render.charts && !no_charts,
        jpeg_quality: config.render.jpeg_quality,
        include_details: details,
        questionnaire_filter: questionnaire.as_deref().and_then(parse_questionnaire_filter),
        ..ReportOptions::default()
    };

    let report = generate_report(
        &request.inputs,
        &request.branding,
        logo.as_deref(),
        &PassThrough,
        &options,
    )?;
    write_report(config, out, &report.filename, &report.bytes, report.page_count)
}

fn run_snapshot(args: SnapshotArgs) -> Result<(), AppError> {
    let request = load_request(&args.input)?;
    let filter = args.questionnaire.as_deref().and_then(parse_questionnaire_filter);
    let snapshot = SnapshotBuilder::new(&request.inputs).build(filter, args.details);
    println!("{}", snapshot_json(&snapshot)?);
    Ok(())
}

fn snapshot_json(snapshot: &ReportSnapshot) -> Result<String, AppError> {
    serde_json::to_string_pretty(snapshot).map_err(AppError::Output)
}

fn run_demo(config: &AppConfig, args: DemoArgs) -> Result<(), AppError> {
    let now = Utc::now();
    let inputs = demo::demo_inputs(now);
    let options = ReportOptions {
        charts_enabled: config.render.charts,
        jpeg_quality: config.render.jpeg_quality,
        include_details: true,
        generated_at: Some(now),
        ..ReportOptions::default()
    };

    let report = generate_report(&inputs, &demo::demo_branding(), None, &PassThrough, &options)?;
    write_report(config, args.out, &report.filename, &report.bytes, report.page_count)
}

fn write_report(
    config: &AppConfig,
    out: Option<PathBuf>,
    filename: &str,
    bytes: &[u8],
    pages: usize,
) -> Result<(), AppError> {
    let path = out.unwrap_or_else(|| config.output.directory.join(filename));
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, bytes)?;

    info!(path = %path.display(), pages, bytes = bytes.len(), "report written");
    println!("Wrote {} ({} pages, {} bytes)", path.display(), pages, bytes.len());
    Ok(())
}
