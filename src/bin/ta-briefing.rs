//! CLI binary for ta-briefing.
//!
//! A thin shim over the library crate: reads the model settings from the
//! environment (and `.env`), analyses one report and writes the briefing.

use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::path::PathBuf;
use ta_briefing::{
    analyze, default_output_path, write_briefing, ModelConfig, DEFAULT_CANDIDATE_NAME,
};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Briefing next to the input (candidate_123_interview_briefing.md)
  ta-briefing candidate_123.pdf

  # Explicit output and candidate name
  ta-briefing candidate_123.pdf -o briefing.md -n 山田太郎

  # Structured finding as JSON on stdout
  ta-briefing --json candidate_123.pdf > finding.json

ENVIRONMENT VARIABLES:
  AZURE_OPENAI_ENDPOINT       Chat-completion base URL (alias: AZURE_OPENAI_API_ENDPOINT)
  AZURE_OPENAI_API_KEY        API key
  AZURE_OPENAI_DEPLOYMENT     Deployment name (alias: AZURE_OPENAI_DEPLOYMENT_NAME)
  AZURE_OPENAI_API_VERSION    API version (default: 2024-02-15-preview;
                              2024-08-01-preview or later enables json_schema output)
  PDFIUM_LIB_PATH             Path to libpdfium if not installed system-wide

  A .env file in the working directory is loaded first if present.
"#;

/// Analyse a Talent Analytics report PDF and write an interviewer briefing.
#[derive(Parser, Debug)]
#[command(
    name = "ta-briefing",
    version,
    about = "Analyse a Talent Analytics report PDF and write an interviewer briefing",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Talent Analytics report PDF.
    pdf_path: PathBuf,

    /// Briefing output path (default: {input stem}_interview_briefing.md).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Candidate display name.
    #[arg(short, long, default_value = DEFAULT_CANDIDATE_NAME)]
    name: String,

    /// Print the structured finding as JSON instead of writing a briefing.
    #[arg(long)]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "TA_BRIEFING_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "TA_BRIEFING_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Input check ──────────────────────────────────────────────────────
    // Reported before the model settings are looked at.
    if !cli.pdf_path.exists() {
        eprintln!(
            "{} File not found: {}",
            red("✘"),
            cli.pdf_path.display()
        );
        std::process::exit(1);
    }

    // ── Build config ─────────────────────────────────────────────────────
    // A missing .env is fine; the process environment may already be set.
    let _ = dotenvy::dotenv();
    let config = ModelConfig::from_env().context("Failed to load model configuration")?;

    // ── Run analysis ─────────────────────────────────────────────────────
    let finding = analyze(&cli.pdf_path, &config)
        .await
        .context("Analysis failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&finding).context("Failed to serialise finding")?;
        println!("{json}");
        return Ok(());
    }

    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.pdf_path));

    write_briefing(&output_path, &cli.name, &finding)
        .await
        .with_context(|| format!("Failed to write briefing to {}", output_path.display()))?;

    if !cli.quiet {
        eprintln!(
            "{}  {}",
            green("✔"),
            bold(&output_path.display().to_string())
        );
    }

    Ok(())
}
