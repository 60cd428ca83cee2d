//! Analysis entry points.
//!
//! Each call runs the same four stages on one report:
//!
//! ```text
//! extract text → build prompt → invoke model → normalise
//! ```
//!
//! The `*_with_backend` variants take any [`ChatBackend`]; the plain ones
//! build an [`AzureOpenAiClient`] from the [`ModelConfig`].

use crate::briefing::{default_output_path, write_briefing};
use crate::config::ModelConfig;
use crate::error::BriefingError;
use crate::finding::StructuredFinding;
use crate::pipeline::azure::AzureOpenAiClient;
use crate::pipeline::llm::{self, ChatBackend};
use crate::pipeline::{extract, input, normalize};
use crate::prompts::build_prompt;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Analyse the report at `pdf_path` against the configured Azure deployment.
///
/// # Example
/// ```rust,no_run
/// use ta_briefing::{analyze, ModelConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ModelConfig::from_env()?;
/// let finding = analyze("candidate_123.pdf", &config).await?;
/// println!("{}", finding.summary);
/// # Ok(())
/// # }
/// ```
pub async fn analyze(
    pdf_path: impl AsRef<Path>,
    config: &ModelConfig,
) -> Result<StructuredFinding, BriefingError> {
    let backend = AzureOpenAiClient::new(config);
    analyze_with_backend(pdf_path, config, &backend).await
}

/// Analyse the report at `pdf_path` using `backend` for the completion call.
pub async fn analyze_with_backend(
    pdf_path: impl AsRef<Path>,
    config: &ModelConfig,
    backend: &dyn ChatBackend,
) -> Result<StructuredFinding, BriefingError> {
    let start = Instant::now();
    let pdf_path = input::resolve_local(pdf_path.as_ref())?;

    let text = extract::extract_text(&pdf_path).await?;
    info!("Extracted {} characters", text.chars().count());

    let finding = analyze_text(&text, config, backend).await?;
    info!(
        "Analysis of {} complete in {}ms",
        pdf_path.display(),
        start.elapsed().as_millis()
    );
    Ok(finding)
}

/// Run the prompt, invoke and normalise stages on already-extracted text.
pub async fn analyze_text(
    report_text: &str,
    config: &ModelConfig,
    backend: &dyn ChatBackend,
) -> Result<StructuredFinding, BriefingError> {
    let prompt = build_prompt(
        report_text,
        config.max_input_chars,
        config.supports_json_schema(),
    );
    info!("Prompt mode: {:?}", prompt.mode);

    let raw = llm::invoke(backend, config, &prompt).await?;
    normalize::normalize(&raw)
}

/// Analyse an uploaded PDF held in memory.
///
/// `filename` must end in `.pdf`. The bytes are staged in a temp file that is
/// removed when this call returns, whatever the outcome.
pub async fn analyze_bytes(
    filename: &str,
    bytes: &[u8],
    config: &ModelConfig,
) -> Result<StructuredFinding, BriefingError> {
    let backend = AzureOpenAiClient::new(config);
    analyze_bytes_with_backend(filename, bytes, config, &backend).await
}

/// [`analyze_bytes`] with an explicit backend.
pub async fn analyze_bytes_with_backend(
    filename: &str,
    bytes: &[u8],
    config: &ModelConfig,
    backend: &dyn ChatBackend,
) -> Result<StructuredFinding, BriefingError> {
    let staged = input::stage_upload(filename, bytes)?;
    info!("Analysing upload '{}' ({} bytes)", filename, bytes.len());
    // `staged` is dropped (and the file deleted) when this returns
    analyze_with_backend(staged.path(), config, backend).await
}

/// Synchronous wrapper around [`analyze`].
///
/// Creates a temporary tokio runtime internally.
pub fn analyze_sync(
    pdf_path: impl AsRef<Path>,
    config: &ModelConfig,
) -> Result<StructuredFinding, BriefingError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| BriefingError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(analyze(pdf_path, config))
}

/// Analyse `pdf_path` and write the interviewer briefing.
///
/// With `output` unset the briefing lands next to the input as
/// `{stem}_interview_briefing.md`. Returns the path written.
pub async fn generate_briefing(
    pdf_path: impl AsRef<Path>,
    output: Option<&Path>,
    candidate_name: &str,
    config: &ModelConfig,
) -> Result<PathBuf, BriefingError> {
    let backend = AzureOpenAiClient::new(config);
    generate_briefing_with_backend(pdf_path, output, candidate_name, config, &backend).await
}

/// [`generate_briefing`] with an explicit backend.
pub async fn generate_briefing_with_backend(
    pdf_path: impl AsRef<Path>,
    output: Option<&Path>,
    candidate_name: &str,
    config: &ModelConfig,
    backend: &dyn ChatBackend,
) -> Result<PathBuf, BriefingError> {
    let pdf_path = pdf_path.as_ref();
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(pdf_path));

    let finding = analyze_with_backend(pdf_path, config, backend).await?;
    write_briefing(&output, candidate_name, &finding).await?;
    Ok(output)
}
