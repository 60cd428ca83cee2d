//! # ta-briefing
//!
//! Turn a Talent Analytics assessment report (PDF) into interviewer briefing
//! material using a hosted chat-completion model.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input      validate the local path or stage an upload
//!  ├─ 2. Extract    page text layer via pdfium (spawn_blocking)
//!  ├─ 3. Prompt     schema or legacy instructions + truncated report text
//!  ├─ 4. Invoke     one Azure OpenAI request, one schema-rejection fallback
//!  ├─ 5. Normalise  fence strip, JSON parse, strict then lenient validation
//!  └─ 6. Briefing   optional Markdown document, written atomically
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ta_briefing::{analyze, ModelConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // AZURE_OPENAI_ENDPOINT / AZURE_OPENAI_API_KEY / AZURE_OPENAI_DEPLOYMENT
//!     let config = ModelConfig::from_env()?;
//!     let finding = analyze("candidate_123.pdf", &config).await?;
//!     for point in &finding.risk_points {
//!         println!("・ {}", point);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `ta-briefing` binary (clap + anyhow + dotenvy + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! ta-briefing = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod briefing;
pub mod config;
pub mod error;
pub mod finding;
pub mod pipeline;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{
    analyze, analyze_bytes, analyze_bytes_with_backend, analyze_sync, analyze_text,
    analyze_with_backend, generate_briefing, generate_briefing_with_backend,
};
pub use briefing::{default_output_path, render_markdown, write_briefing, DEFAULT_CANDIDATE_NAME};
pub use config::{ModelConfig, ModelConfigBuilder};
pub use error::{BriefingError, ErrorKind};
pub use finding::StructuredFinding;
pub use pipeline::azure::AzureOpenAiClient;
pub use pipeline::llm::{ChatBackend, ChatMessage, ChatRequest, ChatResponse};
pub use prompts::{Prompt, PromptMode};
