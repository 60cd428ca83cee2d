//! End-to-end tests against a real Azure OpenAI deployment.
//!
//! These use PDF reports in `./test_cases/` and make live API calls, so
//! they are gated behind the `E2E_ENABLED` environment variable and need
//! the usual `AZURE_OPENAI_*` settings plus a pdfium library.
//!
//! Run with:
//!   E2E_ENABLED=1 cargo test --test e2e -- --nocapture

use std::path::PathBuf;
use ta_briefing::{analyze, generate_briefing, BriefingError, ModelConfig};

// ── Test helpers ─────────────────────────────────────────────────────────────

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

/// Skip this test if E2E_ENABLED is not set *or* no PDF file at `path`.
macro_rules! e2e_skip_unless_ready {
    ($path:expr) => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        let p: PathBuf = $path;
        if !p.exists() {
            println!("SKIP: test file not found: {}", p.display());
            return;
        }
        p
    }};
}

fn live_config() -> ModelConfig {
    let _ = dotenvy::dotenv();
    ModelConfig::from_env().expect("AZURE_OPENAI_* settings required for e2e tests")
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_analyze_sample_report() {
    let pdf = e2e_skip_unless_ready!(test_cases_dir().join("sample_report.pdf"));
    let config = live_config();

    let finding = analyze(&pdf, &config).await.expect("analysis failed");
    assert!(!finding.summary.trim().is_empty());
    assert!(!finding.risk_points.is_empty());
    assert!(!finding.attract_points.is_empty());
    assert!(!finding.notes_for_interviewer.is_empty());
}

#[tokio::test]
async fn test_generate_briefing_sample_report() {
    let pdf = e2e_skip_unless_ready!(test_cases_dir().join("sample_report.pdf"));
    let config = live_config();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("briefing.md");

    let written = generate_briefing(&pdf, Some(&out), "テスト", &config)
        .await
        .expect("briefing failed");
    assert_eq!(written, out);
    let md = std::fs::read_to_string(&out).unwrap();
    assert!(md.contains("候補者名: テスト"));
}

#[tokio::test]
async fn test_scanned_report_has_no_text() {
    let pdf = e2e_skip_unless_ready!(test_cases_dir().join("scanned_report.pdf"));
    let config = live_config();

    let err = analyze(&pdf, &config).await.unwrap_err();
    assert!(matches!(err, BriefingError::NoExtractableText { .. }));
}
