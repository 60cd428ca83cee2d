//! Error types for the ta-briefing library.
//!
//! Every failure the pipeline can hit is a variant of [`BriefingError`].
//! Callers that only need to know *which stage* failed (for an exit code or
//! an HTTP status) use [`BriefingError::kind`], which folds the variants into
//! a small [`ErrorKind`] taxonomy:
//!
//! * **Config**: endpoint, credential or deployment missing; raised before
//!   any network traffic.
//! * **Input**: wrong path, not a PDF, unreadable PDF, or a PDF whose pages
//!   carry no text layer (usually a scan).
//! * **Upstream**: the completion endpoint failed.
//! * **MalformedOutput**: the model answered, but not with the expected JSON.

use std::path::PathBuf;
use thiserror::Error;

/// Maximum number of characters of model output quoted in diagnostics.
pub const PREVIEW_CHARS: usize = 500;

/// Coarse classification of a [`BriefingError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Input,
    Upstream,
    MalformedOutput,
    Output,
    Internal,
}

/// All errors returned by the ta-briefing library.
#[derive(Debug, Error)]
pub enum BriefingError {
    // ── Config errors ─────────────────────────────────────────────────────
    /// A required model setting is absent or blank.
    #[error("Model configuration is missing {setting}\nSet it in the environment or a .env file.")]
    MissingConfig { setting: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'")]
    PermissionDenied { path: PathBuf },

    /// Upload rejected at the boundary because its name does not end in `.pdf`.
    #[error("Unsupported file '{filename}': please upload a PDF file")]
    UnsupportedFileType { filename: String },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// pdfium could not open the document.
    #[error("Failed to read PDF '{path}': {detail}\nThe file may be damaged or not contain extractable text.")]
    UnreadablePdf { path: PathBuf, detail: String },

    /// Every page came back empty.
    #[error(
        "No text could be extracted from '{path}'.\n\
The PDF may contain only scanned images; export it with a text layer and retry."
    )]
    NoExtractableText { path: PathBuf },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install libpdfium system-wide."
    )]
    PdfiumBindingFailed(String),

    // ── Upstream errors ───────────────────────────────────────────────────
    /// The completion endpoint rejected the request or could not be reached.
    #[error("Model API call failed{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Upstream { status: Option<u16>, message: String },

    // ── Malformed-output errors ───────────────────────────────────────────
    /// The response text is not valid JSON.
    #[error("Model response is not valid JSON: {detail}\nResponse: {preview}")]
    MalformedJson { detail: String, preview: String },

    /// The response parsed but lacks required keys.
    #[error("Model response is missing required keys: {}\nResponse: {preview}", .missing.join(", "))]
    MissingKeys { missing: Vec<String>, preview: String },

    /// The first choice carried no content.
    #[error("Model response contained no message content")]
    EmptyResponse,

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the briefing file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BriefingError {
    /// Which stage of the taxonomy this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingConfig { .. } | Self::InvalidConfig(_) => ErrorKind::Config,
            Self::FileNotFound { .. }
            | Self::PermissionDenied { .. }
            | Self::UnsupportedFileType { .. }
            | Self::NotAPdf { .. }
            | Self::UnreadablePdf { .. }
            | Self::NoExtractableText { .. } => ErrorKind::Input,
            Self::Upstream { .. } => ErrorKind::Upstream,
            Self::MalformedJson { .. } | Self::MissingKeys { .. } | Self::EmptyResponse => {
                ErrorKind::MalformedOutput
            }
            Self::OutputWriteFailed { .. } => ErrorKind::Output,
            Self::PdfiumBindingFailed(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// First [`PREVIEW_CHARS`] characters of `text`, with an ellipsis when cut.
pub fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_display_with_status() {
        let e = BriefingError::Upstream {
            status: Some(401),
            message: "invalid key".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("HTTP 401"), "got: {msg}");
        assert!(msg.contains("invalid key"));
    }

    #[test]
    fn upstream_display_without_status() {
        let e = BriefingError::Upstream {
            status: None,
            message: "connection refused".into(),
        };
        assert!(!e.to_string().contains("HTTP"));
    }

    #[test]
    fn missing_keys_lists_each_key() {
        let e = BriefingError::MissingKeys {
            missing: vec!["risk_points".into(), "notes_for_interviewer".into()],
            preview: "{}".into(),
        };
        assert!(e
            .to_string()
            .contains("risk_points, notes_for_interviewer"));
    }

    #[test]
    fn no_text_hints_at_scanned_pdf() {
        let e = BriefingError::NoExtractableText {
            path: PathBuf::from("scan.pdf"),
        };
        assert!(e.to_string().contains("scanned images"));
        assert_eq!(e.kind(), ErrorKind::Input);
    }

    #[test]
    fn not_found_is_distinct_from_no_text() {
        let missing = BriefingError::FileNotFound {
            path: PathBuf::from("x.pdf"),
        };
        assert!(matches!(missing, BriefingError::FileNotFound { .. }));
        assert_ne!(missing.to_string(), BriefingError::NoExtractableText {
            path: PathBuf::from("x.pdf"),
        }
        .to_string());
    }

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(
            BriefingError::MissingConfig {
                setting: "AZURE_OPENAI_API_KEY".into()
            }
            .kind(),
            ErrorKind::Config
        );
        assert_eq!(BriefingError::EmptyResponse.kind(), ErrorKind::MalformedOutput);
        assert_eq!(
            BriefingError::MalformedJson {
                detail: "eof".into(),
                preview: String::new()
            }
            .kind(),
            ErrorKind::MalformedOutput
        );
    }

    #[test]
    fn preview_is_bounded() {
        let long = "あ".repeat(PREVIEW_CHARS + 10);
        let p = preview(&long);
        assert_eq!(p.chars().count(), PREVIEW_CHARS + 3);
        assert!(p.ends_with("..."));
        assert_eq!(preview("short"), "short");
    }
}
