//! Interviewer briefing document: rendering and file output.
//!
//! The briefing is a short Markdown document with a title, the candidate's
//! display name, and one section per field of the [`StructuredFinding`].
//! Sections with nothing to show render a `（情報なし）` placeholder rather
//! than disappearing, so every briefing has the same shape.

use crate::error::BriefingError;
use crate::finding::StructuredFinding;
use std::path::{Path, PathBuf};
use tracing::info;

/// Display name used when the caller gives none.
pub const DEFAULT_CANDIDATE_NAME: &str = "候補者";

/// Document title.
pub const TITLE: &str = "Talent Analytics 面接ブリーフィング";

/// Placeholder for an empty section.
pub const NO_INFORMATION: &str = "（情報なし）";

/// Suffix appended to the input's file stem for the default output name.
pub const OUTPUT_SUFFIX: &str = "_interview_briefing.md";

/// Render the briefing for `candidate_name` as Markdown.
pub fn render_markdown(candidate_name: &str, finding: &StructuredFinding) -> String {
    let mut out = String::with_capacity(1024);
    out.push_str(&format!("# {}\n\n", TITLE));
    out.push_str(&format!("候補者名: {}\n\n", candidate_name));

    out.push_str("## 【総合特徴】\n\n");
    let summary = finding.summary.trim();
    if summary.is_empty() {
        out.push_str(NO_INFORMATION);
    } else {
        out.push_str(summary);
    }
    out.push_str("\n\n");

    push_list(&mut out, "【見定めポイント】", &finding.risk_points);
    push_list(&mut out, "【アトラクトポイント】", &finding.attract_points);
    push_list(&mut out, "【面接の進め方メモ】", &finding.notes_for_interviewer);

    let end = out.trim_end().len();
    out.truncate(end);
    out.push('\n');
    out
}

fn push_list(out: &mut String, heading: &str, items: &[String]) {
    out.push_str(&format!("## {}\n\n", heading));
    if items.is_empty() {
        out.push_str(NO_INFORMATION);
        out.push_str("\n\n");
        return;
    }
    for item in items {
        out.push_str(&format!("・ {}\n\n", clean_item(item)));
    }
}

/// Flatten one list entry onto a single line and escape markup characters.
pub fn clean_item(item: &str) -> String {
    let flattened = item.trim().replace(['\r', '\n'], " ");
    let escaped = flattened
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    escaped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `{stem}_interview_briefing.md`, next to `input`.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "briefing".to_string());
    input.with_file_name(format!("{}{}", stem, OUTPUT_SUFFIX))
}

/// Write the briefing to `path`.
///
/// The document is written to a temporary sibling and renamed into place,
/// so `path` either holds a complete briefing or is left untouched.
pub async fn write_briefing(
    path: &Path,
    candidate_name: &str,
    finding: &StructuredFinding,
) -> Result<(), BriefingError> {
    let document = render_markdown(candidate_name, finding);
    let fail = |source: std::io::Error| BriefingError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(fail)?;
    }

    let tmp_path = temp_sibling(path);
    if let Err(e) = tokio::fs::write(&tmp_path, document.as_bytes()).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(fail(e));
    }
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(fail(e));
    }

    info!("Briefing written: {}", path.display());
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
