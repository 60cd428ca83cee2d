//! Prompts for the briefing extraction call.
//!
//! Two system prompts exist because the protocol version decides who
//! enforces the output shape:
//!
//! * [`SCHEMA_SYSTEM_PROMPT`]: the request carries a strict JSON schema, so
//!   the prompt only talks about content (language, item counts, length).
//! * [`LEGACY_SYSTEM_PROMPT`]: no schema enforcement; the prompt embeds a
//!   literal example of the JSON object and forbids fences and prose.
//!
//! [`build_prompt`] picks one and pairs it with the (truncated) report text.

use tracing::warn;

/// System prompt used when the request carries a `json_schema` response format.
pub const SCHEMA_SYSTEM_PROMPT: &str = r#"あなたは人事の専門家です。Talent Analytics（性格・価値観診断）の受検結果レポートを分析し、
面接官向けのブリーフィング情報を提供してください。

重要：
- すべての項目は日本語で記述してください
- risk_points、attract_points、notes_for_interviewerは配列形式で、それぞれ3-5個の項目を提供してください
- 具体的で実用的な内容にしてください
- summaryは200-300文字程度で記述してください
"#;

/// System prompt used when the API version cannot enforce a schema.
pub const LEGACY_SYSTEM_PROMPT: &str = r#"あなたは人事の専門家です。Talent Analytics（性格・価値観診断）の受検結果レポートを分析し、
面接官向けのブリーフィング情報を提供してください。

以下のJSON形式で回答してください。JSON以外の説明やコメントは一切含めないでください。

{
  "summary": "候補者の総合的な特徴の要約（日本語、200-300文字程度）",
  "risk_points": ["見定めポイント（リスク）1", "見定めポイント（リスク）2", "見定めポイント（リスク）3"],
  "attract_points": ["アトラクトポイント（強み）1", "アトラクトポイント（強み）2", "アトラクトポイント（強み）3"],
  "notes_for_interviewer": ["面接官向けの進め方メモ1", "面接官向けの進め方メモ2", "面接官向けの進め方メモ3"]
}

重要：
- すべての項目は日本語で記述してください
- risk_points、attract_points、notes_for_interviewerは配列形式で、それぞれ3-5個の項目を提供してください
- 具体的で実用的な内容にしてください
- 返答はJSON形式のみです（コードブロックやマークダウン記号は使用しないでください）
- JSONの前後に余計なテキストを付けないでください
"#;

/// How the output shape is enforced for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    /// Strict `json_schema` response format attached to the request.
    Schema,
    /// Shape described in the prompt text only.
    Legacy,
}

/// A ready-to-send pair of messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub mode: PromptMode,
    pub system: String,
    pub user: String,
}

/// Build the user message around the report text.
pub fn user_prompt(report_text: &str) -> String {
    format!("以下のTalent Analytics受検結果レポートを分析してください：\n\n{report_text}\n")
}

/// Keep at most `max_chars` characters (not bytes) of `text`.
///
/// Returns the input unchanged when it is within budget.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => &text[..cut],
        None => text,
    }
}

/// Truncate the report text and assemble the messages for `mode`.
pub fn build_prompt(report_text: &str, max_chars: usize, schema_capable: bool) -> Prompt {
    let text = truncate_chars(report_text, max_chars);
    if text.len() < report_text.len() {
        warn!(
            "Report text is {} characters; only the first {} are sent",
            report_text.chars().count(),
            max_chars
        );
    }

    let (mode, system) = if schema_capable {
        (PromptMode::Schema, SCHEMA_SYSTEM_PROMPT)
    } else {
        (PromptMode::Legacy, LEGACY_SYSTEM_PROMPT)
    };

    Prompt {
        mode,
        system: system.to_string(),
        user: user_prompt(text),
    }
}
