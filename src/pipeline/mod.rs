//! Pipeline stages for assessment-report analysis.
//!
//! Each submodule implements exactly one step.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ (prompts) ──▶ llm ──▶ normalize
//! (path)    (pdfium)                 (HTTP)   (JSON → StructuredFinding)
//! ```
//!
//! 1. [`input`]: validate the local path, or stage uploaded bytes in a
//!    temp file that is removed on every exit path
//! 2. [`extract`]: page-ordered text layer via pdfium; runs in
//!    `spawn_blocking` because pdfium is not async-safe
//! 3. [`llm`]: one structured-completion request, with a single
//!    retry when the schema parameter itself is rejected; [`azure`] is the
//!    only stage with network I/O
//! 4. [`normalize`]: fence stripping, JSON parse and two-tier validation

pub mod azure;
pub mod extract;
pub mod input;
pub mod llm;
pub mod normalize;
