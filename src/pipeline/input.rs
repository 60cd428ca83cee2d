//! Input resolution: validate a local PDF path, or stage uploaded bytes.
//!
//! pdfium opens documents by path, so uploads are written to a
//! [`NamedTempFile`]. The temp file lives inside [`StagedInput`]; dropping it
//! deletes the file, which covers success, error returns and panics alike.

use crate::error::BriefingError;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// An uploaded PDF written to disk for the duration of one request.
#[derive(Debug)]
pub struct StagedInput {
    file: NamedTempFile,
}

impl StagedInput {
    /// Path of the staged file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Reject names that do not end in `.pdf` (case-insensitive).
pub fn ensure_pdf_filename(filename: &str) -> Result<(), BriefingError> {
    let is_pdf = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));

    if is_pdf {
        Ok(())
    } else {
        Err(BriefingError::UnsupportedFileType {
            filename: filename.to_string(),
        })
    }
}

/// Validate a local file path: it must exist, be readable and start with `%PDF`.
pub fn resolve_local(path: &Path) -> Result<PathBuf, BriefingError> {
    if !path.exists() {
        return Err(BriefingError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    match std::fs::File::open(path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(BriefingError::NotAPdf {
                    path: path.to_path_buf(),
                    magic,
                });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(BriefingError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(BriefingError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path.to_path_buf())
}

/// Write uploaded bytes to a `.pdf` temp file after checking the upload name.
pub fn stage_upload(filename: &str, bytes: &[u8]) -> Result<StagedInput, BriefingError> {
    ensure_pdf_filename(filename)?;

    let mut file = tempfile::Builder::new()
        .prefix("ta-briefing-")
        .suffix(".pdf")
        .tempfile()
        .map_err(|e| BriefingError::Internal(format!("tempfile: {e}")))?;
    file.write_all(bytes)
        .and_then(|_| file.flush())
        .map_err(|e| BriefingError::Internal(format!("tempfile write: {e}")))?;

    debug!(
        "Staged upload '{}' ({} bytes) at {}",
        filename,
        bytes.len(),
        file.path().display()
    );
    Ok(StagedInput { file })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_extension_check() {
        assert!(ensure_pdf_filename("report.pdf").is_ok());
        assert!(ensure_pdf_filename("REPORT.PDF").is_ok());
        assert!(ensure_pdf_filename("dir/candidate_123.Pdf").is_ok());
        assert!(matches!(
            ensure_pdf_filename("notes.txt"),
            Err(BriefingError::UnsupportedFileType { .. })
        ));
        assert!(ensure_pdf_filename("pdf").is_err());
        assert!(ensure_pdf_filename("").is_err());
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = resolve_local(Path::new("/definitely/not/here.pdf")).unwrap_err();
        assert!(matches!(err, BriefingError::FileNotFound { .. }));
    }

    #[test]
    fn wrong_magic_is_not_a_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::write(&path, b"not a pdf at all").unwrap();
        let err = resolve_local(&path).unwrap_err();
        assert!(matches!(err, BriefingError::NotAPdf { magic, .. } if &magic == b"not "));
    }

    #[test]
    fn pdf_header_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok.pdf");
        std::fs::write(&path, b"%PDF-1.4\n").unwrap();
        assert_eq!(resolve_local(&path).unwrap(), path);
    }

    #[test]
    fn staged_upload_removed_on_drop() {
        let staged = stage_upload("upload.pdf", b"%PDF-1.4\n").unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("pdf"));
        drop(staged);
        assert!(!path.exists());
    }

    #[test]
    fn staging_rejects_non_pdf_name() {
        let err = stage_upload("upload.docx", b"%PDF-1.4\n").unwrap_err();
        assert!(matches!(err, BriefingError::UnsupportedFileType { .. }));
    }
}
