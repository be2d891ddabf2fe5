//! Upload staging
//!
//! Parsers read from the filesystem, while uploads arrive as bytes. A
//! `StagedUpload` owns a temporary copy of the upload whose file name keeps
//! the original extension. [`StagedUpload::close`] deletes it and reports a
//! failed removal; dropping the guard also deletes it, silently, so a failed
//! extraction cannot leave artifacts behind.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::{FileType, ParserError, Result};

/// Temporary on-disk copy of an uploaded document
pub struct StagedUpload {
    name: String,
    file: NamedTempFile,
}

impl StagedUpload {
    /// Write `bytes` to a fresh temporary file
    pub fn new(name: &str, file_type: FileType, bytes: &[u8]) -> Result<Self> {
        let staging_err = |source: std::io::Error| ParserError::StagingError {
            name: name.to_string(),
            source,
        };

        let suffix = file_type
            .extension()
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();

        let mut file = tempfile::Builder::new()
            .prefix("rescore-upload-")
            .suffix(&suffix)
            .tempfile()
            .map_err(staging_err)?;

        file.write_all(bytes).map_err(staging_err)?;
        file.flush().map_err(staging_err)?;

        debug!(upload = name, path = %file.path().display(), "Staged upload");

        Ok(Self {
            name: name.to_string(),
            file,
        })
    }

    /// Location of the staged copy
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Delete the staged copy
    pub fn close(self) -> Result<()> {
        let Self { name, file } = self;
        file.close().map_err(|source| ParserError::StagingError {
            name: name.clone(),
            source,
        })?;
        debug!(upload = %name, "Removed staged upload");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DocumentParser, DocxParser};

    #[test]
    fn test_staged_file_keeps_extension() {
        let staged = StagedUpload::new("Jane.Resume.PDF", FileType::Pdf, b"%PDF-1.4").unwrap();

        assert_eq!(FileType::from_path(staged.path()), FileType::Pdf);
        assert_eq!(std::fs::read(staged.path()).unwrap(), b"%PDF-1.4");
    }

    #[test]
    fn test_staged_file_removed_on_drop() {
        let staged = StagedUpload::new("resume.txt", FileType::PlainText, b"hello").unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.exists());

        drop(staged);
        assert!(!path.exists());
    }

    #[test]
    fn test_close_removes_staged_file() {
        let staged = StagedUpload::new("resume.md", FileType::Markdown, b"# Jane").unwrap();
        let path = staged.path().to_path_buf();

        staged.close().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_close_reports_failed_removal() {
        let staged = StagedUpload::new("resume.txt", FileType::PlainText, b"hello").unwrap();
        std::fs::remove_file(staged.path()).unwrap();

        let err = staged.close().unwrap_err();
        assert!(matches!(err, ParserError::StagingError { name, .. } if name == "resume.txt"));
    }

    #[test]
    fn test_staged_file_removed_after_failed_extraction() {
        let staged =
            StagedUpload::new("broken.docx", FileType::Docx, b"not a zip archive").unwrap();
        let path = staged.path().to_path_buf();

        let result = DocxParser::new().parse(staged.path());
        assert!(result.is_err());

        drop(staged);
        assert!(!path.exists());
    }
}
