use std::path::Path;

use anyhow::{Context, Result};
use bytes::Bytes;

use crate::errors::ValidationError;

const PDF_MIME: &str = "application/pdf";
const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// A resume the user picked, held in memory until it is posted as the `resume` form field.
#[derive(Debug, Clone)]
pub struct ResumeFile {
    pub file_name: String,
    pub content: Bytes,
}

impl ResumeFile {
    pub fn new(file_name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self> {
        let content = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read resume at {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .with_context(|| format!("'{}' does not name a file", path.display()))?;
        Ok(Self::new(file_name, content))
    }

    /// The backend only extracts text from PDF and DOCX; reject anything else up front.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.file_name.trim().is_empty() || self.content.is_empty() {
            return Err(ValidationError::EmptyFile);
        }
        self.mime_type().map(|_| ())
    }

    pub fn mime_type(&self) -> Result<&'static str, ValidationError> {
        let extension = Path::new(&self.file_name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "pdf" => Ok(PDF_MIME),
            "docx" => Ok(DOCX_MIME),
            _ => Err(ValidationError::UnsupportedFile(self.file_name.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_pdf_and_docx_are_accepted_case_insensitively() {
        assert_eq!(ResumeFile::new("cv.PDF", "x").mime_type(), Ok(PDF_MIME));
        assert_eq!(ResumeFile::new("cv.docx", "x").mime_type(), Ok(DOCX_MIME));
        assert!(ResumeFile::new("cv.docx", "x").validate().is_ok());
    }

    #[test]
    fn test_other_extensions_are_rejected() {
        assert_eq!(
            ResumeFile::new("cv.txt", "x").validate(),
            Err(ValidationError::UnsupportedFile("cv.txt".to_string()))
        );
        assert!(ResumeFile::new("resume", "x").validate().is_err());
    }

    #[test]
    fn test_empty_content_is_rejected() {
        assert_eq!(
            ResumeFile::new("cv.pdf", Bytes::new()).validate(),
            Err(ValidationError::EmptyFile)
        );
    }

    #[tokio::test]
    async fn test_from_path_reads_name_and_bytes() {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        file.write_all(b"%PDF-1.4 resume").unwrap();

        let resume = ResumeFile::from_path(file.path()).await.unwrap();
        assert!(resume.file_name.ends_with(".pdf"));
        assert_eq!(&resume.content[..], b"%PDF-1.4 resume");
    }

    #[tokio::test]
    async fn test_from_path_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = ResumeFile::from_path(&dir.path().join("nope.pdf")).await.unwrap_err();
        assert!(err.to_string().contains("Failed to read resume"));
    }
}
