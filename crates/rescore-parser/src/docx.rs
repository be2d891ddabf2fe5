//! DOCX document parser using docx-rs
//!
//! Extracts paragraph text from Microsoft Word documents. Each body
//! paragraph becomes one segment terminated by a newline; tables and other
//! body elements are skipped.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use docx_rs::{read_docx, DocumentChild, Paragraph, ParagraphChild, RunChild};

use crate::{DocumentParser, FileType, ParsedDocument, ParserError, Result};

/// DOCX document parser
pub struct DocxParser;

impl DocxParser {
    /// Create a new DOCX parser
    pub fn new() -> Self {
        Self
    }

    fn paragraph_text(para: &Paragraph) -> String {
        let mut text = String::new();
        for child in &para.children {
            if let ParagraphChild::Run(run) = child {
                for run_child in &run.children {
                    if let RunChild::Text(t) = run_child {
                        text.push_str(&t.text);
                    }
                }
            }
        }
        text
    }
}

impl Default for DocxParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentParser for DocxParser {
    fn parse(&self, path: &Path) -> Result<ParsedDocument> {
        let mut file = File::open(path).map_err(|e| ParserError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        let mut buf = Vec::new();
        file.read_to_end(&mut buf)
            .map_err(|e| ParserError::IoError {
                path: path.display().to_string(),
                source: e,
            })?;

        let docx = read_docx(&buf).map_err(|e| ParserError::DocxError(e.to_string()))?;

        let paragraphs = docx
            .document
            .children
            .iter()
            .filter_map(|child| match child {
                DocumentChild::Paragraph(para) => Some(Self::paragraph_text(para) + "\n"),
                _ => None,
            })
            .collect();

        Ok(ParsedDocument::new(path.display().to_string(), FileType::Docx)
            .with_segments(paragraphs))
    }

    fn supported_types(&self) -> &[FileType] {
        &[FileType::Docx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, Run};

    fn write_docx(paragraphs: &[&str]) -> tempfile::NamedTempFile {
        let mut docx = Docx::new();
        for text in paragraphs {
            docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*text)));
        }

        let file = tempfile::Builder::new().suffix(".docx").tempfile().unwrap();
        docx.build().pack(file.reopen().unwrap()).unwrap();
        file
    }

    #[test]
    fn test_paragraphs_become_lines() {
        let file = write_docx(&["Jane Doe", "Skills: Python, Power BI"]);

        let doc = DocxParser::new().parse(file.path()).unwrap();
        assert_eq!(doc.segments.len(), 2);
        assert_eq!(doc.content, "Jane Doe\nSkills: Python, Power BI\n");
    }

    #[test]
    fn test_corrupt_docx() {
        let mut file = tempfile::Builder::new().suffix(".docx").tempfile().unwrap();
        std::io::Write::write_all(&mut file, b"definitely not a zip").unwrap();

        let err = DocxParser::new().parse(file.path()).unwrap_err();
        assert!(matches!(err, ParserError::DocxError(_)));
    }

    #[test]
    fn test_supported_types() {
        let parser = DocxParser::new();
        assert!(parser.can_parse(FileType::Docx));
        assert!(!parser.can_parse(FileType::Pdf));
    }
}
