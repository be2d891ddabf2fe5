//! rescore Parser - Text extraction for uploaded documents
//!
//! Accepted upload formats:
//! - PDF documents
//! - Microsoft Word (DOCX)
//! - Markdown and plain text files
//!
//! Each parser implements the `DocumentParser` trait and produces a
//! `ParsedDocument` holding the ordered text segments (pages or
//! paragraphs) and their concatenation. Uploaded bytes are staged into a
//! temporary file for the duration of a single parse; see [`staging`].

use std::path::Path;
use thiserror::Error;
use tracing::warn;

pub mod docx;
pub mod pdf;
pub mod staging;

pub use docx::DocxParser;
pub use pdf::PdfParser;
pub use staging::StagedUpload;

// ============================================================================
// Error Types
// ============================================================================

/// Failures turning an upload into text
#[derive(Error, Debug)]
pub enum ParserError {
    /// No parser for the file extension
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// IO error while reading the file
    #[error("IO error reading file: {path}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Staging an upload into a temporary file failed
    #[error("Failed to stage upload {name}")]
    StagingError {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// PDF parsing error
    #[error("PDF parsing error: {0}")]
    PdfError(String),

    /// DOCX parsing error
    #[error("DOCX parsing error: {0}")]
    DocxError(String),

    /// Encoding error
    #[error("Text encoding error: {0}")]
    EncodingError(String),
}

pub type Result<T> = std::result::Result<T, ParserError>;

// ============================================================================
// Parsed Document Types
// ============================================================================

/// Text extracted from one resume or JD
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// Original file name or path
    pub file_path: String,

    /// Detected file type
    pub file_type: FileType,

    /// Extracted text content (all segments concatenated)
    pub content: String,

    /// Ordered text segments, one per page or paragraph
    pub segments: Vec<String>,

    /// Page count, when the format exposes one
    pub page_count: Option<u32>,
}

impl ParsedDocument {
    /// Empty document of the given type
    pub fn new(file_path: impl Into<String>, file_type: FileType) -> Self {
        Self {
            file_path: file_path.into(),
            file_type,
            content: String::new(),
            segments: Vec::new(),
            page_count: None,
        }
    }

    /// Set segments; content becomes their concatenation
    pub fn with_segments(mut self, segments: Vec<String>) -> Self {
        self.content = segments.concat();
        self.segments = segments;
        self
    }

    /// Whitespace-separated words of extracted text
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }

    /// Whether the document produced any non-whitespace text
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Upload formats, detected by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Pdf,
    Docx,
    Markdown,
    PlainText,
    Unknown,
}

impl FileType {
    /// Case-insensitive extension lookup
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            "md" | "markdown" => Self::Markdown,
            "txt" => Self::PlainText,
            _ => Self::Unknown,
        }
    }

    /// File type of a path, `Unknown` without an extension
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Unknown)
    }

    /// Canonical extension for staged copies
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            Self::Pdf => Some("pdf"),
            Self::Docx => Some("docx"),
            Self::Markdown => Some("md"),
            Self::PlainText => Some("txt"),
            Self::Unknown => None,
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pdf => write!(f, "pdf"),
            Self::Docx => write!(f, "docx"),
            Self::Markdown => write!(f, "markdown"),
            Self::PlainText => write!(f, "text"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

// ============================================================================
// Parser Trait
// ============================================================================

/// Text extraction for one family of file formats
pub trait DocumentParser: Send + Sync {
    /// Extract text from a file on disk
    fn parse(&self, path: &Path) -> Result<ParsedDocument>;

    /// File types this parser accepts
    fn supported_types(&self) -> &[FileType];

    /// Check if this parser can handle a file type
    fn can_parse(&self, file_type: FileType) -> bool {
        self.supported_types().contains(&file_type)
    }
}

// ============================================================================
// Parser Registry
// ============================================================================

/// Parsers keyed by the file types they accept
pub struct ParserRegistry {
    parsers: Vec<Box<dyn DocumentParser>>,
}

impl ParserRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    /// Registry with the PDF, DOCX and plain text parsers
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(PdfParser::new());
        registry.register(DocxParser::new());
        registry.register(PlainTextParser);
        registry
    }

    /// Register a parser
    pub fn register<P: DocumentParser + 'static>(&mut self, parser: P) {
        self.parsers.push(Box::new(parser));
    }

    /// First registered parser accepting `file_type`
    pub fn find_parser(&self, file_type: FileType) -> Option<&dyn DocumentParser> {
        self.parsers
            .iter()
            .find(|p| p.can_parse(file_type))
            .map(|p| p.as_ref())
    }

    /// Extract text from a file on disk, choosing the parser by extension
    pub fn parse(&self, path: &Path) -> Result<ParsedDocument> {
        let file_type = FileType::from_path(path);
        let parser = self.parser_for(file_type, path)?;
        parser.parse(path)
    }

    /// Parse uploaded bytes.
    ///
    /// The bytes are written to a temporary file that is removed before this
    /// returns, whether or not extraction succeeded. A failed removal is
    /// logged and does not fail the parse. The returned document is labelled
    /// with the upload's original name.
    pub fn parse_upload(&self, name: &str, bytes: &[u8]) -> Result<ParsedDocument> {
        let file_type = FileType::from_path(Path::new(name));
        let parser = self.parser_for(file_type, Path::new(name))?;

        let staged = StagedUpload::new(name, file_type, bytes)?;
        let parsed = parser.parse(staged.path());
        if let Err(e) = staged.close() {
            warn!(upload = name, error = %e, "Failed to remove staged upload");
        }

        let mut doc = parsed?;
        doc.file_path = name.to_string();
        Ok(doc)
    }

    fn parser_for(&self, file_type: FileType, path: &Path) -> Result<&dyn DocumentParser> {
        if file_type == FileType::Unknown {
            return Err(ParserError::UnsupportedFormat(
                path.extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("none")
                    .to_string(),
            ));
        }

        self.find_parser(file_type)
            .ok_or_else(|| ParserError::UnsupportedFormat(file_type.to_string()))
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ============================================================================
// Plain Text
// ============================================================================

/// Plain text parser
pub struct PlainTextParser;

impl DocumentParser for PlainTextParser {
    fn parse(&self, path: &Path) -> Result<ParsedDocument> {
        let bytes = std::fs::read(path).map_err(|e| ParserError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        let content = String::from_utf8(bytes)
            .map_err(|e| ParserError::EncodingError(format!("{}: {e}", path.display())))?;

        let file_type = match FileType::from_path(path) {
            FileType::Markdown => FileType::Markdown,
            _ => FileType::PlainText,
        };

        Ok(ParsedDocument::new(path.display().to_string(), file_type).with_segments(vec![content]))
    }

    fn supported_types(&self) -> &[FileType] {
        &[FileType::PlainText, FileType::Markdown]
    }
}

// ============================================================================
// Tests
// ============================================================================
