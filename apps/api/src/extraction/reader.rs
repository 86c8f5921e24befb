//! Document Reader — turns a PDF or DOCX file on disk into plain text.
//!
//! Parsing runs on the blocking pool. Parser panics on malformed input surface
//! as `ReadError::Parser` instead of taking the batch down.

use std::path::Path;

use docx_rs::{
    DocumentChild, InsertChild, Paragraph, ParagraphChild, Run, RunChild, Table,
    TableCellContent, TableChild, TableRowChild,
};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Declares a document type from its file-name extension (case-insensitive).
    pub fn from_file_name(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("pdf") {
            Some(DocumentKind::Pdf)
        } else if ext.eq_ignore_ascii_case("docx") {
            Some(DocumentKind::Docx)
        } else {
            None
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Docx => "docx",
        }
    }
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF parse error: {0}")]
    Pdf(String),

    #[error("DOCX parse error: {0}")]
    Docx(String),

    #[error("parser aborted: {0}")]
    Parser(String),
}

/// Reads a document and returns its text with page/paragraph order preserved.
pub async fn read_document(path: &Path, kind: DocumentKind) -> Result<String, ReadError> {
    debug!("Reading {} document: {:?}", kind.extension(), path);

    let bytes = tokio::fs::read(path).await?;

    tokio::task::spawn_blocking(move || match kind {
        DocumentKind::Pdf => pdf_text(&bytes),
        DocumentKind::Docx => docx_text(&bytes),
    })
    .await
    .map_err(|e| ReadError::Parser(e.to_string()))?
}

fn pdf_text(bytes: &[u8]) -> Result<String, ReadError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ReadError::Pdf(e.to_string()))
}

fn docx_text(bytes: &[u8]) -> Result<String, ReadError> {
    let docx = docx_rs::read_docx(bytes).map_err(|e| ReadError::Docx(e.to_string()))?;

    let mut paragraphs = Vec::new();
    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(p) => paragraphs.push(paragraph_text(p)),
            DocumentChild::Table(t) => table_paragraphs(t, &mut paragraphs),
            _ => {}
        }
    }

    Ok(paragraphs.join("\n"))
}

/// Cell paragraphs in row order; nested tables are read in place.
fn table_paragraphs(table: &Table, out: &mut Vec<String>) {
    for TableChild::TableRow(row) in &table.rows {
        for TableRowChild::TableCell(cell) in &row.cells {
            for content in &cell.children {
                match content {
                    TableCellContent::Paragraph(p) => out.push(paragraph_text(p)),
                    TableCellContent::Table(t) => table_paragraphs(t, out),
                    _ => {}
                }
            }
        }
    }
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    push_children(&paragraph.children, &mut text);
    text
}

fn push_children(children: &[ParagraphChild], text: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => push_run(run, text),
            // Links keep their visible text in runs under the hyperlink.
            ParagraphChild::Hyperlink(link) => push_children(&link.children, text),
            ParagraphChild::Insert(insert) => {
                for child in &insert.children {
                    if let InsertChild::Run(run) = child {
                        push_run(run, text);
                    }
                }
            }
            _ => {}
        }
    }
}

fn push_run(run: &Run, text: &mut String) {
    for child in &run.children {
        match child {
            RunChild::Text(t) => text.push_str(&t.text),
            RunChild::Tab(_) | RunChild::PTab(_) => text.push('\t'),
            RunChild::Break(_) | RunChild::CarriageReturn(_) => text.push('\n'),
            _ => {}
        }
    }
}
