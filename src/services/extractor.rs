//! Document extractor
//!
//! Converts an uploaded PDF, DOCX, plain-text or spreadsheet file into plain text

use crate::utils::error::{AppError, AppResult, ErrorContext};
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use docx_rs::{DocumentChild, Paragraph, ParagraphChild, RunChild};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// Characters of extracted text shown as a preview
pub const PREVIEW_CHARS: usize = 1000;

/// Supported upload kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Docx,
    Txt,
    Spreadsheet,
}

impl DocumentKind {
    /// Detect the kind from a file name extension (case-insensitive)
    pub fn from_filename(name: &str) -> AppResult<Self> {
        let extension = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| AppError::UnsupportedFormat(name.to_string()))?;

        match extension.as_str() {
            "pdf" => Ok(DocumentKind::Pdf),
            "docx" => Ok(DocumentKind::Docx),
            "txt" => Ok(DocumentKind::Txt),
            "xlsx" | "xlsm" | "xls" | "ods" => Ok(DocumentKind::Spreadsheet),
            _ => Err(AppError::UnsupportedFormat(format!(".{}", extension))),
        }
    }
}

/// Extract the text content of `bytes` interpreted as `kind`
pub fn extract_text(bytes: &[u8], kind: DocumentKind) -> AppResult<String> {
    let text = match kind {
        DocumentKind::Pdf => extract_pdf(bytes)?,
        DocumentKind::Docx => extract_docx(bytes)?,
        DocumentKind::Txt => String::from_utf8(bytes.to_vec())
            .extraction_context("Text file is not valid UTF-8")?,
        DocumentKind::Spreadsheet => extract_spreadsheet(bytes)?,
    };

    debug!("Extracted {} chars from {:?} document", text.chars().count(), kind);
    Ok(text)
}

/// Detect the kind from `filename` and extract
pub fn extract_upload(filename: &str, bytes: &[u8]) -> AppResult<(DocumentKind, String)> {
    let kind = DocumentKind::from_filename(filename)?;
    let text = extract_text(bytes, kind)?;
    Ok((kind, text))
}

/// Concatenate the text of every page in page order
fn extract_pdf(bytes: &[u8]) -> AppResult<String> {
    let document = lopdf::Document::load_mem(bytes)
        .extraction_context("Failed to read PDF")?;

    // get_pages is keyed by page number, so iteration is in page order
    let mut text = String::new();
    for page_number in document.get_pages().keys() {
        let page_text = document
            .extract_text(&[*page_number])
            .extraction_context(&format!("Failed to extract text from page {}", page_number))?;
        text.push_str(&page_text);
    }

    Ok(text)
}

/// Paragraph texts joined by newline, in document order
fn extract_docx(bytes: &[u8]) -> AppResult<String> {
    let docx = docx_rs::read_docx(bytes)
        .map_err(|e| AppError::Extraction(format!("Failed to read DOCX: {:?}", e)))?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(paragraph) => Some(paragraph_text(paragraph)),
            _ => None,
        })
        .collect();

    Ok(paragraphs.join("\n"))
}

/// Runs of one paragraph, concatenated without separator
fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    collect_text(&paragraph.children, &mut text);
    text
}

fn collect_text(children: &[ParagraphChild], text: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for run_child in &run.children {
                    if let RunChild::Text(t) = run_child {
                        text.push_str(&t.text);
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => collect_text(&link.children, text),
            _ => {}
        }
    }
}

/// Render the first worksheet as a text table
fn extract_spreadsheet(bytes: &[u8]) -> AppResult<String> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .extraction_context("Failed to open spreadsheet")?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::Extraction("Spreadsheet has no worksheets".to_string()))?
        .extraction_context("Failed to read first worksheet")?;

    Ok(render_range(&range))
}

/// Render cells as an aligned table
///
/// The first row is the header; every following row is prefixed with its
/// zero-based index. Cells are right-aligned to their column width.
pub fn render_range(range: &Range<Data>) -> String {
    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect();

    let Some((header, body)) = rows.split_first() else {
        return String::new();
    };

    let index_width = body.len().saturating_sub(1).to_string().len();
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in body {
        for (col, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            if col < widths.len() {
                widths[col] = widths[col].max(len);
            } else {
                widths.push(len);
            }
        }
    }

    let render_row = |lead: &str, cells: &[String]| -> String {
        let mut line = format!("{:>width$}", lead, width = index_width);
        for (col, width) in widths.iter().enumerate() {
            let cell = cells.get(col).map(String::as_str).unwrap_or("");
            line.push_str("  ");
            line.push_str(&format!("{:>width$}", cell, width = *width));
        }
        line.trim_end().to_string()
    };

    let mut lines = Vec::with_capacity(rows.len());
    lines.push(render_row("", header));
    for (i, row) in body.iter().enumerate() {
        lines.push(render_row(&i.to_string(), row));
    }

    lines.join("\n")
}

/// First `PREVIEW_CHARS` characters of extracted text
pub fn preview(text: &str) -> &str {
    crate::utils::text::leading_chars(text, PREVIEW_CHARS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_filename() {
        assert_eq!(DocumentKind::from_filename("nota.pdf").unwrap(), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_filename("Nota.DOCX").unwrap(), DocumentKind::Docx);
        assert_eq!(DocumentKind::from_filename("a.b.txt").unwrap(), DocumentKind::Txt);
        assert_eq!(DocumentKind::from_filename("data.xlsx").unwrap(), DocumentKind::Spreadsheet);
    }

    #[test]
    fn test_unsupported_kinds() {
        assert!(matches!(DocumentKind::from_filename("slides.pptx"), Err(AppError::UnsupportedFormat(_))));
        assert!(matches!(DocumentKind::from_filename("README"), Err(AppError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_extract_txt() {
        let text = extract_text("Solat lima waktu".as_bytes(), DocumentKind::Txt).unwrap();
        assert_eq!(text, "Solat lima waktu");
    }

    #[test]
    fn test_extract_txt_invalid_utf8() {
        let result = extract_text(&[0xff, 0xfe, 0x00], DocumentKind::Txt);
        assert!(matches!(result, Err(AppError::Extraction(_))));
    }

    #[test]
    fn test_extract_invalid_pdf_and_spreadsheet() {
        assert!(matches!(extract_text(b"not a pdf", DocumentKind::Pdf), Err(AppError::Extraction(_))));
        assert!(matches!(extract_text(b"not a workbook", DocumentKind::Spreadsheet), Err(AppError::Extraction(_))));
    }

    #[test]
    fn test_render_range() {
        let mut range = Range::new((0, 0), (2, 1));
        range.set_value((0, 0), Data::String("Nama".to_string()));
        range.set_value((0, 1), Data::String("Bil".to_string()));
        range.set_value((1, 0), Data::String("Zakat".to_string()));
        range.set_value((1, 1), Data::Int(2));
        range.set_value((2, 0), Data::String("Haji".to_string()));
        range.set_value((2, 1), Data::Int(10));

        let rendered = render_range(&range);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "    Nama  Bil");
        assert_eq!(lines[1], "0  Zakat    2");
        assert_eq!(lines[2], "1   Haji   10");
    }

    #[test]
    fn test_render_empty_range() {
        let range: Range<Data> = Range::empty();
        assert_eq!(render_range(&range), "");
    }

    #[test]
    fn test_preview_limit() {
        let text = "x".repeat(PREVIEW_CHARS + 5);
        assert_eq!(preview(&text).len(), PREVIEW_CHARS);
    }
}
