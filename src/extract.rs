//! Multi-format text extraction for uploaded documents (PDF, spreadsheets).
//!
//! The upload boundary supplies bytes + a declared media type; this module
//! classifies the document from the media type alone and returns plain UTF-8
//! text. The two formats fail at different granularities:
//!
//! - **PDF**: pages without extractable text are skipped silently; a
//!   structurally corrupt file aborts the whole extraction.
//! - **Spreadsheet**: a sheet that fails to parse is skipped with a warning;
//!   extraction fails only when no sheet succeeds.

use std::io::Cursor;
use std::panic::{self, AssertUnwindSafe};

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use serde::Serialize;
use thiserror::Error;

use crate::models::{DocumentKind, ExtractedContext};

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const MIME_XLS: &str = "application/vnd.ms-excel";

/// Extraction error. Its `Display` form is shown to the user as-is.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
    #[error("Error processing file: {0}")]
    MalformedDocument(String),
}

/// A sheet that could not be read. Non-fatal unless every sheet fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetWarning {
    pub sheet: String,
    pub message: String,
}

/// Successful extraction result: the context plus non-fatal warnings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub context: ExtractedContext,
    pub warnings: Vec<SheetWarning>,
}

/// Display-only preview of an uploaded document. Never part of the context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Preview {
    Text { text: String },
    Table { sheet: String, rows: Vec<Vec<String>> },
}

/// Maps a declared media type to a document kind. Exact match only.
pub fn classify(media_type: &str) -> DocumentKind {
    match media_type {
        MIME_PDF => DocumentKind::Pdf,
        MIME_XLSX | MIME_XLS => DocumentKind::Spreadsheet,
        _ => DocumentKind::Unsupported,
    }
}

/// Extracts the full text of a document. Unsupported media types fail
/// without touching the bytes.
pub fn extract(bytes: &[u8], media_type: &str) -> Result<Extraction, ExtractionError> {
    match classify(media_type) {
        DocumentKind::Pdf => {
            let text = extract_pdf(bytes)?;
            Ok(Extraction {
                context: ExtractedContext::new(text, DocumentKind::Pdf),
                warnings: Vec::new(),
            })
        }
        DocumentKind::Spreadsheet => {
            let (text, warnings) = extract_spreadsheet(bytes)?;
            Ok(Extraction {
                context: ExtractedContext::new(text, DocumentKind::Spreadsheet),
                warnings,
            })
        }
        DocumentKind::Unsupported => Err(ExtractionError::UnsupportedFormat(
            media_type.to_string(),
        )),
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractionError> {
    // pdf-extract panics on some malformed font and xref tables.
    let pages = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    }))
    .map_err(|_| ExtractionError::MalformedDocument("PDF parser aborted".to_string()))?
    .map_err(|e| ExtractionError::MalformedDocument(e.to_string()))?;
    Ok(join_pages(pages))
}

/// Concatenates page texts in order, each followed by a single newline.
/// Pages with no text (scanned or image-only) contribute nothing. Line breaks
/// the parser leaves around a page are dropped; spacing inside lines is kept.
pub fn join_pages<I, S>(pages: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for (idx, page) in pages.into_iter().enumerate() {
        let page = page.as_ref();
        if page.trim().is_empty() {
            tracing::debug!(page = idx + 1, "skipping PDF page without text");
            continue;
        }
        out.push_str(page.trim_matches(|c| c == '\n' || c == '\r'));
        out.push('\n');
    }
    out
}

fn extract_spreadsheet(bytes: &[u8]) -> Result<(String, Vec<SheetWarning>), ExtractionError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| ExtractionError::MalformedDocument(e.to_string()))?;
    let sheet_names = workbook.sheet_names();

    let mut out = String::new();
    let mut warnings = Vec::new();
    let mut succeeded = 0usize;
    for name in sheet_names {
        match workbook.worksheet_range(&name) {
            Ok(range) => {
                out.push_str("Sheet: ");
                out.push_str(&name);
                out.push('\n');
                out.push_str(&render_table(&range_rows(&range)));
                out.push_str("\n\n");
                succeeded += 1;
            }
            Err(e) => {
                tracing::warn!(sheet = %name, error = %e, "skipping unreadable sheet");
                warnings.push(SheetWarning {
                    sheet: name,
                    message: e.to_string(),
                });
            }
        }
    }

    if succeeded == 0 {
        let detail = match warnings.first() {
            Some(w) => format!("no readable sheets (first failure in '{}': {})", w.sheet, w.message),
            None => "workbook declares no sheets".to_string(),
        };
        return Err(ExtractionError::MalformedDocument(detail));
    }
    Ok((out, warnings))
}

/// Header row plus up to `rows` leading rows of the first declared sheet.
pub fn spreadsheet_preview(bytes: &[u8], rows: usize) -> Result<Preview, ExtractionError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| ExtractionError::MalformedDocument(e.to_string()))?;
    let sheet = workbook
        .sheet_names()
        .into_iter()
        .next()
        .ok_or_else(|| ExtractionError::MalformedDocument("workbook declares no sheets".into()))?;
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| ExtractionError::MalformedDocument(e.to_string()))?;
    let mut grid = range_rows(&range);
    grid.truncate(rows + 1);
    Ok(Preview::Table { sheet, rows: grid })
}

/// First `max_chars` characters of `text`, with `...` appended when cut.
pub fn text_preview(text: &str, max_chars: usize) -> Preview {
    let text = match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    };
    Preview::Text { text }
}

fn range_rows(range: &Range<Data>) -> Vec<Vec<String>> {
    range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect()
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        other => other.to_string(),
    }
}

/// Renders rows as left-aligned columns separated by two spaces.
/// The first row is the header. Lines carry no trailing whitespace.
pub fn render_table(rows: &[Vec<String>]) -> String {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for row in rows {
        for (col, cell) in row.iter().enumerate() {
            widths[col] = widths[col].max(cell.chars().count());
        }
    }

    let lines: Vec<String> = rows
        .iter()
        .map(|row| {
            let mut line = String::new();
            for (col, cell) in row.iter().enumerate() {
                if col > 0 {
                    line.push_str("  ");
                }
                line.push_str(cell);
                let pad = widths[col] - cell.chars().count();
                line.extend(std::iter::repeat(' ').take(pad));
            }
            line.trim_end().to_string()
        })
        .collect();
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_is_exact() {
        assert_eq!(classify(MIME_PDF), DocumentKind::Pdf);
        assert_eq!(classify(MIME_XLSX), DocumentKind::Spreadsheet);
        assert_eq!(classify(MIME_XLS), DocumentKind::Spreadsheet);
        assert_eq!(classify("text/plain"), DocumentKind::Unsupported);
        assert_eq!(classify("APPLICATION/PDF"), DocumentKind::Unsupported);
        assert_eq!(classify(""), DocumentKind::Unsupported);
    }

    #[test]
    fn unsupported_media_type_returns_error() {
        let err = extract(b"Revenue: $500,000", "text/plain").unwrap_err();
        assert_eq!(err, ExtractionError::UnsupportedFormat("text/plain".into()));
    }

    #[test]
    fn invalid_pdf_is_malformed() {
        let err = extract(b"not a pdf", MIME_PDF).unwrap_err();
        assert!(matches!(err, ExtractionError::MalformedDocument(_)));
    }

    #[test]
    fn invalid_workbook_is_malformed() {
        for mime in [MIME_XLSX, MIME_XLS] {
            let err = extract(b"not a workbook", mime).unwrap_err();
            assert!(matches!(err, ExtractionError::MalformedDocument(_)));
        }
    }

    #[test]
    fn join_pages_skips_pages_without_text() {
        let text = join_pages(["Revenue: $500,000", "", "  \n ", "Net income: $80,000"]);
        assert_eq!(text, "Revenue: $500,000\nNet income: $80,000\n");
    }

    #[test]
    fn join_pages_keeps_spacing_inside_page() {
        let text = join_pages(["\n  Revenue   $500,000  \n\n"]);
        assert_eq!(text, "  Revenue   $500,000  \n");
    }

    #[test]
    fn join_pages_of_image_only_document_is_empty() {
        assert_eq!(join_pages(["", "\n\n"]), "");
    }

    #[test]
    fn render_table_aligns_columns() {
        let rows = vec![
            vec!["Quarter".to_string(), "Revenue".to_string()],
            vec!["Q1".to_string(), "500000".to_string()],
        ];
        assert_eq!(render_table(&rows), "Quarter  Revenue\nQ1       500000");
    }

    #[test]
    fn render_table_keeps_empty_cells_in_place() {
        let rows = vec![
            vec!["a".to_string(), "".to_string(), "c".to_string()],
            vec!["".to_string(), "bb".to_string(), "".to_string()],
        ];
        assert_eq!(render_table(&rows), "a      c\n   bb");
    }

    #[test]
    fn text_preview_truncates_on_char_boundary() {
        let preview = text_preview("€€€€", 2);
        assert_eq!(
            preview,
            Preview::Text {
                text: "€€...".to_string()
            }
        );
        let short = text_preview("abc", 500);
        assert_eq!(
            short,
            Preview::Text {
                text: "abc".to_string()
            }
        );
    }
}
