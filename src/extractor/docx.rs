use std::fs;
use std::path::Path;

use regex::Regex;

use crate::extractor::dispatcher::{ExtractedFile, ExtractionError, Payload};
use crate::stats::Table;

/// Token shape for numeric mining: optional sign, then digits with
/// grouping/decimal separators.
const NUMERIC_TOKEN: &str = r"[-+]?\d[\d.,]*";

/// Extracts paragraph texts and tables from a DOCX document, plus the
/// numeric series mined from the paragraphs.
pub fn extract(path: &Path) -> Result<ExtractedFile, ExtractionError> {
    let bytes = fs::read(path).map_err(|source| ExtractionError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let docx = docx_rs::read_docx(&bytes).map_err(|e| ExtractionError::Parse {
        format: "docx",
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    let mut paragraphs = Vec::new();
    let mut tables = Vec::new();

    for child in &docx.document.children {
        match child {
            docx_rs::DocumentChild::Paragraph(paragraph) => {
                let text = paragraph_text(paragraph);
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    paragraphs.push(trimmed.to_string());
                }
            }
            docx_rs::DocumentChild::Table(docx_table) => {
                if let Some(table) = Table::from_grid(table_grid(docx_table)) {
                    tables.push(table);
                }
            }
            _ => {}
        }
    }

    let numbers = mine_numbers(&paragraphs);

    Ok(ExtractedFile::new(Payload::Docx {
        paragraphs,
        tables,
        numbers,
    }))
}

fn paragraph_text(paragraph: &docx_rs::Paragraph) -> String {
    let mut content = String::new();
    for child in &paragraph.children {
        if let docx_rs::ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                if let docx_rs::RunChild::Text(text) = run_child {
                    content.push_str(&text.text);
                }
            }
        }
    }
    content
}

fn table_grid(table: &docx_rs::Table) -> Vec<Vec<String>> {
    let mut grid = Vec::new();
    for table_child in &table.rows {
        let docx_rs::TableChild::TableRow(row) = table_child;
        let mut cells = Vec::new();
        for row_child in &row.cells {
            let docx_rs::TableRowChild::TableCell(cell) = row_child;
            let mut cell_text = String::new();
            for cell_child in &cell.children {
                if let docx_rs::TableCellContent::Paragraph(paragraph) = cell_child {
                    let text = paragraph_text(paragraph);
                    if !cell_text.is_empty() {
                        cell_text.push(' ');
                    }
                    cell_text.push_str(&text);
                }
            }
            cells.push(cell_text.trim().to_string());
        }
        if !cells.is_empty() {
            grid.push(cells);
        }
    }
    grid
}

/// Collects every numeric token from the paragraphs, normalizing European
/// grouping: thousands dots are stripped, a decimal comma becomes a decimal
/// point, so `1.234,56` yields 1234.56. Tokens that still fail to parse are
/// skipped.
fn mine_numbers(paragraphs: &[String]) -> Vec<f64> {
    let pattern = match Regex::new(NUMERIC_TOKEN) {
        Ok(pattern) => pattern,
        Err(_) => return Vec::new(),
    };

    let mut numbers = Vec::new();
    for paragraph in paragraphs {
        for token in pattern.find_iter(paragraph) {
            let normalized = token.as_str().replace('.', "").replace(',', ".");
            if let Ok(value) = normalized.parse::<f64>() {
                if value.is_finite() {
                    numbers.push(value);
                }
            }
        }
    }
    numbers
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn text(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn cell(content: &str) -> docx_rs::TableCell {
        docx_rs::TableCell::new().add_paragraph(
            docx_rs::Paragraph::new().add_run(docx_rs::Run::new().add_text(content)),
        )
    }

    #[test]
    fn test_mine_numbers_normalizes_separators() {
        assert_eq!(mine_numbers(&text(&["Total: 1.234,56 units"])), vec![1234.56]);
        assert_eq!(mine_numbers(&text(&["grew by 3,5 percent"])), vec![3.5]);
        assert_eq!(mine_numbers(&text(&["+5 up, -3 down"])), vec![5.0, -3.0]);
    }

    #[test]
    fn test_mine_numbers_skips_unparseable_tokens() {
        // After normalization "1,2,3" becomes "1.2.3", which is not a number.
        assert_eq!(mine_numbers(&text(&["versions 1,2,3 released"])), Vec::<f64>::new());
        assert_eq!(mine_numbers(&text(&["no digits here"])), Vec::<f64>::new());
    }

    #[test]
    fn test_extract_built_document() {
        let docx = docx_rs::Docx::new()
            .add_paragraph(
                docx_rs::Paragraph::new()
                    .add_run(docx_rs::Run::new().add_text("  Quarterly summary  ")),
            )
            .add_paragraph(
                docx_rs::Paragraph::new().add_run(docx_rs::Run::new().add_text("   ")),
            )
            .add_paragraph(
                docx_rs::Paragraph::new()
                    .add_run(docx_rs::Run::new().add_text("Total: 1.234,56 units")),
            )
            .add_table(docx_rs::Table::new(vec![
                docx_rs::TableRow::new(vec![cell("item"), cell("qty")]),
                docx_rs::TableRow::new(vec![cell("bolts"), cell("4")]),
                docx_rs::TableRow::new(vec![cell("nuts"), cell("6")]),
            ]));

        let mut buffer = Cursor::new(Vec::new());
        docx.build().pack(&mut buffer).unwrap();

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sample.docx");
        fs::write(&path, buffer.into_inner()).unwrap();

        let extracted = extract(&path).unwrap();
        match extracted.payload {
            Payload::Docx {
                paragraphs,
                tables,
                numbers,
            } => {
                assert_eq!(
                    paragraphs,
                    vec!["Quarterly summary", "Total: 1.234,56 units"]
                );
                assert_eq!(tables.len(), 1);
                assert_eq!(tables[0].columns(), &["item", "qty"]);
                assert_eq!(tables[0].row_count(), 2);
                assert_eq!(numbers, vec![1234.56]);
            }
            other => panic!("expected docx payload, got {:?}", other),
        }
    }

    #[test]
    fn test_corrupt_document_is_a_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.docx");
        fs::write(&path, b"PK\x03\x04not a document").unwrap();

        let result = extract(&path);
        assert!(matches!(result, Err(ExtractionError::Parse { .. })));
    }
}
