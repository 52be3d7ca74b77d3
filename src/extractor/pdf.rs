use std::fs;
use std::path::Path;

use regex::Regex;

use crate::extractor::dispatcher::{ExtractedFile, ExtractionError, Payload};
use crate::stats::Table;

/// Cell boundary inside a text line: a tab, or a run of two or more spaces.
const CELL_SPLIT: &str = r"\t|\s{2,}";

/// Extracts the text of a PDF page by page and recovers grid-shaped tables
/// from aligned text runs.
pub fn extract(path: &Path) -> Result<ExtractedFile, ExtractionError> {
    let bytes = fs::read(path).map_err(|source| ExtractionError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let pages = pdf_extract::extract_text_from_mem_by_pages(&bytes).map_err(|e| {
        ExtractionError::Parse {
            format: "pdf",
            path: path.to_path_buf(),
            detail: e.to_string(),
        }
    })?;

    let mut tables = Vec::new();
    if let Ok(splitter) = Regex::new(CELL_SPLIT) {
        for page in &pages {
            tables.extend(detect_grids(page, &splitter));
        }
    }

    Ok(ExtractedFile::new(Payload::Pdf {
        text: pages.join("\n"),
        tables,
    }))
}

/// Scans a page for runs of consecutive lines that split into the same
/// number of cells. A run of at least two such lines is treated as a table,
/// with the first line as its header.
fn detect_grids(page: &str, splitter: &Regex) -> Vec<Table> {
    let mut tables = Vec::new();
    let mut group: Vec<Vec<String>> = Vec::new();

    for line in page.lines() {
        let cells = split_cells(line, splitter);
        match cells {
            Some(cells) if group.is_empty() || cells.len() == group[0].len() => {
                group.push(cells);
            }
            Some(cells) => {
                flush_group(&mut group, &mut tables);
                group.push(cells);
            }
            None => flush_group(&mut group, &mut tables),
        }
    }
    flush_group(&mut group, &mut tables);

    tables
}

/// Splits a line on cell boundaries. Lines with fewer than two cells are
/// not grid candidates.
fn split_cells(line: &str, splitter: &Regex) -> Option<Vec<String>> {
    let cells: Vec<String> = splitter
        .split(line.trim())
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .map(str::to_string)
        .collect();

    if cells.len() >= 2 {
        Some(cells)
    } else {
        None
    }
}

fn flush_group(group: &mut Vec<Vec<String>>, tables: &mut Vec<Table>) {
    if group.len() >= 2 {
        if let Some(table) = Table::from_grid(std::mem::take(group)) {
            tables.push(table);
        }
    }
    group.clear();
}
