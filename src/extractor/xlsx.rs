use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::extractor::dispatcher::{ExtractedFile, ExtractionError, Payload, SheetTable};
use crate::stats::Table;

/// Extracts one table per non-empty worksheet. Works for `.xlsx`, `.xls`
/// and `.xlsm` workbooks. A sheet that cannot be parsed is excluded with
/// a warning naming it; the remaining sheets still extract.
pub fn extract(path: &Path) -> Result<ExtractedFile, ExtractionError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| ExtractionError::Parse {
        format: "spreadsheet",
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    let mut sheets = Vec::new();
    let mut warnings = Vec::new();

    for name in workbook.sheet_names() {
        let range = match workbook.worksheet_range(&name) {
            Ok(range) => range,
            Err(e) => {
                warnings.push(format!("sheet '{}' could not be read: {}", name, e));
                continue;
            }
        };

        if range.is_empty() {
            warnings.push(format!("sheet '{}' contains no data", name));
            continue;
        }

        let grid: Vec<Vec<String>> = range
            .rows()
            .map(|row| row.iter().map(format_cell).collect())
            .collect();

        if let Some(table) = Table::with_header_row(grid) {
            sheets.push(SheetTable { name, table });
        }
    }

    Ok(ExtractedFile::with_warnings(
        Payload::Spreadsheet { sheets },
        warnings,
    ))
}

fn format_cell(value: &Data) -> String {
    match value {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_float(*f),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(dt) => dt.clone(),
        Data::DurationIso(d) => d.clone(),
        Data::Empty => String::new(),
        _ => String::new(),
    }
}

/// Renders a float the way it reads in a cell, without trailing zeros.
fn format_float(value: f64) -> String {
    let formatted = format!("{value}");
    if formatted.contains('.') {
        formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    } else {
        formatted
    }
}
