use std::fs;
use std::path::Path;

use crate::extractor::dispatcher::{ExtractedFile, ExtractionError, Payload};
use crate::stats::Table;

/// Reads one CSV file into a single table. The first row is always the
/// header, even when it is the only row in the file.
pub fn extract(path: &Path) -> Result<ExtractedFile, ExtractionError> {
    let bytes = fs::read(path).map_err(|source| ExtractionError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let text = decode_text(&bytes);
    if text.trim().is_empty() {
        return Err(parse_error(path, "file contains no rows"));
    }

    let delimiter = detect_delimiter(text.as_bytes());
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut grid: Vec<Vec<String>> = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| parse_error(path, &e.to_string()))?;
        grid.push(record.iter().map(|field| field.to_string()).collect());
    }

    let table = Table::with_header_row(grid)
        .ok_or_else(|| parse_error(path, "file contains no rows"))?;

    Ok(ExtractedFile::new(Payload::Csv { table }))
}

fn parse_error(path: &Path, detail: &str) -> ExtractionError {
    ExtractionError::Parse {
        format: "csv",
        path: path.to_path_buf(),
        detail: detail.to_string(),
    }
}

/// Decodes file content as UTF-8 and falls back to Windows-1252 (the
/// practical superset of Latin-1) when that fails. A UTF-8 BOM is stripped.
fn decode_text(bytes: &[u8]) -> String {
    let bytes = strip_bom(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

fn strip_bom(bytes: &[u8]) -> &[u8] {
    if bytes.len() >= 3 && bytes[0..3] == [0xEF, 0xBB, 0xBF] {
        &bytes[3..]
    } else {
        bytes
    }
}

/// Picks the delimiter that yields the most consistent multi-column split
/// over the leading records; comma wins ties.
fn detect_delimiter(bytes: &[u8]) -> u8 {
    let candidates = [b',', b';', b'\t'];
    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delimiter in &candidates {
        let score = evaluate_delimiter(bytes, delimiter);
        if score > best_score {
            best_score = score;
            best_delimiter = delimiter;
        }
    }

    best_delimiter
}

fn evaluate_delimiter(bytes: &[u8], delimiter: u8) -> usize {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut column_counts: Vec<usize> = Vec::new();
    for (index, result) in reader.records().enumerate() {
        if index >= 6 {
            break;
        }
        if let Ok(record) = result {
            column_counts.push(record.len());
        }
    }

    if column_counts.is_empty() {
        return 0;
    }

    let first_count = column_counts[0];
    let consistent = column_counts.iter().all(|&c| c == first_count);
    let has_multiple_columns = first_count > 1;

    if consistent && has_multiple_columns {
        first_count * 10
    } else if has_multiple_columns {
        first_count
    } else {
        0
    }
}
