use std::path::PathBuf;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::extractor::{csv, docx, pdf, xlsx};
use crate::scanner::{DocumentFile, FileKind};
use crate::stats::Table;

/// A failure extracting one source file. These are collected per run and
/// never abort the batch.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{format} parse error in {path}: {detail}")]
    Parse {
        format: &'static str,
        path: PathBuf,
        detail: String,
    },

    #[error("failed to write {path}: {detail}")]
    Write { path: PathBuf, detail: String },
}

/// Format-specific extraction output, one variant per extractor.
#[derive(Debug, Clone)]
pub enum Payload {
    Csv {
        table: Table,
    },
    Docx {
        paragraphs: Vec<String>,
        tables: Vec<Table>,
        numbers: Vec<f64>,
    },
    Pdf {
        text: String,
        tables: Vec<Table>,
    },
    Spreadsheet {
        sheets: Vec<SheetTable>,
    },
}

#[derive(Debug, Clone)]
pub struct SheetTable {
    pub name: String,
    pub table: Table,
}

/// Everything extracted from one source file, plus warnings for sub-units
/// (sheets, pages) that were skipped without failing the file.
#[derive(Debug, Clone)]
pub struct ExtractedFile {
    pub payload: Payload,
    pub warnings: Vec<String>,
}

impl ExtractedFile {
    pub fn new(payload: Payload) -> Self {
        ExtractedFile {
            payload,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(payload: Payload, warnings: Vec<String>) -> Self {
        ExtractedFile { payload, warnings }
    }
}

/// Runs the extractor matching the document's kind. The mapping is static:
/// each kind has exactly one extractor.
pub fn extract_file(document: &DocumentFile) -> Result<ExtractedFile, ExtractionError> {
    match document.kind {
        FileKind::Csv => csv::extract(&document.source_path),
        FileKind::Docx => docx::extract(&document.source_path),
        FileKind::Pdf => pdf::extract(&document.source_path),
        FileKind::Spreadsheet => xlsx::extract(&document.source_path),
    }
}

/// One collected per-file failure.
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: ExtractionError,
}

/// Bookkeeping for one processing run.
#[derive(Debug)]
pub struct ProcessingProgress {
    pub files_processed: usize,
    pub files_failed: usize,
    pub total_files: usize,
    pub bytes_processed: u64,
    pub csv_files_written: usize,
    pub current_file: Option<String>,
    pub start_time: Instant,
    pub failures: Vec<FileFailure>,
}

impl ProcessingProgress {
    pub fn new(total_files: usize) -> Self {
        Self {
            files_processed: 0,
            files_failed: 0,
            total_files,
            bytes_processed: 0,
            csv_files_written: 0,
            current_file: None,
            start_time: Instant::now(),
            failures: Vec::new(),
        }
    }

    pub fn record_success(&mut self, document: &DocumentFile, csv_files: usize) {
        self.files_processed += 1;
        self.bytes_processed += document.size;
        self.csv_files_written += csv_files;
        self.current_file = Some(document.display_path());
    }

    pub fn record_failure(&mut self, document: &DocumentFile, error: ExtractionError) {
        self.files_failed += 1;
        self.current_file = Some(document.display_path());
        self.failures.push(FileFailure {
            path: document.relative_path.clone(),
            error,
        });
    }

    pub fn completed(&self) -> usize {
        self.files_processed + self.files_failed
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn percentage(&self) -> f64 {
        if self.total_files == 0 {
            return 100.0;
        }
        (self.completed() as f64 / self.total_files as f64) * 100.0
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn files_per_second(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.completed() as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn estimated_remaining(&self) -> Option<Duration> {
        if self.completed() == 0 || self.total_files == 0 {
            return None;
        }

        let rate = self.files_per_second();
        if rate > 0.0 {
            let remaining_files = self.total_files.saturating_sub(self.completed());
            Some(Duration::from_secs_f64(remaining_files as f64 / rate))
        } else {
            None
        }
    }
}
