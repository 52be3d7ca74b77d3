use crate::error::{DocStatsError, Result};
use crate::extractor::dispatcher::{ExtractionError, Payload, ProcessingProgress};
use crate::scanner::DocumentFile;
use crate::stats::{describe, describe_series, textual_summary, ColumnSummary, Table, STATS_HEADER};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub processed_at: DateTime<Utc>,
    pub summary: RunSummary,
    pub failures: Vec<FailureInfo>,
    pub config_used: ConfigSnapshot,
    pub output_directory: String,
    pub data_directory: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub files_processed: usize,
    pub files_failed: usize,
    pub bytes_processed: u64,
    pub csv_files_written: usize,
    pub files_mirrored: usize,
    pub duration: Duration,
    pub files_by_kind: HashMap<String, usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureInfo {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub types: Vec<String>,
    pub max_file_size: u64,
    pub exclude_dirs: Vec<String>,
    pub max_depth: usize,
}

/// The CSV files written for one processed document, all inside one
/// per-document subdirectory of the output directory.
#[derive(Debug, Clone)]
pub struct OutputBundle {
    pub directory: PathBuf,
    pub files: Vec<PathBuf>,
}

pub struct OutputManager {
    output_directory: PathBuf,
    data_directory: PathBuf,
    force_overwrite: bool,
}

impl OutputManager {
    pub fn new(output_directory: PathBuf, data_directory: PathBuf) -> Self {
        Self {
            output_directory,
            data_directory,
            force_overwrite: false,
        }
    }

    pub fn with_force_overwrite(mut self, force: bool) -> Self {
        self.force_overwrite = force;
        self
    }

    /// Prepares the output and data directories. Without force, an existing
    /// output directory is reused so reruns stay idempotent; with force it
    /// is removed first.
    pub fn initialize(&self) -> Result<()> {
        if self.force_overwrite && self.output_directory.exists() {
            fs::remove_dir_all(&self.output_directory).map_err(DocStatsError::Io)?;
        }

        fs::create_dir_all(&self.output_directory).map_err(DocStatsError::Io)?;
        fs::create_dir_all(&self.data_directory).map_err(DocStatsError::Io)?;
        fs::create_dir_all(self.metadata_dir()).map_err(DocStatsError::Io)?;

        self.verify_writable()
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    pub fn data_directory(&self) -> &Path {
        &self.data_directory
    }

    pub fn metadata_dir(&self) -> PathBuf {
        self.output_directory.join(".docstats")
    }

    /// Writes the per-document bundle `<kind-tag>_<stem>/` and returns the
    /// paths of every CSV it produced.
    pub fn write_bundle(
        &self,
        document: &DocumentFile,
        payload: &Payload,
    ) -> std::result::Result<OutputBundle, ExtractionError> {
        let stem = sanitize_component(&document.stem);
        let directory = self
            .output_directory
            .join(format!("{}_{}", document.kind.tag(), stem));
        fs::create_dir_all(&directory).map_err(|e| write_error(&directory, &e))?;

        let mut files = Vec::new();

        match payload {
            Payload::Csv { table } => {
                let summaries = describe(table);
                files.push(write_stats_csv(
                    &directory.join(format!("{stem}_stats.csv")),
                    &summaries,
                    false,
                )?);
                files.push(write_summary_csv(
                    &directory.join(format!("{stem}_summary.csv")),
                    &summaries,
                )?);
            }
            Payload::Docx {
                paragraphs,
                tables,
                numbers,
            } => {
                let rows: Vec<Vec<String>> =
                    paragraphs.iter().map(|p| vec![p.clone()]).collect();
                files.push(write_text_csv(
                    &directory.join(format!("{stem}_text.csv")),
                    &rows,
                )?);
                files.extend(write_numbered_tables(&directory, &stem, tables)?);
                if !numbers.is_empty() {
                    let summary = describe_series("value", numbers);
                    files.push(write_stats_csv(
                        &directory.join(format!("{stem}_numbers_stats.csv")),
                        &[summary],
                        false,
                    )?);
                }
            }
            Payload::Pdf { text, tables } => {
                files.push(write_text_csv(
                    &directory.join(format!("{stem}_text.csv")),
                    &[vec![text.clone()]],
                )?);
                files.extend(write_numbered_tables(&directory, &stem, tables)?);
            }
            Payload::Spreadsheet { sheets } => {
                let mut combined: Vec<ColumnSummary> = Vec::new();
                for sheet in sheets {
                    let summaries: Vec<ColumnSummary> = describe(&sheet.table)
                        .into_iter()
                        .map(|summary| summary.with_sheet(&sheet.name))
                        .collect();
                    files.push(write_stats_csv(
                        &directory.join(format!(
                            "{}_{}_stats.csv",
                            stem,
                            sanitize_component(&sheet.name)
                        )),
                        &summaries,
                        true,
                    )?);
                    combined.extend(summaries);
                }
                if !sheets.is_empty() {
                    files.push(write_stats_csv(
                        &directory.join(format!("{stem}_combined_stats.csv")),
                        &combined,
                        true,
                    )?);
                }
            }
        }

        Ok(OutputBundle { directory, files })
    }

    /// Copies every bundle CSV into the flat data directory by basename,
    /// preserving modification times. Basename collisions overwrite.
    pub fn mirror_to_data(&self, bundles: &[OutputBundle]) -> Result<usize> {
        let mut mirrored = 0;

        for bundle in bundles {
            for file in &bundle.files {
                let Some(name) = file.file_name() else {
                    continue;
                };
                let target = self.data_directory.join(name);
                fs::copy(file, &target).map_err(DocStatsError::Io)?;

                if let Ok(metadata) = fs::metadata(file) {
                    if let Ok(modified) = metadata.modified() {
                        let _ = filetime::set_file_mtime(
                            &target,
                            filetime::FileTime::from_system_time(modified),
                        );
                    }
                }
                mirrored += 1;
            }
        }

        Ok(mirrored)
    }

    pub fn create_run_report(
        &self,
        documents: &[DocumentFile],
        progress: &ProcessingProgress,
        config: &ConfigSnapshot,
        files_mirrored: usize,
        write_report: bool,
    ) -> Result<RunReport> {
        let mut files_by_kind: HashMap<String, usize> = HashMap::new();
        for document in documents {
            *files_by_kind
                .entry(document.kind.tag().to_string())
                .or_insert(0) += 1;
        }

        let report = RunReport {
            processed_at: Utc::now(),
            summary: RunSummary {
                files_processed: progress.files_processed,
                files_failed: progress.files_failed,
                bytes_processed: progress.bytes_processed,
                csv_files_written: progress.csv_files_written,
                files_mirrored,
                duration: progress.elapsed(),
                files_by_kind,
            },
            failures: progress
                .failures
                .iter()
                .map(|failure| FailureInfo {
                    path: failure.path.display().to_string(),
                    error: failure.error.to_string(),
                })
                .collect(),
            config_used: config.clone(),
            output_directory: self.output_directory.display().to_string(),
            data_directory: self.data_directory.display().to_string(),
        };

        if write_report {
            self.save_report_json(&report)?;
            self.create_summary_file(&report)?;
        }

        Ok(report)
    }

    fn save_report_json(&self, report: &RunReport) -> Result<()> {
        let report_path = self.metadata_dir().join("run_report.json");
        let json_content =
            serde_json::to_string_pretty(report).map_err(|e| DocStatsError::Config {
                message: format!("Failed to serialize run report to JSON: {}", e),
            })?;

        fs::write(&report_path, json_content).map_err(DocStatsError::Io)?;

        Ok(())
    }

    fn create_summary_file(&self, report: &RunReport) -> Result<()> {
        let summary_path = self.output_directory.join("PROCESSING_SUMMARY.md");
        let mut file = fs::File::create(&summary_path).map_err(DocStatsError::Io)?;

        writeln!(file, "# Document Processing Summary")?;
        writeln!(file)?;
        writeln!(
            file,
            "**Processed:** {}",
            report.processed_at.format("%Y-%m-%d %H:%M UTC")
        )?;
        writeln!(file, "**Duration:** {:?}", report.summary.duration)?;
        writeln!(file)?;

        writeln!(file, "## Statistics")?;
        writeln!(file)?;
        writeln!(
            file,
            "- **Files processed:** {}",
            report.summary.files_processed
        )?;
        writeln!(file, "- **Files failed:** {}", report.summary.files_failed)?;
        writeln!(
            file,
            "- **Bytes processed:** {}",
            format_bytes(report.summary.bytes_processed)
        )?;
        writeln!(
            file,
            "- **CSV files written:** {}",
            report.summary.csv_files_written
        )?;
        writeln!(
            file,
            "- **CSV files mirrored:** {}",
            report.summary.files_mirrored
        )?;
        writeln!(file)?;

        if !report.summary.files_by_kind.is_empty() {
            writeln!(file, "## File Types")?;
            writeln!(file)?;
            let mut kinds: Vec<_> = report.summary.files_by_kind.iter().collect();
            kinds.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

            for (kind, count) in kinds {
                writeln!(file, "- **{}**: {} files", kind, count)?;
            }
            writeln!(file)?;
        }

        if !report.failures.is_empty() {
            writeln!(file, "## Failures")?;
            writeln!(file)?;
            for failure in &report.failures {
                writeln!(file, "- `{}`: {}", failure.path, failure.error)?;
            }
            writeln!(file)?;
        }

        writeln!(file, "---")?;
        writeln!(file, "*Generated by DocStats*")?;

        Ok(())
    }

    fn verify_writable(&self) -> Result<()> {
        let test_file = self.output_directory.join(".docstats_write_test");
        match fs::File::create(&test_file) {
            Ok(_) => {
                let _ = fs::remove_file(&test_file);
                Ok(())
            }
            Err(e) => Err(DocStatsError::Permission {
                path: format!(
                    "No write permission for directory {}: {}",
                    self.output_directory.display(),
                    e
                ),
            }),
        }
    }
}

fn write_error(path: &Path, detail: &dyn std::fmt::Display) -> ExtractionError {
    ExtractionError::Write {
        path: path.to_path_buf(),
        detail: detail.to_string(),
    }
}

/// Opens a CSV writer that starts with a UTF-8 byte-order mark so the file
/// opens cleanly in spreadsheet tools.
fn bom_csv_writer(path: &Path) -> std::result::Result<csv::Writer<fs::File>, ExtractionError> {
    let mut file = fs::File::create(path).map_err(|e| write_error(path, &e))?;
    file.write_all(b"\xef\xbb\xbf")
        .map_err(|e| write_error(path, &e))?;
    Ok(csv::Writer::from_writer(file))
}

fn write_stats_csv(
    path: &Path,
    summaries: &[ColumnSummary],
    include_sheet: bool,
) -> std::result::Result<PathBuf, ExtractionError> {
    let mut writer = bom_csv_writer(path)?;

    let mut header: Vec<String> = STATS_HEADER.iter().map(|h| h.to_string()).collect();
    if include_sheet {
        header.push("sheet".to_string());
    }
    writer
        .write_record(&header)
        .map_err(|e| write_error(path, &e))?;

    for summary in summaries {
        let mut record = summary.to_record();
        if include_sheet {
            record.push(summary.sheet.clone().unwrap_or_default());
        }
        writer
            .write_record(&record)
            .map_err(|e| write_error(path, &e))?;
    }

    writer.flush().map_err(|e| write_error(path, &e))?;
    Ok(path.to_path_buf())
}

fn write_summary_csv(
    path: &Path,
    summaries: &[ColumnSummary],
) -> std::result::Result<PathBuf, ExtractionError> {
    let mut writer = bom_csv_writer(path)?;

    writer
        .write_record(["column", "summary"])
        .map_err(|e| write_error(path, &e))?;
    for (column, summary) in textual_summary(summaries) {
        writer
            .write_record([column, summary])
            .map_err(|e| write_error(path, &e))?;
    }

    writer.flush().map_err(|e| write_error(path, &e))?;
    Ok(path.to_path_buf())
}

fn write_text_csv(
    path: &Path,
    rows: &[Vec<String>],
) -> std::result::Result<PathBuf, ExtractionError> {
    let mut writer = bom_csv_writer(path)?;

    writer
        .write_record(["text"])
        .map_err(|e| write_error(path, &e))?;
    for row in rows {
        writer
            .write_record(row)
            .map_err(|e| write_error(path, &e))?;
    }

    writer.flush().map_err(|e| write_error(path, &e))?;
    Ok(path.to_path_buf())
}

fn write_table_csv(path: &Path, table: &Table) -> std::result::Result<PathBuf, ExtractionError> {
    let mut writer = bom_csv_writer(path)?;

    writer
        .write_record(table.columns())
        .map_err(|e| write_error(path, &e))?;
    for row in table.rows() {
        writer
            .write_record(row)
            .map_err(|e| write_error(path, &e))?;
    }

    writer.flush().map_err(|e| write_error(path, &e))?;
    Ok(path.to_path_buf())
}

/// Writes `<stem>_table_<n>.csv` and `<stem>_table_<n>_stats.csv` for each
/// extracted table, numbered from one in extraction order.
fn write_numbered_tables(
    directory: &Path,
    stem: &str,
    tables: &[Table],
) -> std::result::Result<Vec<PathBuf>, ExtractionError> {
    let mut files = Vec::new();

    for (index, table) in tables.iter().enumerate() {
        let number = index + 1;
        files.push(write_table_csv(
            &directory.join(format!("{stem}_table_{number}.csv")),
            table,
        )?);
        files.push(write_stats_csv(
            &directory.join(format!("{stem}_table_{number}_stats.csv")),
            &describe(table),
            false,
        )?);
    }

    Ok(files)
}

/// Makes a filename component filesystem-safe: path separators and other
/// reserved characters become underscores, leading/trailing separators are
/// trimmed, overly long names are cut.
fn sanitize_component(name: &str) -> String {
    let mut sanitized = String::new();

    for ch in name.chars() {
        match ch {
            '<' | '>' | ':' | '"' | '|' | '?' | '*' | '/' | '\\' => sanitized.push('_'),
            c if c.is_alphanumeric() || c == '-' || c == '.' || c == '_' => sanitized.push(c),
            _ => sanitized.push('_'),
        }
    }

    let sanitized = sanitized.trim_matches(|c| c == '.' || c == ' ' || c == '_');

    if sanitized.is_empty() {
        "unnamed".to_string()
    } else if sanitized.chars().count() > 100 {
        sanitized.chars().take(100).collect()
    } else {
        sanitized.to_string()
    }
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}
