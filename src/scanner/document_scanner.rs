use crate::config::FilterConfig;
use crate::error::{DocStatsError, Result};
use crate::scanner::file_filter::{FileFilter, FileKind};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::{DirEntry, WalkDir};

/// One discovered input document, ready for dispatch.
#[derive(Debug, Clone)]
pub struct DocumentFile {
    pub source_path: PathBuf,
    pub relative_path: PathBuf,
    pub filename: String,
    pub stem: String,
    pub kind: FileKind,
    pub size: u64,
    pub modified: SystemTime,
}

impl DocumentFile {
    pub fn new(
        source_path: PathBuf,
        relative_path: PathBuf,
        kind: FileKind,
        size: u64,
        modified: SystemTime,
    ) -> Self {
        let filename = source_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string();

        let stem = source_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_string();

        Self {
            source_path,
            relative_path,
            filename,
            stem,
            kind,
            size,
            modified,
        }
    }

    pub fn display_path(&self) -> String {
        self.relative_path.display().to_string()
    }

    pub fn format_size(&self) -> String {
        format_bytes(self.size)
    }
}

/// Result of one directory scan: the sorted documents plus any non-fatal
/// errors hit along the way.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub documents: Vec<DocumentFile>,
    pub errors: Vec<String>,
}

pub struct DocumentScanner {
    filter: FileFilter,
    max_depth: usize,
}

impl DocumentScanner {
    pub fn new(config: &FilterConfig, requested_kinds: Vec<FileKind>) -> Self {
        Self {
            filter: FileFilter::new(config, requested_kinds),
            max_depth: config.max_depth,
        }
    }

    /// Keeps a path (typically the output or data directory) out of the
    /// scan even when it is nested under the input directory.
    pub fn exclude_path<P: AsRef<Path>>(&mut self, path: P) {
        self.filter.exclude_path(path);
    }

    pub fn scan_directory<P: AsRef<Path>>(&self, root: P) -> Result<ScanOutcome> {
        let root_path = root.as_ref();

        if !root_path.exists() {
            return Err(DocStatsError::InvalidPath {
                path: root_path.display().to_string(),
            });
        }

        if !root_path.is_dir() {
            return Err(DocStatsError::InvalidPath {
                path: format!("{} is not a directory", root_path.display()),
            });
        }

        let mut documents = Vec::new();
        let mut scan_errors = Vec::new();

        let walker = WalkDir::new(root_path)
            .max_depth(self.max_depth)
            .follow_links(false) // Security: don't follow symlinks
            .into_iter()
            .filter_entry(|e| self.should_traverse(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    // Log permission errors but continue scanning
                    if err
                        .io_error()
                        .is_some_and(|e| e.kind() == std::io::ErrorKind::PermissionDenied)
                    {
                        scan_errors.push(format!("Permission denied: {}", err));
                    } else {
                        scan_errors.push(format!("Scan error: {}", err));
                    }
                    continue;
                }
            };

            if entry.file_type().is_file() {
                match self.process_file(&entry, root_path) {
                    Ok(Some(doc_file)) => documents.push(doc_file),
                    Ok(None) => {} // File filtered out
                    Err(err) => {
                        scan_errors.push(format!(
                            "Error processing {}: {}",
                            entry.path().display(),
                            err
                        ));
                    }
                }
            }
        }

        if documents.is_empty() && !scan_errors.is_empty() {
            return Err(DocStatsError::Permission {
                path: format!("Multiple scan errors: {}", scan_errors.join(", ")),
            });
        }

        // Sort by relative path for consistent output
        documents.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

        Ok(ScanOutcome {
            documents,
            errors: scan_errors,
        })
    }

    fn should_traverse(&self, entry: &DirEntry) -> bool {
        let path = entry.path();

        if entry.depth() > self.max_depth {
            return false;
        }

        // Always allow traversing files
        if entry.file_type().is_file() {
            return true;
        }

        // Always allow traversing the root directory (depth 0)
        if entry.depth() == 0 {
            return true;
        }

        if entry.file_type().is_dir() {
            return self.filter.should_traverse_directory(path);
        }

        true
    }

    fn process_file(&self, entry: &DirEntry, root_path: &Path) -> Result<Option<DocumentFile>> {
        let path = entry.path();

        let Some(kind) = self.filter.supported_kind(path) else {
            return Ok(None);
        };

        let metadata = entry.metadata().map_err(|e| DocStatsError::Io(e.into()))?;

        if !self.filter.is_size_allowed(metadata.len()) {
            return Ok(None);
        }

        let relative_path = self.calculate_relative_path(path, root_path)?;
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);

        let doc_file = DocumentFile::new(
            path.to_path_buf(),
            relative_path,
            kind,
            metadata.len(),
            modified,
        );

        Ok(Some(doc_file))
    }

    fn calculate_relative_path(&self, file_path: &Path, root_path: &Path) -> Result<PathBuf> {
        let relative =
            file_path
                .strip_prefix(root_path)
                .map_err(|_| DocStatsError::InvalidPath {
                    path: format!(
                        "Cannot calculate relative path for {} from root {}",
                        file_path.display(),
                        root_path.display()
                    ),
                })?;

        // Security: Ensure the relative path doesn't contain parent directory references
        if relative
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(DocStatsError::InvalidPath {
                path: format!(
                    "Path contains parent directory references: {}",
                    relative.display()
                ),
            });
        }

        Ok(relative.to_path_buf())
    }

    pub fn get_statistics(&self, documents: &[DocumentFile]) -> ScanStatistics {
        let total_files = documents.len();
        let total_size = documents.iter().map(|d| d.size).sum();

        let mut files_by_kind = std::collections::HashMap::new();
        for doc in documents {
            *files_by_kind.entry(doc.kind.tag().to_string()).or_insert(0) += 1;
        }

        let (largest_file_size, largest_file_path) = documents
            .iter()
            .max_by_key(|d| d.size)
            .map(|d| (d.size, d.relative_path.clone()))
            .unwrap_or((0, PathBuf::new()));

        ScanStatistics {
            total_files,
            total_size,
            files_by_kind,
            largest_file_size,
            largest_file_path,
        }
    }
}

#[derive(Debug, Default)]
pub struct ScanStatistics {
    pub total_files: usize,
    pub total_size: u64,
    pub files_by_kind: std::collections::HashMap<String, usize>,
    pub largest_file_size: u64,
    pub largest_file_path: PathBuf,
}

impl ScanStatistics {
    pub fn display_summary(&self) -> String {
        let mut summary = format!(
            "Scan Results:\n  Total files: {}\n  Total size: {}\n",
            self.total_files,
            format_bytes(self.total_size)
        );

        if !self.files_by_kind.is_empty() {
            summary.push_str("  Files by type:\n");
            let mut kinds: Vec<_> = self.files_by_kind.iter().collect();
            kinds.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));

            for (kind, count) in kinds {
                summary.push_str(&format!("    {}: {} files\n", kind, count));
            }
        }

        if self.largest_file_size > 0 {
            summary.push_str(&format!(
                "  Largest file: {} ({})\n",
                self.largest_file_path.display(),
                format_bytes(self.largest_file_size)
            ));
        }

        summary
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_config() -> FilterConfig {
        FilterConfig {
            max_file_size: 1024 * 1024, // 1MB
            exclude_dirs: vec![".git".to_string()],
            exclude_patterns: vec![],
            max_depth: 5,
        }
    }

    #[test]
    fn test_document_file_creation() {
        let doc = DocumentFile::new(
            PathBuf::from("reports/sales.csv"),
            PathBuf::from("sales.csv"),
            FileKind::Csv,
            100,
            SystemTime::UNIX_EPOCH,
        );

        assert_eq!(doc.filename, "sales.csv");
        assert_eq!(doc.stem, "sales");
        assert_eq!(doc.kind, FileKind::Csv);
        assert_eq!(doc.size, 100);
    }

    #[test]
    fn test_scanner_finds_supported_files_only() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("a.csv"), "x,y\n1,2\n").unwrap();
        fs::write(root.join("b.pdf"), "%PDF-1.4").unwrap();
        fs::write(root.join("notes.txt"), "plain text").unwrap();

        let nested = root.join("2024");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("c.xlsx"), "fake").unwrap();

        let config = create_test_config();
        let scanner = DocumentScanner::new(&config, FileKind::all().to_vec());
        let outcome = scanner.scan_directory(root).unwrap();

        let names: Vec<&str> = outcome
            .documents
            .iter()
            .map(|d| d.filename.as_str())
            .collect();
        assert_eq!(names.len(), 3);
        assert!(names.contains(&"a.csv"));
        assert!(names.contains(&"b.pdf"));
        assert!(names.contains(&"c.xlsx"));
        assert!(!names.contains(&"notes.txt"));
    }

    #[test]
    fn test_scan_is_sorted_by_relative_path() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("zeta.csv"), "a\n1\n").unwrap();
        fs::write(root.join("alpha.csv"), "a\n1\n").unwrap();

        let config = create_test_config();
        let scanner = DocumentScanner::new(&config, FileKind::all().to_vec());
        let outcome = scanner.scan_directory(root).unwrap();

        let names: Vec<&str> = outcome
            .documents
            .iter()
            .map(|d| d.filename.as_str())
            .collect();
        assert_eq!(names, vec!["alpha.csv", "zeta.csv"]);
    }

    #[test]
    fn test_empty_directory_is_not_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let config = create_test_config();
        let scanner = DocumentScanner::new(&config, FileKind::all().to_vec());

        let outcome = scanner.scan_directory(temp_dir.path()).unwrap();
        assert!(outcome.documents.is_empty());
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let config = create_test_config();
        let scanner = DocumentScanner::new(&config, FileKind::all().to_vec());

        let result = scanner.scan_directory("/definitely/not/here");
        assert!(matches!(result, Err(DocStatsError::InvalidPath { .. })));
    }

    #[test]
    fn test_excluded_output_directory_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("a.csv"), "x\n1\n").unwrap();
        let out_dir = root.join("output");
        fs::create_dir(&out_dir).unwrap();
        fs::write(out_dir.join("mirror.csv"), "x\n1\n").unwrap();

        let config = create_test_config();
        let mut scanner = DocumentScanner::new(&config, FileKind::all().to_vec());
        scanner.exclude_path(&out_dir);

        let outcome = scanner.scan_directory(root).unwrap();
        let names: Vec<&str> = outcome
            .documents
            .iter()
            .map(|d| d.filename.as_str())
            .collect();
        assert_eq!(names, vec!["a.csv"]);
    }

    #[test]
    fn test_scan_statistics() {
        let documents = vec![
            DocumentFile::new(
                PathBuf::from("a.csv"),
                PathBuf::from("a.csv"),
                FileKind::Csv,
                100,
                SystemTime::UNIX_EPOCH,
            ),
            DocumentFile::new(
                PathBuf::from("b.xlsx"),
                PathBuf::from("b.xlsx"),
                FileKind::Spreadsheet,
                200,
                SystemTime::UNIX_EPOCH,
            ),
        ];

        let config = create_test_config();
        let scanner = DocumentScanner::new(&config, FileKind::all().to_vec());
        let stats = scanner.get_statistics(&documents);

        assert_eq!(stats.total_files, 2);
        assert_eq!(stats.total_size, 300);
        assert_eq!(stats.files_by_kind.get("csv"), Some(&1));
        assert_eq!(stats.files_by_kind.get("xlsx"), Some(&1));
        assert_eq!(stats.largest_file_size, 200);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500), "500 B");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1048576), "1.0 MB");
    }
}
