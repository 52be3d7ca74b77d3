use crate::config::FilterConfig;
use regex::Regex;
use std::path::{Path, PathBuf};

/// The document kinds the pipeline can process, keyed by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Csv,
    Docx,
    Pdf,
    Spreadsheet,
}

impl FileKind {
    pub fn all() -> [FileKind; 4] {
        [
            FileKind::Csv,
            FileKind::Docx,
            FileKind::Pdf,
            FileKind::Spreadsheet,
        ]
    }

    /// Maps a file extension (without dot, any case) to its kind.
    pub fn from_extension(extension: &str) -> Option<FileKind> {
        match extension.to_lowercase().as_str() {
            "csv" => Some(FileKind::Csv),
            "docx" => Some(FileKind::Docx),
            "pdf" => Some(FileKind::Pdf),
            "xlsx" | "xls" | "xlsm" => Some(FileKind::Spreadsheet),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<FileKind> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(FileKind::from_extension)
    }

    /// Maps a requested type tag (csv, docx, pdf, xlsx) to its kind.
    pub fn from_tag(tag: &str) -> Option<FileKind> {
        match tag.to_lowercase().as_str() {
            "csv" => Some(FileKind::Csv),
            "docx" => Some(FileKind::Docx),
            "pdf" => Some(FileKind::Pdf),
            "xlsx" => Some(FileKind::Spreadsheet),
            _ => None,
        }
    }

    /// The tag used in output directory names and type filters.
    pub fn tag(&self) -> &'static str {
        match self {
            FileKind::Csv => "csv",
            FileKind::Docx => "docx",
            FileKind::Pdf => "pdf",
            FileKind::Spreadsheet => "xlsx",
        }
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            FileKind::Csv => &["csv"],
            FileKind::Docx => &["docx"],
            FileKind::Pdf => &["pdf"],
            FileKind::Spreadsheet => &["xlsx", "xls", "xlsm"],
        }
    }
}

pub struct FileFilter {
    requested_kinds: Vec<FileKind>,
    max_file_size: u64,
    exclude_dirs: Vec<String>,
    exclude_patterns: Vec<Regex>,
    excluded_paths: Vec<PathBuf>,
}

impl FileFilter {
    pub fn new(config: &FilterConfig, requested_kinds: Vec<FileKind>) -> Self {
        let exclude_patterns = config
            .exclude_patterns
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect();

        Self {
            requested_kinds,
            max_file_size: config.max_file_size,
            exclude_dirs: config.exclude_dirs.clone(),
            exclude_patterns,
            excluded_paths: Vec::new(),
        }
    }

    /// Returns the kind for a path when its extension is recognized and the
    /// kind was requested for this run.
    pub fn supported_kind(&self, path: &Path) -> Option<FileKind> {
        FileKind::from_path(path).filter(|kind| self.requested_kinds.contains(kind))
    }

    pub fn is_supported_file(&self, path: &Path) -> bool {
        self.supported_kind(path).is_some()
    }

    pub fn should_traverse_directory(&self, path: &Path) -> bool {
        if self.is_excluded_path(path) {
            return false;
        }

        if let Some(dir_name) = path.file_name().and_then(|s| s.to_str()) {
            let dir_name_lower = dir_name.to_lowercase();

            // Check against excluded directories
            if self
                .exclude_dirs
                .iter()
                .any(|exclude| exclude.to_lowercase() == dir_name_lower)
            {
                return false;
            }

            // Check against exclude patterns
            let path_str = path.to_string_lossy();
            for pattern in &self.exclude_patterns {
                if pattern.is_match(&path_str) {
                    return false;
                }
            }

            // Skip hidden directories (starting with .)
            if dir_name.starts_with('.') && dir_name != "." && dir_name != ".." {
                return false;
            }

            // Skip common tooling/build directories regardless of config
            if matches!(
                dir_name_lower.as_str(),
                "node_modules"
                    | "target"
                    | "__pycache__"
                    | "venv"
                    | "tmp"
                    | "temp"
                    | "coverage"
            ) {
                return false;
            }
        }

        true
    }

    /// Registers a path that must never be scanned, such as the pipeline's
    /// own output directory nested under the input directory.
    pub fn exclude_path<P: AsRef<Path>>(&mut self, path: P) {
        let path = path.as_ref();
        let resolved = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if !self.excluded_paths.contains(&resolved) {
            self.excluded_paths.push(resolved);
        }
    }

    fn is_excluded_path(&self, path: &Path) -> bool {
        if self.excluded_paths.is_empty() {
            return false;
        }
        let resolved = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        self.excluded_paths.iter().any(|p| *p == resolved)
    }

    pub fn is_size_allowed(&self, size: u64) -> bool {
        size <= self.max_file_size
    }

    pub fn requested_kinds(&self) -> &[FileKind] {
        &self.requested_kinds
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }
}

impl Default for FileFilter {
    fn default() -> Self {
        let config = FilterConfig::default();
        Self::new(&config, FileKind::all().to_vec())
    }
}
