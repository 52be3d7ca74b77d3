use crate::error::{DocStatsError, Result};
use crate::scanner::FileKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub input: InputConfig,
    pub filters: FilterConfig,
    pub output: OutputConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputConfig {
    pub directory: PathBuf,
    pub types: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilterConfig {
    pub max_file_size: u64,
    pub exclude_dirs: Vec<String>,
    pub exclude_patterns: Vec<String>,
    pub max_depth: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub data_directory: PathBuf,
    pub write_report: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DashboardConfig {
    pub command: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: InputConfig::default(),
            filters: FilterConfig::default(),
            output: OutputConfig::default(),
            dashboard: DashboardConfig::default(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("documents"),
            types: vec![
                "csv".to_string(),
                "docx".to_string(),
                "pdf".to_string(),
                "xlsx".to_string(),
            ],
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024, // 50MB
            exclude_dirs: vec![
                "node_modules".to_string(),
                ".git".to_string(),
                "target".to_string(),
                "build".to_string(),
                "dist".to_string(),
                "vendor".to_string(),
                "__pycache__".to_string(),
                ".vscode".to_string(),
                ".idea".to_string(),
            ],
            exclude_patterns: Vec::new(),
            max_depth: 16,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("output"),
            data_directory: PathBuf::from("data"),
            write_report: true,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            command: String::new(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DocStatsError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| DocStatsError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| DocStatsError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                // Try to load from default locations
                let default_paths = ["docstats.toml", "docstats.config.toml", ".docstats.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                // If no config file found, use defaults
                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref input_dir) = cli_args.input_dir {
            self.input.directory = input_dir.clone();
        }

        if let Some(ref types) = cli_args.types {
            self.input.types = types
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Some(ref exclude) = cli_args.exclude {
            self.filters.exclude_dirs.extend(exclude.clone());
        }

        if let Some(max_size) = cli_args.max_file_size {
            self.filters.max_file_size = max_size;
        }

        if let Some(ref output_dir) = cli_args.output_dir {
            self.output.directory = output_dir.clone();
        }

        if let Some(ref data_dir) = cli_args.data_dir {
            self.output.data_directory = data_dir.clone();
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| DocStatsError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| DocStatsError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        // Validate requested document types
        if self.input.types.is_empty() {
            return Err(DocStatsError::Config {
                message: "At least one document type must be specified".to_string(),
            });
        }

        for tag in &self.input.types {
            if FileKind::from_tag(tag).is_none() {
                return Err(DocStatsError::Config {
                    message: format!(
                        "Unknown document type '{}' (valid types: csv, docx, pdf, xlsx)",
                        tag
                    ),
                });
            }
        }

        // Validate max file size
        if self.filters.max_file_size == 0 {
            return Err(DocStatsError::Config {
                message: "Maximum file size must be greater than 0".to_string(),
            });
        }

        // Validate max depth
        if self.filters.max_depth == 0 {
            return Err(DocStatsError::Config {
                message: "Maximum directory depth must be greater than 0".to_string(),
            });
        }

        // Validate directory settings
        if self.input.directory.as_os_str().is_empty() {
            return Err(DocStatsError::Config {
                message: "Input directory must not be empty".to_string(),
            });
        }

        if self.output.directory.as_os_str().is_empty() {
            return Err(DocStatsError::Config {
                message: "Output directory must not be empty".to_string(),
            });
        }

        if self.output.data_directory.as_os_str().is_empty() {
            return Err(DocStatsError::Config {
                message: "Data directory must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// The document kinds selected by the configured type tags, deduplicated
    /// and in tag order.
    pub fn requested_kinds(&self) -> Vec<FileKind> {
        let mut kinds = Vec::new();
        for tag in &self.input.types {
            if let Some(kind) = FileKind::from_tag(tag) {
                if !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            }
        }
        kinds
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub types: Option<String>,
    pub exclude: Option<Vec<String>>,
    pub max_file_size: Option<u64>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input_dir(mut self, input_dir: Option<PathBuf>) -> Self {
        self.input_dir = input_dir;
        self
    }

    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn with_data_dir(mut self, data_dir: Option<PathBuf>) -> Self {
        self.data_dir = data_dir;
        self
    }

    pub fn with_types(mut self, types: Option<String>) -> Self {
        self.types = types;
        self
    }

    pub fn with_exclude(mut self, exclude: Option<Vec<String>>) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn with_max_file_size(mut self, max_size: Option<u64>) -> Self {
        self.max_file_size = max_size;
        self
    }
}
