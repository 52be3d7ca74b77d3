use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "docstats")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract tables and descriptive statistics from document files")]
#[command(
    long_about = "DocStats scans a directory for CSV, DOCX, PDF and spreadsheet files, \
                       extracts their tables, computes per-column descriptive statistics, \
                       and writes everything as CSV bundles plus a flat data directory \
                       for the dashboard."
)]
#[command(before_help = "📊 DocStats - Document Statistics Pipeline")]
#[command(after_help = "EXAMPLES:\n  \
    docstats\n  \
    docstats --input-dir ./reports --output-dir ./out --verbose\n  \
    docstats --types csv,xlsx --data-dir ./shared\n  \
    docstats --config pipeline.toml --force\n\n\
    Run without arguments to process ./documents into ./output using the defaults.")]
pub struct Cli {
    /// Input directory to scan for documents
    #[arg(short, long)]
    pub input_dir: Option<PathBuf>,

    /// Root directory for per-file output bundles
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Flat shared directory the dashboard reads
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Document types to process (comma-separated)
    #[arg(short, long, help = "Document types to process (e.g., csv,docx,pdf,xlsx)")]
    pub types: Option<String>,

    /// Directories to exclude from scanning
    #[arg(short, long, value_delimiter = ',')]
    pub exclude: Option<Vec<String>>,

    /// Maximum file size in MB
    #[arg(long, help = "Maximum file size to process (in MB)")]
    pub max_size: Option<u64>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Delete the output directory before processing
    #[arg(long, help = "Delete the existing output directory before processing")]
    pub force: bool,

    /// Dry run (show what would be processed without writing)
    #[arg(long, help = "Show what would be processed without writing output")]
    pub dry_run: bool,

    /// Launch the configured dashboard command after the run
    #[arg(long, help = "Launch the configured dashboard after processing")]
    pub dashboard: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        let max_file_size = self.max_size.map(|size| size * 1024 * 1024); // Convert MB to bytes

        CliOverrides::new()
            .with_input_dir(self.input_dir.clone())
            .with_output_dir(self.output_dir.clone())
            .with_data_dir(self.data_dir.clone())
            .with_types(self.types.clone())
            .with_exclude(self.exclude.clone())
            .with_max_file_size(max_file_size)
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose > 0 && !self.quiet
    }
}
