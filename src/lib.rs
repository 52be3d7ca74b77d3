pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod scanner;
pub mod stats;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, FilterConfig, InputConfig, OutputConfig};
pub use error::{DocStatsError, Result, UserFriendlyError};

// Core functionality re-exports
pub use extractor::{
    extract_file, ConfigSnapshot, ExtractedFile, ExtractionError, OutputBundle, OutputManager,
    Payload, ProcessingProgress, RunReport, SheetTable,
};
pub use scanner::{DocumentFile, DocumentScanner, FileFilter, FileKind, ScanOutcome};
pub use stats::{describe, describe_series, ColumnKind, ColumnSummary, Table};
pub use ui::{OutputFormatter, OutputMode, ProgressAwareOutput, ProgressManager};

/// Main library interface for the document statistics pipeline.
pub struct DocStats {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    force: bool,
}

impl DocStats {
    /// Create a new DocStats instance with the provided configuration
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);

        Self {
            config,
            output_formatter,
            progress_manager,
            force: false,
        }
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Create a DocStats instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Ok(Self::new(config, output_mode, cli_args.verbose, cli_args.quiet)
            .with_force(cli_args.force))
    }

    /// Run the whole pipeline: scan the input directory, extract every
    /// supported document, write the per-file bundles, mirror the CSVs into
    /// the data directory and produce the run report.
    pub fn run(&self) -> Result<RunReport> {
        self.output_formatter
            .start_operation("Starting document processing");

        // Step 1: Prepare output directories
        let output_manager = self.setup_output_directories()?;

        // Step 2: Make sure there is an input directory at all
        if !self.config.input.directory.exists() {
            std::fs::create_dir_all(&self.config.input.directory).map_err(DocStatsError::Io)?;
            self.output_formatter.warning(&format!(
                "Input directory {} did not exist and was created; add documents and rerun",
                self.config.input.directory.display()
            ));
            return self.empty_run_report(&output_manager);
        }

        // Step 3: Scan for documents
        let outcome = self.scan_documents(&output_manager)?;
        for error in &outcome.errors {
            self.output_formatter.warning(error);
        }

        if outcome.documents.is_empty() {
            self.output_formatter.warning(&format!(
                "No supported documents found in {}",
                self.config.input.directory.display()
            ));
            return self.empty_run_report(&output_manager);
        }

        self.output_formatter
            .info(&format!("Found {} documents", outcome.documents.len()));

        // Step 4: Extract and write per-file bundles
        let (progress, bundles) = self.process_documents(&outcome.documents, &output_manager)?;

        // Step 5: Mirror every CSV into the flat data directory
        let mirrored = output_manager.mirror_to_data(&bundles)?;

        // Step 6: Run report and final summary
        let snapshot = self.create_config_snapshot();
        let report = output_manager.create_run_report(
            &outcome.documents,
            &progress,
            &snapshot,
            mirrored,
            self.config.output.write_report,
        )?;

        self.output_formatter.print_processing_summary(&progress);
        self.output_formatter.success(&format!(
            "Results written to {} (data mirror: {})",
            output_manager.output_directory().display(),
            output_manager.data_directory().display()
        ));

        Ok(report)
    }

    /// Scan the input directory without writing anything. Used by dry runs.
    pub fn scan_input(&self) -> Result<ScanOutcome> {
        let mut scanner =
            DocumentScanner::new(&self.config.filters, self.config.requested_kinds());
        scanner.exclude_path(&self.config.output.directory);
        scanner.exclude_path(&self.config.output.data_directory);

        scanner.scan_directory(&self.config.input.directory)
    }

    fn setup_output_directories(&self) -> Result<OutputManager> {
        let output_manager = OutputManager::new(
            self.config.output.directory.clone(),
            self.config.output.data_directory.clone(),
        )
        .with_force_overwrite(self.force);

        output_manager.initialize()?;

        self.output_formatter.info(&format!(
            "Output directory: {}",
            output_manager.output_directory().display()
        ));

        Ok(output_manager)
    }

    fn scan_documents(&self, output_manager: &OutputManager) -> Result<ScanOutcome> {
        self.output_formatter.start_operation("Scanning for documents");

        let spinner = self.progress_manager.create_spinner("Scanning input directory");

        let mut scanner =
            DocumentScanner::new(&self.config.filters, self.config.requested_kinds());
        scanner.exclude_path(output_manager.output_directory());
        scanner.exclude_path(output_manager.data_directory());

        let outcome = scanner.scan_directory(&self.config.input.directory);
        spinner.finish_and_clear();
        let outcome = outcome?;

        let stats = scanner.get_statistics(&outcome.documents);
        self.output_formatter.debug(&stats.display_summary());

        Ok(outcome)
    }

    fn process_documents(
        &self,
        documents: &[DocumentFile],
        output_manager: &OutputManager,
    ) -> Result<(ProcessingProgress, Vec<OutputBundle>)> {
        self.output_formatter.start_operation("Processing documents");

        let file_progress = self
            .progress_manager
            .create_file_progress(documents.len() as u64);
        let output = ProgressAwareOutput::new(&self.output_formatter, Some(&self.progress_manager));

        let mut progress = ProcessingProgress::new(documents.len());
        let mut bundles = Vec::new();

        #[cfg(not(feature = "parallel"))]
        for document in documents {
            progress.current_file = Some(document.display_path());
            ui::progress::update_file_progress(&file_progress, &progress);

            let result = process_document(document, output_manager);
            record_outcome(document, result, &mut progress, &mut bundles, &output);
        }

        // Extraction runs across a thread pool; results are folded back in
        // scan order so bundles, failures and the summary stay deterministic.
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            let results: Vec<_> = documents
                .par_iter()
                .map(|document| {
                    let result = process_document(document, output_manager);
                    file_progress.inc(1);
                    result
                })
                .collect();

            for (document, result) in documents.iter().zip(results) {
                record_outcome(document, result, &mut progress, &mut bundles, &output);
            }
        }

        progress.current_file = None;
        ui::progress::finish_progress_with_summary(
            &file_progress,
            &format!("Processed {} documents", progress.files_processed),
            progress.elapsed(),
        );

        Ok((progress, bundles))
    }

    fn empty_run_report(&self, output_manager: &OutputManager) -> Result<RunReport> {
        let snapshot = self.create_config_snapshot();
        let progress = ProcessingProgress::new(0);

        output_manager.create_run_report(
            &[],
            &progress,
            &snapshot,
            0,
            self.config.output.write_report,
        )
    }

    fn create_config_snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            types: self.config.input.types.clone(),
            max_file_size: self.config.filters.max_file_size,
            exclude_dirs: self.config.filters.exclude_dirs.clone(),
            max_depth: self.config.filters.max_depth,
        }
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<std::path::Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config).map_err(DocStatsError::Io)?;
        Ok(())
    }

    /// Get configuration reference
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get output formatter reference
    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    /// Get progress manager reference
    pub fn progress_manager(&self) -> &ProgressManager {
        &self.progress_manager
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &DocStatsError) {
        self.progress_manager.clear();
        self.output_formatter.print_user_friendly_error(error);
    }
}

fn process_document(
    document: &DocumentFile,
    output_manager: &OutputManager,
) -> std::result::Result<(OutputBundle, Vec<String>), ExtractionError> {
    let extracted = extract_file(document)?;
    let bundle = output_manager.write_bundle(document, &extracted.payload)?;
    Ok((bundle, extracted.warnings))
}

fn record_outcome(
    document: &DocumentFile,
    result: std::result::Result<(OutputBundle, Vec<String>), ExtractionError>,
    progress: &mut ProcessingProgress,
    bundles: &mut Vec<OutputBundle>,
    output: &ProgressAwareOutput<'_>,
) {
    match result {
        Ok((bundle, warnings)) => {
            for warning in &warnings {
                output.warning(&format!("{}: {}", document.display_path(), warning));
            }
            progress.record_success(document, bundle.files.len());
            bundles.push(bundle);
        }
        Err(error) => {
            output.warning(&format!(
                "Skipping {}: {}",
                document.display_path(),
                error
            ));
            progress.record_failure(document, error);
        }
    }
}

/// Get version information
pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
