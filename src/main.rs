use clap::Parser;
use docstats::{
    Cli, DocStats, DocStatsError, OutputFormatter, OutputMode, RunReport, UserFriendlyError,
};
use std::collections::BTreeMap;
use std::path::Path;
use std::process;

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Handle special commands first
    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    // Create DocStats instance
    let app = match DocStats::from_cli(&cli) {
        Ok(app) => app,
        Err(e) => {
            print_startup_error(&e);
            return exit_code_for(&e);
        }
    };

    // Handle dry run mode
    if cli.dry_run {
        return handle_dry_run(&cli, &app);
    }

    // Execute main processing workflow
    match app.run() {
        Ok(report) => {
            if cli.is_verbose() {
                app.output_formatter().print_run_report(&report);
            }

            if cli.dashboard {
                if let Err(e) = launch_dashboard(&app, &report) {
                    app.handle_error(&e);
                    return exit_code_for(&e);
                }
            }

            if report.failures.is_empty() {
                0 // Success
            } else {
                2 // Completed, but some documents failed
            }
        }
        Err(e) => {
            app.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn exit_code_for(error: &DocStatsError) -> i32 {
    match error {
        DocStatsError::Config { .. } => 3,
        DocStatsError::InvalidPath { .. } => 4,
        DocStatsError::Dashboard { .. } => 5,
        DocStatsError::Io(_) => 6,
        DocStatsError::Permission { .. } => 7,
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "docstats.toml".to_string());

    if Path::new(&config_path).exists() {
        eprintln!("Configuration file already exists: {}", config_path);
        eprintln!("Remove it first, or pass --config with a different path.");
        return 1;
    }

    match DocStats::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  docstats --config {}", config_path);
            println!("\nEdit the file to customize settings for your needs.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(cli: &Cli, app: &DocStats) -> i32 {
    let formatter = app.output_formatter();
    let config = app.config();

    formatter.info("DRY RUN MODE - No files will be processed");
    formatter.print_separator();

    formatter.info("Configuration that would be used:");
    println!("  Input directory: {}", config.input.directory.display());
    println!("  Types: {}", config.input.types.join(", "));
    println!("  Max file size: {} bytes", config.filters.max_file_size);
    println!(
        "  Exclude directories: {}",
        config.filters.exclude_dirs.join(", ")
    );
    println!("  Output directory: {}", config.output.directory.display());
    println!(
        "  Data directory: {}",
        config.output.data_directory.display()
    );

    formatter.print_separator();

    let outcome = match app.scan_input() {
        Ok(outcome) => outcome,
        Err(e) => {
            formatter.error(&format!("Scan failed: {}", e.user_message()));
            return exit_code_for(&e);
        }
    };

    for error in &outcome.errors {
        formatter.warning(error);
    }

    formatter.info("Processing plan:");
    let mut by_kind: BTreeMap<&str, usize> = BTreeMap::new();
    for document in &outcome.documents {
        *by_kind.entry(document.kind.tag()).or_insert(0) += 1;
    }
    for (tag, count) in &by_kind {
        println!("  {}: {} files", tag, count);
    }
    println!("  Total: {} documents", outcome.documents.len());

    if cli.force {
        formatter.warning("Force mode enabled - would delete the output directory first");
    }

    formatter.print_separator();
    formatter.success("Dry run completed successfully");
    formatter.info("Run without --dry-run to process the documents");

    0
}

fn launch_dashboard(app: &DocStats, report: &RunReport) -> Result<(), DocStatsError> {
    let command_line = app.config().dashboard.command.trim();
    if command_line.is_empty() {
        app.output_formatter().warning(
            "No dashboard command configured; set command under [dashboard] in docstats.toml",
        );
        return Ok(());
    }

    let parts: Vec<&str> = command_line.split_whitespace().collect();
    app.output_formatter()
        .info(&format!("Launching dashboard: {}", command_line));

    let status = process::Command::new(parts[0])
        .args(&parts[1..])
        .env("DOCSTATS_DATA_DIR", &report.data_directory)
        .status()
        .map_err(|e| DocStatsError::Dashboard {
            message: format!("failed to launch '{}': {}", parts[0], e),
        })?;

    if !status.success() {
        let detail = match status.code() {
            Some(code) => format!("exit code {}", code),
            None => "a signal".to_string(),
        };
        return Err(DocStatsError::Dashboard {
            message: format!("dashboard command failed with {}", detail),
        });
    }

    Ok(())
}

fn print_startup_error(error: &DocStatsError) {
    // Create a basic formatter for startup errors
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}
