//! `curator` - assembles the runtime configuration, validates it and reports
//! drift against the saved settings file.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use curator_config::{
    Collaborators, ConfigDrift, ConfigurationBuilder, ConfigurationModel, DriftDetector, LogLevel,
    RuntimeParameters, SchemaValidator, Severity, StructuredFileReader, ValidationIssue,
};
use curator_storage::{LiveDrive, StaticDrives};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{reload, EnvFilter, Registry};

/// Configuration doctor for the Curator media toolchain
#[derive(Parser)]
#[command(name = "curator")]
#[command(version, about = "Check Curator configuration, storage and drift", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the configuration and report validation issues
    Check(CheckArgs),
}

#[derive(Args, Debug)]
#[allow(clippy::struct_excessive_bools)]
struct CheckArgs {
    /// Root path hint (repository checkout or runtime root)
    #[arg(long)]
    root: PathBuf,
    /// Application settings file (TOML or JSON)
    #[arg(long)]
    config: PathBuf,
    /// Tool requirements file (TOML or JSON)
    #[arg(long)]
    requirements: Option<PathBuf>,
    /// JSON list of attached drives to reconcile against
    #[arg(long)]
    drives: Option<PathBuf>,
    /// Subdirectory that marks a source checkout
    #[arg(long)]
    marker: Option<String>,
    /// Most verbose logging
    #[arg(long)]
    debug: bool,
    /// Verbose logging
    #[arg(long)]
    verbose: bool,
    /// Development mode
    #[arg(long)]
    dev: bool,
    /// Check for tool updates
    #[arg(long)]
    update: bool,
    /// Never prompt
    #[arg(long)]
    non_interactive: bool,
    /// Also report drift against the settings file
    #[arg(long)]
    drift: bool,
    /// Create missing application directories
    #[arg(long)]
    create_dirs: bool,
}

impl CheckArgs {
    fn parameters(&self) -> RuntimeParameters {
        RuntimeParameters {
            debug: self.debug,
            verbose: self.verbose,
            dev: self.dev,
            update: self.update,
            non_interactive: self.non_interactive,
        }
    }
}

/// Findings of one `check` run.
struct CheckReport {
    issues: Vec<ValidationIssue>,
    drift: Vec<ConfigDrift>,
}

impl CheckReport {
    fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }
}

type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Initialize tracing. `RUST_LOG` wins; otherwise the filter starts at
/// `level` and can be reloaded once the configuration is known.
fn init_tracing(level: LogLevel) -> Option<FilterHandle> {
    use tracing_subscriber::{fmt, prelude::*};

    if let Ok(filter) = EnvFilter::try_from_default_env() {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
        return None;
    }

    let (filter, handle) = reload::Layer::new(EnvFilter::new(level.as_filter()));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
    Some(handle)
}

fn load_drives(path: &Path) -> Result<Vec<LiveDrive>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read drive list {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse drive list {}", path.display()))
}

fn build_model(args: &CheckArgs) -> Result<ConfigurationModel> {
    let mut collaborators = Collaborators::system();
    if let Some(path) = &args.drives {
        collaborators = collaborators.with_devices(StaticDrives::new(load_drives(path)?));
    }

    let mut builder = ConfigurationBuilder::new(collaborators);
    if let Some(marker) = &args.marker {
        builder.with_repository_marker(marker.as_str())?;
    }
    builder
        .with_root_path(&args.root)?
        .with_parameters(args.parameters())?
        .with_version(env!("CARGO_PKG_VERSION"))?
        .load_configuration_data_source(&args.config)
        .context("failed to load settings")?;

    if let Some(path) = &args.requirements {
        builder
            .load_requirements_data_source(path)
            .context("failed to load requirements")?;
    }
    if args.create_dirs {
        builder.initialize_directories()?;
    }

    let model = builder
        .load_secrets()?
        .update_storage_status()?
        .build()?;
    Ok(model)
}

fn check_model(args: &CheckArgs, model: &ConfigurationModel) -> Result<CheckReport> {
    let mut validator = SchemaValidator::with_defaults(None);
    let issues = validator.validate_configuration(model).to_vec();

    let drift = if args.drift {
        DriftDetector::new(Box::new(StructuredFileReader))
            .with_ignored_paths(DriftDetector::RUNTIME_ONLY_PATHS)
            .detect_drift(model, &args.config)?
    } else {
        Vec::new()
    };

    Ok(CheckReport { issues, drift })
}

fn print_report(model: &ConfigurationModel, report: &CheckReport) {
    println!(
        "{} {} ({})",
        model.display_name,
        model.version,
        model.paths.repository_root.display()
    );

    for (subsystem, message) in &model.errors {
        println!("  {subsystem}: {message}");
    }

    if report.issues.is_empty() {
        println!("no validation issues");
    }
    for issue in &report.issues {
        println!("  {issue}");
    }

    if !report.drift.is_empty() {
        println!("drift against saved settings:");
        for entry in &report.drift {
            println!("  {entry}");
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check(args) => {
            let handle = init_tracing(args.parameters().log_level());
            info!("Starting Curator v{}", env!("CARGO_PKG_VERSION"));

            let model = build_model(&args)?;
            if let Some(handle) = handle {
                handle
                    .reload(EnvFilter::new(model.logging.level.as_filter()))
                    .context("failed to apply configured log level")?;
            }

            let report = check_model(&args, &model)?;
            print_report(&model, &report);

            Ok(if report.has_errors() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
    }
}
