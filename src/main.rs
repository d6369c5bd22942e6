use clap::{Parser, Subcommand};
use cpp_solution_explorer::logging::{LogConfig, init_logging};
use cpp_solution_explorer::project::{ImporterConfig, ProjectScanner, ProjectWorkspace};

use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

/// CLI arguments for the C/C++ solution explorer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Workspace root to scan for build metadata (defaults to current directory)
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Configuration to make active (e.g. "Release|x64")
    #[arg(long, value_name = "NAME")]
    config: Option<String>,

    /// Path to MSBuild executable (overrides MSBUILD_PATH env var)
    #[arg(long, value_name = "PATH")]
    msbuild_path: Option<String>,

    /// Log level (overrides RUST_LOG env var)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Log file path (overrides CSE_LOG_FILE env var)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the imported projects
    Projects,
    /// List the configuration names and the active one
    Configs,
    /// Print the build and clean tasks document
    Tasks,
    /// Print the launch document for executable projects
    Launch,
    /// Print the compiler properties of one project
    Properties {
        /// Full name of the project, e.g. "demo.sln:app/app.vcxproj"
        full_name: String,
    },
}

#[derive(Serialize)]
struct ConfigsOutput<'a> {
    active: &'a str,
    configurations: &'a [String],
}

/// Create ProjectWorkspace with all import setup logic centralized
fn create_project_workspace(project_root: PathBuf, config: &ImporterConfig) -> ProjectWorkspace {
    info!(
        "Scanning workspace root for build metadata: {}",
        project_root.display()
    );

    let scanner = ProjectScanner::with_default_providers(config);

    match scanner.scan_project(&project_root) {
        Ok(project_workspace) => {
            info!(
                "Imported {} projects with {} configurations using {:?}",
                project_workspace.project_count(),
                project_workspace.configurations.len(),
                project_workspace.provider_type
            );
            project_workspace
        }
        Err(e) => {
            eprintln!(
                "Failed to scan workspace at {}: {}",
                project_root.display(),
                e
            );
            // Create empty ProjectWorkspace as fallback
            ProjectWorkspace::new(project_root, String::new(), Vec::new(), Vec::new())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize logging with configuration from env vars and CLI args
    let log_config = LogConfig::from_env().with_overrides(args.log_level, args.log_file);

    if let Err(e) = init_logging(log_config) {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    // Resolve workspace root directory
    let project_root = args.root.unwrap_or_else(|| {
        std::env::current_dir().unwrap_or_else(|e| {
            eprintln!("Failed to get current directory: {e}");
            std::process::exit(1);
        })
    });

    let importer_config = ImporterConfig::from_env().with_overrides(args.msbuild_path);
    info!("Using msbuild: {}", importer_config.msbuild_path);

    let mut workspace = create_project_workspace(project_root, &importer_config);

    if let Some(name) = args.config
        && let Err(e) = workspace.select_configuration(&name)
    {
        warn!("Keeping configuration {:?}: {}", workspace.selector.active(), e);
        eprintln!("{e}");
        std::process::exit(2);
    }

    match args.command {
        Command::Projects => print_json(&workspace.projects),
        Command::Configs => print_json(&ConfigsOutput {
            active: workspace.selector.active(),
            configurations: &workspace.configurations,
        }),
        Command::Tasks => print_json(&workspace.tasks_document()),
        Command::Launch => print_json(&workspace.launch_document()),
        Command::Properties { full_name } => {
            print_json(&workspace.property_config(&full_name)?)
        }
    }
}
