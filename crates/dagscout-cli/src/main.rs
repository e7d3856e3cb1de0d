use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dagscout_core::{Config, ScanResult};
use dagscout_engine::WorkspaceScanner;

const DEFAULT_CONFIG_FILE: &str = "dagscout.toml";

/// DagScout - pipeline graph extraction for Airflow, Prefect, dbt and GitHub Actions
#[derive(Parser)]
#[command(name = "dagscout")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: dagscout.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a project tree and emit the pipeline graph as JSON
    Scan {
        /// Project root
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Write the graph to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// Print the source location of every task with the given name
    Locate {
        /// Task, model or job name
        label: String,

        /// Project root
        #[arg(default_value = ".")]
        root: PathBuf,
    },

    /// Write a default dagscout.toml
    InitConfig {
        /// Where to write the config
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref(), cli.verbose)?;
    tracing::debug!(?config, "Loaded configuration");

    match cli.command {
        Commands::Scan { root, output, compact } => {
            scan_command(&config, &root, output.as_deref(), compact)
        }
        Commands::Locate { label, root } => locate_command(&config, &label, &root),
        Commands::InitConfig { path, force } => init_config_command(&path, force),
    }
}

/// Log to stderr; `RUST_LOG` overrides the level picked by `--verbose`
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(path: Option<&Path>, verbose: bool) -> Result<Config> {
    if let Some(config_path) = path {
        return Config::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()));
    }

    let default_path = Path::new(DEFAULT_CONFIG_FILE);
    if default_path.exists() {
        return Config::from_file(default_path)
            .with_context(|| format!("Failed to load config from {}", default_path.display()));
    }

    if verbose {
        eprintln!("{}", "No config file found, using defaults".yellow());
    }
    Ok(Config::default())
}

/// Scan command - extract the graph and write it as JSON
fn scan_command(config: &Config, root: &Path, output: Option<&Path>, compact: bool) -> Result<()> {
    let result = WorkspaceScanner::new(config.clone()).scan(root);

    let json = if compact {
        result.to_json_compact()
    } else {
        result.to_json()
    }
    .context("Failed to serialize scan result")?;

    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("{} {}", "Graph saved to:".green(), path.display());
        }
        None => println!("{}", json),
    }

    print_summary(&result);
    Ok(())
}

/// Locate command - resolve a task name to file:line
fn locate_command(config: &Config, label: &str, root: &Path) -> Result<()> {
    let result = WorkspaceScanner::new(config.clone()).scan(root);
    let matches = result.find_by_label(label);

    if matches.is_empty() {
        return Err(anyhow::anyhow!("No pipeline task named '{}' under {}", label, root.display()));
    }

    for node in matches {
        match result.location(&node.id) {
            Some(entry) if entry.is_navigable() => {
                let file = entry.file.as_deref().unwrap_or_default();
                let line = entry.line.unwrap_or(1);
                println!("{}:{} {}", file, line, format!("({})", node.id).dimmed());
            }
            _ => println!("{} {}", node.id.yellow(), "(no source location)".dimmed()),
        }
    }

    Ok(())
}

/// Init-config command - write defaults to disk
fn init_config_command(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(anyhow::anyhow!(
            "{} already exists. Use --force to overwrite it.",
            path.display()
        ));
    }

    Config::default()
        .save_to_file(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    eprintln!("{} {}", "Config written to:".green(), path.display());
    Ok(())
}

fn print_summary(result: &ScanResult) {
    if result.is_empty() {
        eprintln!(
            "{}",
            "No pipeline tasks found. Supported: Airflow, Prefect, dbt, GitHub Actions.".yellow()
        );
        return;
    }

    let summary = result.summary();
    eprintln!(
        "{} {} nodes, {} edges, {} with source locations",
        "Found".bold().cyan(),
        summary.nodes.to_string().green(),
        summary.edges.to_string().green(),
        summary.mapped
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn scan_defaults() {
        let cli = Cli::try_parse_from(["dagscout", "scan"]).unwrap();
        match cli.command {
            Commands::Scan { root, output, compact } => {
                assert_eq!(root, PathBuf::from("."));
                assert!(output.is_none());
                assert!(!compact);
            }
            _ => panic!("expected scan"),
        }
    }

    fn workspace() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let models = dir.path().join("models");
        std::fs::create_dir_all(&models).unwrap();
        std::fs::write(models.join("orders.sql"), "select * from {{ ref('customers') }}").unwrap();
        dir
    }

    #[test]
    fn locate_finds_known_task() {
        let dir = workspace();
        assert!(locate_command(&Config::default(), "orders", dir.path()).is_ok());
    }

    #[test]
    fn locate_unknown_task_is_an_error() {
        let dir = workspace();
        let err = locate_command(&Config::default(), "shipments", dir.path()).unwrap_err();
        assert!(err.to_string().contains("No pipeline task named 'shipments'"));
    }

    #[test]
    fn scan_writes_graph_to_output_file() {
        let dir = workspace();
        let output = dir.path().join("graph.json");

        scan_command(&Config::default(), dir.path(), Some(output.as_path()), false).unwrap();

        let written = std::fs::read_to_string(&output).unwrap();
        let expected = WorkspaceScanner::default().scan(dir.path()).to_json().unwrap();
        assert_eq!(written, expected);
        assert!(written.contains("\"customers\""));
    }

    #[test]
    fn init_config_requires_force_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);

        init_config_command(&path, false).unwrap();
        assert_eq!(Config::from_file(&path).unwrap(), Config::default());

        let err = init_config_command(&path, false).unwrap_err();
        assert!(err.to_string().contains("already exists"));

        assert!(init_config_command(&path, true).is_ok());
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/dagscout.toml")), false).unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["dagscout", "locate", "extract", "/repo", "--verbose"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Locate { ref label, .. } if label == "extract"));
    }
}
