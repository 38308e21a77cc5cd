//! Instance application dashboard
//!
//! Loads instance inventory reports and presents the overview, instance,
//! filtered and table pages in the terminal.

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::Result;
use appdash_views::{ExportFormat, TableQuery};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod render;
mod shell;

use commands::{FilterArgs, Session};
use config::DashboardConfig;

#[derive(Debug, Parser)]
#[command(name = "appdash", version, about = "Explore application inventories across instances")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true, env = "APPDASH_CONFIG")]
    config: Option<PathBuf>,

    /// Tracing filter, overrides the configured level
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Overview metrics, distributions and quick actions
    Summary {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Per-instance summary and detail
    Instances {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Instance to detail, defaults to the first one
        #[arg(long)]
        instance: Option<String>,
    },
    /// Applications matching one filter
    Filter {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Searchable table of every application
    Table {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Case-insensitive text in app name, type or instance
        #[arg(long)]
        search: Option<String>,
        #[arg(long = "type")]
        app_type: Option<String>,
        #[arg(long)]
        instance: Option<String>,
    },
    /// Port usage rankings and heatmap
    Ports {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Number of ports to rank
        #[arg(long)]
        top: Option<usize>,
    },
    /// Write applications to CSV or JSON
    Export {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long, default_value = "csv")]
        format: ExportFormat,
        /// Directory receiving the file
        #[arg(long, short, default_value = ".")]
        output: PathBuf,
        /// Export only matching applications
        #[arg(long = "type", conflicts_with_all = ["instance", "status"])]
        app_type: Option<String>,
        #[arg(long, conflicts_with = "status")]
        instance: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    /// Print an example input document
    Sample,
    /// Interactive session reading commands from stdin
    Shell {
        /// Files to load before the first prompt
        files: Vec<PathBuf>,
    },
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => DashboardConfig::load(path)?,
        None => None,
    };
    let config = loaded.clone().unwrap_or_default();
    init_tracing(cli.log_level.as_deref().unwrap_or(&config.log_level));

    if let (Some(path), None) = (&cli.config, &loaded) {
        tracing::warn!("Config file {} not found, using defaults", path.display());
    }
    info!("Starting appdash");

    let mut session = Session::new(config);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Summary { files } => commands::summary(&mut session, &files, &mut out)?,
        Command::Instances { files, instance } => commands::instances(&mut session, &files, instance, &mut out)?,
        Command::Filter { files, filter } => commands::filter(&mut session, &files, &filter, &mut out)?,
        Command::Table {
            files,
            search,
            app_type,
            instance,
        } => {
            let query = TableQuery {
                search,
                app_type,
                instance,
            };
            commands::table(&mut session, &files, query, &mut out)?
        }
        Command::Ports { files, top } => commands::ports(&mut session, &files, top, &mut out)?,
        Command::Export {
            files,
            format,
            output,
            app_type,
            instance,
            status,
        } => {
            let filter = FilterArgs {
                app_type,
                instance,
                status,
            };
            commands::export(&mut session, &files, format, Some(&filter), &output, &mut out)?;
        }
        Command::Sample => writeln!(out, "{}", render::SAMPLE_DOCUMENT)?,
        Command::Shell { files } => {
            if !files.is_empty() {
                if let Err(err) = session.load(&files, &mut out) {
                    writeln!(out, "Error: {:#}", err)?;
                }
            }
            let interactive = io::stdin().is_terminal();
            shell::run(&mut session, io::stdin().lock(), &mut out, interactive)?;
        }
    }

    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_filter_requires_exactly_one_selection() {
        assert!(Cli::try_parse_from(["appdash", "filter", "a.json"]).is_err());
        assert!(Cli::try_parse_from(["appdash", "filter", "a.json", "--type", "docker", "--status", "running"]).is_err());

        let cli = Cli::try_parse_from(["appdash", "filter", "a.json", "--status", "running"]).unwrap();
        let Command::Filter { filter, .. } = cli.command else {
            panic!("expected filter");
        };
        assert_eq!(filter.status.as_deref(), Some("running"));
    }

    #[test]
    fn test_export_arguments() {
        let cli = Cli::try_parse_from(["appdash", "export", "dir", "--format", "json", "-o", "out"]).unwrap();
        let Command::Export { format, output, app_type, .. } = cli.command else {
            panic!("expected export");
        };
        assert_eq!(format, ExportFormat::Json);
        assert_eq!(output, PathBuf::from("out"));
        assert!(app_type.is_none());
        assert!(Cli::try_parse_from(["appdash", "export", "dir", "--format", "xml"]).is_err());
    }
}
