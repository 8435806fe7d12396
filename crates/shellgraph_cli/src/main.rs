// SPDX-License-Identifier: MIT OR Apache-2.0
//! `shellgraph` - compile, lay out and inspect shell graph files.
//!
//! Generated scripts and reports go to stdout, logs go to stderr.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use commands::{CliError, EmitOptions, LayoutOptions};
use config::{ShellgraphConfig, CONFIG_FILE_NAME};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Visual shell graph compiler
#[derive(Parser, Debug)]
#[command(name = "shellgraph", version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ./shellgraph.ron)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a graph to a shell script
    Emit {
        /// Graph file
        graph: PathBuf,
        /// Write the script here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Spaces per indent level
        #[arg(long)]
        indent: Option<usize>,
        /// First line of the script, e.g. "#!/bin/sh"
        #[arg(long)]
        shebang: Option<String>,
    },
    /// Compute node positions
    Layout {
        /// Graph file
        graph: PathBuf,
        /// Store positions in the graph file instead of printing them
        #[arg(long)]
        write: bool,
        /// Distance between columns
        #[arg(long)]
        x_spacing: Option<i64>,
        /// Distance between rows
        #[arg(long)]
        y_spacing: Option<i64>,
    },
    /// Report counts, start node and execution order
    Validate {
        /// Graph file
        graph: PathBuf,
    },
    /// Create a graph with a single start node
    New {
        /// Graph file to create
        graph: PathBuf,
    },
    /// Print the effective config as RON
    Config {
        /// Save it to the config path instead
        #[arg(long)]
        write: bool,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = format!("shellgraph={level}").parse::<Directive>() {
        env_filter = env_filter.add_directive(directive);
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print(text: &str) -> Result<(), CliError> {
    std::io::stdout()
        .write_all(text.as_bytes())
        .map_err(|source| CliError::Io {
            path: PathBuf::from("<stdout>"),
            source,
        })
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
    let config = if cli.config.is_some() {
        ShellgraphConfig::load(&config_path)?
    } else {
        ShellgraphConfig::load_or_default(&config_path)?
    };

    match cli.command {
        Command::Emit {
            graph,
            output,
            indent,
            shebang,
        } => {
            let script = commands::run_emit(&graph, &config, EmitOptions { indent, shebang })?;
            match output {
                Some(out) => {
                    commands::write_file(&out, &script)?;
                    tracing::info!("Wrote {}", out.display());
                }
                None => print(&script)?,
            }
        }
        Command::Layout {
            graph,
            write,
            x_spacing,
            y_spacing,
        } => {
            let options = LayoutOptions {
                x_spacing,
                y_spacing,
            };
            print(&commands::run_layout(&graph, &config, options, write)?)?;
        }
        Command::Validate { graph } => print(&commands::run_validate(&graph)?)?,
        Command::New { graph } => commands::run_new(&graph)?,
        Command::Config { write: true } => {
            config.save(&config_path)?;
            tracing::info!("Wrote {}", config_path.display());
        }
        Command::Config { write: false } => print(&config.to_ron()?)?,
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
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
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["shellgraph", "emit", "g.json", "--indent", "2", "--verbose"]);
        assert!(cli.verbose);
        match cli.command {
            Command::Emit { graph, indent, .. } => {
                assert_eq!(graph, PathBuf::from("g.json"));
                assert_eq!(indent, Some(2));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_layout_flags() {
        let cli = Cli::parse_from([
            "shellgraph",
            "--config",
            "custom.ron",
            "layout",
            "g.json",
            "--write",
            "--x-spacing",
            "300",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("custom.ron")));
        assert!(matches!(
            cli.command,
            Command::Layout {
                write: true,
                x_spacing: Some(300),
                y_spacing: None,
                ..
            }
        ));
    }
}
