//! linkweave CLI

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use linkweave::{OutputFormat, Render, ReportFormatter, ScanOptions};
use linkweave_core::LinkerSettings;
use serde::Serialize;
use std::path::PathBuf;

/// linkweave - rule-based links and inline annotations for source files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON settings file
    #[arg(long, global = true, env = "LINKWEAVE_CONFIG")]
    config: Option<String>,

    /// Output format (json, human, text)
    #[arg(long, global = true, default_value = "human")]
    format: OutputFormat,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print rule matches and inline annotations found in a file
    Scan {
        file: String,

        /// Rule file (default: <workspace>/.vscode/linker.json)
        #[arg(long)]
        rules: Option<String>,

        /// Workspace root (default: current directory)
        #[arg(long)]
        workspace: Option<String>,

        /// Skip the inline annotation pass
        #[arg(long)]
        no_inline: bool,
    },

    /// Resolve a possibly-prefixed path such as `#:package.json`
    ResolvePath {
        path: String,

        /// Document the path is written in
        #[arg(long)]
        document: Option<String>,

        #[arg(long)]
        workspace: Option<String>,
    },

    /// Substitute `${...}` tokens in a template
    ResolveVars {
        template: String,

        #[arg(long)]
        document: Option<String>,

        #[arg(long)]
        workspace: Option<String>,

        /// Cursor line (1-based) for `${lineNumber}`
        #[arg(long)]
        line: Option<usize>,
    },

    /// Check a rule file and list every issue
    Validate {
        #[arg(long)]
        rules: Option<String>,
    },

    /// Write an example rule file
    Init {
        #[arg(long)]
        rules: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn init_logging(verbose: u8, debug: bool) {
    let level = match (verbose, debug) {
        (0, false) => log::LevelFilter::Warn,
        (0, true) | (1, _) => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn expand(path: Option<&str>) -> Result<Option<PathBuf>> {
    path.map(linkweave::expand_path)
        .transpose()
        .context("Failed to expand path")
}

/// Rule file from the command line, else the settings' rules path under the
/// current directory
fn rules_path(settings: &LinkerSettings, rules: Option<&str>) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    Ok(match rules {
        Some(path) => linkweave::expand_path_from(path, &cwd)?,
        None => settings.rules_file(&cwd),
    })
}

fn print<T: Serialize + Render>(report: &T, format: OutputFormat) -> Result<()> {
    println!("{}", ReportFormatter::format(report, format)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = expand(cli.config.as_deref())?;
    let settings = linkweave::load_settings(config_path.as_deref())
        .context("Failed to load settings")?;

    init_logging(cli.verbose, settings.debug);
    log::debug!("linkweave v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Scan {
            file,
            rules,
            workspace,
            no_inline,
        } => {
            let file = linkweave::expand_path(&file)?;
            let options = ScanOptions {
                file,
                rules: expand(rules.as_deref())?,
                workspace: expand(workspace.as_deref())?,
                inline_links: !no_inline,
            };
            let report = linkweave::scan(&settings, &options)
                .with_context(|| format!("Failed to scan {}", options.file.display()))?;
            print(&report, cli.format)?;
        }

        Command::ResolvePath {
            path,
            document,
            workspace,
        } => {
            let document = expand(document.as_deref())?;
            let workspace = expand(workspace.as_deref())?;
            let report = linkweave::resolve_path(
                &settings,
                &path,
                document.as_deref(),
                workspace.as_deref(),
            )?;
            print(&report, cli.format)?;
        }

        Command::ResolveVars {
            template,
            document,
            workspace,
            line,
        } => {
            let document = expand(document.as_deref())?;
            let workspace = expand(workspace.as_deref())?;
            let report = linkweave::resolve_vars(
                &template,
                document.as_deref(),
                workspace.as_deref(),
                line,
            )?;
            print(&report, cli.format)?;
        }

        Command::Validate { rules } => {
            let path = rules_path(&settings, rules.as_deref())?;
            let report = linkweave::validate(&path)
                .with_context(|| format!("Failed to validate {}", path.display()))?;
            print(&report, cli.format)?;
            if !report.passed() {
                bail!("{} has validation errors", path.display());
            }
        }

        Command::Init { rules, force } => {
            let path = rules_path(&settings, rules.as_deref())?;
            let report = linkweave::init(&path, force)?;
            print(&report, cli.format)?;
        }
    }

    Ok(())
}
