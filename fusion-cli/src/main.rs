//! `fusion`, a command line front end for the Fusion parser.

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use fusion_core::{BuildConfig, FusionParser};
use fusion_error::handler::Handler;
use fusion_tracing::{init_tracing_subscriber, println_green, TracingSubscriberOptions};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{debug, error};

mod diagnostics;

use diagnostics::{format_err, format_warning};

#[derive(Debug, Parser)]
#[clap(
    name = "fusion",
    about = "Parse Fusion configuration files into a merged tree.",
    version
)]
pub struct App {
    /// Use verbose output.
    #[clap(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Silence all output.
    #[clap(short, long, global = true)]
    pub silent: bool,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse a file with everything it includes and print the merged tree as JSON.
    Parse {
        /// The entry file, e.g. `Resources/Private/Fusion/Root.fusion`.
        path: PathBuf,
        /// Print the tree on a single line.
        #[clap(long)]
        compact: bool,
    },
    /// Parse a file with everything it includes and only report problems.
    Check {
        path: PathBuf,
    },
    /// Print the syntax tree of a single file. Includes are not followed.
    Ast {
        path: PathBuf,
    },
}

fn main() {
    let app = App::parse();
    init_tracing_subscriber(TracingSubscriberOptions {
        verbosity: Some(app.verbose),
        silent: Some(app.silent),
        ..Default::default()
    });
    if let Err(err) = run(app) {
        error!("Error: {:?}", err);
        std::process::exit(1);
    }
}

fn run(app: App) -> Result<()> {
    match app.command {
        Command::Parse { path, compact } => {
            let tree = parse_tree(&path)?;
            let json = match compact {
                true => serde_json::to_string(&tree)?,
                false => serde_json::to_string_pretty(&tree)?,
            };
            println!("{json}");
        }
        Command::Check { path } => {
            parse_tree(&path)?;
            println_green(&format!("{} parsed without errors", path.display()));
        }
        Command::Ast { path } => {
            let src = fs::read_to_string(&path)
                .with_context(|| format!("failed to read `{}`", path.display()))?;
            let handler = Handler::default();
            let res = fusion_parse::parse_file(&handler, &src, Some(Arc::new(path.clone())));
            let file = report(handler, res.ok(), &path)?;
            println!("{file:#?}");
        }
    }
    Ok(())
}

fn parse_tree(path: &Path) -> Result<fusion_core::MergedTree> {
    let config = BuildConfig::from_dir_or_default(config_dir(path))?;
    debug!(?config, "using build config");
    let handler = Handler::default();
    let res = FusionParser::with_config(config).parse_from_file(&handler, path);
    report(handler, res.ok(), path)
}

/// The directory to start looking for `fusion.toml` from.
fn config_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Prints everything `handler` collected and fails if there were errors.
fn report<T>(handler: Handler, value: Option<T>, path: &Path) -> Result<T> {
    let (errors, warnings) = handler.consume();
    warnings.iter().for_each(format_warning);
    errors.iter().for_each(format_err);
    match value {
        Some(value) if errors.is_empty() => Ok(value),
        _ => bail!("failed to parse `{}`", path.display()),
    }
}
