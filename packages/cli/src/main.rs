mod commands;
mod config;
mod host;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    convert, init, prefs, preview, tree, ConvertArgs, InitArgs, PrefsArgs, PreviewArgs, TreeArgs,
};
use tracing_subscriber::EnvFilter;

/// Docsync CLI - keep structured documents and their text in sync
#[derive(Parser, Debug)]
#[command(name = "docsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a docsync project
    Init(InitArgs),

    /// Convert documents between formats and indentations
    Convert(ConvertArgs),

    /// Print the (possibly truncated) preview of a document
    Preview(PreviewArgs),

    /// Render a document's editable tree
    Tree(TreeArgs),

    /// Show or update persisted output preferences
    Prefs(PrefsArgs),
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| {
            let cwd = cwd.display().to_string();
            match cli.command {
                Command::Init(args) => init(args, &cwd),
                Command::Convert(args) => convert(args, &cwd),
                Command::Preview(args) => preview(args, &cwd),
                Command::Tree(args) => tree(args, &cwd),
                Command::Prefs(args) => prefs(args, &cwd),
            }
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
