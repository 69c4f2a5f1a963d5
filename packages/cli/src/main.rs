mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    append, convert, diff, init, render, search, AppendArgs, ConvertArgs, DiffArgs, InitArgs,
    RenderArgs, SearchArgs,
};
use tracing::Level;

/// Quire CLI - chapter tools for the Quire editor
#[derive(Parser, Debug)]
#[command(name = "quire")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log repairs and session activity
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a Quire project
    Init(InitArgs),

    /// Round-trip chapter files through the editor tree, repairing ids
    Convert(ConvertArgs),

    /// Print the change set between two chapter snapshots
    Diff(DiffArgs),

    /// Search a chapter
    Search(SearchArgs),

    /// Render a chapter as HTML
    Render(RenderArgs),

    /// Paste text at the end of a chapter through an editing session
    Append(AppendArgs),
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| {
            let cwd = cwd.display().to_string();
            match cli.command {
                Command::Init(args) => init(args, &cwd),
                Command::Convert(args) => convert(args, &cwd),
                Command::Diff(args) => diff(args, &cwd),
                Command::Search(args) => search(args, &cwd),
                Command::Render(args) => render(args, &cwd),
                Command::Append(args) => append(args, &cwd),
            }
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
