use super::resolve_path;
use anyhow::Result;
use chrono::Utc;
use clap::Args;
use colored::Colorize;
use quire_common::blocks_io::read_blocks;
use quire_editor::{get_blocks_change, get_delta_blocks};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Earlier snapshot of the chapter
    pub previous: PathBuf,

    /// Later snapshot of the chapter
    pub current: PathBuf,

    /// Print create/update/delete records instead of the change set
    #[arg(long)]
    pub delta: bool,
}

pub fn diff(args: DiffArgs, cwd: &str) -> Result<()> {
    let previous = read_blocks(&resolve_path(cwd, &args.previous))?;
    let current = read_blocks(&resolve_path(cwd, &args.current))?;

    let (json, count) = if args.delta {
        let delta = get_delta_blocks(&previous, &current, Utc::now());
        (serde_json::to_string_pretty(&delta)?, delta.len())
    } else {
        let changes = get_blocks_change(&previous, &current);
        (serde_json::to_string_pretty(&changes)?, changes.len())
    };

    println!("{}", json);
    if count == 0 {
        eprintln!("{} No changes", "✓".green());
    } else {
        eprintln!("{} {} blocks changed", "Δ".bright_blue(), count);
    }
    Ok(())
}
