use super::resolve_path;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use quire_common::blocks_io::{read_blocks, write_blocks};
use quire_editor::plugins::identity::assign_ids;
use quire_editor::{blocks_to_doc, doc_to_blocks, get_blocks_change};
use quire_model::{RandomIds, Schema};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Chapter JSON file, or a directory of them
    pub input: PathBuf,

    /// Rewrite each file with the normalized blocks
    #[arg(short, long)]
    pub write: bool,
}

#[derive(Debug, PartialEq, Eq)]
struct ConvertSummary {
    blocks: usize,
    /// Blocks given a fresh id
    repaired: usize,
    /// Blocks whose stored form changed
    changed: usize,
}

pub fn convert(args: ConvertArgs, cwd: &str) -> Result<()> {
    let input = resolve_path(cwd, &args.input);
    if !input.exists() {
        return Err(anyhow!("Input path does not exist: {}", input.display()));
    }

    let files = find_chapter_files(&input);
    if files.is_empty() {
        println!("{}", "⚠️  No chapter files found".yellow());
        return Ok(());
    }

    println!("{}", "🔄 Converting chapters...".bright_blue().bold());
    let schema = Schema::novel();
    let mut error_count = 0;

    for file in &files {
        let relative_path = file.strip_prefix(&input).unwrap_or(file);
        match convert_file(file, &schema, args.write) {
            Ok(summary) => {
                println!(
                    "  {} {} - {} blocks, {} ids repaired, {} normalized",
                    "✓".green(),
                    relative_path.display(),
                    summary.blocks,
                    summary.repaired,
                    summary.changed
                );
            }
            Err(e) => {
                error_count += 1;
                eprintln!(
                    "  {} {} - {}",
                    "✗".red(),
                    relative_path.display(),
                    e.to_string().red()
                );
            }
        }
    }

    println!();
    if error_count == 0 {
        println!("{} Converted {} files", "✅".green(), files.len());
        Ok(())
    } else {
        Err(anyhow!("{} of {} files failed", error_count, files.len()))
    }
}

fn find_chapter_files(input: &Path) -> Vec<PathBuf> {
    if input.is_file() {
        return vec![input.to_path_buf()];
    }

    let mut files: Vec<PathBuf> = WalkDir::new(input)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| path.extension().map_or(false, |ext| ext == "json"))
        .collect();
    files.sort();
    files
}

fn convert_file(path: &Path, schema: &Schema, write: bool) -> Result<ConvertSummary> {
    let blocks = read_blocks(path)?;
    let mut doc = blocks_to_doc(&blocks, schema)?;
    let repaired = assign_ids(&mut doc, &RandomIds);
    let converted = doc_to_blocks(&doc);
    let changed = get_blocks_change(&blocks, &converted).len();

    if write && changed > 0 {
        write_blocks(path, &converted)?;
    }

    Ok(ConvertSummary {
        blocks: converted.len(),
        repaired,
        changed,
    })
}
