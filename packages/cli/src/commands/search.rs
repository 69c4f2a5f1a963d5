use super::resolve_path;
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use quire_common::blocks_io::read_blocks;
use quire_editor::{blocks_to_doc, find_matches, Match, SearchOptions};
use quire_model::{Document, ResolvedPos, Schema};
use std::path::PathBuf;

/// Characters of context shown on each side of a match
const CONTEXT: usize = 20;

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Chapter JSON file
    pub input: PathBuf,

    pub query: String,

    /// Match case exactly (overrides config)
    #[arg(short, long)]
    pub case_sensitive: bool,
}

pub fn search(args: SearchArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let options = SearchOptions {
        case_sensitive: args.case_sensitive || config.search.case_sensitive,
    };

    let blocks = read_blocks(&resolve_path(cwd, &args.input))?;
    let doc = blocks_to_doc(&blocks, &Schema::novel())?;
    let matches = find_matches(&doc, &args.query, options);

    if matches.is_empty() {
        println!("{} No matches for {:?}", "⚠️".yellow(), args.query);
        return Ok(());
    }

    for m in &matches {
        if let Some(line) = describe_match(&doc, m) {
            println!("  {} {}", "✓".green(), line);
        }
    }
    println!();
    println!("{} {} matches", "🔎".bright_blue(), matches.len());
    Ok(())
}

/// `block 2 (id) @5: …before[match]after…`
fn describe_match(doc: &Document, m: &Match) -> Option<String> {
    let ResolvedPos::Text { index, offset } = doc.resolve(m.from)? else {
        return None;
    };
    let block = &doc.blocks[index];
    let chars: Vec<char> = block.text_content().chars().collect();
    let end = (offset + (m.to - m.from)).min(chars.len());
    let start = offset.saturating_sub(CONTEXT);
    let tail = (end + CONTEXT).min(chars.len());

    let before: String = chars[start..offset].iter().collect();
    let found: String = chars[offset..end].iter().collect();
    let after: String = chars[end..tail].iter().collect();

    Some(format!(
        "block {} ({}) @{}: {}{}{}",
        index,
        block.id.as_deref().unwrap_or("-"),
        offset,
        before,
        found.bold().yellow(),
        after
    ))
}
