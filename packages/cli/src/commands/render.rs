use super::resolve_path;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use quire_common::blocks_io::read_blocks;
use quire_editor::blocks_to_doc;
use quire_model::Schema;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Chapter JSON file
    pub input: PathBuf,

    /// Write HTML here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn render(args: RenderArgs, cwd: &str) -> Result<()> {
    let schema = Schema::novel();
    let blocks = read_blocks(&resolve_path(cwd, &args.input))?;
    let doc = blocks_to_doc(&blocks, &schema)?;
    let html = schema.render_html(&doc);

    match args.output {
        Some(output) => {
            let path = resolve_path(cwd, &output);
            fs::write(&path, html)?;
            println!("  {} {}", "✓".green(), path.display());
        }
        None => println!("{}", html),
    }
    Ok(())
}
