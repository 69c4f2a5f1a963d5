use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use quire_editor::TypewriterOptions;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Directory for offline replica logs
    #[arg(long, default_value = ".quire/offline")]
    pub offline_dir: String,

    /// Keep the caret line centered while typing
    #[arg(long)]
    pub typewriter: bool,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Quire project...".bright_blue().bold());

    let offline_dir = PathBuf::from(cwd).join(&args.offline_dir);
    if !offline_dir.exists() {
        fs::create_dir_all(&offline_dir)?;
        println!("  {} Created {}/", "✓".green(), args.offline_dir);
    }

    let config = Config {
        offline_dir: args.offline_dir.clone(),
        typewriter: TypewriterOptions {
            enabled: args.typewriter,
            strict: false,
        },
        ..Config::default()
    };

    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: quire convert chapters/ --write");
    println!("  2. Run: quire render chapters/01.json");

    Ok(())
}
