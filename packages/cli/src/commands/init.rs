use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::Path;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Assignment id scoping the session keys
    #[arg(short, long, default_value = "global")]
    pub assignment: String,

    /// Session directory
    #[arg(short, long, default_value = ".expectations")]
    pub session_dir: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = cwd.join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing expectations workspace...".bright_blue().bold());

    let config = Config {
        session_dir: args.session_dir,
        assignment_id: args.assignment,
    };

    let session_dir = config.get_session_dir(cwd);
    if !session_dir.exists() {
        fs::create_dir_all(&session_dir)?;
        println!("  {} Created {}/", "✓".green(), config.session_dir);
    }

    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Workspace initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: expectations load <expectations.json>");
    println!("  2. Run: expectations show");

    Ok(())
}
