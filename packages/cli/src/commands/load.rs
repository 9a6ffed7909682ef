use super::{read_document, Context};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use expectations_editor::ReconcileOutcome;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Configuration document fetched from the server
    pub file: PathBuf,
}

pub fn load(args: LoadArgs, ctx: &Context) -> Result<()> {
    let incoming = read_document(&ctx.resolve(&args.file))?;

    let mut store = ctx.open_store();
    let newer = store.is_new_version(&incoming);
    let tree = store.load(incoming);

    println!("📥 {} {}", "Loaded".green().bold(), args.file.display());
    println!("   Document: {} ({})", tree.name.bright_white(), tree.id);
    println!("   Rules:    {}", tree.rule_count());
    println!("   Clusters: {}", tree.cluster_count());

    let outcome = match store.outcome() {
        Some(ReconcileOutcome::NoSavedState) => "no saved copy, adopted server document".green(),
        Some(ReconcileOutcome::ServerReplaced) => "different document, saved copy replaced".yellow(),
        Some(ReconcileOutcome::LocalKept) if newer => {
            "same document, local edits kept (server has a newer revision)".yellow()
        }
        Some(ReconcileOutcome::LocalKept) => "same document, local edits kept".green(),
        None => "not loaded".red(),
    };
    println!("   Outcome:  {}", outcome);

    Ok(())
}
