use super::{read_document, Context};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ResetArgs {
    /// Server configuration document to reset to
    pub file: PathBuf,
}

pub fn reset(args: ResetArgs, ctx: &Context) -> Result<()> {
    let incoming = read_document(&ctx.resolve(&args.file))?;

    let mut store = ctx.open_store();
    store.load(incoming);
    let tree = store.reset()?;

    println!("♻️  {} {}", "Reset".green().bold(), tree.name.bright_white());
    println!("   Local edits and custom topics discarded");
    println!("   Clusters: {}", tree.cluster_count());

    Ok(())
}
