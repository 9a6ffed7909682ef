use super::Context;
use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;
use expectations_editor::LemmaCount;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct CountsArgs {
    /// JSON file with `[{"lemma": ..., "count": ...}]` from the tagger
    pub file: PathBuf,
}

pub fn counts(args: CountsArgs, ctx: &Context) -> Result<()> {
    let path = ctx.resolve(&args.file);
    let source = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let batch: Vec<LemmaCount> = serde_json::from_str(&source)
        .with_context(|| format!("{} is not a list of lemma counts", path.display()))?;

    let mut store = ctx.resume_store()?;
    store.update_lemma_counts(&batch);

    println!("📊 {} {} lemma count(s)", "Applied".green().bold(), batch.len());
    for (rule_index, rule) in store.tree().rules.iter().enumerate() {
        for (cluster_index, cluster) in rule.children.iter().enumerate() {
            let count = if cluster.usage_count > 0 {
                cluster.usage_count.to_string().green()
            } else {
                "0".dimmed()
            };
            println!(
                "   {} {:<32} {}",
                format!("[{}.{}]", rule_index, cluster_index).dimmed(),
                cluster.lemma(),
                count
            );
        }
    }

    Ok(())
}
