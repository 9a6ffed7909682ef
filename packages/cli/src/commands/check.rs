use super::Context;
use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use expectations_editor::MatchType;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Candidate topic terms
    #[arg(required = true)]
    pub terms: Vec<String>,
}

pub fn check(args: CheckArgs, ctx: &Context) -> Result<()> {
    let store = ctx.resume_store()?;

    match store.check_duplicates(&args.terms) {
        None => {
            println!("{} No duplicates among {} term(s)", "✓".green(), args.terms.len());
            Ok(())
        }
        Some(hit) => {
            let kind = match hit.match_type {
                MatchType::Predefined => "predefined",
                MatchType::Custom => "custom",
            };
            println!(
                "{} '{}' is already a {} topic of {} [{}.{}]",
                "✗".red(),
                hit.topic.bright_white(),
                kind,
                hit.lemma.cyan(),
                hit.rule_index,
                hit.cluster_index
            );
            bail!("Duplicate topic '{}'", hit.topic)
        }
    }
}
