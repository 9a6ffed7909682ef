use super::Context;
use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use expectations_editor::{EditorError, MutationError};

#[derive(Args, Debug)]
pub struct SetTopicsArgs {
    /// Rule index
    pub rule: usize,

    /// Cluster index within the rule
    pub cluster: usize,

    /// New custom topics; none clears the list
    pub terms: Vec<String>,

    /// Store the terms as given, without normalizing or checking duplicates
    #[arg(long)]
    pub force: bool,
}

pub fn set_topics(args: SetTopicsArgs, ctx: &Context) -> Result<()> {
    let mut store = ctx.resume_store()?;

    if args.force {
        if !store.set_cluster_custom_topics(args.rule, args.cluster, args.terms) {
            bail!("No cluster at {}.{}", args.rule, args.cluster);
        }
    } else {
        match store.try_update_cluster_topics(args.rule, args.cluster, &args.terms) {
            Ok(_) => {}
            Err(EditorError::Mutation(MutationError::DuplicateTopic(hit))) => bail!("{}", hit),
            Err(e) => return Err(e.into()),
        }
    }

    let tree = store.tree();
    if let Some(cluster) = tree.cluster(args.rule, args.cluster) {
        println!(
            "{} {} custom topics: {}",
            "✓".green(),
            cluster.lemma().cyan(),
            if cluster.topic.custom_terms.is_empty() {
                "(none)".dimmed().to_string()
            } else {
                cluster.topic.custom_terms.join(", ")
            }
        );
    }

    Ok(())
}
