use super::Context;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use expectations_parser::{Cluster, Rule};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Only show the rule at this index
    #[arg(short, long)]
    pub rule: Option<usize>,

    /// Print the live rules as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct LemmasArgs {
    /// Print every lemma with its terms
    #[arg(short, long)]
    pub topics: bool,

    /// Print all terms as one semicolon-joined line
    #[arg(short, long, conflicts_with = "topics")]
    pub joined: bool,
}

pub fn show(args: ShowArgs, ctx: &Context) -> Result<()> {
    let store = ctx.resume_store()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&store.get_json_rules())?);
        return Ok(());
    }

    let tree = store.tree();
    println!("{}", tree.name.bright_white().bold());
    if let Some(version) = &tree.info.version {
        println!("   Version {}", version);
    }
    println!();

    match args.rule {
        Some(index) => {
            let rule = tree
                .rule(index)
                .ok_or_else(|| anyhow!("No rule at index {} ({} rules)", index, tree.rule_count()))?;
            print_rule(index, rule);
        }
        None => {
            for (index, rule) in tree.rules.iter().enumerate() {
                print_rule(index, rule);
            }
        }
    }

    Ok(())
}

fn print_rule(index: usize, rule: &Rule) {
    let marker = if rule.is_group { " (group)" } else { "" };
    println!("{} {}{}", format!("[{}]", index).dimmed(), rule.name.bold(), marker);

    for (cluster_index, cluster) in rule.children.iter().enumerate() {
        print_cluster(index, cluster_index, cluster);
    }
    println!();
}

fn print_cluster(rule_index: usize, cluster_index: usize, cluster: &Cluster) {
    let usage = if cluster.usage_count > 0 {
        format!("{} uses", cluster.usage_count).green()
    } else {
        "unused".dimmed()
    };

    println!(
        "   {} {} [{}]",
        format!("[{}.{}]", rule_index, cluster_index).dimmed(),
        cluster.lemma().cyan(),
        usage
    );

    if !cluster.topic.predefined_terms.is_empty() {
        println!("       predefined: {}", cluster.topic.predefined_terms.join(", "));
    }
    if !cluster.topic.custom_terms.is_empty() {
        println!("       custom:     {}", cluster.topic.custom_terms.join(", ").yellow());
    }
}

pub fn lemmas(args: LemmasArgs, ctx: &Context) -> Result<()> {
    let store = ctx.resume_store()?;
    let tree = store.tree();

    if args.joined {
        println!("{}", tree.all_topics_text());
    } else if args.topics {
        for entry in tree.topics_by_lemma() {
            println!("{}: {}", entry.lemma.cyan(), entry.topics.join(", "));
        }
    } else {
        for lemma in tree.lemmas() {
            println!("{}", lemma);
        }
    }

    Ok(())
}
