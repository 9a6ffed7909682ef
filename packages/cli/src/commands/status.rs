use super::{read_document, Context};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use expectations_parser::DocumentInfo;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Server configuration document to compare against the saved copy
    pub file: PathBuf,
}

pub fn status(args: StatusArgs, ctx: &Context) -> Result<()> {
    let incoming = read_document(&ctx.resolve(&args.file))?;
    let store = ctx.open_store();

    println!("Assignment: {}", ctx.config.assignment_id.bright_white());
    print_info("Server", &incoming.info);

    match store.saved_document() {
        None => println!("{}", "No saved copy".yellow()),
        Some(saved) => {
            print_info("Saved ", &saved.info);
            if saved.id != incoming.id {
                println!("{}", "Saved copy belongs to a different document".yellow());
            }
        }
    }

    if store.is_new_version(&incoming) {
        println!("{} {}", "●".yellow(), "New version available".yellow().bold());
    } else {
        println!("{} {}", "●".green(), "Up to date".green().bold());
    }

    Ok(())
}

fn print_info(label: &str, info: &DocumentInfo) {
    let show = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
    println!(
        "{}: {} v{} saved {} ({})",
        label,
        show(&info.name),
        show(&info.version),
        show(&info.saved_at),
        show(&info.filename)
    );
}
