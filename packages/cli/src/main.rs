mod commands;
mod config;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    check, counts, export, init, lemmas, load, reset, set_topics, show, status, CheckArgs,
    Context, CountsArgs, ExportArgs, InitArgs, LemmasArgs, LoadArgs, ResetArgs, SetTopicsArgs,
    ShowArgs, StatusArgs,
};
use config::Config;

/// Expectations CLI - manage rule, cluster and topic configurations
#[derive(Parser, Debug)]
#[command(name = "expectations")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Session directory (overrides the config file)
    #[arg(long, global = true)]
    session_dir: Option<String>,

    /// Assignment id (overrides the config file)
    #[arg(long, global = true)]
    assignment: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default expectations.config.json
    Init(InitArgs),

    /// Load a server document, reconciling it with the saved copy
    Load(LoadArgs),

    /// Print the rule and cluster tree
    Show(ShowArgs),

    /// List the distinct cluster lemmas
    Lemmas(LemmasArgs),

    /// Check candidate topics for duplicates
    Check(CheckArgs),

    /// Replace a cluster's custom topics
    SetTopics(SetTopicsArgs),

    /// Apply a tagger's lemma counts
    Counts(CountsArgs),

    /// Write the live document as JSON
    Export(ExportArgs),

    /// Discard local edits and rebuild from a server document
    Reset(ResetArgs),

    /// Compare a server document with the saved revision
    Status(StatusArgs),
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("Cannot get current directory")?;

    // init must work even when an existing config is unreadable
    let command = match cli.command {
        Command::Init(args) => return init(args, &cwd),
        command => command,
    };

    let config = Config::load(&cwd)?.with_overrides(cli.session_dir, cli.assignment);
    let ctx = Context { cwd, config };

    match command {
        Command::Init(args) => init(args, &ctx.cwd),
        Command::Load(args) => load(args, &ctx),
        Command::Show(args) => show(args, &ctx),
        Command::Lemmas(args) => lemmas(args, &ctx),
        Command::Check(args) => check(args, &ctx),
        Command::SetTopics(args) => set_topics(args, &ctx),
        Command::Counts(args) => counts(args, &ctx),
        Command::Export(args) => export(args, &ctx),
        Command::Reset(args) => reset(args, &ctx),
        Command::Status(args) => status(args, &ctx),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
