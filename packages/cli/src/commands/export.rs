use super::Context;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use expectations_parser::RawDocument;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output file; stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Keep the saved `savedAt` instead of stamping the current time
    #[arg(long)]
    pub keep_timestamp: bool,
}

pub fn export(args: ExportArgs, ctx: &Context) -> Result<()> {
    let store = ctx.resume_store()?;
    let mut document = store.to_raw_document();

    if !args.keep_timestamp {
        stamp(&mut document, chrono::Utc::now());
    }

    let json = serde_json::to_string_pretty(&document)?;
    match args.output {
        Some(output) => {
            let path = ctx.resolve(&output);
            std::fs::write(&path, &json)?;
            info!(path = %path.display(), bytes = json.len(), "Exported configuration");
            eprintln!("{} Exported to {}", "✓".green(), path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn stamp(document: &mut RawDocument, now: chrono::DateTime<chrono::Utc>) {
    document.info.saved_at = Some(now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_stamp_uses_utc_seconds() {
        let mut document = RawDocument::default();
        let now = chrono::Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();

        stamp(&mut document, now);
        assert_eq!(document.info.saved_at.as_deref(), Some("2024-03-01T09:30:00Z"));
    }
}
