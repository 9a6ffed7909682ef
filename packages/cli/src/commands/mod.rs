pub mod check;
pub mod counts;
pub mod export;
pub mod init;
pub mod load;
pub mod reset;
pub mod show;
pub mod status;
pub mod topics;

pub use check::{check, CheckArgs};
pub use counts::{counts, CountsArgs};
pub use export::{export, ExportArgs};
pub use init::{init, InitArgs};
pub use load::{load, LoadArgs};
pub use reset::{reset, ResetArgs};
pub use show::{lemmas, show, LemmasArgs, ShowArgs};
pub use status::{status, StatusArgs};
pub use topics::{set_topics, SetTopicsArgs};

use crate::config::Config;
use anyhow::{anyhow, Context as _, Result};
use expectations_common::FileSessionStore;
use expectations_editor::ConfigurationStore;
use expectations_parser::{parse_str, RawDocument};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolved configuration plus working directory
#[derive(Debug, Clone)]
pub struct Context {
    pub cwd: PathBuf,
    pub config: Config,
}

impl Context {
    /// Store over the configured session directory, nothing loaded yet
    pub fn open_store(&self) -> ConfigurationStore<FileSessionStore> {
        let dir = self.config.get_session_dir(&self.cwd);
        debug!(
            session_dir = %dir.display(),
            assignment = %self.config.assignment_id,
            "Opening session store"
        );
        ConfigurationStore::new(FileSessionStore::new(dir), &self.config.assignment_id)
    }

    /// Store with the saved configuration loaded
    pub fn resume_store(&self) -> Result<ConfigurationStore<FileSessionStore>> {
        let mut store = self.open_store();
        if store.resume().is_none() {
            return Err(anyhow!(
                "No configuration saved for assignment '{}'. Run `expectations load <file>` first",
                self.config.assignment_id
            ));
        }
        Ok(store)
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.cwd.join(path)
    }
}

/// Read and decode a configuration document
pub fn read_document(path: &Path) -> Result<RawDocument> {
    debug!(path = %path.display(), "Reading configuration document");
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_str(&source).with_context(|| format!("{} is not a configuration document", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_persists_under_configured_session_dir() {
        let dir = tempfile::tempdir().unwrap();
        let document = dir.path().join("report.json");
        std::fs::write(&document, r#"{"id": "doc-1", "rules": {"rules": []}}"#).unwrap();

        let ctx = Context {
            cwd: dir.path().to_path_buf(),
            config: Config::default().with_overrides(Some("sessions".into()), Some("course.7".into())),
        };

        let mut store = ctx.open_store();
        store.load(read_document(&ctx.resolve(Path::new("report.json"))).unwrap());

        assert!(dir.path().join("sessions/course%2E7_config.json").exists());
        assert!(ctx.resume_store().is_ok());
    }

    #[test]
    fn test_read_document_names_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");

        let err = read_document(&missing).unwrap_err();
        assert!(format!("{:#}", err).contains("missing.json"));
    }
}
