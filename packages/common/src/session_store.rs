use crate::{CommonError, CommonResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Key/value persistence scoped to one browser (or CLI) session.
///
/// Values are plain text, normally JSON. Implementations must treat a
/// missing key as `None` rather than an error.
pub trait SessionStore {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&mut self, key: &str, value: &str) -> CommonResult<()>;

    /// Remove `key`; removing a missing key is not an error
    fn remove(&mut self, key: &str) -> CommonResult<()>;
}

impl<S: SessionStore + ?Sized> SessionStore for Box<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> CommonResult<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> CommonResult<()> {
        (**self).remove(key)
    }
}

/// Read and decode a JSON value.
///
/// Corrupt values are logged and reported as absent.
pub fn read_json<T: DeserializeOwned>(store: &dyn SessionStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key = %key, error = %e, "Ignoring unreadable session value");
            None
        }
    }
}

/// Encode a value as JSON and store it
pub fn write_json<T: Serialize + ?Sized>(
    store: &mut dyn SessionStore,
    key: &str,
    value: &T,
) -> CommonResult<()> {
    let json = serde_json::to_string(value).map_err(|e| CommonError::Generic(e.to_string()))?;
    store.set(key, &json)
}

/// In-memory store (tests, wasm hosts that mirror into `sessionStorage`)
#[derive(Debug, Default, Clone)]
pub struct MemorySessionStore {
    entries: HashMap<String, String>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store from previously exported entries
    pub fn from_entries(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &HashMap<String, String> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> CommonResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> CommonResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Directory-backed store, one `<key>.json` file per key.
///
/// Writes go through a temp file and a rename so a reader never sees a
/// half-written value.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> CommonResult<PathBuf> {
        Ok(self.dir.join(format!("{}.json", file_stem(key)?)))
    }
}

/// File name stem for `key`.
///
/// `[A-Za-z0-9_-]` pass through, every other byte becomes `%XX`, so distinct
/// keys never share a file and no key can leave the directory.
fn file_stem(key: &str) -> CommonResult<String> {
    if key.is_empty() {
        return Err(CommonError::InvalidKey(key.to_string()));
    }

    let mut stem = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
            stem.push(byte as char);
        } else {
            stem.push_str(&format!("%{:02X}", byte));
        }
    }
    Ok(stem)
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key).ok()?;
        match fs::read_to_string(&path) {
            Ok(raw) => Some(raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read session value");
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) -> CommonResult<()> {
        let stem = file_stem(key)?;
        let path = self.dir.join(format!("{}.json", stem));
        fs::create_dir_all(&self.dir)?;
        let tmp = self.dir.join(format!(".{}.json.tmp", stem));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        debug!(path = %path.display(), bytes = value.len(), "Wrote session value");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> CommonResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Entry {
        name: String,
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemorySessionStore::new();
        assert_eq!(store.get("a_config"), None);

        store.set("a_config", "{}").unwrap();
        assert_eq!(store.get("a_config").as_deref(), Some("{}"));

        store.remove("a_config").unwrap();
        assert!(store.is_empty());

        // Removing again is fine
        store.remove("a_config").unwrap();
    }

    #[test]
    fn test_read_json_treats_corrupt_value_as_absent() {
        let mut store = MemorySessionStore::new();
        store.set("k", "{not json").unwrap();

        let value: Option<Entry> = read_json(&store, "k");
        assert!(value.is_none());
    }

    #[test]
    fn test_write_then_read_json() {
        let mut store = MemorySessionStore::new();
        let entry = Entry { name: "Clarity".to_string() };
        write_json(&mut store, "k", &entry).unwrap();

        let back: Option<Entry> = read_json(&store, "k");
        assert_eq!(back, Some(entry));
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();

        let mut store = FileSessionStore::new(dir.path());
        store.set("course-12_config", "{\"id\":\"x\"}").unwrap();

        let reopened = FileSessionStore::new(dir.path());
        assert_eq!(reopened.get("course-12_config").as_deref(), Some("{\"id\":\"x\"}"));
        assert_eq!(reopened.get("course-12_clusters"), None);
    }

    #[test]
    fn test_file_store_escapes_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileSessionStore::new(dir.path().join("session"));

        store.set("../escape", "x").unwrap();
        assert!(dir.path().join("session/%2E%2E%2Fescape.json").exists());
        assert!(!dir.path().join("escape.json").exists());
        assert_eq!(store.get("../escape").as_deref(), Some("x"));

        store.set("course.7_config", "dotted").unwrap();
        store.set("course_7_config", "plain").unwrap();
        assert_eq!(store.get("course.7_config").as_deref(), Some("dotted"));
        assert_eq!(store.get("course_7_config").as_deref(), Some("plain"));

        assert!(matches!(store.set("", "x"), Err(CommonError::InvalidKey(_))));
    }

    #[test]
    fn test_file_store_remove_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileSessionStore::new(dir.path().join("nested"));
        assert!(store.remove("nothing").is_ok());
    }
}
