//! Noise-token blacklist and its JSON store.
//!
//! The blacklist maps lowercase tokens to an active flag. Iteration follows
//! insertion order, which is also the order tokens are removed from titles.
//! Mutations are value transforms; nothing is written until `save` is called.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Default store location, relative to the working directory
pub const DEFAULT_BLACKLIST_FILE: &str = "blacklist.json";

/// Entries written on first load, in this order
pub const DEFAULT_ENTRIES: [(&str, bool); 5] = [
    ("remastered", true),
    ("live", true),
    ("bonus track", false),
    ("demo", false),
    ("radio edit", true),
];

/// Canonical key form: trimmed and lowercased
pub fn normalize_token(token: &str) -> String {
    token.trim().to_lowercase()
}

// ============================================================================
// Blacklist
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Blacklist {
    entries: Vec<(String, bool)>,
}

impl Blacklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// The blacklist a fresh store is populated with
    pub fn with_defaults() -> Self {
        DEFAULT_ENTRIES
            .iter()
            .fold(Self::new(), |bl, &(token, active)| bl.insert(token, active))
    }

    /// Insert `token` with `active`, keeping the first occurrence of a key
    fn insert(mut self, token: &str, active: bool) -> Self {
        let key = normalize_token(token);
        if !key.is_empty() && !self.contains(&key) {
            self.entries.push((key, active));
        }
        self
    }

    /// Add a new active token. No-op when the normalized token is empty or
    /// already present (its flag is left untouched).
    pub fn add_token(self, token: &str) -> Self {
        self.insert(token, true)
    }

    /// Set the flag of an existing token. Unknown tokens are ignored.
    pub fn set_active(mut self, token: &str, active: bool) -> Self {
        let key = normalize_token(token);
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = active;
        }
        self
    }

    pub fn remove_token(mut self, token: &str) -> Self {
        let key = normalize_token(token);
        self.entries.retain(|(k, _)| *k != key);
        self
    }

    pub fn contains(&self, token: &str) -> bool {
        let key = normalize_token(token);
        self.entries.iter().any(|(k, _)| *k == key)
    }

    pub fn is_active(&self, token: &str) -> Option<bool> {
        let key = normalize_token(token);
        self.entries.iter().find(|(k, _)| *k == key).map(|&(_, a)| a)
    }

    /// All entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.entries.iter().map(|(k, a)| (k.as_str(), *a))
    }

    /// Active tokens in insertion order
    pub fn active_tokens(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter(|(_, a)| *a).map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, bool)> for Blacklist {
    fn from_iter<I: IntoIterator<Item = (&'a str, bool)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |bl, (token, active)| bl.insert(token, active))
    }
}

impl Serialize for Blacklist {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (token, active) in &self.entries {
            map.serialize_entry(token, active)?;
        }
        map.end()
    }
}

// ============================================================================
// Store
// ============================================================================

/// JSON document holding one blacklist.
#[derive(Clone, Debug)]
pub struct BlacklistStore {
    path: PathBuf,
}

impl BlacklistStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the blacklist, creating and persisting the defaults when the
    /// store does not exist yet.
    pub fn load(&self) -> Result<Blacklist> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "Creating default blacklist");
            let defaults = Blacklist::with_defaults();
            self.save(&defaults)?;
            return Ok(defaults);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| Error::io(&self.path, e))?;
        let map: Map<String, Value> = serde_json::from_str(&content)?;

        let mut blacklist = Blacklist::new();
        for (token, value) in map {
            let active = value.as_bool().ok_or_else(|| Error::InvalidBlacklist {
                path: self.path.clone(),
                token: token.clone(),
            })?;
            blacklist = blacklist.insert(&token, active);
        }
        debug!(path = %self.path.display(), entries = blacklist.len(), "Loaded blacklist");
        Ok(blacklist)
    }

    /// Persist `blacklist`. The in-memory value stays valid on failure.
    pub fn save(&self, blacklist: &Blacklist) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(blacklist)?;
        fs::write(&self.path, json).map_err(|e| Error::io(&self.path, e))?;
        debug!(path = %self.path.display(), entries = blacklist.len(), "Saved blacklist");
        Ok(())
    }
}

impl Default for BlacklistStore {
    fn default() -> Self {
        Self::new(DEFAULT_BLACKLIST_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_in_order() {
        let bl = Blacklist::with_defaults();
        let entries: Vec<_> = bl.iter().collect();
        assert_eq!(
            entries,
            vec![
                ("remastered", true),
                ("live", true),
                ("bonus track", false),
                ("demo", false),
                ("radio edit", true),
            ]
        );
        assert_eq!(
            bl.active_tokens().collect::<Vec<_>>(),
            vec!["remastered", "live", "radio edit"]
        );
    }

    #[test]
    fn test_add_token() {
        let bl = Blacklist::new().add_token("  Acoustic ");
        assert_eq!(bl.is_active("acoustic"), Some(true));

        // Empty and duplicate tokens are no-ops
        let bl = bl.add_token("   ").add_token("ACOUSTIC");
        assert_eq!(bl.len(), 1);
    }

    #[test]
    fn test_add_existing_keeps_flag() {
        let bl = Blacklist::with_defaults().add_token("Demo");
        assert_eq!(bl.is_active("demo"), Some(false));
        assert_eq!(bl.len(), 5);
    }

    #[test]
    fn test_set_active() {
        let bl = Blacklist::with_defaults()
            .set_active("Demo", true)
            .set_active("live", false)
            .set_active("unknown", true);
        assert_eq!(bl.is_active("demo"), Some(true));
        assert_eq!(bl.is_active("live"), Some(false));
        assert_eq!(bl.is_active("unknown"), None);
        assert_eq!(bl.len(), 5);
    }

    #[test]
    fn test_remove_token() {
        let bl = Blacklist::with_defaults().remove_token("LIVE");
        assert!(!bl.contains("live"));
        assert_eq!(bl.len(), 4);
    }

    #[test]
    fn test_from_iter_normalizes_keys() {
        let bl: Blacklist = [(" Live ", true), ("live", false), ("", true)].into_iter().collect();
        assert_eq!(bl.iter().collect::<Vec<_>>(), vec![("live", true)]);
    }

    #[test]
    fn test_load_missing_creates_defaults() {
        let dir = tempdir().unwrap();
        let store = BlacklistStore::new(dir.path().join("blacklist.json"));

        let bl = store.load().unwrap();
        assert_eq!(bl, Blacklist::with_defaults());
        assert!(store.path().exists());

        // The persisted document reloads to the same value
        assert_eq!(store.load().unwrap(), bl);
    }

    #[test]
    fn test_save_and_reload_preserves_order() {
        let dir = tempdir().unwrap();
        let store = BlacklistStore::new(dir.path().join("nested").join("bl.json"));

        let bl = Blacklist::new()
            .add_token("zzz")
            .add_token("aaa")
            .add_token("mmm")
            .set_active("aaa", false);
        store.save(&bl).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(
            loaded.iter().collect::<Vec<_>>(),
            vec![("zzz", true), ("aaa", false), ("mmm", true)]
        );
    }

    #[test]
    fn test_load_rejects_non_boolean() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bl.json");
        fs::write(&path, r#"{"live": "yes"}"#).unwrap();

        let err = BlacklistStore::new(&path).load().unwrap_err();
        assert!(matches!(err, Error::InvalidBlacklist { ref token, .. } if token == "live"));
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bl.json");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(BlacklistStore::new(&path).load(), Err(Error::Json(_))));
    }
}
