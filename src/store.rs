use crate::settings::{ConfigDefaults, StoredSettings, UserSettings};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

pub const FAVORITES_KEY: &str = "favorites";
pub const SETTINGS_KEY: &str = "settings";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not resolve a data directory")]
    NoDataDir,
}

/// Key/value persistence with last-write-wins semantics.
pub trait StateStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<Value>, StoreError>;
    fn save(&self, key: &str, value: &Value) -> Result<(), StoreError>;
}

/// One pretty-printed JSON file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn in_data_dir() -> Result<Self, StoreError> {
        let base = dirs::data_dir().ok_or(StoreError::NoDataDir)?;
        Ok(Self::new(base.join("resource-hub")))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StateStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let path = self.path_for(key);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Json { path, source })
    }

    fn save(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.path_for(key);
        let body = serde_json::to_string_pretty(value).map_err(|source| StoreError::Json {
            path: path.clone(),
            source,
        })?;

        // Write then rename so a crash never leaves a half-written file.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, body).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StoreError::Io { path, source })
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, Value>>>,
}

impl MemoryStore {
    pub fn get(&self, key: &str) -> Option<Value> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

impl StateStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.get(key))
    }

    fn save(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.clone());
        Ok(())
    }
}

/// Favorited hrefs in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoriteSet {
    hrefs: Vec<String>,
}

impl FavoriteSet {
    pub fn from_hrefs(hrefs: impl IntoIterator<Item = String>) -> Self {
        let mut set = Self::default();
        for href in hrefs {
            if !set.contains(&href) {
                set.hrefs.push(href);
            }
        }
        set
    }

    pub fn contains(&self, href: &str) -> bool {
        self.hrefs.iter().any(|h| h == href)
    }

    /// Adds `href` if absent, removes it otherwise. Returns whether it is a
    /// favorite afterwards.
    pub fn toggle(&mut self, href: &str) -> bool {
        if let Some(idx) = self.hrefs.iter().position(|h| h == href) {
            self.hrefs.remove(idx);
            false
        } else {
            self.hrefs.push(href.to_string());
            true
        }
    }

    /// Make membership of `href` match `favorite`.
    pub fn set(&mut self, href: &str, favorite: bool) {
        if self.contains(href) != favorite {
            self.toggle(href);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.hrefs.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.hrefs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hrefs.is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.iter().map(str::to_string).collect()
    }
}

pub struct FavoritesRepo {
    store: Arc<dyn StateStore>,
}

impl FavoritesRepo {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    /// Anything unreadable is treated as "no favorites yet".
    pub fn get(&self) -> FavoriteSet {
        match self.store.load(FAVORITES_KEY) {
            Ok(Some(value)) => match serde_json::from_value::<Vec<String>>(value) {
                Ok(hrefs) => FavoriteSet::from_hrefs(hrefs),
                Err(err) => {
                    tracing::warn!(error = %err, "stored favorites are not a list of strings");
                    FavoriteSet::default()
                }
            },
            Ok(None) => FavoriteSet::default(),
            Err(err) => {
                tracing::warn!(error = %err, "failed to load favorites");
                FavoriteSet::default()
            }
        }
    }

    pub fn set(&self, hrefs: &[String]) -> Result<(), StoreError> {
        self.store.save(FAVORITES_KEY, &Value::from(hrefs.to_vec()))
    }
}

pub struct SettingsRepo {
    store: Arc<dyn StateStore>,
}

impl SettingsRepo {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    /// The saved override, or `None` when the user is on defaults.
    pub fn get(&self, defaults: &ConfigDefaults) -> Option<UserSettings> {
        let value = match self.store.load(SETTINGS_KEY) {
            Ok(Some(value)) if !value.is_null() => value,
            Ok(_) => return None,
            Err(err) => {
                tracing::warn!(error = %err, "failed to load settings");
                return None;
            }
        };

        match serde_json::from_value::<StoredSettings>(value) {
            Ok(stored) => Some(stored.into_settings(defaults)),
            Err(err) => {
                tracing::warn!(error = %err, "stored settings are not an object");
                None
            }
        }
    }

    /// `None` resets to defaults by storing `null`.
    pub fn set(&self, settings: Option<&UserSettings>) -> Result<(), StoreError> {
        let value = match settings {
            Some(settings) => serde_json::to_value(settings).map_err(|source| StoreError::Json {
                path: PathBuf::from(SETTINGS_KEY),
                source,
            })?,
            None => Value::Null,
        };
        self.store.save(SETTINGS_KEY, &value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CardLayout, LinkTarget, SortingOption};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "resource_hub_{tag}_{}_{}",
            std::process::id(),
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("time")
                .as_nanos()
        ))
    }

    #[test]
    fn toggle_twice_restores_the_set() {
        let mut favorites = FavoriteSet::from_hrefs(vec!["a".to_string(), "b".to_string()]);
        let original = favorites.clone();

        assert!(favorites.toggle("c"));
        assert!(favorites.contains("c"));
        assert!(!favorites.toggle("c"));
        assert_eq!(favorites, original);

        assert!(!favorites.toggle("a"));
        assert!(!favorites.contains("a"));
        assert!(favorites.toggle("a"));
        assert!(favorites.contains("a"));
        assert_eq!(favorites.len(), original.len());
    }

    #[test]
    fn set_forces_membership_either_way() {
        let mut favorites = FavoriteSet::from_hrefs(vec!["a".to_string()]);
        favorites.set("a", true);
        assert_eq!(favorites.to_vec(), vec!["a".to_string()]);
        favorites.set("b", true);
        favorites.set("a", false);
        favorites.set("a", false);
        assert_eq!(favorites.to_vec(), vec!["b".to_string()]);
    }

    #[test]
    fn memory_store_keeps_working_after_a_poisoned_lock() {
        let store = MemoryStore::default();
        let values = store.values.clone();
        let _ = std::thread::spawn(move || {
            let _guard = values.lock().expect("lock");
            panic!("poison the lock");
        })
        .join();
        assert!(store.values.is_poisoned());

        store.save(FAVORITES_KEY, &json!(["x"])).expect("save");
        assert_eq!(store.load(FAVORITES_KEY).expect("load"), Some(json!(["x"])));
    }

    #[test]
    fn from_hrefs_drops_duplicates() {
        let favorites =
            FavoriteSet::from_hrefs(vec!["a".to_string(), "b".to_string(), "a".to_string()]);
        assert_eq!(favorites.iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn favorites_repo_round_trips_through_memory_store() {
        let store = MemoryStore::default();
        let repo = FavoritesRepo::new(Arc::new(store.clone()));
        assert!(repo.get().is_empty());

        repo.set(&["https://a".to_string()]).expect("save favorites");
        assert_eq!(store.get(FAVORITES_KEY), Some(json!(["https://a"])));
        assert!(repo.get().contains("https://a"));
    }

    #[test]
    fn corrupt_favorites_read_as_empty() {
        let store = MemoryStore::default();
        store
            .save(FAVORITES_KEY, &json!({ "oops": true }))
            .expect("seed");
        let repo = FavoritesRepo::new(Arc::new(store));
        assert!(repo.get().is_empty());
    }

    #[test]
    fn settings_reset_stores_null() {
        let store = MemoryStore::default();
        let repo = SettingsRepo::new(Arc::new(store.clone()));
        let defaults = ConfigDefaults::default();
        let user = UserSettings {
            grid_columns: 3,
            card_layout: CardLayout::Compact,
            link_target: LinkTarget::NewWindow,
            link_sorting: SortingOption::Alphabetical,
            category_sorting: SortingOption::Defined,
        };

        repo.set(Some(&user)).expect("save settings");
        assert_eq!(repo.get(&defaults), Some(user));

        repo.set(None).expect("reset settings");
        assert_eq!(store.get(SETTINGS_KEY), Some(Value::Null));
        assert_eq!(repo.get(&defaults), None);
    }

    #[test]
    fn settings_with_unknown_values_keep_known_fields() {
        let store = MemoryStore::default();
        store
            .save(
                SETTINGS_KEY,
                &json!({ "gridColumns": 5, "linkTarget": "sideways" }),
            )
            .expect("seed");
        let repo = SettingsRepo::new(Arc::new(store));
        let loaded = repo.get(&ConfigDefaults::default()).expect("override");
        assert_eq!(loaded.grid_columns, 5);
        assert_eq!(loaded.link_target, LinkTarget::NewTab);
    }

    #[test]
    fn file_store_missing_key_is_absent() {
        let store = FileStore::new(temp_dir("missing"));
        assert!(store.load(FAVORITES_KEY).expect("load").is_none());
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = temp_dir("persist");
        FileStore::new(&dir)
            .save(FAVORITES_KEY, &json!(["https://a", "https://b"]))
            .expect("save");

        let reopened = FileStore::new(&dir);
        assert_eq!(
            reopened.load(FAVORITES_KEY).expect("load"),
            Some(json!(["https://a", "https://b"]))
        );
        assert!(!dir.join("favorites.json.tmp").exists());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn file_store_reports_invalid_json() {
        let dir = temp_dir("invalid");
        fs::create_dir_all(&dir).expect("create dir");
        fs::write(dir.join("settings.json"), "{not json").expect("write");
        let err = FileStore::new(&dir)
            .load(SETTINGS_KEY)
            .expect_err("invalid json");
        assert!(matches!(err, StoreError::Json { .. }));
        assert!(err.to_string().contains("settings.json"));
        let _ = fs::remove_dir_all(dir);
    }
}
