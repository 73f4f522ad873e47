// Reference Profile Storage
// Keyed by label; the detection engine only ever sees the loaded values

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::models::{FeatureVector, ProfileLabel, ReferenceProfile};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Profile store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize profiles: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Profile store lock poisoned")]
    Poisoned,
}

/// Storage capability for calibration profiles.
pub trait ProfileStore: Send + Sync {
    /// Store (or overwrite) the profile for `label`.
    fn save(
        &self,
        label: ProfileLabel,
        features: FeatureVector,
        created_at: DateTime<Utc>,
    ) -> Result<ReferenceProfile, StoreError>;

    /// Load the profile for `label`. Missing or unreadable data is `None`.
    fn load(&self, label: ProfileLabel) -> Option<ReferenceProfile>;

    /// Remove every stored profile.
    fn clear(&self) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<ProfileLabel, ReferenceProfile>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn save(
        &self,
        label: ProfileLabel,
        features: FeatureVector,
        created_at: DateTime<Utc>,
    ) -> Result<ReferenceProfile, StoreError> {
        let profile = ReferenceProfile {
            label,
            features,
            created_at,
        };
        self.profiles
            .write()
            .map_err(|_| StoreError::Poisoned)?
            .insert(label, profile.clone());
        Ok(profile)
    }

    fn load(&self, label: ProfileLabel) -> Option<ReferenceProfile> {
        self.profiles.read().ok()?.get(&label).cloned()
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.profiles.write().map_err(|_| StoreError::Poisoned)?.clear();
        Ok(())
    }
}

/// Profiles kept as one JSON object per label in a single file.
///
/// The file is re-read on every call. Writes go to a sibling temp file that is
/// then renamed over the target, so readers never see a half-written file.
/// Concurrent writers are not coordinated; the last rename wins.
/// Entries that fail to parse are treated as absent.
pub struct FileProfileStore {
    path: PathBuf,
}

impl FileProfileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "profiles.json".to_string());
        self.path
            .with_file_name(format!(".{}.{}.tmp", name, uuid::Uuid::new_v4()))
    }

    fn read_entries(&self) -> HashMap<String, serde_json::Value> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(_) => return HashMap::new(),
        };
        match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    "[PROFILE_STORE] Ignoring unreadable profile file {}: {}",
                    self.path.display(),
                    e
                );
                HashMap::new()
            }
        }
    }

    fn write_entries(&self, entries: &HashMap<String, serde_json::Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(entries)?;
        let tmp = self.temp_path();
        if let Err(e) = fs::write(&tmp, content).and_then(|_| fs::rename(&tmp, &self.path)) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

impl ProfileStore for FileProfileStore {
    fn save(
        &self,
        label: ProfileLabel,
        features: FeatureVector,
        created_at: DateTime<Utc>,
    ) -> Result<ReferenceProfile, StoreError> {
        let profile = ReferenceProfile {
            label,
            features,
            created_at,
        };
        let mut entries = self.read_entries();
        entries.insert(label.as_str().to_string(), serde_json::to_value(&profile)?);
        self.write_entries(&entries)?;
        info!("[PROFILE_STORE] Saved {} profile to {}", label, self.path.display());
        Ok(profile)
    }

    fn load(&self, label: ProfileLabel) -> Option<ReferenceProfile> {
        let value = self.read_entries().remove(label.as_str())?;
        match serde_json::from_value::<ReferenceProfile>(value) {
            Ok(profile) if profile.label == label => Some(profile),
            Ok(profile) => {
                warn!(
                    "[PROFILE_STORE] Entry {} holds a {} profile; treating as absent",
                    label, profile.label
                );
                None
            }
            Err(e) => {
                warn!("[PROFILE_STORE] Malformed {} profile treated as absent: {}", label, e);
                None
            }
        }
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("[PROFILE_STORE] Cleared profiles at {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(v: f64) -> FeatureVector {
        FeatureVector {
            avg_repetition: v,
            avg_vocab_diversity: 1.0 - v,
            generic_rate: v,
            transition_rate: v,
            uniformity: v,
        }
    }

    fn temp_file() -> (PathBuf, PathBuf) {
        let dir = std::env::temp_dir().join(format!("signalcheck-test-{}", uuid::Uuid::new_v4()));
        let file = dir.join("profiles.json");
        (dir, file)
    }

    #[test]
    fn test_memory_store_roundtrip_and_clear() {
        let store = InMemoryProfileStore::new();
        assert!(store.load(ProfileLabel::Human).is_none());
        store.save(ProfileLabel::Human, features(0.2), Utc::now()).unwrap();
        store.save(ProfileLabel::Human, features(0.3), Utc::now()).unwrap();
        let loaded = store.load(ProfileLabel::Human).unwrap();
        assert_eq!(loaded.features, features(0.3));
        assert!(store.load(ProfileLabel::Ai).is_none());
        store.clear().unwrap();
        assert!(store.load(ProfileLabel::Human).is_none());
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let (dir, file) = temp_file();
        let created = Utc::now();
        FileProfileStore::new(file.clone())
            .save(ProfileLabel::Ai, features(0.7), created)
            .unwrap();

        let reopened = FileProfileStore::new(file.clone());
        let loaded = reopened.load(ProfileLabel::Ai).unwrap();
        assert_eq!(loaded.label, ProfileLabel::Ai);
        assert_eq!(loaded.features, features(0.7));
        assert_eq!(loaded.created_at, created);
        assert!(reopened.load(ProfileLabel::Human).is_none());

        reopened.clear().unwrap();
        assert!(reopened.load(ProfileLabel::Ai).is_none());
        reopened.clear().unwrap();
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_file_store_malformed_is_absent() {
        let (dir, file) = temp_file();
        fs::create_dir_all(&dir).unwrap();
        fs::write(&file, "{ not json").unwrap();
        let store = FileProfileStore::new(file.clone());
        assert!(store.load(ProfileLabel::Human).is_none());

        fs::write(&file, r#"{"human": {"label": "human", "features": 3}}"#).unwrap();
        assert!(store.load(ProfileLabel::Human).is_none());

        // Saving over a malformed file replaces it.
        store.save(ProfileLabel::Human, features(0.1), Utc::now()).unwrap();
        assert!(store.load(ProfileLabel::Human).is_some());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_file_store_write_leaves_no_temp_files() {
        let (dir, file) = temp_file();
        let store = FileProfileStore::new(file.clone());
        store.save(ProfileLabel::Human, features(0.2), Utc::now()).unwrap();
        store.save(ProfileLabel::Ai, features(0.8), Utc::now()).unwrap();

        let names: Vec<String> = fs::read_dir(&dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["profiles.json".to_string()]);
        assert!(store.load(ProfileLabel::Human).is_some());
        assert!(store.load(ProfileLabel::Ai).is_some());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_file_store_label_mismatch_is_absent() {
        let (dir, file) = temp_file();
        let store = FileProfileStore::new(file.clone());
        store.save(ProfileLabel::Ai, features(0.9), Utc::now()).unwrap();

        // Move the ai entry under the human key.
        let mut entries: HashMap<String, serde_json::Value> =
            serde_json::from_str(&fs::read_to_string(&file).unwrap()).unwrap();
        let ai = entries.remove("ai").unwrap();
        entries.insert("human".to_string(), ai);
        fs::write(&file, serde_json::to_string(&entries).unwrap()).unwrap();

        assert!(store.load(ProfileLabel::Human).is_none());
        assert!(store.load(ProfileLabel::Ai).is_none());
        let _ = fs::remove_dir_all(dir);
    }
}
