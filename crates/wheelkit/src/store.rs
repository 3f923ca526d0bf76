use crate::model::{Entry, Preset};
use directories::ProjectDirs;
use fs_err as fs;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const PRESETS_DIR: &str = "presets";
const AUTOSAVE_FILE: &str = "autosave.json";
const RECORD_EXT: &str = "json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to determine data directory")]
    NoDataDir,
    #[error("'{0}' has no usable characters for a file name")]
    InvalidName(String),
    #[error("No saved configuration named '{0}'")]
    NotFound(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("Malformed record: {0}")]
    Json(#[from] serde_json::Error),
}

/// Keeps alphanumerics, space, hyphen and underscore, then trims.
pub fn storage_key(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .trim()
        .to_string()
}

pub fn default_data_dir() -> Result<PathBuf, StoreError> {
    let dirs =
        ProjectDirs::from("org", "spinwheel", "spinwheel").ok_or(StoreError::NoDataDir)?;
    Ok(dirs.data_dir().to_path_buf())
}

/// One JSON record per preset under `<root>/presets`, plus the autosave
/// record at `<root>/autosave.json`.
#[derive(Debug, Clone)]
pub struct PresetStore {
    root: PathBuf,
}

impl PresetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn open_default() -> Result<Self, StoreError> {
        Ok(Self::new(default_data_dir()?))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn presets_dir(&self) -> PathBuf {
        self.root.join(PRESETS_DIR)
    }

    fn autosave_path(&self) -> PathBuf {
        self.root.join(AUTOSAVE_FILE)
    }

    fn record_path(&self, name: &str) -> Result<PathBuf, StoreError> {
        let key = storage_key(name);
        if key.is_empty() {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        Ok(self.presets_dir().join(format!("{key}.{RECORD_EXT}")))
    }

    pub fn save(&self, name: &str, entries: &[Entry]) -> Result<(), StoreError> {
        let path = self.record_path(name)?;
        let preset = Preset {
            name: name.to_string(),
            entries: entries.to_vec(),
        };
        write_json(&path, &preset)?;
        log::debug!("Saved '{}' to {}", name, path.display());
        Ok(())
    }

    /// A record that is missing or cannot be parsed reads as absent.
    pub fn load(&self, name: &str) -> Option<Preset> {
        let path = self.record_path(name).ok()?;
        if !path.exists() {
            return None;
        }
        match read_json::<Preset>(&path) {
            Ok(preset) => Some(preset),
            Err(e) => {
                log::warn!("Ignoring unreadable preset '{}': {}", name, e);
                None
            }
        }
    }

    /// Display names sorted case-insensitively. A record's own `name` field
    /// wins over its file name.
    pub fn list(&self) -> Vec<String> {
        let Ok(read_dir) = fs::read_dir(self.presets_dir()) else {
            return Vec::new();
        };

        let mut names: Vec<String> = read_dir
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|s| s.to_str()) == Some(RECORD_EXT))
            .filter_map(|path| {
                let stem = path.file_stem()?.to_str()?.to_string();
                Some(
                    read_json::<Preset>(&path)
                        .map(|p| p.name)
                        .unwrap_or(stem),
                )
            })
            .collect();

        names.sort_by_cached_key(|n| n.to_lowercase());
        names
    }

    pub fn delete(&self, name: &str) -> Result<(), StoreError> {
        let path = self.record_path(name)?;
        match fs::remove_file(&path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => Ok(other?),
        }
    }

    /// Moves a record to the key of `new_name` and updates its stored name.
    /// When both names map to the same key the record is rewritten in place.
    pub fn rename(&self, old_name: &str, new_name: &str) -> Result<(), StoreError> {
        let old_path = self.record_path(old_name)?;
        let new_path = self.record_path(new_name)?;

        if !old_path.exists() {
            return Err(StoreError::NotFound(old_name.to_string()));
        }

        let mut preset: Preset = read_json(&old_path)?;
        preset.name = new_name.to_string();

        if old_path != new_path && new_path.exists() {
            log::warn!(
                "Renaming '{}' overwrites existing record {}",
                old_name,
                new_path.display()
            );
        }

        write_json(&new_path, &preset)?;
        if old_path != new_path {
            fs::remove_file(&old_path)?;
        }
        Ok(())
    }

    pub fn load_autosave(&self) -> Vec<Entry> {
        let path = self.autosave_path();
        if !path.exists() {
            return Vec::new();
        }
        read_json(&path).unwrap_or_else(|e| {
            log::warn!("Ignoring unreadable autosave: {}", e);
            Vec::new()
        })
    }

    pub fn save_autosave(&self, entries: &[Entry]) -> Result<(), StoreError> {
        write_json(&self.autosave_path(), &entries)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    buf.push(b'\n');

    fs::write(path, buf)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HexColor;

    fn movie_night() -> Vec<Entry> {
        vec![
            Entry::new("Inception", 2.0).with_color(HexColor::new("#ff6b6b")),
            Entry::new("Alien", 1.0),
            Entry::new("Heat", 0.5),
        ]
    }

    fn store() -> (tempfile::TempDir, PresetStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = PresetStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn test_storage_key() {
        assert_eq!(storage_key("Movie Night"), "Movie Night");
        assert_eq!(storage_key("  a/b\\c:d*?  "), "abcd");
        assert_eq!(storage_key("lunch_spots-2024!"), "lunch_spots-2024");
        assert_eq!(storage_key("../../etc"), "etc");
        assert_eq!(storage_key("???"), "");
    }

    #[test]
    fn test_save_load_rename_round_trip() {
        let (_dir, store) = store();
        let entries = movie_night();

        store.save("Movie Night", &entries).unwrap();
        let loaded = store.load("Movie Night").unwrap();
        assert_eq!(loaded.name, "Movie Night");
        assert_eq!(loaded.entries, entries);

        store.rename("Movie Night", "Movies").unwrap();
        assert!(store.load("Movie Night").is_none());
        let renamed = store.load("Movies").unwrap();
        assert_eq!(renamed.name, "Movies");
        assert_eq!(renamed.entries, entries);
        assert_eq!(store.list(), vec!["Movies".to_string()]);
    }

    #[test]
    fn test_rename_onto_same_key_rewrites_in_place() {
        let (_dir, store) = store();
        store.save("Movies!", &movie_night()).unwrap();

        store.rename("Movies!", "Movies?").unwrap();

        assert_eq!(store.list(), vec!["Movies?".to_string()]);
        assert_eq!(store.load("Movies").unwrap().name, "Movies?");
    }

    #[test]
    fn test_rename_missing_is_not_found() {
        let (_dir, store) = store();
        assert!(matches!(
            store.rename("Nope", "Other"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_resave_overwrites() {
        let (_dir, store) = store();
        store.save("Lunch", &movie_night()).unwrap();
        store.save("Lunch", &[Entry::new("Tacos", 1.0)]).unwrap();

        assert_eq!(store.load("Lunch").unwrap().entries, vec![Entry::new("Tacos", 1.0)]);
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_list_sorted_with_stem_fallback() {
        let (_dir, store) = store();
        store.save("beta", &movie_night()).unwrap();
        store.save("Alpha", &movie_night()).unwrap();
        fs::write(store.presets_dir().join("Broken.json"), "{ not json").unwrap();
        fs::write(store.presets_dir().join("notes.txt"), "ignored").unwrap();

        assert_eq!(store.list(), vec!["Alpha", "beta", "Broken"]);
        assert!(store.load("Broken").is_none());
    }

    #[test]
    fn test_delete() {
        let (_dir, store) = store();
        store.save("Gone", &movie_night()).unwrap();
        store.delete("Gone").unwrap();
        assert!(store.load("Gone").is_none());
        store.delete("Gone").unwrap();
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_invalid_name_rejected() {
        let (_dir, store) = store();
        assert!(matches!(
            store.save("///", &movie_night()),
            Err(StoreError::InvalidName(_))
        ));
        assert!(store.load("///").is_none());
    }

    #[test]
    fn test_autosave_is_separate_from_presets() {
        let (_dir, store) = store();
        assert!(store.load_autosave().is_empty());

        store.save_autosave(&movie_night()).unwrap();
        assert_eq!(store.load_autosave(), movie_night());
        assert!(store.list().is_empty());
        assert!(store.root().join(AUTOSAVE_FILE).is_file());
        assert!(store.presets_dir().starts_with(store.root()));
    }

    #[test]
    fn test_record_format() {
        let (_dir, store) = store();
        store.save("Tiny", &[Entry::new("A", 1.0)]).unwrap();
        let text = fs::read_to_string(store.presets_dir().join("Tiny.json")).unwrap();
        assert_eq!(
            text,
            "{\n    \"name\": \"Tiny\",\n    \"entries\": [\n        {\n            \"label\": \"A\",\n            \"weight\": 1.0\n        }\n    ]\n}\n"
        );
    }

    #[test]
    fn test_reads_records_with_integer_weights() {
        let (_dir, store) = store();
        fs::create_dir_all(store.presets_dir()).unwrap();
        fs::write(
            store.presets_dir().join("Legacy.json"),
            r##"{"name": "Legacy", "entries": [{"label": "x", "weight": 3, "color": "#9B59B6"}]}"##,
        )
        .unwrap();

        let preset = store.load("Legacy").unwrap();
        assert_eq!(preset.entries[0].weight, 3.0);
        assert_eq!(preset.entries[0].color, Some(HexColor::new("#9B59B6")));
    }
}
