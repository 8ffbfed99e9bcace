use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use engine::scene::Pose;
use serde::{Deserialize, Serialize};

use crate::TeleportError;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    positions: BTreeMap<String, Pose>,
}

/// Named rig poses kept in a JSON file, so a session can resume where the
/// viewer last stood.
#[derive(Debug, Clone)]
pub struct PositionStore {
    path: PathBuf,
}

impl PositionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self, key: &str) -> Result<Option<Pose>, TeleportError> {
        Ok(self.read()?.positions.get(key).copied())
    }

    pub fn save(&self, key: &str, pose: Pose) -> Result<(), TeleportError> {
        let mut file = self.read()?;
        file.positions.insert(key.to_string(), pose);
        let json = serde_json::to_string_pretty(&file)?;
        std::fs::write(&self.path, json).map_err(|source| TeleportError::Io {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(key, path = %self.path.display(), "saved rig position");
        Ok(())
    }

    pub fn keys(&self) -> Result<Vec<String>, TeleportError> {
        Ok(self.read()?.positions.into_keys().collect())
    }

    /// A missing file is an empty store.
    fn read(&self) -> Result<StoreFile, TeleportError> {
        match std::fs::read_to_string(&self.path) {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(StoreFile::default()),
            Err(source) => Err(TeleportError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, Quaternion, Rotation3, Vector3};

    fn scratch_path(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "cursor_teleport_{}_{}.json",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        path
    }

    #[test]
    fn test_missing_file_is_empty() {
        let store = PositionStore::new(scratch_path("missing"));
        assert_eq!(store.load("lobby").unwrap(), None);
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load_keeps_other_keys() {
        let path = scratch_path("save");
        let store = PositionStore::new(&path);
        let lobby = Pose::new(Vector3::new(1.0, 0.0, -2.0), Quaternion::from_angle_y(Deg(45.0)));
        let roof = Pose::at(Vector3::new(0.0, 12.0, 0.0));

        store.save("lobby", lobby).unwrap();
        store.save("roof", roof).unwrap();

        assert_eq!(store.load("lobby").unwrap(), Some(lobby));
        assert_eq!(store.load("roof").unwrap(), Some(roof));
        assert_eq!(store.keys().unwrap(), vec!["lobby".to_string(), "roof".to_string()]);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let path = scratch_path("corrupt");
        std::fs::write(&path, "not json").unwrap();

        let store = PositionStore::new(&path);
        assert!(matches!(store.load("lobby"), Err(TeleportError::Store(_))));
        let _ = std::fs::remove_file(path);
    }
}
