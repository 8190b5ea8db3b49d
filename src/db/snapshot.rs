use std::fs;
use std::path::{Path, PathBuf};

use crate::{
    error::{AppError, AppResult},
    models::Movie,
};

/// Single-slot snapshot storage for the catalog.
///
/// The whole catalog is serialized as one JSON array and rewritten on every
/// mutation. Saves go through a temp file followed by a rename, so a reader
/// observes either the previous snapshot or the new one, never a partial
/// write.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the previously written snapshot.
    ///
    /// Returns `None` when no snapshot exists or when the file on disk is
    /// unreadable or malformed. A bad snapshot triggers a fresh bootstrap
    /// upstream rather than taking the service down.
    pub fn load(&self) -> Option<Vec<Movie>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to read catalog snapshot, treating as absent"
                );
                return None;
            }
        };

        match serde_json::from_slice::<Vec<Movie>>(&bytes) {
            Ok(catalog) => Some(catalog),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Malformed catalog snapshot, treating as absent"
                );
                None
            }
        }
    }

    /// Serialize and overwrite the snapshot.
    pub fn save(&self, catalog: &[Movie]) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| AppError::Storage(format!("create {}: {}", parent.display(), e)))?;
            }
        }

        let json = serde_json::to_vec_pretty(catalog)
            .map_err(|e| AppError::Storage(format!("serialize catalog: {}", e)))?;

        // Write-then-rename keeps the previous snapshot intact until the new
        // one is fully on disk.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &json)
            .map_err(|e| AppError::Storage(format!("write {}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| AppError::Storage(format!("rename {}: {}", self.path.display(), e)))?;

        tracing::debug!(
            path = %self.path.display(),
            movies = catalog.len(),
            "Catalog snapshot written"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::seed_catalog;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_snapshot_returns_none() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("movies.json"));
        assert!(store.load().is_none());
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("movies.json"));

        let catalog = seed_catalog();
        store.save(&catalog).unwrap();

        let restored = store.load().unwrap();
        assert_eq!(restored, catalog);
    }

    #[test]
    fn test_load_malformed_snapshot_returns_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("movies.json");
        fs::write(&path, b"{ not valid json").unwrap();

        let store = SnapshotStore::new(&path);
        assert!(store.load().is_none());
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("nested/data/movies.json"));

        store.save(&seed_catalog()).unwrap();
        assert!(store.load().is_some());
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("movies.json"));
        store.save(&seed_catalog()).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("movies.json")]);
    }

    #[test]
    fn test_save_overwrites_previous_snapshot() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("movies.json"));

        let mut catalog = seed_catalog();
        store.save(&catalog).unwrap();

        catalog.truncate(2);
        store.save(&catalog).unwrap();

        assert_eq!(store.load().unwrap().len(), 2);
    }
}
