// ── Atomic directory persistence ──
//
// The directory is serialized to a tempfile in the target directory
// and renamed over the live file, so a reader never observes a
// partially written directory. File mode is 0o640: owner plus the
// exchange's service group.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::Directory;
use crate::error::StoreError;
use crate::model::Apartment;

#[cfg(unix)]
const DIRECTORY_FILE_MODE: u32 = 0o640;

/// On-disk schema: a single top-level object wrapping the records.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedDirectory {
    #[serde(default)]
    apartments: Vec<Apartment>,
}

/// A [`Directory`] bound to its persistence path.
#[derive(Debug)]
pub struct DirectoryStore {
    path: PathBuf,
    directory: Directory,
}

impl DirectoryStore {
    /// Load the directory from `path`. A missing file yields an empty
    /// directory -- first save creates it.
    pub fn open(
        path: impl Into<PathBuf>,
        reserved: impl IntoIterator<Item = String>,
    ) -> Result<Self, StoreError> {
        let path = path.into();
        let directory = match fs::read_to_string(&path) {
            Ok(raw) => {
                let persisted: PersistedDirectory = serde_json::from_str(&raw)?;
                debug!(path = %path.display(), apartments = persisted.apartments.len(), "directory loaded");
                Directory::from_records(persisted.apartments, reserved)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no directory file yet, starting empty");
                Directory::new(reserved)
            }
            Err(err) => return Err(err.into()),
        };
        Ok(Self { path, directory })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn directory_mut(&mut self) -> &mut Directory {
        &mut self.directory
    }

    /// Persist the current state atomically (write-temp-then-rename).
    pub fn save(&self) -> Result<(), StoreError> {
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;

        let persisted = PersistedDirectory {
            apartments: self.directory.apartments().to_vec(),
        };

        let mut staged = NamedTempFile::new_in(parent)?;
        serde_json::to_writer_pretty(&mut staged, &persisted)?;
        staged.write_all(b"\n")?;
        staged.as_file().sync_all()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            staged
                .as_file()
                .set_permissions(fs::Permissions::from_mode(DIRECTORY_FILE_MODE))?;
        }

        staged.persist(&self.path).map_err(|err| err.error)?;
        info!(path = %self.path.display(), "directory saved");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{ApartmentDraft, ResidentDraft, RingStrategy};

    fn sample_store(path: &Path) -> DirectoryStore {
        let mut store = DirectoryStore::open(path, []).unwrap();
        let ap = store
            .directory_mut()
            .create_apartment(ApartmentDraft {
                label: "Block A 101".into(),
                extension: "101".into(),
                strategy: RingStrategy::Sequential,
                ring_seconds: 20,
            })
            .unwrap();
        store
            .directory_mut()
            .add_resident(
                ap,
                ResidentDraft {
                    name: "Alice".into(),
                    sip_identity: Some("1011".into()),
                    secret: Some("hunter2hunter2".into()),
                    priority: 10,
                },
            )
            .unwrap();
        store
    }

    #[test]
    fn save_then_open_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("directory.json");

        let store = sample_store(&path);
        store.save().unwrap();

        let reopened = DirectoryStore::open(&path, []).unwrap();
        let apartments = reopened.directory().apartments();
        assert_eq!(apartments.len(), 1);
        assert_eq!(apartments[0].extension.as_str(), "101");
        assert_eq!(apartments[0].residents[0].sip_identity, "1011");
        assert_eq!(apartments[0].residents[0].secret, "hunter2hunter2");
    }

    #[test]
    fn open_missing_file_yields_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::open(dir.path().join("missing.json"), []).unwrap();
        assert!(store.directory().apartments().is_empty());
    }

    #[test]
    fn open_rejects_corrupt_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("directory.json");
        fs::write(&path, "{not json").unwrap();
        let err = DirectoryStore::open(&path, []).unwrap_err();
        assert!(matches!(err, StoreError::Codec(_)));
    }

    #[test]
    fn save_replaces_previous_content_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("directory.json");
        fs::write(&path, "stale").unwrap();

        let store = sample_store(&path);
        store.save().unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"1011\""));
        assert!(!raw.contains("stale"));
        // No stray tempfile left behind.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_group_readable_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("directory.json");
        sample_store(&path).save().unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, DIRECTORY_FILE_MODE);
    }
}
