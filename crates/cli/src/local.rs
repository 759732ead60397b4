//! Filesystem-backed collaborators for running the resolver outside a repository.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use schedkit_trigger::{CollaboratorError, FileService, Owner, Permission, SettingsStore};

const LOCAL_FILES: &str = "local file service";

/// Maps repository paths (`/home/suzy`) onto directories under `root`.
///
/// The local tree has no per-user ACLs: access reflects the process's view
/// of the directory's permission bits, whoever the owner is.
pub struct LocalFileService {
    root: PathBuf,
}

impl LocalFileService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `None` for paths that would escape the root.
    fn local_path(&self, path: &str) -> Option<PathBuf> {
        if path.split('/').any(|part| part == "..") {
            return None;
        }
        Some(self.root.join(path.trim_start_matches('/')))
    }

    fn metadata(&self, path: &str) -> Result<Option<fs::Metadata>, CollaboratorError> {
        let Some(local) = self.local_path(path) else {
            debug!(path, "rejecting path outside the root");
            return Ok(None);
        };
        match fs::metadata(&local) {
            Ok(meta) if meta.is_dir() => Ok(Some(meta)),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CollaboratorError::new(
                LOCAL_FILES,
                format!("{}: {e}", local.display()),
            )),
        }
    }
}

impl FileService for LocalFileService {
    fn exists(&self, _owner: &Owner, path: &str) -> Result<bool, CollaboratorError> {
        Ok(self.metadata(path)?.is_some())
    }

    fn has_access(
        &self,
        _owner: &Owner,
        path: &str,
        permissions: &[Permission],
    ) -> Result<bool, CollaboratorError> {
        let Some(meta) = self.metadata(path)? else {
            return Ok(false);
        };
        let writable = !meta.permissions().readonly();
        Ok(permissions.iter().all(|p| match p {
            Permission::Read => true,
            Permission::Write => writable,
        }))
    }
}

/// Settings read from a JSON file:
///
/// ```json
/// { "system": { "key": "/public" }, "users": { "suzy": { "key": "/home/suzy/out" } } }
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct JsonSettingsStore {
    #[serde(default)]
    system: HashMap<String, String>,
    #[serde(default)]
    users: HashMap<String, HashMap<String, String>>,
}

impl JsonSettingsStore {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse settings file {}", path.display()))
    }
}

impl SettingsStore for JsonSettingsStore {
    fn user_setting(&self, key: &str, owner: &Owner) -> Result<Option<String>, CollaboratorError> {
        Ok(self
            .users
            .get(owner.as_str())
            .and_then(|settings| settings.get(key))
            .cloned())
    }

    fn system_setting(&self, key: &str) -> Result<Option<String>, CollaboratorError> {
        Ok(self.system.get(key).cloned())
    }
}
