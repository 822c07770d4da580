// src/core/active_env.rs

use crate::constants::{ACTIVE_ENVIRONMENT_KEY, PROJECT_DATA_FILENAME, PROJECT_DIR};
use crate::core::paths::PathResolver;
use crate::models::{Environment, Listing};
use log::{debug, warn};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// The free-form key/value object a host keeps per project.
pub type ProjectFields = serde_json::Map<String, Value>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Could not access project data at '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Project data at '{path}' is not valid JSON: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Project data at '{path}' must be a JSON object.")]
    NotAnObject { path: String },
    #[error("Failed to serialize project data: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to replace project data file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Per-project data owned by the host. Implementations hand back the whole
/// object and accept the whole object; this crate only ever touches one key.
pub trait ProjectData {
    /// `None` when the project has no data at all.
    fn get(&self) -> Result<Option<ProjectFields>, StoreError>;
    fn set(&self, fields: ProjectFields) -> Result<(), StoreError>;
}

/// Project data held in memory, for hosts that persist it themselves.
#[derive(Debug, Default)]
pub struct MemoryProject {
    fields: RefCell<Option<ProjectFields>>,
    writes: Cell<usize>,
}

impl MemoryProject {
    pub fn new(fields: Option<ProjectFields>) -> Self {
        Self {
            fields: RefCell::new(fields),
            writes: Cell::new(0),
        }
    }

    /// Number of times `set` has been called.
    pub fn writes(&self) -> usize {
        self.writes.get()
    }
}

impl ProjectData for MemoryProject {
    fn get(&self) -> Result<Option<ProjectFields>, StoreError> {
        Ok(self.fields.borrow().clone())
    }

    fn set(&self, fields: ProjectFields) -> Result<(), StoreError> {
        *self.fields.borrow_mut() = Some(fields);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

/// Project data stored as a JSON object in `<project>/.condax/project.json`.
#[derive(Debug, Clone)]
pub struct JsonProjectFile {
    path: PathBuf,
}

impl JsonProjectFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn for_project(project_root: &Path) -> Self {
        Self::new(project_root.join(PROJECT_DIR).join(PROJECT_DATA_FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl ProjectData for JsonProjectFile {
    fn get(&self) -> Result<Option<ProjectFields>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        let value: Value = serde_json::from_str(&content).map_err(|e| StoreError::Malformed {
            path: self.path.display().to_string(),
            source: e,
        })?;
        match value {
            Value::Object(fields) => Ok(Some(fields)),
            _ => Err(StoreError::NotAnObject {
                path: self.path.display().to_string(),
            }),
        }
    }

    fn set(&self, fields: ProjectFields) -> Result<(), StoreError> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;

        let json = serde_json::to_string_pretty(&Value::Object(fields))?;
        // Write beside the target and rename over it, so readers never see half a file.
        let mut temp = NamedTempFile::new_in(dir).map_err(|e| self.io_error(e))?;
        temp.write_all(json.as_bytes())
            .and_then(|()| temp.write_all(b"\n"))
            .map_err(|e| self.io_error(e))?;
        temp.persist(&self.path)?;
        debug!("Project data written to '{}'.", self.path.display());
        Ok(())
    }
}

/// Reads and writes the active environment of a project.
#[derive(Debug, Clone)]
pub struct ActiveEnvironmentStore {
    resolver: PathResolver,
}

impl ActiveEnvironmentStore {
    pub fn new(resolver: PathResolver) -> Self {
        Self { resolver }
    }

    /// The project's active environment, if one is set and still exists.
    ///
    /// Unreadable data, a missing key, or a path that no longer resolves all
    /// come back as `None`.
    pub fn get(&self, project: &dyn ProjectData) -> Option<Environment> {
        let fields = match project.get() {
            Ok(Some(fields)) => fields,
            Ok(None) => {
                debug!("Project has no data; no active environment.");
                return None;
            }
            Err(e) => {
                warn!("Ignoring unreadable project data: {}", e);
                return None;
            }
        };

        let raw = match fields.get(ACTIVE_ENVIRONMENT_KEY) {
            None => return None,
            Some(Value::String(raw)) => raw,
            Some(other) => {
                warn!(
                    "Ignoring '{}' in project data: expected a path, found {}.",
                    ACTIVE_ENVIRONMENT_KEY, other
                );
                return None;
            }
        };

        let path = PathBuf::from(raw);
        if !self.resolver.recognizes(&path) {
            debug!("Stored environment '{}' no longer exists.", path.display());
            return None;
        }

        Some(Environment::new(self.resolver.name_for_path(&path), path))
    }

    /// Marks `environment` active. Setting the current value again writes nothing.
    pub fn set(&self, project: &dyn ProjectData, environment: &Environment) -> Result<(), StoreError> {
        let mut fields = project.get()?.unwrap_or_default();
        let value = Value::String(environment.path.to_string_lossy().into_owned());

        if fields.get(ACTIVE_ENVIRONMENT_KEY) == Some(&value) {
            debug!("Environment '{}' is already active.", environment.name);
            return Ok(());
        }

        fields.insert(ACTIVE_ENVIRONMENT_KEY.to_string(), value);
        project.set(fields)
    }

    /// Removes the active environment. Returns whether anything was removed.
    pub fn clear(&self, project: &dyn ProjectData) -> Result<bool, StoreError> {
        let Some(mut fields) = project.get()? else {
            return Ok(false);
        };
        if fields.remove(ACTIVE_ENVIRONMENT_KEY).is_none() {
            return Ok(false);
        }
        project.set(fields)?;
        Ok(true)
    }

    /// The active environment as a displayable listing.
    pub fn status(&self, project: &dyn ProjectData) -> Listing<Environment> {
        match self.get(project) {
            Some(environment) => Listing::Items(vec![environment]),
            None => Listing::Unavailable("no active environment".to_string()),
        }
    }
}
