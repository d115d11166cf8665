//! In-memory model catalog rebuilt from a directory of JSON files
//!
//! `reload` clears the map and repopulates it file by file. A reader racing a
//! reload may see an empty or partial catalog; callers accept that.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::model::{ModelDefinition, ModelSummary};

/// Per-file load failure. Logged and skipped by `reload`.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// File could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// File is not a valid model definition
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// File being parsed
        path: PathBuf,
        /// Underlying JSON error
        source: serde_json::Error,
    },

    /// Definition has no `id`
    #[error("model definition {path} is missing 'id'")]
    MissingId {
        /// File with the id-less definition
        path: PathBuf,
    },
}

/// Catalog of model definitions indexed by id
pub struct ModelCatalog {
    models_dir: PathBuf,
    models: DashMap<String, Arc<ModelDefinition>>,
}

impl ModelCatalog {
    /// Create an empty catalog reading from `root/models_subdir`
    pub fn new(root: impl AsRef<Path>, models_subdir: impl AsRef<Path>) -> Self {
        Self::from_dir(root.as_ref().join(models_subdir))
    }

    /// Create an empty catalog reading from `models_dir`
    pub fn from_dir(models_dir: impl Into<PathBuf>) -> Self {
        Self {
            models_dir: models_dir.into(),
            models: DashMap::new(),
        }
    }

    /// Directory scanned on reload
    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    /// Clear the catalog and load every `*.json` file in the models directory.
    ///
    /// Unreadable, malformed and id-less files are logged and skipped. A
    /// missing directory leaves the catalog empty.
    pub fn reload(&self) {
        self.models.clear();

        let files = match self.definition_files() {
            Ok(files) => files,
            Err(e) => {
                warn!(
                    dir = %self.models_dir.display(),
                    error = %e,
                    "Models directory not readable, catalog is empty"
                );
                return;
            }
        };

        debug!(dir = %self.models_dir.display(), files = files.len(), "Loading model definitions");

        for path in files {
            match load_definition(&path) {
                Ok(definition) => {
                    let id = definition.id.clone();
                    if self.models.insert(id.clone(), Arc::new(definition)).is_some() {
                        warn!(model = %id, path = %path.display(), "Duplicate model id, later file wins");
                    }
                    debug!(model = %id, "Loaded model definition");
                }
                Err(e @ CatalogError::MissingId { .. }) => {
                    warn!(error = %e, "Skipping model definition");
                }
                Err(e) => {
                    error!(error = %e, "Failed to load model definition");
                }
            }
        }

        info!(count = self.models.len(), "Model catalog loaded");
    }

    /// Look up a definition by id
    pub fn get(&self, id: &str) -> Option<Arc<ModelDefinition>> {
        self.models.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Summaries of all models, in no particular order
    pub fn list(&self) -> Vec<ModelSummary> {
        self.models.iter().map(|entry| entry.value().summary()).collect()
    }

    /// Number of loaded models
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether no models are loaded
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Sorted `*.json` paths so duplicate ids resolve the same way every reload
    fn definition_files(&self) -> std::io::Result<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(&self.models_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();
        Ok(files)
    }
}

fn load_definition(path: &Path) -> Result<ModelDefinition, CatalogError> {
    let data = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let definition: ModelDefinition =
        serde_json::from_str(&data).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    if definition.id.is_empty() {
        return Err(CatalogError::MissingId {
            path: path.to_path_buf(),
        });
    }

    Ok(definition)
}
