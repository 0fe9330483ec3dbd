//! Named model storage.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};

use super::error::ModelIoError;
use super::format::{ReferenceModel, read_model, write_model};

/// File extension for stored models
pub const MODEL_EXTENSION: &str = "prati";

/// Save and load reference models by name.
pub trait ModelStore {
    /// Store `model` under `name`, replacing any previous model
    fn save(&mut self, name: &str, model: &ReferenceModel) -> Result<(), ModelIoError>;

    /// Load the model stored under `name`
    fn load(&mut self, name: &str) -> Result<ReferenceModel, ModelIoError>;
}

/// Stores each model as `<root>/<name>.prati`.
#[derive(Clone, Debug)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Create a store rooted at `root`. The directory is created on first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path for a model name
    pub fn path_for(&self, name: &str) -> Result<PathBuf, ModelIoError> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !name.starts_with('.');
        if !valid {
            return Err(ModelIoError::InvalidFormat(format!(
                "Invalid model name '{}'",
                name
            )));
        }
        Ok(self.root.join(format!("{}.{}", name, MODEL_EXTENSION)))
    }
}

impl ModelStore for DirectoryStore {
    fn save(&mut self, name: &str, model: &ReferenceModel) -> Result<(), ModelIoError> {
        let path = self.path_for(name)?;
        std::fs::create_dir_all(&self.root)?;
        let mut writer = BufWriter::new(File::create(&path)?);
        write_model(model, &mut writer)?;
        writer.flush()?;
        info!("[ModelStore] Saved {}", path.display());
        Ok(())
    }

    fn load(&mut self, name: &str) -> Result<ReferenceModel, ModelIoError> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Err(ModelIoError::NotFound(name.to_string()));
        }
        let mut reader = BufReader::new(File::open(&path)?);
        let model = read_model(&mut reader)?;
        debug!(
            "[ModelStore] Loaded {} ({} points)",
            path.display(),
            model.reference.points.len()
        );
        Ok(model)
    }
}

/// Keeps encoded models in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    models: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored models
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// True if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl ModelStore for MemoryStore {
    fn save(&mut self, name: &str, model: &ReferenceModel) -> Result<(), ModelIoError> {
        let mut bytes = Vec::new();
        write_model(model, &mut bytes)?;
        self.models.insert(name.to_string(), bytes);
        Ok(())
    }

    fn load(&mut self, name: &str) -> Result<ReferenceModel, ModelIoError> {
        let bytes = self
            .models
            .get(name)
            .ok_or_else(|| ModelIoError::NotFound(name.to_string()))?;
        read_model(&mut bytes.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BoundingVolume, Point3};
    use crate::detection::ReferenceId;
    use crate::session::ReferenceObject;

    fn model() -> ReferenceModel {
        ReferenceModel {
            reference: ReferenceObject {
                id: ReferenceId(3),
                points: vec![Point3::ZERO],
                volume: BoundingVolume::new(Point3::ZERO, Point3::splat(1.0)).unwrap(),
                origin: Point3::ZERO,
            },
            grid: None,
            annotations: Vec::new(),
        }
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert!(matches!(store.load("mug"), Err(ModelIoError::NotFound(_))));
        store.save("mug", &model()).unwrap();
        assert_eq!(store.load("mug").unwrap(), model());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_directory_store_names() {
        let store = DirectoryStore::new("/tmp/models");
        assert_eq!(
            store.path_for("mug-1").unwrap(),
            PathBuf::from("/tmp/models/mug-1.prati")
        );
        assert!(store.path_for("../escape").is_err());
        assert!(store.path_for("").is_err());
        assert!(store.path_for("a/b").is_err());
    }
}
