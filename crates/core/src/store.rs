use crate::index::VectorIndex;
use crate::traits::IndexStorage;
use crate::IndexError;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

const INDEX_FILE: &str = "index.json";

#[derive(Debug, Clone)]
pub struct DirectoryStorage {
    directory: PathBuf,
}

impl DirectoryStorage {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn index_path(&self) -> PathBuf {
        self.directory.join(INDEX_FILE)
    }
}

impl IndexStorage for DirectoryStorage {
    fn save(&self, index: &VectorIndex) -> Result<(), IndexError> {
        fs::create_dir_all(&self.directory)?;

        let target = self.index_path();
        let staging = self.directory.join(format!("{INDEX_FILE}.tmp"));
        let payload = serde_json::to_vec(index)?;
        fs::write(&staging, payload)?;
        fs::rename(&staging, &target)?;

        debug!(path = %target.display(), entries = index.len(), "persisted vector index");
        Ok(())
    }

    fn load(&self) -> Result<Option<VectorIndex>, IndexError> {
        let bytes = match fs::read(self.index_path()) {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(error.into()),
        };

        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::chunk;
    use tempfile::tempdir;

    #[test]
    fn missing_index_loads_as_none() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let storage = DirectoryStorage::new(dir.path().join("never-built"));
        assert!(storage.load()?.is_none());
        Ok(())
    }

    #[test]
    fn saved_index_round_trips() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let storage = DirectoryStorage::new(dir.path().join("index"));
        let index = VectorIndex::from_embeddings(
            "test-model",
            2,
            &[chunk("a.pdf", 0, "pump")],
            vec![vec![0.5, 0.5]],
        )?;

        storage.save(&index)?;
        let loaded = storage.load()?.expect("index was saved");

        assert_eq!(loaded.embedding_model(), "test-model");
        assert_eq!(loaded.dimensions(), 2);
        assert_eq!(loaded.list_all(), index.list_all());
        assert!(!storage.directory().join("index.json.tmp").exists());
        Ok(())
    }

    #[test]
    fn corrupt_index_file_is_an_error() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let storage = DirectoryStorage::new(dir.path());
        fs::write(storage.index_path(), b"{not json")?;

        assert!(matches!(storage.load(), Err(IndexError::Serialization(_))));
        Ok(())
    }
}
