//! Object storage collaborators.
//!
//! The handler only needs three operations on `(bucket, name)` addressed objects, captured by
//! [`ObjectStore`]. Two implementations ship with the crate:
//!
//! - [`LocalStore`]: buckets are sub-directories of a root directory
//! - [`MemoryStore`]: a map in memory, handy for tests and dry runs

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

use indexmap::IndexMap;

use crate::error::{ProcessingError, ProcessingResult};

/// Minimal blob storage interface.
pub trait ObjectStore: Send + Sync {
    /// Read a whole object.
    fn read_bytes(&self, bucket: &str, name: &str) -> ProcessingResult<Vec<u8>>;

    /// Create or replace an object.
    fn write_bytes(&self, bucket: &str, name: &str, bytes: &[u8], content_type: &str) -> ProcessingResult<()>;

    /// Delete an object. Deleting a missing object is an error.
    fn delete(&self, bucket: &str, name: &str) -> ProcessingResult<()>;
}

/// Filesystem-backed store: object `name` in `bucket` lives at `<root>/<bucket>/<name>`.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Resolve an object path, refusing names that would escape the bucket directory.
    pub fn object_path(&self, bucket: &str, name: &str) -> ProcessingResult<PathBuf> {
        for part in [bucket, name] {
            let escapes = Path::new(part)
                .components()
                .any(|c| !matches!(c, Component::Normal(_)));
            if part.is_empty() || escapes {
                return Err(ProcessingError::Storage {
                    message: format!("invalid object path component '{part}'"),
                });
            }
        }
        Ok(self.root.join(bucket).join(name))
    }
}

impl ObjectStore for LocalStore {
    fn read_bytes(&self, bucket: &str, name: &str) -> ProcessingResult<Vec<u8>> {
        Ok(fs::read(self.object_path(bucket, name)?)?)
    }

    fn write_bytes(&self, bucket: &str, name: &str, bytes: &[u8], content_type: &str) -> ProcessingResult<()> {
        let path = self.object_path(bucket, name)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytes)?;
        log::info!("Write file {name} to {bucket} ({content_type})");
        Ok(())
    }

    fn delete(&self, bucket: &str, name: &str) -> ProcessingResult<()> {
        fs::remove_file(self.object_path(bucket, name)?)?;
        log::info!("Deleted file {name} from {bucket}");
        Ok(())
    }
}

/// An object held by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// In-memory store keyed by `(bucket, name)`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<IndexMap<(String, String), StoredObject>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object directly (e.g. to simulate an upload).
    pub fn insert(&self, bucket: &str, name: &str, bytes: impl Into<Vec<u8>>, content_type: &str) {
        if let Ok(mut objects) = self.objects.lock() {
            objects.insert(
                (bucket.to_string(), name.to_string()),
                StoredObject {
                    bytes: bytes.into(),
                    content_type: content_type.to_string(),
                },
            );
        }
    }

    pub fn get(&self, bucket: &str, name: &str) -> Option<StoredObject> {
        let objects = self.objects.lock().ok()?;
        objects.get(&(bucket.to_string(), name.to_string())).cloned()
    }

    pub fn contains(&self, bucket: &str, name: &str) -> bool {
        self.get(bucket, name).is_some()
    }

    fn lock(&self) -> ProcessingResult<std::sync::MutexGuard<'_, IndexMap<(String, String), StoredObject>>> {
        self.objects.lock().map_err(|_| ProcessingError::Storage {
            message: "memory store lock poisoned".to_string(),
        })
    }
}

impl ObjectStore for MemoryStore {
    fn read_bytes(&self, bucket: &str, name: &str) -> ProcessingResult<Vec<u8>> {
        self.lock()?
            .get(&(bucket.to_string(), name.to_string()))
            .map(|o| o.bytes.clone())
            .ok_or_else(|| ProcessingError::Storage {
                message: format!("object not found: {bucket}/{name}"),
            })
    }

    fn write_bytes(&self, bucket: &str, name: &str, bytes: &[u8], content_type: &str) -> ProcessingResult<()> {
        self.lock()?.insert(
            (bucket.to_string(), name.to_string()),
            StoredObject {
                bytes: bytes.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    fn delete(&self, bucket: &str, name: &str) -> ProcessingResult<()> {
        self.lock()?
            .shift_remove(&(bucket.to_string(), name.to_string()))
            .map(|_| ())
            .ok_or_else(|| ProcessingError::Storage {
                message: format!("object not found: {bucket}/{name}"),
            })
    }
}
