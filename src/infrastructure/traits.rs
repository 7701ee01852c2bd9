//! Backend boundary traits
//!
//! A backend reads and writes raw trees for one file format. Format parsing
//! lives behind this trait; the crate only prepares and recovers the trees.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::domain::{ArrayData, ElementKind, FeatureProfile, Number, Scalar, Tree};

/// Error type produced by backends; returned to callers unmodified.
pub type BackendError = Box<dyn std::error::Error + Send + Sync>;

/// Reader/writer for one file format.
pub trait Backend: Send + Sync {
    /// Backend identifier, matching a feature profile key.
    fn id(&self) -> &str;

    /// Read the raw tree stored at `path`.
    fn read(&self, path: &Path) -> Result<Tree, BackendError>;

    /// Write `tree` to `path`.
    fn write(&self, path: &Path, tree: &Tree) -> Result<(), BackendError>;
}

// ============================================================
// IN-MEMORY IMPLEMENTATION
// ============================================================

/// In-memory backend keyed by path.
///
/// With a profile attached, writes are rejected when the raw tree holds a
/// value kind the profile says the format cannot store.
#[derive(Debug)]
pub struct MemoryBackend {
    id: String,
    profile: Option<FeatureProfile>,
    store: Mutex<HashMap<PathBuf, Tree>>,
}

impl MemoryBackend {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            profile: None,
            store: Mutex::new(HashMap::new()),
        }
    }

    /// Backend that enforces `profile` on every write.
    pub fn with_profile(id: impl Into<String>, profile: FeatureProfile) -> Self {
        Self {
            profile: Some(profile),
            ..Self::new(id)
        }
    }

    /// Raw tree currently stored at `path`.
    pub fn raw(&self, path: &Path) -> Result<Option<Tree>, BackendError> {
        let store = self.store.lock().map_err(|e| e.to_string())?;
        Ok(store.get(path).cloned())
    }

    /// Store a raw tree directly, bypassing capability checks.
    pub fn put_raw(&self, path: impl Into<PathBuf>, tree: Tree) -> Result<(), BackendError> {
        self.store
            .lock()
            .map_err(|e| e.to_string())?
            .insert(path.into(), tree);
        Ok(())
    }
}

/// First value kind in `tree` that `profile` cannot represent.
pub fn unsupported_kind(tree: &Tree, profile: FeatureProfile) -> Option<String> {
    match tree {
        Tree::Mapping(mapping) => mapping.values().find_map(|v| unsupported_kind(v, profile)),
        Tree::List(items) | Tree::Tuple(items) => {
            items.iter().find_map(|v| unsupported_kind(v, profile))
        }
        Tree::Array(array) => {
            if !profile.supports_array {
                return Some(format!("{} array", array.kind()));
            }
            if !profile.supports_complex && array.kind() == ElementKind::Complex {
                return Some("complex array".to_string());
            }
            match array.data() {
                ArrayData::Object(elements) => {
                    elements.iter().find_map(|v| unsupported_kind(v, profile))
                }
                _ => None,
            }
        }
        Tree::Scalar(Scalar::Complex(_)) | Tree::Scalar(Scalar::Wrapped(Number::Complex(_)))
            if !profile.supports_complex =>
        {
            Some("complex scalar".to_string())
        }
        Tree::Scalar(Scalar::Wrapped(_)) if !profile.supports_array => {
            Some("wrapped scalar".to_string())
        }
        Tree::Scalar(_) => None,
    }
}

impl Backend for MemoryBackend {
    fn id(&self) -> &str {
        &self.id
    }

    fn read(&self, path: &Path) -> Result<Tree, BackendError> {
        debug!("memory read: {}", path.display());
        self.raw(path)?.ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such entry: {}", path.display()),
            )
            .into()
        })
    }

    fn write(&self, path: &Path, tree: &Tree) -> Result<(), BackendError> {
        debug!("memory write: {}", path.display());
        if let Some(kind) = self.profile.and_then(|p| unsupported_kind(tree, p)) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{} cannot store a {}", self.id, kind),
            )
            .into());
        }
        self.put_raw(path, tree.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Array, Complex};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn given_written_tree_when_reading_then_same_tree() {
        let backend = MemoryBackend::new("json");
        let path = Path::new("a.json");
        backend.write(path, &Tree::from("x")).unwrap();
        assert_eq!(backend.read(path).unwrap(), Tree::from("x"));
    }

    #[test]
    fn given_missing_entry_when_reading_then_not_found() {
        let backend = MemoryBackend::new("json");
        let err = backend.read(Path::new("missing.json")).unwrap_err();
        let io_err = err.downcast_ref::<io::Error>().unwrap();
        assert_eq!(io_err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn given_strict_profile_when_writing_complex_then_rejected() {
        let backend = MemoryBackend::with_profile("json", FeatureProfile::new(false, false));
        let tree = Tree::List(vec![Tree::from(Complex::new(1.0, 1.0))]);
        assert!(backend.write(Path::new("z.json"), &tree).is_err());
    }

    #[test]
    fn given_strict_profile_when_writing_array_then_rejected() {
        let backend = MemoryBackend::with_profile("json", FeatureProfile::new(false, false));
        let tree = Tree::Array(Array::vector(ArrayData::Int(vec![1])));
        assert!(backend.write(Path::new("a.json"), &tree).is_err());
    }

    #[test]
    fn given_hdf5_profile_when_writing_real_array_then_accepted() {
        let backend = MemoryBackend::with_profile("hdf5", FeatureProfile::new(false, true));
        let tree = Tree::Array(Array::vector(ArrayData::Float(vec![1.0, 2.0])));
        assert!(backend.write(Path::new("a.h5"), &tree).is_ok());
    }

    #[test]
    fn given_poisoned_store_when_reading_then_lock_error_not_not_found() {
        let backend = Arc::new(MemoryBackend::new("json"));
        backend.put_raw("a.json", Tree::from(1)).unwrap();
        let holder = Arc::clone(&backend);
        let _ = thread::spawn(move || {
            let _guard = holder.store.lock().unwrap();
            panic!("writer died holding the store");
        })
        .join();

        let err = backend.read(Path::new("a.json")).unwrap_err();

        assert!(err.downcast_ref::<io::Error>().is_none());
        assert!(err.to_string().contains("poisoned"));
        assert!(backend.raw(Path::new("a.json")).is_err());
    }
}
