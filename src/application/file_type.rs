//! Map file names to backend identifiers.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult};

/// A path together with the backend that handles it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    pub path: PathBuf,
    pub backend: String,
}

/// Resolves backend identifiers from file extensions.
#[derive(Debug, Clone)]
pub struct FileTypeResolver {
    extensions: BTreeMap<String, String>,
}

impl FileTypeResolver {
    /// Keys are extensions without the leading dot; matching ignores case.
    pub fn new(extensions: &BTreeMap<String, String>) -> Self {
        Self {
            extensions: extensions
                .iter()
                .map(|(ext, backend)| (ext.to_ascii_lowercase(), backend.clone()))
                .collect(),
        }
    }

    /// Resolve the backend for `path`; an explicit backend id always wins.
    pub fn resolve(&self, path: &Path, explicit: Option<&str>) -> ApplicationResult<ResolvedFile> {
        let backend = match explicit {
            Some(id) => id.to_string(),
            None => path
                .extension()
                .and_then(|ext| ext.to_str())
                .and_then(|ext| self.extensions.get(&ext.to_ascii_lowercase()))
                .cloned()
                .ok_or_else(|| ApplicationError::UnknownFileType(path.to_path_buf()))?,
        };
        debug!("resolve: {} -> {}", path.display(), backend);
        Ok(ResolvedFile {
            path: path.to_path_buf(),
            backend,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use rstest::rstest;

    fn resolver() -> FileTypeResolver {
        FileTypeResolver::new(&Settings::default().extensions)
    }

    #[rstest]
    #[case("data.h5", "hdf5")]
    #[case("data.hdf5", "hdf5")]
    #[case("data.HDF", "hdf5")]
    #[case("cfg.json", "json")]
    #[case("cfg.yml", "yaml")]
    #[case("cfg.yaml", "yaml")]
    #[case("state.pkl", "pickle")]
    #[case("state.pickle", "pickle")]
    #[case("setup.ini", "ini")]
    #[case("run.mat", "mat")]
    fn given_known_extension_when_resolving_then_backend(#[case] name: &str, #[case] backend: &str) {
        let resolved = resolver().resolve(Path::new(name), None).unwrap();
        assert_eq!(resolved.backend, backend);
        assert_eq!(resolved.path, PathBuf::from(name));
    }

    #[test]
    fn given_explicit_type_when_resolving_then_overrides_extension() {
        let resolved = resolver().resolve(Path::new("data.txt"), Some("json")).unwrap();
        assert_eq!(resolved.backend, "json");
    }

    #[rstest]
    #[case("data.csv")]
    #[case("no_extension")]
    fn given_unknown_extension_when_resolving_then_error(#[case] name: &str) {
        let err = resolver().resolve(Path::new(name), None).unwrap_err();
        assert!(matches!(err, ApplicationError::UnknownFileType(_)));
    }
}
