//! Load/save pipeline service
//!
//! Composes the tree transforms for one backend, driven by its feature profile.

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::transforms::{
    decode_complex, encode_complex, flatten_arrays, normalize_arrays, prune_nulls,
    NormalizeOptions,
};
use crate::domain::{FeatureProfile, FeatureTable, Tree};

/// Service that prepares trees for a backend and recovers them afterwards.
#[derive(Debug, Clone, Default)]
pub struct PipelineService {
    profiles: FeatureTable,
}

impl PipelineService {
    /// Create a new pipeline service over a profile table.
    pub fn new(profiles: FeatureTable) -> Self {
        Self { profiles }
    }

    pub fn profiles(&self) -> &FeatureTable {
        &self.profiles
    }

    /// Look up the profile for `backend_id`; unknown ids are a configuration error.
    pub fn profile(&self, backend_id: &str) -> ApplicationResult<FeatureProfile> {
        self.profiles
            .get(backend_id)
            .ok_or_else(|| ApplicationError::UnknownBackend(backend_id.to_string()))
    }

    /// Produce the raw tree to hand to `backend_id`'s writer.
    ///
    /// Order: prune nulls, encode complex values, flatten arrays. The caller's
    /// tree is cloned once up front and never modified.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn save(&self, backend_id: &str, tree: &Tree) -> ApplicationResult<Tree> {
        let profile = self.profile(backend_id)?;
        debug!("save: profile={:?}", profile);

        let mut raw = prune_nulls(tree.clone())?;
        if !profile.supports_complex {
            raw = encode_complex(raw)?;
        }
        if !profile.supports_array {
            raw = flatten_arrays(raw)?;
        }
        Ok(raw)
    }

    /// Recover the in-memory tree from what `backend_id`'s reader produced.
    ///
    /// Order: decode complex records, then normalize arrays.
    #[instrument(level = "debug", skip(self, raw))]
    pub fn load(&self, backend_id: &str, raw: Tree) -> ApplicationResult<Tree> {
        let profile = self.profile(backend_id)?;
        debug!("load: profile={:?}", profile);

        let mut tree = raw;
        if !profile.supports_complex {
            tree = decode_complex(tree)?;
        }
        Ok(normalize_arrays(tree, NormalizeOptions::for_profile(profile))?)
    }
}
