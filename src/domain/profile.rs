//! Backend feature profiles: which value kinds a format stores natively.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Native capabilities of one backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureProfile {
    /// Backend stores complex scalars and complex arrays
    #[serde(rename = "complex")]
    pub supports_complex: bool,
    /// Backend stores n-dimensional numeric arrays
    #[serde(rename = "array")]
    pub supports_array: bool,
}

impl FeatureProfile {
    pub const fn new(supports_complex: bool, supports_array: bool) -> Self {
        Self {
            supports_complex,
            supports_array,
        }
    }
}

/// Static table of profiles keyed by backend identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureTable {
    profiles: BTreeMap<String, FeatureProfile>,
}

impl Default for FeatureTable {
    fn default() -> Self {
        let profiles = [
            ("hdf5", FeatureProfile::new(false, true)),
            ("json", FeatureProfile::new(false, false)),
            ("yaml", FeatureProfile::new(false, false)),
            ("pickle", FeatureProfile::new(true, true)),
            ("mat", FeatureProfile::new(true, true)),
            ("ini", FeatureProfile::new(false, false)),
        ]
        .into_iter()
        .map(|(id, profile)| (id.to_string(), profile))
        .collect();
        Self { profiles }
    }
}

impl FeatureTable {
    pub fn new(profiles: BTreeMap<String, FeatureProfile>) -> Self {
        Self { profiles }
    }

    pub fn get(&self, backend_id: &str) -> Option<FeatureProfile> {
        self.profiles.get(backend_id).copied()
    }

    pub fn contains(&self, backend_id: &str) -> bool {
        self.profiles.contains_key(backend_id)
    }

    pub fn insert(&mut self, backend_id: impl Into<String>, profile: FeatureProfile) {
        self.profiles.insert(backend_id.into(), profile);
    }

    pub fn backend_ids(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn as_map(&self) -> &BTreeMap<String, FeatureProfile> {
        &self.profiles
    }
}
