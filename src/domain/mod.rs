//! Domain layer: the tree model and its transforms
//!
//! This layer is independent of external concerns (no I/O, no config loading).

pub mod complex;
pub mod entities;
pub mod error;
pub mod lookup;
pub mod profile;
pub mod transforms;
pub mod walker;

pub use complex::Complex;
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use lookup::{subkey_get, subkey_search};
pub use profile::{FeatureProfile, FeatureTable};
pub use walker::{walk, Step, TreeVisitor};
