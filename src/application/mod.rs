//! Application layer: services and use cases
//!
//! This layer orchestrates domain transforms for concrete backends.

pub mod error;
pub mod file_type;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use file_type::{FileTypeResolver, ResolvedFile};
