//! Normalize nested data trees so they survive file backends with different
//! native type support.
//!
//! A [`domain::Tree`] holds mappings, sequences, scalars, complex numbers and
//! n-dimensional arrays. Before a backend writes it, the
//! [`application::services::PipelineService`] prunes nulls and, depending on
//! the backend's [`domain::FeatureProfile`], encodes complex values as tagged
//! records and flattens arrays into nested sequences. After a read the
//! same service reverses those steps.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod util;

pub use application::services::PipelineService;
pub use application::{ApplicationError, ApplicationResult};
pub use domain::{Array, ArrayData, Complex, FeatureProfile, FeatureTable, Mapping, Scalar, Tree};
pub use infrastructure::{Backend, InfraError, InfraResult, MemoryBackend, ServiceContainer};
