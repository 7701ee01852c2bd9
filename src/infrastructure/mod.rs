//! Infrastructure layer: backend implementations and DI container
//!
//! This layer implements the backend boundary trait and wires up services.

pub mod di;
pub mod error;
pub mod traits;

pub use di::ServiceContainer;
pub use error::{InfraError, InfraResult};
pub use traits::{Backend, BackendError, MemoryBackend};
