//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.

mod pipeline;

pub use pipeline::PipelineService;
