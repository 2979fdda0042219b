pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod lookup;
pub mod output;
pub mod pipeline;
pub mod table;
pub mod types;
pub mod vcf;

pub use error::{AnnotateError, Result};
pub use pipeline::{Pipeline, PipelineResult};
