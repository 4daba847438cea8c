pub mod adapters;
pub mod aggregator;
pub mod canonicalizer;
pub mod config;
pub mod importers;
pub mod masters;
pub mod pipeline_error;
pub mod record;
pub mod resolvers;
pub mod services;
pub mod storage;

pub use pipeline_error::PipelineError;
