// Configuration loading

pub mod etl;

pub use etl::{ConfigError, EtlConfig, FileTarget, PipelineOptions, ServerTarget};
