pub mod adapters;
pub mod api;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{LookupArgs, ServerArgs};

pub use adapters::HttpFetcher;
pub use config::{SecondaryFailurePolicy, ServiceConfig};
pub use core::{extract::TableExtractor, pipeline::LookupPipeline};
pub use domain::model::{Extraction, LookupOutcome, Record};
pub use domain::ports::Fetcher;
pub use utils::error::{LookupError, Result};
