pub mod export;
pub mod extract;
pub mod pipeline;

pub use crate::domain::model::{Extraction, LookupOutcome, Record};
pub use crate::domain::ports::Fetcher;
pub use crate::utils::error::Result;
