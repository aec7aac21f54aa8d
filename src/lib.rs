pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{HarnessSettings, HttpSettings, RetryPolicy};
pub use crate::core::{diff::diff_values, engine::HarnessEngine};
pub use domain::model::{CompareOutcome, DiffReport, Mode, RunSummary, SampleItem};
pub use utils::error::{HarnessError, Result};
