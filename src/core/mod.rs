pub mod compare;
pub mod diff;
pub mod engine;
pub mod loader;
pub mod runner;
pub mod sampler;

pub use crate::domain::model::{CompareOutcome, DiffReport, Mode, RunSummary, SampleItem};
pub use crate::domain::ports::JsonSource;
pub use crate::utils::error::Result;
