use crate::adapters::{HttpEndpoint, RetryingClient};
use crate::config::HarnessSettings;
use crate::core::compare::Comparator;
use crate::core::loader::load_items;
use crate::core::runner::DiffRunner;
use crate::core::sampler::sample_with_seed;
use crate::domain::model::RunSummary;
use crate::domain::ports::JsonSource;
use crate::utils::error::Result;

/// Load, sample, compare.
pub struct HarnessEngine {
    settings: HarnessSettings,
}

impl HarnessEngine {
    pub fn new(settings: HarnessSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &HarnessSettings {
        &self.settings
    }

    pub async fn run(&self) -> Result<RunSummary> {
        let settings = &self.settings;
        tracing::info!("start server mode test(mode: {})", settings.mode);

        // 讀取清單並抽樣
        let items = load_items(&settings.list_path)?;
        let sample = sample_with_seed(&items, settings.sample_rate, settings.seed);
        tracing::info!(
            "📋 Sampled {} of {} items (sample_rate: {})",
            sample.len(),
            items.len(),
            settings.sample_rate
        );

        let client = RetryingClient::new(&settings.http, settings.retry.clone())?;
        let old = HttpEndpoint::new(&settings.old_url, client.clone())?;
        let new = HttpEndpoint::new(&settings.new_url, client)?;

        let runner = DiffRunner::new(Comparator::new(settings.mode, old, new), settings.workers);
        tracing::debug!(
            "Comparing {} (old) against {} (new) with {} workers",
            runner.comparator().old_source().base_url(),
            runner.comparator().new_source().base_url(),
            settings.workers
        );

        let summary = runner.run(sample).await?;
        tracing::info!(
            "✅ Finished server mode test: {} compared, {} matched, {} mismatched, {} timed out",
            summary.completed(),
            summary.matched,
            summary.mismatched,
            summary.timed_out
        );

        Ok(summary)
    }
}
