use crate::core::compare::Comparator;
use crate::domain::model::{CompareOutcome, RunSummary, SampleItem};
use crate::domain::ports::JsonSource;
use crate::utils::error::{HarnessError, Result};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Fans comparisons out over at most `workers` concurrent tasks.
pub struct DiffRunner<O: JsonSource, N: JsonSource> {
    comparator: Arc<Comparator<O, N>>,
    workers: usize,
}

impl<O, N> DiffRunner<O, N>
where
    O: JsonSource + 'static,
    N: JsonSource + 'static,
{
    pub fn new(comparator: Comparator<O, N>, workers: usize) -> Self {
        Self {
            comparator: Arc::new(comparator),
            workers: workers.max(1),
        }
    }

    pub fn comparator(&self) -> &Comparator<O, N> {
        &self.comparator
    }

    /// Returns once every comparison has finished, or on the first fatal error.
    ///
    /// A fatal error aborts all comparisons still in flight.
    pub async fn run(&self, items: Vec<SampleItem>) -> Result<RunSummary> {
        let mut summary = RunSummary {
            sampled: items.len(),
            ..RunSummary::default()
        };

        let mut pending = items.into_iter();
        let mut tasks = JoinSet::new();
        for item in pending.by_ref().take(self.workers) {
            self.spawn(&mut tasks, item);
        }

        while let Some(joined) = tasks.join_next().await {
            match joined.map_err(HarnessError::from).and_then(|result| result) {
                Ok(outcome) => {
                    summary.record(&outcome);
                    if let Some(item) = pending.next() {
                        self.spawn(&mut tasks, item);
                    }
                }
                Err(e) => {
                    tracing::debug!("Aborting {} in-flight comparisons", tasks.len());
                    tasks.abort_all();
                    return Err(e);
                }
            }
        }

        Ok(summary)
    }

    fn spawn(&self, tasks: &mut JoinSet<Result<CompareOutcome>>, item: SampleItem) {
        let comparator = Arc::clone(&self.comparator);
        tasks.spawn(async move { comparator.compare(&item).await });
    }
}
