use super::{Stage, StageContext, StageError, StageInput, StageOutcome};
use crate::events::CrawlEvent;

/// Reports the workload: URIs still queued and feeds found so far
#[derive(Debug, Clone, Copy, Default)]
pub struct Status;

impl Stage for Status {
    fn name(&self) -> &'static str {
        "status"
    }

    fn process(
        &self,
        _input: &StageInput<'_>,
        ctx: &StageContext,
    ) -> Result<StageOutcome, StageError> {
        ctx.observer.observe(&CrawlEvent::Status {
            pending: ctx.queue.len(),
            results: ctx.results.len(),
        });

        Ok(StageOutcome::Continue)
    }
}
