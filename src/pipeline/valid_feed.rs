use super::{AbortReason, Stage, StageContext, StageError, StageInput, StageOutcome};
use crate::events::CrawlEvent;
use crate::state::FeedEntry;
use crate::validator;

/// Records the response as a feed if any validator accepts it
///
/// A feed is never mined for further links, so a match stops the pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidFeed;

impl Stage for ValidFeed {
    fn name(&self) -> &'static str {
        "valid-feed"
    }

    fn process(
        &self,
        input: &StageInput<'_>,
        ctx: &StageContext,
    ) -> Result<StageOutcome, StageError> {
        let response = input.response();

        let Some(format) = validator::identify(response) else {
            return Ok(StageOutcome::Continue);
        };

        let entry = FeedEntry::new(response.effective_uri(), format, response.content_type());
        if ctx.results.push(entry.clone()) {
            ctx.observer.observe(&CrawlEvent::FeedFound { entry });
        }

        Ok(StageOutcome::Abort(AbortReason::IsAFeed(format)))
    }
}
