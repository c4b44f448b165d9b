use super::{Stage, StageContext, StageError, StageInput, StageOutcome};
use crate::events::CrawlEvent;

/// Adopts the first response's effective URI as the crawl's source URI
///
/// When the starting address redirects (`http` to `https`, bare domain to
/// `www`, and so on), scope checks in later stages must use the address the
/// site actually lives at.
#[derive(Debug, Clone, Copy, Default)]
pub struct EffectiveUri;

impl Stage for EffectiveUri {
    fn name(&self) -> &'static str {
        "effective-uri"
    }

    fn process(
        &self,
        input: &StageInput<'_>,
        ctx: &StageContext,
    ) -> Result<StageOutcome, StageError> {
        let effective = input.response().effective_uri();

        if let Some(previous) = ctx.state.resolve_source(effective) {
            ctx.observer.observe(&CrawlEvent::SourceUpdated {
                from: previous,
                to: effective.to_string(),
            });
        }

        Ok(StageOutcome::Continue)
    }
}
