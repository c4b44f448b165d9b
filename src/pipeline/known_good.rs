use super::{Stage, StageContext, StageError, StageInput, StageOutcome};
use crate::url::scheme_and_host;
use url::Url;

/// Hosting platforms whose feed location is known from a response header
///
/// Each entry is `(header, value, feed path)`: when the last value of `header`
/// equals `value`, `scheme://host` plus `feed path` is queued.
pub const KNOWN_HOSTS: &[(&str, &str, &str)] = &[("x-powered-by", "Medium", "/feed")];

/// Queues the conventional feed location of recognised hosting platforms
///
/// Some platforms hide their markup behind cookie redirects, so neither
/// autodiscovery nor scraping finds anything on them.
#[derive(Debug, Clone, Copy, Default)]
pub struct KnownGood;

impl Stage for KnownGood {
    fn name(&self) -> &'static str {
        "known-good"
    }

    fn process(
        &self,
        input: &StageInput<'_>,
        ctx: &StageContext,
    ) -> Result<StageOutcome, StageError> {
        let response = input.response();

        for (header, value, path) in KNOWN_HOSTS {
            if response.header(header) != Some(*value) {
                continue;
            }

            let effective = input.effective_url()?;
            tracing::info!(
                header = *header,
                "Known host: {}",
                effective.host_str().unwrap_or_default()
            );

            let candidate = format!("{}{}", scheme_and_host(&effective), path);
            if let Ok(feed) = Url::parse(&candidate) {
                ctx.enqueue(self.name(), &feed);
            }
        }

        Ok(StageOutcome::Continue)
    }
}
