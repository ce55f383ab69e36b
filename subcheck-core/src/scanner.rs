use serde::Serialize;

use crate::error::{Result, SubcheckError};
use crate::pacer::{Pacer, Sleeper};
use crate::search::{SearchClient, SearchConfig, exact_phrase};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MatchRecord {
    pub chunk_text: String,
    pub source_url: String,
    pub source_title: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScanOutcome {
    Completed(Vec<MatchRecord>),
    /// Quota ran out; `partial` holds matches found before the failing query.
    QuotaExceeded { partial: Vec<MatchRecord> },
}

impl ScanOutcome {
    pub fn matches(&self) -> &[MatchRecord] {
        match self {
            ScanOutcome::Completed(m) => m,
            ScanOutcome::QuotaExceeded { partial } => partial,
        }
    }

    pub fn into_matches(self) -> Vec<MatchRecord> {
        match self {
            ScanOutcome::Completed(m) => m,
            ScanOutcome::QuotaExceeded { partial } => partial,
        }
    }

    pub fn quota_exceeded(&self) -> bool {
        matches!(self, ScanOutcome::QuotaExceeded { .. })
    }
}

/// Queries the search service once per chunk, strictly in order.
pub struct Scanner<'a> {
    config: &'a SearchConfig,
    client: &'a dyn SearchClient,
    sleeper: &'a dyn Sleeper,
}

impl<'a> Scanner<'a> {
    pub fn new(
        config: &'a SearchConfig,
        client: &'a dyn SearchClient,
        sleeper: &'a dyn Sleeper,
    ) -> Self {
        Self {
            config,
            client,
            sleeper,
        }
    }

    pub fn scan(&self, chunks: &[String]) -> Result<ScanOutcome> {
        if !self.config.is_configured() {
            return Err(SubcheckError::SearchConfigMissing);
        }

        let mut pacer = Pacer::new(self.config.request_interval(), self.sleeper);
        let mut found = Vec::new();
        let mut quota_hit = false;

        pacer.run(chunks, |chunk| match self.client.search(&exact_phrase(chunk)) {
            Ok(Some(hit)) => {
                tracing::info!(source = %hit.link, "found match for: '{chunk}'");
                found.push(MatchRecord {
                    chunk_text: chunk.clone(),
                    source_url: hit.link,
                    source_title: hit.title,
                });
                true
            }
            Ok(None) => {
                tracing::debug!("no match for: '{chunk}'");
                true
            }
            Err(e) => {
                tracing::warn!("could not perform search for chunk: {e}");
                if e.is_quota_exhausted() {
                    quota_hit = true;
                    return false;
                }
                true
            }
        });

        if quota_hit {
            Ok(ScanOutcome::QuotaExceeded { partial: found })
        } else {
            Ok(ScanOutcome::Completed(found))
        }
    }
}
