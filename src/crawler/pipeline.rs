//! Two-stage ingestion pipeline
//!
//! Stage 1 (fetch) runs the pagination walker to a materialized batch; stage
//! 2 (persist) writes that batch record-by-record inside one store unit of
//! work. The stages are decoupled on purpose: a fetch failure means nothing
//! is persisted, a persist failure means one record is skipped.

use crate::config::Config;
use crate::crawler::walker::PaginationWalker;
use crate::error::Result;
use crate::models::{IngestRequest, IngestReport, WalkOutcome};
use crate::storage::AdvertStore;

/// Orchestrates one ingestion job across both stages
pub struct IngestionOrchestrator {
    walker: PaginationWalker,
}

impl IngestionOrchestrator {
    /// Create an orchestrator from configuration
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            walker: PaginationWalker::new(config)?,
        })
    }

    /// Create an orchestrator around a pre-built walker (used by tests)
    #[must_use]
    pub fn with_walker(walker: PaginationWalker) -> Self {
        Self { walker }
    }

    /// Run one job: fetch stage, then persist stage
    ///
    /// # Errors
    ///
    /// Invalid submissions and fetch-stage failures abort the job with
    /// nothing persisted. Persist-stage failures never surface here; they are
    /// per-record entries in the returned report.
    pub async fn run(
        &self,
        request: &IngestRequest,
        store: &dyn AdvertStore,
    ) -> Result<IngestReport> {
        request.validate()?;

        tracing::info!(
            query = %request.query,
            limit = request.limit,
            price_from = request.price_from,
            price_to = request.price_to,
            "Starting ingestion job"
        );

        let outcome = self.fetch_stage(request).await?;
        let report = persist_batch(store, request, outcome);

        tracing::info!(
            query = %report.query,
            extracted = report.extracted,
            persisted = report.persisted,
            persist_failures = report.persist_failures,
            "Ingestion job finished"
        );

        Ok(report)
    }

    /// Stage 1: walk the paginated results into one materialized batch
    async fn fetch_stage(&self, request: &IngestRequest) -> Result<WalkOutcome> {
        self.walker.walk(request).await
    }
}

/// Stage 2: persist one batch, best-effort
///
/// Every record gets its own create inside a single unit of work; a failed
/// create is recorded and skipped, and the commit is attempted once at the
/// end regardless. The report is the first-class result - partial success is
/// an expected outcome, not an exception path.
pub fn persist_batch(
    store: &dyn AdvertStore,
    request: &IngestRequest,
    outcome: WalkOutcome,
) -> IngestReport {
    let mut report = IngestReport {
        query: request.query.clone(),
        tag: outcome.tag.clone(),
        pages_visited: outcome.pages_visited,
        cards_seen: outcome.cards_seen,
        extracted: outcome.records.len(),
        card_failures: outcome.card_failures,
        persisted: 0,
        persist_failures: 0,
        stopped_early: outcome.stopped_early,
    };

    if outcome.records.is_empty() {
        return report;
    }

    if let Err(err) = store.begin() {
        tracing::error!(error = %err, "Could not open unit of work, nothing persisted");
        report.persist_failures = report.extracted;
        return report;
    }

    for advert in &outcome.records {
        match store.create(advert) {
            Ok(()) => report.persisted += 1,
            Err(err) => {
                tracing::warn!(
                    title = %advert.title,
                    error = %err,
                    "Record failed to persist, continuing batch"
                );
                report.persist_failures += 1;
            }
        }
    }

    if let Err(err) = store.commit() {
        tracing::error!(error = %err, "Unit of work failed to commit, nothing persisted");
        report.persist_failures = report.extracted;
        report.persisted = 0;
    }

    report
}
