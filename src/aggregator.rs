use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::data_models::{
    ResultSet, SearchRequest, UPSTREAM_PAGE_LIMIT, VideoDetails, VideoId, VideoRecord,
};
use crate::error::UpstreamResult;
use crate::youtube::VideoCatalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Accumulating,
    /// Upstream has no more pages; whatever has been collected is final.
    Exhausted,
    Done,
}

/// Drives the search/details rounds for one request until the target count is reached,
/// the upstream runs out of pages, or a call fails.
///
/// Rounds are strictly sequential: each round's cursor and page size depend on the last.
/// Nothing is shared between requests.
pub struct Aggregator {
    catalog: Arc<dyn VideoCatalog>,
}

impl Aggregator {
    pub fn new(catalog: Arc<dyn VideoCatalog>) -> Self {
        Self { catalog }
    }

    /// Collects up to `request.max_results` records.
    ///
    /// A cursor the upstream has already handed out (or the one the request started from)
    /// counts as exhaustion, so a looping upstream cannot keep the rounds going.
    ///
    /// If the upstream returns more usable records than were asked for, the surplus past the
    /// target is dropped and the returned `next_page_token` still points after that page:
    /// paging on with it will not revisit the dropped records.
    pub async fn collect(&self, request: &SearchRequest) -> UpstreamResult<ResultSet> {
        let target = request.max_results as usize;
        let mut records: Vec<VideoRecord> = Vec::with_capacity(target);
        let mut cursor = request.page_token.clone();
        let mut seen_cursors: HashSet<String> = cursor.iter().cloned().collect();
        let mut state = LoopState::Accumulating;
        let mut rounds = 0usize;

        while state == LoopState::Accumulating {
            let remaining = target.saturating_sub(records.len());
            if remaining == 0 {
                state = LoopState::Done;
                break;
            }
            let page_size = remaining.min(UPSTREAM_PAGE_LIMIT as usize) as u32;
            rounds += 1;

            let page = self
                .catalog
                .search_page(&request.query, request.sort, page_size, cursor.as_deref())
                .await
                .inspect_err(|e| tracing::warn!(round = rounds, error = %e, "Search stage failed"))?;

            if page.ids.is_empty() {
                tracing::debug!(round = rounds, "Search stage returned no identifiers");
                cursor = None;
                state = LoopState::Exhausted;
                continue;
            }

            let details = self
                .catalog
                .fetch_details(&page.ids)
                .await
                .inspect_err(|e| tracing::warn!(round = rounds, error = %e, "Details stage failed"))?;

            let joined = join_in_search_order(&page.ids, details);
            let fetched = joined.len();
            let mut kept = 0usize;
            let mut truncated = 0usize;
            for record in joined {
                if !request.include_shorts && record.is_short() {
                    continue;
                }
                if records.len() >= target {
                    truncated += 1;
                    continue;
                }
                records.push(record);
                kept += 1;
            }

            tracing::debug!(
                round = rounds,
                page_size,
                ids = page.ids.len(),
                fetched,
                kept,
                truncated,
                discarded = fetched - kept - truncated,
                "Round complete"
            );

            cursor = match page.next_page_token {
                Some(token) if !seen_cursors.insert(token.clone()) => {
                    tracing::warn!(round = rounds, token = %token, "Upstream repeated a page token");
                    None
                }
                other => other,
            };
            state = if cursor.is_none() {
                LoopState::Exhausted
            } else if records.len() >= target {
                LoopState::Done
            } else {
                LoopState::Accumulating
            };
        }

        tracing::info!(
            query = %request.query,
            results = records.len(),
            rounds,
            exhausted = state == LoopState::Exhausted,
            next_page_token = cursor.as_deref(),
            "Search aggregated"
        );

        Ok(ResultSet {
            records,
            next_page_token: cursor,
        })
    }
}

/// Emits records in search order, dropping identifiers the details stage did not return.
/// Repeated identifiers are emitted once per occurrence.
fn join_in_search_order(ids: &[VideoId], details: Vec<VideoDetails>) -> Vec<VideoRecord> {
    let by_id: HashMap<VideoId, VideoDetails> =
        details.into_iter().map(|d| (d.id.clone(), d)).collect();

    ids.iter()
        .filter_map(|id| by_id.get(id).cloned())
        .map(VideoRecord::from)
        .collect()
}
