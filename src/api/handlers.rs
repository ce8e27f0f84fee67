use axum::{
    Json,
    extract::{Query, State},
};
use std::time::Instant;
use tracing::Instrument;

use crate::data_models::{SearchRequest, SortKey};
use crate::error::ServiceError;

use super::AppState;
use super::models::{SearchParams, SearchResponse};

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ServiceError> {
    let start = Instant::now();
    let request = validate(params, state.default_max_results, state.max_aggregate_results)
        .inspect_err(|e| tracing::info!(error = %e, "Rejected search request"))?;

    let span = tracing::info_span!("search", request_id = %nanoid::nanoid!(8), query = %request.query);
    let result_set = state
        .aggregator
        .collect(&request)
        .instrument(span)
        .await?;

    tracing::debug!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        results = result_set.records.len(),
        "Search served"
    );
    Ok(Json(SearchResponse::from(result_set)))
}

/// Turns raw query parameters into a `SearchRequest`, applying defaults and limits.
pub fn validate(
    params: SearchParams,
    default_max_results: u32,
    max_aggregate_results: u32,
) -> Result<SearchRequest, ServiceError> {
    let query = params
        .q
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ServiceError::Validation("Missing search query".to_string()))?;

    let max_results = match params.max_results.as_deref().map(str::trim) {
        None | Some("") => default_max_results,
        Some(raw) => clamp_count(raw, max_aggregate_results)
            .ok_or_else(|| ServiceError::Validation(format!("Invalid maxResults: {raw:?}")))?,
    };

    let include_shorts = params
        .include_shorts
        .as_deref()
        .map(|v| v.trim().eq_ignore_ascii_case("true") || v.trim() == "1")
        .unwrap_or(false);

    Ok(SearchRequest {
        query,
        max_results,
        sort: SortKey::from_param(params.sort.as_deref()),
        page_token: params.page_token.filter(|t| !t.is_empty()),
        include_shorts,
    })
}

/// Reads an optionally signed decimal integer and saturates it into `[1, max]`, however
/// many digits it has. Returns `None` for anything that is not an integer.
fn clamp_count(raw: &str, max: u32) -> Option<u32> {
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if negative {
        return Some(1);
    }
    let value = digits.parse::<u64>().unwrap_or(u64::MAX);
    Some(value.clamp(1, max as u64) as u32)
}
