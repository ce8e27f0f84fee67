use serde::{Deserialize, Serialize};

use crate::data_models::{ResultSet, VideoRecord};

/// Raw query parameters. Everything is kept as text so that bad values are reported by
/// validation rather than rejected by the extractor.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    #[serde(rename = "maxResults")]
    pub max_results: Option<String>,
    pub sort: Option<String>,
    #[serde(rename = "pageToken")]
    pub page_token: Option<String>,
    #[serde(rename = "includeShorts")]
    pub include_shorts: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<VideoRecord>,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

impl From<ResultSet> for SearchResponse {
    fn from(set: ResultSet) -> Self {
        SearchResponse {
            results: set.records,
            next_page_token: set.next_page_token,
        }
    }
}
