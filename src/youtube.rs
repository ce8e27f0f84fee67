use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

use crate::config::Config;
use crate::data_models::{SearchPage, SortKey, UPSTREAM_PAGE_LIMIT, VideoDetails, VideoId};
use crate::error::{UpstreamError, UpstreamResult};

/// The two-stage video catalog the aggregator pulls from.
///
/// `search_page` returns identifiers plus a continuation cursor; `fetch_details` resolves a
/// batch of identifiers into metadata. Each call is exactly one upstream request.
#[async_trait]
pub trait VideoCatalog: Send + Sync {
    async fn search_page(
        &self,
        query: &str,
        sort: SortKey,
        page_size: u32,
        page_token: Option<&str>,
    ) -> UpstreamResult<SearchPage>;

    async fn fetch_details(&self, ids: &[VideoId]) -> UpstreamResult<Vec<VideoDetails>>;
}

pub struct YouTubeClient {
    http: reqwest::Client,
    api_key: String,
    search_url: String,
    videos_url: String,
}

impl YouTubeClient {
    pub fn new(config: &Config) -> reqwest::Result<YouTubeClient> {
        let http = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()?;
        Ok(YouTubeClient {
            http,
            api_key: config.api_key.clone(),
            search_url: config.search_url.clone(),
            videos_url: config.videos_url.clone(),
        })
    }

    async fn get_json<T>(&self, url: &str, params: &[(&str, String)]) -> UpstreamResult<T>
    where
        T: DeserializeOwned,
    {
        let resp = self.http.get(url).query(params).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let message = extract_error_message(&body).unwrap_or(body);
            return Err(api_error(status, message));
        }

        let value: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| api_error(status, format!("invalid response body: {e}")))?;

        // the upstream sometimes reports errors in a 2xx payload
        if value.get("error").is_some() {
            let message = extract_error_message(&body)
                .unwrap_or_else(|| "upstream reported an error".to_string());
            return Err(api_error(status, message));
        }

        serde_json::from_value(value)
            .map_err(|e| api_error(status, format!("unexpected response shape: {e}")))
    }
}

#[async_trait]
impl VideoCatalog for YouTubeClient {
    async fn search_page(
        &self,
        query: &str,
        sort: SortKey,
        page_size: u32,
        page_token: Option<&str>,
    ) -> UpstreamResult<SearchPage> {
        let page_size = page_size.clamp(1, UPSTREAM_PAGE_LIMIT);
        let mut params = vec![
            ("part", "snippet".to_string()),
            ("q", query.to_string()),
            ("type", "video".to_string()),
            ("maxResults", page_size.to_string()),
            ("order", sort.upstream_order().to_string()),
            ("key", self.api_key.clone()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }

        tracing::debug!(query, page_size, page_token, "Calling upstream search");
        let resp: SearchListResponse = self.get_json(&self.search_url, &params).await?;

        let ids = resp
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .map(VideoId::new)
            .collect();

        Ok(SearchPage {
            ids,
            next_page_token: resp.next_page_token.filter(|t| !t.is_empty()),
        })
    }

    async fn fetch_details(&self, ids: &[VideoId]) -> UpstreamResult<Vec<VideoDetails>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let joined = ids
            .iter()
            .map(VideoId::as_str)
            .collect::<Vec<&str>>()
            .join(",");
        let params = [
            ("part", "snippet,contentDetails,statistics".to_string()),
            ("id", joined),
            ("key", self.api_key.clone()),
        ];

        tracing::debug!(count = ids.len(), "Calling upstream video details");
        let resp: VideoListResponse = self.get_json(&self.videos_url, &params).await?;

        Ok(resp.items.into_iter().map(VideoDetails::from).collect())
    }
}

fn api_error(status: StatusCode, message: String) -> UpstreamError {
    UpstreamError::Api {
        status: status.as_u16(),
        message,
    }
}

/// Pulls `error.message` (or a bare string `error`) out of an upstream error payload.
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("error")? {
        serde_json::Value::String(message) => Some(message.clone()),
        serde_json::Value::Object(obj) => obj
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    id: SearchItemId,
}

#[derive(Debug, Default, Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    id: String,
    #[serde(default)]
    snippet: Snippet,
    #[serde(rename = "contentDetails", default)]
    content_details: ContentDetails,
    #[serde(default)]
    statistics: Statistics,
}

#[derive(Debug, Default, Deserialize)]
struct Snippet {
    title: Option<String>,
    #[serde(rename = "channelTitle")]
    channel_title: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
    #[serde(default)]
    thumbnails: HashMap<String, Thumbnail>,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnail {
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ContentDetails {
    duration: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Statistics {
    #[serde(rename = "viewCount")]
    view_count: Option<serde_json::Value>,
}

impl Statistics {
    /// Counts arrive as decimal strings; anything unusable counts as zero.
    fn views(&self) -> u64 {
        match &self.view_count {
            Some(serde_json::Value::String(s)) => s.trim().parse().unwrap_or(0),
            Some(serde_json::Value::Number(n)) => n.as_u64().unwrap_or(0),
            _ => 0,
        }
    }
}

impl From<VideoItem> for VideoDetails {
    fn from(item: VideoItem) -> VideoDetails {
        let view_count = item.statistics.views();
        let mut snippet = item.snippet;
        let thumbnail_url = snippet.thumbnails.remove("medium").and_then(|t| t.url);
        VideoDetails {
            id: VideoId::new(item.id),
            title: snippet.title.unwrap_or_default(),
            channel: snippet.channel_title.unwrap_or_default(),
            view_count,
            published_at: snippet.published_at.unwrap_or_default(),
            duration_raw: item.content_details.duration.unwrap_or_default(),
            thumbnail_url,
        }
    }
}
