#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use tubeharvest::data_models::{SearchPage, SortKey, VideoDetails, VideoId};
use tubeharvest::error::{UpstreamError, UpstreamResult};
use tubeharvest::youtube::VideoCatalog;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Search {
        query: String,
        sort: SortKey,
        page_size: u32,
        page_token: Option<String>,
    },
    Details(Vec<String>),
}

/// In-memory catalog that replays a fixed sequence of search pages and answers detail
/// lookups from a table of known videos. Every call is recorded.
#[derive(Default)]
pub struct ScriptedCatalog {
    pages: Mutex<VecDeque<UpstreamResult<SearchPage>>>,
    videos: HashMap<VideoId, VideoDetails>,
    detail_failures: Mutex<VecDeque<Option<UpstreamError>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, ids: &[String], next: Option<&str>) -> Self {
        self.pages.lock().unwrap().push_back(Ok(SearchPage {
            ids: ids.iter().map(VideoId::new).collect(),
            next_page_token: next.map(str::to_string),
        }));
        self
    }

    pub fn with_search_error(self, err: UpstreamError) -> Self {
        self.pages.lock().unwrap().push_back(Err(err));
        self
    }

    /// Queues the outcome of the next details call: `None` succeeds, `Some` fails.
    pub fn with_details_outcome(self, outcome: Option<UpstreamError>) -> Self {
        self.detail_failures.lock().unwrap().push_back(outcome);
        self
    }

    pub fn with_videos(mut self, videos: Vec<VideoDetails>) -> Self {
        for video in videos {
            self.videos.insert(video.id.clone(), video);
        }
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn search_page_sizes(&self) -> Vec<u32> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Search { page_size, .. } => Some(page_size),
                _ => None,
            })
            .collect()
    }

    pub fn details_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Details(_)))
            .count()
    }
}

#[async_trait]
impl VideoCatalog for ScriptedCatalog {
    async fn search_page(
        &self,
        query: &str,
        sort: SortKey,
        page_size: u32,
        page_token: Option<&str>,
    ) -> UpstreamResult<SearchPage> {
        self.calls.lock().unwrap().push(Call::Search {
            query: query.to_string(),
            sort,
            page_size,
            page_token: page_token.map(str::to_string),
        });
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(SearchPage::default()))
    }

    async fn fetch_details(&self, ids: &[VideoId]) -> UpstreamResult<Vec<VideoDetails>> {
        self.calls.lock().unwrap().push(Call::Details(
            ids.iter().map(|id| id.as_str().to_string()).collect(),
        ));
        if let Some(Some(err)) = self.detail_failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        Ok(ids.iter().filter_map(|id| self.videos.get(id).cloned()).collect())
    }
}

pub fn video(id: &str, duration: &str) -> VideoDetails {
    VideoDetails {
        id: VideoId::new(id),
        title: format!("Video {id}"),
        channel: "Some Channel".to_string(),
        view_count: 1_000,
        published_at: "2024-03-01T12:00:00Z".to_string(),
        duration_raw: duration.to_string(),
        thumbnail_url: Some(format!("https://img.example/{id}/mqdefault.jpg")),
    }
}

/// `count` identifiers named `{prefix}0`, `{prefix}1`, ...
pub fn ids(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("{prefix}{i}")).collect()
}

pub fn videos(ids: &[String], duration: &str) -> Vec<VideoDetails> {
    ids.iter().map(|id| video(id, duration)).collect()
}
