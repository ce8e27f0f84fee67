use serde::Serialize;
use std::fmt;

use crate::duration::parse_duration;

/// Hard ceiling the upstream search endpoint places on a single page.
pub const UPSTREAM_PAGE_LIMIT: u32 = 50;

/// Opaque identifier handed out by the search stage and joined into the details stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    pub fn new(id: impl Into<String>) -> VideoId {
        VideoId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One page of the search stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    pub ids: Vec<VideoId>,
    pub next_page_token: Option<String>,
}

/// Detail-stage metadata for one video, before it is joined and filtered.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoDetails {
    pub id: VideoId,
    pub title: String,
    pub channel: String,
    pub view_count: u64,
    pub published_at: String,
    pub duration_raw: String,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoRecord {
    #[serde(rename = "videoId")]
    pub id: VideoId,
    pub title: String,
    pub channel: String,
    pub views: u64,
    pub published_at: String,
    #[serde(rename = "duration")]
    pub duration_raw: String,
    #[serde(rename = "durationSeconds")]
    pub duration_seconds: u64,
    #[serde(rename = "thumbnail", skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

impl From<VideoDetails> for VideoRecord {
    fn from(details: VideoDetails) -> VideoRecord {
        let duration_seconds = parse_duration(&details.duration_raw);
        VideoRecord {
            id: details.id,
            title: details.title,
            channel: details.channel,
            views: details.view_count,
            published_at: details.published_at,
            duration_raw: details.duration_raw,
            duration_seconds,
            thumbnail_url: details.thumbnail_url,
        }
    }
}

impl VideoRecord {
    /// A short is anything strictly under a minute, including unknown (zero) durations.
    pub fn is_short(&self) -> bool {
        self.duration_seconds < 60
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Relevance,
    Date,
    Views,
}

impl SortKey {
    /// Unrecognised or missing keys fall back to relevance.
    pub fn from_param(raw: Option<&str>) -> SortKey {
        match raw {
            Some("date") => SortKey::Date,
            Some("views") => SortKey::Views,
            _ => SortKey::Relevance,
        }
    }

    /// The `order` token the upstream search endpoint expects.
    pub fn upstream_order(self) -> &'static str {
        match self {
            SortKey::Relevance => "relevance",
            SortKey::Date => "date",
            SortKey::Views => "viewCount",
        }
    }
}

/// A validated search, ready for the aggregation loop.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub max_results: u32,
    pub sort: SortKey,
    pub page_token: Option<String>,
    pub include_shorts: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub records: Vec<VideoRecord>,
    pub next_page_token: Option<String>,
}

#[test]
fn test_sort_key_mapping() {
    assert_eq!(SortKey::from_param(Some("relevance")).upstream_order(), "relevance");
    assert_eq!(SortKey::from_param(Some("date")).upstream_order(), "date");
    assert_eq!(SortKey::from_param(Some("views")).upstream_order(), "viewCount");
    assert_eq!(SortKey::from_param(Some("rating")), SortKey::Relevance);
    assert_eq!(SortKey::from_param(Some("Views")), SortKey::Relevance);
    assert_eq!(SortKey::from_param(None), SortKey::Relevance);
}

#[test]
fn test_record_from_details() {
    let details = VideoDetails {
        id: VideoId::new("abc"),
        title: "t".into(),
        channel: "c".into(),
        view_count: 7,
        published_at: "2024-01-01T00:00:00Z".into(),
        duration_raw: "PT1M1S".into(),
        thumbnail_url: None,
    };
    let record = VideoRecord::from(details);
    assert_eq!(record.duration_seconds, 61);
    assert!(!record.is_short());

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["videoId"], "abc");
    assert_eq!(json["duration"], "PT1M1S");
    assert_eq!(json["durationSeconds"], 61);
    assert!(json.get("thumbnail").is_none());
}
