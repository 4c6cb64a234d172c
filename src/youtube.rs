use rand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::config::Config;
use crate::error::YouTubeError;

const PLAYLIST_PAGE_LIMIT: usize = 50;
const COMMENT_PAGE_LIMIT: usize = 100;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Video {
    pub video_id: String,
}

impl Video {
    pub fn url(&self) -> String {
        video_url(&self.video_id)
    }
}

pub fn video_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// A top-level comment as returned to API and CLI callers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct Comment {
    /// Comment author
    pub author: String,
    /// Comment text
    pub text: String,
    /// Publication date
    pub published_at: String,
    /// Number of likes
    pub like_count: u64,
}

#[derive(Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelItem {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    content_details: Option<ChannelContentDetails>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelContentDetails {
    related_playlists: RelatedPlaylists,
}

#[derive(Deserialize)]
struct RelatedPlaylists {
    uploads: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItem {
    content_details: PlaylistItemContentDetails,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemContentDetails {
    video_id: String,
}

#[derive(Deserialize)]
struct CommentThread {
    snippet: CommentThreadSnippet,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentThreadSnippet {
    top_level_comment: TopLevelComment,
}

#[derive(Deserialize)]
struct TopLevelComment {
    snippet: CommentSnippet,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentSnippet {
    #[serde(default)]
    author_display_name: String,
    #[serde(default)]
    text_display: String,
    #[serde(default)]
    published_at: String,
    #[serde(default)]
    like_count: u64,
}

impl From<CommentThread> for Comment {
    fn from(thread: CommentThread) -> Self {
        let s = thread.snippet.top_level_comment.snippet;
        Comment {
            author: s.author_display_name,
            text: s.text_display,
            published_at: s.published_at,
            like_count: s.like_count,
        }
    }
}

#[derive(Deserialize)]
struct SearchItem {
    snippet: SearchSnippet,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchSnippet {
    channel_id: Option<String>,
}

/// Client for the handful of YouTube Data API v3 resources the crawler needs.
#[derive(Clone)]
pub struct YouTubeClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    max_retries: u32,
    retry_base_delay: Duration,
}

impl YouTubeClient {
    pub fn new(config: &Config) -> Result<Self, YouTubeError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| YouTubeError::Request(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
            retry_base_delay: config.retry_base_delay,
        })
    }

    /// Videos from the channel's uploads playlist, newest first, at most `max_results`.
    pub async fn channel_videos(&self, channel_id: &str, max_results: usize) -> Result<Vec<Video>, YouTubeError> {
        let channels: ListResponse<ChannelItem> = self
            .get_json("channels", &[("part", "contentDetails".to_string()), ("id", channel_id.to_string())])
            .await?;

        let Some(channel) = channels.items.into_iter().next() else {
            tracing::info!(channel_id, "channel not found");
            return Ok(Vec::new());
        };

        let uploads = channel
            .content_details
            .and_then(|d| d.related_playlists.uploads)
            .ok_or(YouTubeError::MissingField("contentDetails.relatedPlaylists.uploads"))?;

        let mut videos = Vec::new();
        let mut page_token: Option<String> = None;

        while videos.len() < max_results {
            let mut params = vec![
                ("part", "snippet,contentDetails".to_string()),
                ("playlistId", uploads.clone()),
                ("maxResults", PLAYLIST_PAGE_LIMIT.min(max_results - videos.len()).to_string()),
            ];
            if let Some(token) = &page_token {
                params.push(("pageToken", token.clone()));
            }

            let page: ListResponse<PlaylistItem> = self.get_json("playlistItems", &params).await?;
            videos.extend(page.items.into_iter().map(|item| Video {
                video_id: item.content_details.video_id,
            }));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        videos.truncate(max_results);
        Ok(videos)
    }

    /// Top-level comments for a video. An API error stops paging and keeps what was collected,
    /// which covers videos with comments disabled.
    pub async fn video_comments(&self, video_id: &str, max_results: usize) -> Result<Vec<Comment>, YouTubeError> {
        let mut comments = Vec::new();
        let mut page_token: Option<String> = None;

        while comments.len() < max_results {
            let mut params = vec![
                ("part", "snippet".to_string()),
                ("videoId", video_id.to_string()),
                ("maxResults", COMMENT_PAGE_LIMIT.min(max_results - comments.len()).to_string()),
            ];
            if let Some(token) = &page_token {
                params.push(("pageToken", token.clone()));
            }

            let page: ListResponse<CommentThread> = match self.get_json("commentThreads", &params).await {
                Ok(page) => page,
                Err(e @ YouTubeError::Status { .. }) => {
                    tracing::warn!(video_id, error = %e, "could not fetch comments");
                    break;
                }
                Err(e) => return Err(e),
            };
            comments.extend(page.items.into_iter().map(Comment::from));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        comments.truncate(max_results);
        Ok(comments)
    }

    /// Looks up a channel ID from a legacy username, falling back to a handle search.
    pub async fn resolve_channel_id(&self, username: &str) -> Option<String> {
        let name = username.strip_prefix('@').unwrap_or(username);

        match self.lookup_channel_id(name).await {
            Ok(found) => found,
            Err(e) => {
                tracing::error!(username, error = %e, "error resolving channel ID");
                None
            }
        }
    }

    async fn lookup_channel_id(&self, name: &str) -> Result<Option<String>, YouTubeError> {
        let by_username: ListResponse<ChannelItem> = self
            .get_json("channels", &[("part", "id".to_string()), ("forUsername", name.to_string())])
            .await?;
        if let Some(id) = by_username.items.into_iter().find_map(|c| c.id) {
            return Ok(Some(id));
        }

        let search: ListResponse<SearchItem> = self
            .get_json(
                "search",
                &[
                    ("part", "snippet".to_string()),
                    ("q", format!("@{}", name)),
                    ("type", "channel".to_string()),
                    ("maxResults", "1".to_string()),
                ],
            )
            .await?;
        Ok(search.items.into_iter().next().and_then(|item| item.snippet.channel_id))
    }

    async fn get_json<T: DeserializeOwned>(&self, resource: &str, params: &[(&str, String)]) -> Result<T, YouTubeError> {
        with_retry(
            || self.get_once(resource, params),
            self.max_retries,
            self.retry_base_delay,
            resource,
        )
        .await
    }

    async fn get_once<T: DeserializeOwned>(&self, resource: &str, params: &[(&str, String)]) -> Result<T, YouTubeError> {
        let url = format!("{}/{}", self.base_url, resource);

        let response = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(YouTubeError::from_reqwest)?;

        let status = response.status();
        let body = response.text().await.map_err(YouTubeError::from_reqwest)?;

        if !status.is_success() {
            return Err(YouTubeError::Status {
                status: status.as_u16(),
                body: preview(&body),
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| YouTubeError::Decode(format!("{} - response: {}", e, preview(&body))))
    }
}

fn preview(body: &str) -> String {
    body.chars().take(500).collect()
}

async fn with_retry<F, Fut, T>(
    f: F,
    max_retries: u32,
    base_delay: Duration,
    resource: &str,
) -> Result<T, YouTubeError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, YouTubeError>>,
{
    let mut attempt: u32 = 0;
    loop {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) if !e.is_retryable() || attempt >= max_retries => return Err(e),
            Err(e) => {
                let base_ms = base_delay.as_millis() as u64 * (1u64 << attempt.min(2));
                let jitter = {
                    let mut rng = rand::rng();
                    let jitter_range = base_ms / 10;
                    rng.random_range(0..=jitter_range * 2) as i64 - jitter_range as i64
                };
                let delay = (base_ms as i64 + jitter).max(1) as u64;

                attempt += 1;
                tracing::warn!(resource, attempt, max_retries, delay_ms = delay, error = %e, "retrying YouTube request");
                sleep(Duration::from_millis(delay)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn comment_thread_maps_top_level_snippet() {
        let thread: CommentThread = serde_json::from_value(serde_json::json!({
            "snippet": {
                "topLevelComment": {
                    "snippet": {
                        "authorDisplayName": "Ana",
                        "textDisplay": "great video",
                        "publishedAt": "2024-01-02T03:04:05Z",
                        "likeCount": 7
                    }
                }
            }
        }))
        .unwrap();

        assert_eq!(
            Comment::from(thread),
            Comment {
                author: "Ana".into(),
                text: "great video".into(),
                published_at: "2024-01-02T03:04:05Z".into(),
                like_count: 7,
            }
        );
    }

    #[test]
    fn list_without_items_is_empty() {
        let page: ListResponse<PlaylistItem> = serde_json::from_str(r#"{"kind":"youtube#playlistItemListResponse"}"#).unwrap();
        assert!(page.items.is_empty());
        assert!(page.next_page_token.is_none());

        let page: ListResponse<CommentThread> = serde_json::from_str(r#"{"nextPageToken":"t2"}"#).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.next_page_token.as_deref(), Some("t2"));
    }

    #[test]
    fn video_url_uses_watch_link() {
        assert_eq!(video_url("abc123"), "https://www.youtube.com/watch?v=abc123");
    }

    #[tokio::test]
    async fn retry_gives_up_after_max_retries() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), _> = with_retry(
            || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(YouTubeError::Status { status: 503, body: String::new() })
            },
            2,
            Duration::from_millis(1),
            "channels",
        )
        .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn retry_stops_on_client_error() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), _> = with_retry(
            || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(YouTubeError::Status { status: 403, body: "quota".into() })
            },
            3,
            Duration::from_millis(1),
            "channels",
        )
        .await;

        assert!(matches!(result, Err(YouTubeError::Status { status: 403, .. })));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
