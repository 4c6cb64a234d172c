use serde::ser::{Serialize, SerializeMap, Serializer};
use tokio::task::JoinSet;
use utoipa::ToSchema;

use crate::error::CrawlError;
use crate::filter;
use crate::youtube::{Comment, Video, YouTubeClient};

pub const DEFAULT_MAX_VIDEOS: usize = 50;
pub const DEFAULT_MAX_COMMENTS: usize = 100;

#[derive(Clone, Debug, ToSchema)]
pub struct CrawlRequest {
    /// YouTube channel ID
    pub channel_id: String,
    /// Filter by username
    pub username: Option<String>,
    /// Filter by keywords
    pub keywords: Option<Vec<String>>,
    /// Maximum number of videos to crawl
    #[schema(required = false, default = 50, minimum = 1)]
    pub max_videos: usize,
    /// Maximum comments per video
    #[schema(required = false, default = 100, minimum = 1)]
    pub max_comments: usize,
}

impl CrawlRequest {
    pub fn new(channel_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            username: None,
            keywords: None,
            max_videos: DEFAULT_MAX_VIDEOS,
            max_comments: DEFAULT_MAX_COMMENTS,
        }
    }
}

/// Matching comments keyed by video URL, in upload-playlist order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CrawlResults {
    entries: Vec<(String, Vec<Comment>)>,
}

impl CrawlResults {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Comment])> {
        self.entries.iter().map(|(url, comments)| (url.as_str(), comments.as_slice()))
    }

    pub fn get(&self, url: &str) -> Option<&[Comment]> {
        self.entries
            .iter()
            .find(|(u, _)| u == url)
            .map(|(_, comments)| comments.as_slice())
    }

    /// A repeated URL replaces the earlier comments in place.
    pub(crate) fn push(&mut self, url: String, comments: Vec<Comment>) {
        match self.entries.iter_mut().find(|(u, _)| *u == url) {
            Some(entry) => entry.1 = comments,
            None => self.entries.push((url, comments)),
        }
    }
}

impl Serialize for CrawlResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (url, comments) in &self.entries {
            map.serialize_entry(url, comments)?;
        }
        map.end()
    }
}

#[derive(Clone)]
pub struct Crawler {
    client: YouTubeClient,
    concurrency: usize,
}

impl Crawler {
    pub fn new(client: YouTubeClient, concurrency: usize) -> Self {
        Self {
            client,
            concurrency: concurrency.max(1),
        }
    }

    pub fn client(&self) -> &YouTubeClient {
        &self.client
    }

    /// Crawls the channel's latest videos and keeps the videos with at least one matching comment.
    pub async fn crawl_channel_comments(&self, request: &CrawlRequest) -> Result<CrawlResults, CrawlError> {
        let videos = self
            .client
            .channel_videos(&request.channel_id, request.max_videos)
            .await?;
        tracing::info!(channel_id = %request.channel_id, videos = videos.len(), "fetched channel videos");

        let mut results = CrawlResults::default();
        let mut videos = videos.into_iter().peekable();

        // Fetch a batch of videos concurrently, then the next batch.
        while videos.peek().is_some() {
            let batch: Vec<Video> = videos.by_ref().take(self.concurrency).collect();
            let batch_len = batch.len();

            let mut set: JoinSet<Result<(usize, Video, Vec<Comment>), CrawlError>> = JoinSet::new();
            for (index, video) in batch.into_iter().enumerate() {
                let client = self.client.clone();
                let max_comments = request.max_comments;
                set.spawn(async move {
                    let comments = client.video_comments(&video.video_id, max_comments).await?;
                    Ok((index, video, comments))
                });
            }

            let mut fetched: Vec<Option<(Video, Vec<Comment>)>> = vec![None; batch_len];
            while let Some(joined) = set.join_next().await {
                match joined {
                    Ok(Ok((index, video, comments))) => fetched[index] = Some((video, comments)),
                    Ok(Err(e)) => {
                        set.abort_all();
                        return Err(e);
                    }
                    Err(e) => {
                        set.abort_all();
                        return Err(CrawlError::Join(e));
                    }
                }
            }

            for (video, comments) in fetched.into_iter().flatten() {
                let matching = apply_filters(comments, request);
                tracing::debug!(video_id = %video.video_id, matching = matching.len(), "filtered comments");
                if !matching.is_empty() {
                    results.push(video.url(), matching);
                }
            }
        }

        Ok(results)
    }
}

fn apply_filters(comments: Vec<Comment>, request: &CrawlRequest) -> Vec<Comment> {
    let mut comments = comments;

    if let Some(username) = request.username.as_deref().filter(|u| !u.is_empty()) {
        comments = filter::by_username(comments, username);
    }
    if let Some(keywords) = request.keywords.as_deref().filter(|k| !k.is_empty()) {
        comments = filter::by_keywords(comments, keywords);
    }

    comments
}
