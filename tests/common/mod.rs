#![allow(dead_code)]

use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ytcrawl::{Config, Crawler, YouTubeClient};

pub const API_KEY: &str = "test-key";

pub fn config(server: &MockServer) -> Config {
    Config::for_base_url(API_KEY, &server.uri())
}

pub fn crawler(server: &MockServer, concurrency: usize) -> Crawler {
    let client = YouTubeClient::new(&config(server)).unwrap();
    Crawler::new(client, concurrency)
}

pub fn channel_body(uploads: &str) -> Value {
    json!({
        "items": [{
            "id": "UC1",
            "contentDetails": { "relatedPlaylists": { "uploads": uploads } }
        }]
    })
}

pub fn playlist_body(video_ids: &[&str], next_page_token: Option<&str>) -> Value {
    let items: Vec<Value> = video_ids
        .iter()
        .map(|id| json!({ "snippet": {}, "contentDetails": { "videoId": id } }))
        .collect();
    match next_page_token {
        Some(token) => json!({ "items": items, "nextPageToken": token }),
        None => json!({ "items": items }),
    }
}

pub fn comments_body(comments: &[(&str, &str)]) -> Value {
    let items: Vec<Value> = comments
        .iter()
        .map(|(author, text)| {
            json!({
                "snippet": {
                    "topLevelComment": {
                        "snippet": {
                            "authorDisplayName": author,
                            "textDisplay": text,
                            "publishedAt": "2024-03-01T12:00:00Z",
                            "likeCount": 2
                        }
                    }
                }
            })
        })
        .collect();
    json!({ "items": items })
}

pub async fn mount_channel(server: &MockServer, channel_id: &str, uploads: &str) {
    Mock::given(method("GET"))
        .and(path("/channels"))
        .and(query_param("id", channel_id))
        .and(query_param("key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(channel_body(uploads)))
        .mount(server)
        .await;
}

pub async fn mount_playlist(server: &MockServer, uploads: &str, video_ids: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("playlistId", uploads))
        .respond_with(ResponseTemplate::new(200).set_body_json(playlist_body(video_ids, None)))
        .mount(server)
        .await;
}

pub async fn mount_comments(server: &MockServer, video_id: &str, comments: &[(&str, &str)]) {
    Mock::given(method("GET"))
        .and(path("/commentThreads"))
        .and(query_param("videoId", video_id))
        .respond_with(ResponseTemplate::new(200).set_body_json(comments_body(comments)))
        .mount(server)
        .await;
}
