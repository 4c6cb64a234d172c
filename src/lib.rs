//! Crawl and filter comments from a YouTube channel, over HTTP or the command line.

pub mod api;
pub mod config;
pub mod crawler;
pub mod error;
pub mod filter;
pub mod report;
pub mod youtube;

pub use config::Config;
pub use crawler::{CrawlRequest, CrawlResults, Crawler};
pub use error::{ConfigError, CrawlError, YouTubeError};
pub use youtube::{Comment, Video, YouTubeClient};
