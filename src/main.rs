use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;

use ytcrawl::api::{self, AppState};
use ytcrawl::crawler::{DEFAULT_MAX_COMMENTS, DEFAULT_MAX_VIDEOS};
use ytcrawl::{Config, ConfigError, CrawlRequest, Crawler, YouTubeClient, report};

#[derive(Parser)]
#[command(name = "ytcrawl")]
#[command(about = "YouTube comment crawler", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Bind address (overrides HOST)
        #[arg(long)]
        host: Option<String>,

        /// Listen port (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Crawl a channel and print matching comments
    Crawl {
        /// YouTube channel ID
        #[arg(long, alias = "channel_id")]
        channel_id: String,

        /// Filter comments by author name
        #[arg(short, long)]
        username: Option<String>,

        /// Filter comments by keywords
        #[arg(short, long, num_args = 1..)]
        keywords: Vec<String>,

        /// Maximum number of videos to check
        #[arg(long, alias = "max_videos", default_value_t = DEFAULT_MAX_VIDEOS, value_parser = positive)]
        max_videos: usize,

        /// Maximum number of comments per video
        #[arg(long, alias = "max_comments", default_value_t = DEFAULT_MAX_COMMENTS, value_parser = positive)]
        max_comments: usize,

        /// Print results as JSON instead of a report
        #[arg(long)]
        json: bool,
    },

    /// Look up a channel ID from a username or @handle
    Resolve {
        /// Username or @handle
        handle: String,
    },
}

fn positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("{} is not a positive integer", s)),
    }
}

const API_KEY_HELP: &str = "\
To set the API key you can:
1. Set the YOUTUBE_API_KEY environment variable:
   - Linux/Mac: export YOUTUBE_API_KEY='your_api_key'
   - Windows (cmd): set YOUTUBE_API_KEY=your_api_key
   - Windows (PowerShell): $env:YOUTUBE_API_KEY='your_api_key'

2. Or create a .env file in the project directory containing:
   YOUTUBE_API_KEY=your_api_key";

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e @ ConfigError::MissingApiKey) => {
            eprintln!("Error: {}\n\n{}", e, API_KEY_HELP);
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(cli.command, config).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, mut config: Config) -> Result<ExitCode> {
    let client = YouTubeClient::new(&config)?;
    let crawler = Crawler::new(client, config.concurrency);

    match command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            tracing::info!(
                base_url = %config.base_url,
                concurrency = config.concurrency,
                "YouTube Comment Crawler API starting"
            );

            let state = Arc::new(AppState::new(crawler));
            api::serve(&config, state).await.context("server error")?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Crawl {
            channel_id,
            username,
            keywords,
            max_videos,
            max_comments,
            json,
        } => {
            let request = CrawlRequest {
                channel_id,
                username,
                keywords: (!keywords.is_empty()).then_some(keywords),
                max_videos,
                max_comments,
            };
            let results = crawler.crawl_channel_comments(&request).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                print!("{}", report::render(&results));
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Resolve { handle } => match crawler.client().resolve_channel_id(&handle).await {
            Some(channel_id) => {
                println!("{}", channel_id);
                Ok(ExitCode::SUCCESS)
            }
            None => {
                eprintln!("No channel found for {}", handle);
                Ok(ExitCode::FAILURE)
            }
        },
    }
}
