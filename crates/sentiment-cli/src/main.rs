//! crowd-sentiment: fetch recent headlines for a keyword and report how the
//! crowd feels about it.
//!
//! Usage:
//!   crowd-sentiment --query Nifty
//!   crowd-sentiment --query "Bank Nifty" --days 3 --page-size 50
//!   crowd-sentiment --json
//!   crowd-sentiment --repeat 3        # later runs are served from the cache

mod render;

use anyhow::Result;
use clap::Parser;
use news_pipeline::{Advisory, PipelineConfig, SentimentPipeline};
use sentiment_core::SortOrder;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "crowd-sentiment", author, version, about, long_about = None)]
struct Cli {
    /// Search keyword (default: NEWS_QUERY or "Nifty")
    #[arg(short, long)]
    query: Option<String>,

    /// NewsAPI key (default: NEWSAPI_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Articles to request, at most 100
    #[arg(long)]
    page_size: Option<u32>,

    /// Days back from today to search
    #[arg(long)]
    days: Option<u32>,

    /// Polarity above +threshold is Positive, below -threshold Negative
    #[arg(long)]
    threshold: Option<f64>,

    #[arg(long)]
    language: Option<String>,

    /// publishedAt, relevancy or popularity
    #[arg(long)]
    sort_by: Option<String>,

    /// Seconds a fetched batch stays fresh; 0 disables the cache
    #[arg(long)]
    cache_ttl: Option<u64>,

    /// HTTP timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    #[arg(long)]
    base_url: Option<String>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Number of top terms to show
    #[arg(long)]
    terms: Option<usize>,

    /// Run the pipeline this many times
    #[arg(long, default_value_t = 1)]
    repeat: u32,
}

impl Cli {
    fn apply(&self, mut config: PipelineConfig) -> Result<PipelineConfig> {
        if let Some(query) = &self.query {
            config.query = query.clone();
        }
        if let Some(key) = &self.api_key {
            config.api_key = Some(key.clone());
        }
        if let Some(page_size) = self.page_size {
            config.page_size = page_size;
        }
        if let Some(days) = self.days {
            config.window_days = days;
        }
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        if let Some(language) = &self.language {
            config.language = language.clone();
        }
        if let Some(sort_by) = &self.sort_by {
            config.sort_by = SortOrder::parse(sort_by)
                .ok_or_else(|| anyhow::anyhow!("unknown sort order '{}'", sort_by))?;
        }
        if let Some(ttl) = self.cache_ttl {
            config.cache_ttl = Duration::from_secs(ttl);
        }
        if let Some(timeout) = self.timeout {
            config.http_timeout = Duration::from_secs(timeout);
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(terms) = self.terms {
            config.top_terms = terms;
        }

        config.validate()?;
        Ok(config)
    }
}

fn init_tracing() {
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "crowd_sentiment=info,news_pipeline=info,newsapi_client=warn".into()
        })
    };

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    // Reports go to stdout; keep logs on stderr.
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter())
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = cli.apply(PipelineConfig::from_env()?)?;

    if !config.has_api_key() {
        let advisory = Advisory::credential_missing();
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&advisory)?);
        } else {
            println!("{}", render::advisory_line(&advisory));
        }
        return Ok(());
    }

    let pipeline = SentimentPipeline::from_config(&config)?;
    let request = config.fetch_request()?;
    tracing::info!(
        "Fetching '{}' from {} to {} ({} articles max)",
        request.query,
        request.window.from,
        request.window.to,
        request.page_size
    );

    for run in 0..cli.repeat.max(1) {
        let report = pipeline.run(&request).await;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            if run > 0 {
                println!();
            }
            print!("{}", render::report_text(&report));
        }
    }

    Ok(())
}
