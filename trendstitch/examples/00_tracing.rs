use std::sync::Arc;

use chrono::{TimeZone, Utc};
use trendstitch::{Granularity, SearchRequest, Stitcher};
use trendstitch_mock::TrendFetcher;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Suggested: RUST_LOG=info,trendstitch=debug,trendstitch_core=debug
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
        .try_init();

    let stitcher = Stitcher::builder()
        .with_fetcher(Arc::new(TrendFetcher::new()))
        .build()?;

    let req = SearchRequest::builder("flu shot")
        .start(Utc.with_ymd_and_hms(2010, 1, 1, 0, 0, 0).unwrap())
        .duration(620)
        .granularity(Granularity::Day)
        .stagger(1)
        .build()?;
    let _ = stitcher.search(&req).await?;

    Ok(())
}
