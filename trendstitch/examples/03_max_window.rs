use std::sync::Arc;

use chrono::{TimeZone, Utc};
use trendstitch::{Granularity, Stitcher};
use trendstitch_mock::SincFetcher;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let stitcher = Stitcher::builder()
        .with_fetcher(Arc::new(SincFetcher::new()))
        .build()?;

    let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    for g in [Granularity::Hour, Granularity::Day, Granularity::Week] {
        let series = stitcher.fetch_max_window("flu shot", start, g).await?;
        let (first, last) = series.span().unwrap_or((start, start));
        println!("{g}: {} records, {first} .. {last}", series.len());
    }

    // Month has no record limit, so there is no maximal window to fetch.
    if let Err(e) = stitcher
        .fetch_max_window("flu shot", start, Granularity::Month)
        .await
    {
        println!("month: {e}");
    }
    Ok(())
}
