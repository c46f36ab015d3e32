use std::sync::Arc;

use chrono::{TimeZone, Utc};
use trendstitch::{CombineStat, Granularity, ScaleMethod, SearchRequest, Stitcher};
use trendstitch_mock::TrendFetcher;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let stitcher = Stitcher::builder()
        .with_fetcher(Arc::new(TrendFetcher::new().noise(0.05, 7)))
        .build()?;

    let start = Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2017, 6, 30, 0, 0, 0).unwrap();
    let req = SearchRequest::builder("flu shot")
        .start(start)
        .end(end)
        .granularity(Granularity::Day)
        .stagger(2)
        .method(ScaleMethod::Mad)
        .combine(CombineStat::Median)
        .build()?;

    let report = stitcher.search(&req).await?;
    println!(
        "{} windows per group at {}; {} log records",
        report.blocks_needed,
        report.granularity,
        report.log.len()
    );
    if let Some(series) = report.series.as_series() {
        for (ts, v) in series.points().iter().step_by(30) {
            println!("{} {v:>7.2}", ts.date_naive());
        }
    }
    for w in &report.warnings {
        println!("warning: {w}");
    }
    Ok(())
}
