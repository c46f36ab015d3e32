use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use trendstitch::{FetcherKey, SearchRequest, StitchError, Stitcher};
use trendstitch_mock::{ConstantFetcher, MockBehavior, ScriptedFetcher, SincFetcher};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A flaky primary that fails its first call, then behaves.
    let (flaky, ctl) = ScriptedFetcher::new_with_controller("flaky");
    ctl.push(MockBehavior::Fail(StitchError::provider("flaky", "429 too many requests")))
        .await;

    let stitcher = Stitcher::builder()
        .with_fetcher(Arc::new(flaky))
        .with_fetcher(Arc::new(SincFetcher::new()))
        .with_fetcher(Arc::new(ConstantFetcher::new(50.0).named("offline")))
        .provider_mode("safe", &[FetcherKey::new("mock-sinc")])
        .request_delay(Duration::from_millis(250))
        .provider_timeout(Duration::from_secs(5))
        .build()?;

    let req = SearchRequest::builder("flu shot")
        .start(Utc.with_ymd_and_hms(2019, 3, 1, 0, 0, 0).unwrap())
        .duration(60)
        .build()?;
    let report = stitcher.search(&req).await?;
    for r in &report.log {
        println!(
            "{} -> {}: provider={:?} error={:?}",
            r.planned_start.date_naive(),
            r.planned_end.date_naive(),
            r.provider_used,
            r.error.as_ref().map(ToString::to_string),
        );
    }

    let safe = Stitcher::builder()
        .with_fetcher(Arc::new(SincFetcher::new()))
        .provider_mode("safe", &[FetcherKey::new("mock-sinc")])
        .select_mode("safe")
        .build()?;
    let report = safe.search(&req).await?;
    println!("safe mode returned {} points", report.series.len());
    Ok(())
}
