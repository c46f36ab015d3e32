use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use trendstitch::{Granularity, SearchRequest, StitchError, Stitcher};
use trendstitch_mock::{MockBehavior, ScriptedFetcher};

use crate::helpers::{MockFetcher, TERM, dt};

fn four_hundred_days() -> SearchRequest {
    SearchRequest::builder(TERM)
        .start(dt(2010, 1, 1))
        .duration(400)
        .granularity(Granularity::Day)
        .build()
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn delay_separates_successive_provider_calls() {
    let f = MockFetcher::builder().name("m").build();
    let stitcher = Stitcher::builder()
        .with_fetcher(f.clone())
        .request_delay(Duration::from_secs(4))
        .build()
        .unwrap();

    let started = Instant::now();
    stitcher.search(&four_hundred_days()).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(f.call_count(), 2);
    assert!(elapsed >= Duration::from_secs(4), "{elapsed:?}");
    assert!(elapsed < Duration::from_secs(8), "{elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn no_delay_before_the_first_call() {
    let f = MockFetcher::builder().name("m").build();
    let stitcher = Stitcher::builder()
        .with_fetcher(f)
        .request_delay(Duration::from_secs(30))
        .build()
        .unwrap();

    let req = SearchRequest::builder(TERM)
        .start(dt(2010, 1, 1))
        .end(dt(2010, 1, 10))
        .granularity(Granularity::Day)
        .build()
        .unwrap();
    let started = Instant::now();
    stitcher.search(&req).await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn fallback_attempts_are_paced_too() {
    let bad = MockFetcher::builder()
        .name("bad")
        .fails_with(StitchError::provider("bad", "down"))
        .build();
    let good = MockFetcher::builder().name("good").build();
    let stitcher = Stitcher::builder()
        .with_fetcher(bad)
        .with_fetcher(good)
        .request_delay(Duration::from_secs(2))
        .build()
        .unwrap();

    let started = Instant::now();
    stitcher.search(&four_hundred_days()).await.unwrap();

    // bad, good, bad, good: three pauses.
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(6), "{elapsed:?}");
    assert!(elapsed < Duration::from_secs(8), "{elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn hanging_provider_times_out() {
    let (fetcher, ctl) = ScriptedFetcher::new_with_controller("slow");
    ctl.push(MockBehavior::Hang).await;
    let stitcher = Stitcher::builder()
        .with_fetcher(Arc::new(fetcher))
        .provider_timeout(Duration::from_millis(50))
        .build()
        .unwrap();

    let req = SearchRequest::builder(TERM)
        .start(dt(2010, 1, 1))
        .end(dt(2010, 1, 10))
        .granularity(Granularity::Day)
        .build()
        .unwrap();
    let err = stitcher.search(&req).await.unwrap_err();

    let StitchError::Fetch { reason, .. } = err else {
        panic!("expected a fetch error");
    };
    assert_eq!(*reason, StitchError::provider_timeout("slow"));
}

#[tokio::test(start_paused = true)]
async fn timed_out_provider_falls_back() {
    let slow = MockFetcher::builder().name("slow").delay_ms(5_000).build();
    let fast = MockFetcher::builder().name("fast").build();
    let stitcher = Stitcher::builder()
        .with_fetcher(slow)
        .with_fetcher(fast)
        .provider_timeout(Duration::from_millis(100))
        .build()
        .unwrap();

    let req = SearchRequest::builder(TERM)
        .start(dt(2010, 1, 1))
        .end(dt(2010, 1, 10))
        .granularity(Granularity::Day)
        .build()
        .unwrap();
    let report = tokio_test::assert_ok!(stitcher.search(&req).await);

    assert_eq!(
        report.log[0].error,
        Some(StitchError::provider_timeout("slow"))
    );
    assert_eq!(report.log[1].provider_used.as_deref(), Some("fast"));
}
