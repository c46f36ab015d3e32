use trendstitch::{Granularity, SearchRequest, StitchError, Stitcher};

use crate::helpers::{MockFetcher, TERM, dt};

fn ten_days() -> SearchRequest {
    SearchRequest::builder(TERM)
        .start(dt(2010, 1, 1))
        .end(dt(2010, 1, 10))
        .granularity(Granularity::Day)
        .build()
        .unwrap()
}

#[tokio::test]
async fn falls_back_when_first_errors() {
    let bad = MockFetcher::builder()
        .name("bad")
        .fails_with(StitchError::provider("bad", "429 too many requests"))
        .build();
    let good = MockFetcher::builder().name("good").returns_constant(7.0).build();
    let stitcher = Stitcher::builder()
        .with_fetcher(bad.clone())
        .with_fetcher(good.clone())
        .build()
        .unwrap();

    let report = stitcher.search(&ten_days()).await.unwrap();

    assert_eq!(bad.call_count(), 1);
    assert_eq!(good.call_count(), 1);
    assert_eq!(report.series.len(), 10);
    assert_eq!(report.log.len(), 2);
    assert_eq!(report.log[0].provider_used.as_deref(), Some("bad"));
    assert!(report.log[0].error.is_some());
    assert_eq!(report.log[1].provider_used.as_deref(), Some("good"));
    assert!(report.log[1].is_clean());
}

#[tokio::test]
async fn first_success_wins() {
    let first = MockFetcher::builder().name("first").returns_constant(1.0).build();
    let second = MockFetcher::builder().name("second").build();
    let stitcher = Stitcher::builder()
        .with_fetcher(first)
        .with_fetcher(second.clone())
        .build()
        .unwrap();

    let report = stitcher.search(&ten_days()).await.unwrap();

    assert_eq!(second.call_count(), 0);
    assert_eq!(report.log.len(), 1);
}

#[tokio::test]
async fn unavailable_providers_are_skipped_and_logged() {
    let keyless = MockFetcher::builder().name("keyless").unavailable().build();
    let good = MockFetcher::builder().name("good").build();
    let stitcher = Stitcher::builder()
        .with_fetcher(keyless.clone())
        .with_fetcher(good)
        .build()
        .unwrap();

    let report = stitcher.search(&ten_days()).await.unwrap();

    assert_eq!(keyless.call_count(), 0);
    assert_eq!(report.log.len(), 2);
    assert_eq!(report.log[0].provider_used.as_deref(), Some("keyless"));
    assert!(report.log[0].error.is_some());
}

#[tokio::test]
async fn no_available_provider_is_a_fetch_error() {
    let keyless = MockFetcher::builder().name("keyless").unavailable().build();
    let stitcher = Stitcher::builder().with_fetcher(keyless).build().unwrap();

    let err = stitcher.search(&ten_days()).await.unwrap_err();

    match err {
        StitchError::Fetch { reason, .. } => {
            assert!(matches!(*reason, StitchError::NoProviders(_)), "{reason:?}");
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn all_failures_are_collected() {
    let a = MockFetcher::builder()
        .name("a")
        .fails_with(StitchError::data("empty response"))
        .build();
    let b = MockFetcher::builder()
        .name("b")
        .fails_with(StitchError::provider("b", "blocked"))
        .build();
    let stitcher = Stitcher::builder()
        .with_fetcher(a)
        .with_fetcher(b)
        .build()
        .unwrap();

    let err = stitcher.search(&ten_days()).await.unwrap_err();

    let StitchError::Fetch {
        block_index,
        reason,
        ..
    } = err
    else {
        panic!("expected a fetch error");
    };
    assert_eq!(block_index, 0);
    assert_eq!(
        (*reason).flatten(),
        vec![
            StitchError::provider("a", "data issue: empty response"),
            StitchError::provider("b", "blocked"),
        ]
    );
}
