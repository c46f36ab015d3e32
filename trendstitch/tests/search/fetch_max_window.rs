use trendstitch::{Granularity, StitchError, Stitcher};

use crate::helpers::{MockFetcher, TERM, dt};

fn stitcher_with(f: std::sync::Arc<MockFetcher>) -> Stitcher {
    Stitcher::builder().with_fetcher(f).build().unwrap()
}

#[tokio::test]
async fn daily_window_holds_the_full_cap() {
    let s = stitcher_with(MockFetcher::builder().name("m").build());

    let series = s
        .fetch_max_window(TERM, dt(2010, 1, 15), Granularity::Day)
        .await
        .unwrap();

    assert_eq!(series.len(), 270);
    assert_eq!(series.span(), Some((dt(2010, 1, 15), dt(2010, 10, 11))));
}

#[tokio::test]
async fn weekly_and_hourly_windows() {
    let s = stitcher_with(MockFetcher::builder().name("m").build());

    let weekly = s
        .fetch_max_window(TERM, dt(2010, 1, 15), Granularity::Week)
        .await
        .unwrap();
    assert_eq!(weekly.len(), 271);
    assert_eq!(weekly.points()[0].0, dt(2010, 1, 10));

    let hourly = s
        .fetch_max_window(TERM, dt(2010, 1, 15), Granularity::Hour)
        .await
        .unwrap();
    assert_eq!(hourly.len(), 192);
}

#[tokio::test]
async fn unlimited_granularity_is_rejected() {
    let f = MockFetcher::builder().name("m").build();
    let s = stitcher_with(f.clone());

    let err = s
        .fetch_max_window(TERM, dt(2010, 1, 15), Granularity::Month)
        .await
        .unwrap_err();

    assert!(err.is_planning(), "{err:?}");
    assert_eq!(f.call_count(), 0);
}

#[tokio::test]
async fn cadence_mismatch_is_a_data_error() {
    let s = stitcher_with(
        MockFetcher::builder()
            .name("m")
            .cadence(Granularity::Week)
            .build(),
    );

    let err = s
        .fetch_max_window(TERM, dt(2010, 1, 15), Granularity::Day)
        .await
        .unwrap_err();

    assert!(matches!(err, StitchError::Data(_)), "{err:?}");
}

#[tokio::test]
async fn short_response_is_a_data_error() {
    let s = stitcher_with(
        MockFetcher::builder()
            .name("m")
            .with_fetch_fn(|start, _end| {
                trendstitch::TimeSeries::new(
                    (0..10)
                        .map(|d| (start + chrono::Duration::days(d), 1.0))
                        .collect(),
                )
            })
            .build(),
    );

    let err = s
        .fetch_max_window(TERM, dt(2010, 1, 15), Granularity::Day)
        .await
        .unwrap_err();

    match err {
        StitchError::Data(msg) => assert!(msg.contains("270"), "{msg}"),
        other => panic!("unexpected: {other:?}"),
    }
}
