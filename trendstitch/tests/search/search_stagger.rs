use std::sync::Arc;

use chrono::Duration;
use trendstitch::{
    CombineStat, CombinedSeries, Granularity, ReferenceSelector, ScaleMethod, SearchRequest,
    Stitcher,
};
use trendstitch_mock::{ScriptedFetcher, TrendFetcher, trend_signal};

use crate::helpers::{TERM, dt, plus_days};

fn request(stagger: usize) -> SearchRequest {
    let start = dt(2010, 1, 1);
    SearchRequest::builder(TERM)
        .start(start)
        .end(plus_days(start, 620))
        .granularity(Granularity::Day)
        .stagger(stagger)
        .build()
        .unwrap()
}

#[tokio::test]
async fn stagger_one_offsets_groups_by_half_a_window() {
    let (fetcher, ctl) = ScriptedFetcher::new_with_controller("scripted");
    let stitcher = Stitcher::builder()
        .with_fetcher(Arc::new(fetcher))
        .build()
        .unwrap();

    let report = stitcher.search(&request(1)).await.unwrap();
    assert_eq!(report.blocks_needed, 3);

    let calls = ctl.calls().await;
    // The leading group carries one extra window.
    assert_eq!(calls.len(), 7);
    assert_eq!(calls[0].start, dt(2009, 8, 19));
    assert_eq!(calls[4].start, dt(2010, 1, 1));
    assert_eq!(calls[4].start - calls[0].start, Duration::days(135));
    for call in &calls {
        assert_eq!(call.end - call.start, Duration::days(269));
    }
    for pair in calls[..4].windows(2).chain(calls[4..].windows(2)) {
        assert_eq!(pair[1].start - pair[0].start, Duration::days(270));
    }
    assert!(calls[3].end >= dt(2011, 9, 13));
    assert!(calls[6].end >= dt(2011, 9, 13));
    assert!(report.warnings.is_empty());
}

#[tokio::test]
async fn reconciled_windows_recover_the_underlying_shape() {
    let stitcher = Stitcher::builder()
        .with_fetcher(Arc::new(TrendFetcher::new()))
        .build()
        .unwrap();

    let req = SearchRequest::builder(TERM)
        .start(dt(2010, 1, 1))
        .duration(620)
        .granularity(Granularity::Day)
        .stagger(1)
        .round(None)
        .build()
        .unwrap();
    let report = stitcher.search(&req).await.unwrap();

    let series = report.series.as_series().unwrap();
    assert_eq!(series.len(), 621);
    let max = series.values().fold(f64::MIN, f64::max);
    assert!((max - 100.0).abs() < 1e-9);

    // The stitched output is the global signal up to one scale factor; the
    // rounding done by the fetcher bounds the error.
    let signal_max = series
        .timestamps()
        .map(trend_signal)
        .fold(f64::MIN, f64::max);
    for (ts, v) in series.points() {
        let expected = trend_signal(*ts) / signal_max * 100.0;
        assert!((v - expected).abs() < 0.5, "{ts}: {v} vs {expected}");
    }
}

#[tokio::test]
async fn unreduced_grid_keeps_one_column_per_group() {
    let stitcher = Stitcher::builder()
        .with_fetcher(Arc::new(TrendFetcher::new()))
        .build()
        .unwrap();

    let req = SearchRequest::builder(TERM)
        .start(dt(2010, 1, 1))
        .duration(620)
        .granularity(Granularity::Day)
        .stagger(1)
        .combine(CombineStat::None)
        .trim(false)
        .method(ScaleMethod::Ssd)
        .reference(ReferenceSelector::Last)
        .build()
        .unwrap();
    let report = stitcher.search(&req).await.unwrap();

    let CombinedSeries::Grid(grid) = report.series else {
        panic!("expected a grid");
    };
    assert_eq!(grid.columns, vec!["flu_shot_1", "flu_shot_2"]);
    // Untrimmed: group 0 starts 135 days early.
    assert_eq!(grid.len(), 621 + 135);
    assert_eq!(grid.rows[0].ts, dt(2009, 8, 19));
    assert_eq!(grid.rows[0].values[1], None);
}

#[tokio::test]
async fn scale_off_skips_reconciliation() {
    let stitcher = Stitcher::builder()
        .with_fetcher(Arc::new(TrendFetcher::new()))
        .build()
        .unwrap();

    let req = SearchRequest::builder(TERM)
        .start(dt(2010, 1, 1))
        .duration(620)
        .granularity(Granularity::Day)
        .stagger(1)
        .scale(false)
        .combine(CombineStat::None)
        .final_scale(false)
        .build()
        .unwrap();
    let report = stitcher.search(&req).await.unwrap();

    // Every window was normalized on its own, so both anchor windows that lie
    // wholly inside the range reach 100.
    let grid = report.series.as_grid().unwrap();
    let hundreds = grid
        .column("flu_shot_2")
        .unwrap()
        .filter(|v| *v == Some(100.0))
        .count();
    assert!(hundreds >= 2, "{hundreds}");
}
