use std::sync::Arc;

use trendstitch::{Granularity, ReferenceSelector, SearchRequest, StitchError, Stitcher};
use trendstitch_mock::ScriptedFetcher;

use crate::helpers::{TERM, dt};

async fn assert_planning_without_calls(req: SearchRequest) {
    let (fetcher, ctl) = ScriptedFetcher::new_with_controller("scripted");
    let stitcher = Stitcher::builder()
        .with_fetcher(Arc::new(fetcher))
        .build()
        .unwrap();

    let err = stitcher.search(&req).await.unwrap_err();
    assert!(err.is_planning(), "{err:?}");
    assert!(ctl.calls().await.is_empty());
}

#[tokio::test]
async fn reversed_range_fails_before_fetching() {
    let req = SearchRequest::builder(TERM)
        .start(dt(2011, 1, 1))
        .end(dt(2010, 1, 1))
        .build()
        .unwrap();
    assert_planning_without_calls(req).await;
}

#[tokio::test]
async fn window_longer_than_the_cap_is_rejected() {
    let req = SearchRequest::builder(TERM)
        .start(dt(2010, 1, 1))
        .duration(30)
        .granularity(Granularity::Hour)
        .window_length(500)
        .build()
        .unwrap();
    assert_planning_without_calls(req).await;
}

#[tokio::test]
async fn zero_window_length_is_rejected() {
    let req = SearchRequest::builder(TERM)
        .start(dt(2010, 1, 1))
        .duration(400)
        .granularity(Granularity::Day)
        .window_length(0)
        .build()
        .unwrap();
    assert_planning_without_calls(req).await;
}

#[tokio::test]
async fn stagger_that_collapses_groups_is_rejected() {
    let req = SearchRequest::builder(TERM)
        .start(dt(2010, 1, 1))
        .duration(400)
        .granularity(Granularity::Day)
        .stagger(300)
        .build()
        .unwrap();
    assert_planning_without_calls(req).await;
}

#[tokio::test]
async fn reference_index_out_of_range_is_rejected() {
    let req = SearchRequest::builder(TERM)
        .start(dt(2010, 1, 1))
        .duration(620)
        .granularity(Granularity::Day)
        .stagger(1)
        .reference(ReferenceSelector::Index(6))
        .build()
        .unwrap();
    assert_planning_without_calls(req).await;
}

#[tokio::test]
async fn unconfigured_granularity_is_rejected() {
    let req = SearchRequest::builder(TERM)
        .start(dt(2010, 1, 1))
        .duration(4)
        .granularity(Granularity::Quarter)
        .build()
        .unwrap();
    assert_planning_without_calls(req).await;
}

#[test]
fn request_builder_validates_inputs() {
    let blank = SearchRequest::builder("  ")
        .start(dt(2010, 1, 1))
        .duration(3)
        .build();
    assert!(matches!(blank, Err(StitchError::Planning(_))));

    let both = SearchRequest::builder(TERM)
        .start(dt(2010, 1, 1))
        .end(dt(2010, 2, 1))
        .duration(3)
        .build();
    assert!(matches!(both, Err(StitchError::Planning(_))));

    let neither = SearchRequest::builder(TERM).start(dt(2010, 1, 1)).build();
    assert!(matches!(neither, Err(StitchError::Planning(_))));

    let no_start = SearchRequest::builder(TERM).duration(3).build();
    assert!(matches!(no_start, Err(StitchError::Planning(_))));
}

#[test]
fn duration_counts_periods_of_the_granularity() {
    let days = SearchRequest::builder(TERM)
        .start(dt(2010, 1, 1))
        .duration(10)
        .build()
        .unwrap();
    assert_eq!(days.end(), dt(2010, 1, 11));

    let months = SearchRequest::builder(TERM)
        .start(dt(2010, 1, 31))
        .duration(1)
        .granularity(Granularity::Month)
        .build()
        .unwrap();
    assert_eq!(months.end(), dt(2010, 2, 28));

    let hours = SearchRequest::builder(TERM)
        .start(dt(2010, 1, 1))
        .duration(30)
        .granularity(Granularity::Hour)
        .build()
        .unwrap();
    assert_eq!(hours.end(), dt(2010, 1, 2) + chrono::Duration::hours(6));
}
