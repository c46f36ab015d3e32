use std::sync::Arc;

use trendstitch::{Granularity, SearchPhase, SearchRequest, StitchError, Stitcher};
use trendstitch_mock::{MockBehavior, ScriptedFetcher};

use crate::helpers::{RecordingObserver, TERM, dt};

fn request(stagger: usize) -> SearchRequest {
    SearchRequest::builder(TERM)
        .start(dt(2010, 1, 1))
        .duration(400)
        .granularity(Granularity::Day)
        .stagger(stagger)
        .build()
        .unwrap()
}

#[tokio::test]
async fn observer_sees_every_record_and_phase() {
    let (fetcher, _ctl) = ScriptedFetcher::new_with_controller("scripted");
    let stitcher = Stitcher::builder()
        .with_fetcher(Arc::new(fetcher))
        .build()
        .unwrap();
    let observer = RecordingObserver::default();

    let report = stitcher
        .search_with_observer(&request(0), &observer)
        .await
        .unwrap();

    assert_eq!(observer.records(), report.log);
    assert_eq!(
        observer.phases(),
        vec![
            SearchPhase::Fetching { block: 0 },
            SearchPhase::Fetching { block: 1 },
            SearchPhase::Combining,
            SearchPhase::Done,
        ]
    );
}

#[tokio::test]
async fn staggered_search_passes_through_reconciling() {
    let (fetcher, _ctl) = ScriptedFetcher::new_with_controller("scripted");
    let stitcher = Stitcher::builder()
        .with_fetcher(Arc::new(fetcher))
        .build()
        .unwrap();
    let observer = RecordingObserver::default();

    stitcher
        .search_with_observer(&request(1), &observer)
        .await
        .unwrap();

    let phases = observer.phases();
    let tail = &phases[phases.len() - 3..];
    assert_eq!(
        tail,
        [
            SearchPhase::Reconciling,
            SearchPhase::Combining,
            SearchPhase::Done
        ]
    );
}

#[tokio::test]
async fn failure_ends_in_failed_phase() {
    let (fetcher, ctl) = ScriptedFetcher::new_with_controller("scripted");
    ctl.set_fallback(MockBehavior::Fail(StitchError::provider("scripted", "down")))
        .await;
    let stitcher = Stitcher::builder()
        .with_fetcher(Arc::new(fetcher))
        .build()
        .unwrap();
    let observer = RecordingObserver::default();

    let err = stitcher
        .search_with_observer(&request(0), &observer)
        .await
        .unwrap_err();

    assert!(matches!(err, StitchError::Fetch { block_index: 0, .. }));
    assert_eq!(
        observer.phases(),
        vec![SearchPhase::Fetching { block: 0 }, SearchPhase::Failed]
    );
    assert_eq!(observer.records().len(), 1);
    assert!(observer.records()[0].error.is_some());
}
