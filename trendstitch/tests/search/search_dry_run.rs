use trendstitch::{Granularity, SearchRequest, Stitcher};

use crate::helpers::{TERM, dt};

#[tokio::test]
async fn dry_run_zero_fills_every_block() {
    let stitcher = Stitcher::builder().dry_run(true).build().unwrap();

    let req = SearchRequest::builder(TERM)
        .start(dt(2010, 1, 1))
        .duration(620)
        .granularity(Granularity::Day)
        .stagger(1)
        .build()
        .unwrap();
    let report = stitcher.search(&req).await.unwrap();

    assert_eq!(report.log.len(), 7);
    assert!(
        report
            .log
            .iter()
            .all(|r| r.provider_used.as_deref() == Some("dry-run"))
    );
    let series = report.series.as_series().unwrap();
    assert_eq!(series.len(), 621);
    assert!(series.values().all(|v| v == 0.0));
    assert!(report.warnings.is_empty());
}

#[tokio::test]
async fn dry_run_direct_path_uses_the_granularity() {
    let stitcher = Stitcher::builder().dry_run(true).build().unwrap();

    let req = SearchRequest::builder(TERM)
        .start(dt(2010, 1, 1))
        .end(dt(2010, 12, 31))
        .granularity(Granularity::Month)
        .build()
        .unwrap();
    let report = stitcher.search(&req).await.unwrap();

    assert_eq!(report.series.len(), 12);
}
