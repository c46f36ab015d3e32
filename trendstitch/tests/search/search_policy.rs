use trendstitch::{FetcherKey, Granularity, SearchRequest, StitchError, Stitcher};

use crate::helpers::{MockFetcher, TERM, dt};

fn ten_days() -> SearchRequest {
    SearchRequest::builder(TERM)
        .start(dt(2010, 1, 1))
        .end(dt(2010, 1, 10))
        .granularity(Granularity::Day)
        .build()
        .unwrap()
}

const A: FetcherKey = FetcherKey::new("a");
const B: FetcherKey = FetcherKey::new("b");

#[tokio::test]
async fn provider_order_overrides_registration_order() {
    let a = MockFetcher::builder().name("a").build();
    let b = MockFetcher::builder().name("b").build();
    let stitcher = Stitcher::builder()
        .with_fetcher(a.clone())
        .with_fetcher(b.clone())
        .provider_order(&[B, A])
        .build()
        .unwrap();

    let report = stitcher.search(&ten_days()).await.unwrap();

    assert_eq!(a.call_count(), 0);
    assert_eq!(b.call_count(), 1);
    assert_eq!(report.log[0].provider_used.as_deref(), Some("b"));
}

#[tokio::test]
async fn provider_order_is_an_allow_list() {
    let a = MockFetcher::builder()
        .name("a")
        .fails_with(StitchError::provider("a", "down"))
        .build();
    let b = MockFetcher::builder().name("b").build();
    let stitcher = Stitcher::builder()
        .with_fetcher(a)
        .with_fetcher(b.clone())
        .provider_order(&[A])
        .build()
        .unwrap();

    let err = stitcher.search(&ten_days()).await.unwrap_err();

    assert!(matches!(err, StitchError::Fetch { .. }), "{err:?}");
    assert_eq!(b.call_count(), 0);
}

#[tokio::test]
async fn selected_mode_and_single_provider_override() {
    let a = MockFetcher::builder().name("a").build();
    let b = MockFetcher::builder().name("b").build();

    let by_mode = Stitcher::builder()
        .with_fetcher(a.clone())
        .with_fetcher(b.clone())
        .provider_mode("b-first", &[B, A])
        .select_mode("b-first")
        .build()
        .unwrap();
    by_mode.search(&ten_days()).await.unwrap();
    assert_eq!((a.call_count(), b.call_count()), (0, 1));

    let forced = Stitcher::builder()
        .with_fetcher(a.clone())
        .with_fetcher(b.clone())
        .provider_mode("b-first", &[B, A])
        .select_mode("b-first")
        .use_provider(A)
        .build()
        .unwrap();
    forced.search(&ten_days()).await.unwrap();
    assert_eq!((a.call_count(), b.call_count()), (1, 1));
}

#[test]
fn build_rejects_bad_policies() {
    let unknown = Stitcher::builder()
        .with_fetcher(MockFetcher::builder().name("a").build())
        .provider_order(&[FetcherKey::new("missing")])
        .build();
    assert!(matches!(unknown, Err(StitchError::Planning(_))));

    let no_mode = Stitcher::builder()
        .with_fetcher(MockFetcher::builder().name("a").build())
        .select_mode("nope")
        .build();
    assert!(matches!(no_mode, Err(StitchError::Planning(_))));

    let empty = Stitcher::builder().build();
    assert!(matches!(empty, Err(StitchError::Planning(_))));
}

#[test]
fn builder_mirrors_config_fields() {
    let stitcher = Stitcher::builder()
        .with_fetcher(MockFetcher::builder().name("a").build())
        .request_delay(std::time::Duration::from_secs(4))
        .provider_timeout(std::time::Duration::from_secs(9))
        .provider_order(&[A])
        .build()
        .unwrap();

    let cfg = stitcher.config();
    assert_eq!(cfg.request_delay, std::time::Duration::from_secs(4));
    assert_eq!(cfg.provider_timeout, std::time::Duration::from_secs(9));
    assert_eq!(cfg.provider_policy.order, vec!["a".to_string()]);
    assert!(!cfg.dry_run);
}
