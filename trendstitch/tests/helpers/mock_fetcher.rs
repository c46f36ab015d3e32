#![allow(dead_code)]
#![allow(clippy::type_complexity)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::time::{Duration, sleep};
use trendstitch::{Fetcher, Granularity, StitchError, TimeSeries};
use trendstitch_mock::{Cadence, period_starts};

/// Simple in-memory fetcher used by integration tests.
pub struct MockFetcher {
    pub name: &'static str,
    pub available: bool,
    pub value: f64,
    pub cadence: Option<Granularity>,
    pub delay_ms: u64,
    pub error: Option<StitchError>,
    pub calls: AtomicUsize,
    pub fetch_fn: Option<
        Arc<dyn Fn(DateTime<Utc>, DateTime<Utc>) -> Result<TimeSeries, StitchError> + Send + Sync>,
    >,
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self {
            name: "default_mock",
            available: true,
            value: 1.0,
            cadence: None,
            delay_ms: 0,
            error: None,
            calls: AtomicUsize::new(0),
            fetch_fn: None,
        }
    }
}

impl MockFetcher {
    pub fn builder() -> MockFetcherBuilder {
        MockFetcherBuilder {
            inner: Self::default(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub struct MockFetcherBuilder {
    inner: MockFetcher,
}

impl MockFetcherBuilder {
    pub fn name(mut self, name: &'static str) -> Self {
        self.inner.name = name;
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.inner.available = false;
        self
    }

    pub fn returns_constant(mut self, value: f64) -> Self {
        self.inner.value = value;
        self
    }

    pub fn cadence(mut self, g: Granularity) -> Self {
        self.inner.cadence = Some(g);
        self
    }

    pub fn delay_ms(mut self, ms: u64) -> Self {
        self.inner.delay_ms = ms;
        self
    }

    pub fn fails_with(mut self, err: StitchError) -> Self {
        self.inner.error = Some(err);
        self
    }

    pub fn with_fetch_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(DateTime<Utc>, DateTime<Utc>) -> Result<TimeSeries, StitchError>
            + Send
            + Sync
            + 'static,
    {
        self.inner.fetch_fn = Some(Arc::new(f));
        self
    }

    pub fn build(self) -> Arc<MockFetcher> {
        Arc::new(self.inner)
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    fn name(&self) -> &'static str {
        self.name
    }

    fn vendor(&self) -> &'static str {
        "Mock"
    }

    fn is_available(&self) -> bool {
        self.available
    }

    async fn fetch(
        &self,
        _term: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<TimeSeries, StitchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.delay_ms > 0 {
            sleep(Duration::from_millis(self.delay_ms)).await;
        }
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        if let Some(f) = &self.fetch_fn {
            return f(start, end);
        }
        let g = self
            .cadence
            .unwrap_or_else(|| Cadence::default().granularity_for(start, end));
        let stamps = period_starts(g, start, end)?;
        TimeSeries::new(stamps.into_iter().map(|ts| (ts, self.value)).collect())
    }
}
