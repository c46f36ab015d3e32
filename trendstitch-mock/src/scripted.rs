use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use trendstitch_core::{Fetcher, StitchError, TimeSeries};

use crate::signal::{Cadence, period_starts};

/// Outcome of one scripted call.
#[derive(Clone, Debug)]
pub enum MockBehavior {
    /// Return the provided series.
    Return(TimeSeries),
    /// Fill the requested window with a constant at the automatic cadence.
    Constant(f64),
    /// Fail immediately with the provided error.
    Fail(StitchError),
    /// Hang indefinitely (simulate a timeout).
    Hang,
}

/// One call observed by a [`ScriptedFetcher`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedCall {
    /// Search term.
    pub term: String,
    /// Requested start.
    pub start: DateTime<Utc>,
    /// Requested end.
    pub end: DateTime<Utc>,
}

struct ScriptState {
    queue: VecDeque<MockBehavior>,
    fallback: MockBehavior,
    calls: Vec<RecordedCall>,
}

/// Controller handle used by tests to drive a [`ScriptedFetcher`].
#[derive(Clone)]
pub struct ScriptController {
    state: Arc<Mutex<ScriptState>>,
    available: Arc<AtomicBool>,
}

impl ScriptController {
    /// Queue the outcome of the next unscripted call.
    pub async fn push(&self, behavior: MockBehavior) {
        self.state.lock().await.queue.push_back(behavior);
    }

    /// Outcome used once the queue is empty.
    pub async fn set_fallback(&self, behavior: MockBehavior) {
        self.state.lock().await.fallback = behavior;
    }

    /// Toggle what `is_available` reports.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Calls observed so far, oldest first.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().await.calls.clone()
    }
}

/// Fetcher whose outcomes are scripted by a [`ScriptController`].
pub struct ScriptedFetcher {
    name: &'static str,
    state: Arc<Mutex<ScriptState>>,
    available: Arc<AtomicBool>,
}

impl ScriptedFetcher {
    /// New scripted fetcher that returns a constant `1.0` until scripted otherwise.
    #[must_use]
    pub fn new_with_controller(name: &'static str) -> (Self, ScriptController) {
        let state = Arc::new(Mutex::new(ScriptState {
            queue: VecDeque::new(),
            fallback: MockBehavior::Constant(1.0),
            calls: Vec::new(),
        }));
        let available = Arc::new(AtomicBool::new(true));
        let controller = ScriptController {
            state: Arc::clone(&state),
            available: Arc::clone(&available),
        };
        (
            Self {
                name,
                state,
                available,
            },
            controller,
        )
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    fn name(&self) -> &'static str {
        self.name
    }

    fn vendor(&self) -> &'static str {
        "Mock"
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn fetch(
        &self,
        term: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<TimeSeries, StitchError> {
        let behavior = {
            let mut guard = self.state.lock().await;
            guard.calls.push(RecordedCall {
                term: term.to_string(),
                start,
                end,
            });
            let fallback = guard.fallback.clone();
            guard.queue.pop_front().unwrap_or(fallback)
        };
        match behavior {
            MockBehavior::Return(series) => Ok(series),
            MockBehavior::Constant(value) => {
                let g = Cadence::default().granularity_for(start, end);
                let stamps = period_starts(g, start, end)?;
                TimeSeries::new(stamps.into_iter().map(|ts| (ts, value)).collect())
            }
            MockBehavior::Fail(err) => Err(err),
            MockBehavior::Hang => {
                std::future::pending::<()>().await;
                Err(StitchError::provider(self.name, "unreachable"))
            }
        }
    }
}
