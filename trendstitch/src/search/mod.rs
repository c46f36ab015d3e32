//! Stitched search: plan, fetch, reconcile and combine.

mod fetch;
pub mod phase;
pub mod request;
pub mod session;
pub mod util;
mod window;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use trendstitch_core::{
    CombinedSeries, Fetcher, Granularity, ReferenceSelector, SearchReport, StaggerPlan, StitchError,
    StitchWarning, TimeSeries, WindowRef, combine, observed_granularity, plan, resolve,
    scale_stagger_groups,
};

use self::fetch::Window;
use self::phase::SearchPhase;
use self::request::SearchRequest;
use self::session::{AttemptObserver, Session};
use crate::Stitcher;

/// Planning output shared by both execution paths.
struct Planned {
    granularity: Granularity,
    blocks_needed: usize,
    window_length: u32,
    truncated: Window,
}

impl Stitcher {
    /// Run a stitched search.
    ///
    /// Planning errors are reported before any provider is called. A range
    /// that fits one window is fetched directly and returned as-is; longer
    /// ranges are fetched window by window, reconciled when staggered and
    /// combined.
    ///
    /// # Errors
    /// Returns `Planning` for invalid requests and `Fetch` when a window fails
    /// on every provider. No partial result is returned.
    pub async fn search(&self, req: &SearchRequest) -> Result<SearchReport, StitchError> {
        self.run_search(req, None).await
    }

    /// Same as [`Stitcher::search`], forwarding every attempt record and
    /// phase transition to `observer`.
    ///
    /// # Errors
    /// See [`Stitcher::search`].
    pub async fn search_with_observer(
        &self,
        req: &SearchRequest,
        observer: &dyn AttemptObserver,
    ) -> Result<SearchReport, StitchError> {
        self.run_search(req, Some(observer)).await
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "trendstitch::search",
            skip(self, req, observer),
            fields(term = %req.term(), stagger = req.stagger()),
        )
    )]
    async fn run_search(
        &self,
        req: &SearchRequest,
        observer: Option<&dyn AttemptObserver>,
    ) -> Result<SearchReport, StitchError> {
        let mut session = Session::new(req.term(), observer);
        let fetchers = self.ordered()?;
        if fetchers.is_empty() && !self.cfg.dry_run {
            return Err(StitchError::NoProviders(
                "provider policy leaves no fetcher to call".into(),
            ));
        }
        let planned = self.plan_request(req)?;

        let outcome = if planned.blocks_needed <= 1 {
            if req.stagger() > 0 {
                let mut rec =
                    session.record(planned.truncated.start, planned.truncated.end, None);
                rec.warning = Some(StitchWarning::StaggerIgnored {
                    stagger: req.stagger(),
                });
                session.push(rec);
            }
            session.advance(SearchPhase::Fetching { block: 0 });
            self.fetch_window(
                &mut session,
                &fetchers,
                planned.truncated,
                planned.granularity,
            )
            .await
            .map(CombinedSeries::Reduced)
        } else {
            let plan = plan(
                planned.truncated.start,
                planned.truncated.end,
                planned.granularity,
                planned.window_length,
                req.stagger(),
            )?;
            check_reference(req.reference(), plan.len())?;
            self.run_blocks(&mut session, &fetchers, req, &plan, planned.truncated.end)
                .await
        };

        let series = match outcome {
            Ok(series) => series,
            Err(e) => {
                if !e.is_planning() {
                    session.advance(SearchPhase::Failed);
                }
                let _ = session.finish();
                return Err(e);
            }
        };
        check_output_granularity(&mut session, &planned, &series);
        session.advance(SearchPhase::Done);
        let (log, warnings) = session.finish();
        Ok(SearchReport {
            term: req.term().to_string(),
            granularity: planned.granularity,
            blocks_needed: planned.blocks_needed,
            series,
            log,
            warnings,
        })
    }

    fn plan_request(&self, req: &SearchRequest) -> Result<Planned, StitchError> {
        let res = resolve(&self.cfg.rules, req.start(), req.end(), req.granularity())?;
        let window_length = match (req.window_length(), res.max_records) {
            (Some(0), _) => return Err(StitchError::planning("window length must be at least 1")),
            (Some(len), Some(cap)) if len > cap => {
                return Err(StitchError::planning(format!(
                    "window length {len} exceeds the {cap}-record limit for {}",
                    res.granularity
                )));
            }
            (Some(len), _) => len,
            (None, Some(cap)) => cap,
            (None, None) => u32::try_from(res.total_units.max(1)).unwrap_or(u32::MAX),
        };
        let blocks_needed = match (req.granularity(), req.window_length()) {
            (Some(_), Some(len)) => {
                let units = u64::try_from(res.total_units).unwrap_or(0);
                usize::try_from(units.div_ceil(u64::from(len)))
                    .map_err(|_| StitchError::planning("range needs too many windows"))?
                    .max(1)
            }
            _ => res.blocks_needed,
        };
        Ok(Planned {
            granularity: res.granularity,
            blocks_needed,
            window_length,
            truncated: Window {
                start: res.truncated_start,
                end: res.truncated_end,
                block_index: None,
            },
        })
    }

    async fn run_blocks(
        &self,
        session: &mut Session<'_>,
        fetchers: &[Arc<dyn Fetcher>],
        req: &SearchRequest,
        plan: &StaggerPlan,
        end: DateTime<Utc>,
    ) -> Result<CombinedSeries, StitchError> {
        let mut groups: Vec<Vec<TimeSeries>> = vec![Vec::new(); plan.group_count];
        for (i, block) in plan.blocks.iter().enumerate() {
            session.advance(SearchPhase::Fetching { block: i });
            let window = Window {
                start: block.start,
                end: block.end,
                block_index: Some(i),
            };
            let series = self
                .fetch_window(session, fetchers, window, plan.granularity)
                .await?;
            groups[block.group_index].push(series);
        }

        if req.stagger() > 0 && req.scale() && !self.cfg.dry_run {
            session.advance(SearchPhase::Reconciling);
            let reconciled = scale_stagger_groups(&groups, req.method(), req.reference())?;
            for w in reconciled.warnings {
                let target = match &w {
                    StitchWarning::NoOverlap { target, .. }
                    | StitchWarning::DegenerateOverlap { target, .. } => Some(*target),
                    _ => None,
                };
                let (start, end, block_index) = locate(plan, target);
                let mut rec = session.record(start, end, block_index);
                rec.warning = Some(w);
                session.push(rec);
            }
            groups = reconciled.groups;
        }

        // tail windows run past the requested range
        for group in &mut groups {
            for series in group.iter_mut() {
                *series = series.until(end);
            }
        }

        session.advance(SearchPhase::Combining);
        Ok(combine(req.term(), &groups, req.combine_options()))
    }
}

/// Log a `GranularityMismatch` when the output cadence differs from the
/// planned resolution.
fn check_output_granularity(
    session: &mut Session<'_>,
    planned: &Planned,
    output: &CombinedSeries,
) {
    let observed = match output {
        CombinedSeries::Reduced(s) => observed_granularity(s),
        CombinedSeries::Grid(g) => {
            observed_granularity(&TimeSeries::from_unordered(g.rows.iter().map(|r| (r.ts, 0.0))))
        }
    };
    let Some(observed) = observed.filter(|o| *o != planned.granularity) else {
        return;
    };
    let mut rec = session.record(planned.truncated.start, planned.truncated.end, None);
    rec.observed_granularity = Some(observed);
    rec.warning = Some(StitchWarning::GranularityMismatch {
        requested: planned.granularity,
        observed,
    });
    session.push(rec);
}

/// Planned range and position of the window `target` points at, or the whole
/// plan when it is unknown.
fn locate(
    plan: &StaggerPlan,
    target: Option<WindowRef>,
) -> (DateTime<Utc>, DateTime<Utc>, Option<usize>) {
    let found = target.and_then(|t| {
        plan.blocks
            .iter()
            .enumerate()
            .find(|(_, b)| b.window_ref() == t)
    });
    match found {
        Some((i, b)) => (b.start, b.end, Some(i)),
        None => {
            let start = plan.blocks.iter().map(|b| b.start).min();
            let end = plan.blocks.iter().map(|b| b.end).max();
            match (start, end) {
                (Some(s), Some(e)) => (s, e, None),
                _ => (DateTime::UNIX_EPOCH, DateTime::UNIX_EPOCH, None),
            }
        }
    }
}

fn check_reference(reference: ReferenceSelector, windows: usize) -> Result<(), StitchError> {
    match reference {
        ReferenceSelector::Index(i) if i >= windows => Err(StitchError::planning(format!(
            "reference window {i} is out of range for a plan of {windows} windows"
        ))),
        _ => Ok(()),
    }
}
