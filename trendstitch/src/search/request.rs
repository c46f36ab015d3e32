use chrono::{DateTime, Utc};
use trendstitch_core::{
    CombineOptions, CombineStat, Granularity, ReferenceSelector, ScaleMethod, StitchError, calendar,
};

/// A validated stitched-search request.
///
/// Construct with [`SearchRequest::builder`]. Range validation against the
/// granularity rules happens when the request is searched, before any
/// provider is called.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    term: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    granularity: Option<Granularity>,
    window_length: Option<u32>,
    stagger: usize,
    scale: bool,
    method: ScaleMethod,
    reference: ReferenceSelector,
    combine: CombineOptions,
}

impl SearchRequest {
    /// Start building a request for `term`.
    #[must_use]
    pub fn builder(term: impl Into<String>) -> SearchRequestBuilder {
        SearchRequestBuilder::new(term)
    }

    /// Search term.
    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Requested range start.
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Requested range end (inclusive).
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Explicit granularity, or `None` to auto-select.
    #[must_use]
    pub const fn granularity(&self) -> Option<Granularity> {
        self.granularity
    }

    /// Window length override in periods.
    #[must_use]
    pub const fn window_length(&self) -> Option<u32> {
        self.window_length
    }

    /// Number of extra offset groups.
    #[must_use]
    pub const fn stagger(&self) -> usize {
        self.stagger
    }

    /// Whether overlapping windows are reconciled.
    #[must_use]
    pub const fn scale(&self) -> bool {
        self.scale
    }

    /// Reconciliation objective.
    #[must_use]
    pub const fn method(&self) -> ScaleMethod {
        self.method
    }

    /// Window that keeps its scale during reconciliation.
    #[must_use]
    pub const fn reference(&self) -> ReferenceSelector {
        self.reference
    }

    /// Combining options.
    #[must_use]
    pub const fn combine_options(&self) -> CombineOptions {
        self.combine
    }
}

/// Builder for [`SearchRequest`].
///
/// Defaults: no stagger, trim, scale, median combine, final scale, round to 2
/// decimals, MAD, first window as reference.
#[derive(Debug, Clone)]
pub struct SearchRequestBuilder {
    term: String,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    duration: Option<u32>,
    granularity: Option<Granularity>,
    window_length: Option<u32>,
    stagger: usize,
    scale: bool,
    method: ScaleMethod,
    reference: ReferenceSelector,
    combine: CombineOptions,
}

impl SearchRequestBuilder {
    /// New builder for `term` with default options.
    #[must_use]
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            start: None,
            end: None,
            duration: None,
            granularity: None,
            window_length: None,
            stagger: 0,
            scale: true,
            method: ScaleMethod::default(),
            reference: ReferenceSelector::default(),
            combine: CombineOptions::default(),
        }
    }

    /// Range start.
    #[must_use]
    pub const fn start(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    /// Inclusive range end. Mutually exclusive with `duration`.
    #[must_use]
    pub const fn end(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    /// Derive the end as `start + n` periods of the requested granularity
    /// (days when auto-selecting). Mutually exclusive with `end`.
    #[must_use]
    pub const fn duration(mut self, n: u32) -> Self {
        self.duration = Some(n);
        self
    }

    /// Sampling resolution; unset means auto-select from the rules.
    #[must_use]
    pub const fn granularity(mut self, g: Granularity) -> Self {
        self.granularity = Some(g);
        self
    }

    /// Periods per fetch window; must not exceed the rule's record cap.
    #[must_use]
    pub const fn window_length(mut self, len: u32) -> Self {
        self.window_length = Some(len);
        self
    }

    /// Extra offset groups used to over-sample the range.
    #[must_use]
    pub const fn stagger(mut self, stagger: usize) -> Self {
        self.stagger = stagger;
        self
    }

    /// Drop timestamps not covered by every group.
    #[must_use]
    pub const fn trim(mut self, yes: bool) -> Self {
        self.combine.trim = yes;
        self
    }

    /// Reconcile overlapping windows.
    #[must_use]
    pub const fn scale(mut self, yes: bool) -> Self {
        self.scale = yes;
        self
    }

    /// Per-timestamp reduction across groups.
    #[must_use]
    pub const fn combine(mut self, stat: CombineStat) -> Self {
        self.combine.stat = stat;
        self
    }

    /// Rescale the combined output so its maximum is 100.
    #[must_use]
    pub const fn final_scale(mut self, yes: bool) -> Self {
        self.combine.final_scale = yes;
        self
    }

    /// Decimal places to round to; `None` keeps full precision.
    #[must_use]
    pub const fn round(mut self, digits: Option<u32>) -> Self {
        self.combine.round_digits = digits;
        self
    }

    /// Reconciliation objective.
    #[must_use]
    pub const fn method(mut self, method: ScaleMethod) -> Self {
        self.method = method;
        self
    }

    /// Window that keeps its scale during reconciliation.
    #[must_use]
    pub const fn reference(mut self, reference: ReferenceSelector) -> Self {
        self.reference = reference;
        self
    }

    /// Validate and build the request.
    ///
    /// # Errors
    /// Returns `Planning` for a blank term, a missing start, or when not
    /// exactly one of `end` and `duration` is set.
    pub fn build(self) -> Result<SearchRequest, StitchError> {
        if self.term.trim().is_empty() {
            return Err(StitchError::planning("search term must not be empty"));
        }
        let start = self
            .start
            .ok_or_else(|| StitchError::planning("start date is required"))?;
        let end = match (self.end, self.duration) {
            (Some(end), None) => end,
            (None, Some(n)) => {
                let cal = calendar(self.granularity.unwrap_or(Granularity::Day));
                (cal.advance)(start, i64::from(n)).ok_or_else(|| {
                    StitchError::planning(format!("duration of {n} periods overflows"))
                })?
            }
            (Some(_), Some(_)) => {
                return Err(StitchError::planning(
                    "end and duration are mutually exclusive",
                ));
            }
            (None, None) => {
                return Err(StitchError::planning("either end or duration is required"));
            }
        };
        Ok(SearchRequest {
            term: self.term,
            start,
            end,
            granularity: self.granularity,
            window_length: self.window_length,
            stagger: self.stagger,
            scale: self.scale,
            method: self.method,
            reference: self.reference,
            combine: self.combine,
        })
    }
}
