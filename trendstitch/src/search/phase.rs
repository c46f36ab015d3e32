use std::fmt;

/// Lifecycle of one search call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    /// Validating the request, resolving granularity and planning windows.
    Planning,
    /// Fetching the window at this position in the plan.
    Fetching {
        /// Flattened plan position.
        block: usize,
    },
    /// Aligning overlapping windows.
    Reconciling,
    /// Merging groups into the final output.
    Combining,
    /// Report produced.
    Done,
    /// A window failed on every provider.
    Failed,
}

impl SearchPhase {
    /// Whether `next` may follow `self`.
    #[must_use]
    pub const fn can_advance_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Planning, Self::Fetching { block }) => block == 0,
            (Self::Fetching { block: a }, Self::Fetching { block: b }) => b == a + 1,
            (Self::Fetching { .. }, Self::Reconciling | Self::Combining | Self::Done | Self::Failed)
            | (Self::Reconciling, Self::Combining)
            | (Self::Combining, Self::Done) => true,
            _ => false,
        }
    }

    /// True for `Done` and `Failed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for SearchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Planning => f.write_str("planning"),
            Self::Fetching { block } => write!(f, "fetching[{block}]"),
            Self::Reconciling => f.write_str("reconciling"),
            Self::Combining => f.write_str("combining"),
            Self::Done => f.write_str("done"),
            Self::Failed => f.write_str("failed"),
        }
    }
}
