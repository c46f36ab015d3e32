use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use trendstitch_core::{Fetcher, FetcherKey};
use trendstitch_types::{GranularityRules, StitchConfig, StitchError};

/// Orchestrator that plans, fetches, reconciles and combines searches.
///
/// A `Stitcher` holds only configuration and the fetcher registry; all
/// per-search state lives in the call, so one instance can serve concurrent
/// callers.
pub struct Stitcher {
    pub(crate) fetchers: Vec<Arc<dyn Fetcher>>,
    pub(crate) cfg: StitchConfig,
}

/// Builder for constructing a `Stitcher` with custom configuration.
pub struct StitcherBuilder {
    fetchers: Vec<Arc<dyn Fetcher>>,
    cfg: StitchConfig,
}

impl Default for StitcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn names(keys: &[FetcherKey]) -> Vec<String> {
    keys.iter().map(|k| k.as_str().to_string()).collect()
}

impl StitcherBuilder {
    /// Create a new builder with default rules, no delay, a 30s provider
    /// timeout and no fetchers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            fetchers: vec![],
            cfg: StitchConfig::default(),
        }
    }

    /// Register a fetcher.
    ///
    /// Registration order is the fallback order when no provider policy is set.
    #[must_use]
    pub fn with_fetcher(mut self, f: Arc<dyn Fetcher>) -> Self {
        self.fetchers.push(f);
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: StitchConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Default provider priority. Only listed fetchers are tried.
    #[must_use]
    pub fn provider_order(mut self, keys: &[FetcherKey]) -> Self {
        self.cfg.provider_policy.order = names(keys);
        self
    }

    /// Define a named provider priority list.
    #[must_use]
    pub fn provider_mode(mut self, mode: &str, keys: &[FetcherKey]) -> Self {
        self.cfg
            .provider_policy
            .modes
            .insert(mode.to_string(), names(keys));
        self
    }

    /// Use a named provider list defined with [`Self::provider_mode`].
    #[must_use]
    pub fn select_mode(mut self, mode: &str) -> Self {
        self.cfg.provider_policy.mode = Some(mode.to_string());
        self
    }

    /// Force every window through a single fetcher.
    #[must_use]
    pub fn use_provider(mut self, key: FetcherKey) -> Self {
        self.cfg.provider_policy.use_provider = Some(key.as_str().to_string());
        self
    }

    /// Replace the granularity rules.
    #[must_use]
    pub fn granularity_rules(mut self, rules: GranularityRules) -> Self {
        self.cfg.rules = rules;
        self
    }

    /// Pause between successive provider calls within one search.
    #[must_use]
    pub const fn request_delay(mut self, delay: Duration) -> Self {
        self.cfg.request_delay = delay;
        self
    }

    /// Upper bound on a single provider call.
    #[must_use]
    pub const fn provider_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.provider_timeout = timeout;
        self
    }

    /// Synthesize zero-filled windows instead of calling providers.
    #[must_use]
    pub const fn dry_run(mut self, yes: bool) -> Self {
        self.cfg.dry_run = yes;
        self
    }

    /// Build the `Stitcher`.
    ///
    /// # Errors
    /// Returns `Planning` if no fetchers are registered (outside dry runs), if
    /// the provider policy names an unregistered fetcher, or if the selected
    /// mode is not defined.
    pub fn build(self) -> Result<Stitcher, StitchError> {
        if self.fetchers.is_empty() && !self.cfg.dry_run {
            return Err(StitchError::planning(
                "no fetchers registered; add at least one via with_fetcher(...)",
            ));
        }
        let known: HashSet<&'static str> = self.fetchers.iter().map(|f| f.name()).collect();
        if let Some(unknown) = self
            .cfg
            .provider_policy
            .referenced_names()
            .find(|n| !known.contains(*n))
        {
            return Err(StitchError::planning(format!(
                "provider policy names unknown fetcher {unknown:?}"
            )));
        }
        self.cfg.provider_policy.effective_order()?;

        Ok(Stitcher {
            fetchers: self.fetchers,
            cfg: self.cfg,
        })
    }
}

/// Attribute an error to the provider that produced it.
///
/// Errors that already carry provider context pass through unchanged.
pub fn tag_err(provider: &str, e: StitchError) -> StitchError {
    match e {
        e @ (StitchError::Provider { .. }
        | StitchError::ProviderTimeout { .. }
        | StitchError::AllProvidersFailed(_)
        | StitchError::NoProviders(_)) => e,
        other => StitchError::Provider {
            provider: provider.to_string(),
            msg: other.to_string(),
        },
    }
}

impl Stitcher {
    /// Start building a new `Stitcher`.
    ///
    /// ```rust,ignore
    /// use std::sync::Arc;
    /// use trendstitch::Stitcher;
    /// use trendstitch_mock::TrendFetcher;
    ///
    /// let stitcher = Stitcher::builder()
    ///     .with_fetcher(Arc::new(TrendFetcher::new()))
    ///     .request_delay(std::time::Duration::from_secs(4))
    ///     .build()?;
    /// ```
    #[must_use]
    pub fn builder() -> StitcherBuilder {
        StitcherBuilder::new()
    }

    /// Effective configuration.
    #[must_use]
    pub const fn config(&self) -> &StitchConfig {
        &self.cfg
    }

    /// Wrap a provider future with a timeout and standardized timeout error mapping.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "trendstitch::core::provider_call_with_timeout",
            skip(fut),
            fields(
                provider = provider_name,
                timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            ),
        )
    )]
    pub(crate) async fn provider_call_with_timeout<T, Fut>(
        provider_name: &'static str,
        timeout: Duration,
        fut: Fut,
    ) -> Result<T, StitchError>
    where
        Fut: core::future::Future<Output = Result<T, StitchError>>,
    {
        (tokio::time::timeout(timeout, fut).await)
            .unwrap_or_else(|_| Err(StitchError::provider_timeout(provider_name)))
    }

    /// Fetchers to try for every window, in order.
    ///
    /// # Errors
    /// Returns `Planning` when the selected provider mode is not defined.
    pub(crate) fn ordered(&self) -> Result<Vec<Arc<dyn Fetcher>>, StitchError> {
        let Some(order) = self.cfg.provider_policy.effective_order()? else {
            return Ok(self.fetchers.clone());
        };
        let mut seen: HashSet<&str> = HashSet::new();
        Ok(order
            .iter()
            .filter(|n| seen.insert(n.as_str()))
            .filter_map(|n| self.fetchers.iter().find(|f| f.name() == n.as_str()).cloned())
            .collect())
    }
}
