//! Fetcher metadata types usable across crates.

/// Typed key for identifying fetchers in provider policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetcherKey(pub &'static str);

impl FetcherKey {
    /// Construct a new typed fetcher key from a static name.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Returns the inner static string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl From<FetcherKey> for String {
    fn from(k: FetcherKey) -> Self {
        k.0.to_string()
    }
}
