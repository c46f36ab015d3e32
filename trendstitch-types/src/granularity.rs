//! Sampling resolutions and the rule set that bounds each provider window.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StitchError;

/// Sampling resolution of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Granularity {
    /// One record per hour (`h`).
    Hour,
    /// One record per calendar day (`D`).
    Day,
    /// One record per Sunday-started week (`W`).
    Week,
    /// One record per calendar month (`M`).
    Month,
    /// One record per calendar quarter (`Q`).
    Quarter,
    /// One record per calendar year (`Y`).
    Year,
    /// One record per decade starting in a year ending in 0 (`X`).
    Decade,
}

impl Granularity {
    /// Every granularity from finest to coarsest.
    pub const ALL: [Self; 7] = [
        Self::Hour,
        Self::Day,
        Self::Week,
        Self::Month,
        Self::Quarter,
        Self::Year,
        Self::Decade,
    ];

    /// Canonical single-letter code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Hour => "h",
            Self::Day => "D",
            Self::Week => "W",
            Self::Month => "M",
            Self::Quarter => "Q",
            Self::Year => "Y",
            Self::Decade => "X",
        }
    }

    /// Parse a granularity code.
    ///
    /// Accepts the single-letter codes (case-insensitive except `M`) and the
    /// pandas-style month aliases `MS` and `ME`.
    ///
    /// # Errors
    /// Returns `StitchError::Planning` for an empty or unknown code.
    pub fn from_code(code: &str) -> Result<Self, StitchError> {
        match code.trim() {
            "h" | "H" => Ok(Self::Hour),
            "D" | "d" => Ok(Self::Day),
            "W" | "w" => Ok(Self::Week),
            "M" | "MS" | "ME" => Ok(Self::Month),
            "Q" | "q" => Ok(Self::Quarter),
            "Y" | "y" => Ok(Self::Year),
            "X" | "x" => Ok(Self::Decade),
            _ => Err(StitchError::planning(format!(
                "invalid granularity code: {code:?}"
            ))),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Granularity {
    type Err = StitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

impl TryFrom<String> for Granularity {
    type Error = StitchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_code(&value)
    }
}

impl From<Granularity> for String {
    fn from(g: Granularity) -> Self {
        g.code().to_string()
    }
}

const fn default_inclusive() -> bool {
    true
}

/// One entry of the granularity rule set.
///
/// A rule without `max_days_threshold` is the catch-all. A rule without
/// `max_records` is unlimited when it is the catch-all; otherwise the record
/// cap is derived from the threshold for `h`, `D` and `W`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GranularityRule {
    /// Granularity served by this rule.
    pub code: Granularity,
    /// Largest span in whole days this rule accepts when auto-selecting.
    #[serde(default, alias = "max_days", skip_serializing_if = "Option::is_none")]
    pub max_days_threshold: Option<i64>,
    /// Most records one provider window may contain at this granularity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_records: Option<u32>,
    /// Whether the threshold comparison is `<=` (true) or `<` (false).
    #[serde(default = "default_inclusive", alias = "max_inclusive")]
    pub threshold_inclusive: bool,
}

impl GranularityRule {
    /// Thresholded rule with an explicit record cap.
    #[must_use]
    pub const fn bounded(code: Granularity, max_days: i64, max_records: u32) -> Self {
        Self {
            code,
            max_days_threshold: Some(max_days),
            max_records: Some(max_records),
            threshold_inclusive: true,
        }
    }

    /// Catch-all rule with an unlimited window.
    #[must_use]
    pub const fn catch_all(code: Granularity) -> Self {
        Self {
            code,
            max_days_threshold: None,
            max_records: None,
            threshold_inclusive: true,
        }
    }

    /// Same rule with an exclusive (`<`) threshold.
    #[must_use]
    pub const fn exclusive(mut self) -> Self {
        self.threshold_inclusive = false;
        self
    }

    /// Whether a span of `days` whole days satisfies this rule.
    #[must_use]
    pub const fn accepts(&self, days: i64) -> bool {
        match self.max_days_threshold {
            None => true,
            Some(max) if self.threshold_inclusive => days <= max,
            Some(max) => days < max,
        }
    }

    fn derived_max_records(&self) -> Option<u32> {
        let max = self.max_days_threshold?;
        let days = if self.threshold_inclusive { max } else { max - 1 };
        let records = match self.code {
            Granularity::Hour => days.checked_mul(24)?,
            Granularity::Day => days,
            Granularity::Week => days / 7,
            _ => return None,
        };
        u32::try_from(records).ok().filter(|r| *r > 0)
    }
}

/// Validated, ordered granularity rule set.
///
/// Invariants: at least one rule, unique codes, thresholds strictly
/// increasing, exactly one catch-all and it is last, every record cap `>= 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<GranularityRule>", into = "Vec<GranularityRule>")]
pub struct GranularityRules {
    rules: Vec<GranularityRule>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RulesDocument {
    Wrapped { granularity_rules: Vec<GranularityRule> },
    Bare(Vec<GranularityRule>),
}

impl GranularityRules {
    /// Validate `rules` as given, filling derivable record caps.
    ///
    /// # Errors
    /// Returns `StitchError::Planning` when any invariant is violated.
    pub fn new(rules: Vec<GranularityRule>) -> Result<Self, StitchError> {
        if rules.is_empty() {
            return Err(StitchError::planning("granularity rule set is empty"));
        }
        let total = rules.len();
        let mut seen = Vec::with_capacity(total);
        let mut last_threshold: Option<i64> = None;
        let mut filled = Vec::with_capacity(rules.len());
        for (i, mut rule) in rules.into_iter().enumerate() {
            if seen.contains(&rule.code) {
                return Err(StitchError::planning(format!(
                    "duplicate granularity rule for {}",
                    rule.code
                )));
            }
            seen.push(rule.code);
            match rule.max_days_threshold {
                Some(t) => {
                    if let Some(prev) = last_threshold.filter(|prev| t <= *prev) {
                        return Err(StitchError::planning(format!(
                            "granularity thresholds must strictly increase ({t} after {prev})"
                        )));
                    }
                    last_threshold = Some(t);
                    if rule.max_records.is_none() {
                        rule.max_records = rule.derived_max_records();
                        if rule.max_records.is_none() {
                            return Err(StitchError::planning(format!(
                                "rule {} needs an explicit max_records",
                                rule.code
                            )));
                        }
                    }
                }
                None if i + 1 != total => {
                    return Err(StitchError::planning(
                        "the catch-all granularity rule must be last",
                    ));
                }
                None => {}
            }
            if rule.max_records == Some(0) {
                return Err(StitchError::planning(format!(
                    "rule {} has max_records of zero",
                    rule.code
                )));
            }
            filled.push(rule);
        }
        if filled
            .last()
            .is_none_or(|r| r.max_days_threshold.is_some())
        {
            return Err(StitchError::planning(
                "granularity rule set needs a catch-all rule",
            ));
        }
        Ok(Self { rules: filled })
    }

    /// Parse a rule set from JSON, sorting rules by threshold with the
    /// catch-all last before validating.
    ///
    /// Accepts either a bare array or an object with a `granularity_rules`
    /// array. Unknown fields such as `name` are ignored.
    ///
    /// # Errors
    /// Returns `StitchError::Planning` for malformed JSON or invalid rules.
    pub fn from_json(json: &str) -> Result<Self, StitchError> {
        let doc: RulesDocument = serde_json::from_str(json)
            .map_err(|e| StitchError::planning(format!("invalid granularity rules: {e}")))?;
        let mut rules = match doc {
            RulesDocument::Wrapped { granularity_rules } => granularity_rules,
            RulesDocument::Bare(rules) => rules,
        };
        rules.sort_by_key(|r| r.max_days_threshold.unwrap_or(i64::MAX));
        Self::new(rules)
    }

    /// Rule for `granularity`, if configured.
    #[must_use]
    pub fn get(&self, granularity: Granularity) -> Option<&GranularityRule> {
        self.rules.iter().find(|r| r.code == granularity)
    }

    /// Rules in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = &GranularityRule> {
        self.rules.iter()
    }

    /// First rule accepting a span of `days`; the catch-all when none does.
    #[must_use]
    pub fn select(&self, days: i64) -> &GranularityRule {
        self.rules
            .iter()
            .find(|r| r.accepts(days))
            .unwrap_or_else(|| &self.rules[self.rules.len() - 1])
    }
}

impl Default for GranularityRules {
    fn default() -> Self {
        Self {
            rules: vec![
                GranularityRule::bounded(Granularity::Hour, 8, 192),
                GranularityRule::bounded(Granularity::Day, 270, 270),
                GranularityRule::bounded(Granularity::Week, 1900, 271),
                GranularityRule::catch_all(Granularity::Month),
            ],
        }
    }
}

impl TryFrom<Vec<GranularityRule>> for GranularityRules {
    type Error = StitchError;

    fn try_from(rules: Vec<GranularityRule>) -> Result<Self, Self::Error> {
        Self::new(rules)
    }
}

impl From<GranularityRules> for Vec<GranularityRule> {
    fn from(rules: GranularityRules) -> Self {
        rules.rules
    }
}
