use std::sync::Arc;

use tracing::debug;

use super::{FuzzyMatcher, LocationTables, UNKNOWN_LOCATION};

/// Outcome of an accounting-location lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution<'a> {
    Exact(&'a str),
    Corrected {
        matched: &'a str,
        path: &'a str,
        score: f64,
    },
    Unknown,
}

impl<'a> Resolution<'a> {
    pub fn path(&self) -> &'a str {
        match *self {
            Resolution::Exact(path) => path,
            Resolution::Corrected { path, .. } => path,
            Resolution::Unknown => UNKNOWN_LOCATION,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Resolution::Unknown)
    }
}

/// Maps free-text locations to regions and accounting-location paths.
///
/// Both lookups are total: anything unmapped resolves to [`UNKNOWN_LOCATION`].
pub struct LocationResolver {
    tables: Arc<LocationTables>,
    matcher: FuzzyMatcher,
}

impl LocationResolver {
    pub fn new(tables: Arc<LocationTables>, matcher: FuzzyMatcher) -> Self {
        Self { tables, matcher }
    }

    pub fn tables(&self) -> &LocationTables {
        &self.tables
    }

    /// Exact-key region lookup; there is no fuzzy fallback for regions.
    pub fn region(&self, location: &str) -> &str {
        self.tables.region(location).unwrap_or(UNKNOWN_LOCATION)
    }

    pub fn resolve(&self, location: &str) -> Resolution<'_> {
        if let Some(path) = self.tables.accounting_path(location) {
            return Resolution::Exact(path);
        }
        match self
            .matcher
            .best_match(location, self.tables.accounting_keys())
        {
            Some(found) => {
                let path = self
                    .tables
                    .accounting_path(found.candidate)
                    .unwrap_or(UNKNOWN_LOCATION);
                debug!(
                    location,
                    matched = found.candidate,
                    score = found.score,
                    metric = self.matcher.metric_name(),
                    "corrected accounting location"
                );
                Resolution::Corrected {
                    matched: found.candidate,
                    path,
                    score: found.score,
                }
            }
            None => Resolution::Unknown,
        }
    }

    pub fn accounting_path(&self, location: &str) -> &str {
        self.resolve(location).path()
    }
}

impl Default for LocationResolver {
    fn default() -> Self {
        Self::new(LocationTables::builtin(), FuzzyMatcher::default())
    }
}
