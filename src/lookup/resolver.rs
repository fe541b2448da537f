// Temporal resolver
//
// First match wins. Candidates are scanned in build order and the first one
// whose window contains the timestamp is returned, even if a later candidate
// has a tighter window. An unbounded record matches as soon as it is reached.

use chrono::{DateTime, Utc};

use super::record::Windowed;
use super::store::Category;
use crate::error::{LookupError, Result};

/// Resolve `key` at `at` against one category
///
/// Unknown keys and keys without a record valid at `at` both yield `NoMatch`.
pub fn resolve<'a, T: Windowed>(
    category: &'a Category<T>,
    key: &str,
    at: DateTime<Utc>,
) -> Result<&'a T> {
    category
        .candidates(key)
        .find(|record| record.window().contains(at))
        .ok_or(LookupError::NoMatch)
}
