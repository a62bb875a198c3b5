use crate::errors::CoreError;
use crate::models::ticker::TickerSet;

/// Enforces that a ticker id is used at most once per run, across all
/// portfolio files.
///
/// Pure: the input set is never modified. Callers thread the returned set into
/// the next call.
pub struct UniqueKeyTracker;

impl UniqueKeyTracker {
    /// Return `existing` with `key` appended, or `DuplicateKey` if it is
    /// already there.
    pub fn add(existing: &TickerSet, key: &str) -> Result<TickerSet, CoreError> {
        if existing.contains(key) {
            return Err(CoreError::DuplicateKey(key.to_string()));
        }
        Ok(existing.with_key(key))
    }

    /// Append several keys at once. Fails without adding anything if any key
    /// is already present or repeated within `keys`; the error lists every
    /// offending key, sorted.
    pub fn add_all<'a, I>(existing: &TickerSet, keys: I) -> Result<TickerSet, CoreError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut next = existing.clone();
        let mut duplicates: Vec<&str> = Vec::new();
        for key in keys {
            if next.contains(key) {
                if !duplicates.contains(&key) {
                    duplicates.push(key);
                }
            } else {
                next.insert(key);
            }
        }

        if duplicates.is_empty() {
            Ok(next)
        } else {
            duplicates.sort_unstable();
            Err(CoreError::DuplicateKey(duplicates.join(", ")))
        }
    }
}
