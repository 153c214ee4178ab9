//! Single-slot cache for reference data.
//!
//! A [`Slot`] holds at most one value for the lifetime of its owner. It is
//! filled on first access and only cleared by an explicit
//! [`Slot::invalidate`]; there is no expiry.

use std::collections::BTreeMap;

/// Values that can report whether they carry any data.
///
/// Vacant values are handed back to the caller but never retained, so an
/// empty listing is fetched again on the next access.
pub trait CacheValue {
    /// Returns `true` when the value holds nothing worth caching.
    fn is_vacant(&self) -> bool;
}

impl<T> CacheValue for Vec<T> {
    fn is_vacant(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V> CacheValue for BTreeMap<K, V> {
    fn is_vacant(&self) -> bool {
        self.is_empty()
    }
}

/// Optional cached value with manual invalidation.
#[derive(Clone, Debug)]
pub struct Slot<T> {
    value: Option<T>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self { value: None }
    }
}

impl<T: CacheValue> Slot<T> {
    /// Creates an empty slot.
    #[must_use]
    pub const fn new() -> Self {
        Self { value: None }
    }

    /// Returns `true` when a non-vacant value is cached.
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.value.as_ref().is_some_and(|value| !value.is_vacant())
    }

    /// Returns the cached value, calling `fill` first when nothing usable
    /// is cached.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `fill`; the slot is left empty.
    pub fn get_or_try_fill<E, F>(&mut self, fill: F) -> Result<&T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let value = match self.value.take() {
            Some(value) if !value.is_vacant() => value,
            _ => fill()?,
        };
        Ok(self.value.insert(value))
    }

    /// Drops the cached value so the next access fetches again.
    pub fn invalidate(&mut self) {
        self.value = None;
    }
}
