//! "Skip this version" memory

use crate::check::error::StoreError;
use crate::check::store::StateStore;

/// Remembers the single version identifier the user asked not to be prompted
/// about again. Marking a new identifier forgets the previous one.
pub struct SkipRegistry<'a, S: StateStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: StateStore + ?Sized> SkipRegistry<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Exact string match against the stored identifier
    pub fn is_skipped(&self, identifier: &str) -> Result<bool, StoreError> {
        let skipped = self.store.skipped_version()?;
        Ok(!skipped.is_empty() && skipped == identifier)
    }

    pub fn mark_skipped(&self, identifier: &str) -> Result<(), StoreError> {
        self.store.set_skipped_version(identifier)
    }
}
