//! Shared string pool for labels, function tags and words
//!
//! Every tree read from one source shares a single pool, so repeated
//! categories (`NP`, `-NONE-`, `the`) are stored once and compared as
//! symbols.

use lasso::{Spur, ThreadedRodeo};
use rustc_hash::FxBuildHasher;
use std::sync::Arc;

/// Interned string handle
pub type Sym = Spur;

#[derive(Clone)]
pub struct StringPool(Arc<ThreadedRodeo<Sym, FxBuildHasher>>);

impl Default for StringPool {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StringPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StringPool")
            .field("len", &self.0.len())
            .finish()
    }
}

impl StringPool {
    pub fn new() -> Self {
        Self(Arc::new(ThreadedRodeo::with_hasher(FxBuildHasher)))
    }

    #[inline]
    pub fn get_or_intern(&self, s: &str) -> Sym {
        self.0.get_or_intern(s)
    }

    /// Look up a string without interning it
    #[inline]
    pub fn get(&self, s: &str) -> Option<Sym> {
        self.0.get(s)
    }

    #[inline]
    pub fn resolve(&self, sym: Sym) -> &str {
        self.0.resolve(&sym)
    }

    #[inline(always)]
    pub fn compare(&self, sym: Sym, s: &str) -> bool {
        self.resolve(sym) == s
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if both handles point at the same underlying pool
    pub fn same_pool(&self, other: &StringPool) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
