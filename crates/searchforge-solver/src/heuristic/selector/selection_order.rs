//! Selection order configuration for selectors.

use searchforge_core::{Result, SearchForgeError};

use super::SelectionCacheType;

/// Defines the order in which elements are selected from a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SelectionOrder {
    /// Inherit the selection order from the parent selector.
    ///
    /// Without a parent, resolves to `Random`.
    #[default]
    Inherit,

    /// Elements in their original order. Deterministic and finite.
    Original,

    /// A random element on every call, with replacement. Never ending and
    /// needs no cache.
    Random,

    /// Every element exactly once, in an order shuffled when the cache is
    /// built. Requires a cache.
    Shuffled,

    /// Every element exactly once, sorted when the cache is built. Requires a
    /// cache.
    Sorted,

    /// A random element weighted by its probability, with replacement.
    /// Requires a cache.
    Probabilistic,
}

impl SelectionOrder {
    /// Resolves `Inherit` against the parent's order; never returns `Inherit`.
    pub fn resolve(self, inherited: SelectionOrder) -> SelectionOrder {
        match self {
            SelectionOrder::Inherit => {
                if inherited == SelectionOrder::Inherit {
                    SelectionOrder::Random
                } else {
                    inherited
                }
            }
            other => other,
        }
    }

    pub fn is_random(&self) -> bool {
        matches!(
            self,
            SelectionOrder::Random | SelectionOrder::Shuffled | SelectionOrder::Probabilistic
        )
    }

    /// Returns true if the order needs all elements before the first one is returned.
    pub fn requires_caching(&self) -> bool {
        matches!(
            self,
            SelectionOrder::Shuffled | SelectionOrder::Sorted | SelectionOrder::Probabilistic
        )
    }

    pub fn from_random_selection(random: bool) -> Self {
        if random {
            SelectionOrder::Random
        } else {
            SelectionOrder::Original
        }
    }

    /// Converts `Random` and `Original` into a random selection flag.
    pub fn to_random_selection(&self) -> Result<bool> {
        match self {
            SelectionOrder::Random => Ok(true),
            SelectionOrder::Original => Ok(false),
            other => Err(SearchForgeError::Config(format!(
                "selection order {:?} cannot be converted to a random selection flag",
                other
            ))),
        }
    }

    /// Rejects orders that need a cache combined with a just-in-time cache type.
    pub fn validate_cache_type(&self, cache_type: SelectionCacheType) -> Result<()> {
        if self.requires_caching() && !cache_type.is_cached() {
            return Err(SearchForgeError::Config(format!(
                "selection order {:?} requires a cached selector, but the cache type is {:?}",
                self, cache_type
            )));
        }
        Ok(())
    }
}
