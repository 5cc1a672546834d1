//! Cache scopes of selectors.

use searchforge_core::{Result, SearchForgeError};

use super::SelectorEvent;

/// How long a selector keeps its materialized items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum SelectionCacheType {
    /// Nothing is cached; items are produced when they are pulled.
    #[default]
    JustInTime,
    /// Rebuilt at every step start.
    Step,
    /// Rebuilt at every phase start.
    Phase,
    /// Built once when solving starts.
    Solver,
}

impl SelectionCacheType {
    pub fn is_cached(self) -> bool {
        self != SelectionCacheType::JustInTime
    }

    /// Returns true if the cache is (re)built on `event`.
    pub fn is_started_by(self, event: SelectorEvent) -> bool {
        matches!(
            (self, event),
            (SelectionCacheType::Step, SelectorEvent::StepStarted)
                | (SelectionCacheType::Phase, SelectorEvent::PhaseStarted)
                | (SelectionCacheType::Solver, SelectorEvent::SolvingStarted)
        )
    }

    /// Returns true if the cache is disposed on `event`.
    pub fn is_ended_by(self, event: SelectorEvent) -> bool {
        matches!(
            (self, event),
            (SelectionCacheType::Step, SelectorEvent::StepEnded)
                | (SelectionCacheType::Phase, SelectorEvent::PhaseEnded)
                | (SelectionCacheType::Solver, SelectorEvent::SolvingEnded)
        )
    }
}

/// Materialized items with the lifetime of one cache scope.
#[derive(Debug)]
pub(crate) struct SelectionCache<T> {
    cache_type: SelectionCacheType,
    items: Option<Vec<T>>,
}

impl<T> SelectionCache<T> {
    pub(crate) fn new(cache_type: SelectionCacheType) -> Self {
        Self {
            cache_type,
            items: None,
        }
    }

    pub(crate) fn cache_type(&self) -> SelectionCacheType {
        self.cache_type
    }

    pub(crate) fn is_started_by(&self, event: SelectorEvent) -> bool {
        self.cache_type.is_started_by(event)
    }

    /// Drops the items if `event` closes the cache scope.
    pub(crate) fn dispose_on(&mut self, event: SelectorEvent) {
        if self.cache_type.is_ended_by(event) {
            self.items = None;
        }
    }

    pub(crate) fn fill(&mut self, items: Vec<T>) {
        self.items = Some(items);
    }

    pub(crate) fn items(&self, owner: &str) -> Result<&[T]> {
        self.items.as_deref().ok_or_else(|| {
            SearchForgeError::SelectorState(format!(
                "{} read its {:?} cache outside of the cache scope",
                owner, self.cache_type
            ))
        })
    }
}
