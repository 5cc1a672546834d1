//! Mimic selectors for coordinated selection.
//!
//! A [`MimicRecordingSelector`] wraps a child selector and owns an explicit
//! list of observers, one per [`MimicReplayingSelector`] created from it.
//! Every time the recorder pulls an item, it writes that item (or the end of
//! its pass) into every observer before returning it, so all replayers see
//! exactly what the recorder produced in the current step.
//!
//! Replaying before anything was recorded in the current step is a usage
//! order error.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use searchforge_core::domain::PlanningSolution;
use searchforge_core::{Result, SearchForgeError};
use searchforge_scoring::ScoreDirector;

use super::{Selector, SelectorEvent};

#[derive(Debug)]
struct ReplaySlot<T> {
    // None until the recorder pulled something in the current step.
    has_next: Option<bool>,
    current: Option<T>,
    version: u64,
}

impl<T> ReplaySlot<T> {
    fn clear(&mut self) {
        self.has_next = None;
        self.current = None;
    }
}

type SharedSlot<T> = Arc<Mutex<ReplaySlot<T>>>;
type SharedChild<S, T> = Arc<Mutex<dyn Selector<S, Item = T>>>;

/// Observer list shared by a recorder and the registry.
///
/// The handle also reaches the recorded child, so replayers report the
/// child's size and never-ending flag as they are now. Cloning the handle
/// does not create a new recorder.
pub struct MimicRecorder<S, T>
where
    S: PlanningSolution,
    T: Clone + Send + Debug + 'static,
{
    observers: Arc<Mutex<Vec<SharedSlot<T>>>>,
    child: SharedChild<S, T>,
}

impl<S, T> Clone for MimicRecorder<S, T>
where
    S: PlanningSolution,
    T: Clone + Send + Debug + 'static,
{
    fn clone(&self) -> Self {
        Self {
            observers: Arc::clone(&self.observers),
            child: Arc::clone(&self.child),
        }
    }
}

impl<S, T> Debug for MimicRecorder<S, T>
where
    S: PlanningSolution,
    T: Clone + Send + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MimicRecorder")
            .field("observers", &self.observer_count())
            .finish()
    }
}

impl<S, T> MimicRecorder<S, T>
where
    S: PlanningSolution,
    T: Clone + Send + Debug + 'static,
{
    fn new(child: SharedChild<S, T>) -> Self {
        Self {
            observers: Arc::new(Mutex::new(Vec::new())),
            child,
        }
    }

    /// Creates a replaying selector observing this recorder.
    pub fn replayer(&self) -> MimicReplayingSelector<S, T> {
        let slot = Arc::new(Mutex::new(ReplaySlot {
            has_next: None,
            current: None,
            version: 0,
        }));
        self.observers.lock().push(Arc::clone(&slot));
        MimicReplayingSelector {
            slot,
            recorded: Arc::clone(&self.child),
            replayed_version: None,
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.lock().len()
    }

    fn relay(&self, item: Option<&T>) {
        for observer in self.observers.lock().iter() {
            let mut slot = observer.lock();
            slot.has_next = Some(item.is_some());
            slot.current = item.cloned();
            slot.version += 1;
        }
    }

    fn clear(&self) {
        for observer in self.observers.lock().iter() {
            observer.lock().clear();
        }
    }
}

/// Wraps a selector and relays everything it produces to its replayers.
pub struct MimicRecordingSelector<S, C>
where
    S: PlanningSolution,
    C: Selector<S> + 'static,
    C::Item: 'static,
{
    child: Arc<Mutex<C>>,
    recorder: MimicRecorder<S, C::Item>,
}

impl<S, C> MimicRecordingSelector<S, C>
where
    S: PlanningSolution,
    C: Selector<S> + 'static,
    C::Item: 'static,
{
    pub fn new(child: C) -> Self {
        let child = Arc::new(Mutex::new(child));
        let shared: SharedChild<S, C::Item> = child.clone();
        Self {
            child,
            recorder: MimicRecorder::new(shared),
        }
    }

    /// Returns the recorder handle, used to create replayers.
    pub fn recorder(&self) -> MimicRecorder<S, C::Item> {
        self.recorder.clone()
    }

    /// Creates a replaying selector observing this recorder.
    pub fn replayer(&self) -> MimicReplayingSelector<S, C::Item> {
        self.recorder.replayer()
    }
}

impl<S, C> Debug for MimicRecordingSelector<S, C>
where
    S: PlanningSolution,
    C: Selector<S> + 'static,
    C::Item: 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MimicRecordingSelector")
            .field("child", &*self.child.lock())
            .field("observers", &self.recorder.observer_count())
            .finish()
    }
}

impl<S, C> Selector<S> for MimicRecordingSelector<S, C>
where
    S: PlanningSolution,
    C: Selector<S> + 'static,
    C::Item: 'static,
{
    type Item = C::Item;

    fn lifecycle(
        &mut self,
        event: SelectorEvent,
        score_director: &dyn ScoreDirector<S>,
        rng: &mut StdRng,
    ) -> Result<()> {
        self.child.lock().lifecycle(event, score_director, rng)?;
        if matches!(event, SelectorEvent::StepStarted | SelectorEvent::StepEnded) {
            self.recorder.clear();
        }
        Ok(())
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>) -> Option<u64> {
        self.child.lock().size(score_director)
    }

    fn is_never_ending(&self) -> bool {
        self.child.lock().is_never_ending()
    }

    fn restart(&mut self, score_director: &dyn ScoreDirector<S>, rng: &mut StdRng) -> Result<()> {
        self.child.lock().restart(score_director, rng)
    }

    fn next(
        &mut self,
        score_director: &dyn ScoreDirector<S>,
        rng: &mut StdRng,
    ) -> Result<Option<C::Item>> {
        let item = self.child.lock().next(score_director, rng)?;
        self.recorder.relay(item.as_ref());
        Ok(item)
    }
}

/// Replays the item its recorder produced last.
///
/// Every pass (between two restarts) returns the recorded item at most once,
/// and once more after each new recording. Size and never-ending flag are
/// the recorded child's.
pub struct MimicReplayingSelector<S, T>
where
    S: PlanningSolution,
    T: Clone + Send + Debug + 'static,
{
    slot: SharedSlot<T>,
    recorded: SharedChild<S, T>,
    replayed_version: Option<u64>,
}

impl<S, T> Debug for MimicReplayingSelector<S, T>
where
    S: PlanningSolution,
    T: Clone + Send + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MimicReplayingSelector")
            .field("slot", &*self.slot.lock())
            .field("replayed_version", &self.replayed_version)
            .finish()
    }
}

impl<S, T> Selector<S> for MimicReplayingSelector<S, T>
where
    S: PlanningSolution,
    T: Clone + Send + Debug + 'static,
{
    type Item = T;

    fn size(&self, score_director: &dyn ScoreDirector<S>) -> Option<u64> {
        self.recorded.lock().size(score_director)
    }

    fn is_never_ending(&self) -> bool {
        self.recorded.lock().is_never_ending()
    }

    fn restart(&mut self, _score_director: &dyn ScoreDirector<S>, _rng: &mut StdRng) -> Result<()> {
        self.replayed_version = None;
        Ok(())
    }

    fn next(&mut self, _score_director: &dyn ScoreDirector<S>, _rng: &mut StdRng) -> Result<Option<T>> {
        let slot = self.slot.lock();
        match slot.has_next {
            None => Err(SearchForgeError::UsageOrder(
                "a replaying selector was read before its recording selector produced anything in this step"
                    .to_string(),
            )),
            Some(false) => Ok(None),
            Some(true) => {
                if self.replayed_version == Some(slot.version) {
                    return Ok(None);
                }
                self.replayed_version = Some(slot.version);
                Ok(slot.current.clone())
            }
        }
    }
}

/// Recorders by id, so replayers can be wired by name when a solver is built.
pub struct MimicRegistry<S, T>
where
    S: PlanningSolution,
    T: Clone + Send + Debug + 'static,
{
    recorders: HashMap<String, MimicRecorder<S, T>>,
}

impl<S, T> Debug for MimicRegistry<S, T>
where
    S: PlanningSolution,
    T: Clone + Send + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MimicRegistry")
            .field("ids", &self.recorders.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<S, T> Default for MimicRegistry<S, T>
where
    S: PlanningSolution,
    T: Clone + Send + Debug + 'static,
{
    fn default() -> Self {
        Self {
            recorders: HashMap::new(),
        }
    }
}

impl<S, T> MimicRegistry<S, T>
where
    S: PlanningSolution,
    T: Clone + Send + Debug + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a recorder. Ids must be unique.
    pub fn register(&mut self, id: impl Into<String>, recorder: MimicRecorder<S, T>) -> Result<()> {
        let id = id.into();
        if self.recorders.contains_key(&id) {
            return Err(SearchForgeError::Config(format!(
                "the mimic selector id '{}' is already registered",
                id
            )));
        }
        self.recorders.insert(id, recorder);
        Ok(())
    }

    /// Creates a replayer for the recorder registered under `id`.
    pub fn replayer(&self, id: &str) -> Result<MimicReplayingSelector<S, T>> {
        self.recorders
            .get(id)
            .map(MimicRecorder::replayer)
            .ok_or_else(|| {
                SearchForgeError::Config(format!(
                    "no recording selector with id '{}' was built before its replaying selector",
                    id
                ))
            })
    }
}
