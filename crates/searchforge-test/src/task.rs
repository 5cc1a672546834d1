//! Task scheduling test fixtures.
//!
//! Each task gets a priority slot; two tasks must not share a slot, and
//! heavier tasks prefer low slots. The tasks carry a `weight`, used by
//! sorting and probability selector tests.
//!
//! ```
//! use searchforge_test::task::{Task, TaskSolution};
//!
//! let solution = TaskSolution::new(vec![
//!     Task::with_priority(1, 5),
//!     Task::unassigned(2),
//! ]);
//! assert_eq!(solution.tasks.len(), 2);
//! ```

use searchforge_core::domain::{
    EntityDescriptor, PlanningSolution, SolutionDescriptor, VariableDescriptor,
};
use searchforge_core::score::HardSoftScore;

/// A task entity with an optional priority slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Task {
    pub weight: i64,
    pub priority: Option<i64>,
}

impl Task {
    pub fn with_priority(priority: i64, weight: i64) -> Self {
        Self {
            weight,
            priority: Some(priority),
        }
    }

    pub fn unassigned(weight: i64) -> Self {
        Self {
            weight,
            priority: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskSolution {
    pub tasks: Vec<Task>,
    pub slots: i64,
    pub score: Option<HardSoftScore>,
}

impl TaskSolution {
    /// Creates a solution with as many priority slots as tasks.
    pub fn new(tasks: Vec<Task>) -> Self {
        let slots = tasks.len() as i64;
        Self {
            tasks,
            slots,
            score: None,
        }
    }

    /// Creates unassigned tasks with the given weights.
    pub fn from_weights(weights: &[i64]) -> Self {
        Self::new(weights.iter().map(|&w| Task::unassigned(w)).collect())
    }
}

impl PlanningSolution for TaskSolution {
    type Score = HardSoftScore;

    fn score(&self) -> Option<Self::Score> {
        self.score
    }

    fn set_score(&mut self, score: Option<Self::Score>) {
        self.score = score;
    }

    fn is_initialized(&self) -> bool {
        self.tasks.iter().all(|t| t.priority.is_some())
    }
}

pub fn task_count(s: &TaskSolution) -> usize {
    s.tasks.len()
}

pub fn get_priority(s: &TaskSolution, idx: usize) -> Option<i64> {
    s.tasks.get(idx).and_then(|t| t.priority)
}

pub fn set_priority(s: &mut TaskSolution, idx: usize, v: Option<i64>) {
    if let Some(task) = s.tasks.get_mut(idx) {
        task.priority = v;
    }
}

pub fn task_weight(s: &TaskSolution, idx: usize) -> i64 {
    s.tasks[idx].weight
}

/// Priority slots `0..slots`.
pub fn priority_range(s: &TaskSolution) -> Vec<i64> {
    (0..s.slots).collect()
}

/// Hard: one point per pair of tasks sharing a slot. Soft: `weight * slot`.
pub fn calculate_score(solution: &TaskSolution) -> HardSoftScore {
    let tasks = &solution.tasks;
    let mut hard = 0;
    let mut soft = 0;
    for (i, task) in tasks.iter().enumerate() {
        let Some(priority) = task.priority else {
            continue;
        };
        soft -= task.weight * priority;
        hard -= tasks[i + 1..]
            .iter()
            .filter(|other| other.priority == Some(priority))
            .count() as i64;
    }
    HardSoftScore::of(hard, soft)
}

pub fn create_task_descriptor() -> SolutionDescriptor<TaskSolution> {
    SolutionDescriptor::new("TaskSolution").with_entity(
        EntityDescriptor::new("Task", task_count)
            .with_variable(VariableDescriptor::genuine("priority").with_allows_unassigned(true)),
    )
}
