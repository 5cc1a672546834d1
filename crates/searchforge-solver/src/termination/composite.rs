//! Composite terminations (AND/OR).
//!
//! Children are either a tuple of concrete terminations, with
//! macro-generated implementations, or a `Vec` of boxed terminations built
//! from configuration.

use std::fmt::Debug;

use searchforge_core::domain::PlanningSolution;

use super::{Progress, Termination};

/// A fixed group of terminations that can be visited one by one.
pub trait TerminationGroup<S: PlanningSolution>: Send + Debug {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Calls `visit` on every child until it returns false.
    fn visit(&self, visit: &mut dyn FnMut(&dyn Termination<S>) -> bool);
}

impl<S: PlanningSolution> TerminationGroup<S> for Vec<Box<dyn Termination<S>>> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn visit(&self, visit: &mut dyn FnMut(&dyn Termination<S>) -> bool) {
        for child in self {
            if !visit(child.as_ref()) {
                break;
            }
        }
    }
}

macro_rules! impl_termination_group {
    ($len:expr; $($idx:tt: $T:ident),+) => {
        impl<S, $($T),+> TerminationGroup<S> for ($($T,)+)
        where
            S: PlanningSolution,
            $($T: Termination<S>,)+
        {
            fn len(&self) -> usize {
                $len
            }

            fn visit(&self, visit: &mut dyn FnMut(&dyn Termination<S>) -> bool) {
                $(
                    if !visit(&self.$idx) {
                        return;
                    }
                )+
            }
        }
    };
}

impl_termination_group!(1; 0: T0);
impl_termination_group!(2; 0: T0, 1: T1);
impl_termination_group!(3; 0: T0, 1: T1, 2: T2);
impl_termination_group!(4; 0: T0, 1: T1, 2: T2, 3: T3);
impl_termination_group!(5; 0: T0, 1: T1, 2: T2, 3: T3, 4: T4);
impl_termination_group!(6; 0: T0, 1: T1, 2: T2, 3: T3, 4: T4, 5: T5);
impl_termination_group!(7; 0: T0, 1: T1, 2: T2, 3: T3, 4: T4, 5: T5, 6: T6);
impl_termination_group!(8; 0: T0, 1: T1, 2: T2, 3: T3, 4: T4, 5: T5, 6: T6, 7: T7);

/// Terminates when any child terminates.
///
/// The time gradient is the largest gradient among the children.
///
/// # Examples
///
/// ```
/// use searchforge_solver::termination::{OrTermination, StepCountTermination, TimeTermination};
///
/// // 30 seconds or 1000 steps, whichever comes first
/// let termination = OrTermination::new((
///     TimeTermination::seconds(30),
///     StepCountTermination::new(1000),
/// ));
/// # let _ = termination;
/// ```
#[derive(Debug)]
pub struct OrTermination<T>(pub T);

impl<T> OrTermination<T> {
    pub fn new(terminations: T) -> Self {
        Self(terminations)
    }
}

impl<S, T> Termination<S> for OrTermination<T>
where
    S: PlanningSolution,
    T: TerminationGroup<S>,
{
    fn is_terminated(&self, progress: &Progress<S::Score>) -> bool {
        let mut terminated = false;
        self.0.visit(&mut |child| {
            terminated = child.is_terminated(progress);
            !terminated
        });
        terminated
    }

    fn time_gradient(&self, progress: &Progress<S::Score>) -> Option<f64> {
        let mut gradient: Option<f64> = None;
        self.0.visit(&mut |child| {
            if let Some(child_gradient) = child.time_gradient(progress) {
                gradient = Some(gradient.map_or(child_gradient, |g| g.max(child_gradient)));
            }
            true
        });
        gradient
    }
}

/// Terminates once every child terminates.
///
/// The time gradient is the smallest gradient among the children.
#[derive(Debug)]
pub struct AndTermination<T>(pub T);

impl<T> AndTermination<T> {
    pub fn new(terminations: T) -> Self {
        Self(terminations)
    }
}

impl<S, T> Termination<S> for AndTermination<T>
where
    S: PlanningSolution,
    T: TerminationGroup<S>,
{
    fn is_terminated(&self, progress: &Progress<S::Score>) -> bool {
        if self.0.is_empty() {
            return false;
        }
        let mut terminated = true;
        self.0.visit(&mut |child| {
            terminated = child.is_terminated(progress);
            terminated
        });
        terminated
    }

    fn time_gradient(&self, progress: &Progress<S::Score>) -> Option<f64> {
        let mut gradient: Option<f64> = None;
        self.0.visit(&mut |child| {
            if let Some(child_gradient) = child.time_gradient(progress) {
                gradient = Some(gradient.map_or(child_gradient, |g| g.min(child_gradient)));
            }
            true
        });
        gradient
    }
}
