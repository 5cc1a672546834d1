//! Move system for modifying planning solutions.
//!
//! Moves are the fundamental operations that modify planning variables during
//! solving. Every move performs its edit through the score director's
//! before/after notifications and returns the move that undoes it.
//!
//! - `ChangeMove<S, V>` - assigns a value to a variable
//! - `SwapMove<S, V>` - swaps values between two entities
//! - `CompositeMove<S, M>` - applies several moves in order, undoes them in reverse
//! - `EitherMove<S, V>` - a change or a swap, so one selector can yield both

mod change;
mod composite;
mod either;
mod signature;
mod swap;
mod traits;


pub use change::ChangeMove;
pub use composite::CompositeMove;
pub use either::EitherMove;
pub use signature::signature_of;
pub use swap::SwapMove;
pub use traits::Move;
