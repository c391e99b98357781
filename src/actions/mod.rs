//! Obligation trees: what the player may or must do next.
//!
//! An [`ActionNode`] is a closed sum of five primitives:
//!
//! - [`Single`]: one kind, mandatory or optional
//! - [`Choice`]: exactly one of several kinds
//! - [`Any`]: any subset of children, in any order
//! - [`Repeat`]: a template resolved between `at_least` and `at_most` times
//! - [`WhenThen`]: paired obligations, each `when` earning one `then`
//!
//! Combinators nest freely. The tree never inspects what a kind *means*;
//! it only tracks which kinds are legal and when the obligation is done.

mod single;
mod choice;
mod any;
mod repeat;
mod when_then;
mod node;

pub use single::Single;
pub use choice::Choice;
pub use any::Any;
pub use repeat::Repeat;
pub use when_then::{Branch, WhenThen, WhenThenStep};
pub use node::ActionNode;

use crate::core::ActionKind;

/// Set of action kinds, ordered for stable presentation.
pub type KindSet = im::OrdSet<ActionKind>;
