//! # turn-sequencer
//!
//! A turn-sequencing engine for board and card games: it decides which
//! actions the active player may take next, in which order, and when the
//! turn is over.
//!
//! ## Design Principles
//!
//! 1. **Game-Agnostic**: Action kinds are opaque tags. Games register them
//!    at startup and give them meaning through `TurnRules`.
//!
//! 2. **Atomic Requests**: Every mutating call either succeeds completely or
//!    leaves all state exactly as it was.
//!
//! 3. **Value Semantics**: Node trees and the sequencer are plain values.
//!    Cloning yields an independent copy, which is how undo works.
//!
//! ## Architecture
//!
//! - **Obligation Trees**: `ActionNode` composes single actions, choices,
//!   unordered sets, bounded repeats, and paired when/then sequences.
//!
//! - **Sequencer**: An ordered queue of root obligations. Follow-ups from
//!   effects interrupt whatever was pending.
//!
//! - **Persistent Data Structures**: O(1) cloning via `im-rs` for undo
//!   snapshots.
//!
//! ## Modules
//!
//! - `core`: Action kinds and their registry, players, errors, configuration
//! - `actions`: The `ActionNode` obligation tree
//! - `sequencer`: The per-turn obligation queue
//! - `turn`: `TurnRules` trait and the `TurnController` state machine

pub mod core;
pub mod actions;
pub mod sequencer;
pub mod turn;

// Re-export commonly used types
pub use crate::core::{
    ActionKind, ActionKindConfig, ActionRegistry, PayloadDecoder, RegistryError,
    PlayerId,
    ErrorSeverity, SequenceError,
    TurnConfig,
};

pub use crate::actions::{ActionNode, KindSet};

pub use crate::sequencer::ActionSequencer;

pub use crate::turn::{
    EffectContext, FollowUps, TurnRules,
    TurnController, TurnStatus,
    TurnEvent, TurnEventKind,
    TurnError, SnapshotError, TurnSnapshot,
};
