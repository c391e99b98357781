//! Core engine types: action kinds, players, errors, configuration.
//!
//! This module contains the building blocks shared by the node tree, the
//! sequencer, and the turn controller. None of it knows about any game.

pub mod kind;
pub mod player;
pub mod error;
pub mod config;

pub use kind::{ActionKind, ActionKindConfig, ActionRegistry, PayloadDecoder, RegistryError};
pub use player::PlayerId;
pub use error::{ErrorSeverity, SequenceError};
pub use config::TurnConfig;
