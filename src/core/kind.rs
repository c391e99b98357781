//! Action kinds and the registry that names them.
//!
//! An `ActionKind` is the "verb" of a request: it identifies a category of
//! performable action, never its parameters. The sequencer only stores and
//! compares kinds.
//!
//! Games register their kinds once at startup in an `ActionRegistry`, which
//! maps each kind to a stable name (for persistence and the presentation
//! layer) and to a decoder for the request payload. Lookups are plain table
//! lookups; nothing is resolved by reflection.

use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Action kind identifier. Games define what kinds exist.
///
/// The engine doesn't interpret kinds - they're opaque, ordered tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActionKind(pub u16);

impl ActionKind {
    /// Create a new action kind.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Get the raw tag value.
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Action({})", self.0)
    }
}

/// Decodes the parameters of a request for one kind.
pub type PayloadDecoder<P> = fn(&Value) -> Result<P, serde_json::Error>;

/// Errors raised by [`ActionRegistry`].
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("{0} is not registered")]
    UnknownKind(ActionKind),

    #[error("no action kind is named {0:?}")]
    UnknownName(String),

    #[error("{0} is already registered")]
    DuplicateKind(ActionKind),

    #[error("action name {0:?} is already in use")]
    DuplicateName(String),

    #[error("invalid payload for {name}: {source}")]
    Payload {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Configuration for one registered kind.
#[derive(Clone, Debug)]
pub struct ActionKindConfig<P> {
    /// The kind being described.
    pub kind: ActionKind,

    /// Stable, human-readable name (used on the wire and in logs).
    pub name: String,

    decoder: PayloadDecoder<P>,
}

impl<P> ActionKindConfig<P> {
    /// Decode a payload for this kind.
    pub fn decode(&self, payload: &Value) -> Result<P, RegistryError> {
        (self.decoder)(payload).map_err(|source| RegistryError::Payload {
            name: self.name.clone(),
            source,
        })
    }
}

/// Maps action kinds to names and payload decoders.
///
/// `P` is the game's request payload type, usually an enum with one variant
/// per kind that carries parameters.
///
/// ## Example
///
/// ```
/// use turn_sequencer::core::{ActionKind, ActionRegistry};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct NoPayload;
///
/// let mut registry: ActionRegistry<NoPayload> = ActionRegistry::new();
/// registry.register_no_payload(ActionKind::new(0), "Move").unwrap();
///
/// let (kind, _) = registry
///     .decode_request("Move", &serde_json::Value::Null)
///     .unwrap();
/// assert_eq!(kind, ActionKind::new(0));
/// assert_eq!(registry.name_of(kind), Some("Move"));
/// ```
#[derive(Clone, Debug)]
pub struct ActionRegistry<P> {
    by_kind: FxHashMap<ActionKind, ActionKindConfig<P>>,
    by_name: FxHashMap<String, ActionKind>,
}

impl<P> Default for ActionRegistry<P> {
    fn default() -> Self {
        Self {
            by_kind: FxHashMap::default(),
            by_name: FxHashMap::default(),
        }
    }
}

impl<P> ActionRegistry<P> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a kind with an explicit decoder.
    pub fn register(
        &mut self,
        kind: ActionKind,
        name: impl Into<String>,
        decoder: PayloadDecoder<P>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.by_kind.contains_key(&kind) {
            return Err(RegistryError::DuplicateKind(kind));
        }
        if self.by_name.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }

        self.by_name.insert(name.clone(), kind);
        self.by_kind.insert(kind, ActionKindConfig { kind, name, decoder });
        Ok(())
    }

    /// Register a kind whose parameters deserialize as `T` and convert into `P`.
    pub fn register_typed<T>(&mut self, kind: ActionKind, name: impl Into<String>) -> Result<(), RegistryError>
    where
        T: DeserializeOwned + Into<P>,
    {
        self.register(kind, name, decode_into::<T, P>)
    }

    /// Register a kind that carries no parameters.
    pub fn register_no_payload(&mut self, kind: ActionKind, name: impl Into<String>) -> Result<(), RegistryError>
    where
        P: Default,
    {
        self.register(kind, name, default_payload::<P>)
    }

    /// Get the configuration of a kind.
    #[must_use]
    pub fn get(&self, kind: ActionKind) -> Option<&ActionKindConfig<P>> {
        self.by_kind.get(&kind)
    }

    /// Get the stable name of a kind.
    #[must_use]
    pub fn name_of(&self, kind: ActionKind) -> Option<&str> {
        self.by_kind.get(&kind).map(|config| config.name.as_str())
    }

    /// Look a kind up by its stable name.
    #[must_use]
    pub fn kind_named(&self, name: &str) -> Option<ActionKind> {
        self.by_name.get(name).copied()
    }

    /// Translate an external `(name, parameters)` request.
    pub fn decode_request(&self, name: &str, payload: &Value) -> Result<(ActionKind, P), RegistryError> {
        let kind = self
            .kind_named(name)
            .ok_or_else(|| RegistryError::UnknownName(name.to_string()))?;
        let config = self.by_kind.get(&kind).ok_or(RegistryError::UnknownKind(kind))?;
        Ok((kind, config.decode(payload)?))
    }

    /// Decode parameters for an already known kind.
    pub fn decode(&self, kind: ActionKind, payload: &Value) -> Result<P, RegistryError> {
        self.by_kind
            .get(&kind)
            .ok_or(RegistryError::UnknownKind(kind))?
            .decode(payload)
    }

    /// Number of registered kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_kind.len()
    }

    /// Check if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_kind.is_empty()
    }
}

fn decode_into<T, P>(payload: &Value) -> Result<P, serde_json::Error>
where
    T: DeserializeOwned + Into<P>,
{
    T::deserialize(payload).map(Into::into)
}

fn default_payload<P: Default>(_payload: &Value) -> Result<P, serde_json::Error> {
    Ok(P::default())
}
