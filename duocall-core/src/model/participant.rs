use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier the signaling relay assigns to a connected client.
///
/// Unique per connection and reassigned on reconnect; never persisted.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct ParticipantId(pub String);

impl ParticipantId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Initiator tie-break: of two participants that see each other join,
    /// the one whose identity sorts lexicographically lower creates the
    /// offer. Deterministic and symmetric, so exactly one side initiates
    /// without an extra signaling round-trip. Equal identities (a relay
    /// bug) make neither side initiate.
    pub fn initiates_toward(&self, other: &ParticipantId) -> bool {
        self.0 < other.0
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for ParticipantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
