use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::event::CANONICAL_DELIMITER;

/// Identifier of an event-producing agent.
///
/// Must be non-empty and must not contain the canonical message delimiter,
/// otherwise two different field tuples could encode to the same signing
/// message.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SourceId(String);

impl SourceId {
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        if id.is_empty() {
            return Err(TypeError::InvalidSourceId(id, "must not be empty"));
        }
        if id.contains(CANONICAL_DELIMITER) {
            return Err(TypeError::InvalidSourceId(
                id,
                "must not contain the canonical delimiter '|'",
            ));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceId({})", self.0)
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SourceId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for SourceId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SourceId> for String {
    fn from(id: SourceId) -> Self {
        id.0
    }
}

impl AsRef<str> for SourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_identifier() {
        let id = SourceId::new("honest_core").unwrap();
        assert_eq!(id.as_str(), "honest_core");
        assert_eq!(id.to_string(), "honest_core");
    }

    #[test]
    fn rejects_empty() {
        assert!(SourceId::new("").is_err());
    }

    #[test]
    fn rejects_delimiter() {
        assert!(matches!(
            "a|b".parse::<SourceId>(),
            Err(TypeError::InvalidSourceId(..))
        ));
    }

    #[test]
    fn serde_validates_on_deserialize() {
        let ok: SourceId = serde_json::from_str("\"attacker\"").unwrap();
        assert_eq!(ok.as_str(), "attacker");
        assert!(serde_json::from_str::<SourceId>("\"\"").is_err());
    }
}
