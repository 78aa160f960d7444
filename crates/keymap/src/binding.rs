//! Action identifiers and the action-to-code pair held by the binding table.

use crate::key_code::KeyCode;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Identifier used to refer to a logical action such as `"Jump"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(Arc<str>);

impl ActionId {
    /// Create a new action identifier.
    pub fn new(id: impl Into<String>) -> Self {
        let id: String = id.into();
        Self(Arc::<str>::from(id.into_boxed_str()))
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ActionId {
    fn from(value: &str) -> Self {
        Self(Arc::<str>::from(value))
    }
}

impl From<String> for ActionId {
    fn from(value: String) -> Self {
        Self(Arc::<str>::from(value.into_boxed_str()))
    }
}

// Lets maps keyed by `ActionId` be queried with a plain `&str`.
impl Borrow<str> for ActionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ActionId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ActionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(ActionId::new(value))
    }
}

/// A single `action -> code` assignment.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionBinding {
    pub action: ActionId,
    pub code: KeyCode,
}

impl ActionBinding {
    pub fn new(action: impl Into<ActionId>, code: KeyCode) -> Self {
        Self {
            action: action.into(),
            code,
        }
    }
}
