//! Attribute-value-unit metadata
//!
//! An AVU is the native metadata unit of the repository. A collection carries
//! a multimap of AVUs: the same attribute name may hold several values at
//! once, but the same `(name, value)` pair is attached at most once.

use super::errors::RepositoryError;
use serde::{Deserialize, Serialize};

/// A single attribute-value-unit triple
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Avu {
    /// Attribute name
    pub name: String,

    /// Attribute value
    pub value: String,

    /// Optional unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
}

impl Avu {
    /// Creates an AVU without a unit
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            units: None,
        }
    }

    /// Sets the unit
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }
}

/// Attaches `avu` to `avus`, rejecting an already attached `(name, value)` pair
pub fn attach(avus: &mut Vec<Avu>, avu: Avu) -> Result<(), RepositoryError> {
    if avus
        .iter()
        .any(|existing| existing.name == avu.name && existing.value == avu.value)
    {
        return Err(RepositoryError::DuplicateValue {
            key: avu.name,
            value: avu.value,
        });
    }
    avus.push(avu);
    Ok(())
}

/// Detaches the `(name, value)` pair from `avus`
///
/// Other values of the same attribute are left in place.
pub fn detach(avus: &mut Vec<Avu>, name: &str, value: &str) -> Result<(), RepositoryError> {
    let before = avus.len();
    avus.retain(|avu| !(avu.name == name && avu.value == value));
    if avus.len() == before {
        return Err(RepositoryError::ValueNotFound {
            key: name.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}

/// A repository user and the AVUs attached to it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User name
    pub name: String,

    /// Metadata attached to the user
    #[serde(default)]
    pub metadata: Vec<Avu>,
}

impl UserProfile {
    /// Returns the single value of `key`, or `None` when the user has none
    ///
    /// When several values exist the first one attached wins.
    pub fn get_one(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|avu| avu.name == key)
            .map(|avu| avu.value.as_str())
    }
}
