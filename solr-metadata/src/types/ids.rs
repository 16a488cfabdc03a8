//! Typed keys for configurations, Solr fields and content models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::error::MetadataError;

/// Opaque identifier of a display configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigurationId(Ulid);

impl ConfigurationId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for ConfigurationId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Ulid> for ConfigurationId {
    fn from(id: Ulid) -> Self {
        Self(id)
    }
}

impl fmt::Display for ConfigurationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ConfigurationId {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s.trim())
            .map(Self)
            .map_err(|_| MetadataError::InvalidConfigurationId { id: s.to_string() })
    }
}

/// Name of a field in the Solr index schema.
///
/// Unique within a configuration. Only syntax is checked here; whether the
/// index actually carries the field is a validation concern.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldName(String);

impl FieldName {
    pub fn new(name: impl Into<String>) -> Result<Self, MetadataError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(MetadataError::InvalidFieldName {
                name,
                message: "field name cannot be empty".to_string(),
            });
        }
        if name.chars().any(char::is_whitespace) {
            return Err(MetadataError::InvalidFieldName {
                name,
                message: "field name cannot contain whitespace".to_string(),
            });
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for FieldName {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for FieldName {
    type Error = MetadataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FieldName> for String {
    fn from(name: FieldName) -> Self {
        name.0
    }
}

impl AsRef<str> for FieldName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Content model identifier, e.g. `islandora:sp_basic_image`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentModelId(String);

impl ContentModelId {
    pub fn new(id: impl Into<String>) -> Result<Self, MetadataError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(MetadataError::InvalidContentModel {
                id,
                message: "content model cannot be empty".to_string(),
            });
        }
        if id.chars().any(char::is_whitespace) {
            return Err(MetadataError::InvalidContentModel {
                id,
                message: "content model cannot contain whitespace".to_string(),
            });
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ContentModelId {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ContentModelId {
    type Error = MetadataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ContentModelId> for String {
    fn from(id: ContentModelId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_name_rejects_empty_and_whitespace() {
        assert!(FieldName::new("").is_err());
        assert!(FieldName::new("   ").is_err());
        assert!(FieldName::new("dc title").is_err());
        assert_eq!(FieldName::new("dc.title").unwrap().as_str(), "dc.title");
    }

    #[test]
    fn field_name_deserialize_validates() {
        let ok: FieldName = serde_json::from_str("\"mods_titleInfo_title_ms\"").unwrap();
        assert_eq!(ok.as_str(), "mods_titleInfo_title_ms");
        assert!(serde_json::from_str::<FieldName>("\"\"").is_err());
    }

    #[test]
    fn content_model_parse() {
        let cm: ContentModelId = "islandora:sp_basic_image".parse().unwrap();
        assert_eq!(cm.to_string(), "islandora:sp_basic_image");
        assert!("".parse::<ContentModelId>().is_err());
    }

    #[test]
    fn configuration_id_round_trips_through_display() {
        let id = ConfigurationId::new();
        let parsed: ConfigurationId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-ulid".parse::<ConfigurationId>().is_err());
    }
}
