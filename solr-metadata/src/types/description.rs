//! The description field rendered beneath an object's content.

use serde::{Deserialize, Serialize};

use super::ids::FieldName;

/// How a truncation limit is applied to a multi-valued field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TruncationType {
    /// Limit the length of each value on its own
    #[default]
    #[serde(rename = "separate_value_option")]
    SeparateValue,
    /// Limit the length of the joined field
    #[serde(rename = "whole_field_option")]
    WholeField,
}

impl TruncationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SeparateValue => "separate_value_option",
            Self::WholeField => "whole_field_option",
        }
    }
}

impl std::str::FromStr for TruncationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "separate_value_option" | "separate" => Ok(Self::SeparateValue),
            "whole_field_option" | "whole" => Ok(Self::WholeField),
            other => Err(format!("unknown truncation type: {other}")),
        }
    }
}

/// Rules for shortening long description values.
///
/// A `max_length` of zero disables truncation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TruncationPolicy {
    #[serde(default)]
    pub truncation_type: TruncationType,
    #[serde(default)]
    pub max_length: usize,
    #[serde(default)]
    pub word_safe: bool,
    #[serde(default)]
    pub ellipsis: bool,
    #[serde(default = "default_min_wordsafe_length")]
    pub min_wordsafe_length: usize,
}

fn default_min_wordsafe_length() -> usize {
    1
}

impl Default for TruncationPolicy {
    fn default() -> Self {
        Self {
            truncation_type: TruncationType::default(),
            max_length: 0,
            word_safe: false,
            ellipsis: false,
            min_wordsafe_length: default_min_wordsafe_length(),
        }
    }
}

/// Description settings for a configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DescriptionSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<FieldName>,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub truncation: TruncationPolicy,
}

impl DescriptionSpec {
    pub fn is_configured(&self) -> bool {
        self.field.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_defaults() {
        let policy = TruncationPolicy::default();
        assert_eq!(policy.truncation_type, TruncationType::SeparateValue);
        assert_eq!(policy.max_length, 0);
        assert!(!policy.word_safe);
        assert!(!policy.ellipsis);
        assert_eq!(policy.min_wordsafe_length, 1);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let spec: DescriptionSpec = serde_yaml_ng::from_str("label: Abstract\n").unwrap();
        assert!(spec.field.is_none());
        assert_eq!(spec.label, "Abstract");
        assert_eq!(spec.truncation, TruncationPolicy::default());
    }

    #[test]
    fn truncation_type_wire_names() {
        let yaml = serde_yaml_ng::to_string(&TruncationType::WholeField).unwrap();
        assert_eq!(yaml.trim(), "whole_field_option");
        assert_eq!(
            "separate".parse::<TruncationType>().unwrap(),
            TruncationType::SeparateValue
        );
        assert!("bogus".parse::<TruncationType>().is_err());
    }
}
