//! Error types for display configuration management

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Result type for display configuration operations
pub type Result<T> = std::result::Result<T, MetadataError>;

/// Errors that can occur while loading, editing or persisting a configuration
#[derive(Debug, Error)]
pub enum MetadataError {
    /// Configuration not found by id
    #[error("configuration not found: {id}")]
    ConfigurationNotFound { id: String },

    /// Field not present in the configuration
    #[error("field not found in configuration {configuration}: {name}")]
    FieldNotFound { configuration: String, name: String },

    /// Field already present in the configuration
    #[error("duplicate field in configuration {configuration}: {name}")]
    DuplicateField { configuration: String, name: String },

    /// Content model already associated with a configuration
    #[error("content model {content_model} is already associated with configuration {owner}")]
    ContentModelInUse {
        content_model: String,
        owner: String,
    },

    /// Content model not associated with the configuration
    #[error("content model not associated with configuration {configuration}: {content_model}")]
    ContentModelNotFound {
        configuration: String,
        content_model: String,
    },

    /// Field name failed syntax checks
    #[error("invalid field name '{name}': {message}")]
    InvalidFieldName { name: String, message: String },

    /// Content model identifier failed syntax checks
    #[error("invalid content model '{id}': {message}")]
    InvalidContentModel { id: String, message: String },

    /// Configuration id could not be parsed
    #[error("invalid configuration id '{id}'")]
    InvalidConfigurationId { id: String },

    /// User-correctable input problems
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// A save sequence stopped part way through
    #[error("save stopped at {stage}: {source}")]
    PartialSave {
        stage: SaveStage,
        #[source]
        source: Box<MetadataError>,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MetadataError {
    /// Create a configuration-not-found error
    pub fn configuration_not_found(id: impl ToString) -> Self {
        Self::ConfigurationNotFound { id: id.to_string() }
    }

    /// Create a field-not-found error
    pub fn field_not_found(configuration: impl ToString, name: impl ToString) -> Self {
        Self::FieldNotFound {
            configuration: configuration.to_string(),
            name: name.to_string(),
        }
    }

    /// Create a duplicate field error
    pub fn duplicate_field(configuration: impl ToString, name: impl ToString) -> Self {
        Self::DuplicateField {
            configuration: configuration.to_string(),
            name: name.to_string(),
        }
    }

    /// Wrap a store failure with the save stage it interrupted
    pub fn partial_save(stage: SaveStage, source: MetadataError) -> Self {
        Self::PartialSave {
            stage,
            source: Box::new(source),
        }
    }
}

/// Steps of a save, in the order they are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SaveStage {
    InsertContentModels,
    DeleteContentModels,
    InsertFields,
    DeleteFields,
    UpdateFields,
    UpdateDescription,
}

impl fmt::Display for SaveStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::InsertContentModels => "content model insertion",
            Self::DeleteContentModels => "content model deletion",
            Self::InsertFields => "field insertion",
            Self::DeleteFields => "field deletion",
            Self::UpdateFields => "field update",
            Self::UpdateDescription => "description update",
        };
        f.write_str(s)
    }
}

/// A single problem with a submitted input, attached to the offending element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Dotted path of the form element the message belongs to
    pub element: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(element: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.element, self.message)
    }
}

/// Validation errors collected for one round trip
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, element: impl Into<String>, message: impl Into<String>) {
        self.0.push(ValidationError::new(element, message));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// Errors attached to one element
    pub fn for_element<'a>(&'a self, element: &'a str) -> impl Iterator<Item = &'a ValidationError> {
        self.0.iter().filter(move |e| e.element == element)
    }

    /// Ok when nothing was reported
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(MetadataError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&messages.join("; "))
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
