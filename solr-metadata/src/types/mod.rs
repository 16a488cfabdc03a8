//! Core types for display configurations

mod configuration;
mod description;
mod field;
mod ids;

pub use configuration::{ConfigurationRecord, ConfigurationSummary};
pub use description::{DescriptionSpec, TruncationPolicy, TruncationType};
pub use field::{sort_by_weight, ContentModelAssociation, FieldRow, FieldSpec, NEW_FIELD_WEIGHT};
pub use ids::{ConfigurationId, ContentModelId, FieldName};
