//! Persistence for display configurations.
//!
//! [`MetadataStore`] is the collaborator the editor saves through. All calls
//! are keyed by configuration id. Two implementations ship with the crate:
//! [`YamlMetadataStore`] keeps one YAML file per configuration on disk and
//! [`MemoryMetadataStore`] keeps everything in process.

mod memory;
mod yaml;

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{
    ConfigurationId, ConfigurationRecord, ConfigurationSummary, ContentModelAssociation,
    ContentModelId, DescriptionSpec, FieldName, FieldSpec,
};

pub use memory::MemoryMetadataStore;
pub use yaml::YamlMetadataStore;

/// Storage abstraction for display configurations
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// List every configuration
    async fn list_configurations(&self) -> Result<Vec<ConfigurationSummary>>;

    /// Create an empty configuration
    async fn create_configuration(&self, name: &str) -> Result<ConfigurationSummary>;

    /// Load the full record of a configuration
    async fn get_configuration(&self, id: ConfigurationId) -> Result<ConfigurationRecord>;

    /// Delete a configuration together with its fields, content models and description
    async fn delete_configuration(&self, id: ConfigurationId) -> Result<()>;

    async fn get_fields(&self, id: ConfigurationId) -> Result<BTreeMap<FieldName, FieldSpec>> {
        Ok(self.get_configuration(id).await?.fields)
    }

    /// Insert new fields; fails if any name is already present
    async fn add_fields(
        &self,
        id: ConfigurationId,
        fields: &BTreeMap<FieldName, FieldSpec>,
    ) -> Result<()>;

    /// Overwrite existing fields; fails if any name is missing
    async fn update_fields(
        &self,
        id: ConfigurationId,
        fields: &BTreeMap<FieldName, FieldSpec>,
    ) -> Result<()>;

    async fn delete_fields(&self, id: ConfigurationId, names: &BTreeSet<FieldName>) -> Result<()>;

    async fn get_content_models(
        &self,
        id: ConfigurationId,
    ) -> Result<BTreeMap<ContentModelId, ContentModelAssociation>> {
        Ok(self.get_configuration(id).await?.content_models)
    }

    /// Associate content models; fails if one belongs to another configuration
    async fn add_content_models(
        &self,
        id: ConfigurationId,
        cmodels: &BTreeSet<ContentModelId>,
    ) -> Result<()>;

    /// Drop associations; fails if one is not associated with `id`
    async fn delete_content_models(
        &self,
        id: ConfigurationId,
        cmodels: &BTreeSet<ContentModelId>,
    ) -> Result<()>;

    /// Every associated content model and the configuration that owns it
    async fn content_models_in_use(&self) -> Result<BTreeMap<ContentModelId, ConfigurationId>>;

    async fn get_description(&self, id: ConfigurationId) -> Result<DescriptionSpec> {
        Ok(self.get_configuration(id).await?.description)
    }

    async fn update_description(
        &self,
        id: ConfigurationId,
        description: &DescriptionSpec,
    ) -> Result<()>;
}

/// Content models in `cmodels` that another configuration already owns
pub(crate) fn first_foreign_owner<'a>(
    in_use: impl IntoIterator<Item = (&'a ContentModelId, ConfigurationId)>,
    id: ConfigurationId,
    cmodels: &BTreeSet<ContentModelId>,
) -> Option<(ContentModelId, ConfigurationId)> {
    in_use
        .into_iter()
        .find(|(cmodel, owner)| *owner != id && cmodels.contains(*cmodel))
        .map(|(cmodel, owner)| (cmodel.clone(), owner))
}
