//! In-process store, used for previews and tests.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{first_foreign_owner, MetadataStore};
use crate::error::{MetadataError, Result};
use crate::types::{
    ConfigurationId, ConfigurationRecord, ConfigurationSummary, ContentModelId, DescriptionSpec,
    FieldName, FieldSpec,
};

/// Store that keeps configurations in memory
#[derive(Default)]
pub struct MemoryMetadataStore {
    records: RwLock<BTreeMap<ConfigurationId, ConfigurationRecord>>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn modify<T>(
        &self,
        id: ConfigurationId,
        f: impl FnOnce(&mut ConfigurationRecord) -> Result<T>,
    ) -> Result<T> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&id)
            .ok_or_else(|| MetadataError::configuration_not_found(id))?;
        f(record)
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn list_configurations(&self) -> Result<Vec<ConfigurationSummary>> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .map(ConfigurationRecord::summary)
            .collect())
    }

    async fn create_configuration(&self, name: &str) -> Result<ConfigurationSummary> {
        let record = ConfigurationRecord::new(name);
        let summary = record.summary();
        self.records.write().await.insert(record.id, record);
        Ok(summary)
    }

    async fn get_configuration(&self, id: ConfigurationId) -> Result<ConfigurationRecord> {
        self.records
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| MetadataError::configuration_not_found(id))
    }

    async fn delete_configuration(&self, id: ConfigurationId) -> Result<()> {
        self.records
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| MetadataError::configuration_not_found(id))
    }

    async fn add_fields(
        &self,
        id: ConfigurationId,
        fields: &BTreeMap<FieldName, FieldSpec>,
    ) -> Result<()> {
        self.modify(id, |record| record.add_fields(fields)).await
    }

    async fn update_fields(
        &self,
        id: ConfigurationId,
        fields: &BTreeMap<FieldName, FieldSpec>,
    ) -> Result<()> {
        self.modify(id, |record| record.update_fields(fields)).await
    }

    async fn delete_fields(&self, id: ConfigurationId, names: &BTreeSet<FieldName>) -> Result<()> {
        self.modify(id, |record| {
            record.delete_fields(names);
            Ok(())
        })
        .await
    }

    async fn add_content_models(
        &self,
        id: ConfigurationId,
        cmodels: &BTreeSet<ContentModelId>,
    ) -> Result<()> {
        let mut records = self.records.write().await;
        let in_use = records
            .values()
            .flat_map(|r| r.content_models.keys().map(move |cm| (cm, r.id)));
        if let Some((cmodel, owner)) = first_foreign_owner(in_use, id, cmodels) {
            return Err(MetadataError::ContentModelInUse {
                content_model: cmodel.to_string(),
                owner: owner.to_string(),
            });
        }
        let record = records
            .get_mut(&id)
            .ok_or_else(|| MetadataError::configuration_not_found(id))?;
        record.add_content_models(cmodels);
        Ok(())
    }

    async fn delete_content_models(
        &self,
        id: ConfigurationId,
        cmodels: &BTreeSet<ContentModelId>,
    ) -> Result<()> {
        self.modify(id, |record| record.delete_content_models(cmodels)).await
    }

    async fn content_models_in_use(&self) -> Result<BTreeMap<ContentModelId, ConfigurationId>> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .flat_map(|r| r.content_models.keys().map(move |cm| (cm.clone(), r.id)))
            .collect())
    }

    async fn update_description(
        &self,
        id: ConfigurationId,
        description: &DescriptionSpec,
    ) -> Result<()> {
        self.modify(id, |record| {
            record.set_description(description.clone());
            Ok(())
        })
        .await
    }
}
