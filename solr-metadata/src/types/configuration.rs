//! The persisted shape of one display configuration.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::description::DescriptionSpec;
use super::field::{ContentModelAssociation, FieldSpec};
use super::ids::{ConfigurationId, ContentModelId, FieldName};
use crate::error::{MetadataError, Result};

/// Id and name of a configuration, as listed by a store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigurationSummary {
    pub id: ConfigurationId,
    pub name: String,
}

/// Everything stored for a configuration.
///
/// Store implementations hold one record per configuration and route all
/// mutations through the methods here, which enforce field uniqueness.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfigurationRecord {
    pub id: ConfigurationId,
    pub name: String,
    #[serde(default)]
    pub content_models: BTreeMap<ContentModelId, ContentModelAssociation>,
    #[serde(default)]
    pub fields: BTreeMap<FieldName, FieldSpec>,
    #[serde(default)]
    pub description: DescriptionSpec,
    pub updated_at: DateTime<Utc>,
}

impl ConfigurationRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ConfigurationId::new(),
            name: name.into(),
            content_models: BTreeMap::new(),
            fields: BTreeMap::new(),
            description: DescriptionSpec::default(),
            updated_at: Utc::now(),
        }
    }

    pub fn summary(&self) -> ConfigurationSummary {
        ConfigurationSummary {
            id: self.id,
            name: self.name.clone(),
        }
    }

    pub fn add_fields(&mut self, fields: &BTreeMap<FieldName, FieldSpec>) -> Result<()> {
        if let Some(name) = fields.keys().find(|k| self.fields.contains_key(*k)) {
            return Err(MetadataError::duplicate_field(self.id, name));
        }
        self.fields
            .extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.touch();
        Ok(())
    }

    pub fn update_fields(&mut self, fields: &BTreeMap<FieldName, FieldSpec>) -> Result<()> {
        if let Some(name) = fields.keys().find(|k| !self.fields.contains_key(*k)) {
            return Err(MetadataError::field_not_found(self.id, name));
        }
        for (name, spec) in fields {
            self.fields.insert(name.clone(), spec.clone());
        }
        self.touch();
        Ok(())
    }

    /// Remove fields; names that are already gone are skipped.
    pub fn delete_fields<'a>(&mut self, names: impl IntoIterator<Item = &'a FieldName>) {
        for name in names {
            self.fields.remove(name);
        }
        self.touch();
    }

    pub fn add_content_models<'a>(
        &mut self,
        cmodels: impl IntoIterator<Item = &'a ContentModelId>,
    ) {
        for cmodel in cmodels {
            self.content_models
                .insert(cmodel.clone(), ContentModelAssociation::new(cmodel.clone()));
        }
        self.touch();
    }

    /// Drop associations; fails without changes if one is not associated.
    pub fn delete_content_models<'a>(
        &mut self,
        cmodels: impl IntoIterator<Item = &'a ContentModelId> + Clone,
    ) -> Result<()> {
        if let Some(missing) = cmodels
            .clone()
            .into_iter()
            .find(|cm| !self.content_models.contains_key(*cm))
        {
            return Err(MetadataError::ContentModelNotFound {
                configuration: self.id.to_string(),
                content_model: missing.to_string(),
            });
        }
        for cmodel in cmodels {
            self.content_models.remove(cmodel);
        }
        self.touch();
        Ok(())
    }

    pub fn set_description(&mut self, description: DescriptionSpec) {
        self.description = description;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str, weight: i32) -> (FieldName, FieldSpec) {
        let n = FieldName::new(name).unwrap();
        (n.clone(), FieldSpec::new(n, name.to_uppercase(), weight))
    }

    #[test]
    fn add_fields_rejects_duplicates_without_partial_write() {
        let mut record = ConfigurationRecord::new("Images");
        record
            .add_fields(&BTreeMap::from([spec("title", 1)]))
            .unwrap();

        let err = record
            .add_fields(&BTreeMap::from([spec("date", 2), spec("title", 3)]))
            .unwrap_err();
        assert!(matches!(err, MetadataError::DuplicateField { .. }));
        assert_eq!(record.fields.len(), 1);
    }

    #[test]
    fn update_fields_requires_existing() {
        let mut record = ConfigurationRecord::new("Images");
        let err = record
            .update_fields(&BTreeMap::from([spec("title", 1)]))
            .unwrap_err();
        assert!(matches!(err, MetadataError::FieldNotFound { .. }));
    }

    #[test]
    fn content_models_add_and_delete() {
        let mut record = ConfigurationRecord::new("Images");
        let cm = ContentModelId::new("islandora:sp_basic_image").unwrap();
        record.add_content_models([&cm]);
        assert!(record.content_models.contains_key(&cm));
        record.delete_content_models([&cm]).unwrap();
        assert!(record.content_models.is_empty());
    }

    #[test]
    fn deleting_unassociated_content_model_fails() {
        let mut record = ConfigurationRecord::new("Images");
        let image = ContentModelId::new("islandora:sp_basic_image").unwrap();
        let pdf = ContentModelId::new("islandora:sp_pdf").unwrap();
        record.add_content_models([&image]);

        let err = record.delete_content_models([&image, &pdf]).unwrap_err();
        assert!(matches!(err, MetadataError::ContentModelNotFound { .. }));
        assert!(record.content_models.contains_key(&image));
    }
}
