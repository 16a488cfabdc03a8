//! Edit-session state and the reducer that applies user actions to it.
//!
//! A session starts from what the store holds for a configuration and is
//! carried through every round trip explicitly. Edits never touch storage;
//! only [`Action::Save`] does, through the editor.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::types::{
    ConfigurationId, ConfigurationRecord, ContentModelAssociation, ContentModelId,
    DescriptionSpec, FieldName, FieldRow, FieldSpec, TruncationPolicy,
};

/// Something the administrator did on the configuration form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Action {
    /// Add a Solr field to the display table
    AddField { name: String },
    /// Remove the checked rows from the display table
    RemoveFields { selected: BTreeSet<FieldName> },
    /// Edit the label or weight of a display table row
    UpdateField {
        name: FieldName,
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        weight: Option<i32>,
    },
    /// Associate a content model with the configuration
    AddContentModel { content_model: ContentModelId },
    /// Drop the checked content model associations
    RemoveContentModels { selected: BTreeSet<ContentModelId> },
    /// Replace the description inputs
    SetDescription {
        #[serde(default)]
        field: String,
        #[serde(default)]
        label: String,
        #[serde(default)]
        truncation: TruncationPolicy,
    },
    /// Persist the session
    Save,
    /// Ask to delete the configuration
    Delete,
}

impl Action {
    /// Name of the form element that triggers this action
    pub fn element(&self) -> &'static str {
        match self {
            Self::AddField { .. } => "fields.add_field",
            Self::RemoveFields { .. } => "fields.remove_selected",
            Self::UpdateField { .. } => "fields.table",
            Self::AddContentModel { .. } => "content_models.add",
            Self::RemoveContentModels { .. } => "content_models.remove_selected",
            Self::SetDescription { .. } => "description",
            Self::Save => "save",
            Self::Delete => "delete",
        }
    }

    /// Save and delete submit the form; everything else re-renders it
    pub fn is_submit(&self) -> bool {
        matches!(self, Self::Save | Self::Delete)
    }
}

/// The state of one configuration while it is being edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionState {
    configuration_id: ConfigurationId,
    name: String,
    content_models: BTreeMap<ContentModelId, ContentModelAssociation>,
    fields: BTreeMap<FieldName, FieldRow>,
    description: DescriptionSpec,
}

impl SessionState {
    /// Start a session from stored state
    pub fn from_parts(
        configuration_id: ConfigurationId,
        name: impl Into<String>,
        content_models: BTreeMap<ContentModelId, ContentModelAssociation>,
        fields: BTreeMap<FieldName, FieldSpec>,
        description: DescriptionSpec,
    ) -> Self {
        Self {
            configuration_id,
            name: name.into(),
            content_models,
            fields: fields
                .into_iter()
                .map(|(k, v)| (k, FieldRow::persisted(v)))
                .collect(),
            description,
        }
    }

    pub fn from_record(record: ConfigurationRecord) -> Self {
        Self::from_parts(
            record.id,
            record.name,
            record.content_models,
            record.fields,
            record.description,
        )
    }

    pub fn configuration_id(&self) -> ConfigurationId {
        self.configuration_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_models(&self) -> &BTreeMap<ContentModelId, ContentModelAssociation> {
        &self.content_models
    }

    pub fn fields(&self) -> &BTreeMap<FieldName, FieldRow> {
        &self.fields
    }

    pub fn description(&self) -> &DescriptionSpec {
        &self.description
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.keys().any(|k| k.as_str() == name)
    }

    /// Rows added in this session that have not been saved yet
    pub fn unsaved_fields(&self) -> impl Iterator<Item = &FieldName> {
        self.fields
            .values()
            .filter(|row| row.volatile)
            .map(FieldRow::name)
    }

    /// Apply an action. Inputs are assumed to have passed validation;
    /// anything that still does not fit is ignored.
    pub fn reduce(mut self, action: &Action) -> Self {
        match action {
            Action::AddField { name } => {
                if let Ok(name) = FieldName::new(name.trim()) {
                    self.fields
                        .entry(name.clone())
                        .or_insert_with(|| FieldRow::added(name));
                }
            }
            Action::RemoveFields { selected } => {
                self.fields.retain(|name, _| !selected.contains(name));
            }
            Action::UpdateField {
                name,
                label,
                weight,
            } => {
                if let Some(row) = self.fields.get_mut(name) {
                    if let Some(label) = label {
                        row.spec.display_label = label.clone();
                    }
                    if let Some(weight) = weight {
                        row.spec.weight = *weight;
                    }
                }
            }
            Action::AddContentModel { content_model } => {
                self.content_models.insert(
                    content_model.clone(),
                    ContentModelAssociation::new(content_model.clone()),
                );
            }
            Action::RemoveContentModels { selected } => {
                self.content_models.retain(|id, _| !selected.contains(id));
            }
            Action::SetDescription {
                field,
                label,
                truncation,
            } => {
                let field = match field.trim() {
                    "" => None,
                    f => FieldName::new(f).ok(),
                };
                self.description = DescriptionSpec {
                    field,
                    label: label.clone(),
                    truncation: truncation.clone(),
                };
            }
            Action::Save | Action::Delete => {}
        }
        self
    }
}
