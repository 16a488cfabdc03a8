//! Builds the view model of the configuration form from session state.
//!
//! Rendering is pure: everything outside the session (catalog labels and
//! content models owned by other configurations) is passed in.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{ValidationError, ValidationErrors};
use crate::session::SessionState;
use crate::types::{sort_by_weight, ConfigurationId, ContentModelId, FieldName, TruncationPolicy};

pub const NO_CONTENT_MODELS: &str = "No content models associated.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentModelRow {
    pub id: ContentModelId,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentModelsView {
    pub rows: Vec<ContentModelRow>,
    /// Shown in place of the table when there are no rows
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_text: Option<&'static str>,
    pub show_remove_selected: bool,
    /// Options for the add select; `None` hides the add controls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_options: Option<Vec<ContentModelRow>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldRowView {
    pub solr_field: FieldName,
    pub display_label: String,
    pub weight: i32,
    /// Added in this session and not saved yet
    pub unsaved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldsView {
    pub rows: Vec<FieldRowView>,
    pub show_remove_selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescriptionView {
    pub field: Option<FieldName>,
    pub label: String,
    pub label_visible: bool,
    pub truncation: TruncationPolicy,
}

/// Everything needed to draw the configuration form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormView {
    pub configuration_id: ConfigurationId,
    pub name: String,
    pub content_models: ContentModelsView,
    pub fields: FieldsView,
    pub description: DescriptionView,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ValidationError>,
}

/// Render the form for `state`.
///
/// `catalog` lists every content model with its label; `in_use` lists the
/// content models currently stored against any configuration.
pub fn render(
    state: &SessionState,
    catalog: &BTreeMap<ContentModelId, String>,
    in_use: &BTreeMap<ContentModelId, ConfigurationId>,
    errors: &ValidationErrors,
) -> FormView {
    let label_for = |id: &ContentModelId| {
        catalog
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    };

    let rows: Vec<ContentModelRow> = state
        .content_models()
        .keys()
        .map(|id| ContentModelRow {
            id: id.clone(),
            label: label_for(id),
        })
        .collect();

    let add_options: Vec<ContentModelRow> = catalog
        .iter()
        .filter(|(id, _)| !state.content_models().contains_key(*id))
        .filter(|(id, _)| {
            in_use
                .get(*id)
                .is_none_or(|owner| *owner == state.configuration_id())
        })
        .map(|(id, label)| ContentModelRow {
            id: id.clone(),
            label: label.clone(),
        })
        .collect();

    let content_models = ContentModelsView {
        empty_text: rows.is_empty().then_some(NO_CONTENT_MODELS),
        show_remove_selected: !rows.is_empty(),
        rows,
        add_options: (!add_options.is_empty()).then_some(add_options),
    };

    let specs = state.fields().values().map(|row| &row.spec);
    let field_rows: Vec<FieldRowView> = sort_by_weight(specs)
        .into_iter()
        .map(|spec| FieldRowView {
            solr_field: spec.solr_field.clone(),
            display_label: spec.display_label.clone(),
            weight: spec.weight,
            unsaved: state
                .fields()
                .get(&spec.solr_field)
                .is_some_and(|row| row.volatile),
        })
        .collect();

    let fields = FieldsView {
        show_remove_selected: !field_rows.is_empty(),
        rows: field_rows,
    };

    let desc = state.description();
    let description = DescriptionView {
        field: desc.field.clone(),
        label: desc.label.clone(),
        label_visible: desc.field.is_some(),
        truncation: desc.truncation.clone(),
    };

    FormView {
        configuration_id: state.configuration_id(),
        name: state.name().to_string(),
        content_models,
        fields,
        description,
        errors: errors.iter().cloned().collect(),
    }
}

/// Content models that may still be added to the session's configuration
pub fn available_content_models(
    state: &SessionState,
    catalog: &BTreeMap<ContentModelId, String>,
    in_use: &BTreeMap<ContentModelId, ConfigurationId>,
) -> Vec<ContentModelId> {
    render(state, catalog, in_use, &ValidationErrors::new())
        .content_models
        .add_options
        .unwrap_or_default()
        .into_iter()
        .map(|row| row.id)
        .collect()
}
