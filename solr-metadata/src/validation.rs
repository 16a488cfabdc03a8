//! Round-trip validation of form actions.
//!
//! Every action is validated against the current session before it is
//! reduced or submitted. Problems are reported per form element and block
//! the action; the session is left as it was.

use std::collections::BTreeSet;

use crate::error::ValidationErrors;
use crate::session::{Action, SessionState};
use crate::types::{ContentModelId, FieldName};

pub const ADD_FIELD_INPUT: &str = "fields.add_field.available_solr_fields";
pub const FIELDS_TABLE: &str = "fields.table";
pub const CONTENT_MODEL_SELECT: &str = "content_models.add.cmodel_select";
pub const DESCRIPTION_FIELD_INPUT: &str = "description.available_solr_fields";
pub const DESCRIPTION_TRUNCATION: &str = "description.truncation.min_wordsafe_length";
/// Selection errors are reported against the form as a whole.
pub const FORM: &str = "form";

const NOTHING_SELECTED: &str = "Must select at least one entry to remove!";

/// Outside knowledge validation needs, gathered by the caller.
///
/// Only what the action at hand requires has to be filled in; see
/// [`requires_index`] and [`requires_content_models`].
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    pub indexed_fields: Option<BTreeSet<String>>,
    pub available_content_models: Option<BTreeSet<ContentModelId>>,
}

impl ValidationContext {
    fn in_index(&self, name: &str) -> bool {
        self.indexed_fields
            .as_ref()
            .is_some_and(|fields| fields.contains(name))
    }
}

/// Whether validating `action` needs the index field list
pub fn requires_index(state: &SessionState, action: &Action) -> bool {
    match action {
        Action::AddField { .. } => true,
        Action::Save => state.description().is_configured(),
        _ => false,
    }
}

/// Whether validating `action` needs the available content model pool
pub fn requires_content_models(action: &Action) -> bool {
    matches!(action, Action::AddContentModel { .. })
}

fn invalid_field(field: &str) -> String {
    format!("The field {field} is not a valid field within Solr!")
}

/// Check an action against the session it would apply to.
pub fn validate(state: &SessionState, action: &Action, ctx: &ValidationContext) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    match action {
        Action::AddField { name } => {
            let name = name.trim();
            if FieldName::new(name).is_err() || !ctx.in_index(name) {
                errors.push(ADD_FIELD_INPUT, invalid_field(name));
            } else if state.has_field(name) {
                errors.push(
                    ADD_FIELD_INPUT,
                    format!("The field {name} already exists in this configuration!"),
                );
            }
        }
        Action::RemoveFields { selected } => {
            if !selected.iter().any(|name| state.fields().contains_key(name)) {
                errors.push(FORM, NOTHING_SELECTED);
            }
        }
        Action::UpdateField { name, .. } => {
            if !state.fields().contains_key(name) {
                errors.push(
                    FIELDS_TABLE,
                    format!("The field {name} is not part of this configuration!"),
                );
            }
        }
        Action::AddContentModel { content_model } => {
            let available = ctx
                .available_content_models
                .as_ref()
                .is_some_and(|pool| pool.contains(content_model));
            if !available || state.content_models().contains_key(content_model) {
                errors.push(
                    CONTENT_MODEL_SELECT,
                    format!("The content model {content_model} is not available for this configuration!"),
                );
            }
        }
        Action::RemoveContentModels { selected } => {
            if !selected
                .iter()
                .any(|id| state.content_models().contains_key(id))
            {
                errors.push(FORM, NOTHING_SELECTED);
            }
        }
        Action::SetDescription { field, .. } => {
            let field = field.trim();
            if !field.is_empty() && FieldName::new(field).is_err() {
                errors.push(DESCRIPTION_FIELD_INPUT, invalid_field(field));
            }
        }
        Action::Delete => {}
        Action::Save => {
            let description = state.description();
            if let Some(field) = &description.field {
                if !ctx.in_index(field.as_str()) {
                    errors.push(DESCRIPTION_FIELD_INPUT, invalid_field(field.as_str()));
                }
            }
            if description.truncation.min_wordsafe_length < 1 {
                errors.push(
                    DESCRIPTION_TRUNCATION,
                    "The minimum word-safe length must be at least 1.",
                );
            }
        }
    }

    errors
}
