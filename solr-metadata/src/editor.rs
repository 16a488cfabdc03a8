//! ConfigEditor: drives one round trip of the configuration form.
//!
//! Each round trip validates the triggering action against the session,
//! then either reduces it into a new session or submits it. Saving turns
//! the session into a [`SavePlan`] and writes it through the store in a
//! fixed order.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::ContentModelCatalog;
use crate::error::{MetadataError, Result, SaveStage, ValidationErrors};
use crate::index::SolrIndex;
use crate::reconcile::SavePlan;
use crate::render::{self, FormView};
use crate::session::{Action, SessionState};
use crate::store::MetadataStore;
use crate::types::{ConfigurationId, ContentModelId, FieldName};
use crate::validation::{self, ValidationContext};

pub const SAVED_MESSAGE: &str = "The Solr metadata display configuration options have been saved.";

/// What a dispatched action led to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum Outcome {
    /// The session changed; re-render it
    Updated,
    /// Validation failed; the session is unchanged
    Rejected { errors: ValidationErrors },
    /// The session was written to the store and reloaded
    Saved { message: String },
    /// The administrator asked to delete the configuration; confirm before
    /// calling [`ConfigEditor::delete`]
    DeleteRequested { configuration_id: ConfigurationId },
}

/// Ties the session flow to its collaborators.
pub struct ConfigEditor<S, I, C> {
    store: Arc<S>,
    index: Arc<I>,
    catalog: Arc<C>,
}

impl<S, I, C> Clone for ConfigEditor<S, I, C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            index: Arc::clone(&self.index),
            catalog: Arc::clone(&self.catalog),
        }
    }
}

impl<S, I, C> ConfigEditor<S, I, C>
where
    S: MetadataStore,
    I: SolrIndex,
    C: ContentModelCatalog,
{
    pub fn new(store: Arc<S>, index: Arc<I>, catalog: Arc<C>) -> Self {
        Self {
            store,
            index,
            catalog,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Start a session from what the store holds
    pub async fn open(&self, id: ConfigurationId) -> Result<SessionState> {
        let record = self.store.get_configuration(id).await?;
        debug!(
            %id,
            fields = record.fields.len(),
            content_models = record.content_models.len(),
            "session opened"
        );
        Ok(SessionState::from_record(record))
    }

    /// Validate and apply one action.
    ///
    /// Validation failures are not errors: they come back as
    /// [`Outcome::Rejected`] with the session untouched. `Err` is reserved
    /// for collaborator failures.
    pub async fn dispatch(
        &self,
        state: SessionState,
        action: Action,
    ) -> Result<(SessionState, Outcome)> {
        let ctx = self.validation_context(&state, &action).await?;
        let errors = validation::validate(&state, &action, &ctx);
        if !errors.is_empty() {
            debug!(element = action.element(), errors = %errors, "action rejected");
            return Ok((state, Outcome::Rejected { errors }));
        }

        match action {
            Action::Save => {
                let id = state.configuration_id();
                self.save(&state).await?;
                let reloaded = self.open(id).await?;
                Ok((
                    reloaded,
                    Outcome::Saved {
                        message: SAVED_MESSAGE.to_string(),
                    },
                ))
            }
            Action::Delete => {
                let configuration_id = state.configuration_id();
                Ok((state, Outcome::DeleteRequested { configuration_id }))
            }
            edit => {
                debug!(element = edit.element(), "action applied");
                Ok((state.reduce(&edit), Outcome::Updated))
            }
        }
    }

    /// Render the form for a session
    pub async fn render(&self, state: &SessionState, errors: &ValidationErrors) -> Result<FormView> {
        let catalog = self.catalog.content_models().await?;
        let in_use = self.store.content_models_in_use().await?;
        Ok(render::render(state, &catalog, &in_use, errors))
    }

    /// Delete a configuration and everything that belongs to it
    pub async fn delete(&self, id: ConfigurationId) -> Result<()> {
        self.store.delete_configuration(id).await?;
        info!(%id, "configuration deleted");
        Ok(())
    }

    async fn validation_context(
        &self,
        state: &SessionState,
        action: &Action,
    ) -> Result<ValidationContext> {
        let mut ctx = ValidationContext::default();
        if validation::requires_index(state, action) {
            ctx.indexed_fields = Some(self.index.indexed_field_names().await?);
        }
        if validation::requires_content_models(action) {
            let catalog = self.catalog.content_models().await?;
            let in_use = self.store.content_models_in_use().await?;
            ctx.available_content_models = Some(
                render::available_content_models(state, &catalog, &in_use)
                    .into_iter()
                    .collect(),
            );
        }
        Ok(ctx)
    }

    /// Write the session through the store.
    ///
    /// Content models go first, then fields, then the description. A failing
    /// step stops the sequence; steps before it stay applied.
    async fn save(&self, state: &SessionState) -> Result<()> {
        let id = state.configuration_id();
        let persisted_fields = self.store.get_fields(id).await?;
        let persisted_cmodels = self.store.get_content_models(id).await?;
        let plan = SavePlan::build(&persisted_fields, &persisted_cmodels, state);
        debug!(
            %id,
            cmodels_insert = plan.content_models.to_insert.len(),
            cmodels_delete = plan.content_models.to_delete.len(),
            fields_insert = plan.fields.to_insert.len(),
            fields_update = plan.fields.to_update.len(),
            fields_delete = plan.fields.to_delete.len(),
            "save plan built"
        );

        let mut completed = Vec::new();
        let result = self.apply(id, state, &plan, &mut completed).await;
        if let Err(MetadataError::PartialSave { stage, .. }) = &result {
            if !completed.is_empty() {
                warn!(
                    %id,
                    failed = %stage,
                    ?completed,
                    "save stopped part way; configuration may be inconsistent"
                );
            }
        }
        result?;

        info!(%id, "configuration saved");
        Ok(())
    }

    async fn apply(
        &self,
        id: ConfigurationId,
        state: &SessionState,
        plan: &SavePlan,
        completed: &mut Vec<SaveStage>,
    ) -> Result<()> {
        let at = |stage: SaveStage| move |e: MetadataError| MetadataError::partial_save(stage, e);

        let cmodels_insert: BTreeSet<ContentModelId> =
            plan.content_models.to_insert.keys().cloned().collect();
        if !cmodels_insert.is_empty() {
            self.store
                .add_content_models(id, &cmodels_insert)
                .await
                .map_err(at(SaveStage::InsertContentModels))?;
            completed.push(SaveStage::InsertContentModels);
        }

        let cmodels_delete: BTreeSet<ContentModelId> =
            plan.content_models.to_delete.keys().cloned().collect();
        if !cmodels_delete.is_empty() {
            self.store
                .delete_content_models(id, &cmodels_delete)
                .await
                .map_err(at(SaveStage::DeleteContentModels))?;
            completed.push(SaveStage::DeleteContentModels);
        }

        if !plan.fields.to_insert.is_empty() {
            self.store
                .add_fields(id, &plan.fields.to_insert)
                .await
                .map_err(at(SaveStage::InsertFields))?;
            completed.push(SaveStage::InsertFields);
        }

        let fields_delete: BTreeSet<FieldName> = plan.fields.to_delete.keys().cloned().collect();
        if !fields_delete.is_empty() {
            self.store
                .delete_fields(id, &fields_delete)
                .await
                .map_err(at(SaveStage::DeleteFields))?;
            completed.push(SaveStage::DeleteFields);
        }

        if !plan.fields.to_update.is_empty() {
            self.store
                .update_fields(id, &plan.fields.to_update)
                .await
                .map_err(at(SaveStage::UpdateFields))?;
            completed.push(SaveStage::UpdateFields);
        }

        self.store
            .update_description(id, state.description())
            .await
            .map_err(at(SaveStage::UpdateDescription))?;
        completed.push(SaveStage::UpdateDescription);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::index::StaticIndex;
    use crate::store::MemoryMetadataStore;
    use crate::types::{FieldSpec, TruncationPolicy, NEW_FIELD_WEIGHT};
    use std::collections::BTreeMap;

    type Editor = ConfigEditor<MemoryMetadataStore, StaticIndex, StaticCatalog>;

    fn name(s: &str) -> FieldName {
        FieldName::new(s).unwrap()
    }

    fn cm(s: &str) -> ContentModelId {
        ContentModelId::new(s).unwrap()
    }

    async fn setup() -> (Editor, ConfigurationId) {
        let store = MemoryMetadataStore::new();
        let config = store.create_configuration("Images").await.unwrap();
        store
            .add_fields(
                config.id,
                &BTreeMap::from([
                    (name("title"), FieldSpec::new(name("title"), "Title", 1)),
                    (name("date"), FieldSpec::new(name("date"), "Date", 2)),
                ]),
            )
            .await
            .unwrap();

        let index = StaticIndex::new(["title", "date", "subject", "abstract"]);
        let catalog = StaticCatalog::new(BTreeMap::from([
            (cm("islandora:image"), "Image".to_string()),
            (cm("islandora:pdf"), "PDF".to_string()),
        ]));
        let editor = ConfigEditor::new(Arc::new(store), Arc::new(index), Arc::new(catalog));
        (editor, config.id)
    }

    #[tokio::test]
    async fn edit_then_save_reconciles_fields() {
        let (editor, id) = setup().await;
        let state = editor.open(id).await.unwrap();

        let (state, outcome) = editor
            .dispatch(
                state,
                Action::AddField {
                    name: "subject".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Updated);

        let (state, _) = editor
            .dispatch(
                state,
                Action::RemoveFields {
                    selected: [name("date")].into(),
                },
            )
            .await
            .unwrap();

        let (state, outcome) = editor.dispatch(state, Action::Save).await.unwrap();
        assert_eq!(
            outcome,
            Outcome::Saved {
                message: SAVED_MESSAGE.to_string()
            }
        );
        assert_eq!(state.unsaved_fields().count(), 0);

        let stored = editor.store().get_fields(id).await.unwrap();
        let names: Vec<_> = stored.keys().map(FieldName::as_str).collect();
        assert_eq!(names, vec!["subject", "title"]);
        assert_eq!(stored[&name("subject")].weight, NEW_FIELD_WEIGHT);
    }

    #[tokio::test]
    async fn rejected_action_leaves_session() {
        let (editor, id) = setup().await;
        let state = editor.open(id).await.unwrap();
        let before = state.clone();

        let (state, outcome) = editor
            .dispatch(
                state,
                Action::AddField {
                    name: "bogus".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(state, before);
        match outcome {
            Outcome::Rejected { errors } => {
                assert!(errors
                    .iter()
                    .any(|e| e.message == "The field bogus is not a valid field within Solr!"));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn content_models_saved_before_fields() {
        let (editor, id) = setup().await;
        let state = editor.open(id).await.unwrap();
        let (state, outcome) = editor
            .dispatch(
                state,
                Action::AddContentModel {
                    content_model: cm("islandora:pdf"),
                },
            )
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Updated);

        let (_, outcome) = editor.dispatch(state, Action::Save).await.unwrap();
        assert!(matches!(outcome, Outcome::Saved { .. }));

        let in_use = editor.store().content_models_in_use().await.unwrap();
        assert_eq!(in_use.get(&cm("islandora:pdf")), Some(&id));
    }

    #[tokio::test]
    async fn content_model_owned_elsewhere_is_rejected() {
        let (editor, id) = setup().await;
        let other = editor.store().create_configuration("Other").await.unwrap();
        editor
            .store()
            .add_content_models(other.id, &[cm("islandora:pdf")].into())
            .await
            .unwrap();

        let state = editor.open(id).await.unwrap();
        let (_, outcome) = editor
            .dispatch(
                state,
                Action::AddContentModel {
                    content_model: cm("islandora:pdf"),
                },
            )
            .await
            .unwrap();
        assert!(matches!(outcome, Outcome::Rejected { .. }));
    }

    #[tokio::test]
    async fn description_saved_with_truncation() {
        let (editor, id) = setup().await;
        let state = editor.open(id).await.unwrap();
        let truncation = TruncationPolicy {
            max_length: 80,
            ellipsis: true,
            ..TruncationPolicy::default()
        };
        let (state, _) = editor
            .dispatch(
                state,
                Action::SetDescription {
                    field: "abstract".into(),
                    label: "Abstract".into(),
                    truncation: truncation.clone(),
                },
            )
            .await
            .unwrap();
        let (_, outcome) = editor.dispatch(state, Action::Save).await.unwrap();
        assert!(matches!(outcome, Outcome::Saved { .. }));

        let stored = editor.store().get_description(id).await.unwrap();
        assert_eq!(stored.field, Some(name("abstract")));
        assert_eq!(stored.truncation, truncation);
    }

    #[tokio::test]
    async fn invalid_description_blocks_save() {
        let (editor, id) = setup().await;
        let state = editor.open(id).await.unwrap();
        let (state, _) = editor
            .dispatch(
                state,
                Action::SetDescription {
                    field: "missing".into(),
                    label: "Missing".into(),
                    truncation: TruncationPolicy::default(),
                },
            )
            .await
            .unwrap();
        let (_, outcome) = editor.dispatch(state, Action::Save).await.unwrap();
        assert!(matches!(outcome, Outcome::Rejected { .. }));
        assert!(!editor.store().get_description(id).await.unwrap().is_configured());
    }

    #[tokio::test]
    async fn malformed_description_field_is_not_silently_cleared() {
        let (editor, id) = setup().await;
        let state = editor.open(id).await.unwrap();
        let (state, outcome) = editor
            .dispatch(
                state,
                Action::SetDescription {
                    field: "dc abstract".into(),
                    label: "Abstract".into(),
                    truncation: TruncationPolicy::default(),
                },
            )
            .await
            .unwrap();
        assert!(matches!(outcome, Outcome::Rejected { .. }));
        assert_eq!(state.description().label, "");

        let (_, outcome) = editor.dispatch(state, Action::Save).await.unwrap();
        assert!(matches!(outcome, Outcome::Saved { .. }));
        let stored = editor.store().get_description(id).await.unwrap();
        assert!(stored.label.is_empty());
    }

    #[tokio::test]
    async fn delete_requires_confirmation() {
        let (editor, id) = setup().await;
        let state = editor.open(id).await.unwrap();
        let (_, outcome) = editor.dispatch(state, Action::Delete).await.unwrap();
        assert_eq!(outcome, Outcome::DeleteRequested { configuration_id: id });
        assert!(editor.store().get_configuration(id).await.is_ok());

        editor.delete(id).await.unwrap();
        assert!(editor.store().get_configuration(id).await.is_err());
    }

    #[tokio::test]
    async fn save_after_configuration_vanished_reports_error() {
        let (editor, id) = setup().await;
        let state = editor.open(id).await.unwrap();
        editor.delete(id).await.unwrap();
        let result = editor.dispatch(state, Action::Save).await;
        assert!(matches!(
            result,
            Err(MetadataError::ConfigurationNotFound { .. })
        ));
    }
}
