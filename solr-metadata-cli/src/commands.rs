//! Command handlers. Each writes its output to `out` and returns an error
//! the caller turns into an exit code.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use solr_metadata::{
    Action, ConfigEditor, ConfigurationId, ContentModelId, FieldName, LukeSnapshot,
    MetadataStore, Outcome, SessionState, SolrIndex, StaticCatalog, StaticIndex,
    TruncationType, ValidationErrors, YamlMetadataStore,
};
use tracing::{debug, warn};

use crate::cli::EditArgs;
use crate::config::Settings;

pub type Editor = ConfigEditor<YamlMetadataStore, IndexSource, StaticCatalog>;

/// Where indexed field names come from, as configured
pub enum IndexSource {
    Luke(LukeSnapshot),
    Fields(StaticIndex),
}

#[async_trait]
impl SolrIndex for IndexSource {
    async fn indexed_field_names(&self) -> solr_metadata::Result<BTreeSet<String>> {
        match self {
            Self::Luke(snapshot) => snapshot.indexed_field_names().await,
            Self::Fields(index) => index.indexed_field_names().await,
        }
    }
}

/// Build the editor from settings
pub async fn open_editor(settings: &Settings) -> Result<Editor> {
    let store = YamlMetadataStore::open(&settings.data_dir)
        .await
        .with_context(|| format!("opening store at {}", settings.data_dir.display()))?;

    let index = match &settings.luke_file {
        Some(path) => IndexSource::Luke(LukeSnapshot::new(path)),
        None => {
            if settings.index_fields.is_empty() {
                warn!("no luke_file or index_fields configured; every field will be rejected");
            }
            IndexSource::Fields(StaticIndex::new(settings.index_fields.iter().cloned()))
        }
    };

    let catalog = match &settings.content_models_file {
        Some(path) => StaticCatalog::load(path)
            .await
            .with_context(|| format!("loading content models from {}", path.display()))?,
        None => StaticCatalog::new(settings.content_models.clone()),
    };
    debug!(empty_catalog = catalog.is_empty(), "editor ready");

    Ok(ConfigEditor::new(
        Arc::new(store),
        Arc::new(index),
        Arc::new(catalog),
    ))
}

fn write_value<T: Serialize>(out: &mut dyn Write, value: &T, json: bool) -> Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    } else {
        write!(out, "{}", serde_yaml_ng::to_string(value)?)?;
    }
    Ok(())
}

pub async fn run_list(editor: &Editor, json: bool, out: &mut dyn Write) -> Result<()> {
    let configurations = editor.store().list_configurations().await?;
    if json {
        return write_value(out, &configurations, true);
    }
    if configurations.is_empty() {
        writeln!(out, "No configurations.")?;
    }
    for config in configurations {
        writeln!(out, "{}  {}", config.id, config.name)?;
    }
    Ok(())
}

pub async fn run_create(editor: &Editor, name: &str, out: &mut dyn Write) -> Result<()> {
    let summary = editor.store().create_configuration(name).await?;
    writeln!(out, "{}", summary.id)?;
    Ok(())
}

pub async fn run_show(editor: &Editor, id: &str, json: bool, out: &mut dyn Write) -> Result<()> {
    let id: ConfigurationId = id.parse()?;
    let state = editor.open(id).await?;
    let view = editor.render(&state, &ValidationErrors::new()).await?;
    write_value(out, &view, json)
}

/// Translate edit flags into form actions, in form order
fn edit_actions(state: &SessionState, args: &EditArgs) -> Result<Vec<Action>> {
    let mut actions = Vec::new();

    for pid in &args.add_cmodels {
        actions.push(Action::AddContentModel {
            content_model: ContentModelId::new(pid.as_str())?,
        });
    }
    if !args.remove_cmodels.is_empty() {
        let selected = args
            .remove_cmodels
            .iter()
            .map(|pid| ContentModelId::new(pid.as_str()))
            .collect::<solr_metadata::Result<_>>()?;
        actions.push(Action::RemoveContentModels { selected });
    }

    for name in &args.add_fields {
        actions.push(Action::AddField { name: name.clone() });
    }
    if !args.remove_fields.is_empty() {
        let selected = args
            .remove_fields
            .iter()
            .map(|name| FieldName::new(name.as_str()))
            .collect::<solr_metadata::Result<_>>()?;
        actions.push(Action::RemoveFields { selected });
    }

    let mut updates: BTreeMap<&str, (Option<String>, Option<i32>)> = BTreeMap::new();
    for (field, label) in &args.labels {
        updates.entry(field.as_str()).or_default().0 = Some(label.clone());
    }
    for (field, weight) in &args.weights {
        updates.entry(field.as_str()).or_default().1 = Some(*weight);
    }
    for (field, (label, weight)) in updates {
        actions.push(Action::UpdateField {
            name: FieldName::new(field)?,
            label,
            weight,
        });
    }

    if args.touches_description() {
        let current = state.description();
        let mut truncation = current.truncation.clone();
        if let Some(kind) = &args.truncation_type {
            truncation.truncation_type = kind.parse::<TruncationType>().map_err(|e| anyhow!(e))?;
        }
        if let Some(max_length) = args.max_length {
            truncation.max_length = max_length;
        }
        if let Some(word_safe) = args.word_safe {
            truncation.word_safe = word_safe;
        }
        if let Some(ellipsis) = args.ellipsis {
            truncation.ellipsis = ellipsis;
        }
        if let Some(min) = args.min_wordsafe_length {
            truncation.min_wordsafe_length = min;
        }
        let field = match &args.description_field {
            Some(field) => field.clone(),
            None => current
                .field
                .as_ref()
                .map(|f| f.to_string())
                .unwrap_or_default(),
        };
        actions.push(Action::SetDescription {
            field,
            label: args
                .description_label
                .clone()
                .unwrap_or_else(|| current.label.clone()),
            truncation,
        });
    }

    if args.save {
        actions.push(Action::Save);
    }
    Ok(actions)
}

pub async fn run_edit(editor: &Editor, args: &EditArgs, out: &mut dyn Write) -> Result<()> {
    let id: ConfigurationId = args.id.parse()?;
    let mut state = editor.open(id).await?;

    for action in edit_actions(&state, args)? {
        let element = action.element();
        let (next, outcome) = editor.dispatch(state, action).await?;
        state = next;
        match outcome {
            Outcome::Updated | Outcome::DeleteRequested { .. } => {}
            Outcome::Rejected { errors } => errors
                .into_result()
                .with_context(|| format!("{element} rejected"))?,
            Outcome::Saved { message } => writeln!(out, "{message}")?,
        }
    }

    if !args.save {
        let view = editor.render(&state, &ValidationErrors::new()).await?;
        write_value(out, &view, false)?;
        let unsaved = state.unsaved_fields().count();
        if unsaved > 0 {
            writeln!(out, "# {unsaved} unsaved field(s); pass --save to keep them")?;
        }
    }
    Ok(())
}

pub async fn run_delete(editor: &Editor, id: &str, yes: bool, out: &mut dyn Write) -> Result<()> {
    let id: ConfigurationId = id.parse()?;
    let state = editor.open(id).await?;
    let name = state.name().to_string();

    let (_, outcome) = editor.dispatch(state, Action::Delete).await?;
    let Outcome::DeleteRequested { configuration_id } = outcome else {
        bail!("delete of {id} was not accepted");
    };
    if !yes {
        bail!("refusing to delete configuration '{name}' ({configuration_id}) without --yes");
    }

    editor.delete(configuration_id).await?;
    writeln!(out, "Deleted configuration '{name}'")?;
    Ok(())
}

pub async fn run_preview(
    editor: &Editor,
    id: &str,
    values: &[String],
    separator: &str,
    out: &mut dyn Write,
) -> Result<()> {
    let id: ConfigurationId = id.parse()?;
    let state = editor.open(id).await?;
    let description = state.description();
    let Some(field) = &description.field else {
        bail!("configuration {id} has no description field");
    };

    writeln!(out, "{} ({field}):", description.label)?;
    for line in description.truncation.apply(values, separator) {
        writeln!(out, "  {line}")?;
    }
    Ok(())
}
