//! Display configuration for Solr-indexed repository metadata
//!
//! `solr-metadata` decides which fields extracted from a Solr index are shown
//! for a group of repository objects, under what labels and in what order,
//! and how the description field is truncated.
//!
//! # Architecture
//!
//! - **Session state**: an edit session is an explicit [`SessionState`] value,
//!   changed only by [`SessionState::reduce`] with an [`Action`]
//! - **Validation before every step**: [`validation::validate`] reports
//!   problems per form element; rejected actions leave the session as it was
//! - **Reconciliation on save**: [`reconcile::diff`] turns stored and session
//!   state into inserts, updates and deletes, applied content models first
//! - **Collaborators as traits**: [`MetadataStore`], [`SolrIndex`] and
//!   [`ContentModelCatalog`], with YAML, Luke snapshot and static
//!   implementations
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use solr_metadata::{Action, ConfigEditor, LukeSnapshot, StaticCatalog, YamlMetadataStore};
//!
//! # async fn example() -> solr_metadata::Result<()> {
//! let store = YamlMetadataStore::open(".solr-metadata").await?;
//! let config = solr_metadata::MetadataStore::create_configuration(&store, "Images").await?;
//! let editor = ConfigEditor::new(
//!     Arc::new(store),
//!     Arc::new(LukeSnapshot::new("luke.json")),
//!     Arc::new(StaticCatalog::default()),
//! );
//!
//! let state = editor.open(config.id).await?;
//! let (state, _) = editor
//!     .dispatch(state, Action::AddField { name: "dc.title".into() })
//!     .await?;
//! let (_, outcome) = editor.dispatch(state, Action::Save).await?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod editor;
pub mod error;
pub mod index;
pub mod reconcile;
pub mod render;
pub mod session;
pub mod store;
mod truncate;
pub mod types;
pub mod validation;

pub use catalog::{ContentModelCatalog, StaticCatalog};
pub use editor::{ConfigEditor, Outcome, SAVED_MESSAGE};
pub use error::{MetadataError, Result, SaveStage, ValidationError, ValidationErrors};
pub use index::{LukeSnapshot, SolrIndex, StaticIndex};
pub use reconcile::{diff, Diff, SavePlan};
pub use render::FormView;
pub use session::{Action, SessionState};
pub use store::{MemoryMetadataStore, MetadataStore, YamlMetadataStore};
pub use types::{
    ConfigurationId, ConfigurationRecord, ConfigurationSummary, ContentModelAssociation,
    ContentModelId, DescriptionSpec, FieldName, FieldRow, FieldSpec, TruncationPolicy,
    TruncationType, NEW_FIELD_WEIGHT,
};
