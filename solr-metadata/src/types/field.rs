//! Display field and content model records.

use serde::{Deserialize, Serialize};

use super::ids::{ContentModelId, FieldName};

/// Sort weight given to freshly added fields so they sort last.
pub const NEW_FIELD_WEIGHT: i32 = 10000;

/// A persisted display field: which Solr field to show, under what label,
/// and where it sorts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldSpec {
    pub solr_field: FieldName,
    pub display_label: String,
    #[serde(default)]
    pub weight: i32,
}

impl FieldSpec {
    pub fn new(solr_field: FieldName, display_label: impl Into<String>, weight: i32) -> Self {
        Self {
            solr_field,
            display_label: display_label.into(),
            weight,
        }
    }
}

/// A field as held by an edit session.
///
/// `volatile` marks rows added during the session that have not been saved
/// yet. It never reaches storage: converting into a [`FieldSpec`] drops it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldRow {
    #[serde(flatten)]
    pub spec: FieldSpec,
    pub volatile: bool,
}

impl FieldRow {
    /// A row loaded from storage
    pub fn persisted(spec: FieldSpec) -> Self {
        Self {
            spec,
            volatile: false,
        }
    }

    /// A row added in the session: labelled with its own name, sorted last
    pub fn added(name: FieldName) -> Self {
        let label = name.to_string();
        Self {
            spec: FieldSpec::new(name, label, NEW_FIELD_WEIGHT),
            volatile: true,
        }
    }

    pub fn name(&self) -> &FieldName {
        &self.spec.solr_field
    }
}

impl From<FieldRow> for FieldSpec {
    fn from(row: FieldRow) -> Self {
        row.spec
    }
}

/// Membership of a content model in a configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentModelAssociation {
    pub cmodel: ContentModelId,
}

impl ContentModelAssociation {
    pub fn new(cmodel: ContentModelId) -> Self {
        Self { cmodel }
    }
}

/// Sort display fields by weight, ties broken by field name.
pub fn sort_by_weight<'a, I>(fields: I) -> Vec<&'a FieldSpec>
where
    I: IntoIterator<Item = &'a FieldSpec>,
{
    let mut sorted: Vec<&FieldSpec> = fields.into_iter().collect();
    sorted.sort_by(|a, b| {
        a.weight
            .cmp(&b.weight)
            .then_with(|| a.solr_field.cmp(&b.solr_field))
    });
    sorted
}
