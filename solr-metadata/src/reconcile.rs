//! Reconciliation of edit-session state against persisted state.
//!
//! Both the field set and the content-model set of a configuration are keyed
//! maps. Saving is a key-based set difference between what the store holds
//! and what the session wants:
//!
//! - keys only in the store are deleted,
//! - keys only in the session are inserted,
//! - keys in both are updated with the session's value, unconditionally.
//!
//! Session records convert into storage records before they enter a plan,
//! which is where transient session markers are dropped.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::session::SessionState;
use crate::types::{ContentModelAssociation, ContentModelId, FieldName, FieldSpec};

/// The three disjoint key sets produced by [`diff`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diff<K: Ord, V> {
    pub to_insert: BTreeMap<K, V>,
    pub to_update: BTreeMap<K, V>,
    pub to_delete: BTreeMap<K, V>,
}

impl<K: Ord, V> Diff<K, V> {
    /// No inserts and no deletes. Updates may still be present.
    pub fn is_membership_unchanged(&self) -> bool {
        self.to_insert.is_empty() && self.to_delete.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.is_membership_unchanged() && self.to_update.is_empty()
    }
}

impl<K: Ord + Clone, V> Diff<K, V> {
    /// Every key touched by the diff.
    pub fn keys(&self) -> BTreeSet<K> {
        self.to_insert
            .keys()
            .chain(self.to_update.keys())
            .chain(self.to_delete.keys())
            .cloned()
            .collect()
    }
}

/// Compute inserts, updates and deletes that turn `persisted` into `desired`.
pub fn diff<K, P, D>(persisted: &BTreeMap<K, P>, desired: BTreeMap<K, D>) -> Diff<K, P>
where
    K: Ord + Clone,
    P: Clone,
    D: Into<P>,
{
    let to_delete = persisted
        .iter()
        .filter(|(k, _)| !desired.contains_key(*k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let mut to_insert = BTreeMap::new();
    let mut to_update = BTreeMap::new();
    for (key, record) in desired {
        if persisted.contains_key(&key) {
            to_update.insert(key, record.into());
        } else {
            to_insert.insert(key, record.into());
        }
    }

    Diff {
        to_insert,
        to_update,
        to_delete,
    }
}

/// Everything a save has to write for one configuration.
///
/// Content-model changes must be applied before field changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavePlan {
    pub content_models: Diff<ContentModelId, ContentModelAssociation>,
    pub fields: Diff<FieldName, FieldSpec>,
}

impl SavePlan {
    pub fn build(
        persisted_fields: &BTreeMap<FieldName, FieldSpec>,
        persisted_content_models: &BTreeMap<ContentModelId, ContentModelAssociation>,
        session: &SessionState,
    ) -> Self {
        let content_models = diff(persisted_content_models, session.content_models().clone());
        let fields = diff(persisted_fields, session.fields().clone());
        Self {
            content_models,
            fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldRow, NEW_FIELD_WEIGHT};

    fn name(s: &str) -> FieldName {
        FieldName::new(s).unwrap()
    }

    fn spec(s: &str, weight: i32) -> (FieldName, FieldSpec) {
        (name(s), FieldSpec::new(name(s), s, weight))
    }

    fn keys<V>(map: &BTreeMap<FieldName, V>) -> Vec<&str> {
        map.keys().map(FieldName::as_str).collect()
    }

    #[test]
    fn title_date_subject_scenario() {
        let persisted = BTreeMap::from([spec("title", 1), spec("date", 2)]);
        let desired = BTreeMap::from([
            spec("title", 1),
            (name("subject"), FieldSpec::new(name("subject"), "subject", NEW_FIELD_WEIGHT)),
        ]);

        let d = diff(&persisted, desired);
        assert_eq!(keys(&d.to_delete), vec!["date"]);
        assert_eq!(keys(&d.to_insert), vec!["subject"]);
        assert_eq!(keys(&d.to_update), vec!["title"]);
    }

    #[test]
    fn partitions_are_disjoint_and_cover_union() {
        let persisted = BTreeMap::from([spec("a", 1), spec("b", 2), spec("c", 3)]);
        let desired = BTreeMap::from([spec("b", 9), spec("c", 3), spec("d", 4), spec("e", 5)]);

        let union: BTreeSet<FieldName> = persisted.keys().chain(desired.keys()).cloned().collect();
        let d = diff(&persisted, desired);

        let ins: BTreeSet<_> = d.to_insert.keys().collect();
        let upd: BTreeSet<_> = d.to_update.keys().collect();
        let del: BTreeSet<_> = d.to_delete.keys().collect();
        assert!(ins.is_disjoint(&upd));
        assert!(ins.is_disjoint(&del));
        assert!(upd.is_disjoint(&del));
        assert_eq!(d.keys(), union);
    }

    #[test]
    fn identical_sets_update_everything_unconditionally() {
        let desired = BTreeMap::from([spec("a", 1), spec("b", 2)]);
        let d = diff(&desired, desired.clone());
        assert!(d.to_insert.is_empty());
        assert!(d.to_delete.is_empty());
        assert_eq!(d.to_update, desired);
        assert!(d.is_membership_unchanged());
        assert!(!d.is_empty());
    }

    #[test]
    fn empty_persisted_inserts_all() {
        let desired = BTreeMap::from([spec("a", 1), spec("b", 2)]);
        let d = diff(&BTreeMap::new(), desired.clone());
        assert_eq!(d.to_insert, desired);
        assert!(d.to_update.is_empty());
        assert!(d.to_delete.is_empty());
    }

    #[test]
    fn empty_desired_deletes_all() {
        let persisted = BTreeMap::from([spec("a", 1), spec("b", 2)]);
        let d = diff(&persisted, BTreeMap::<FieldName, FieldSpec>::new());
        assert_eq!(d.to_delete, persisted);
        assert!(d.to_insert.is_empty());
        assert!(d.to_update.is_empty());
    }

    #[test]
    fn update_takes_desired_value() {
        let persisted = BTreeMap::from([spec("a", 1)]);
        let desired = BTreeMap::from([spec("a", 42)]);
        let d = diff(&persisted, desired);
        assert_eq!(d.to_update[&name("a")].weight, 42);
    }

    #[test]
    fn session_rows_enter_plan_without_volatile_marker() {
        let desired = BTreeMap::from([(name("subject"), FieldRow::added(name("subject")))]);
        let d: Diff<FieldName, FieldSpec> = diff(&BTreeMap::new(), desired);
        let yaml = serde_yaml_ng::to_string(&d.to_insert).unwrap();
        assert!(!yaml.contains("volatile"));
        assert_eq!(d.to_insert[&name("subject")].weight, NEW_FIELD_WEIGHT);
    }
}
