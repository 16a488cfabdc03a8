//! File-backed store: one YAML file per configuration.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use ulid::Ulid;

use super::{first_foreign_owner, MetadataStore};
use crate::error::{MetadataError, Result};
use crate::types::{
    ConfigurationId, ConfigurationRecord, ConfigurationSummary, ContentModelId, DescriptionSpec,
    FieldName, FieldSpec,
};

/// Store that keeps each configuration in its own YAML file.
///
/// ```text
/// <root>/
///   configurations/
///     <configuration id>.yaml
/// ```
///
/// Writes go to a temp file that is renamed into place. A single lock
/// serializes read-modify-write cycles within the process.
pub struct YamlMetadataStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl YamlMetadataStore {
    /// Open or create a store rooted at `root`
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(root.join("configurations")).await?;
        debug!(root = %root.display(), "metadata store opened");
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    fn configurations_dir(&self) -> PathBuf {
        self.root.join("configurations")
    }

    fn record_path(&self, id: ConfigurationId) -> PathBuf {
        self.configurations_dir().join(format!("{id}.yaml"))
    }

    async fn read_record(&self, id: ConfigurationId) -> Result<ConfigurationRecord> {
        let path = self.record_path(id);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(MetadataError::configuration_not_found(id));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_yaml_ng::from_str(&content)?)
    }

    async fn write_record(&self, record: &ConfigurationRecord) -> Result<()> {
        let yaml = serde_yaml_ng::to_string(record)?;
        atomic_write(&self.record_path(record.id), yaml.as_bytes()).await
    }

    async fn read_all(&self) -> Result<Vec<ConfigurationRecord>> {
        let mut records = Vec::new();
        let mut entries = fs::read_dir(self.configurations_dir()).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
                continue;
            }
            let content = match fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(e) => {
                    warn!(?path, %e, "skipping unreadable configuration file");
                    continue;
                }
            };
            match serde_yaml_ng::from_str::<ConfigurationRecord>(&content) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(?path, %e, "skipping invalid configuration file");
                }
            }
        }
        records.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(records)
    }

    async fn modify(
        &self,
        id: ConfigurationId,
        f: impl FnOnce(&mut ConfigurationRecord) -> Result<()>,
    ) -> Result<()> {
        let _lock = self.write_lock.lock().await;
        let mut record = self.read_record(id).await?;
        f(&mut record)?;
        self.write_record(&record).await
    }
}

#[async_trait]
impl MetadataStore for YamlMetadataStore {
    async fn list_configurations(&self) -> Result<Vec<ConfigurationSummary>> {
        Ok(self
            .read_all()
            .await?
            .iter()
            .map(ConfigurationRecord::summary)
            .collect())
    }

    async fn create_configuration(&self, name: &str) -> Result<ConfigurationSummary> {
        let _lock = self.write_lock.lock().await;
        let record = ConfigurationRecord::new(name);
        self.write_record(&record).await?;
        debug!(id = %record.id, name, "configuration created");
        Ok(record.summary())
    }

    async fn get_configuration(&self, id: ConfigurationId) -> Result<ConfigurationRecord> {
        self.read_record(id).await
    }

    async fn delete_configuration(&self, id: ConfigurationId) -> Result<()> {
        let _lock = self.write_lock.lock().await;
        match fs::remove_file(self.record_path(id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(MetadataError::configuration_not_found(id))
            }
            Err(e) => Err(e.into()),
        }
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
        let _lock = self.write_lock.lock().await;
        let all = self.read_all().await?;
        let in_use = all
            .iter()
            .flat_map(|r| r.content_models.keys().map(move |cm| (cm, r.id)));
        if let Some((cmodel, owner)) = first_foreign_owner(in_use, id, cmodels) {
            return Err(MetadataError::ContentModelInUse {
                content_model: cmodel.to_string(),
                owner: owner.to_string(),
            });
        }
        let mut record = self.read_record(id).await?;
        record.add_content_models(cmodels);
        self.write_record(&record).await
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
            .read_all()
            .await?
            .into_iter()
            .flat_map(|r| {
                let id = r.id;
                r.content_models.into_keys().map(move |cm| (cm, id))
            })
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

/// Write to a temp file then rename for atomic persistence.
async fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "no parent dir"))?;
    let tmp = dir.join(format!(".tmp_{}", Ulid::new()));
    fs::write(&tmp, data).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::contract;
    use tempfile::TempDir;

    async fn open_store() -> (TempDir, YamlMetadataStore) {
        let tmp = TempDir::new().unwrap();
        let store = YamlMetadataStore::open(tmp.path().join("metadata"))
            .await
            .unwrap();
        (tmp, store)
    }

    #[tokio::test]
    async fn open_creates_directories() {
        let (tmp, _store) = open_store().await;
        assert!(tmp.path().join("metadata/configurations").is_dir());
    }

    #[tokio::test]
    async fn field_crud() {
        let (_tmp, store) = open_store().await;
        contract::field_crud(&store).await;
    }

    #[tokio::test]
    async fn content_model_exclusivity() {
        let (_tmp, store) = open_store().await;
        contract::content_model_exclusivity(&store).await;
    }

    #[tokio::test]
    async fn delete_cascades() {
        let (_tmp, store) = open_store().await;
        contract::delete_cascades(&store).await;
    }

    #[tokio::test]
    async fn description_round_trip() {
        let (_tmp, store) = open_store().await;
        contract::description_round_trip(&store).await;
    }

    #[tokio::test]
    async fn persistence_survives_reopen() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("metadata");
        let id = {
            let store = YamlMetadataStore::open(&root).await.unwrap();
            store.create_configuration("Books").await.unwrap().id
        };

        let store = YamlMetadataStore::open(&root).await.unwrap();
        let listed = store.list_configurations().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, id);
        assert_eq!(listed[0].name, "Books");
        assert!(root.join(format!("configurations/{id}.yaml")).exists());
    }

    #[tokio::test]
    async fn invalid_files_are_skipped() {
        let (_tmp, store) = open_store().await;
        store.create_configuration("Good").await.unwrap();
        fs::write(store.configurations_dir().join("broken.yaml"), "::not yaml: [")
            .await
            .unwrap();

        let listed = store.list_configurations().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Good");
    }

    #[tokio::test]
    async fn unreadable_files_are_skipped() {
        let (_tmp, store) = open_store().await;
        let good = store.create_configuration("Good").await.unwrap();
        store
            .add_content_models(
                good.id,
                &BTreeSet::from([ContentModelId::new("islandora:sp_pdf").unwrap()]),
            )
            .await
            .unwrap();
        fs::write(store.configurations_dir().join("junk.yaml"), [0xff, 0xfe, 0x00])
            .await
            .unwrap();

        let listed = store.list_configurations().await.unwrap();
        assert_eq!(listed.len(), 1);
        let in_use = store.content_models_in_use().await.unwrap();
        assert_eq!(in_use.len(), 1);
    }
}
