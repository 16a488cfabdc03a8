//! Content models known to the repository.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;
use crate::types::ContentModelId;

/// Source of every content model an administrator may associate
#[async_trait]
pub trait ContentModelCatalog: Send + Sync {
    /// Content model ids with their human-readable labels
    async fn content_models(&self) -> Result<BTreeMap<ContentModelId, String>>;
}

/// A fixed catalog
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct StaticCatalog {
    models: BTreeMap<ContentModelId, String>,
}

impl StaticCatalog {
    pub fn new(models: BTreeMap<ContentModelId, String>) -> Self {
        Self { models }
    }

    /// Load a catalog from a YAML map of `id: label`
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[async_trait]
impl ContentModelCatalog for StaticCatalog {
    async fn content_models(&self) -> Result<BTreeMap<ContentModelId, String>> {
        Ok(self.models.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn catalog_from_yaml() {
        let catalog = StaticCatalog::from_yaml(
            "islandora:sp_basic_image: Basic Image\nislandora:sp_pdf: PDF\n",
        )
        .unwrap();
        let models = catalog.content_models().await.unwrap();
        assert_eq!(models.len(), 2);
        assert_eq!(
            models[&ContentModelId::new("islandora:sp_pdf").unwrap()],
            "PDF"
        );
    }

    #[test]
    fn catalog_rejects_blank_ids() {
        assert!(StaticCatalog::from_yaml("\"\": Nothing\n").is_err());
    }
}
