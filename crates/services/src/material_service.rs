use std::collections::BTreeSet;
use std::sync::Arc;

use quiz_core::model::{Material, MaterialDraft, MaterialId};
use storage::repository::MaterialRepository;
use tracing::info;

use crate::auth_service::AuthSession;
use crate::error::MaterialServiceError;

/// Search box and tag selector of the materials list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterialFilter {
    pub search: String,
    pub tag: Option<String>,
}

impl MaterialFilter {
    #[must_use]
    pub fn apply<'a>(&self, materials: &'a [Material]) -> Vec<&'a Material> {
        materials
            .iter()
            .filter(|m| m.matches(&self.search, self.tag.as_deref()))
            .collect()
    }
}

/// Every tag used across the materials, sorted and unique.
#[must_use]
pub fn all_tags(materials: &[Material]) -> Vec<String> {
    materials
        .iter()
        .flat_map(|m| m.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Study material CRUD for the signed-in user.
#[derive(Clone)]
pub struct MaterialService {
    auth: Arc<AuthSession>,
    materials: Arc<dyn MaterialRepository>,
}

impl MaterialService {
    #[must_use]
    pub fn new(auth: Arc<AuthSession>, materials: Arc<dyn MaterialRepository>) -> Self {
        Self { auth, materials }
    }

    /// # Errors
    ///
    /// Returns `MaterialServiceError::Auth` when signed out, or `Storage` on backend failure.
    pub async fn list(&self) -> Result<Vec<Material>, MaterialServiceError> {
        let token = self.auth.token()?;
        let materials = self
            .auth
            .guard(self.materials.list_materials(&token).await)
            .await?;
        Ok(materials)
    }

    /// # Errors
    ///
    /// Returns `MaterialServiceError::Storage` with `NotFound` for a missing material.
    pub async fn get(&self, id: &MaterialId) -> Result<Material, MaterialServiceError> {
        let token = self.auth.token()?;
        let material = self
            .auth
            .guard(self.materials.get_material(&token, id).await)
            .await?;
        Ok(material)
    }

    /// Validate and store a new material.
    ///
    /// # Errors
    ///
    /// Returns `MaterialServiceError::Material` for validation failures.
    /// Returns `MaterialServiceError::Storage` if persistence fails.
    pub async fn create(&self, draft: MaterialDraft) -> Result<MaterialId, MaterialServiceError> {
        let validated = draft.validate()?;
        let token = self.auth.token()?;
        let id = self
            .auth
            .guard(self.materials.create_material(&token, &validated).await)
            .await?;
        info!(material = %id, "material created");
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns `MaterialServiceError::Material` for validation failures.
    /// Returns `MaterialServiceError::Storage` if persistence fails.
    pub async fn update(
        &self,
        id: &MaterialId,
        draft: MaterialDraft,
    ) -> Result<(), MaterialServiceError> {
        let validated = draft.validate()?;
        let token = self.auth.token()?;
        self.auth
            .guard(self.materials.update_material(&token, id, &validated).await)
            .await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `MaterialServiceError::Storage` if the material is missing or deletion fails.
    pub async fn delete(&self, id: &MaterialId) -> Result<(), MaterialServiceError> {
        let token = self.auth.token()?;
        self.auth
            .guard(self.materials.delete_material(&token, id).await)
            .await?;
        info!(material = %id, "material deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::MaterialError;
    use quiz_core::time::fixed_clock;
    use storage::InMemoryRepository;
    use storage::repository::StorageError;

    async fn signed_in_service() -> MaterialService {
        let repo = InMemoryRepository::with_clock(fixed_clock());
        let auth = Arc::new(AuthSession::new(
            fixed_clock(),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
        ));
        auth.register("ada", "ada@example.com", "secret1")
            .await
            .unwrap();
        MaterialService::new(auth, Arc::new(repo))
    }

    fn draft(title: &str, content: &str, tags: &[&str]) -> MaterialDraft {
        MaterialDraft {
            title: title.into(),
            content: content.into(),
            tags: tags.iter().map(|t| (*t).to_owned()).collect(),
        }
    }

    #[tokio::test]
    async fn create_update_delete_round_trip() {
        let service = signed_in_service().await;
        let id = service
            .create(draft("Cells", "Mitochondria make ATP.", &["bio"]))
            .await
            .unwrap();

        service
            .update(&id, draft("Cells 2", "Ribosomes make proteins.", &["bio", "exam"]))
            .await
            .unwrap();
        let material = service.get(&id).await.unwrap();
        assert_eq!(material.title, "Cells 2");
        assert_eq!(material.tags, ["bio", "exam"]);
        assert!(material.updated_at.is_some());

        service.delete(&id).await.unwrap();
        assert!(matches!(
            service.get(&id).await,
            Err(MaterialServiceError::Storage(StorageError::NotFound))
        ));
    }

    #[tokio::test]
    async fn create_rejects_blank_content() {
        let service = signed_in_service().await;
        let err = service.create(draft("Cells", "   ", &[])).await.unwrap_err();
        assert!(matches!(
            err,
            MaterialServiceError::Material(MaterialError::EmptyContent)
        ));
    }

    #[tokio::test]
    async fn signed_out_calls_fail_fast() {
        let repo = InMemoryRepository::new();
        let auth = Arc::new(AuthSession::new(
            fixed_clock(),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
        ));
        let service = MaterialService::new(auth, Arc::new(repo));
        assert!(matches!(
            service.list().await,
            Err(MaterialServiceError::Auth(_))
        ));
    }

    #[tokio::test]
    async fn filter_and_tags_cover_listed_materials() {
        let service = signed_in_service().await;
        service
            .create(draft("Rust ownership", "Moves and borrows.", &["rust"]))
            .await
            .unwrap();
        service
            .create(draft("French", "Paris is the capital.", &["lang", "geo"]))
            .await
            .unwrap();
        let materials = service.list().await.unwrap();

        assert_eq!(all_tags(&materials), ["geo", "lang", "rust"]);

        let by_text = MaterialFilter {
            search: "paris".into(),
            tag: None,
        };
        assert_eq!(by_text.apply(&materials).len(), 1);

        let by_tag = MaterialFilter {
            search: String::new(),
            tag: Some("rust".into()),
        };
        assert_eq!(by_tag.apply(&materials)[0].title, "Rust ownership");
    }
}
