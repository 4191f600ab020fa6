use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::{Collection, Database};

use crate::database::StoreError;
use crate::database::db::PAPERS;
use crate::paper::model::{Paper, PaperStatus};

#[async_trait]
pub trait PaperStore: Send + Sync {
    async fn insert(&self, paper: Paper) -> Result<Paper, StoreError>;
    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Paper>, StoreError>;
    /// Newest first.
    async fn list_by_owner(
        &self,
        owner: &ObjectId,
        status: Option<PaperStatus>,
    ) -> Result<Vec<Paper>, StoreError>;
    async fn replace(&self, paper: &Paper) -> Result<(), StoreError>;
    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError>;
}

pub struct MongoPaperStore {
    collection: Collection<Paper>,
}

impl MongoPaperStore {
    pub fn new(db: &Database) -> Self {
        MongoPaperStore {
            collection: db.collection::<Paper>(PAPERS),
        }
    }
}

#[async_trait]
impl PaperStore for MongoPaperStore {
    async fn insert(&self, mut paper: Paper) -> Result<Paper, StoreError> {
        let result = self.collection.insert_one(&paper).await?;
        paper.id = result.inserted_id.as_object_id();
        Ok(paper)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Paper>, StoreError> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn list_by_owner(
        &self,
        owner: &ObjectId,
        status: Option<PaperStatus>,
    ) -> Result<Vec<Paper>, StoreError> {
        let mut filter = doc! { "user": owner };
        if let Some(status) = status {
            filter.insert("status", status.as_str());
        }

        let cursor = self
            .collection
            .find(filter)
            .sort(doc! { "createdAt": -1 })
            .await?;

        Ok(cursor.try_collect().await?)
    }

    async fn replace(&self, paper: &Paper) -> Result<(), StoreError> {
        let id = paper
            .id
            .ok_or_else(|| StoreError::Backend("Paper ID missing".to_string()))?;
        self.collection.replace_one(doc! { "_id": id }, paper).await?;
        Ok(())
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}
