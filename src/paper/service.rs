use crate::paper::model::{Paper, PaperRequest, PaperStatus};
use crate::paper::store::PaperStore;
use crate::utils::error::CustomError;
use chrono::Utc;
use log::{info, warn};
use mongodb::bson::oid::ObjectId;
use std::sync::Arc;

pub struct PaperService {
    store: Arc<dyn PaperStore>,
}

pub fn parse_paper_id(id: &str) -> Result<ObjectId, CustomError> {
    ObjectId::parse_str(id.trim())
        .map_err(|_| CustomError::BadRequestError("Invalid paper ID".into()))
}

impl PaperService {
    pub fn new(store: Arc<dyn PaperStore>) -> Self {
        PaperService { store }
    }

    pub async fn list(
        &self,
        owner: &ObjectId,
        status: Option<PaperStatus>,
    ) -> Result<Vec<Paper>, CustomError> {
        Ok(self.store.list_by_owner(owner, status).await?)
    }

    /// Fetch a paper, enforcing that `owner` is its owner.
    pub async fn get(&self, owner: &ObjectId, id: &str) -> Result<Paper, CustomError> {
        let paper_id = parse_paper_id(id)?;
        let paper = self
            .store
            .find_by_id(&paper_id)
            .await?
            .ok_or_else(|| CustomError::NotFoundError("Paper not found".into()))?;

        if !paper.is_owned_by(owner) {
            warn!("User {} denied access to paper {}", owner, paper_id);
            return Err(CustomError::ForbiddenError(
                "Not authorized to access this paper".into(),
            ));
        }
        Ok(paper)
    }

    pub async fn create(
        &self,
        owner: ObjectId,
        request: PaperRequest,
    ) -> Result<Paper, CustomError> {
        let paper = request.into_paper(owner, Utc::now())?;
        let paper = self.store.insert(paper).await?;
        info!("User {} created paper {:?}", owner, paper.id);
        Ok(paper)
    }

    pub async fn update(
        &self,
        owner: &ObjectId,
        id: &str,
        request: PaperRequest,
    ) -> Result<Paper, CustomError> {
        let mut paper = self.get(owner, id).await?;
        request.apply_to(&mut paper, Utc::now())?;
        self.store.replace(&paper).await?;
        Ok(paper)
    }

    pub async fn delete(&self, owner: &ObjectId, id: &str) -> Result<(), CustomError> {
        let paper = self.get(owner, id).await?;
        let paper_id = paper
            .id
            .ok_or_else(|| CustomError::internal("Paper ID missing"))?;

        if !self.store.delete(&paper_id).await? {
            return Err(CustomError::NotFoundError("Paper not found".into()));
        }
        info!("User {} deleted paper {}", owner, paper_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryPaperStore;
    use crate::paper::model::Author;

    fn service() -> PaperService {
        PaperService::new(Arc::new(MemoryPaperStore::default()))
    }

    fn request(title: &str) -> PaperRequest {
        PaperRequest {
            title: Some(title.into()),
            abstract_text: Some("Abstract".into()),
            authors: Some(vec![Author {
                name: "Ada".into(),
                ..Default::default()
            }]),
            ..Default::default()
        }
    }

    async fn create(service: &PaperService, owner: ObjectId, title: &str) -> String {
        let paper = service.create(owner, request(title)).await.unwrap();
        paper.id.unwrap().to_hex()
    }

    #[actix_web::test]
    async fn owner_can_read_update_delete() {
        let service = service();
        let owner = ObjectId::new();
        let id = create(&service, owner, "First").await;

        assert_eq!(service.get(&owner, &id).await.unwrap().title, "First");

        let patch = PaperRequest {
            title: Some("Renamed".into()),
            ..Default::default()
        };
        let updated = service.update(&owner, &id, patch).await.unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.authors.len(), 1);

        service.delete(&owner, &id).await.unwrap();
        assert!(matches!(
            service.get(&owner, &id).await.unwrap_err(),
            CustomError::NotFoundError(_)
        ));
    }

    #[actix_web::test]
    async fn non_owner_is_always_forbidden() {
        let service = service();
        let owner = ObjectId::new();
        let intruder = ObjectId::new();
        let id = create(&service, owner, "Private").await;

        assert!(matches!(
            service.get(&intruder, &id).await.unwrap_err(),
            CustomError::ForbiddenError(_)
        ));
        assert!(matches!(
            service
                .update(&intruder, &id, request("Hijacked"))
                .await
                .unwrap_err(),
            CustomError::ForbiddenError(_)
        ));
        assert!(matches!(
            service.delete(&intruder, &id).await.unwrap_err(),
            CustomError::ForbiddenError(_)
        ));

        // untouched
        assert_eq!(service.get(&owner, &id).await.unwrap().title, "Private");
    }

    #[actix_web::test]
    async fn list_is_scoped_newest_first_and_filterable() {
        let service = service();
        let owner = ObjectId::new();
        create(&service, owner, "Older").await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let newer = create(&service, owner, "Newer").await;
        create(&service, ObjectId::new(), "Someone else's").await;

        let papers = service.list(&owner, None).await.unwrap();
        let titles: Vec<_> = papers.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Newer", "Older"]);

        let patch = PaperRequest {
            status: Some(PaperStatus::Published),
            ..Default::default()
        };
        service.update(&owner, &newer, patch).await.unwrap();
        let published = service
            .list(&owner, Some(PaperStatus::Published))
            .await
            .unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].title, "Newer");
    }

    #[actix_web::test]
    async fn malformed_id_is_bad_request() {
        let service = service();
        assert!(matches!(
            service.get(&ObjectId::new(), "not-an-id").await.unwrap_err(),
            CustomError::BadRequestError(_)
        ));
    }

    #[actix_web::test]
    async fn invalid_update_is_rejected_and_not_saved() {
        let service = service();
        let owner = ObjectId::new();
        let id = create(&service, owner, "Keep").await;
        let patch = PaperRequest {
            title: Some("   ".into()),
            ..Default::default()
        };
        assert!(service.update(&owner, &id, patch).await.is_err());
        assert_eq!(service.get(&owner, &id).await.unwrap().title, "Keep");
    }
}
