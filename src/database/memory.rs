//! In-memory stores for tests. Same contracts as the Mongo stores, including
//! email uniqueness and newest-first paper listing.

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::sync::Mutex;

use crate::database::StoreError;
use crate::paper::model::{Paper, PaperStatus};
use crate::paper::store::PaperStore;
use crate::user::model::{PendingUser, User};
use crate::user::store::{PendingUserStore, UserStore};

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    pub fn count(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id.as_ref() == Some(id)).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_reset_token(&self, token_hash: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| u.reset_password_token.as_deref() == Some(token_hash))
            .cloned())
    }

    async fn insert(&self, mut user: User) -> Result<User, StoreError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate);
        }
        user.id = Some(user.id.unwrap_or_else(ObjectId::new));
        users.push(user.clone());
        Ok(user)
    }

    async fn replace(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|u| u.email == user.email && u.id != user.id)
        {
            return Err(StoreError::Duplicate);
        }
        if let Some(slot) = users.iter_mut().find(|u| u.id == user.id) {
            *slot = user.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id.as_ref() != Some(id));
        Ok(users.len() != before)
    }
}

#[derive(Default)]
pub struct MemoryPendingUserStore {
    pending: Mutex<Vec<PendingUser>>,
}

impl MemoryPendingUserStore {
    pub fn count(&self) -> usize {
        self.pending.lock().unwrap().len()
    }
}

#[async_trait]
impl PendingUserStore for MemoryPendingUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<PendingUser>, StoreError> {
        let pending = self.pending.lock().unwrap();
        Ok(pending.iter().find(|p| p.email == email).cloned())
    }

    async fn insert(&self, mut record: PendingUser) -> Result<PendingUser, StoreError> {
        let mut pending = self.pending.lock().unwrap();
        if pending.iter().any(|p| p.email == record.email) {
            return Err(StoreError::Duplicate);
        }
        record.id = Some(ObjectId::new());
        pending.push(record.clone());
        Ok(record)
    }

    async fn update_otp(&self, record: &PendingUser) -> Result<(), StoreError> {
        let mut pending = self.pending.lock().unwrap();
        if let Some(slot) = pending.iter_mut().find(|p| p.email == record.email) {
            slot.verification_otp = record.verification_otp.clone();
            slot.otp_expire = record.otp_expire;
        }
        Ok(())
    }

    async fn delete_by_email(&self, email: &str) -> Result<(), StoreError> {
        self.pending.lock().unwrap().retain(|p| p.email != email);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryPaperStore {
    papers: Mutex<Vec<Paper>>,
}

#[async_trait]
impl PaperStore for MemoryPaperStore {
    async fn insert(&self, mut paper: Paper) -> Result<Paper, StoreError> {
        paper.id = Some(ObjectId::new());
        self.papers.lock().unwrap().push(paper.clone());
        Ok(paper)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Paper>, StoreError> {
        let papers = self.papers.lock().unwrap();
        Ok(papers.iter().find(|p| p.id.as_ref() == Some(id)).cloned())
    }

    async fn list_by_owner(
        &self,
        owner: &ObjectId,
        status: Option<PaperStatus>,
    ) -> Result<Vec<Paper>, StoreError> {
        let papers = self.papers.lock().unwrap();
        let mut found: Vec<Paper> = papers
            .iter()
            .filter(|p| &p.user == owner)
            .filter(|p| status.is_none_or(|s| p.status == s))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn replace(&self, paper: &Paper) -> Result<(), StoreError> {
        let mut papers = self.papers.lock().unwrap();
        if let Some(slot) = papers.iter_mut().find(|p| p.id == paper.id) {
            *slot = paper.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError> {
        let mut papers = self.papers.lock().unwrap();
        let before = papers.len();
        papers.retain(|p| p.id.as_ref() != Some(id));
        Ok(papers.len() != before)
    }
}
