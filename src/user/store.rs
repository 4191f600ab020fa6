use async_trait::async_trait;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::{Collection, Database};

use crate::database::StoreError;
use crate::database::db::{PENDING_USERS, USERS};
use crate::user::model::{PendingUser, User};

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_reset_token(&self, token_hash: &str) -> Result<Option<User>, StoreError>;
    /// Fails with [`StoreError::Duplicate`] when the email is taken.
    async fn insert(&self, user: User) -> Result<User, StoreError>;
    /// Replace the stored document with `user` (matched on its id).
    async fn replace(&self, user: &User) -> Result<(), StoreError>;
    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait PendingUserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<PendingUser>, StoreError>;
    async fn insert(&self, pending: PendingUser) -> Result<PendingUser, StoreError>;
    /// Overwrite code and expiry in place.
    async fn update_otp(&self, pending: &PendingUser) -> Result<(), StoreError>;
    async fn delete_by_email(&self, email: &str) -> Result<(), StoreError>;
}

pub struct MongoUserStore {
    collection: Collection<User>,
}

impl MongoUserStore {
    pub fn new(db: &Database) -> Self {
        MongoUserStore {
            collection: db.collection::<User>(USERS),
        }
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, StoreError> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.collection.find_one(doc! { "email": email }).await?)
    }

    async fn find_by_reset_token(&self, token_hash: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .collection
            .find_one(doc! { "resetPasswordToken": token_hash })
            .await?)
    }

    async fn insert(&self, mut user: User) -> Result<User, StoreError> {
        let result = self.collection.insert_one(&user).await?;
        user.id = result.inserted_id.as_object_id();
        Ok(user)
    }

    async fn replace(&self, user: &User) -> Result<(), StoreError> {
        let id = user
            .id
            .ok_or_else(|| StoreError::Backend("User ID missing".to_string()))?;
        self.collection.replace_one(doc! { "_id": id }, user).await?;
        Ok(())
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}

pub struct MongoPendingUserStore {
    collection: Collection<PendingUser>,
}

impl MongoPendingUserStore {
    pub fn new(db: &Database) -> Self {
        MongoPendingUserStore {
            collection: db.collection::<PendingUser>(PENDING_USERS),
        }
    }
}

#[async_trait]
impl PendingUserStore for MongoPendingUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<PendingUser>, StoreError> {
        Ok(self.collection.find_one(doc! { "email": email }).await?)
    }

    async fn insert(&self, mut pending: PendingUser) -> Result<PendingUser, StoreError> {
        let result = self.collection.insert_one(&pending).await?;
        pending.id = result.inserted_id.as_object_id();
        Ok(pending)
    }

    async fn update_otp(&self, pending: &PendingUser) -> Result<(), StoreError> {
        self.collection
            .update_one(
                doc! { "email": &pending.email },
                doc! {
                    "$set": {
                        "verificationOtp": &pending.verification_otp,
                        "otpExpire": mongodb::bson::DateTime::from_chrono(pending.otp_expire),
                    }
                },
            )
            .await?;
        Ok(())
    }

    async fn delete_by_email(&self, email: &str) -> Result<(), StoreError> {
        self.collection.delete_one(doc! { "email": email }).await?;
        Ok(())
    }
}
