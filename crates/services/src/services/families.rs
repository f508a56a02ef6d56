//! Users, families and memberships: the scope mention handles resolve in.

use db::models::{
    family::{AddFamilyMember, CreateFamily, Family, FamilyMembership, FamilyRole},
    user::{CreateUser, User},
};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use super::patch::is_unique_violation;

#[derive(Debug, Error)]
pub enum FamilyServiceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("user not found: {0}")]
    UserNotFound(Uuid),
    #[error("family not found: {0}")]
    FamilyNotFound(Uuid),
    #[error("a user with email {0} already exists")]
    EmailTaken(String),
    #[error("{0} must not be blank")]
    Blank(&'static str),
}

#[derive(Clone)]
pub struct FamilyService {
    pool: SqlitePool,
}

impl FamilyService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_user(&self, data: &CreateUser) -> Result<User, FamilyServiceError> {
        if data.name.trim().is_empty() {
            return Err(FamilyServiceError::Blank("name"));
        }
        if data.email.trim().is_empty() {
            return Err(FamilyServiceError::Blank("email"));
        }

        let user = User::create(&self.pool, data).await.map_err(|e| {
            if is_unique_violation(&e) {
                FamilyServiceError::EmailTaken(data.email.trim().to_lowercase())
            } else {
                e.into()
            }
        })?;

        info!(user_id = %user.id, "User created");
        Ok(user)
    }

    /// Create a family with its owner as the first admin
    pub async fn create_family(&self, data: &CreateFamily) -> Result<Family, FamilyServiceError> {
        if data.name.trim().is_empty() {
            return Err(FamilyServiceError::Blank("family name"));
        }

        let mut tx = self.pool.begin().await?;
        if User::find_by_id(&mut *tx, data.owner_id).await?.is_none() {
            return Err(FamilyServiceError::UserNotFound(data.owner_id));
        }

        let family = Family::create(&mut *tx, &data.name).await?;
        FamilyMembership::create(&mut *tx, family.id, data.owner_id, FamilyRole::Admin).await?;
        tx.commit().await?;

        info!(family_id = %family.id, owner_id = %data.owner_id, "Family created");
        Ok(family)
    }

    /// Adding an existing member again only updates their role
    pub async fn add_member(
        &self,
        family_id: Uuid,
        data: &AddFamilyMember,
    ) -> Result<FamilyMembership, FamilyServiceError> {
        let mut tx = self.pool.begin().await?;
        if Family::find_by_id(&mut *tx, family_id).await?.is_none() {
            return Err(FamilyServiceError::FamilyNotFound(family_id));
        }
        if User::find_by_id(&mut *tx, data.user_id).await?.is_none() {
            return Err(FamilyServiceError::UserNotFound(data.user_id));
        }

        let membership = FamilyMembership::create(
            &mut *tx,
            family_id,
            data.user_id,
            data.role.unwrap_or_default(),
        )
        .await?;
        tx.commit().await?;

        info!(
            family_id = %family_id,
            user_id = %data.user_id,
            role = %membership.role,
            "Family member added"
        );
        Ok(membership)
    }

    pub async fn members(&self, family_id: Uuid) -> Result<Vec<User>, FamilyServiceError> {
        if Family::find_by_id(&self.pool, family_id).await?.is_none() {
            return Err(FamilyServiceError::FamilyNotFound(family_id));
        }
        Ok(User::find_family_members(&self.pool, family_id).await?)
    }
}
