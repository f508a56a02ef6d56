//! Family goals. Title and description are mention-synced on every save.

use db::models::{
    family::FamilyMembership,
    goal::{CreateGoal, Goal, UpdateGoal},
    mention::{Mention, MentionableType},
};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use super::{
    mention_sync::{MentionSyncError, MentionSyncService, Mentioned},
    patch::{patch_required, patch_text},
};

#[derive(Debug, Error)]
pub enum GoalServiceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    MentionSync(#[from] MentionSyncError),
    #[error("goal not found")]
    NotFound,
    #[error("user {user_id} is not a member of family {family_id}")]
    NotFamilyMember { family_id: Uuid, user_id: Uuid },
    #[error("goal title must not be blank")]
    BlankTitle,
}

#[derive(Clone)]
pub struct GoalService {
    pool: SqlitePool,
    mentions: MentionSyncService,
}

impl GoalService {
    pub fn new(pool: SqlitePool, mentions: MentionSyncService) -> Self {
        Self { pool, mentions }
    }

    pub async fn create(
        &self,
        family_id: Uuid,
        data: &CreateGoal,
    ) -> Result<Mentioned<Goal>, GoalServiceError> {
        if data.title.trim().is_empty() {
            return Err(GoalServiceError::BlankTitle);
        }

        let mut tx = self.pool.begin().await?;
        if !FamilyMembership::is_member(&mut *tx, family_id, data.creator_id).await? {
            return Err(GoalServiceError::NotFamilyMember {
                family_id,
                user_id: data.creator_id,
            });
        }

        let goal = Goal::create(&mut *tx, family_id, data).await?;
        let diff = self.mentions.reconcile_all(&mut tx, &goal).await?;
        let mentions = Mention::find_by_owner(&mut *tx, MentionableType::Goal, goal.id).await?;
        tx.commit().await?;

        info!(
            goal_id = %goal.id,
            family_id = %family_id,
            mentions = mentions.len(),
            "Goal created"
        );

        Ok(Mentioned::new(goal, mentions, &diff))
    }

    pub async fn get(&self, id: Uuid) -> Result<Mentioned<Goal>, GoalServiceError> {
        let goal = Goal::find_by_id(&self.pool, id)
            .await?
            .ok_or(GoalServiceError::NotFound)?;
        let mentions = Mention::find_by_owner(&self.pool, MentionableType::Goal, id).await?;
        Ok(Mentioned::unchanged(goal, mentions))
    }

    pub async fn list_for_family(&self, family_id: Uuid) -> Result<Vec<Goal>, GoalServiceError> {
        Ok(Goal::find_by_family_id(&self.pool, family_id).await?)
    }

    pub async fn update(
        &self,
        id: Uuid,
        data: &UpdateGoal,
    ) -> Result<Mentioned<Goal>, GoalServiceError> {
        let mut tx = self.pool.begin().await?;
        let before = Goal::find_by_id(&mut *tx, id)
            .await?
            .ok_or(GoalServiceError::NotFound)?;

        if !FamilyMembership::is_member(&mut *tx, before.family_id, data.editor_id).await? {
            return Err(GoalServiceError::NotFamilyMember {
                family_id: before.family_id,
                user_id: data.editor_id,
            });
        }

        let title = patch_required(data.title.as_deref(), &before.title)
            .ok_or(GoalServiceError::BlankTitle)?;
        let description = patch_text(data.description.as_deref(), before.description.as_deref());

        let after = Goal::update(
            &mut *tx,
            id,
            &title,
            description.as_deref(),
            data.status.unwrap_or(before.status),
            data.due_date.unwrap_or(before.due_date),
        )
        .await?;
        let diff = self
            .mentions
            .reconcile_changes(&mut tx, &before, &after)
            .await?;
        let mentions = Mention::find_by_owner(&mut *tx, MentionableType::Goal, id).await?;
        tx.commit().await?;

        Ok(Mentioned::new(after, mentions, &diff))
    }

    pub async fn delete(&self, id: Uuid, actor_id: Uuid) -> Result<(), GoalServiceError> {
        let mut tx = self.pool.begin().await?;
        let goal = Goal::find_by_id(&mut *tx, id)
            .await?
            .ok_or(GoalServiceError::NotFound)?;
        if !FamilyMembership::is_member(&mut *tx, goal.family_id, actor_id).await? {
            return Err(GoalServiceError::NotFamilyMember {
                family_id: goal.family_id,
                user_id: actor_id,
            });
        }

        let purged = self
            .mentions
            .purge(&mut tx, MentionableType::Goal, id)
            .await?;
        Goal::delete(&mut *tx, id).await?;
        tx.commit().await?;

        info!(goal_id = %id, mentions_purged = purged, "Goal deleted");
        Ok(())
    }
}
