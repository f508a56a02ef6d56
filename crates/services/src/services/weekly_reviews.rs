//! Weekly reviews. Wins, challenges and next week's focus are mention-synced.

use db::models::{
    family::FamilyMembership,
    mention::{Mention, MentionableType},
    weekly_review::{CreateWeeklyReview, UpdateWeeklyReview, WeeklyReview},
};
use sqlx::{SqliteConnection, SqlitePool};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use super::{
    mention_sync::{MentionSyncError, MentionSyncService, Mentioned},
    patch::{is_unique_violation, patch_text},
};

#[derive(Debug, Error)]
pub enum WeeklyReviewError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    MentionSync(#[from] MentionSyncError),
    #[error("weekly review not found")]
    NotFound,
    #[error("user {user_id} is not a member of family {family_id}")]
    NotFamilyMember { family_id: Uuid, user_id: Uuid },
    #[error("a review for this week already exists")]
    AlreadyExists,
}

#[derive(Clone)]
pub struct WeeklyReviewService {
    pool: SqlitePool,
    mentions: MentionSyncService,
}

impl WeeklyReviewService {
    pub fn new(pool: SqlitePool, mentions: MentionSyncService) -> Self {
        Self { pool, mentions }
    }

    pub async fn create(
        &self,
        family_id: Uuid,
        data: &CreateWeeklyReview,
    ) -> Result<Mentioned<WeeklyReview>, WeeklyReviewError> {
        let mut tx = self.pool.begin().await?;
        Self::ensure_member(&mut tx, family_id, data.user_id).await?;

        let review = WeeklyReview::create(&mut *tx, family_id, data)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    WeeklyReviewError::AlreadyExists
                } else {
                    e.into()
                }
            })?;
        let diff = self.mentions.reconcile_all(&mut tx, &review).await?;
        let mentions =
            Mention::find_by_owner(&mut *tx, MentionableType::WeeklyReview, review.id).await?;
        tx.commit().await?;

        info!(
            review_id = %review.id,
            user_id = %review.user_id,
            week_start_date = %review.week_start_date,
            "Weekly review created"
        );

        Ok(Mentioned::new(review, mentions, &diff))
    }

    pub async fn get(&self, id: Uuid) -> Result<Mentioned<WeeklyReview>, WeeklyReviewError> {
        let review = WeeklyReview::find_by_id(&self.pool, id)
            .await?
            .ok_or(WeeklyReviewError::NotFound)?;
        let mentions =
            Mention::find_by_owner(&self.pool, MentionableType::WeeklyReview, id).await?;
        Ok(Mentioned::unchanged(review, mentions))
    }

    pub async fn update(
        &self,
        id: Uuid,
        data: &UpdateWeeklyReview,
    ) -> Result<Mentioned<WeeklyReview>, WeeklyReviewError> {
        let mut tx = self.pool.begin().await?;
        let before = WeeklyReview::find_by_id(&mut *tx, id)
            .await?
            .ok_or(WeeklyReviewError::NotFound)?;
        Self::ensure_member(&mut tx, before.family_id, data.editor_id).await?;

        let wins = patch_text(data.wins.as_deref(), before.wins.as_deref());
        let challenges = patch_text(data.challenges.as_deref(), before.challenges.as_deref());
        let next_week_focus = patch_text(
            data.next_week_focus.as_deref(),
            before.next_week_focus.as_deref(),
        );

        let after = WeeklyReview::update(
            &mut *tx,
            id,
            wins.as_deref(),
            challenges.as_deref(),
            next_week_focus.as_deref(),
        )
        .await?;
        let diff = self
            .mentions
            .reconcile_changes(&mut tx, &before, &after)
            .await?;
        let mentions = Mention::find_by_owner(&mut *tx, MentionableType::WeeklyReview, id).await?;
        tx.commit().await?;

        Ok(Mentioned::new(after, mentions, &diff))
    }

    pub async fn delete(&self, id: Uuid, actor_id: Uuid) -> Result<(), WeeklyReviewError> {
        let mut tx = self.pool.begin().await?;
        let review = WeeklyReview::find_by_id(&mut *tx, id)
            .await?
            .ok_or(WeeklyReviewError::NotFound)?;
        Self::ensure_member(&mut tx, review.family_id, actor_id).await?;

        self.mentions
            .purge(&mut tx, MentionableType::WeeklyReview, id)
            .await?;
        WeeklyReview::delete(&mut *tx, id).await?;
        tx.commit().await?;

        info!(review_id = %id, "Weekly review deleted");
        Ok(())
    }

    async fn ensure_member(
        conn: &mut SqliteConnection,
        family_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), WeeklyReviewError> {
        if FamilyMembership::is_member(&mut *conn, family_id, user_id).await? {
            Ok(())
        } else {
            Err(WeeklyReviewError::NotFamilyMember { family_id, user_id })
        }
    }
}
