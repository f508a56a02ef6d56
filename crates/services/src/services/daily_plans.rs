//! Daily plans and their top priorities.
//!
//! The plan's reflection and each priority's title are mention-synced. A
//! priority has no family or author of its own; both come from its plan.

use db::models::{
    daily_plan::{
        CreateDailyPlan, CreateTopPriority, DailyPlan, DailyPlanWithPriorities, TopPriority,
        UpdateDailyPlan, UpdateTopPriority,
    },
    family::FamilyMembership,
    mention::{Mention, MentionableType},
};
use sqlx::{SqliteConnection, SqlitePool};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use super::{
    mention_sync::{MentionDiff, MentionSyncError, MentionSyncService, Mentioned},
    mentionable::PlannedPriority,
    patch::{is_unique_violation, patch_required, patch_text},
};

#[derive(Debug, Error)]
pub enum DailyPlanError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    MentionSync(#[from] MentionSyncError),
    #[error("daily plan not found")]
    NotFound,
    #[error("priority not found")]
    PriorityNotFound,
    #[error("user {user_id} is not a member of family {family_id}")]
    NotFamilyMember { family_id: Uuid, user_id: Uuid },
    #[error("a plan for this date already exists")]
    AlreadyExists,
    #[error("priority title must not be blank")]
    BlankTitle,
}

#[derive(Clone)]
pub struct DailyPlanService {
    pool: SqlitePool,
    mentions: MentionSyncService,
}

impl DailyPlanService {
    pub fn new(pool: SqlitePool, mentions: MentionSyncService) -> Self {
        Self { pool, mentions }
    }

    pub async fn create(
        &self,
        family_id: Uuid,
        data: &CreateDailyPlan,
    ) -> Result<Mentioned<DailyPlanWithPriorities>, DailyPlanError> {
        if data.top_priorities.iter().any(|title| title.trim().is_empty()) {
            return Err(DailyPlanError::BlankTitle);
        }

        let mut tx = self.pool.begin().await?;
        Self::ensure_member(&mut tx, family_id, data.user_id).await?;

        let plan = DailyPlan::create(&mut *tx, family_id, data)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DailyPlanError::AlreadyExists
                } else {
                    e.into()
                }
            })?;
        let mut diff = self.mentions.reconcile_all(&mut tx, &plan).await?;

        for (order, title) in (1..).zip(&data.top_priorities) {
            let priority = TopPriority::create(&mut *tx, plan.id, title.trim(), order).await?;
            diff.merge(
                self.mentions
                    .reconcile_all(&mut tx, &PlannedPriority::new(&priority, &plan))
                    .await?,
            );
        }

        let result = Self::load(&mut tx, plan, &diff).await?;
        tx.commit().await?;

        info!(
            daily_plan_id = %result.record.plan.id,
            user_id = %result.record.plan.user_id,
            priorities = result.record.top_priorities.len(),
            "Daily plan created"
        );

        Ok(result)
    }

    pub async fn get(
        &self,
        id: Uuid,
    ) -> Result<Mentioned<DailyPlanWithPriorities>, DailyPlanError> {
        let mut conn = self.pool.acquire().await?;
        let plan = DailyPlan::find_by_id(&mut *conn, id)
            .await?
            .ok_or(DailyPlanError::NotFound)?;
        Self::load(&mut conn, plan, &MentionDiff::default()).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        data: &UpdateDailyPlan,
    ) -> Result<Mentioned<DailyPlanWithPriorities>, DailyPlanError> {
        let mut tx = self.pool.begin().await?;
        let before = DailyPlan::find_by_id(&mut *tx, id)
            .await?
            .ok_or(DailyPlanError::NotFound)?;
        Self::ensure_member(&mut tx, before.family_id, data.editor_id).await?;

        let reflection = patch_text(data.reflection.as_deref(), before.reflection.as_deref());
        let after = DailyPlan::update_reflection(&mut *tx, id, reflection.as_deref()).await?;
        let diff = self
            .mentions
            .reconcile_changes(&mut tx, &before, &after)
            .await?;

        let result = Self::load(&mut tx, after, &diff).await?;
        tx.commit().await?;
        Ok(result)
    }

    pub async fn delete(&self, id: Uuid, actor_id: Uuid) -> Result<(), DailyPlanError> {
        let mut tx = self.pool.begin().await?;
        let plan = DailyPlan::find_by_id(&mut *tx, id)
            .await?
            .ok_or(DailyPlanError::NotFound)?;
        Self::ensure_member(&mut tx, plan.family_id, actor_id).await?;

        // Priority rows cascade with the plan, their mentions do not
        Mention::delete_for_daily_plan_priorities(&mut *tx, id).await?;
        self.mentions
            .purge(&mut tx, MentionableType::DailyPlan, id)
            .await?;
        DailyPlan::delete(&mut *tx, id).await?;
        tx.commit().await?;

        info!(daily_plan_id = %id, "Daily plan deleted");
        Ok(())
    }

    pub async fn add_priority(
        &self,
        daily_plan_id: Uuid,
        data: &CreateTopPriority,
    ) -> Result<Mentioned<TopPriority>, DailyPlanError> {
        let title = data.title.trim();
        if title.is_empty() {
            return Err(DailyPlanError::BlankTitle);
        }

        let mut tx = self.pool.begin().await?;
        let plan = DailyPlan::find_by_id(&mut *tx, daily_plan_id)
            .await?
            .ok_or(DailyPlanError::NotFound)?;
        Self::ensure_member(&mut tx, plan.family_id, data.editor_id).await?;

        let order = match data.priority_order {
            Some(order) => order,
            None => TopPriority::next_order(&mut *tx, plan.id).await?,
        };
        let priority = TopPriority::create(&mut *tx, plan.id, title, order).await?;
        let diff = self
            .mentions
            .reconcile_all(&mut tx, &PlannedPriority::new(&priority, &plan))
            .await?;
        let mentions =
            Mention::find_by_owner(&mut *tx, MentionableType::TopPriority, priority.id).await?;
        tx.commit().await?;

        Ok(Mentioned::new(priority, mentions, &diff))
    }

    pub async fn update_priority(
        &self,
        id: Uuid,
        data: &UpdateTopPriority,
    ) -> Result<Mentioned<TopPriority>, DailyPlanError> {
        let mut tx = self.pool.begin().await?;
        let before = TopPriority::find_by_id(&mut *tx, id)
            .await?
            .ok_or(DailyPlanError::PriorityNotFound)?;
        let plan = DailyPlan::find_by_id(&mut *tx, before.daily_plan_id)
            .await?
            .ok_or(DailyPlanError::NotFound)?;
        Self::ensure_member(&mut tx, plan.family_id, data.editor_id).await?;

        let title = patch_required(data.title.as_deref(), &before.title)
            .ok_or(DailyPlanError::BlankTitle)?;
        let after = TopPriority::update(
            &mut *tx,
            id,
            &title,
            data.priority_order.unwrap_or(before.priority_order),
            data.completed.unwrap_or(before.completed),
        )
        .await?;

        let diff = self
            .mentions
            .reconcile_changes(
                &mut tx,
                &PlannedPriority::new(&before, &plan),
                &PlannedPriority::new(&after, &plan),
            )
            .await?;
        let mentions = Mention::find_by_owner(&mut *tx, MentionableType::TopPriority, id).await?;
        tx.commit().await?;

        Ok(Mentioned::new(after, mentions, &diff))
    }

    pub async fn delete_priority(&self, id: Uuid, actor_id: Uuid) -> Result<(), DailyPlanError> {
        let mut tx = self.pool.begin().await?;
        let priority = TopPriority::find_by_id(&mut *tx, id)
            .await?
            .ok_or(DailyPlanError::PriorityNotFound)?;
        let plan = DailyPlan::find_by_id(&mut *tx, priority.daily_plan_id)
            .await?
            .ok_or(DailyPlanError::NotFound)?;
        Self::ensure_member(&mut tx, plan.family_id, actor_id).await?;

        self.mentions
            .purge(&mut tx, MentionableType::TopPriority, id)
            .await?;
        TopPriority::delete(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn ensure_member(
        conn: &mut SqliteConnection,
        family_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), DailyPlanError> {
        if FamilyMembership::is_member(&mut *conn, family_id, user_id).await? {
            Ok(())
        } else {
            Err(DailyPlanError::NotFamilyMember { family_id, user_id })
        }
    }

    /// Plan, its priorities, and the mentions owned by all of them
    async fn load(
        conn: &mut SqliteConnection,
        plan: DailyPlan,
        diff: &MentionDiff,
    ) -> Result<Mentioned<DailyPlanWithPriorities>, DailyPlanError> {
        let top_priorities = TopPriority::find_by_daily_plan_id(&mut *conn, plan.id).await?;

        let mut mentions =
            Mention::find_by_owner(&mut *conn, MentionableType::DailyPlan, plan.id).await?;
        for priority in &top_priorities {
            mentions.extend(
                Mention::find_by_owner(&mut *conn, MentionableType::TopPriority, priority.id)
                    .await?,
            );
        }

        Ok(Mentioned::new(
            DailyPlanWithPriorities {
                plan,
                top_priorities,
            },
            mentions,
            diff,
        ))
    }
}
