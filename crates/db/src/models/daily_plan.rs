use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS, PartialEq)]
pub struct DailyPlan {
    pub id: Uuid,
    pub family_id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub reflection: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One of the handful of items a user commits to for the day
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS, PartialEq)]
pub struct TopPriority {
    pub id: Uuid,
    pub daily_plan_id: Uuid,
    pub title: String,
    pub priority_order: i64,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct DailyPlanWithPriorities {
    #[serde(flatten)]
    #[ts(flatten)]
    pub plan: DailyPlan,
    pub top_priorities: Vec<TopPriority>,
}

impl std::ops::Deref for DailyPlanWithPriorities {
    type Target = DailyPlan;
    fn deref(&self) -> &Self::Target {
        &self.plan
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateDailyPlan {
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub reflection: Option<String>,
    #[serde(default)]
    pub top_priorities: Vec<String>,
}

/// `None` leaves the reflection unchanged; an empty string clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateDailyPlan {
    /// User performing the edit; must belong to the plan's family
    pub editor_id: Uuid,
    pub reflection: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateTopPriority {
    pub editor_id: Uuid,
    pub title: String,
    /// Appended after the current last priority when absent
    pub priority_order: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateTopPriority {
    pub editor_id: Uuid,
    pub title: Option<String>,
    pub priority_order: Option<i64>,
    pub completed: Option<bool>,
}

impl DailyPlan {
    pub async fn create<'e, E>(
        executor: E,
        family_id: Uuid,
        data: &CreateDailyPlan,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let now = Utc::now();
        sqlx::query_as::<_, DailyPlan>(
            r#"INSERT INTO daily_plans (id, family_id, user_id, date, reflection, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $6)
               RETURNING id, family_id, user_id, date, reflection, created_at, updated_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(family_id)
        .bind(data.user_id)
        .bind(data.date)
        .bind(&data.reflection)
        .bind(now)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, DailyPlan>(
            r#"SELECT id, family_id, user_id, date, reflection, created_at, updated_at
               FROM daily_plans
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    pub async fn update_reflection<'e, E>(
        executor: E,
        id: Uuid,
        reflection: Option<&str>,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, DailyPlan>(
            r#"UPDATE daily_plans
               SET reflection = $2, updated_at = $3
               WHERE id = $1
               RETURNING id, family_id, user_id, date, reflection, created_at, updated_at"#,
        )
        .bind(id)
        .bind(reflection)
        .bind(Utc::now())
        .fetch_one(executor)
        .await
    }

    /// Priorities cascade through the foreign key
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM daily_plans WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

impl TopPriority {
    pub async fn create<'e, E>(
        executor: E,
        daily_plan_id: Uuid,
        title: &str,
        priority_order: i64,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let now = Utc::now();
        sqlx::query_as::<_, TopPriority>(
            r#"INSERT INTO top_priorities (id, daily_plan_id, title, priority_order, completed, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $6)
               RETURNING id, daily_plan_id, title, priority_order, completed, created_at, updated_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(daily_plan_id)
        .bind(title)
        .bind(priority_order)
        .bind(false)
        .bind(now)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, TopPriority>(
            r#"SELECT id, daily_plan_id, title, priority_order, completed, created_at, updated_at
               FROM top_priorities
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    pub async fn find_by_daily_plan_id<'e, E>(
        executor: E,
        daily_plan_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, TopPriority>(
            r#"SELECT id, daily_plan_id, title, priority_order, completed, created_at, updated_at
               FROM top_priorities
               WHERE daily_plan_id = $1
               ORDER BY priority_order ASC, created_at ASC"#,
        )
        .bind(daily_plan_id)
        .fetch_all(executor)
        .await
    }

    pub async fn next_order<'e, E>(executor: E, daily_plan_id: Uuid) -> Result<i64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_scalar::<_, i64>(
            r#"SELECT COALESCE(MAX(priority_order), 0) + 1
               FROM top_priorities
               WHERE daily_plan_id = $1"#,
        )
        .bind(daily_plan_id)
        .fetch_one(executor)
        .await
    }

    pub async fn update<'e, E>(
        executor: E,
        id: Uuid,
        title: &str,
        priority_order: i64,
        completed: bool,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, TopPriority>(
            r#"UPDATE top_priorities
               SET title = $2, priority_order = $3, completed = $4, updated_at = $5
               WHERE id = $1
               RETURNING id, daily_plan_id, title, priority_order, completed, created_at, updated_at"#,
        )
        .bind(id)
        .bind(title)
        .bind(priority_order)
        .bind(completed)
        .bind(Utc::now())
        .fetch_one(executor)
        .await
    }

    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM top_priorities WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
