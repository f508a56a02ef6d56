use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite};
use ts_rs::TS;
use uuid::Uuid;

/// One user's end-of-week reflection, shared with their family
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS, PartialEq)]
pub struct WeeklyReview {
    pub id: Uuid,
    pub family_id: Uuid,
    pub user_id: Uuid,
    pub week_start_date: NaiveDate,
    pub wins: Option<String>,
    pub challenges: Option<String>,
    pub next_week_focus: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateWeeklyReview {
    pub user_id: Uuid,
    pub week_start_date: NaiveDate,
    pub wins: Option<String>,
    pub challenges: Option<String>,
    pub next_week_focus: Option<String>,
}

/// Partial update. `None` leaves a field unchanged; an empty string clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateWeeklyReview {
    /// User performing the edit; must belong to the review's family
    pub editor_id: Uuid,
    pub wins: Option<String>,
    pub challenges: Option<String>,
    pub next_week_focus: Option<String>,
}

impl WeeklyReview {
    pub async fn create<'e, E>(
        executor: E,
        family_id: Uuid,
        data: &CreateWeeklyReview,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let now = Utc::now();
        sqlx::query_as::<_, WeeklyReview>(
            r#"INSERT INTO weekly_reviews (id, family_id, user_id, week_start_date, wins, challenges, next_week_focus, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
               RETURNING id, family_id, user_id, week_start_date, wins, challenges, next_week_focus, created_at, updated_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(family_id)
        .bind(data.user_id)
        .bind(data.week_start_date)
        .bind(&data.wins)
        .bind(&data.challenges)
        .bind(&data.next_week_focus)
        .bind(now)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, WeeklyReview>(
            r#"SELECT id, family_id, user_id, week_start_date, wins, challenges, next_week_focus, created_at, updated_at
               FROM weekly_reviews
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    pub async fn update<'e, E>(
        executor: E,
        id: Uuid,
        wins: Option<&str>,
        challenges: Option<&str>,
        next_week_focus: Option<&str>,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, WeeklyReview>(
            r#"UPDATE weekly_reviews
               SET wins = $2, challenges = $3, next_week_focus = $4, updated_at = $5
               WHERE id = $1
               RETURNING id, family_id, user_id, week_start_date, wins, challenges, next_week_focus, created_at, updated_at"#,
        )
        .bind(id)
        .bind(wins)
        .bind(challenges)
        .bind(next_week_focus)
        .bind(Utc::now())
        .fetch_one(executor)
        .await
    }

    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM weekly_reviews WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
