use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "goal_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GoalStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    Archived,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS, PartialEq)]
pub struct Goal {
    pub id: Uuid,
    pub family_id: Uuid,
    pub creator_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: GoalStatus,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateGoal {
    pub creator_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<GoalStatus>,
    pub due_date: Option<NaiveDate>,
}

/// Partial update. `None` leaves a field unchanged; an empty `description`
/// clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateGoal {
    /// User performing the edit; must belong to the goal's family
    pub editor_id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<GoalStatus>,
    /// Absent keeps the due date, `null` clears it
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[ts(optional)]
    pub due_date: Option<Option<NaiveDate>>,
}

impl Goal {
    pub async fn create<'e, E>(
        executor: E,
        family_id: Uuid,
        data: &CreateGoal,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let now = Utc::now();
        sqlx::query_as::<_, Goal>(
            r#"INSERT INTO goals (id, family_id, creator_id, title, description, status, due_date, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
               RETURNING id, family_id, creator_id, title, description, status, due_date, created_at, updated_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(family_id)
        .bind(data.creator_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.status.unwrap_or_default())
        .bind(data.due_date)
        .bind(now)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Goal>(
            r#"SELECT id, family_id, creator_id, title, description, status, due_date, created_at, updated_at
               FROM goals
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    pub async fn find_by_family_id(
        pool: &SqlitePool,
        family_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Goal>(
            r#"SELECT id, family_id, creator_id, title, description, status, due_date, created_at, updated_at
               FROM goals
               WHERE family_id = $1
               ORDER BY created_at DESC"#,
        )
        .bind(family_id)
        .fetch_all(pool)
        .await
    }

    pub async fn update<'e, E>(
        executor: E,
        id: Uuid,
        title: &str,
        description: Option<&str>,
        status: GoalStatus,
        due_date: Option<NaiveDate>,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Goal>(
            r#"UPDATE goals
               SET title = $2, description = $3, status = $4, due_date = $5, updated_at = $6
               WHERE id = $1
               RETURNING id, family_id, creator_id, title, description, status, due_date, created_at, updated_at"#,
        )
        .bind(id)
        .bind(title)
        .bind(description)
        .bind(status)
        .bind(due_date)
        .bind(Utc::now())
        .fetch_one(executor)
        .await
    }

    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM goals WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> UpdateGoal {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_due_date_patch_states() {
        let editor = Uuid::new_v4();

        let keep = parse(&format!(r#"{{"editor_id":"{editor}"}}"#));
        assert_eq!(keep.due_date, None);

        let clear = parse(&format!(r#"{{"editor_id":"{editor}","due_date":null}}"#));
        assert_eq!(clear.due_date, Some(None));

        let set = parse(&format!(
            r#"{{"editor_id":"{editor}","due_date":"2026-04-01"}}"#
        ));
        assert_eq!(set.due_date, Some(NaiveDate::from_ymd_opt(2026, 4, 1)));
    }
}
