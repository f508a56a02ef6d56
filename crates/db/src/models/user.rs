use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
}

impl User {
    pub async fn create<'e, E>(executor: E, data: &CreateUser) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let now = Utc::now();
        sqlx::query_as::<_, User>(
            r#"INSERT INTO users (id, name, email, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $4)
               RETURNING id, name, email, created_at, updated_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(data.name.trim())
        .bind(data.email.trim().to_lowercase())
        .bind(now)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, User>(
            r#"SELECT id, name, email, created_at, updated_at
               FROM users
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Every user holding a membership in the family, oldest membership first
    pub async fn find_family_members<'e, E>(
        executor: E,
        family_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, User>(
            r#"SELECT u.id, u.name, u.email, u.created_at, u.updated_at
               FROM users u
               JOIN family_memberships fm ON fm.user_id = u.id
               WHERE fm.family_id = $1
               ORDER BY fm.created_at ASC"#,
        )
        .bind(family_id)
        .fetch_all(executor)
        .await
    }

    /// First whitespace-delimited token of the display name
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or_default()
    }
}
