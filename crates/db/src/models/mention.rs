use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, Type};
use strum_macros::{Display, EnumIter, EnumString};
use ts_rs::TS;
use uuid::Uuid;

/// Kind of record whose text fields can carry @mentions
#[derive(
    Debug,
    Clone,
    Copy,
    Type,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    TS,
    EnumString,
    EnumIter,
    Display,
)]
#[sqlx(type_name = "mentionable_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MentionableType {
    Goal,
    WeeklyReview,
    DailyPlan,
    TopPriority,
}

/// One resolved @mention: `mentioned_user_id` appears in `text_field` of the
/// owning record. At most one row exists per (owner, field, mentioned user).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS, PartialEq)]
pub struct Mention {
    pub id: Uuid,
    pub mentionable_type: MentionableType,
    pub mentionable_id: Uuid,
    pub text_field: String,
    /// Author of the text
    pub user_id: Uuid,
    pub mentioned_user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateMention<'a> {
    pub mentionable_type: MentionableType,
    pub mentionable_id: Uuid,
    pub text_field: &'a str,
    pub user_id: Uuid,
    pub mentioned_user_id: Uuid,
}

impl Mention {
    pub async fn find_by_owner_field<'e, E>(
        executor: E,
        mentionable_type: MentionableType,
        mentionable_id: Uuid,
        text_field: &str,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Mention>(
            r#"SELECT id, mentionable_type, mentionable_id, text_field, user_id, mentioned_user_id, created_at
               FROM mentions
               WHERE mentionable_type = $1 AND mentionable_id = $2 AND text_field = $3
               ORDER BY created_at ASC"#,
        )
        .bind(mentionable_type)
        .bind(mentionable_id)
        .bind(text_field)
        .fetch_all(executor)
        .await
    }

    pub async fn find_by_owner<'e, E>(
        executor: E,
        mentionable_type: MentionableType,
        mentionable_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Mention>(
            r#"SELECT id, mentionable_type, mentionable_id, text_field, user_id, mentioned_user_id, created_at
               FROM mentions
               WHERE mentionable_type = $1 AND mentionable_id = $2
               ORDER BY text_field ASC, created_at ASC"#,
        )
        .bind(mentionable_type)
        .bind(mentionable_id)
        .fetch_all(executor)
        .await
    }

    /// Mentions of `user_id`, newest first
    pub async fn find_received<'e, E>(
        executor: E,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Mention>(
            r#"SELECT id, mentionable_type, mentionable_id, text_field, user_id, mentioned_user_id, created_at
               FROM mentions
               WHERE mentioned_user_id = $1
               ORDER BY created_at DESC
               LIMIT $2"#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(executor)
        .await
    }

    /// Insert unless a row for the same (owner, field, mentioned user) already
    /// exists. Returns `None` when the row was already there.
    pub async fn create_if_absent<'e, E>(
        executor: E,
        data: &CreateMention<'_>,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Mention>(
            r#"INSERT INTO mentions (id, mentionable_type, mentionable_id, text_field, user_id, mentioned_user_id, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               ON CONFLICT(mentionable_type, mentionable_id, text_field, mentioned_user_id) DO NOTHING
               RETURNING id, mentionable_type, mentionable_id, text_field, user_id, mentioned_user_id, created_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(data.mentionable_type)
        .bind(data.mentionable_id)
        .bind(data.text_field)
        .bind(data.user_id)
        .bind(data.mentioned_user_id)
        .bind(Utc::now())
        .fetch_optional(executor)
        .await
    }

    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM mentions WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Remove every mention owned by a record, across all of its fields
    pub async fn delete_for_owner<'e, E>(
        executor: E,
        mentionable_type: MentionableType,
        mentionable_id: Uuid,
    ) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            "DELETE FROM mentions WHERE mentionable_type = $1 AND mentionable_id = $2",
        )
        .bind(mentionable_type)
        .bind(mentionable_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// Remove mentions owned by the priorities of a daily plan. Run before the
    /// plan delete cascades to the priorities themselves.
    pub async fn delete_for_daily_plan_priorities<'e, E>(
        executor: E,
        daily_plan_id: Uuid,
    ) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"DELETE FROM mentions
               WHERE mentionable_type = $1
                 AND mentionable_id IN (SELECT id FROM top_priorities WHERE daily_plan_id = $2)"#,
        )
        .bind(MentionableType::TopPriority)
        .bind(daily_plan_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::{
        DBService,
        models::user::{CreateUser, User},
    };

    async fn seed_user(db: &DBService, name: &str) -> User {
        User::create(
            &db.pool,
            &CreateUser {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
            },
        )
        .await
        .unwrap()
    }

    #[test]
    fn test_mentionable_type_strings() {
        assert_eq!(MentionableType::WeeklyReview.to_string(), "weekly_review");
        assert_eq!(
            MentionableType::from_str("top_priority").unwrap(),
            MentionableType::TopPriority
        );
    }

    #[tokio::test]
    async fn test_create_if_absent_ignores_duplicates() {
        let db = DBService::new_in_memory().await.unwrap();
        let alice = seed_user(&db, "Alice").await;
        let bob = seed_user(&db, "Bob").await;

        let owner_id = Uuid::new_v4();
        let data = CreateMention {
            mentionable_type: MentionableType::Goal,
            mentionable_id: owner_id,
            text_field: "title",
            user_id: alice.id,
            mentioned_user_id: bob.id,
        };

        let first = Mention::create_if_absent(&db.pool, &data).await.unwrap();
        assert!(first.is_some());
        let second = Mention::create_if_absent(&db.pool, &data).await.unwrap();
        assert!(second.is_none());

        let rows = Mention::find_by_owner_field(&db.pool, MentionableType::Goal, owner_id, "title")
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], first.unwrap());
    }

    #[tokio::test]
    async fn test_delete_for_owner_leaves_other_owners() {
        let db = DBService::new_in_memory().await.unwrap();
        let alice = seed_user(&db, "Alice").await;
        let bob = seed_user(&db, "Bob").await;

        let kept_owner = Uuid::new_v4();
        let purged_owner = Uuid::new_v4();
        for (owner, field) in [
            (kept_owner, "title"),
            (purged_owner, "title"),
            (purged_owner, "description"),
        ] {
            Mention::create_if_absent(
                &db.pool,
                &CreateMention {
                    mentionable_type: MentionableType::Goal,
                    mentionable_id: owner,
                    text_field: field,
                    user_id: alice.id,
                    mentioned_user_id: bob.id,
                },
            )
            .await
            .unwrap();
        }

        let removed = Mention::delete_for_owner(&db.pool, MentionableType::Goal, purged_owner)
            .await
            .unwrap();
        assert_eq!(removed, 2);

        let received = Mention::find_received(&db.pool, bob.id, 10).await.unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].mentionable_id, kept_owner);
    }
}
