use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

/// Role a user holds inside a family
#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "family_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FamilyRole {
    Admin,
    #[default]
    Member,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Family {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct FamilyMembership {
    pub id: Uuid,
    pub family_id: Uuid,
    pub user_id: Uuid,
    pub role: FamilyRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateFamily {
    pub name: String,
    /// Founding member, joined as admin
    pub owner_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct AddFamilyMember {
    pub user_id: Uuid,
    pub role: Option<FamilyRole>,
}

impl Family {
    pub async fn create<'e, E>(executor: E, name: &str) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let now = Utc::now();
        sqlx::query_as::<_, Family>(
            r#"INSERT INTO families (id, name, created_at, updated_at)
               VALUES ($1, $2, $3, $3)
               RETURNING id, name, created_at, updated_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(name.trim())
        .bind(now)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Family>(
            r#"SELECT id, name, created_at, updated_at
               FROM families
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }
}

impl FamilyMembership {
    pub async fn create<'e, E>(
        executor: E,
        family_id: Uuid,
        user_id: Uuid,
        role: FamilyRole,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, FamilyMembership>(
            r#"INSERT INTO family_memberships (id, family_id, user_id, role, created_at)
               VALUES ($1, $2, $3, $4, $5)
               ON CONFLICT(family_id, user_id) DO UPDATE SET role = excluded.role
               RETURNING id, family_id, user_id, role, created_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(family_id)
        .bind(user_id)
        .bind(role)
        .bind(Utc::now())
        .fetch_one(executor)
        .await
    }

    pub async fn is_member<'e, E>(
        executor: E,
        family_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let count = sqlx::query_scalar::<_, i64>(
            r#"SELECT COUNT(*)
               FROM family_memberships
               WHERE family_id = $1 AND user_id = $2"#,
        )
        .bind(family_id)
        .bind(user_id)
        .fetch_one(executor)
        .await?;
        Ok(count > 0)
    }

    pub async fn find_by_family_id<'e, E>(
        executor: E,
        family_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, FamilyMembership>(
            r#"SELECT id, family_id, user_id, role, created_at
               FROM family_memberships
               WHERE family_id = $1
               ORDER BY created_at ASC"#,
        )
        .bind(family_id)
        .fetch_all(executor)
        .await
    }
}
