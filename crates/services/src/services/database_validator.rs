//! Schema check backing the health endpoint

use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};

/// Tables the planning and mention features read and write
pub const REQUIRED_TABLES: &[&str] = &[
    "users",
    "families",
    "family_memberships",
    "goals",
    "weekly_reviews",
    "daily_plans",
    "top_priorities",
    "mentions",
];

/// Unique index that keeps concurrent reconciliations from storing duplicates
const MENTION_UNIQUE_INDEX: &str = "idx_mentions_unique_target";

#[derive(Debug, Error)]
pub enum DatabaseValidationError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub struct DatabaseValidator {
    pool: SqlitePool,
}

impl DatabaseValidator {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn validate(&self) -> Result<ValidationResult, DatabaseValidationError> {
        let migrations_table_exists = self.table_exists("_sqlx_migrations").await?;
        if !migrations_table_exists {
            warn!("Database not initialized, _sqlx_migrations table does not exist");
            return Ok(ValidationResult {
                is_initialized: false,
                migrations_applied: 0,
                latest_migration: None,
                missing_tables: REQUIRED_TABLES.iter().map(|t| t.to_string()).collect(),
                warnings: vec!["Database has not been initialized. Run migrations.".to_string()],
            });
        }

        let migrations_applied = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1",
        )
        .fetch_one(&self.pool)
        .await?;
        let latest_migration = self.latest_migration().await?;
        let missing_tables = self.missing_tables(REQUIRED_TABLES).await?;

        let mut warnings = Vec::new();
        if !missing_tables.is_empty() {
            warnings.push(format!("Missing tables: {}", missing_tables.join(", ")));
        }
        if !self.index_exists(MENTION_UNIQUE_INDEX).await? {
            warnings.push(format!("Missing index: {MENTION_UNIQUE_INDEX}"));
        }

        let result = ValidationResult {
            is_initialized: true,
            migrations_applied: migrations_applied as usize,
            latest_migration,
            missing_tables,
            warnings,
        };

        if result.is_ok() {
            info!(migrations_applied, "Database validation complete");
        } else {
            warn!(warnings = ?result.warnings, "Database validation found problems");
        }

        Ok(result)
    }

    pub async fn missing_tables(
        &self,
        required_tables: &[&str],
    ) -> Result<Vec<String>, DatabaseValidationError> {
        let mut missing = Vec::new();
        for table in required_tables {
            if !self.table_exists(table).await? {
                missing.push(table.to_string());
            }
        }
        Ok(missing)
    }

    pub async fn latest_migration(&self) -> Result<Option<String>, DatabaseValidationError> {
        let migration = sqlx::query_scalar::<_, String>(
            "SELECT description FROM _sqlx_migrations WHERE success = 1 ORDER BY version DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(migration)
    }

    async fn table_exists(&self, name: &str) -> Result<bool, sqlx::Error> {
        self.schema_object_exists("table", name).await
    }

    async fn index_exists(&self, name: &str) -> Result<bool, sqlx::Error> {
        self.schema_object_exists("index", name).await
    }

    async fn schema_object_exists(&self, kind: &str, name: &str) -> Result<bool, sqlx::Error> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = $1 AND name = $2",
        )
        .bind(kind)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub is_initialized: bool,
    pub migrations_applied: usize,
    pub latest_migration: Option<String>,
    pub missing_tables: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn is_ok(&self) -> bool {
        self.is_initialized && self.warnings.is_empty()
    }

    pub fn summary(&self) -> String {
        if !self.is_initialized {
            "Database not initialized - migrations need to be run".to_string()
        } else if !self.warnings.is_empty() {
            format!("Database validation warnings: {}", self.warnings.join(", "))
        } else {
            format!(
                "Database OK - {} migrations applied",
                self.migrations_applied
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use db::DBService;
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;

    #[tokio::test]
    async fn test_migrated_database_is_ok() {
        let db = DBService::new_in_memory().await.unwrap();
        let result = DatabaseValidator::new(db.pool.clone())
            .validate()
            .await
            .unwrap();

        assert!(result.is_ok(), "{}", result.summary());
        assert_eq!(result.migrations_applied, 3);
        assert_eq!(result.latest_migration.as_deref(), Some("mentions"));
    }

    #[tokio::test]
    async fn test_empty_database_reports_uninitialized() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let result = DatabaseValidator::new(pool).validate().await.unwrap();

        assert!(!result.is_ok());
        assert!(!result.is_initialized);
        assert_eq!(result.missing_tables.len(), REQUIRED_TABLES.len());
    }

    #[tokio::test]
    async fn test_dropped_table_is_reported() {
        let db = DBService::new_in_memory().await.unwrap();
        sqlx::query("DROP TABLE top_priorities")
            .execute(&db.pool)
            .await
            .unwrap();

        let result = DatabaseValidator::new(db.pool.clone())
            .validate()
            .await
            .unwrap();
        assert_eq!(result.missing_tables, vec!["top_priorities".to_string()]);
        assert!(!result.is_ok());
    }
}
