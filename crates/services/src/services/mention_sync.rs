//! Keeps the stored @mentions of a record in line with its text.
//!
//! Reconciliation diffs the users resolvable from the current text against the
//! rows already stored for the same (record, field) and only inserts or
//! deletes the difference. Rows for users mentioned both before and after an
//! edit keep their id and `created_at`.
//!
//! Every operation takes the caller's connection so it runs inside the save
//! transaction of the owning record. No extra locking is taken: two concurrent
//! edits of the same field may reconcile from the same stale snapshot, and the
//! unique index on `mentions` only guarantees there are never duplicate rows.

use std::{collections::HashSet, sync::Arc};

use db::models::mention::{CreateMention, Mention, MentionableType};
use serde::Serialize;
use sqlx::SqliteConnection;
use thiserror::Error;
use tracing::{debug, error};
use utils::mentions::extract_handles_opt;
use uuid::Uuid;

use super::{
    mentionable::{ConfigurationError, MentionRegistry, Mentionable},
    user_directory::{FamilyDirectory, UserDirectory},
};

#[derive(Debug, Error)]
pub enum MentionSyncError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("mention configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

/// Mutations applied by a reconciliation
#[derive(Debug, Clone, Default, Serialize)]
pub struct MentionDiff {
    pub created: Vec<Mention>,
    pub removed: Vec<Mention>,
    /// Rows left untouched because the user is still mentioned
    pub retained: usize,
}

impl MentionDiff {
    pub fn is_noop(&self) -> bool {
        self.created.is_empty() && self.removed.is_empty()
    }

    pub fn merge(&mut self, other: MentionDiff) {
        self.created.extend(other.created);
        self.removed.extend(other.removed);
        self.retained += other.retained;
    }

    /// Users who gained a mention, e.g. to notify them
    pub fn newly_mentioned_user_ids(&self) -> Vec<Uuid> {
        let mut seen = HashSet::new();
        self.created
            .iter()
            .map(|mention| mention.mentioned_user_id)
            .filter(|id| seen.insert(*id))
            .collect()
    }
}

/// A saved record together with its current mentions
#[derive(Debug, Clone, Serialize)]
pub struct Mentioned<T> {
    #[serde(flatten)]
    pub record: T,
    pub mentions: Vec<Mention>,
    /// Users who were not mentioned before this save
    pub newly_mentioned_user_ids: Vec<Uuid>,
}

impl<T> Mentioned<T> {
    pub fn new(record: T, mentions: Vec<Mention>, diff: &MentionDiff) -> Self {
        Self {
            record,
            mentions,
            newly_mentioned_user_ids: diff.newly_mentioned_user_ids(),
        }
    }

    pub fn unchanged(record: T, mentions: Vec<Mention>) -> Self {
        Self {
            record,
            mentions,
            newly_mentioned_user_ids: Vec::new(),
        }
    }
}

#[derive(Clone)]
pub struct MentionSyncService {
    registry: Arc<MentionRegistry>,
    directory: Arc<dyn UserDirectory>,
}

impl Default for MentionSyncService {
    fn default() -> Self {
        Self::new(MentionRegistry::shared(), Arc::new(FamilyDirectory))
    }
}

impl MentionSyncService {
    pub fn new(registry: Arc<MentionRegistry>, directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            registry,
            directory,
        }
    }

    pub fn registry(&self) -> &MentionRegistry {
        &self.registry
    }

    /// Bring the mentions stored for `owner`'s `field` in line with `new_text`.
    pub async fn reconcile<M>(
        &self,
        conn: &mut SqliteConnection,
        owner: &M,
        field: &str,
        new_text: Option<&str>,
    ) -> Result<MentionDiff, MentionSyncError>
    where
        M: Mentionable + Sync + ?Sized,
    {
        let mentionable_type = owner.mentionable_type();
        let mentionable_id = owner.mentionable_id();

        let (family_id, author_id) = self
            .check_owner(owner, field)
            .inspect_err(|e| error!(error = %e, "Mention sync misconfigured"))?;

        let handles = extract_handles_opt(new_text);
        let matches = self
            .directory
            .resolve_handles(&mut *conn, family_id, &handles)
            .await?;

        let mut resolved: Vec<Uuid> = Vec::new();
        for (handle, user_id) in handles.iter().zip(matches) {
            match user_id {
                Some(user_id) if !resolved.contains(&user_id) => resolved.push(user_id),
                Some(_) => {}
                None => debug!(
                    %mentionable_type,
                    %mentionable_id,
                    handle = %handle,
                    "Mention sync: handle did not resolve in family"
                ),
            }
        }
        let wanted: HashSet<Uuid> = resolved.iter().copied().collect();

        let existing =
            Mention::find_by_owner_field(&mut *conn, mentionable_type, mentionable_id, field)
                .await?;
        let already_stored: HashSet<Uuid> = existing
            .iter()
            .map(|mention| mention.mentioned_user_id)
            .collect();

        let mut diff = MentionDiff::default();

        for mention in existing {
            if wanted.contains(&mention.mentioned_user_id) {
                diff.retained += 1;
            } else {
                Mention::delete(&mut *conn, mention.id).await?;
                diff.removed.push(mention);
            }
        }

        for mentioned_user_id in resolved
            .into_iter()
            .filter(|id| !already_stored.contains(id))
        {
            let data = CreateMention {
                mentionable_type,
                mentionable_id,
                text_field: field,
                user_id: author_id,
                mentioned_user_id,
            };
            if let Some(mention) = Mention::create_if_absent(&mut *conn, &data).await? {
                diff.created.push(mention);
            }
        }

        if !diff.is_noop() {
            debug!(
                %mentionable_type,
                %mentionable_id,
                field = %field,
                created = diff.created.len(),
                removed = diff.removed.len(),
                retained = diff.retained,
                "Mention sync: reconciled field"
            );
        }

        Ok(diff)
    }

    /// Reconcile every declared field of `owner` against its current text
    pub async fn reconcile_all<M>(
        &self,
        conn: &mut SqliteConnection,
        owner: &M,
    ) -> Result<MentionDiff, MentionSyncError>
    where
        M: Mentionable + Sync + ?Sized,
    {
        let mentionable_type = owner.mentionable_type();
        let fields = self.registry.fields_for(mentionable_type);
        if fields.is_empty() {
            return Err(ConfigurationError::NoMentionableFields(mentionable_type).into());
        }

        let mut diff = MentionDiff::default();
        for field in fields {
            diff.merge(
                self.reconcile(conn, owner, field, owner.field_text(field))
                    .await?,
            );
        }
        Ok(diff)
    }

    /// Reconcile only the declared fields whose text differs between `before`
    /// and `after`. Both must be snapshots of the same record.
    pub async fn reconcile_changes<M>(
        &self,
        conn: &mut SqliteConnection,
        before: &M,
        after: &M,
    ) -> Result<MentionDiff, MentionSyncError>
    where
        M: Mentionable + Sync + ?Sized,
    {
        let mentionable_type = after.mentionable_type();
        let fields = self.registry.fields_for(mentionable_type);
        if fields.is_empty() {
            return Err(ConfigurationError::NoMentionableFields(mentionable_type).into());
        }

        let mut diff = MentionDiff::default();
        for field in fields {
            let new_text = after.field_text(field);
            if before.field_text(field) == new_text {
                continue;
            }
            diff.merge(self.reconcile(conn, after, field, new_text).await?);
        }
        Ok(diff)
    }

    /// Drop every mention owned by a record that is being deleted
    pub async fn purge(
        &self,
        conn: &mut SqliteConnection,
        mentionable_type: MentionableType,
        mentionable_id: Uuid,
    ) -> Result<u64, MentionSyncError> {
        let removed = Mention::delete_for_owner(&mut *conn, mentionable_type, mentionable_id).await?;
        if removed > 0 {
            debug!(
                %mentionable_type,
                %mentionable_id,
                removed,
                "Mention sync: purged mentions of deleted record"
            );
        }
        Ok(removed)
    }

    fn check_owner<M>(&self, owner: &M, field: &str) -> Result<(Uuid, Uuid), ConfigurationError>
    where
        M: Mentionable + ?Sized,
    {
        let mentionable_type = owner.mentionable_type();
        let id = owner.mentionable_id();

        self.registry.ensure_field(mentionable_type, field)?;
        let family_id = owner
            .family_scope()
            .ok_or(ConfigurationError::MissingScope {
                mentionable_type,
                id,
            })?;
        let author_id = owner
            .author_candidates()
            .resolve()
            .ok_or(ConfigurationError::MissingAuthor {
                mentionable_type,
                id,
            })?;
        Ok((family_id, author_id))
    }
}
