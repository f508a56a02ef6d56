//! Handle-to-user resolution within a family.

use async_trait::async_trait;
use db::models::user::User;
use sqlx::SqliteConnection;
use utils::mentions::normalize_handle;
use uuid::Uuid;

/// Resolves an `@handle` to at most one user of a family
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Users outside `family_id` must never be returned
    async fn resolve_handle(
        &self,
        conn: &mut SqliteConnection,
        family_id: Uuid,
        handle: &str,
    ) -> Result<Option<Uuid>, sqlx::Error>;

    /// One result per handle, in order. Override when a single lookup can
    /// serve the whole batch.
    async fn resolve_handles(
        &self,
        conn: &mut SqliteConnection,
        family_id: Uuid,
        handles: &[String],
    ) -> Result<Vec<Option<Uuid>>, sqlx::Error> {
        let mut resolved = Vec::with_capacity(handles.len());
        for handle in handles {
            resolved.push(self.resolve_handle(&mut *conn, family_id, handle).await?);
        }
        Ok(resolved)
    }
}

/// Matches handles against the display names of a family's members
#[derive(Debug, Clone, Copy, Default)]
pub struct FamilyDirectory;

#[async_trait]
impl UserDirectory for FamilyDirectory {
    async fn resolve_handle(
        &self,
        conn: &mut SqliteConnection,
        family_id: Uuid,
        handle: &str,
    ) -> Result<Option<Uuid>, sqlx::Error> {
        let members = User::find_family_members(&mut *conn, family_id).await?;
        Ok(match_handle(&members, handle))
    }

    /// Loads the family's members once for the whole batch
    async fn resolve_handles(
        &self,
        conn: &mut SqliteConnection,
        family_id: Uuid,
        handles: &[String],
    ) -> Result<Vec<Option<Uuid>>, sqlx::Error> {
        if handles.is_empty() {
            return Ok(Vec::new());
        }
        let members = User::find_family_members(&mut *conn, family_id).await?;
        Ok(handles
            .iter()
            .map(|handle| match_handle(&members, handle))
            .collect())
    }
}

/// Case-insensitive match of `handle` against, in order, each member's full
/// name with whitespace removed and then their first name. A tier with more
/// than one match is ambiguous and resolves to nothing.
pub fn match_handle(members: &[User], handle: &str) -> Option<Uuid> {
    let handle = normalize_handle(handle);
    if handle.is_empty() {
        return None;
    }

    let full_name: Vec<&User> = members
        .iter()
        .filter(|user| normalize_handle(&user.name) == handle)
        .collect();
    match full_name.as_slice() {
        [user] => return Some(user.id),
        [] => {}
        _ => return None,
    }

    let first_name: Vec<&User> = members
        .iter()
        .filter(|user| normalize_handle(user.first_name()) == handle)
        .collect();
    match first_name.as_slice() {
        [user] => Some(user.id),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn user(name: &str) -> User {
        User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@example.com", Uuid::new_v4()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_matches_first_name_case_insensitively() {
        let bob = user("Bob Baggins");
        let members = vec![user("Alice Baggins"), bob.clone()];

        for handle in ["bob", "Bob", "BOB"] {
            assert_eq!(match_handle(&members, handle), Some(bob.id));
        }
    }

    #[test]
    fn test_full_name_beats_first_name() {
        let mary_jane = user("Mary Jane");
        let mary = user("Mary");
        let members = vec![mary_jane.clone(), mary.clone()];

        assert_eq!(match_handle(&members, "maryjane"), Some(mary_jane.id));
        // "mary" is the full name of one member and the first name of another
        assert_eq!(match_handle(&members, "mary"), Some(mary.id));
    }

    #[test]
    fn test_ambiguous_first_name_resolves_to_nothing() {
        let members = vec![user("Sam Gamgee"), user("Sam Took")];
        assert_eq!(match_handle(&members, "sam"), None);
    }

    #[test]
    fn test_unknown_handle() {
        let members = vec![user("Frodo")];
        assert_eq!(match_handle(&members, "gollum"), None);
        assert_eq!(match_handle(&[], "frodo"), None);
        assert_eq!(match_handle(&members, ""), None);
    }

    #[tokio::test]
    async fn test_batch_resolution_matches_single_lookups() {
        let fx = crate::services::test_support::Fixture::new().await;
        let mut conn = fx.db.pool.acquire().await.unwrap();
        let handles: Vec<String> = ["alice", "nobody", "Carol", "dave"]
            .iter()
            .map(|h| h.to_string())
            .collect();

        let batch = FamilyDirectory
            .resolve_handles(&mut conn, fx.family.id, &handles)
            .await
            .unwrap();
        // Dave belongs to another family
        assert_eq!(batch, vec![Some(fx.alice.id), None, Some(fx.carol.id), None]);

        for (handle, expected) in handles.iter().zip(&batch) {
            let single = FamilyDirectory
                .resolve_handle(&mut conn, fx.family.id, handle)
                .await
                .unwrap();
            assert_eq!(&single, expected, "{handle}");
        }

        let empty = FamilyDirectory
            .resolve_handles(&mut conn, fx.family.id, &[])
            .await
            .unwrap();
        assert!(empty.is_empty());
    }
}
