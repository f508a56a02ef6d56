//! Which records carry @mentions, in which fields, and how a record exposes
//! its family scope and author to the mention sync.

use std::{collections::HashMap, sync::Arc};

use db::models::{
    daily_plan::{DailyPlan, TopPriority},
    goal::Goal,
    mention::MentionableType,
    weekly_review::WeeklyReview,
};
use once_cell::sync::Lazy;
use thiserror::Error;
use uuid::Uuid;

pub const GOAL_FIELDS: &[&str] = &["title", "description"];
pub const WEEKLY_REVIEW_FIELDS: &[&str] = &["wins", "challenges", "next_week_focus"];
pub const DAILY_PLAN_FIELDS: &[&str] = &["reflection"];
pub const TOP_PRIORITY_FIELDS: &[&str] = &["title"];

static DEFAULT_REGISTRY: Lazy<Arc<MentionRegistry>> = Lazy::new(|| {
    Arc::new(
        MentionRegistry::builder()
            .register(MentionableType::Goal, GOAL_FIELDS)
            .register(MentionableType::WeeklyReview, WEEKLY_REVIEW_FIELDS)
            .register(MentionableType::DailyPlan, DAILY_PLAN_FIELDS)
            .register(MentionableType::TopPriority, TOP_PRIORITY_FIELDS)
            .build(),
    )
});

/// Integration mistakes. These indicate a wiring bug, never bad user input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("{0} declares no mentionable fields")]
    NoMentionableFields(MentionableType),
    #[error("`{field}` is not a mentionable field of {mentionable_type}")]
    UndeclaredField {
        mentionable_type: MentionableType,
        field: String,
    },
    #[error("{mentionable_type} {id} has no family scope")]
    MissingScope {
        mentionable_type: MentionableType,
        id: Uuid,
    },
    #[error("{mentionable_type} {id} has no resolvable author")]
    MissingAuthor {
        mentionable_type: MentionableType,
        id: Uuid,
    },
}

/// Immutable table of mentionable fields per record type
#[derive(Debug, Clone, Default)]
pub struct MentionRegistry {
    fields: HashMap<MentionableType, Vec<String>>,
}

#[derive(Debug, Default)]
pub struct MentionRegistryBuilder {
    fields: HashMap<MentionableType, Vec<String>>,
}

impl MentionRegistryBuilder {
    /// Declare fields for a type. Repeated names are kept once, in first-seen order.
    pub fn register(mut self, mentionable_type: MentionableType, fields: &[&str]) -> Self {
        let entry = self.fields.entry(mentionable_type).or_default();
        for field in fields {
            if !entry.iter().any(|existing| existing == field) {
                entry.push((*field).to_string());
            }
        }
        self
    }

    pub fn build(self) -> MentionRegistry {
        MentionRegistry {
            fields: self.fields,
        }
    }
}

impl MentionRegistry {
    pub fn builder() -> MentionRegistryBuilder {
        MentionRegistryBuilder::default()
    }

    /// The product configuration, built on first use and shared afterwards
    pub fn shared() -> Arc<MentionRegistry> {
        Arc::clone(&DEFAULT_REGISTRY)
    }

    pub fn fields_for(&self, mentionable_type: MentionableType) -> &[String] {
        self.fields
            .get(&mentionable_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn ensure_field(
        &self,
        mentionable_type: MentionableType,
        field: &str,
    ) -> Result<(), ConfigurationError> {
        let fields = self.fields_for(mentionable_type);
        if fields.is_empty() {
            return Err(ConfigurationError::NoMentionableFields(mentionable_type));
        }
        if !fields.iter().any(|declared| declared == field) {
            return Err(ConfigurationError::UndeclaredField {
                mentionable_type,
                field: field.to_string(),
            });
        }
        Ok(())
    }
}

/// Ways a record can point at the user who wrote it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthorCandidates {
    pub user_id: Option<Uuid>,
    pub creator_id: Option<Uuid>,
    /// Author of the container the record belongs to
    pub parent_user_id: Option<Uuid>,
}

impl AuthorCandidates {
    pub fn direct(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    pub fn creator(creator_id: Uuid) -> Self {
        Self {
            creator_id: Some(creator_id),
            ..Self::default()
        }
    }

    pub fn via_parent(parent_user_id: Uuid) -> Self {
        Self {
            parent_user_id: Some(parent_user_id),
            ..Self::default()
        }
    }

    /// Direct user, then creator, then the parent's user
    pub fn resolve(&self) -> Option<Uuid> {
        self.user_id.or(self.creator_id).or(self.parent_user_id)
    }
}

/// Capability a record needs for its text fields to be mention-synced
pub trait Mentionable {
    fn mentionable_type(&self) -> MentionableType;

    fn mentionable_id(&self) -> Uuid;

    /// Family whose members handles may resolve to
    fn family_scope(&self) -> Option<Uuid>;

    fn author_candidates(&self) -> AuthorCandidates;

    /// Current text of `field`; `None` for empty or unknown fields
    fn field_text(&self, field: &str) -> Option<&str>;
}

impl Mentionable for Goal {
    fn mentionable_type(&self) -> MentionableType {
        MentionableType::Goal
    }

    fn mentionable_id(&self) -> Uuid {
        self.id
    }

    fn family_scope(&self) -> Option<Uuid> {
        Some(self.family_id)
    }

    fn author_candidates(&self) -> AuthorCandidates {
        AuthorCandidates::creator(self.creator_id)
    }

    fn field_text(&self, field: &str) -> Option<&str> {
        match field {
            "title" => Some(self.title.as_str()),
            "description" => self.description.as_deref(),
            _ => None,
        }
    }
}

impl Mentionable for WeeklyReview {
    fn mentionable_type(&self) -> MentionableType {
        MentionableType::WeeklyReview
    }

    fn mentionable_id(&self) -> Uuid {
        self.id
    }

    fn family_scope(&self) -> Option<Uuid> {
        Some(self.family_id)
    }

    fn author_candidates(&self) -> AuthorCandidates {
        AuthorCandidates::direct(self.user_id)
    }

    fn field_text(&self, field: &str) -> Option<&str> {
        match field {
            "wins" => self.wins.as_deref(),
            "challenges" => self.challenges.as_deref(),
            "next_week_focus" => self.next_week_focus.as_deref(),
            _ => None,
        }
    }
}

impl Mentionable for DailyPlan {
    fn mentionable_type(&self) -> MentionableType {
        MentionableType::DailyPlan
    }

    fn mentionable_id(&self) -> Uuid {
        self.id
    }

    fn family_scope(&self) -> Option<Uuid> {
        Some(self.family_id)
    }

    fn author_candidates(&self) -> AuthorCandidates {
        AuthorCandidates::direct(self.user_id)
    }

    fn field_text(&self, field: &str) -> Option<&str> {
        match field {
            "reflection" => self.reflection.as_deref(),
            _ => None,
        }
    }
}

/// A priority seen through its daily plan, which owns the scope and author.
/// A plan that is not the priority's parent yields neither.
#[derive(Debug, Clone, Copy)]
pub struct PlannedPriority<'a> {
    pub priority: &'a TopPriority,
    pub plan: &'a DailyPlan,
}

impl<'a> PlannedPriority<'a> {
    pub fn new(priority: &'a TopPriority, plan: &'a DailyPlan) -> Self {
        Self { priority, plan }
    }

    fn parent(&self) -> Option<&DailyPlan> {
        (self.priority.daily_plan_id == self.plan.id).then_some(self.plan)
    }
}

impl Mentionable for PlannedPriority<'_> {
    fn mentionable_type(&self) -> MentionableType {
        MentionableType::TopPriority
    }

    fn mentionable_id(&self) -> Uuid {
        self.priority.id
    }

    fn family_scope(&self) -> Option<Uuid> {
        self.parent().map(|plan| plan.family_id)
    }

    fn author_candidates(&self) -> AuthorCandidates {
        self.parent()
            .map(|plan| AuthorCandidates::via_parent(plan.user_id))
            .unwrap_or_default()
    }

    fn field_text(&self, field: &str) -> Option<&str> {
        match field {
            "title" => Some(self.priority.title.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use strum::IntoEnumIterator;

    use super::*;

    fn plan(id: Uuid) -> DailyPlan {
        DailyPlan {
            id,
            family_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            reflection: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn priority(daily_plan_id: Uuid) -> TopPriority {
        TopPriority {
            id: Uuid::new_v4(),
            daily_plan_id,
            title: "Call @grandma".to_string(),
            priority_order: 1,
            completed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_every_type_declares_fields() {
        let registry = MentionRegistry::shared();
        for mentionable_type in MentionableType::iter() {
            assert!(
                !registry.fields_for(mentionable_type).is_empty(),
                "{mentionable_type} has no mentionable fields"
            );
        }
    }

    #[test]
    fn test_ensure_field_errors() {
        let registry = MentionRegistry::builder()
            .register(MentionableType::Goal, &["title", "title", "description"])
            .build();

        assert_eq!(registry.fields_for(MentionableType::Goal), ["title", "description"]);
        assert!(registry.ensure_field(MentionableType::Goal, "title").is_ok());
        assert_eq!(
            registry.ensure_field(MentionableType::Goal, "status"),
            Err(ConfigurationError::UndeclaredField {
                mentionable_type: MentionableType::Goal,
                field: "status".to_string(),
            })
        );
        assert_eq!(
            registry.ensure_field(MentionableType::DailyPlan, "reflection"),
            Err(ConfigurationError::NoMentionableFields(
                MentionableType::DailyPlan
            ))
        );
    }

    #[test]
    fn test_author_precedence() {
        let user = Uuid::new_v4();
        let creator = Uuid::new_v4();
        let parent = Uuid::new_v4();

        let all = AuthorCandidates {
            user_id: Some(user),
            creator_id: Some(creator),
            parent_user_id: Some(parent),
        };
        assert_eq!(all.resolve(), Some(user));

        let no_direct = AuthorCandidates {
            user_id: None,
            ..all
        };
        assert_eq!(no_direct.resolve(), Some(creator));

        assert_eq!(AuthorCandidates::via_parent(parent).resolve(), Some(parent));
        assert_eq!(AuthorCandidates::default().resolve(), None);
    }

    #[test]
    fn test_planned_priority_uses_parent_plan() {
        let plan = plan(Uuid::new_v4());
        let priority = priority(plan.id);
        let planned = PlannedPriority::new(&priority, &plan);

        assert_eq!(planned.family_scope(), Some(plan.family_id));
        assert_eq!(planned.author_candidates().resolve(), Some(plan.user_id));
        assert_eq!(planned.field_text("title"), Some("Call @grandma"));
        assert_eq!(planned.field_text("reflection"), None);
    }

    #[test]
    fn test_planned_priority_with_foreign_plan_has_no_scope() {
        let plan = plan(Uuid::new_v4());
        let priority = priority(Uuid::new_v4());
        let planned = PlannedPriority::new(&priority, &plan);

        assert_eq!(planned.family_scope(), None);
        assert_eq!(planned.author_candidates().resolve(), None);
    }
}
