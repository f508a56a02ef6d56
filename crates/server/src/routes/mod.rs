pub mod daily_plans;
pub mod families;
pub mod goals;
pub mod health;
pub mod mentions;
pub mod weekly_reviews;

use serde::Deserialize;
use uuid::Uuid;

/// `?actor_id=` on deletes: the user removing the record
#[derive(Debug, Deserialize)]
pub struct ActorQuery {
    pub actor_id: Uuid,
}

#[cfg(test)]
pub(crate) mod test_support;
