pub mod config;
pub mod error;
pub mod routes;

use axum::Router;
use db::DBService;
use services::services::{
    daily_plans::DailyPlanService, families::FamilyService, goals::GoalService,
    mention_sync::MentionSyncService, weekly_reviews::WeeklyReviewService,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared by every handler. Services are cheap to clone: each holds the pool
/// and, where needed, the mention sync.
#[derive(Clone)]
pub struct AppState {
    db: DBService,
    families: FamilyService,
    goals: GoalService,
    weekly_reviews: WeeklyReviewService,
    daily_plans: DailyPlanService,
}

impl AppState {
    pub fn new(db: DBService) -> Self {
        Self::with_mention_sync(db, MentionSyncService::default())
    }

    pub fn with_mention_sync(db: DBService, mentions: MentionSyncService) -> Self {
        let pool = db.pool.clone();
        Self {
            families: FamilyService::new(pool.clone()),
            goals: GoalService::new(pool.clone(), mentions.clone()),
            weekly_reviews: WeeklyReviewService::new(pool.clone(), mentions.clone()),
            daily_plans: DailyPlanService::new(pool, mentions),
            db,
        }
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }

    pub fn families(&self) -> &FamilyService {
        &self.families
    }

    pub fn goals(&self) -> &GoalService {
        &self.goals
    }

    pub fn weekly_reviews(&self) -> &WeeklyReviewService {
        &self.weekly_reviews
    }

    pub fn daily_plans(&self) -> &DailyPlanService {
        &self.daily_plans
    }
}

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::health::router(&state))
        .merge(routes::families::router(&state))
        .merge(routes::goals::router(&state))
        .merge(routes::weekly_reviews::router(&state))
        .merge(routes::daily_plans::router(&state))
        .merge(routes::mentions::router(&state));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
