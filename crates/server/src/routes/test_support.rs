use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use db::{
    DBService,
    models::{
        family::{Family, FamilyMembership, FamilyRole},
        user::{CreateUser, User},
    },
};
use serde_json::Value;
use tower::ServiceExt;

use crate::{AppState, build_router};

pub struct TestApp {
    pub router: Router,
    pub family: Family,
    pub frodo: User,
    pub sam: User,
    /// Belongs to no family
    pub gollum: User,
}

async fn seed_user(db: &DBService, name: &str, email: &str) -> User {
    User::create(
        &db.pool,
        &CreateUser {
            name: name.to_string(),
            email: email.to_string(),
        },
    )
    .await
    .unwrap()
}

impl TestApp {
    pub async fn new() -> Self {
        let db = DBService::new_in_memory().await.unwrap();

        let frodo = seed_user(&db, "Frodo Baggins", "frodo@shire.example").await;
        let sam = seed_user(&db, "Samwise Gamgee", "sam@shire.example").await;
        let gollum = seed_user(&db, "Smeagol", "gollum@misty.example").await;

        let family = Family::create(&db.pool, "Fellowship").await.unwrap();
        FamilyMembership::create(&db.pool, family.id, frodo.id, FamilyRole::Admin)
            .await
            .unwrap();
        FamilyMembership::create(&db.pool, family.id, sam.id, FamilyRole::Member)
            .await
            .unwrap();

        Self {
            router: build_router(AppState::new(db)),
            family,
            frodo,
            sam,
            gollum,
        }
    }

    /// Send one request and decode the JSON body
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        // Extractor rejections come back as plain text
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, json)
    }
}
