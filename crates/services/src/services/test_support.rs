//! Seed data shared by the service tests.

use db::{
    DBService,
    models::{
        family::{Family, FamilyMembership, FamilyRole},
        user::{CreateUser, User},
    },
};

/// A family of three plus one user who belongs to a different family
pub struct Fixture {
    pub db: DBService,
    pub family: Family,
    pub alice: User,
    pub bob: User,
    pub carol: User,
    pub outsider: User,
}

pub async fn seed_user(db: &DBService, name: &str) -> User {
    let email = format!("{}@example.com", name.replace(' ', ".").to_lowercase());
    User::create(
        &db.pool,
        &CreateUser {
            name: name.to_string(),
            email,
        },
    )
    .await
    .unwrap()
}

impl Fixture {
    pub async fn new() -> Self {
        let db = DBService::new_in_memory().await.unwrap();

        let alice = seed_user(&db, "Alice Baggins").await;
        let bob = seed_user(&db, "Bob Baggins").await;
        let carol = seed_user(&db, "Carol Baggins").await;
        // Only ever a member of the Brandybuck family
        let outsider = seed_user(&db, "Dave Brandybuck").await;

        let family = Family::create(&db.pool, "Baggins").await.unwrap();
        FamilyMembership::create(&db.pool, family.id, alice.id, FamilyRole::Admin)
            .await
            .unwrap();
        for member in [&bob, &carol] {
            FamilyMembership::create(&db.pool, family.id, member.id, FamilyRole::Member)
                .await
                .unwrap();
        }

        let other_family = Family::create(&db.pool, "Brandybuck").await.unwrap();
        FamilyMembership::create(&db.pool, other_family.id, outsider.id, FamilyRole::Admin)
            .await
            .unwrap();

        Self {
            db,
            family,
            alice,
            bob,
            carol,
            outsider,
        }
    }
}
