// tests/pg_store_tests.rs
//
// Runs the SQL backend against the database in DATABASE_URL.
// Rows are never cleaned up, so every test scopes itself by a unique tag.

mod common;

use chrono::{Duration, Utc};
use parkour_api::{
    handlers::movements::MOVEMENT_SORT_SAFELIST,
    models::{
        filters::Filters,
        movement::{Movement, MovementDetails, MovementSearch},
        token::{ACTIVATION_TTL, AUTHENTICATION_TTL, Token, TokenScope},
        user::{Password, User},
    },
    store::{MovementStore, PgStore, StoreError, TokenStore, UserStore},
};

fn details(name: &str, difficulty: &str, skilltype: &[&str], muscles: &[&str]) -> MovementDetails {
    let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    MovementDetails {
        name: name.to_string(),
        description: format!("{name} description"),
        image: "https://example.com/movement.jpg".to_string(),
        tutorials: strings(&["https://example.com/tutorial"]),
        skilltype: strings(skilltype),
        muscles: strings(muscles),
        difficulty: difficulty.to_string(),
        equipments: strings(&["none"]),
        prerequisites: vec![],
    }
}

fn filters(sort: &str) -> Filters {
    Filters {
        sort: sort.to_string(),
        page: 1,
        page_size: 20,
        sort_safelist: MOVEMENT_SORT_SAFELIST,
    }
}

fn ids(movements: &[Movement]) -> Vec<i64> {
    movements.iter().map(|m| m.id).collect()
}

async fn new_user(store: &PgStore) -> User {
    let mut password = Password::default();
    password.set(common::PASSWORD).unwrap();
    let user = User {
        id: 0,
        created_at: Utc::now(),
        username: "traceur".to_string(),
        email: format!("{}@example.com", common::unique("pg")),
        password,
        activated: false,
        version: 0,
    };
    UserStore::insert(store, &user).await.expect("Failed to insert user")
}

#[tokio::test]
async fn stale_movement_update_is_an_edit_conflict() {
    let url = require_database!();
    let store = common::pg_store(&url).await;

    let created = MovementStore::insert(
        &store,
        &details("Kong vault", "Intermediate", &["vault"], &["arms"]),
    )
    .await
    .unwrap();
    assert_eq!(created.version, 1);

    let mut first = MovementStore::get(&store, created.id).await.unwrap();
    let mut second = first.clone();
    first.details.difficulty = "Advanced".to_string();
    second.details.difficulty = "Beginner".to_string();

    assert_eq!(MovementStore::update(&store, &first).await.unwrap(), 2);
    assert!(matches!(
        MovementStore::update(&store, &second).await,
        Err(StoreError::EditConflict)
    ));

    let stored = MovementStore::get(&store, created.id).await.unwrap();
    assert_eq!(stored.version, 2);
    assert_eq!(stored.details.difficulty, "Advanced");

    MovementStore::delete(&store, created.id).await.unwrap();
    assert!(matches!(
        MovementStore::delete(&store, created.id).await,
        Err(StoreError::NotFound)
    ));
    assert!(matches!(
        MovementStore::get(&store, created.id).await,
        Err(StoreError::NotFound)
    ));
}

#[tokio::test]
async fn search_filters_and_orders_with_id_tiebreak() {
    let url = require_database!();
    let store = common::pg_store(&url).await;
    let tag = common::unique("tag");

    let mut inserted = Vec::new();
    for (name, difficulty, muscles) in [
        ("Dash vault", "Beginner", &["arms", "core"][..]),
        ("Cat leap", "Intermediate", &["arms"][..]),
        ("Cat leap", "Advanced", &["legs"][..]),
    ] {
        let name = format!("{name} {tag}");
        let m = MovementStore::insert(&store, &details(&name, difficulty, &[&tag], muscles))
            .await
            .unwrap();
        inserted.push(m.id);
    }
    let (dash, cat_a, cat_b) = (inserted[0], inserted[1], inserted[2]);

    let scoped = MovementSearch {
        skilltype: vec![tag.clone()],
        ..Default::default()
    };

    let found = MovementStore::search(&store, &scoped, &filters("id")).await.unwrap();
    assert_eq!(ids(&found), vec![dash, cat_a, cat_b]);

    let found = MovementStore::search(&store, &scoped, &filters("name")).await.unwrap();
    assert_eq!(ids(&found), vec![cat_a, cat_b, dash]);

    let found = MovementStore::search(&store, &scoped, &filters("-name")).await.unwrap();
    assert_eq!(ids(&found), vec![dash, cat_a, cat_b]);

    let search = MovementSearch {
        name: format!("vault {tag}"),
        ..Default::default()
    };
    let found = MovementStore::search(&store, &search, &filters("id")).await.unwrap();
    assert_eq!(ids(&found), vec![dash]);

    let search = MovementSearch {
        difficulty: "advanced".to_string(),
        ..scoped.clone()
    };
    let found = MovementStore::search(&store, &search, &filters("id")).await.unwrap();
    assert_eq!(ids(&found), vec![cat_b]);

    let search = MovementSearch {
        muscles: vec!["arms".to_string(), "core".to_string()],
        ..scoped.clone()
    };
    let found = MovementStore::search(&store, &search, &filters("id")).await.unwrap();
    assert_eq!(ids(&found), vec![dash]);

    let page = Filters {
        page: 2,
        page_size: 2,
        ..filters("id")
    };
    let found = MovementStore::search(&store, &scoped, &page).await.unwrap();
    assert_eq!(ids(&found), vec![cat_b]);
}

#[tokio::test]
async fn duplicate_email_maps_to_its_own_error() {
    let url = require_database!();
    let store = common::pg_store(&url).await;

    let existing = new_user(&store).await;
    assert_eq!(existing.version, 1);
    assert!(existing.password.matches(common::PASSWORD).unwrap());

    let mut password = Password::default();
    password.set(common::PASSWORD).unwrap();
    let duplicate = User {
        username: "another".to_string(),
        password,
        ..existing.clone()
    };
    assert!(matches!(
        UserStore::insert(&store, &duplicate).await,
        Err(StoreError::DuplicateEmail)
    ));

    let loaded = store.get_by_email(&existing.email).await.unwrap();
    assert_eq!(loaded.id, existing.id);
    assert_eq!(loaded.password.plaintext(), None);
}

#[tokio::test]
async fn user_update_is_versioned() {
    let url = require_database!();
    let store = common::pg_store(&url).await;

    let mut owner = new_user(&store).await;
    let stale = owner.clone();

    owner.activated = true;
    owner.version = UserStore::update(&store, &owner).await.unwrap();
    assert_eq!(owner.version, 2);

    assert!(matches!(
        UserStore::update(&store, &stale).await,
        Err(StoreError::EditConflict)
    ));
    assert!(store.get_by_email(&owner.email).await.unwrap().activated);
}

#[tokio::test]
async fn tokens_redeem_only_in_scope_and_before_expiry() {
    let url = require_database!();
    let store = common::pg_store(&url).await;
    let owner = new_user(&store).await;

    let activation = store
        .new_token(owner.id, ACTIVATION_TTL, TokenScope::Activation)
        .await
        .unwrap();
    let redeemed = store
        .get_for_token(TokenScope::Activation, &activation.plaintext)
        .await
        .unwrap();
    assert_eq!(redeemed.id, owner.id);

    assert!(matches!(
        store
            .get_for_token(TokenScope::Authentication, &activation.plaintext)
            .await,
        Err(StoreError::NotFound)
    ));

    let expired = Token::generate(owner.id, Duration::seconds(-60), TokenScope::Activation).unwrap();
    TokenStore::insert(&store, &expired).await.unwrap();
    assert!(matches!(
        store
            .get_for_token(TokenScope::Activation, &expired.plaintext)
            .await,
        Err(StoreError::NotFound)
    ));

    let auth = store
        .new_token(owner.id, AUTHENTICATION_TTL, TokenScope::Authentication)
        .await
        .unwrap();
    store
        .delete_all_for_user(owner.id, TokenScope::Activation)
        .await
        .unwrap();

    assert!(matches!(
        store
            .get_for_token(TokenScope::Activation, &activation.plaintext)
            .await,
        Err(StoreError::NotFound)
    ));
    assert_eq!(
        store
            .get_for_token(TokenScope::Authentication, &auth.plaintext)
            .await
            .unwrap()
            .id,
        owner.id
    );
}
