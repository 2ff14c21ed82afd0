// tests/common/mod.rs

use std::time::Duration;

use parkour_api::{
    config::Config,
    routes,
    state::AppState,
    store::{Models, PgStore},
};
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;

pub const PASSWORD: &str = "pa55word!";

/// Spawns the app on a random port, backed by a fresh in-memory store.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
pub async fn spawn_app() -> String {
    let config = Config {
        port: 0,
        env: "testing".to_string(),
        database_url: String::new(),
        db_max_open_conns: 1,
        db_max_idle_time: Duration::from_secs(60),
        rust_log: "error".to_string(),
    };

    let state = AppState {
        models: Models::in_memory(),
        config,
    };

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

/// Registers a user and returns the response body.
#[allow(dead_code)]
pub async fn register(client: &reqwest::Client, address: &str, email: &str) -> Value {
    let response = client
        .post(format!("{}/v1/users", address))
        .json(&json!({
            "username": "traceur",
            "email": email,
            "password": PASSWORD,
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 201);
    response.json().await.expect("Failed to parse register json")
}

/// Registers, activates and logs in a user; returns the bearer token.
#[allow(dead_code)]
pub async fn activated_user_token(client: &reqwest::Client, address: &str, email: &str) -> String {
    let registered = register(client, address, email).await;
    let activation_token = registered["activation_token"]["token"]
        .as_str()
        .expect("Activation token not found");

    let response = client
        .post(format!("{}/v1/users/activate", address))
        .json(&json!({ "token": activation_token }))
        .send()
        .await
        .expect("Activation failed");
    assert_eq!(response.status().as_u16(), 200);

    login(client, address, email).await
}

#[allow(dead_code)]
pub async fn login(client: &reqwest::Client, address: &str, email: &str) -> String {
    let body: Value = client
        .post(format!("{}/v1/users/login", address))
        .json(&json!({ "email": email, "password": PASSWORD }))
        .send()
        .await
        .expect("Login failed")
        .json()
        .await
        .expect("Failed to parse login json");

    body["authentication_token"]["token"]
        .as_str()
        .expect("Token not found")
        .to_string()
}

#[allow(dead_code)]
pub fn movement_body(name: &str, difficulty: &str, skilltype: &[&str]) -> Value {
    json!({
        "name": name,
        "description": format!("{} description", name),
        "image": "https://example.com/movement.jpg",
        "tutorials": ["https://example.com/tutorial"],
        "skilltype": skilltype,
        "muscles": ["legs", "core"],
        "difficulty": difficulty,
        "equipments": ["none"],
        "prerequisite": [],
    })
}

/// True when any `Vary` header value names `Authorization`.
#[allow(dead_code)]
pub fn varies_on_authorization(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get_all("vary")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|v| v.trim().eq_ignore_ascii_case("authorization"))
}

/// Postgres DSN for the store tests, when one is configured.
#[allow(dead_code)]
pub fn database_url() -> Option<String> {
    std::env::var("DATABASE_URL").ok()
}

/// Evaluates to the DSN, or skips the test when DATABASE_URL is unset.
#[macro_export]
macro_rules! require_database {
    () => {
        match crate::common::database_url() {
            Some(url) => url,
            None => {
                eprintln!("Skipping: DATABASE_URL not set");
                return;
            }
        }
    };
}

/// Connects to Postgres and applies the migrations.
#[allow(dead_code)]
pub async fn pg_store(database_url: &str) -> PgStore {
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url)
        .await
        .expect("Failed to connect to Postgres for testing");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    PgStore::new(pool)
}

/// A suffix no other test run has used, for emails and search tags.
#[allow(dead_code)]
pub fn unique(prefix: &str) -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("{}{}x{}", prefix, nanos, COUNTER.fetch_add(1, Ordering::Relaxed))
}
