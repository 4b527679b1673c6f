//! End-to-end tests against a running server (`cargo run`, port 5000).
//! Ignored by default; run with `cargo test -- --ignored`.

use serde_json::{json, Value};
use std::sync::Mutex;

const BASE_URL: &str = "http://127.0.0.1:5000";
static TEST_LOCK: Mutex<()> = Mutex::new(());

fn lock_test() -> std::sync::MutexGuard<'static, ()> {
    TEST_LOCK.lock().unwrap()
}

fn unique_email() -> String {
    format!("it_{}@example.com", uuid::Uuid::new_v4())
}

async fn register(client: &reqwest::Client, email: &str) -> String {
    let resp = client
        .post(format!("{}/api/users", BASE_URL))
        .json(&json!({
            "name": "Integration Tester",
            "email": email,
            "password": "secret99"
        }))
        .send()
        .await
        .expect("Failed to register");

    assert_eq!(resp.status(), 200);
    let body = resp.json::<Value>().await.unwrap();
    body["token"].as_str().expect("token missing").to_string()
}

#[ignore]
#[tokio::test]
async fn test_full_account_flow() {
    let _lock = lock_test();
    let client = reqwest::Client::new();

    let email = unique_email();
    let token = register(&client, &email).await;

    // Auth gate accepts the issued token; password never leaves the server.
    let me = client
        .get(format!("{}/api/auth", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(me.status(), 200);
    let me = me.json::<Value>().await.unwrap();
    assert_eq!(me["email"], email);
    assert!(me.get("password").is_none());

    // Create profile, then update it: idempotent by user, one document.
    let created = client
        .post(format!("{}/api/profile", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({"status": "Developer", "skills": "Rust, SQL", "company": "Acme"}))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status(), 200);

    let updated = client
        .post(format!("{}/api/profile", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({"status": "Senior Developer", "skills": "Rust, SQL", "company": "Initech"}))
        .send()
        .await
        .unwrap();
    assert_eq!(updated.status(), 200);

    let profile = client
        .get(format!("{}/api/profile/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json::<Value>()
        .await
        .unwrap();
    assert_eq!(profile["status"], "Senior Developer");
    assert_eq!(profile["company"], "Initech");
    assert_eq!(profile["skills"], json!(["Rust", "SQL"]));

    // Experience entries prepend: newest first.
    for title in ["First job", "Second job", "Third job"] {
        let resp = client
            .put(format!("{}/api/profile/experience", BASE_URL))
            .header("Authorization", format!("Bearer {}", token))
            .json(&json!({"title": title, "company": "Acme", "from": "2020-01-01"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
    }

    let profile = client
        .get(format!("{}/api/profile/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json::<Value>()
        .await
        .unwrap();
    let experience = profile["experience"].as_array().unwrap();
    assert_eq!(experience[0]["title"], "Third job");
    assert_eq!(experience[2]["title"], "First job");

    // Delete the middle entry: exactly it goes, order of the rest holds.
    let middle_id = experience[1]["id"].as_str().unwrap();
    let resp = client
        .delete(format!("{}/api/profile/experience/{}", BASE_URL, middle_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let after = resp.json::<Value>().await.unwrap();
    let titles: Vec<&str> = after["experience"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Third job", "First job"]);

    // Posts with likes and comments.
    let post = client
        .post(format!("{}/api/posts", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({"text": "Hello from the integration test"}))
        .send()
        .await
        .unwrap();
    assert_eq!(post.status(), 200);
    let post = post.json::<Value>().await.unwrap();
    let post_id = post["id"].as_str().unwrap().to_string();

    let likes = client
        .put(format!("{}/api/posts/like/{}", BASE_URL, post_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(likes.status(), 200);
    assert_eq!(likes.json::<Value>().await.unwrap().as_array().unwrap().len(), 1);

    // Double-like is rejected.
    let again = client
        .put(format!("{}/api/posts/like/{}", BASE_URL, post_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(again.status(), 400);

    let comments = client
        .post(format!("{}/api/posts/comment/{}", BASE_URL, post_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({"text": "Nice post"}))
        .send()
        .await
        .unwrap();
    assert_eq!(comments.status(), 200);
    let comments = comments.json::<Value>().await.unwrap();
    assert_eq!(comments[0]["text"], "Nice post");

    // Cascading account deletion: user, profile, posts all go.
    let deleted = client
        .delete(format!("{}/api/profile", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), 200);

    let login = client
        .post(format!("{}/api/auth", BASE_URL))
        .json(&json!({"email": email, "password": "secret99"}))
        .send()
        .await
        .unwrap();
    assert_eq!(login.status(), 400);

    let gone = client
        .get(format!("{}/api/posts/{}", BASE_URL, post_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(gone.status(), 404);
}

#[ignore]
#[tokio::test]
async fn test_duplicate_registration_rejected() {
    let _lock = lock_test();
    let client = reqwest::Client::new();

    let email = unique_email();
    register(&client, &email).await;

    let resp = client
        .post(format!("{}/api/users", BASE_URL))
        .json(&json!({"name": "Copycat", "email": email, "password": "secret99"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body = resp.json::<Value>().await.unwrap();
    assert_eq!(body["errors"][0]["msg"], "User already exists");
}

#[ignore]
#[tokio::test]
async fn test_login_fails_uniformly() {
    let _lock = lock_test();
    let client = reqwest::Client::new();

    let email = unique_email();
    register(&client, &email).await;

    // Wrong password and unknown email must be indistinguishable.
    let wrong_password = client
        .post(format!("{}/api/auth", BASE_URL))
        .json(&json!({"email": email, "password": "wrongpass"}))
        .send()
        .await
        .unwrap();
    let unknown_email = client
        .post(format!("{}/api/auth", BASE_URL))
        .json(&json!({"email": unique_email(), "password": "secret99"}))
        .send()
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), 400);
    assert_eq!(unknown_email.status(), 400);
    let a = wrong_password.json::<Value>().await.unwrap();
    let b = unknown_email.json::<Value>().await.unwrap();
    assert_eq!(a, b);
    assert_eq!(a["errors"][0]["msg"], "Invalid Credentials");
}

#[ignore]
#[tokio::test]
async fn test_registration_validation() {
    let _lock = lock_test();
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/users", BASE_URL))
        .json(&json!({"name": "", "email": "not-an-email", "password": "short"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body = resp.json::<Value>().await.unwrap();
    let msgs: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["msg"].as_str().unwrap())
        .collect();
    assert!(msgs.contains(&"Name is required"));
    assert!(msgs.contains(&"Please include a valid email"));
    assert!(msgs.contains(&"Password must be 6 or more characters"));
}

#[ignore]
#[tokio::test]
async fn test_protected_routes_require_token() {
    let _lock = lock_test();
    let client = reqwest::Client::new();

    let no_token = client.get(format!("{}/api/auth", BASE_URL)).send().await.unwrap();
    assert_eq!(no_token.status(), 401);
    let body = no_token.json::<Value>().await.unwrap();
    assert_eq!(body["msg"], "No token, authorization denied");

    let bad_token = client
        .post(format!("{}/api/posts", BASE_URL))
        .header("Authorization", "Bearer not.a.token")
        .json(&json!({"text": "should not land"}))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_token.status(), 401);
    let body = bad_token.json::<Value>().await.unwrap();
    assert_eq!(body["msg"], "Token is not valid");
}
