use serde_json::json;
use std::time::Instant;

const BASE_URL: &str = "http://127.0.0.1:5000";
const NUM_USERS: usize = 100;
const POSTS_PER_USER: usize = 2;

#[ignore]
#[tokio::test(flavor = "multi_thread")]
async fn perf_test_users_with_posts() {
    let client = reqwest::Client::new();
    let start = Instant::now();

    println!("\n=== Performance Test ===");
    println!("Creating {} users with {} posts each...", NUM_USERS, POSTS_PER_USER);

    let mut tokens = Vec::new();

    // Register users
    let user_creation_start = Instant::now();
    for i in 0..NUM_USERS {
        let email = format!("perf_{}_{}@example.com", i, &uuid::Uuid::new_v4().to_string()[0..8]);

        let create_resp = client
            .post(format!("{}/api/users", BASE_URL))
            .json(&json!({
                "name": format!("Perf User {}", i),
                "email": email,
                "password": "password123"
            }))
            .send()
            .await;

        if let Ok(resp) = create_resp {
            if resp.status() == 200 {
                if let Ok(body) = resp.json::<serde_json::Value>().await {
                    if let Some(token) = body["token"].as_str() {
                        tokens.push(token.to_string());
                    }
                }
            }
        }

        if (i + 1) % 50 == 0 {
            println!("  Created {}/{} users", i + 1, NUM_USERS);
        }
    }
    let user_creation_time = user_creation_start.elapsed();

    println!(
        "User creation done: {} users in {:.2}s ({:.2} users/sec)",
        tokens.len(),
        user_creation_time.as_secs_f64(),
        tokens.len() as f64 / user_creation_time.as_secs_f64()
    );

    // Create posts
    let post_creation_start = Instant::now();
    let mut posts_created = 0;
    let mut posts_failed = 0;

    for (idx, token) in tokens.iter().enumerate() {
        for post_num in 0..POSTS_PER_USER {
            let text = format!(
                "Post {} from user {} - perf run at {}",
                post_num + 1,
                idx,
                chrono::Utc::now().to_rfc3339()
            );

            let post_resp = client
                .post(format!("{}/api/posts", BASE_URL))
                .header("Authorization", format!("Bearer {}", token))
                .json(&json!({ "text": text }))
                .send()
                .await;

            match post_resp {
                Ok(resp) if resp.status() == 200 => posts_created += 1,
                _ => posts_failed += 1,
            }
        }

        if (idx + 1) % 50 == 0 {
            println!(
                "  Processed {}/{} users ({} posts created)",
                idx + 1,
                tokens.len(),
                posts_created
            );
        }
    }
    let post_creation_time = post_creation_start.elapsed();

    let total_time = start.elapsed();
    let total_requests = tokens.len() + posts_created + posts_failed;

    println!("\n=== Results ===");
    println!("Total time: {:.2}s", total_time.as_secs_f64());
    println!("User creation: {:.2}s", user_creation_time.as_secs_f64());
    println!("Post creation: {:.2}s", post_creation_time.as_secs_f64());
    println!("Users created: {}", tokens.len());
    println!("Posts created: {}", posts_created);
    println!("Posts failed: {}", posts_failed);
    println!(
        "Avg time per request: {:.2}ms",
        (total_time.as_secs_f64() * 1000.0) / total_requests as f64
    );
    println!(
        "Throughput: {:.0} requests/sec",
        total_requests as f64 / total_time.as_secs_f64()
    );

    assert!(tokens.len() == NUM_USERS, "all registrations should succeed");
    assert!(posts_failed == 0, "all posts should be created");
}
