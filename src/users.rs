use spin_sdk::http::{Request, Response};
use uuid::Uuid;
use tracing::info;
use crate::models::models::User;
use crate::config::MIN_PASSWORD_LENGTH;
use crate::core::db;
use crate::core::errors::ApiError;
use crate::core::helpers::{
    store, gravatar_url, hash_password, now_iso, sanitize_text, valid_email,
};
use crate::auth::issue_token;

/// User as sent to clients: the password hash never leaves the store.
pub fn build_user_json(user: &User) -> serde_json::Value {
    serde_json::json!({
        "id": user.id,
        "name": user.name,
        "email": user.email,
        "avatar": user.avatar,
        "created_at": user.created_at,
    })
}

/// POST /api/users
pub fn register_user(req: Request) -> anyhow::Result<Response> {
    let store = store();
    let body: serde_json::Value = serde_json::from_slice(req.body()).unwrap_or_default();

    let name = body["name"].as_str().unwrap_or_default().trim();
    let email = body["email"].as_str().unwrap_or_default().trim().to_lowercase();
    let password = body["password"].as_str().unwrap_or_default();

    let mut errors = Vec::new();
    if name.is_empty() {
        errors.push("Name is required".to_string());
    }
    if !valid_email(&email) {
        errors.push("Please include a valid email".to_string());
    }
    if password.len() < MIN_PASSWORD_LENGTH {
        errors.push("Password must be 6 or more characters".to_string());
    }
    if !errors.is_empty() {
        return Ok(ApiError::Validation(errors).into());
    }

    if db::find_user_by_email(&store, &email)?.is_some() {
        return Ok(ApiError::Validation(vec!["User already exists".to_string()]).into());
    }

    let user = User {
        id: Uuid::new_v4().to_string(),
        name: sanitize_text(name),
        avatar: gravatar_url(&email),
        email,
        password: hash_password(password)?,
        created_at: now_iso(),
    };

    db::insert_user(&store, &user)?;

    let token = issue_token(&user.id)?;
    info!(user_id = %user.id, "user registered");

    Ok(Response::builder()
        .status(200)
        .header("Content-Type", "application/json")
        .body(serde_json::to_vec(&serde_json::json!({"token": token}))?)
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_json_omits_password() {
        let user = User {
            id: "u1".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "$argon2id$secret".to_string(),
            avatar: "https://www.gravatar.com/avatar/abc".to_string(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
        };

        let json = build_user_json(&user);
        assert_eq!(json["name"], "Ada");
        assert!(json.get("password").is_none());
    }
}
