use spin_sdk::http::{Request, Response};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::info;
use crate::models::models::Claims;
use crate::config::{jwt_secret, token_expiration_hours};
use crate::core::db;
use crate::core::errors::ApiError;
use crate::core::helpers::{store, verify_password};
use crate::users::build_user_json;

/// Sign a session token for the user. Stateless; nothing is stored.
pub fn issue_token(user_id: &str) -> anyhow::Result<String> {
    let now = chrono::Utc::now();
    let expires = now + chrono::Duration::hours(token_expiration_hours());
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: expires.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret().as_bytes()),
    )
    .map_err(|e| anyhow::anyhow!("Failed to sign token: {}", e))
}

/// Verify a token and return the user id it carries. Expired or tampered
/// tokens yield None.
pub fn verify_token(token: &str) -> Option<String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret().as_bytes()),
        &Validation::default(),
    )
    .ok()
    .map(|data| data.claims.sub)
}

/// Auth gate: extract and verify the bearer token before any handler logic.
pub fn authenticate(req: &Request) -> Result<String, ApiError> {
    let auth_header = req
        .header("Authorization")
        .and_then(|h| h.as_str())
        .unwrap_or_default();

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthorized("No token, authorization denied"))?;

    verify_token(token).ok_or(ApiError::Unauthorized("Token is not valid"))
}

/// POST /api/auth
pub fn login_user(req: Request) -> anyhow::Result<Response> {
    let store = store();
    let creds: serde_json::Value = serde_json::from_slice(req.body()).unwrap_or_default();
    let email = creds["email"].as_str().unwrap_or_default().trim().to_lowercase();
    let password = creds["password"].as_str().unwrap_or_default();

    let mut errors = Vec::new();
    if email.is_empty() {
        errors.push("Please include a valid email".to_string());
    }
    if password.is_empty() {
        errors.push("Password is required".to_string());
    }
    if !errors.is_empty() {
        return Ok(ApiError::Validation(errors).into());
    }

    // Same response for unknown email and wrong password.
    let user = match db::find_user_by_email(&store, &email)? {
        Some(user) if verify_password(password, &user.password) => user,
        _ => {
            return Ok(ApiError::Validation(vec!["Invalid Credentials".to_string()]).into());
        }
    };

    let token = issue_token(&user.id)?;
    info!(user_id = %user.id, "login successful");

    Ok(Response::builder()
        .status(200)
        .header("Content-Type", "application/json")
        .body(serde_json::to_vec(&serde_json::json!({"token": token}))?)
        .build())
}

/// GET /api/auth
pub fn current_user(req: Request) -> anyhow::Result<Response> {
    let user_id = match authenticate(&req) {
        Ok(uid) => uid,
        Err(err) => return Ok(err.into()),
    };

    let store = store();
    if let Some(user) = db::get_user(&store, &user_id)? {
        Ok(Response::builder()
            .status(200)
            .header("Content-Type", "application/json")
            .body(serde_json::to_vec(&build_user_json(&user))?)
            .build())
    } else {
        Ok(ApiError::NotFound("User not found".to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_roundtrip() {
        let token = issue_token("user-123").unwrap();
        assert_eq!(verify_token(&token).as_deref(), Some("user-123"));
    }

    #[test]
    fn tampered_token_rejected() {
        let token = issue_token("user-123").unwrap();
        let mut tampered = token.clone();
        tampered.push('x');
        assert!(verify_token(&tampered).is_none());
        assert!(verify_token("not.a.token").is_none());
    }

    #[test]
    fn expired_token_rejected() {
        let now = chrono::Utc::now();
        let claims = Claims {
            sub: "user-123".to_string(),
            iat: now.timestamp() - 7200,
            exp: now.timestamp() - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(jwt_secret().as_bytes()),
        )
        .unwrap();

        assert!(verify_token(&token).is_none());
    }
}
