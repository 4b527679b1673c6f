use spin_sdk::http::{Request, Response};
use uuid::Uuid;
use tracing::info;
use crate::models::models::{Education, Experience, Profile, SocialLinks};
use crate::config::MAX_BIO_LENGTH;
use crate::core::db;
use crate::core::errors::ApiError;
use crate::core::helpers::{
    store, normalize_url, now_iso, parse_skills, sanitize_text, validate_uuid,
};
use crate::auth::authenticate;

fn json_ok(body: serde_json::Value) -> anyhow::Result<Response> {
    Ok(Response::builder()
        .status(200)
        .header("Content-Type", "application/json")
        .body(serde_json::to_vec(&body)?)
        .build())
}

/// Profile as sent to clients, with the owner's name and avatar attached.
fn build_profile_json(
    store: &spin_sdk::key_value::Store,
    profile: &Profile,
) -> anyhow::Result<serde_json::Value> {
    let mut value = serde_json::to_value(profile)?;
    let user = db::get_user(store, &profile.user_id)?.map(|u| {
        serde_json::json!({
            "id": u.id,
            "name": u.name,
            "avatar": u.avatar,
        })
    });
    if let Some(obj) = value.as_object_mut() {
        obj.insert("user".to_string(), user.unwrap_or(serde_json::Value::Null));
    }
    Ok(value)
}

fn opt_text(body: &serde_json::Value, key: &str) -> Option<String> {
    body[key]
        .as_str()
        .map(|s| sanitize_text(s.trim()))
        .filter(|s| !s.is_empty())
}

fn opt_link(body: &serde_json::Value, key: &str) -> Option<String> {
    body[key]
        .as_str()
        .map(normalize_url)
        .filter(|s| !s.is_empty())
}

/// GET /api/profile/me
pub fn get_my_profile(req: Request) -> anyhow::Result<Response> {
    let user_id = match authenticate(&req) {
        Ok(uid) => uid,
        Err(err) => return Ok(err.into()),
    };

    let store = store();
    match db::get_profile(&store, &user_id)? {
        Some(profile) => json_ok(build_profile_json(&store, &profile)?),
        None => Ok(ApiError::BadRequest("There is no profile for this user".to_string()).into()),
    }
}

/// POST /api/profile — create-or-update, idempotent by user id.
pub fn upsert_profile(req: Request) -> anyhow::Result<Response> {
    let user_id = match authenticate(&req) {
        Ok(uid) => uid,
        Err(err) => return Ok(err.into()),
    };

    let store = store();
    let body: serde_json::Value = serde_json::from_slice(req.body()).unwrap_or_default();

    let status = body["status"].as_str().unwrap_or_default().trim();
    let skills: Vec<String> = match body["skills"].as_array() {
        Some(list) => list
            .iter()
            .filter_map(|v| v.as_str())
            .map(|s| sanitize_text(s.trim()))
            .filter(|s| !s.is_empty())
            .collect(),
        None => parse_skills(body["skills"].as_str().unwrap_or_default())
            .iter()
            .map(|s| sanitize_text(s))
            .collect(),
    };

    let mut errors = Vec::new();
    if status.is_empty() {
        errors.push("Status is required".to_string());
    }
    if skills.is_empty() {
        errors.push("Skills is required".to_string());
    }
    if body["bio"].as_str().map(|b| b.len() > MAX_BIO_LENGTH).unwrap_or(false) {
        errors.push("Bio too long (max 500 chars)".to_string());
    }
    if !errors.is_empty() {
        return Ok(ApiError::Validation(errors).into());
    }

    // A second call updates the one existing document; the sub-collections
    // carry over untouched.
    let (experience, education) = match db::get_profile(&store, &user_id)? {
        Some(existing) => (existing.experience, existing.education),
        None => (Vec::new(), Vec::new()),
    };

    let profile = Profile {
        user_id: user_id.clone(),
        company: opt_text(&body, "company"),
        website: opt_link(&body, "website"),
        location: opt_text(&body, "location"),
        status: sanitize_text(status),
        skills,
        bio: opt_text(&body, "bio"),
        githubusername: opt_text(&body, "githubusername"),
        social: SocialLinks {
            youtube: opt_link(&body, "youtube"),
            twitter: opt_link(&body, "twitter"),
            instagram: opt_link(&body, "instagram"),
            linkedin: opt_link(&body, "linkedin"),
            facebook: opt_link(&body, "facebook"),
        },
        experience,
        education,
        updated_at: now_iso(),
    };

    db::put_profile(&store, &profile)?;
    info!(user_id = %user_id, "profile saved");

    json_ok(build_profile_json(&store, &profile)?)
}

/// GET /api/profile
pub fn list_profiles(_req: Request) -> anyhow::Result<Response> {
    let store = store();
    let mut out = Vec::new();
    for profile in db::list_profiles(&store)? {
        out.push(build_profile_json(&store, &profile)?);
    }
    json_ok(serde_json::Value::Array(out))
}

/// GET /api/profile/user/{user_id}
pub fn get_profile_by_user(req: Request) -> anyhow::Result<Response> {
    let path = req.path();
    let user_id = path.trim_start_matches("/api/profile/user/");

    // Malformed ids get the same answer as missing profiles.
    if user_id.is_empty() || !validate_uuid(user_id) {
        return Ok(ApiError::BadRequest("Profile not found".to_string()).into());
    }

    let store = store();
    match db::get_profile(&store, user_id)? {
        Some(profile) => json_ok(build_profile_json(&store, &profile)?),
        None => Ok(ApiError::BadRequest("Profile not found".to_string()).into()),
    }
}

/// DELETE /api/profile — remove posts, then profile, then the user record.
/// Three independent deletes; a failure partway leaves orphaned data behind.
pub fn delete_account(req: Request) -> anyhow::Result<Response> {
    let user_id = match authenticate(&req) {
        Ok(uid) => uid,
        Err(err) => return Ok(err.into()),
    };

    let store = store();
    db::delete_posts_by_user(&store, &user_id)?;
    db::delete_profile(&store, &user_id)?;
    db::delete_user(&store, &user_id)?;
    info!(user_id = %user_id, "account deleted");

    json_ok(serde_json::json!({"msg": "User deleted"}))
}

/// PUT /api/profile/experience — prepend, most-recent-first.
pub fn add_experience(req: Request) -> anyhow::Result<Response> {
    let user_id = match authenticate(&req) {
        Ok(uid) => uid,
        Err(err) => return Ok(err.into()),
    };

    let store = store();
    let body: serde_json::Value = serde_json::from_slice(req.body()).unwrap_or_default();

    let title = body["title"].as_str().unwrap_or_default().trim();
    let company = body["company"].as_str().unwrap_or_default().trim();
    let from = body["from"].as_str().unwrap_or_default().trim();
    let to = body["to"].as_str().map(str::trim).filter(|s| !s.is_empty());

    let mut errors = Vec::new();
    if title.is_empty() {
        errors.push("Title is required".to_string());
    }
    if company.is_empty() {
        errors.push("Company is required".to_string());
    }
    if from.is_empty() || to.map(|t| from >= t).unwrap_or(false) {
        errors.push("From date is required and needs to be from the past".to_string());
    }
    if !errors.is_empty() {
        return Ok(ApiError::Validation(errors).into());
    }

    let entry = Experience {
        id: Uuid::new_v4().to_string(),
        title: sanitize_text(title),
        company: sanitize_text(company),
        location: opt_text(&body, "location"),
        from: from.to_string(),
        to: to.map(str::to_string),
        current: body["current"].as_bool().unwrap_or(false),
        description: opt_text(&body, "description"),
    };

    let mut profile = match db::get_profile(&store, &user_id)? {
        Some(profile) => profile,
        None => {
            return Ok(
                ApiError::BadRequest("There is no profile for this user".to_string()).into(),
            )
        }
    };

    profile.add_experience(entry);
    profile.updated_at = now_iso();
    db::put_profile(&store, &profile)?;

    json_ok(build_profile_json(&store, &profile)?)
}

/// DELETE /api/profile/experience/{exp_id}
pub fn remove_experience(req: Request) -> anyhow::Result<Response> {
    let user_id = match authenticate(&req) {
        Ok(uid) => uid,
        Err(err) => return Ok(err.into()),
    };

    let path = req.path();
    let exp_id = path.split('/').last().unwrap_or("");
    if exp_id.is_empty() || !validate_uuid(exp_id) {
        return Ok(ApiError::BadRequest("Experience ID required".to_string()).into());
    }

    let store = store();
    let mut profile = match db::get_profile(&store, &user_id)? {
        Some(profile) => profile,
        None => {
            return Ok(
                ApiError::BadRequest("There is no profile for this user".to_string()).into(),
            )
        }
    };

    profile.remove_experience(exp_id);
    profile.updated_at = now_iso();
    db::put_profile(&store, &profile)?;

    json_ok(build_profile_json(&store, &profile)?)
}

/// PUT /api/profile/education — prepend, most-recent-first.
pub fn add_education(req: Request) -> anyhow::Result<Response> {
    let user_id = match authenticate(&req) {
        Ok(uid) => uid,
        Err(err) => return Ok(err.into()),
    };

    let store = store();
    let body: serde_json::Value = serde_json::from_slice(req.body()).unwrap_or_default();

    let school = body["school"].as_str().unwrap_or_default().trim();
    let degree = body["degree"].as_str().unwrap_or_default().trim();
    let fieldofstudy = body["fieldofstudy"].as_str().unwrap_or_default().trim();
    let from = body["from"].as_str().unwrap_or_default().trim();
    let to = body["to"].as_str().map(str::trim).filter(|s| !s.is_empty());

    let mut errors = Vec::new();
    if school.is_empty() {
        errors.push("School is required".to_string());
    }
    if degree.is_empty() {
        errors.push("Degree is required".to_string());
    }
    if fieldofstudy.is_empty() {
        errors.push("Field of study is required".to_string());
    }
    if from.is_empty() || to.map(|t| from >= t).unwrap_or(false) {
        errors.push("From date is required and needs to be from the past".to_string());
    }
    if !errors.is_empty() {
        return Ok(ApiError::Validation(errors).into());
    }

    let entry = Education {
        id: Uuid::new_v4().to_string(),
        school: sanitize_text(school),
        degree: sanitize_text(degree),
        fieldofstudy: sanitize_text(fieldofstudy),
        from: from.to_string(),
        to: to.map(str::to_string),
        current: body["current"].as_bool().unwrap_or(false),
        description: opt_text(&body, "description"),
    };

    let mut profile = match db::get_profile(&store, &user_id)? {
        Some(profile) => profile,
        None => {
            return Ok(
                ApiError::BadRequest("There is no profile for this user".to_string()).into(),
            )
        }
    };

    profile.add_education(entry);
    profile.updated_at = now_iso();
    db::put_profile(&store, &profile)?;

    json_ok(build_profile_json(&store, &profile)?)
}

/// DELETE /api/profile/education/{edu_id}
pub fn remove_education(req: Request) -> anyhow::Result<Response> {
    let user_id = match authenticate(&req) {
        Ok(uid) => uid,
        Err(err) => return Ok(err.into()),
    };

    let path = req.path();
    let edu_id = path.split('/').last().unwrap_or("");
    if edu_id.is_empty() || !validate_uuid(edu_id) {
        return Ok(ApiError::BadRequest("Education ID required".to_string()).into());
    }

    let store = store();
    let mut profile = match db::get_profile(&store, &user_id)? {
        Some(profile) => profile,
        None => {
            return Ok(
                ApiError::BadRequest("There is no profile for this user".to_string()).into(),
            )
        }
    };

    profile.remove_education(edu_id);
    profile.updated_at = now_iso();
    db::put_profile(&store, &profile)?;

    json_ok(build_profile_json(&store, &profile)?)
}
