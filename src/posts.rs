use spin_sdk::http::{Request, Response};
use uuid::Uuid;
use crate::models::models::{Comment, Post};
use crate::config::{MAX_POST_LENGTH, POSTS_PER_PAGE};
use crate::core::db;
use crate::core::errors::ApiError;
use crate::core::helpers::{store, now_iso, sanitize_text, validate_uuid};
use crate::core::query_params::{get_int, parse_query_params};
use crate::auth::authenticate;

fn json_ok(body: serde_json::Value) -> anyhow::Result<Response> {
    Ok(Response::builder()
        .status(200)
        .header("Content-Type", "application/json")
        .body(serde_json::to_vec(&body)?)
        .build())
}

/// POST /api/posts
pub fn create_post(req: Request) -> anyhow::Result<Response> {
    let user_id = match authenticate(&req) {
        Ok(uid) => uid,
        Err(err) => return Ok(err.into()),
    };

    let store = store();
    let body: serde_json::Value = serde_json::from_slice(req.body()).unwrap_or_default();
    let text = body["text"].as_str().unwrap_or_default().trim();

    if text.is_empty() || text.len() > MAX_POST_LENGTH {
        return Ok(ApiError::Validation(vec!["Text is required".to_string()]).into());
    }

    // Token may outlive the account.
    let author = match db::get_user(&store, &user_id)? {
        Some(user) => user,
        None => return Ok(ApiError::NotFound("User not found".to_string()).into()),
    };

    let post = Post {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.clone(),
        text: sanitize_text(text),
        name: author.name,
        avatar: author.avatar,
        likes: Vec::new(),
        comments: Vec::new(),
        created_at: now_iso(),
    };

    db::insert_post(&store, &post)?;

    json_ok(serde_json::to_value(&post)?)
}

/// GET /api/posts — feed order, newest first, `?page=` pagination.
pub fn list_posts(req: Request) -> anyhow::Result<Response> {
    if let Err(err) = authenticate(&req) {
        return Ok(err.into());
    }

    let params = parse_query_params(req.uri());
    let page = get_int(&params, "page", 1);
    let start_idx = (page - 1) * POSTS_PER_PAGE;

    let store = store();
    let posts: Vec<Post> = db::feed_posts(&store)?
        .into_iter()
        .skip(start_idx)
        .take(POSTS_PER_PAGE)
        .collect();

    json_ok(serde_json::to_value(&posts)?)
}

/// GET /api/posts/{id}
pub fn get_post(req: Request) -> anyhow::Result<Response> {
    if let Err(err) = authenticate(&req) {
        return Ok(err.into());
    }

    let path = req.path();
    let post_id = path.split('/').last().unwrap_or("");
    if post_id.is_empty() || !validate_uuid(post_id) {
        return Ok(ApiError::NotFound("Post not found".to_string()).into());
    }

    let store = store();
    match db::get_post(&store, post_id)? {
        Some(post) => json_ok(serde_json::to_value(&post)?),
        None => Ok(ApiError::NotFound("Post not found".to_string()).into()),
    }
}

/// DELETE /api/posts/{id} — owner only.
pub fn delete_post(req: Request) -> anyhow::Result<Response> {
    let user_id = match authenticate(&req) {
        Ok(uid) => uid,
        Err(err) => return Ok(err.into()),
    };

    let path = req.path();
    let post_id = path.split('/').last().unwrap_or("");
    if post_id.is_empty() || !validate_uuid(post_id) {
        return Ok(ApiError::NotFound("Post not found".to_string()).into());
    }

    let store = store();
    let post = match db::get_post(&store, post_id)? {
        Some(post) => post,
        None => return Ok(ApiError::NotFound("Post not found".to_string()).into()),
    };
    if post.user_id != user_id {
        return Ok(ApiError::Forbidden.into());
    }

    db::delete_post(&store, post_id)?;

    json_ok(serde_json::json!({"msg": "Post removed"}))
}

/// PUT /api/posts/like/{id}
pub fn like_post(req: Request) -> anyhow::Result<Response> {
    let user_id = match authenticate(&req) {
        Ok(uid) => uid,
        Err(err) => return Ok(err.into()),
    };

    let path = req.path();
    let post_id = path.trim_start_matches("/api/posts/like/");
    if post_id.is_empty() || !validate_uuid(post_id) {
        return Ok(ApiError::NotFound("Post not found".to_string()).into());
    }

    let store = store();
    let mut post = match db::get_post(&store, post_id)? {
        Some(post) => post,
        None => return Ok(ApiError::NotFound("Post not found".to_string()).into()),
    };

    if post.likes.contains(&user_id) {
        return Ok(ApiError::BadRequest("Post already liked".to_string()).into());
    }

    post.likes.insert(0, user_id);
    db::put_post(&store, &post)?;

    json_ok(serde_json::to_value(&post.likes)?)
}

/// PUT /api/posts/unlike/{id}
pub fn unlike_post(req: Request) -> anyhow::Result<Response> {
    let user_id = match authenticate(&req) {
        Ok(uid) => uid,
        Err(err) => return Ok(err.into()),
    };

    let path = req.path();
    let post_id = path.trim_start_matches("/api/posts/unlike/");
    if post_id.is_empty() || !validate_uuid(post_id) {
        return Ok(ApiError::NotFound("Post not found".to_string()).into());
    }

    let store = store();
    let mut post = match db::get_post(&store, post_id)? {
        Some(post) => post,
        None => return Ok(ApiError::NotFound("Post not found".to_string()).into()),
    };

    if !post.likes.contains(&user_id) {
        return Ok(ApiError::BadRequest("Post has not yet been liked".to_string()).into());
    }

    post.likes.retain(|id| id != &user_id);
    db::put_post(&store, &post)?;

    json_ok(serde_json::to_value(&post.likes)?)
}

/// POST /api/posts/comment/{id} — prepend, newest first.
pub fn add_comment(req: Request) -> anyhow::Result<Response> {
    let user_id = match authenticate(&req) {
        Ok(uid) => uid,
        Err(err) => return Ok(err.into()),
    };

    let path = req.path().to_string();
    let post_id = path.trim_start_matches("/api/posts/comment/");
    if post_id.is_empty() || !validate_uuid(post_id) {
        return Ok(ApiError::NotFound("Post not found".to_string()).into());
    }

    let body: serde_json::Value = serde_json::from_slice(req.body()).unwrap_or_default();
    let text = body["text"].as_str().unwrap_or_default().trim();
    if text.is_empty() || text.len() > MAX_POST_LENGTH {
        return Ok(ApiError::Validation(vec!["Text is required".to_string()]).into());
    }

    let store = store();
    let author = match db::get_user(&store, &user_id)? {
        Some(user) => user,
        None => return Ok(ApiError::NotFound("User not found".to_string()).into()),
    };

    let mut post = match db::get_post(&store, post_id)? {
        Some(post) => post,
        None => return Ok(ApiError::NotFound("Post not found".to_string()).into()),
    };

    let comment = Comment {
        id: Uuid::new_v4().to_string(),
        user_id,
        text: sanitize_text(text),
        name: author.name,
        avatar: author.avatar,
        created_at: now_iso(),
    };

    post.comments.insert(0, comment);
    db::put_post(&store, &post)?;

    json_ok(serde_json::to_value(&post.comments)?)
}

/// DELETE /api/posts/comment/{id}/{comment_id} — comment owner only.
pub fn remove_comment(req: Request) -> anyhow::Result<Response> {
    let user_id = match authenticate(&req) {
        Ok(uid) => uid,
        Err(err) => return Ok(err.into()),
    };

    let path = req.path().to_string();
    let rest = path.trim_start_matches("/api/posts/comment/");
    let mut parts = rest.split('/');
    let post_id = parts.next().unwrap_or("");
    let comment_id = parts.next().unwrap_or("");

    if post_id.is_empty() || !validate_uuid(post_id) {
        return Ok(ApiError::NotFound("Post not found".to_string()).into());
    }
    if comment_id.is_empty() || !validate_uuid(comment_id) {
        return Ok(ApiError::NotFound("Comment does not exist".to_string()).into());
    }

    let store = store();
    let mut post = match db::get_post(&store, post_id)? {
        Some(post) => post,
        None => return Ok(ApiError::NotFound("Post not found".to_string()).into()),
    };

    let comment = match post.comments.iter().find(|c| c.id == comment_id) {
        Some(comment) => comment,
        None => return Ok(ApiError::NotFound("Comment does not exist".to_string()).into()),
    };
    if comment.user_id != user_id {
        return Ok(ApiError::Forbidden.into());
    }

    post.comments.retain(|c| c.id != comment_id);
    db::put_post(&store, &post)?;

    json_ok(serde_json::to_value(&post.comments)?)
}
