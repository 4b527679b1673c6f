use spin_sdk::http::Response;
use std::fmt;

#[derive(Debug)]
pub enum ApiError {
    /// Field validation failures, reported together before any mutation.
    Validation(Vec<String>),
    BadRequest(String),
    Unauthorized(&'static str),
    Forbidden,
    NotFound(String),
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(msgs) => write!(f, "Validation: {}", msgs.join(", ")),
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden => write!(f, "Forbidden"),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal Error: {}", msg),
        }
    }
}

fn json_response(status: u16, body: serde_json::Value) -> Response {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(serde_json::to_vec(&body).unwrap())
        .build()
}

impl From<ApiError> for Response {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Validation(msgs) => {
                let errors: Vec<serde_json::Value> =
                    msgs.into_iter().map(|m| serde_json::json!({"msg": m})).collect();
                json_response(400, serde_json::json!({"errors": errors}))
            }
            ApiError::BadRequest(msg) => json_response(400, serde_json::json!({"msg": msg})),
            ApiError::Unauthorized(msg) => json_response(401, serde_json::json!({"msg": msg})),
            ApiError::Forbidden => {
                json_response(403, serde_json::json!({"msg": "User not authorized"}))
            }
            ApiError::NotFound(msg) => json_response(404, serde_json::json!({"msg": msg})),
            // Internals are logged at the dispatch boundary, never sent to clients.
            ApiError::Internal(_) => {
                json_response(500, serde_json::json!({"error": "Internal server error"}))
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_json(resp: &Response) -> serde_json::Value {
        serde_json::from_slice(resp.body()).unwrap()
    }

    #[test]
    fn validation_lists_every_field_message() {
        let resp: Response = ApiError::Validation(vec![
            "Name is required".to_string(),
            "Please include a valid email".to_string(),
        ])
        .into();

        assert_eq!(*resp.status(), 400);
        let body = body_json(&resp);
        assert_eq!(body["errors"][0]["msg"], "Name is required");
        assert_eq!(body["errors"][1]["msg"], "Please include a valid email");
    }

    #[test]
    fn unauthorized_maps_to_401() {
        let resp: Response = ApiError::Unauthorized("No token, authorization denied").into();
        assert_eq!(*resp.status(), 401);
        assert_eq!(body_json(&resp)["msg"], "No token, authorization denied");
    }

    #[test]
    fn internal_error_hides_details() {
        let resp: Response = ApiError::Internal("kv store exploded".to_string()).into();
        assert_eq!(*resp.status(), 500);
        let body = body_json(&resp);
        assert_eq!(body["error"], "Internal server error");
        assert!(!body.to_string().contains("exploded"));
    }

    #[test]
    fn not_found_maps_to_404() {
        let resp: Response = ApiError::NotFound("Post not found".to_string()).into();
        assert_eq!(*resp.status(), 404);
    }
}
