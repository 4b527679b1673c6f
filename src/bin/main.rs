#[cfg(not(target_arch = "wasm32"))]
mod native {
    extern crate devlink;

    use actix_web::{web, App, HttpServer, HttpRequest, HttpResponse};
    use tracing::info;

    mod adapter {
        use actix_web::HttpRequest;
        use spin_sdk::http::{Method, Request};

        pub fn actix_to_spin_request(
            req: &HttpRequest,
            body: actix_web::web::Bytes,
        ) -> anyhow::Result<Request> {
            let method = match req.method().as_str() {
                "GET" => Method::Get,
                "POST" => Method::Post,
                "PUT" => Method::Put,
                "DELETE" => Method::Delete,
                "HEAD" => Method::Head,
                "OPTIONS" => Method::Options,
                "PATCH" => Method::Patch,
                _ => Method::Get,
            };

            let uri = req.uri().to_string();
            let body_vec = body.to_vec();

            let mut req_builder = Request::builder();
            let method_set = req_builder.method(method);
            let uri_set = method_set.uri(&uri);

            // Copy headers
            let mut with_headers = uri_set;
            for (name, value) in req.headers() {
                if let Ok(val_str) = value.to_str() {
                    with_headers = with_headers.header(name.as_str(), val_str);
                }
            }

            Ok(with_headers.body(body_vec).build())
        }

        pub fn spin_to_actix_response(spin_resp: spin_sdk::http::Response) -> actix_web::HttpResponse {
            let status = *spin_resp.status();
            let body = spin_resp.body().to_vec();

            let mut response = actix_web::HttpResponse::build(
                actix_web::http::StatusCode::from_u16(status)
                    .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR),
            );

            response.body(body)
        }
    }

    pub async fn run() -> std::io::Result<()> {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();

        let port = devlink::config::server_port();
        info!(port, "server listening");

        HttpServer::new(|| App::new().default_service(web::route().to(handle_all)))
            .bind(("0.0.0.0", port))?
            .run()
            .await
    }

    async fn handle_all(req: HttpRequest, body: web::Bytes) -> HttpResponse {
        let path = req.path().to_string();

        // Outbound proxying only exists natively; the Spin component never
        // makes outbound calls.
        if req.method() == actix_web::http::Method::GET {
            if let Some(username) = path.strip_prefix("/api/profile/github/") {
                return github_repos(username).await;
            }
        }

        let spin_req = match adapter::actix_to_spin_request(&req, body) {
            Ok(r) => r,
            Err(_) => {
                return HttpResponse::BadRequest()
                    .json(serde_json::json!({"error": "Invalid request"}))
            }
        };

        adapter::spin_to_actix_response(devlink::dispatch(spin_req))
    }

    /// GET /api/profile/github/{username} — five most recent public repos.
    async fn github_repos(username: &str) -> HttpResponse {
        let uri = format!(
            "https://api.github.com/users/{}/repos?per_page=5&sort=created:asc",
            urlencoding::encode(username)
        );

        let client = reqwest::Client::new();
        let mut request = client.get(&uri).header(reqwest::header::USER_AGENT, "devlink");
        if let Some(token) = devlink::config::github_token() {
            request = request.header(reqwest::header::AUTHORIZATION, format!("token {}", token));
        }

        let not_found =
            || HttpResponse::NotFound().json(serde_json::json!({"msg": "No Github profile found"}));

        match request.send().await {
            Ok(resp) if resp.status().is_success() => match resp.json::<serde_json::Value>().await {
                Ok(repos) => HttpResponse::Ok().json(repos),
                Err(_) => not_found(),
            },
            _ => not_found(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    native::run().await
}

#[cfg(target_arch = "wasm32")]
fn main() {}
