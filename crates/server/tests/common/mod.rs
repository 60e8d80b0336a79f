//! Shared harness for integration tests: an in-memory database, the full
//! router, and request helpers.

#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use sapling_core::Role;
use sapling_server::config::ShopConfig;
use sapling_server::db::UserRepository;
use sapling_server::routes;
use sapling_server::services::auth::hash_password;
use sapling_server::state::AppState;

pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
}

/// Build the app over a fresh in-memory database with migrations applied.
pub async fn spawn_app() -> TestApp {
    // One connection, or each pool checkout would see its own empty :memory: db.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("connect in-memory sqlite");

    sqlx::migrate!().run(&pool).await.expect("run migrations");

    let config = ShopConfig {
        database_url: SecretString::from("sqlite::memory:".to_owned()),
        host: "127.0.0.1".parse().expect("host"),
        port: 0,
        jwt_secret: SecretString::from("integration-test-signing-key-0123456789ab".to_owned()),
        image_host: None,
    };

    let state = AppState::new(config, pool.clone());

    TestApp {
        router: routes::router(state),
        pool,
    }
}

impl TestApp {
    /// Send a request and return the raw response.
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router never fails")
    }

    /// GET with an optional session cookie.
    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("GET").uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).expect("request")).await
    }

    /// Send a JSON body with the given method.
    pub async fn send_json(
        &self,
        method: &str,
        path: &str,
        body: &Value,
        cookie: Option<&str>,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(
            builder
                .body(Body::from(body.to_string()))
                .expect("request"),
        )
        .await
    }

    /// Send a multipart form with one `file` field.
    pub async fn send_file(
        &self,
        path: &str,
        file_name: &str,
        content_type: &str,
        bytes: &[u8],
        cookie: Option<&str>,
    ) -> Response<Body> {
        let boundary = "test-boundary-7MA4YWxkTrZu0gW";
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            );
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body)).expect("request")).await
    }

    /// Create an account directly in the store and log it in, returning the
    /// session cookie.
    pub async fn login_as(&self, email: &str, password: &str, role: Role) -> String {
        let hash = hash_password(password).expect("hash password");
        UserRepository::new(&self.pool)
            .create("Test User", &email.parse().expect("email"), &hash, role)
            .await
            .expect("create user");

        let response = self
            .send_json(
                "POST",
                "/auth/login",
                &json!({ "email": email, "password": password }),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        session_cookie_from(&response).expect("login sets the session cookie")
    }

    /// Session cookie for a fresh admin account.
    pub async fn admin_cookie(&self) -> String {
        self.login_as("admin@example.com", "garden shears", Role::Admin)
            .await
    }

    /// Session cookie for a fresh customer account.
    pub async fn customer_cookie(&self) -> String {
        self.login_as("customer@example.com", "watering can", Role::Customer)
            .await
    }

    /// Create a category through the admin API and return its id.
    pub async fn create_category(&self, admin: &str, name: &str) -> i64 {
        let response = self
            .send_json("POST", "/categories", &json!({ "name": name }), Some(admin))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        json_body(response).await["id"].as_i64().expect("category id")
    }

    /// Create a product through the admin API and return its id.
    pub async fn create_product(&self, admin: &str, body: Value) -> i64 {
        let response = self.send_json("POST", "/products", &body, Some(admin)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        json_body(response).await["id"].as_i64().expect("product id")
    }
}

/// Read a response body as JSON.
pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

/// Pull the `auth-token` pair out of a response's Set-Cookie header.
pub fn session_cookie_from(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("auth-token="))
        .and_then(|value| value.split(';').next())
        .map(str::to_owned)
}
