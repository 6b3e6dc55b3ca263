//! HTTP helpers for end-to-end tests against a running server.

#![allow(dead_code)]

use reqwest::{multipart, Method, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;
use uuid::Uuid;

use staffer::services::auth::TokenVerifier;

/// Base URL of the API under test. Override with `API_BASE_URL`.
pub fn base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Mint an access token the server accepts, using the shared `JWT_SECRET`.
pub fn mint_token(user_id: Uuid) -> String {
    let secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set for e2e tests");
    let audience = std::env::var("JWT_AUDIENCE").ok();
    TokenVerifier::new(&secret, audience.as_deref())
        .expect("token verifier")
        .issue(user_id, Some(&format!("{user_id}@example.test")), 3600)
        .expect("issue token")
}

/// One authenticated user of the API.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    pub user_id: Uuid,
    token: String,
}

impl ApiClient {
    pub fn new() -> Self {
        let user_id = Uuid::new_v4();
        Self {
            client: reqwest::Client::new(),
            base_url: base_url(),
            user_id,
            token: mint_token(user_id),
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<(StatusCode, Value), Box<dyn std::error::Error>> {
        let mut request = self
            .client
            .request(method, format!("{}/api/v1{}", self.base_url, path))
            .bearer_auth(&self.token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let value = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text)?
        };
        Ok((status, value))
    }

    pub async fn get(&self, path: &str) -> Result<(StatusCode, Value), Box<dyn std::error::Error>> {
        self.send(Method::GET, path, None).await
    }

    pub async fn post(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<(StatusCode, Value), Box<dyn std::error::Error>> {
        self.send(Method::POST, path, Some(body)).await
    }

    pub async fn patch(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<(StatusCode, Value), Box<dyn std::error::Error>> {
        self.send(Method::PATCH, path, Some(body)).await
    }

    pub async fn put(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<(StatusCode, Value), Box<dyn std::error::Error>> {
        self.send(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<StatusCode, Box<dyn std::error::Error>> {
        Ok(self.send(Method::DELETE, path, None).await?.0)
    }

    /// Submit the verification wizard with the given photos.
    pub async fn submit_verification(
        &self,
        id_card: Vec<u8>,
        selfie: Vec<u8>,
    ) -> Result<(StatusCode, Value), Box<dyn std::error::Error>> {
        let form = multipart::Form::new()
            .part("id_card", multipart::Part::bytes(id_card).file_name("id_card.png"))
            .part("selfie", multipart::Part::bytes(selfie).file_name("selfie.jpg"));

        let response = self
            .client
            .post(format!("{}/api/v1/verification", self.base_url))
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        Ok((status, response.json().await?))
    }

    /// Create the caller's profile and return it.
    pub async fn onboard(&self, profile: Value) -> Result<Value, Box<dyn std::error::Error>> {
        let (status, body) = self.post("/profiles", &profile).await?;
        if status != StatusCode::CREATED {
            return Err(format!("Onboarding failed with {status}: {body}").into());
        }
        Ok(body)
    }
}

/// Poll the caller's verification until the background worker screens it
/// or decides it.
pub async fn wait_for_screening(
    client: &ApiClient,
    timeout_secs: u64,
) -> Result<Value, Box<dyn std::error::Error>> {
    let max_attempts = timeout_secs * 2;

    for _ in 0..max_attempts {
        let (status, body) = client.get("/verification").await?;
        if status != StatusCode::OK {
            return Err(format!("Status check failed with {status}: {body}").into());
        }
        if !body["screened_at"].is_null() || body["status"] != "pending" {
            return Ok(body);
        }
        sleep(Duration::from_millis(500)).await;
    }

    Err(format!("Submission was not screened within {timeout_secs} seconds").into())
}

/// Pull the `id` field out of a response body.
pub fn id_of(body: &Value) -> Uuid {
    body["id"]
        .as_str()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| panic!("response has no id: {body}"))
}
