//! End-to-end tests against a running deployment.
//!
//! These tests require:
//! 1. PostgreSQL and Redis running
//! 2. API server running (migrations applied on startup)
//! 3. Worker process running (for the screening test)
//! 4. `JWT_SECRET` (and `JWT_AUDIENCE` if the server checks it) matching
//!    the server's configuration
//!
//! Run with: cargo test --test e2e_test -- --ignored --nocapture
//!
//! Set API_BASE_URL to override default (http://localhost:3000)

mod fixtures;
mod helpers;

use chrono::Duration;
use fixtures::*;
use helpers::*;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
#[ignore] // Requires running API server and infrastructure
async fn test_e2e_health_check() {
    let response = reqwest::get(format!("{}/health", base_url()))
        .await
        .expect("Health check failed");

    assert!(
        response.status().is_success(),
        "Health check returned non-success status: {}",
        response.status()
    );

    let body: serde_json::Value = response.json().await.expect("health body");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["checks"]["database"]["status"], "ok");
    assert_eq!(body["checks"]["redis"]["status"], "ok");
}

#[tokio::test]
#[ignore] // Requires running API server and infrastructure
async fn test_e2e_requires_token_and_profile() {
    let response = reqwest::get(format!("{}/api/v1/profiles/me", base_url()))
        .await
        .expect("request failed");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let newcomer = ApiClient::new();
    let (status, _) = newcomer.get("/profiles/me").await.unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = newcomer
        .post("/profiles", &json!({ "role": "admin", "display_name": "Mallory" }))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);

    newcomer.onboard(worker_profile("Noor")).await.unwrap();
    let (status, _) = newcomer.post("/profiles", &worker_profile("Noor")).await.unwrap();
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore] // Requires running API server and infrastructure
async fn test_e2e_shift_fills_and_reopens() {
    let company = ApiClient::new();
    let worker_a = ApiClient::new();
    let worker_b = ApiClient::new();
    company.onboard(company_profile("Harbor Logistics")).await.unwrap();
    worker_a.onboard(worker_profile("Amira")).await.unwrap();
    worker_b.onboard(worker_profile("Bas")).await.unwrap();

    let (status, shift) = company
        .post("/shifts", &shift_request(Duration::days(2), 8, 1))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(shift["status"], "open");
    assert_eq!(shift["remaining_vacancies"], 1);
    let shift_id = id_of(&shift);

    let (status, app_a) = worker_a
        .post(&format!("/shifts/{shift_id}/applications"), &json!({ "message": "Forklift certified" }))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    let (status, app_b) = worker_b
        .post(&format!("/shifts/{shift_id}/applications"), &json!({}))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = worker_a
        .post(&format!("/shifts/{shift_id}/applications"), &json!({}))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CONFLICT, "duplicate application");

    let (status, accepted) = company
        .post(&format!("/applications/{}/decision", id_of(&app_a)), &json!({ "decision": "accept" }))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(accepted["status"], "accepted");

    let (_, shift) = company.get(&format!("/shifts/{shift_id}")).await.unwrap();
    assert_eq!(shift["status"], "filled");
    assert_eq!(shift["remaining_vacancies"], 0);

    let (status, body) = company
        .post(&format!("/applications/{}/decision", id_of(&app_b)), &json!({ "decision": "accept" }))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CONFLICT, "shift is full: {body}");

    let (status, withdrawn) = worker_a
        .post(&format!("/applications/{}/withdraw", id_of(&app_a)), &json!({}))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(withdrawn["status"], "withdrawn");

    let (_, shift) = company.get(&format!("/shifts/{shift_id}")).await.unwrap();
    assert_eq!(shift["status"], "open");

    let (status, _) = company
        .post(&format!("/applications/{}/decision", id_of(&app_b)), &json!({ "decision": "accept" }))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
#[ignore] // Requires running API server and infrastructure
async fn test_e2e_overlapping_acceptance_is_refused() {
    let company = ApiClient::new();
    let worker = ApiClient::new();
    company.onboard(company_profile("Dockside Events")).await.unwrap();
    worker.onboard(worker_profile("Chen")).await.unwrap();

    let (_, morning) = company
        .post("/shifts", &shift_request(Duration::days(3), 6, 2))
        .await
        .unwrap();
    let (_, overlapping) = company
        .post("/shifts", &shift_request(Duration::days(3) + Duration::hours(4), 6, 2))
        .await
        .unwrap();

    let (_, app) = worker
        .post(&format!("/shifts/{}/applications", id_of(&morning)), &json!({}))
        .await
        .unwrap();
    let (status, _) = company
        .post(&format!("/applications/{}/decision", id_of(&app)), &json!({ "decision": "accept" }))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);

    let (status, body) = worker
        .post(&format!("/shifts/{}/applications", id_of(&overlapping)), &json!({}))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CONFLICT, "overlap must be refused: {body}");
}

#[tokio::test]
#[ignore] // Requires running API server and infrastructure
async fn test_e2e_blacklist_rejects_and_blocks() {
    let company = ApiClient::new();
    let worker = ApiClient::new();
    company.onboard(company_profile("Canal Catering")).await.unwrap();
    worker.onboard(worker_profile("Daan")).await.unwrap();

    let (_, shift) = company
        .post("/shifts", &shift_request(Duration::days(4), 5, 3))
        .await
        .unwrap();
    let (_, app) = worker
        .post(&format!("/shifts/{}/applications", id_of(&shift)), &json!({}))
        .await
        .unwrap();

    let (status, tagged) = company
        .put(
            &format!("/relations/{}", worker.user_id),
            &json!({ "kind": "blacklist", "note": "No-show twice" }),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tagged["relation"]["kind"], "blacklist");
    assert_eq!(tagged["rejected_applications"], 1);

    let (_, mine) = worker.get("/applications/mine").await.unwrap();
    let rejected = mine
        .as_array()
        .expect("list")
        .iter()
        .find(|a| a["id"] == app["id"])
        .expect("application listed");
    assert_eq!(rejected["status"], "rejected");

    let (_, other_shift) = company
        .post("/shifts", &shift_request(Duration::days(5), 5, 3))
        .await
        .unwrap();
    let (status, _) = worker
        .post(&format!("/shifts/{}/applications", id_of(&other_shift)), &json!({}))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);

    let status = company
        .delete(&format!("/relations/{}", worker.user_id))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = worker
        .post(&format!("/shifts/{}/applications", id_of(&other_shift)), &json!({}))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
#[ignore] // Requires running API server and infrastructure
async fn test_e2e_cancel_shift_cancels_applications() {
    let company = ApiClient::new();
    let worker = ApiClient::new();
    company.onboard(company_profile("Polder Farms")).await.unwrap();
    worker.onboard(worker_profile("Eva")).await.unwrap();

    let (_, shift) = company
        .post("/shifts", &shift_request(Duration::days(6), 4, 2))
        .await
        .unwrap();
    let shift_id = id_of(&shift);
    worker
        .post(&format!("/shifts/{shift_id}/applications"), &json!({}))
        .await
        .unwrap();

    let (status, body) = company
        .post(&format!("/shifts/{shift_id}/cancel"), &json!({}))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["shift"]["status"], "cancelled");
    assert_eq!(body["cancelled_applications"], 1);

    let (status, _) = company
        .post(&format!("/shifts/{shift_id}/cancel"), &json!({}))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore] // Requires running API server, worker, and storage
async fn test_e2e_verification_wizard() {
    let worker = ApiClient::new();
    worker.onboard(worker_profile("Femke")).await.unwrap();

    let (status, _) = worker
        .submit_verification(b"not an image".to_vec(), selfie_photo())
        .await
        .unwrap();
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let (status, submitted) = worker
        .submit_verification(id_card_photo(), selfie_photo())
        .await
        .unwrap();
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(submitted["status"], "pending");

    let (status, _) = worker
        .submit_verification(id_card_photo(), selfie_photo())
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CONFLICT, "second pending submission");

    let screened = wait_for_screening(&worker, 60).await.unwrap();
    assert_eq!(screened["status"], "pending", "passed screening awaits review");
    assert!(!screened["screened_at"].is_null());

    let (_, me) = worker.get("/profiles/me").await.unwrap();
    assert_eq!(me["verification_status"], "pending");
}

#[tokio::test]
#[ignore] // Requires running API server, worker, and storage
async fn test_e2e_screening_rejects_tiny_photo() {
    let worker = ApiClient::new();
    worker.onboard(worker_profile("Gijs")).await.unwrap();

    let (status, _) = worker
        .submit_verification(tiny_photo(), selfie_photo())
        .await
        .unwrap();
    assert_eq!(status, StatusCode::ACCEPTED);

    let screened = wait_for_screening(&worker, 60).await.unwrap();
    assert_eq!(screened["status"], "rejected");
    assert!(screened["rejection_reason"]
        .as_str()
        .unwrap_or_default()
        .contains("id_card"));

    let (_, me) = worker.get("/profiles/me").await.unwrap();
    assert_eq!(me["verification_status"], "rejected");
}

#[tokio::test]
#[ignore] // Requires running API server and infrastructure
async fn test_e2e_dashboards_follow_role() {
    let company = ApiClient::new();
    let worker = ApiClient::new();
    company.onboard(company_profile("Tulip Hotels")).await.unwrap();
    worker.onboard(worker_profile("Hugo")).await.unwrap();

    company
        .post("/shifts", &shift_request(Duration::days(7), 8, 1))
        .await
        .unwrap();

    let (status, dash) = company.get("/dashboard").await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dash["role"], "company");
    assert_eq!(dash["open_shifts"], 1);
    assert_eq!(dash["paid_payments_cents"], 0);

    let (_, dash) = worker.get("/dashboard").await.unwrap();
    assert_eq!(dash["role"], "worker");
    assert_eq!(dash["verification_status"], "unverified");
    assert_eq!(dash["rating"]["count"], 0);
}

#[tokio::test]
#[ignore] // Requires running API server and infrastructure
async fn test_e2e_concurrent_accepts_respect_vacancies() {
    let company = ApiClient::new();
    company.onboard(company_profile("Rotterdam Port Services")).await.unwrap();

    let (_, shift) = company
        .post("/shifts", &shift_request(Duration::days(8), 6, 2))
        .await
        .unwrap();
    let shift_id = id_of(&shift);

    let mut application_ids = Vec::new();
    for i in 0..5 {
        let worker = ApiClient::new();
        worker.onboard(worker_profile(&format!("Picker {i}"))).await.unwrap();
        let (status, app) = worker
            .post(&format!("/shifts/{shift_id}/applications"), &json!({}))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        application_ids.push(id_of(&app));
    }

    let company = &company;
    let tasks = application_ids.iter().map(|id| async move {
        company
            .post(&format!("/applications/{id}/decision"), &json!({ "decision": "accept" }))
            .await
            .map(|(status, _)| status)
    });
    let results = futures::future::join_all(tasks).await;

    let accepted = results
        .iter()
        .filter(|r| matches!(r, Ok(StatusCode::OK)))
        .count();
    let refused = results
        .iter()
        .filter(|r| matches!(r, Ok(StatusCode::CONFLICT)))
        .count();
    assert_eq!(accepted, 2, "exactly the vacancies are filled: {results:?}");
    assert_eq!(refused, 3);

    let (_, shift) = company.get(&format!("/shifts/{shift_id}")).await.unwrap();
    assert_eq!(shift["status"], "filled");
    assert_eq!(shift["accepted_count"], 2);
}
