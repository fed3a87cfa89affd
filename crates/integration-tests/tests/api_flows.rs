//! End-to-end flows against a running API server.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`ratestore-cli migrate`)
//! - The API server running (`cargo run -p ratestore-api`) with rate limiting off
//!   (`RATESTORE_RATE_LIMIT=false`)
//! - An administrator created with `ratestore-cli admin create`, exported as
//!   `RATESTORE_ADMIN_EMAIL` / `RATESTORE_ADMIN_PASSWORD`
//!
//! Run with: cargo test -p ratestore-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use ratestore_integration_tests::{
    TEST_PASSWORD, admin_token, api_base_url, register, unique_email,
};

fn client() -> Client {
    Client::new()
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_register_then_login() {
    let client = client();
    let base_url = api_base_url();
    let account = register(&client, "login", json!({})).await;

    let resp = client
        .post(format!("{base_url}/api/auth/login"))
        .json(&json!({"email": account.email, "password": TEST_PASSWORD}))
        .send()
        .await
        .expect("Failed to log in");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to read response");
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["role"], "user");
    assert!(body["user"].get("password").is_none());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_duplicate_email_conflicts() {
    let client = client();
    let base_url = api_base_url();
    let account = register(&client, "dup", json!({})).await;

    let resp = client
        .post(format!("{base_url}/api/auth/register"))
        .json(&json!({
            "name": "Second Account",
            "email": account.email,
            "password": TEST_PASSWORD,
        }))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let body: Value = resp.json().await.expect("Failed to read response");
    assert_eq!(body["error"], "User already exists with this email");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_wrong_password_is_unauthorized() {
    let client = client();
    let account = register(&client, "wrongpw", json!({})).await;

    let resp = client
        .post(format!("{}/api/auth/login", api_base_url()))
        .json(&json!({"email": account.email, "password": "Wr0ng!pass"}))
        .send()
        .await
        .expect("Failed to log in");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_change_password() {
    let client = client();
    let base_url = api_base_url();
    let account = register(&client, "pwchange", json!({})).await;

    let resp = client
        .put(format!("{base_url}/api/auth/password"))
        .bearer_auth(&account.token)
        .json(&json!({"currentPassword": "Wr0ng!pass", "newPassword": "N3w!Passw"}))
        .send()
        .await
        .expect("Failed to change password");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client
        .put(format!("{base_url}/api/auth/password"))
        .bearer_auth(&account.token)
        .json(&json!({"currentPassword": TEST_PASSWORD, "newPassword": "N3w!Passw"}))
        .send()
        .await
        .expect("Failed to change password");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .post(format!("{base_url}/api/auth/login"))
        .json(&json!({"email": account.email, "password": "N3w!Passw"}))
        .send()
        .await
        .expect("Failed to log in");
    assert_eq!(resp.status(), StatusCode::OK);
}

// ============================================================================
// Stores & Ratings
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_rate_store_and_owner_dashboard() {
    let client = client();
    let base_url = api_base_url();

    let owner = register(
        &client,
        "owner",
        json!({
            "role": "store_owner",
            "storeName": "Integration Books",
            "storeEmail": unique_email("store"),
            "storeAddress": "2 Test Lane"
        }),
    )
    .await;
    let rater = register(&client, "rater", json!({})).await;

    // Find the owner's store through the dashboard
    let resp = client
        .get(format!("{base_url}/api/store-owner/dashboard"))
        .bearer_auth(&owner.token)
        .send()
        .await
        .expect("Failed to load dashboard");
    assert_eq!(resp.status(), StatusCode::OK);
    let dashboard: Value = resp.json().await.expect("Failed to read response");
    let store_id = dashboard["store"]["id"].as_i64().expect("store id");
    assert_eq!(dashboard["store"]["average_rating"], "0.0");

    // Rate, then re-rate
    for stars in [2, 5] {
        let resp = client
            .post(format!("{base_url}/api/ratings"))
            .bearer_auth(&rater.token)
            .json(&json!({"storeId": store_id, "rating": stars}))
            .send()
            .await
            .expect("Failed to rate");
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = client
        .get(format!("{base_url}/api/ratings/store/{store_id}"))
        .bearer_auth(&rater.token)
        .send()
        .await
        .expect("Failed to load rating");
    let mine: Value = resp.json().await.expect("Failed to read response");
    assert_eq!(mine["rating"]["rating"], 5);

    let resp = client
        .get(format!("{base_url}/api/store-owner/dashboard"))
        .bearer_auth(&owner.token)
        .send()
        .await
        .expect("Failed to load dashboard");
    let dashboard: Value = resp.json().await.expect("Failed to read response");
    assert_eq!(dashboard["stats"]["totalRatings"], 1);
    assert_eq!(dashboard["stats"]["averageRating"], "5.0");
    assert_eq!(dashboard["ratingDistribution"]["5"], 1);
    assert_eq!(dashboard["ratingDistribution"]["1"], 0);

    let resp = client
        .get(format!("{base_url}/api/store-owner/ratings?page=1&limit=5"))
        .bearer_auth(&owner.token)
        .send()
        .await
        .expect("Failed to list ratings");
    let page: Value = resp.json().await.expect("Failed to read response");
    assert_eq!(page["pagination"]["totalRatings"], 1);
    assert_eq!(page["pagination"]["hasNext"], false);
    assert_eq!(page["ratings"][0]["user_email"], rater.email.as_str());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_rating_out_of_range_and_unknown_store() {
    let client = client();
    let base_url = api_base_url();
    let rater = register(&client, "badrating", json!({})).await;

    let resp = client
        .post(format!("{base_url}/api/ratings"))
        .bearer_auth(&rater.token)
        .json(&json!({"storeId": 1, "rating": 6}))
        .send()
        .await
        .expect("Failed to rate");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .post(format!("{base_url}/api/ratings"))
        .bearer_auth(&rater.token)
        .json(&json!({"storeId": i32::MAX, "rating": 3}))
        .send()
        .await
        .expect("Failed to rate");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_plain_user_cannot_create_store() {
    let client = client();
    let user = register(&client, "nostore", json!({})).await;

    let resp = client
        .post(format!("{}/api/stores", api_base_url()))
        .bearer_auth(&user.token)
        .json(&json!({
            "name": "Not Allowed Shop",
            "email": unique_email("shop"),
            "address": "3 Test Lane"
        }))
        .send()
        .await
        .expect("Failed to create store");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

// ============================================================================
// Admin
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server, database and an administrator"]
async fn test_admin_role_change_takes_effect_immediately() {
    let client = client();
    let base_url = api_base_url();
    let admin = admin_token(&client).await;
    let user = register(&client, "promote", json!({})).await;

    let resp = client
        .get(format!("{base_url}/api/admin/dashboard"))
        .bearer_auth(&user.token)
        .send()
        .await
        .expect("Failed to load dashboard");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = client
        .put(format!("{base_url}/api/admin/users/{}/role", user.id))
        .bearer_auth(&admin)
        .json(&json!({"role": "admin"}))
        .send()
        .await
        .expect("Failed to update role");
    assert_eq!(resp.status(), StatusCode::OK);

    // Same token, new role
    let resp = client
        .get(format!("{base_url}/api/admin/dashboard"))
        .bearer_auth(&user.token)
        .send()
        .await
        .expect("Failed to load dashboard");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running API server, database and an administrator"]
async fn test_admin_user_list_filters_and_paginates() {
    let client = client();
    let admin = admin_token(&client).await;

    let resp = client
        .get(format!(
            "{}/api/admin/users?role=user&sortBy=created_at&sortOrder=desc&page=1&limit=2",
            api_base_url()
        ))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to list users");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to read response");
    let users = body["users"].as_array().expect("users array");
    assert!(users.len() <= 2);
    assert!(users.iter().all(|u| u["role"] == "user"));
    assert_eq!(body["pagination"]["currentPage"], 1);
    assert!(body["pagination"]["totalUsers"].is_i64());
}

#[tokio::test]
#[ignore = "Requires running API server, database and an administrator"]
async fn test_admin_store_creation_checks_owner() {
    let client = client();
    let base_url = api_base_url();
    let admin = admin_token(&client).await;
    let plain = register(&client, "notowner", json!({})).await;

    let resp = client
        .post(format!("{base_url}/api/admin/stores"))
        .bearer_auth(&admin)
        .json(&json!({
            "name": "Admin Made Shop",
            "email": unique_email("adminshop"),
            "address": "4 Test Lane",
            "ownerId": plain.id
        }))
        .send()
        .await
        .expect("Failed to create store");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = resp.json().await.expect("Failed to read response");
    assert_eq!(body["error"], "Selected user is not a store owner");
}

#[tokio::test]
#[ignore = "Requires running API server, database and an administrator"]
async fn test_admin_creates_store_for_owner() {
    let client = client();
    let base_url = api_base_url();
    let admin = admin_token(&client).await;
    let owner = register(&client, "adminowner", json!({"role": "store_owner"})).await;
    let store_email = unique_email("ownedshop");

    // Browsers post the owner <select> value as a string
    let resp = client
        .post(format!("{base_url}/api/admin/stores"))
        .bearer_auth(&admin)
        .json(&json!({
            "name": "Admin Owned Shop",
            "email": store_email,
            "address": "5 Test Lane",
            "ownerId": owner.id.to_string()
        }))
        .send()
        .await
        .expect("Failed to create store");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await.expect("Failed to read response");
    assert_eq!(body["message"], "Store created successfully");
    assert_eq!(body["store"]["owner_id"], owner.id);

    // Same store email again
    let resp = client
        .post(format!("{base_url}/api/admin/stores"))
        .bearer_auth(&admin)
        .json(&json!({
            "name": "Admin Owned Shop",
            "email": store_email,
            "address": "5 Test Lane",
            "ownerId": owner.id
        }))
        .send()
        .await
        .expect("Failed to create store");
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let body: Value = resp.json().await.expect("Failed to read response");
    assert_eq!(body["error"], "Store with this email already exists");

    // The owner's dashboard now shows the store
    let resp = client
        .get(format!("{base_url}/api/store-owner/dashboard"))
        .bearer_auth(&owner.token)
        .send()
        .await
        .expect("Failed to load dashboard");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running API server, database and an administrator"]
async fn test_admin_store_for_unknown_owner() {
    let client = client();
    let admin = admin_token(&client).await;

    let resp = client
        .post(format!("{}/api/admin/stores", api_base_url()))
        .bearer_auth(&admin)
        .json(&json!({
            "name": "Orphan Shop",
            "email": unique_email("orphan"),
            "address": "6 Test Lane",
            "ownerId": i32::MAX.to_string()
        }))
        .send()
        .await
        .expect("Failed to create store");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = resp.json().await.expect("Failed to read response");
    assert_eq!(body["error"], "Owner not found");
}
