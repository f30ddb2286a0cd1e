mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn registration_waits_for_admin_approval() -> Result<()> {
    let server = common::spawn_server().await?;
    server
        .bootstrap_user("admin", casfos_assets::auth::roles::Role::Admin, &[])
        .await?;
    let admin = server.login("admin").await?;

    let res = server
        .client
        .post(server.url("/auth/register"))
        .json(&json!({
            "name": "store2",
            "password": common::PASSWORD,
            "role": "storekeeper",
            "access": ["asset"]
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["status"], "pending");
    assert!(body["data"].get("password_hash").is_none());
    let id = body["data"]["id"].as_str().unwrap_or_default().to_string();

    // Pending accounts cannot log in yet
    let res = server
        .client
        .post(server.url("/auth/login"))
        .json(&json!({ "name": "store2", "password": common::PASSWORD }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let (status, _) = server.post(&format!("/api/users/{}/approve", id), &admin, json!({})).await?;
    assert_eq!(status, StatusCode::OK);

    let token = server.login("store2").await?;
    let (status, body) = server.get("/api/auth/whoami", &token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "store2");
    assert_eq!(body["data"]["role"], "storekeeper");
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_unauthorized() -> Result<()> {
    let server = common::spawn_server().await?;
    server
        .bootstrap_user("admin", casfos_assets::auth::roles::Role::Admin, &[])
        .await?;

    let res = server
        .client
        .post(server.url("/auth/login"))
        .json(&json!({ "name": "admin", "password": "not-the-password" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body: Value = res.json().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_bearer_token() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server.client.get(server.url("/api/assets/stock")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let (status, body) = server.get("/api/assets/stock", "not.a.jwt").await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    Ok(())
}

#[tokio::test]
async fn roles_limit_what_staff_can_do() -> Result<()> {
    let staff = common::spawn_with_staff().await?;
    let server = &staff.server;

    // Viewers read but never write
    let (status, _) = server.get("/api/assets/stock", &staff.viewer).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = server
        .post("/api/assets/store", &staff.viewer, common::laptop_purchase(&["V1"]))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    // User administration is admin only
    let (status, _) = server.get("/api/users", &staff.manager).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = server.get("/api/users", &staff.admin).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(5));

    // The keeper holds no faculty grant
    let (status, _) = server.get("/api/faculty", &staff.keeper).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() -> Result<()> {
    let staff = common::spawn_with_staff().await?;
    let server = &staff.server;

    let res = server
        .client
        .post(server.url("/api/assets/store"))
        .bearer_auth(&staff.clerk)
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await?;
    assert_eq!(body["code"], "INVALID_JSON");
    Ok(())
}

async fn user_id(staff: &common::Staff, name: &str) -> Result<String> {
    let (_, body) = staff.server.get("/api/users", &staff.admin).await?;
    let id = body["data"]
        .as_array()
        .and_then(|users| users.iter().find(|u| u["name"] == name))
        .and_then(|u| u["id"].as_str())
        .unwrap_or_default();
    Ok(id.to_string())
}

#[tokio::test]
async fn removed_account_loses_its_session() -> Result<()> {
    let staff = common::spawn_with_staff().await?;
    let server = &staff.server;
    let keeper = user_id(&staff, "keeper").await?;

    let res = server
        .client
        .delete(server.url(&format!("/api/users/{}", keeper)))
        .bearer_auth(&staff.admin)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // the token is still well formed and unexpired
    let (status, body) = server
        .post("/api/assets/store", &staff.keeper, common::laptop_purchase(&["K1"]))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = server.get("/api/assets/purchases", &staff.admin).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn demotion_applies_to_tokens_already_issued() -> Result<()> {
    let staff = common::spawn_with_staff().await?;
    let server = &staff.server;
    let clerk = user_id(&staff, "clerk").await?;

    let res = server
        .client
        .put(server.url(&format!("/api/users/{}/access", clerk)))
        .bearer_auth(&staff.admin)
        .json(&json!({ "role": "viewer", "access": ["asset"] }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let (status, _) = server
        .post("/api/assets/store", &staff.clerk, common::laptop_purchase(&["C1"]))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = server.get("/api/auth/whoami", &staff.clerk).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "viewer");
    Ok(())
}
