mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

fn external_faculty(name: &str) -> Value {
    json!({
        "faculty_type": "external",
        "name": name,
        "institution": "Forest Research Institute",
        "domain_knowledge": ["Silviculture"],
        "courses_handled": [{ "course_name": "Forest Ecology" }]
    })
}

#[tokio::test]
async fn faculty_profile_is_verified_before_approval() -> Result<()> {
    let staff = common::spawn_with_staff().await?;
    let server = &staff.server;

    let (status, body) = server
        .post("/api/faculty/save", &staff.clerk, external_faculty("Dr. Meera Rao"))
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["status"], "pending");
    let id = body["data"]["id"].as_str().unwrap_or_default().to_string();

    // Data entry cannot verify their own entry
    let (status, _) = server
        .post(&format!("/api/faculty/{}/approve", id), &staff.clerk, json!({}))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = server
        .post(&format!("/api/faculty/{}/approve", id), &staff.admin, json!({}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "approved");

    let (_, body) = server.get("/api/faculty?domain=silvi", &staff.clerk).await?;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    let (_, body) = server.get("/api/faculty/stats", &staff.clerk).await?;
    assert_eq!(body["data"]["external"], 1);
    assert_eq!(body["data"]["approved"], 1);
    Ok(())
}

#[tokio::test]
async fn external_faculty_needs_institution() -> Result<()> {
    let staff = common::spawn_with_staff().await?;

    let mut input = external_faculty("Dr. Anil Kumar");
    input["institution"] = Value::Null;
    let (status, body) = staff.server.post("/api/faculty/save", &staff.clerk, input).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    Ok(())
}
