mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

fn id_of(body: &Value) -> String {
    body["data"]["id"].as_str().unwrap_or_default().to_string()
}

fn laptop_stock(body: &Value) -> Option<u64> {
    body["data"]
        .as_array()?
        .iter()
        .find(|row| row["item_name"] == "Laptop")
        .and_then(|row| row["in_stock"].as_u64())
}

#[tokio::test]
async fn purchase_issue_return_dispose_round() -> Result<()> {
    let staff = common::spawn_with_staff().await?;
    let server = &staff.server;

    // Purchase entry and approval
    let (status, body) = server
        .post("/api/assets/store", &staff.clerk, common::laptop_purchase(&["L1", "L2", "L3"]))
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["status"], "pending");
    let purchase = id_of(&body);

    let (_, body) = server.get("/api/assets/stock", &staff.viewer).await?;
    assert_eq!(laptop_stock(&body), None);

    let (status, body) = server
        .post(&format!("/api/assets/approve/{}", purchase), &staff.manager, json!({}))
        .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["status"], "approved");

    let (_, body) = server.get("/api/assets/stock", &staff.viewer).await?;
    assert_eq!(laptop_stock(&body), Some(3));

    // Serial IDs are unique across the register
    let (status, body) = server
        .post("/api/assets/store", &staff.clerk, common::laptop_purchase(&["L1"]))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    // Issue to the library needs a receipt before approval
    let issue_body = common::with_laptop_key(json!({
        "location": "Library",
        "quantity": 2,
        "issued_ids": ["L1", "L2"]
    }));
    let (status, body) = server.post("/api/assets/issue", &staff.keeper, issue_body).await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let issue = id_of(&body);

    let (status, _) = server
        .post(&format!("/api/assets/issue/{}/approve", issue), &staff.manager, json!({}))
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = server
        .post(
            &format!("/api/assets/issue/{}/acknowledge", issue),
            &staff.keeper,
            json!({ "receipt_url": "/uploads/receipt-library.pdf" }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["acknowledged"], true);

    let (status, _) = server
        .post(&format!("/api/assets/issue/{}/approve", issue), &staff.manager, json!({}))
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = server
        .get(
            "/api/assets/available-ids?asset_type=Permanent&asset_category=IT&item_name=Laptop&sub_category=Dell",
            &staff.keeper,
        )
        .await?;
    assert_eq!(body["data"]["in_stock"], 1);
    assert_eq!(body["data"]["available_ids"], json!(["L3"]));

    let (_, body) = server.get("/api/assets/issued?location=Library", &staff.viewer).await?;
    assert_eq!(body["data"][0]["quantity"], 2);

    // L2 comes back for servicing, then returns to stock
    let return_body = common::with_laptop_key(json!({
        "location": "Library",
        "quantity": 1,
        "returned_ids": ["L2"],
        "condition": "to_be_serviced"
    }));
    let (status, body) = server.post("/api/assets/return", &staff.keeper, return_body).await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let ret = id_of(&body);

    let (status, _) = server
        .post(&format!("/api/assets/return/{}/approve", ret), &staff.manager, json!({}))
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = server.get("/api/assets/services?service_status=in_service", &staff.viewer).await?;
    let services = body["data"].as_array().cloned().unwrap_or_default();
    assert_eq!(services.len(), 1);
    let service = services[0]["id"].as_str().unwrap_or_default().to_string();

    let (status, body) = server
        .post(
            &format!("/api/assets/service/{}/complete", service),
            &staff.keeper,
            json!({ "service_notes": "Battery replaced" }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["service_status"], "completed");

    let (_, body) = server.get("/api/assets/stock", &staff.viewer).await?;
    assert_eq!(laptop_stock(&body), Some(2));

    // Condemn L3 straight from the store
    let dispose_body = common::with_laptop_key(json!({
        "quantity": 1,
        "item_ids": ["L3"],
        "condemnation_reason": "Motherboard failure"
    }));
    let (status, body) = server.post("/api/assets/dispose", &staff.keeper, dispose_body).await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let disposal = id_of(&body);

    let (status, body) = server
        .post(&format!("/api/assets/dispose/{}/approve", disposal), &staff.admin, json!({}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["disposed_at"].is_string());

    let (_, body) = server.get("/api/assets/summary", &staff.viewer).await?;
    let it = &body["data"][0];
    assert_eq!(it["asset_category"], "IT");
    assert_eq!(it["in_stock"], 1);
    assert_eq!(it["issued"], 1);
    assert_eq!(it["in_service"], 0);
    assert_eq!(it["disposed"], 1);

    let (_, body) = server.get("/api/assets/pending", &staff.viewer).await?;
    assert_eq!(body["data"]["purchases"], 0);
    assert_eq!(body["data"]["issues"], 0);
    Ok(())
}

#[tokio::test]
async fn rejected_purchase_moves_to_rejected_list() -> Result<()> {
    let staff = common::spawn_with_staff().await?;
    let server = &staff.server;

    let (_, body) = server
        .post("/api/assets/store", &staff.clerk, common::laptop_purchase(&["R1"]))
        .await?;
    let purchase = id_of(&body);

    let (status, body) = server
        .post(
            &format!("/api/assets/reject/{}", purchase),
            &staff.manager,
            json!({ "remarks": "Bill does not match delivery" }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["source"], "purchase");

    let (status, _) = server.get(&format!("/api/assets/purchases/{}", purchase), &staff.viewer).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = server.get("/api/assets/rejected?source=purchase", &staff.viewer).await?;
    assert_eq!(body["data"][0]["rejection_remarks"], "Bill does not match delivery");

    // A decided request cannot be decided again
    let (status, _) = server
        .post(&format!("/api/assets/approve/{}", purchase), &staff.manager, json!({}))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The rejected serial can be entered again
    let (status, _) = server
        .post("/api/assets/store", &staff.clerk, common::laptop_purchase(&["R1"]))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    Ok(())
}

#[tokio::test]
async fn approved_purchase_update_adjusts_stock() -> Result<()> {
    let staff = common::spawn_with_staff().await?;
    let server = &staff.server;

    let (_, body) = server
        .post("/api/assets/store", &staff.clerk, common::laptop_purchase(&["U1", "U2"]))
        .await?;
    let purchase = id_of(&body);
    server
        .post(&format!("/api/assets/approve/{}", purchase), &staff.manager, json!({}))
        .await?;

    let (status, body) = server
        .post(
            "/api/assets/update",
            &staff.clerk,
            json!({
                "asset_id": purchase,
                "updated_data": common::laptop_purchase(&["U1", "U2", "U3"])
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let update = id_of(&body);

    let (status, _) = server
        .post(&format!("/api/assets/update/{}/approve", update), &staff.manager, json!({}))
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = server.get("/api/assets/stock", &staff.viewer).await?;
    assert_eq!(laptop_stock(&body), Some(3));

    let (_, body) = server.get(&format!("/api/assets/purchases/{}", purchase), &staff.viewer).await?;
    assert_eq!(body["data"]["items"][0]["quantity_received"], 3);
    Ok(())
}
