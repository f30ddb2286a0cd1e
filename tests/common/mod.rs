#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use casfos_assets::auth::roles::{AccessArea, Role};
use casfos_assets::config::WorkflowConfig;
use casfos_assets::models::RegisterUser;
use casfos_assets::state::AppState;
use casfos_assets::store::MemoryStore;
use reqwest::StatusCode;
use serde_json::{json, Value};

pub const PASSWORD: &str = "casfos123";

/// One server per test: the router runs on the test's own runtime over a fresh in-memory store
pub struct TestServer {
    pub base_url: String,
    pub state: AppState,
    pub client: reqwest::Client,
}

impl TestServer {
    async fn spawn() -> Result<Self> {
        let workflow = WorkflowConfig {
            require_issue_acknowledgement: true,
        };
        let state = AppState::new(Arc::new(MemoryStore::new()), workflow);
        let app = casfos_assets::app(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind test listener")?;
        let base_url = format!("http://{}", listener.local_addr()?);

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let server = Self {
            base_url,
            state,
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Create an approved account directly through the service layer
    pub async fn bootstrap_user(&self, name: &str, role: Role, access: &[AccessArea]) -> Result<()> {
        self.state
            .users
            .create_user(RegisterUser {
                name: name.to_string(),
                password: PASSWORD.to_string(),
                role,
                access: access.to_vec(),
            })
            .await?;
        Ok(())
    }

    pub async fn login(&self, name: &str) -> Result<String> {
        let res = self
            .client
            .post(self.url("/auth/login"))
            .json(&json!({ "name": name, "password": PASSWORD }))
            .send()
            .await?;
        let status = res.status();
        let body: Value = res.json().await?;
        anyhow::ensure!(status == StatusCode::OK, "login for {} failed: {}", name, body);
        body["data"]["token"]
            .as_str()
            .map(str::to_string)
            .context("login response has no token")
    }

    pub async fn get(&self, path: &str, token: &str) -> Result<(StatusCode, Value)> {
        let res = self.client.get(self.url(path)).bearer_auth(token).send().await?;
        Ok((res.status(), res.json().await?))
    }

    pub async fn post(&self, path: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        let res = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        Ok((res.status(), res.json().await?))
    }
}

pub async fn spawn_server() -> Result<TestServer> {
    TestServer::spawn().await
}

/// Server with one approved account per staff role, all logged in
pub struct Staff {
    pub server: TestServer,
    pub admin: String,
    pub manager: String,
    pub keeper: String,
    pub clerk: String,
    pub viewer: String,
}

pub async fn spawn_with_staff() -> Result<Staff> {
    let server = spawn_server().await?;
    let both = [AccessArea::Asset, AccessArea::Faculty];

    server.bootstrap_user("admin", Role::Admin, &[]).await?;
    server.bootstrap_user("manager", Role::AssetManager, &[AccessArea::Asset]).await?;
    server.bootstrap_user("keeper", Role::Storekeeper, &[AccessArea::Asset]).await?;
    server.bootstrap_user("clerk", Role::DataEntry, &both).await?;
    server.bootstrap_user("viewer", Role::Viewer, &[AccessArea::Asset]).await?;

    Ok(Staff {
        admin: server.login("admin").await?,
        manager: server.login("manager").await?,
        keeper: server.login("keeper").await?,
        clerk: server.login("clerk").await?,
        viewer: server.login("viewer").await?,
        server,
    })
}

pub fn laptop_key() -> Value {
    json!({
        "asset_type": "Permanent",
        "asset_category": "IT",
        "item_name": "Laptop",
        "sub_category": "Dell"
    })
}

pub fn laptop_purchase(ids: &[&str]) -> Value {
    json!({
        "asset_type": "Permanent",
        "asset_category": "IT",
        "supplier_name": "Sharma Computers",
        "bill_no": "SC/2024/118",
        "items": [{
            "item_name": "Laptop",
            "sub_category": "Dell",
            "quantity_received": ids.len(),
            "unit_price": "54000.00",
            "item_ids": ids,
        }]
    })
}

/// Merge extra fields into the laptop key, as issue/return/dispose bodies flatten it
pub fn with_laptop_key(extra: Value) -> Value {
    let mut body = laptop_key();
    if let (Some(target), Some(fields)) = (body.as_object_mut(), extra.as_object()) {
        for (k, v) in fields {
            target.insert(k.clone(), v.clone());
        }
    }
    body
}
