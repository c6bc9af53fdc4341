//! Shared harness: an in-process gateway over the memory store.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use job_portal_gateway::app_state::AppState;
use job_portal_gateway::auth::{PasswordService, TokenService};
use job_portal_gateway::config::PortalConfig;
use job_portal_gateway::domain::EventBus;
use job_portal_gateway::persistence::MemoryStore;
use job_portal_gateway::server::build_app;
use job_portal_gateway::storage::MemoryStorage;
use serde_json::{Value, json};

pub struct TestServer {
    pub addr: SocketAddr,
    pub state: AppState,
    pub client: reqwest::Client,
}

pub async fn spawn(realtime: bool) -> TestServer {
    let Ok(config) = PortalConfig::from_lookup(|key| match key {
        "REALTIME_ENABLED" => Some(realtime.to_string()),
        "JWT_SECRET" => Some("integration-secret".to_string()),
        _ => None,
    }) else {
        panic!("config should load");
    };

    let state = AppState::new(
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryStorage::new()),
        1024,
        Arc::new(TokenService::new(&config.token_config())),
        PasswordService::fast(),
        realtime.then(|| EventBus::new(config.event_bus_capacity)),
    );
    let app = build_app(state.clone(), &config);

    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind should succeed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("listener should have an address");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    TestServer {
        addr,
        state,
        client: reqwest::Client::new(),
    }
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    /// Registers an account and returns its token.
    pub async fn register(&self, email: &str, role: &str) -> String {
        let body = json!({
            "name": email,
            "email": email,
            "password": "correct horse",
            "role": role,
        });
        let Ok(resp) = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&body)
            .send()
            .await
        else {
            panic!("register request failed");
        };
        assert_eq!(resp.status(), 201);
        let Ok(json) = resp.json::<Value>().await else {
            panic!("register response should be JSON");
        };
        let Some(token) = json.pointer("/data/token").and_then(Value::as_str) else {
            panic!("register response should carry a token: {json}");
        };
        token.to_string()
    }

    /// Posts a job as `token` and returns its id.
    pub async fn create_job(&self, token: &str, title: &str) -> i64 {
        let body = json!({
            "title": title,
            "description": "Build things",
            "salary": "100k",
            "location": "Remote",
        });
        let Ok(resp) = self
            .client
            .post(self.url("/api/jobs"))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
        else {
            panic!("create job request failed");
        };
        assert_eq!(resp.status(), 201);
        let Ok(json) = resp.json::<Value>().await else {
            panic!("create job response should be JSON");
        };
        let Some(id) = json.pointer("/data/id").and_then(Value::as_i64) else {
            panic!("created job should have an id: {json}");
        };
        id
    }

    pub async fn expire(&self, token: &str, job_id: i64) -> reqwest::Response {
        let Ok(resp) = self
            .client
            .patch(self.url(&format!("/api/jobs/{job_id}/expire")))
            .bearer_auth(token)
            .send()
            .await
        else {
            panic!("expire request failed");
        };
        resp
    }

    pub async fn apply(&self, token: &str, job_id: i64) -> reqwest::Response {
        let Ok(resp) = self
            .client
            .post(self.url(&format!("/api/jobs/{job_id}/apply")))
            .bearer_auth(token)
            .send()
            .await
        else {
            panic!("apply request failed");
        };
        resp
    }

    /// Sends a multipart upload of `(field, filename, contents)` parts.
    pub async fn upload(
        &self,
        token: &str,
        job_id: Option<i64>,
        files: &[(&str, &str, &[u8])],
    ) -> reqwest::Response {
        let mut form = reqwest::multipart::Form::new();
        if let Some(id) = job_id {
            form = form.text("jobId", id.to_string());
        }
        for (field, filename, contents) in files {
            let part = reqwest::multipart::Part::bytes(contents.to_vec())
                .file_name((*filename).to_string());
            form = form.part((*field).to_string(), part);
        }
        let Ok(resp) = self
            .client
            .post(self.url("/api/resumes/upload"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
        else {
            panic!("upload request failed");
        };
        resp
    }

    /// Sends an authenticated GET.
    pub async fn get(&self, token: &str, path: &str) -> reqwest::Response {
        let Ok(resp) = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
        else {
            panic!("GET {path} failed");
        };
        resp
    }
}
