//! End-to-end WebSocket tests: the identity gate and event delivery.

#![allow(clippy::panic)]

mod common;

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Response;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use job_portal_gateway::auth::Principal;
use job_portal_gateway::domain::{EventBus, Role, UserId};

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn connect_with_query(server: &common::TestServer, token: &str) -> Ws {
    let url = format!("{}?token={token}", server.ws_url());
    let Ok((ws, _)) = connect_async(url).await else {
        panic!("handshake should succeed");
    };
    ws
}

/// Reads frames until the next JSON text message.
async fn next_json(ws: &mut Ws) -> Value {
    loop {
        let Ok(frame) = tokio::time::timeout(Duration::from_secs(5), ws.next()).await else {
            panic!("timed out waiting for a message");
        };
        match frame {
            Some(Ok(Message::Text(text))) => {
                let Ok(value) = serde_json::from_str(text.as_str()) else {
                    panic!("server frames are JSON");
                };
                return value;
            }
            Some(Ok(_)) => {}
            other => panic!("connection ended: {other:?}"),
        }
    }
}

fn rejected_with(result: Result<(Ws, Response), WsError>, status: u16) {
    match result {
        Err(WsError::Http(resp)) => {
            assert_eq!(resp.status().as_u16(), status);
        }
        Err(other) => panic!("unexpected handshake error: {other}"),
        Ok(_) => panic!("handshake should be rejected"),
    }
}

#[tokio::test]
async fn missing_token_is_rejected() {
    let server = common::spawn(true).await;
    rejected_with(connect_async(server.ws_url()).await, 401);
    assert_eq!(bus_connections(&server).await, 0);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let server = common::spawn(true).await;
    let Ok(token) = server.state.tokens.issue_with_ttl(
        Principal::new(UserId::new(1), Role::User),
        "late@example.com",
        chrono::Duration::minutes(-5),
    ) else {
        panic!("token should sign");
    };
    let url = format!("{}?token={token}", server.ws_url());
    rejected_with(connect_async(url).await, 401);
    assert_eq!(bus_connections(&server).await, 0);
}

#[tokio::test]
async fn disabled_realtime_answers_unavailable() {
    let server = common::spawn(false).await;
    let token = server.register("seeker@example.com", "user").await;
    let url = format!("{}?token={token}", server.ws_url());
    rejected_with(connect_async(url).await, 503);
}

#[tokio::test]
async fn ping_gets_pong() {
    let server = common::spawn(true).await;
    let token = server.register("seeker@example.com", "user").await;
    let mut ws = connect_with_query(&server, &token).await;

    let ping = json!({ "id": "p1", "type": "command", "event": "ping" }).to_string();
    let Ok(()) = ws.send(Message::text(ping)).await else {
        panic!("send should succeed");
    };
    let reply = next_json(&mut ws).await;
    assert_eq!(reply.get("event"), Some(&json!("pong")));
    assert_eq!(reply.get("id"), Some(&json!("p1")));
    assert_eq!(
        reply.pointer("/payload/message"),
        Some(&json!("Server is alive"))
    );
}

#[tokio::test]
async fn header_token_is_accepted() {
    let server = common::spawn(true).await;
    let token = server.register("hr@example.com", "hr").await;

    let Ok(mut request) = server.ws_url().into_client_request() else {
        panic!("url should form a request");
    };
    let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) else {
        panic!("token is a valid header value");
    };
    request.headers_mut().insert("authorization", value);
    let Ok((_ws, _)) = connect_async(request).await else {
        panic!("handshake should succeed");
    };
    assert_eq!(bus_connections(&server).await, 1);
}

#[tokio::test]
async fn listeners_receive_application_and_expiry_events() {
    let server = common::spawn(true).await;
    let hr = server.register("hr@example.com", "hr").await;
    let seeker = server.register("seeker@example.com", "user").await;
    let job_id = server.create_job(&hr, "Rust Engineer").await;

    let mut hr_ws = connect_with_query(&server, &hr).await;
    let mut seeker_ws = connect_with_query(&server, &seeker).await;

    assert_eq!(server.apply(&seeker, job_id).await.status(), 201);
    for ws in [&mut hr_ws, &mut seeker_ws] {
        let event = next_json(ws).await;
        assert_eq!(event.get("type"), Some(&json!("event")));
        assert_eq!(event.get("event"), Some(&json!("new-application")));
        assert_eq!(event.pointer("/payload/jobId"), Some(&json!(job_id)));
        assert_eq!(
            event.pointer("/payload/jobTitle"),
            Some(&json!("Rust Engineer"))
        );
    }

    assert_eq!(server.expire(&hr, job_id).await.status(), 200);
    for ws in [&mut hr_ws, &mut seeker_ws] {
        let event = next_json(ws).await;
        assert_eq!(event.get("event"), Some(&json!("job-expired")));
        assert_eq!(event.pointer("/payload/jobId"), Some(&json!(job_id)));
    }
}

#[tokio::test]
async fn rejected_writes_emit_nothing() {
    let server = common::spawn(true).await;
    let hr = server.register("hr@example.com", "hr").await;
    let seeker = server.register("seeker@example.com", "user").await;
    let job_id = server.create_job(&hr, "Ops").await;

    let mut ws = connect_with_query(&server, &hr).await;
    assert_eq!(server.apply(&seeker, job_id).await.status(), 201);
    assert_eq!(server.apply(&seeker, job_id).await.status(), 409);
    assert_eq!(server.expire(&hr, job_id).await.status(), 200);

    let first = next_json(&mut ws).await;
    assert_eq!(first.get("event"), Some(&json!("new-application")));
    let second = next_json(&mut ws).await;
    assert_eq!(second.get("event"), Some(&json!("job-expired")));
}

async fn bus_connections(server: &common::TestServer) -> usize {
    bus(server).connection_count().await
}

fn bus(server: &common::TestServer) -> &EventBus {
    let Some(bus) = &server.state.event_bus else {
        panic!("bus should be enabled");
    };
    bus
}

/// Waits until the bus has no listeners left.
async fn wait_for_empty_bus(server: &common::TestServer) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while bus_connections(server).await > 0 {
        assert!(
            tokio::time::Instant::now() < deadline,
            "listener was never released"
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

/// Connects `token`'s owner and checks it joined both of its groups.
async fn connect_and_check_groups(server: &common::TestServer, token: &str) -> (Ws, Principal) {
    let Ok(principal) = server.state.tokens.verify(token) else {
        panic!("registered token should verify");
    };
    let ws = connect_with_query(server, token).await;
    assert_eq!(bus_connections(server).await, 1);

    let members = bus(server).members_of(&principal.identity_group()).await;
    assert_eq!(members.len(), 1);
    let Some(connection) = members.iter().next().copied() else {
        panic!("identity group should hold the connection");
    };
    assert!(
        bus(server)
            .members_of(principal.role_group())
            .await
            .contains(&connection)
    );
    (ws, principal)
}

async fn assert_groups_empty(server: &common::TestServer, principal: Principal) {
    assert!(bus(server).members_of(&principal.identity_group()).await.is_empty());
    assert!(bus(server).members_of(principal.role_group()).await.is_empty());
}

#[tokio::test]
async fn close_frame_releases_the_listener() {
    let server = common::spawn(true).await;
    let token = server.register("seeker@example.com", "user").await;
    let (mut ws, principal) = connect_and_check_groups(&server, &token).await;

    let Ok(()) = ws.send(Message::Close(None)).await else {
        panic!("close should send");
    };
    wait_for_empty_bus(&server).await;
    assert_groups_empty(&server, principal).await;
}

#[tokio::test]
async fn dropped_socket_releases_the_listener() {
    let server = common::spawn(true).await;
    let token = server.register("hr@example.com", "hr").await;
    let (ws, principal) = connect_and_check_groups(&server, &token).await;

    drop(ws);
    wait_for_empty_bus(&server).await;
    assert_groups_empty(&server, principal).await;
}
