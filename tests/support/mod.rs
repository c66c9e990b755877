// Shared mock attendance API used by the integration tests.
#![allow(dead_code)]

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use attendance_kiosk::interface_adapters::clients::AttendanceClient;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

// Issues `<prefix>-1`, `<prefix>-2`, ... on successive token requests.
#[derive(Clone)]
pub struct TokenSequence {
    prefix: String,
    issued: Arc<AtomicUsize>,
}

impl TokenSequence {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            issued: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl Respond for TokenSequence {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        ResponseTemplate::new(200).set_body_json(json!({
            "updatedBatch": { "batch_name": "ignored", "token": format!("{}-{n}", self.prefix) }
        }))
    }
}

pub async fn start_api() -> MockServer {
    MockServer::start().await
}

pub fn client_for(server: &MockServer) -> AttendanceClient {
    AttendanceClient::new(server.uri(), None).expect("client should build")
}

pub fn json_reply(status: u16, body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(body)
}

pub async fn mount_token_sequence(server: &MockServer, prefix: &str) {
    Mock::given(method("PUT"))
        .and(path("/batch/generate"))
        .respond_with(TokenSequence::new(prefix))
        .mount(server)
        .await;
}

pub async fn mount_attendance_view(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/profile/view"))
        .respond_with(json_reply(
            200,
            json!([
                {
                    "userId": "U001",
                    "name": "Asha Rao",
                    "department": "CSE",
                    "attendance": ["2024-10-19"]
                },
                { "userId": "U002", "name": "Bilal Khan", "department": "ECE", "attendance": [] },
                { "userId": "U003", "name": "Chen Li", "department": "CSE", "attendance": [] }
            ]),
        ))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/departments"))
        .respond_with(json_reply(200, json!(["CSE", "ECE"])))
        .mount(server)
        .await;
}

// Number of requests the mock received for the given path.
pub async fn request_count(server: &MockServer, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == request_path)
        .count()
}
