// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use sarix_app::{Event, EventContent, Room, RoomSummary, Timeline};
use serde_json::{Value, json};
use std::io::Read;
use std::thread::{self, JoinHandle};
use tiny_http::{Header, Response, Server};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CannedResponse {
    pub status: u16,
    pub body: String,
}

impl CannedResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub authorization: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn json_body(&self) -> Result<Value> {
        serde_json::from_str(&self.body).map_err(|error| anyhow!("decode request body: {error}"))
    }
}

/// A local HTTP server that answers with `responses` in order, one per
/// request, and records what it was sent.
pub struct MockHomeserver {
    base_url: String,
    handle: JoinHandle<Vec<RecordedRequest>>,
}

impl MockHomeserver {
    pub fn start(responses: Vec<CannedResponse>) -> Result<Self> {
        let server =
            Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
        let base_url = format!("http://{}", server.server_addr());

        let handle = thread::spawn(move || {
            let mut recorded = Vec::with_capacity(responses.len());
            for canned in responses {
                let Ok(mut request) = server.recv() else {
                    break;
                };
                let mut body = String::new();
                let _ = request.as_reader().read_to_string(&mut body);
                recorded.push(RecordedRequest {
                    method: request.method().to_string(),
                    url: request.url().to_owned(),
                    authorization: request
                        .headers()
                        .iter()
                        .find(|header| header.field.equiv("Authorization"))
                        .map(|header| header.value.as_str().to_owned()),
                    body,
                });

                let mut response =
                    Response::from_string(canned.body).with_status_code(canned.status);
                if let Ok(header) = Header::from_bytes("Content-Type", "application/json") {
                    response = response.with_header(header);
                }
                let _ = request.respond(response);
            }
            recorded
        });

        Ok(Self { base_url, handle })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Waits for every canned response to be served.
    pub fn finish(self) -> Result<Vec<RecordedRequest>> {
        self.handle
            .join()
            .map_err(|_| anyhow!("mock homeserver thread panicked"))
    }
}

pub fn login_body(access_token: &str, user_id: &str) -> String {
    json!({
        "access_token": access_token,
        "user_id": user_id,
        "device_id": "SARIXTEST",
    })
    .to_string()
}

pub fn matrix_error_body(errcode: &str, error: &str) -> String {
    json!({ "errcode": errcode, "error": error }).to_string()
}

pub fn message_event(sender: &str, body: &str) -> Value {
    json!({
        "type": "m.room.message",
        "sender": sender,
        "content": { "msgtype": "m.text", "body": body },
    })
}

pub fn room_json(name: Option<&str>, events: Vec<Value>) -> Value {
    let mut room = json!({ "timeline": { "events": events, "limited": false } });
    if let Some(name) = name {
        room["summary"] = json!({ "name": name });
    }
    room
}

/// A sync response joining each `(room id, room json)` pair.
pub fn sync_body(next_batch: &str, joined: &[(&str, Value)]) -> String {
    let join: serde_json::Map<String, Value> = joined
        .iter()
        .map(|(room_id, room)| ((*room_id).to_owned(), room.clone()))
        .collect();
    json!({ "next_batch": next_batch, "rooms": { "join": join } }).to_string()
}

pub fn sample_room(room_id: &str, name: Option<&str>, messages: &[(&str, &str)]) -> Room {
    Room {
        room_id: Some(room_id.to_owned()),
        summary: name.map(|name| RoomSummary {
            name: Some(name.to_owned()),
        }),
        canonical_alias: None,
        timeline: Timeline {
            events: messages
                .iter()
                .map(|(sender, body)| Event {
                    kind: "m.room.message".to_owned(),
                    sender: (*sender).to_owned(),
                    content: EventContent {
                        body: Some((*body).to_owned()),
                    },
                })
                .collect(),
        },
    }
}
