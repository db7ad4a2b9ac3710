// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, Response};
use sarix_app::{Room, RoomMap};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use time::OffsetDateTime;
use tracing::{debug, info};
use url::Url;

/// Sync is polled on demand, so the server should answer immediately.
pub const SYNC_TIMEOUT_MS: &str = "0";

const LOGIN_TYPE_PASSWORD: &str = "m.login.password";
const IDENTIFIER_TYPE_USER: &str = "m.id.user";
const MESSAGE_EVENT_TYPE: &str = "m.room.message";
const MSGTYPE_TEXT: &str = "m.text";

#[derive(Debug, thiserror::Error)]
pub enum MatrixError {
    #[error("homeserver url {url:?} is invalid: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("cannot reach homeserver {base_url} ({source})")]
    Transport {
        base_url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("homeserver rejected login: {0}")]
    Auth(ServerError),
    #[error("homeserver rejected sync: {0}")]
    Sync(ServerError),
    #[error("homeserver rejected message: {0}")]
    Send(ServerError),
    #[error("decode {what} response: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl MatrixError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Auth(error) | Self::Sync(error) | Self::Send(error) => Some(error.status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerError {
    pub status: u16,
    pub errcode: Option<String>,
    pub message: String,
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.errcode {
            Some(errcode) => write!(f, "{} ({errcode}, HTTP {})", self.message, self.status),
            None => write!(f, "{} (HTTP {})", self.message, self.status),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncBatch {
    pub next_batch: String,
    pub joined: RoomMap,
}

/// Client-chosen transaction ids for message sends: the wall clock in
/// milliseconds plus a per-process counter, so two sends in the same
/// millisecond still differ.
#[derive(Debug, Default)]
pub struct TransactionIds {
    counter: u64,
}

impl TransactionIds {
    pub fn next_id(&mut self) -> String {
        self.next_id_at(OffsetDateTime::now_utc())
    }

    pub fn next_id_at(&mut self, now: OffsetDateTime) -> String {
        self.counter = self.counter.wrapping_add(1);
        let millis = now.unix_timestamp_nanos() / 1_000_000;
        format!("{millis}.{}", self.counter)
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    device_name: String,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration, device_name: &str) -> Result<Self, MatrixError> {
        let base_url = base_url.trim().trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            return Err(MatrixError::InvalidUrl {
                url: base_url,
                reason: "must not be empty".to_owned(),
            });
        }
        let parsed = Url::parse(&base_url).map_err(|error| MatrixError::InvalidUrl {
            url: base_url.clone(),
            reason: error.to_string(),
        })?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(MatrixError::InvalidUrl {
                url: base_url,
                reason: "use an http:// or https:// address".to_owned(),
            });
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(MatrixError::Build)?;

        Ok(Self {
            base_url,
            device_name: device_name.to_owned(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn login(&self, username: &str, password: &str) -> Result<Credentials, MatrixError> {
        let url = self.endpoint(&["login"])?;
        let request = LoginRequest {
            kind: LOGIN_TYPE_PASSWORD,
            identifier: UserIdentifier {
                kind: IDENTIFIER_TYPE_USER,
                user: username,
            },
            password,
            initial_device_display_name: &self.device_name,
        };
        debug!(base_url = %self.base_url, user = username, "login");

        let response = self
            .http
            .post(url)
            .json(&request)
            .send()
            .map_err(|error| self.transport_error(error))?;
        let response = check_status(response).map_err(MatrixError::Auth)?;
        let parsed: LoginResponse = response.json().map_err(|source| MatrixError::Decode {
            what: "login",
            source,
        })?;

        info!(user_id = %parsed.user_id, "logged in");
        Ok(Credentials {
            access_token: parsed.access_token,
            user_id: parsed.user_id,
        })
    }

    pub fn sync(&self, access_token: &str, since: Option<&str>) -> Result<SyncBatch, MatrixError> {
        let mut url = self.endpoint(&["sync"])?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("timeout", SYNC_TIMEOUT_MS);
            if let Some(since) = since {
                query.append_pair("since", since);
            }
        }
        debug!(since = since.unwrap_or("-"), "sync");

        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .send()
            .map_err(|error| self.transport_error(error))?;
        let response = check_status(response).map_err(MatrixError::Sync)?;
        let parsed: SyncResponse = response.json().map_err(|source| MatrixError::Decode {
            what: "sync",
            source,
        })?;

        let joined: RoomMap = parsed.rooms.join.into_iter().collect();
        debug!(next_batch = %parsed.next_batch, rooms = joined.len(), "sync complete");
        Ok(SyncBatch {
            next_batch: parsed.next_batch,
            joined,
        })
    }

    /// Sends a plain-text message. Blank text is skipped without touching the
    /// network, reported as `Ok(false)`.
    pub fn send_text(
        &self,
        access_token: &str,
        room_id: &str,
        txn_id: &str,
        text: &str,
    ) -> Result<bool, MatrixError> {
        if text.trim().is_empty() {
            return Ok(false);
        }

        let url = self.endpoint(&["rooms", room_id, "send", MESSAGE_EVENT_TYPE, txn_id])?;
        debug!(room_id, txn_id, "send message");
        let response = self
            .http
            .put(url)
            .bearer_auth(access_token)
            .json(&TextMessage {
                msgtype: MSGTYPE_TEXT,
                body: text,
            })
            .send()
            .map_err(|error| self.transport_error(error))?;
        check_status(response).map_err(MatrixError::Send)?;
        Ok(true)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, MatrixError> {
        let invalid = |reason: &str| MatrixError::InvalidUrl {
            url: self.base_url.clone(),
            reason: reason.to_owned(),
        };
        let mut url = Url::parse(&self.base_url).map_err(|error| invalid(&error.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| invalid("cannot carry a path"))?
            .pop_if_empty()
            .extend(["_matrix", "client", "v3"])
            .extend(segments);
        Ok(url)
    }

    fn transport_error(&self, source: reqwest::Error) -> MatrixError {
        MatrixError::Transport {
            base_url: self.base_url.clone(),
            source,
        }
    }
}

fn check_status(response: Response) -> Result<Response, ServerError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(server_error(status, &body))
}

fn server_error(status: StatusCode, body: &str) -> ServerError {
    if let Ok(parsed) = serde_json::from_str::<MatrixErrorEnvelope>(body)
        && let Some(message) = parsed.error.filter(|message| !message.is_empty())
    {
        return ServerError {
            status: status.as_u16(),
            errcode: parsed.errcode,
            message,
        };
    }

    let message = if !body.is_empty() && body.len() < 100 && !body.contains('{') {
        body.trim().to_owned()
    } else {
        status
            .canonical_reason()
            .unwrap_or("unexpected response")
            .to_owned()
    };
    ServerError {
        status: status.as_u16(),
        errcode: None,
        message,
    }
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    identifier: UserIdentifier<'a>,
    password: &'a str,
    initial_device_display_name: &'a str,
}

#[derive(Debug, Serialize)]
struct UserIdentifier<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    user: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct SyncResponse {
    next_batch: String,
    #[serde(default)]
    rooms: SyncRooms,
}

#[derive(Debug, Default, Deserialize)]
struct SyncRooms {
    #[serde(default)]
    join: BTreeMap<String, Room>,
}

#[derive(Debug, Serialize)]
struct TextMessage<'a> {
    msgtype: &'a str,
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct MatrixErrorEnvelope {
    errcode: Option<String>,
    error: Option<String>,
}
