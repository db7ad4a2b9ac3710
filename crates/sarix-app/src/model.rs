// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const DEFAULT_HOMESERVER: &str = "https://matrix.org";
pub const DEFAULT_TIMELINE_LIMIT: usize = 30;
pub const MESSAGE_EVENT_TYPE: &str = "m.room.message";

const ROOM_FALLBACK_NAME: &str = "Room";
const OWN_MESSAGE_LABEL: &str = "Me";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub base: String,
    pub access_token: Option<String>,
    pub sync_cursor: Option<String>,
    pub user_id: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            base: DEFAULT_HOMESERVER.to_owned(),
            access_token: None,
            sync_cursor: None,
            user_id: None,
        }
    }
}

impl Session {
    pub fn is_logged_in(&self) -> bool {
        self.access_token.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventContent {
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub sender: String,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub content: EventContent,
}

impl Event {
    pub fn is_message(&self) -> bool {
        self.kind == MESSAGE_EVENT_TYPE
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    #[serde(default, deserialize_with = "lenient_events")]
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub summary: Option<RoomSummary>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub canonical_alias: Option<String>,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub timeline: Timeline,
}

// Event content is not validated by homeservers, so a field of the wrong
// shape decodes as absent instead of failing the whole sync batch.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| serde_json::from_value(value).ok()))
}

fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(lenient(deserializer)?.unwrap_or_default())
}

/// Drops timeline entries that are not events (missing `type`, non-string
/// sender, not an object) and keeps the rest in order.
fn lenient_events<'de, D>(deserializer: D) -> Result<Vec<Event>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries: Vec<Value> = lenient(deserializer)?.unwrap_or_default();
    Ok(entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect())
}

/// Joined rooms keyed by room id.
///
/// A sync delta replaces the whole snapshot of every room it mentions and
/// leaves the other rooms alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomMap(BTreeMap<String, Room>);

impl RoomMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, room_id: &str) -> Option<&Room> {
        self.0.get(room_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Room)> {
        self.0.iter().map(|(id, room)| (id.as_str(), room))
    }

    /// Index of `room_id` in iteration order.
    pub fn position(&self, room_id: &str) -> Option<usize> {
        self.0.keys().position(|candidate| candidate == room_id)
    }

    pub fn room_ids(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }

    pub fn insert(&mut self, room_id: impl Into<String>, mut room: Room) {
        let room_id = room_id.into();
        room.room_id.get_or_insert_with(|| room_id.clone());
        self.0.insert(room_id, room);
    }

    pub fn merge(&mut self, delta: RoomMap) {
        for (room_id, room) in delta.0 {
            self.insert(room_id, room);
        }
    }
}

impl FromIterator<(String, Room)> for RoomMap {
    fn from_iter<I: IntoIterator<Item = (String, Room)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (room_id, room) in iter {
            map.insert(room_id, room);
        }
        map
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEntry {
    pub label: String,
    pub body: String,
}

pub fn display_name(room: &Room) -> String {
    if let Some(name) = room.summary.as_ref().and_then(|summary| summary.name.as_deref())
        && !name.is_empty()
    {
        return name.to_owned();
    }
    if let Some(alias) = room.canonical_alias.as_deref()
        && !alias.is_empty()
    {
        return alias.to_owned();
    }
    match room.room_id.as_deref() {
        Some(room_id) if !room_id.is_empty() => room_id
            .split(':')
            .next()
            .unwrap_or(room_id)
            .to_owned(),
        _ => ROOM_FALLBACK_NAME.to_owned(),
    }
}

/// Last `limit` timeline entries of `room`, narrowed to text messages, oldest
/// first. The iterator is cheap to clone, so callers can walk it twice.
pub fn renderable_messages<'a>(
    room: &'a Room,
    own_user_id: Option<&'a str>,
    limit: usize,
) -> impl Iterator<Item = MessageEntry> + Clone + 'a {
    let events = &room.timeline.events;
    let start = events.len().saturating_sub(limit);
    events[start..].iter().filter_map(move |event| {
        if !event.is_message() {
            return None;
        }
        let body = event.content.body.as_deref()?;
        Some(MessageEntry {
            label: sender_label(&event.sender, own_user_id),
            body: body.to_owned(),
        })
    })
}

pub fn sender_label(sender: &str, own_user_id: Option<&str>) -> String {
    if own_user_id == Some(sender) {
        return OWN_MESSAGE_LABEL.to_owned();
    }
    match sender.strip_prefix('@') {
        Some(rest) => rest.split(':').next().unwrap_or(rest).to_owned(),
        None => sender.to_owned(),
    }
}

/// Trimmed homeserver input, or `default` when blank. Trailing slashes are
/// dropped so paths can be appended directly.
pub fn resolve_homeserver(input: &str, default: &str) -> String {
    let trimmed = input.trim();
    let chosen = if trimmed.is_empty() {
        default.trim()
    } else {
        trimmed
    };
    chosen.trim_end_matches('/').to_owned()
}
