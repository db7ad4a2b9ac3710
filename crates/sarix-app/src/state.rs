// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{DEFAULT_TIMELINE_LIMIT, RoomMap, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    RoomList,
    Chat,
}

impl View {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::RoomList => "rooms",
            Self::Chat => "chat",
        }
    }
}

/// Everything the UI controller owns: the current view plus the session and
/// joined-room snapshot it renders from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub view: View,
    pub active_room: Option<String>,
    pub room_cursor: usize,
    pub session: Session,
    pub rooms: RoomMap,
    pub timeline_limit: usize,
    pub help_visible: bool,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            view: View::RoomList,
            active_room: None,
            room_cursor: 0,
            session: Session::default(),
            rooms: RoomMap::default(),
            timeline_limit: DEFAULT_TIMELINE_LIMIT,
            help_visible: false,
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    ShowLogin,
    ShowRooms,
    OpenRoom(String),
    Back,
    Refresh,
    MoveRoomCursor(isize),
    /// Re-anchors the cursor on this room after the room map changed.
    KeepSelection(Option<String>),
    ToggleHelp,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ViewChanged(View),
    ActiveRoomChanged(Option<String>),
    RoomCursorMoved(usize),
    SyncRequested,
    HelpToggled(bool),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn with_session(session: Session, rooms: RoomMap) -> Self {
        let view = if session.is_logged_in() {
            View::RoomList
        } else {
            View::Login
        };
        Self {
            view,
            session,
            rooms,
            ..Self::default()
        }
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::ShowLogin => {
                self.active_room = None;
                self.set_view(View::Login)
            }
            AppCommand::ShowRooms => {
                self.room_cursor = self.room_cursor.min(self.rooms.len().saturating_sub(1));
                self.set_view(View::RoomList)
            }
            AppCommand::OpenRoom(room_id) => {
                self.active_room = Some(room_id.clone());
                let mut events = self.set_view(View::Chat);
                events.push(AppEvent::ActiveRoomChanged(Some(room_id)));
                events.push(AppEvent::SyncRequested);
                events
            }
            AppCommand::Back => match self.view {
                View::Chat => self.set_view(View::RoomList),
                View::RoomList | View::Login => Vec::new(),
            },
            AppCommand::Refresh => vec![AppEvent::SyncRequested],
            AppCommand::MoveRoomCursor(delta) => {
                if self.rooms.is_empty() {
                    return Vec::new();
                }
                let last = self.rooms.len() - 1;
                let next = self.room_cursor.saturating_add_signed(delta).min(last);
                if next == self.room_cursor {
                    return Vec::new();
                }
                self.room_cursor = next;
                vec![AppEvent::RoomCursorMoved(next)]
            }
            AppCommand::KeepSelection(room_id) => {
                let next = room_id
                    .as_deref()
                    .and_then(|room_id| self.rooms.position(room_id))
                    .unwrap_or_else(|| self.room_cursor.min(self.rooms.len().saturating_sub(1)));
                if next == self.room_cursor {
                    return Vec::new();
                }
                self.room_cursor = next;
                vec![AppEvent::RoomCursorMoved(next)]
            }
            AppCommand::ToggleHelp => {
                self.help_visible = !self.help_visible;
                vec![AppEvent::HelpToggled(self.help_visible)]
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    pub fn selected_room_id(&self) -> Option<String> {
        self.rooms.room_ids().into_iter().nth(self.room_cursor)
    }

    fn set_view(&mut self, view: View) -> Vec<AppEvent> {
        if self.view == view {
            return Vec::new();
        }
        self.view = view;
        vec![AppEvent::ViewChanged(view)]
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::{AppCommand, AppEvent, AppState, View};
    use crate::{Room, RoomMap, Session};

    fn state_with_rooms(ids: &[&str]) -> AppState {
        let rooms = ids
            .iter()
            .map(|id| ((*id).to_owned(), Room::default()))
            .collect::<RoomMap>();
        AppState {
            rooms,
            ..AppState::default()
        }
    }

    #[test]
    fn default_view_is_room_list() {
        assert_eq!(AppState::default().view, View::RoomList);
    }

    #[test]
    fn with_session_picks_login_without_token() {
        let state = AppState::with_session(Session::default(), RoomMap::new());
        assert_eq!(state.view, View::Login);

        let session = Session {
            access_token: Some("tok".to_owned()),
            ..Session::default()
        };
        let state = AppState::with_session(session, RoomMap::new());
        assert_eq!(state.view, View::RoomList);
    }

    #[test]
    fn open_room_enters_chat_and_requests_sync() {
        let mut state = state_with_rooms(&["!a:x"]);

        let events = state.dispatch(AppCommand::OpenRoom("!a:x".to_owned()));
        assert_eq!(state.view, View::Chat);
        assert_eq!(state.active_room.as_deref(), Some("!a:x"));
        assert_eq!(
            events,
            vec![
                AppEvent::ViewChanged(View::Chat),
                AppEvent::ActiveRoomChanged(Some("!a:x".to_owned())),
                AppEvent::SyncRequested,
            ]
        );
    }

    #[test]
    fn back_from_chat_returns_to_room_list_and_is_noop_elsewhere() {
        let mut state = state_with_rooms(&["!a:x"]);
        state.dispatch(AppCommand::OpenRoom("!a:x".to_owned()));

        let events = state.dispatch(AppCommand::Back);
        assert_eq!(state.view, View::RoomList);
        assert_eq!(events, vec![AppEvent::ViewChanged(View::RoomList)]);

        assert!(state.dispatch(AppCommand::Back).is_empty());
        assert_eq!(state.view, View::RoomList);
    }

    #[test]
    fn refresh_only_requests_sync() {
        let mut state = AppState::default();
        let before = state.clone();
        assert_eq!(
            state.dispatch(AppCommand::Refresh),
            vec![AppEvent::SyncRequested]
        );
        assert_eq!(state, before);
    }

    #[test]
    fn room_cursor_clamps_to_room_count() {
        let mut state = state_with_rooms(&["!a:x", "!b:x", "!c:x"]);

        assert!(state.dispatch(AppCommand::MoveRoomCursor(-1)).is_empty());
        state.dispatch(AppCommand::MoveRoomCursor(1));
        state.dispatch(AppCommand::MoveRoomCursor(5));
        assert_eq!(state.room_cursor, 2);
        assert_eq!(state.selected_room_id().as_deref(), Some("!c:x"));
    }

    #[test]
    fn keep_selection_follows_room_when_earlier_ids_arrive() {
        let mut state = state_with_rooms(&["!b:x", "!m:x"]);
        state.dispatch(AppCommand::MoveRoomCursor(1));
        let selected = state.selected_room_id();

        state.rooms.insert("!a:x", Room::default());
        let events = state.dispatch(AppCommand::KeepSelection(selected));
        assert_eq!(events, vec![AppEvent::RoomCursorMoved(2)]);
        assert_eq!(state.selected_room_id().as_deref(), Some("!m:x"));

        assert!(
            state
                .dispatch(AppCommand::KeepSelection(Some("!m:x".to_owned())))
                .is_empty()
        );
    }

    #[test]
    fn keep_selection_clamps_when_room_is_gone() {
        let mut state = state_with_rooms(&["!a:x", "!b:x", "!c:x"]);
        state.room_cursor = 2;
        state.rooms = ["!a:x"]
            .iter()
            .map(|id| ((*id).to_owned(), Room::default()))
            .collect();

        state.dispatch(AppCommand::KeepSelection(Some("!c:x".to_owned())));
        assert_eq!(state.room_cursor, 0);
        assert_eq!(state.selected_room_id().as_deref(), Some("!a:x"));
    }

    #[test]
    fn status_set_and_clear() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::SetStatus("synced".to_owned()));
        assert_eq!(state.status_line.as_deref(), Some("synced"));
        assert_eq!(
            state.dispatch(AppCommand::ClearStatus),
            vec![AppEvent::StatusCleared]
        );
        assert!(state.status_line.is_none());
    }
}
