// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use sarix_app::{
    AdEvent, AppCommand, AppEvent, AppState, BannerState, InputAction, KeyOverlay, RoomMap,
    Session, View, display_name, renderable_messages,
};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);
const LOGOUT_KEY: &str = "0";
const KEY_OVERLAY_MAX_KEYS: usize = 8;
const PASSWORD_MASK: char = '*';

/// Everything the UI needs from the outside world. Implementations must be
/// fail-closed: when a method returns `Err`, the session and rooms it was
/// handed are left exactly as they were.
pub trait AppRuntime {
    fn login(
        &mut self,
        session: &mut Session,
        rooms: &RoomMap,
        homeserver: &str,
        username: &str,
        password: &str,
    ) -> Result<()>;
    fn sync(&mut self, session: &mut Session, rooms: &mut RoomMap) -> Result<()>;
    /// `Ok(false)` means there was nothing to send.
    fn send_message(&mut self, session: &Session, room_id: &str, text: &str) -> Result<bool>;
    fn logout(&mut self, session: &mut Session, rooms: &mut RoomMap) -> Result<()>;
    fn request_ads(&mut self, _sink: &mut dyn FnMut(AdEvent)) -> Result<()> {
        Ok(())
    }
    fn click_ad(&mut self, _sink: &mut dyn FnMut(AdEvent)) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiOptions {
    pub key_overlay: Duration,
    pub banner_display: Duration,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            key_overlay: Duration::from_millis(500),
            banner_display: Duration::from_secs(8),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    KeyOverlayExpired { token: u64 },
    BannerExpired { token: u64 },
    Ad(AdEvent),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum LoginField {
    Homeserver,
    #[default]
    Username,
    Password,
}

impl LoginField {
    const ORDER: [Self; 3] = [Self::Homeserver, Self::Username, Self::Password];

    fn label(self) -> &'static str {
        match self {
            Self::Homeserver => "homeserver",
            Self::Username => "username",
            Self::Password => "password",
        }
    }

    fn index(self) -> usize {
        Self::ORDER
            .iter()
            .position(|field| *field == self)
            .unwrap_or(0)
    }

    fn step(self, delta: isize) -> Self {
        let last = Self::ORDER.len() - 1;
        let next = self.index().saturating_add_signed(delta).min(last);
        Self::ORDER[next]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct LoginForm {
    homeserver: String,
    username: String,
    password: String,
    field: LoginField,
}

impl LoginForm {
    fn field_mut(&mut self) -> &mut String {
        match self.field {
            LoginField::Homeserver => &mut self.homeserver,
            LoginField::Username => &mut self.username,
            LoginField::Password => &mut self.password,
        }
    }

    fn value(&self, field: LoginField) -> String {
        match field {
            LoginField::Homeserver => self.homeserver.clone(),
            LoginField::Username => self.username.clone(),
            LoginField::Password => PASSWORD_MASK
                .to_string()
                .repeat(self.password.chars().count()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ViewData {
    options: UiOptions,
    login: LoginForm,
    composer: String,
    chat_scroll: usize,
    key_overlay: KeyOverlay,
    banner: BannerState,
    status_token: u64,
}

impl ViewData {
    fn new(state: &AppState, options: UiOptions) -> Self {
        Self {
            options,
            login: LoginForm {
                homeserver: state.session.base.clone(),
                ..LoginForm::default()
            },
            ..Self::default()
        }
    }
}

pub fn run_app<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    options: UiOptions,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::new(state, options);
    let (internal_tx, internal_rx) = mpsc::channel();

    request_banner(runtime, &mut view_data, &internal_tx);
    if state.view == View::RoomList {
        run_sync(state, runtime, &mut view_data, &internal_tx);
    }

    let mut result = Ok(());
    loop {
        process_internal_events(state, &mut view_data, &internal_tx, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::KeyOverlayExpired { token } => {
                view_data.key_overlay.expire(token);
            }
            InternalEvent::BannerExpired { token } => {
                view_data.banner.expire(token);
            }
            InternalEvent::Ad(event) => handle_ad_event(view_data, tx, &event),
        }
    }
}

fn handle_ad_event(view_data: &mut ViewData, tx: &Sender<InternalEvent>, event: &AdEvent) {
    match event {
        AdEvent::Error(error) => warn!(%error, "ad provider error"),
        AdEvent::Click => debug!("ad clicked"),
        AdEvent::Ready | AdEvent::Display(_) | AdEvent::Close => debug!(?event, "ad event"),
    }
    if let Some(token) = view_data.banner.apply(event) {
        schedule_internal(
            tx,
            view_data.options.banner_display,
            InternalEvent::BannerExpired { token },
        );
    }
}

fn request_banner<R: AppRuntime>(
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let sender = internal_tx.clone();
    let mut sink = move |event: AdEvent| {
        let _ = sender.send(InternalEvent::Ad(event));
    };
    if let Err(error) = runtime.request_ads(&mut sink) {
        warn!(error = %format!("{error:#}"), "ads unavailable");
        view_data.banner.mark_unavailable();
    }
}

fn click_banner<R: AppRuntime>(
    runtime: &mut R,
    view_data: &ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    if !view_data.banner.is_visible() {
        return;
    }
    let sender = internal_tx.clone();
    runtime.click_ad(&mut move |event: AdEvent| {
        let _ = sender.send(InternalEvent::Ad(event));
    });
}

fn schedule_internal(internal_tx: &Sender<InternalEvent>, delay: Duration, event: InternalEvent) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(delay);
        let _ = sender.send(event);
    });
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    schedule_internal(
        internal_tx,
        STATUS_CLEAR_AFTER,
        InternalEvent::ClearStatus { token },
    );
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

/// Terminal key to the keypad identifier a feature phone would report.
/// Function keys stand in for the soft keys and the call buttons.
pub fn key_identifier(key: KeyEvent) -> Option<String> {
    let identifier = match key.code {
        KeyCode::Char('q') if key.modifiers.contains(KeyModifiers::CONTROL) => "EndCall",
        KeyCode::Char(ch) => return Some(ch.to_string()),
        KeyCode::Up => "ArrowUp",
        KeyCode::Down => "ArrowDown",
        KeyCode::Left => "ArrowLeft",
        KeyCode::Right => "ArrowRight",
        KeyCode::Enter => "Enter",
        KeyCode::Backspace => "Backspace",
        KeyCode::Esc => "Escape",
        KeyCode::F(1) => "SoftLeft",
        KeyCode::F(2) => "SoftRight",
        KeyCode::F(3) => "ContextMenu",
        KeyCode::F(4) => "EndCall",
        _ => return None,
    };
    Some(identifier.to_owned())
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.kind == KeyEventKind::Release {
        return false;
    }
    let Some(identifier) = key_identifier(key) else {
        return false;
    };

    let token = view_data.key_overlay.press(&identifier);
    schedule_internal(
        internal_tx,
        view_data.options.key_overlay,
        InternalEvent::KeyOverlayExpired { token },
    );

    let action = InputAction::from_key(&identifier);
    if action == InputAction::Quit {
        return true;
    }

    if state.help_visible {
        if matches!(action, InputAction::Menu | InputAction::Back) {
            state.dispatch(AppCommand::ToggleHelp);
        }
        return false;
    }

    if consume_text_input(state, view_data, key) {
        return false;
    }

    match state.view {
        View::Login => handle_login_action(state, runtime, view_data, internal_tx, action),
        View::RoomList => handle_room_list_action(state, runtime, view_data, internal_tx, action),
        View::Chat => handle_chat_action(state, runtime, view_data, internal_tx, action),
    }
    false
}

/// Printable characters and Backspace go to the focused text field first.
/// Backspace on an empty field falls through so it can still mean back.
fn consume_text_input(state: &AppState, view_data: &mut ViewData, key: KeyEvent) -> bool {
    let field = match state.view {
        View::Login => view_data.login.field_mut(),
        View::Chat => &mut view_data.composer,
        View::RoomList => return false,
    };
    match key.code {
        KeyCode::Char(ch)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            field.push(ch);
            true
        }
        KeyCode::Backspace => field.pop().is_some(),
        _ => false,
    }
}

fn handle_login_action<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    action: InputAction,
) {
    match action {
        InputAction::Up => view_data.login.field = view_data.login.field.step(-1),
        InputAction::Down => view_data.login.field = view_data.login.field.step(1),
        InputAction::Confirm if view_data.login.field != LoginField::Password => {
            view_data.login.field = view_data.login.field.step(1);
        }
        InputAction::Confirm | InputAction::SoftLeft => {
            submit_login(state, runtime, view_data, internal_tx);
        }
        InputAction::Menu => {
            state.dispatch(AppCommand::ToggleHelp);
        }
        _ => {}
    }
}

fn submit_login<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let form = &view_data.login;
    if form.username.trim().is_empty() || form.password.is_empty() {
        emit_status(
            state,
            view_data,
            internal_tx,
            "enter a username and password first",
        );
        return;
    }

    let outcome = runtime.login(
        &mut state.session,
        &state.rooms,
        &form.homeserver,
        form.username.trim(),
        &form.password,
    );
    match outcome {
        Ok(()) => {
            view_data.login.password.clear();
            let user = state.session.user_id.clone().unwrap_or_default();
            let events = state.dispatch(AppCommand::ShowRooms);
            apply_events(state, runtime, view_data, internal_tx, events);
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("logged in as {user}"),
            );
            run_sync(state, runtime, view_data, internal_tx);
        }
        Err(error) => {
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("login failed: {error:#}"),
            );
        }
    }
}

fn handle_room_list_action<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    action: InputAction,
) {
    let events = match action {
        InputAction::Up => state.dispatch(AppCommand::MoveRoomCursor(-1)),
        InputAction::Down => state.dispatch(AppCommand::MoveRoomCursor(1)),
        InputAction::Confirm | InputAction::Right => match state.selected_room_id() {
            Some(room_id) => state.dispatch(AppCommand::OpenRoom(room_id)),
            None => {
                emit_status(
                    state,
                    view_data,
                    internal_tx,
                    "no rooms yet; press F1 to refresh",
                );
                return;
            }
        },
        InputAction::SoftLeft => state.dispatch(AppCommand::Refresh),
        InputAction::SoftRight => {
            click_banner(runtime, view_data, internal_tx);
            return;
        }
        InputAction::Menu => state.dispatch(AppCommand::ToggleHelp),
        InputAction::Other(key) if key == LOGOUT_KEY => {
            logout(state, runtime, view_data, internal_tx);
            return;
        }
        _ => return,
    };
    apply_events(state, runtime, view_data, internal_tx, events);
}

fn handle_chat_action<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    action: InputAction,
) {
    let events = match action {
        InputAction::Back | InputAction::Left => state.dispatch(AppCommand::Back),
        InputAction::Up => {
            let max = chat_lines(state).len().saturating_sub(1);
            view_data.chat_scroll = view_data.chat_scroll.saturating_add(1).min(max);
            return;
        }
        InputAction::Down => {
            view_data.chat_scroll = view_data.chat_scroll.saturating_sub(1);
            return;
        }
        InputAction::Confirm => {
            send_composer(state, runtime, view_data, internal_tx);
            return;
        }
        InputAction::SoftLeft => state.dispatch(AppCommand::Refresh),
        InputAction::SoftRight => {
            click_banner(runtime, view_data, internal_tx);
            return;
        }
        InputAction::Menu => state.dispatch(AppCommand::ToggleHelp),
        _ => return,
    };
    apply_events(state, runtime, view_data, internal_tx, events);
}

fn send_composer<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(room_id) = state.active_room.clone() else {
        return;
    };
    match runtime.send_message(&state.session, &room_id, &view_data.composer) {
        Ok(true) => {
            view_data.composer.clear();
            view_data.chat_scroll = 0;
            run_sync(state, runtime, view_data, internal_tx);
        }
        Ok(false) => emit_status(state, view_data, internal_tx, "type a message first"),
        Err(error) => emit_status(
            state,
            view_data,
            internal_tx,
            format!("send failed: {error:#}"),
        ),
    }
}

fn logout<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    if let Err(error) = runtime.logout(&mut state.session, &mut state.rooms) {
        emit_status(
            state,
            view_data,
            internal_tx,
            format!("logout failed: {error:#}"),
        );
        return;
    }
    state.room_cursor = 0;
    view_data.composer.clear();
    view_data.login = LoginForm {
        homeserver: state.session.base.clone(),
        ..LoginForm::default()
    };
    let events = state.dispatch(AppCommand::ShowLogin);
    apply_events(state, runtime, view_data, internal_tx, events);
    emit_status(state, view_data, internal_tx, "logged out");
}

fn apply_events<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    events: Vec<AppEvent>,
) {
    for event in events {
        match event {
            AppEvent::SyncRequested => run_sync(state, runtime, view_data, internal_tx),
            AppEvent::ViewChanged(view) => {
                debug!(view = view.label(), "view changed");
                view_data.chat_scroll = 0;
            }
            AppEvent::ActiveRoomChanged(room_id) => debug!(?room_id, "active room changed"),
            AppEvent::RoomCursorMoved(_)
            | AppEvent::HelpToggled(_)
            | AppEvent::StatusUpdated(_)
            | AppEvent::StatusCleared => {}
        }
    }
}

fn run_sync<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    if !state.session.is_logged_in() {
        emit_status(state, view_data, internal_tx, "log in to sync");
        return;
    }
    let selected = state.selected_room_id();
    match runtime.sync(&mut state.session, &mut state.rooms) {
        Ok(()) => {
            state.dispatch(AppCommand::KeepSelection(selected));
        }
        Err(error) => emit_status(
            state,
            view_data,
            internal_tx,
            format!("sync failed: {error:#}"),
        ),
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let banner = view_data.banner.text();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(u16::from(banner.is_some())),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new(header_text(state))
        .block(Block::default().title("sarix").borders(Borders::ALL))
        .style(Style::default().fg(Color::White));
    frame.render_widget(header, layout[0]);

    match state.view {
        View::Login => {
            let body = Paragraph::new(render_login_text(&view_data.login))
                .block(Block::default().title("login").borders(Borders::ALL));
            frame.render_widget(body, layout[1]);
        }
        View::RoomList => {
            let title = format!("rooms ({})", state.rooms.len());
            let body = Paragraph::new(render_room_list_text(state))
                .block(Block::default().title(title).borders(Borders::ALL));
            frame.render_widget(body, layout[1]);
        }
        View::Chat => render_chat(frame, layout[1], state, view_data),
    }

    if let Some(text) = banner {
        let banner_widget = Paragraph::new(text.to_owned()).style(
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        );
        frame.render_widget(banner_widget, layout[2]);
    }

    let status_widget = Paragraph::new(status_text(state))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[3]);

    if view_data.key_overlay.is_visible() {
        let text = key_overlay_text(&view_data.key_overlay);
        let area = corner_rect(&text, frame.area());
        frame.render_widget(Clear, area);
        let overlay = Paragraph::new(text).block(
            Block::default()
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(overlay, area);
    }

    if state.help_visible {
        let area = centered_rect(70, 60, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_chat(frame: &mut ratatui::Frame<'_>, area: Rect, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .split(area);

    let title = state
        .active_room
        .as_deref()
        .and_then(|room_id| state.rooms.get(room_id))
        .map(display_name)
        .unwrap_or_else(|| "chat".to_owned());
    let rows = usize::from(layout[0].height.saturating_sub(2));
    let lines = chat_lines(state);
    let text = chat_window(&lines, view_data.chat_scroll, rows).join("\n");
    let messages = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(messages, layout[0]);

    let composer = Paragraph::new(format!("{}_", view_data.composer))
        .block(Block::default().title("message").borders(Borders::ALL));
    frame.render_widget(composer, layout[1]);
}

fn header_text(state: &AppState) -> String {
    let who = state.session.user_id.as_deref().unwrap_or("not logged in");
    format!("{} | {who} @ {}", state.view.label(), state.session.base)
}

fn render_login_text(form: &LoginForm) -> String {
    LoginField::ORDER
        .iter()
        .map(|field| {
            let marker = if *field == form.field { ">" } else { " " };
            format!("{marker} {}: {}", field.label(), form.value(*field))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_room_list_text(state: &AppState) -> String {
    if state.rooms.is_empty() {
        return "no rooms yet; press F1 to refresh".to_owned();
    }
    state
        .rooms
        .iter()
        .enumerate()
        .map(|(index, (_, room))| {
            let marker = if index == state.room_cursor { ">" } else { " " };
            format!("{marker} {}", display_name(room))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn chat_lines(state: &AppState) -> Vec<String> {
    let Some(room) = state
        .active_room
        .as_deref()
        .and_then(|room_id| state.rooms.get(room_id))
    else {
        return Vec::new();
    };
    renderable_messages(room, state.session.user_id.as_deref(), state.timeline_limit)
        .map(|entry| format!("{}: {}", entry.label, entry.body))
        .collect()
}

/// The `rows` lines ending `scroll` lines above the newest message.
fn chat_window(lines: &[String], scroll: usize, rows: usize) -> &[String] {
    let end = lines.len().saturating_sub(scroll);
    let start = end.saturating_sub(rows);
    &lines[start..end]
}

fn status_text(state: &AppState) -> String {
    if state.help_visible {
        return String::new();
    }
    let hints = match state.view {
        View::Login => "up/down field | enter next | F1 log in | ctrl+q quit",
        View::RoomList => "2/8 move | 5 open | F1 refresh | F3 help | 0 log out",
        View::Chat => "type | enter send | esc back | F1 refresh | F3 help",
    };
    match &state.status_line {
        Some(status) => format!("{status} | {hints}"),
        None => hints.to_owned(),
    }
}

fn key_overlay_text(overlay: &KeyOverlay) -> String {
    let keys = overlay.keys();
    let start = keys.len().saturating_sub(KEY_OVERLAY_MAX_KEYS);
    keys[start..].join(" ")
}

fn help_overlay_text() -> &'static str {
    "keys: arrows or 2/4/6/8 move | enter or 5 select | esc back | ctrl+q or F4 quit\n\
soft keys: F1 refresh / log in | F2 open ad | F3 toggle help\n\
rooms: 0 log out\n\
chat: type to compose | enter send | backspace on empty message goes back | up/down scroll\n\
login: up/down field | enter next field, submit on password"
}

fn corner_rect(text: &str, area: Rect) -> Rect {
    let width = u16::try_from(text.chars().count())
        .unwrap_or(u16::MAX)
        .saturating_add(2)
        .min(area.width);
    Rect {
        x: area.x + area.width - width,
        y: area.y,
        width,
        height: 3.min(area.height),
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
