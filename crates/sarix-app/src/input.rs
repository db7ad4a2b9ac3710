// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    Up,
    Down,
    Left,
    Right,
    SoftLeft,
    SoftRight,
    Confirm,
    Menu,
    Back,
    Quit,
    Other(String),
}

impl InputAction {
    /// Keypad identifier to action. Digits double as a d-pad on phones
    /// without one; `Control`/`Alt` stand in for the soft keys on desktop
    /// emulators.
    pub fn from_key(key: &str) -> Self {
        match key {
            "ArrowUp" | "2" => Self::Up,
            "ArrowDown" | "8" => Self::Down,
            "ArrowLeft" | "4" => Self::Left,
            "ArrowRight" | "6" => Self::Right,
            "SoftLeft" | "Control" => Self::SoftLeft,
            "SoftRight" | "Alt" => Self::SoftRight,
            "Enter" | "5" => Self::Confirm,
            "ContextMenu" => Self::Menu,
            "Backspace" | "Escape" => Self::Back,
            "EndCall" => Self::Quit,
            other => Self::Other(other.to_owned()),
        }
    }
}

/// Transient echo of recently pressed keys.
///
/// Each press restarts a single-shot timer identified by the returned token;
/// only the newest token may clear the overlay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyOverlay {
    keys: Vec<String>,
    token: u64,
}

impl KeyOverlay {
    pub fn press(&mut self, key: &str) -> u64 {
        self.keys.push(key.to_owned());
        self.token = self.token.wrapping_add(1);
        self.token
    }

    pub fn expire(&mut self, token: u64) -> bool {
        if token != self.token || self.keys.is_empty() {
            return false;
        }
        self.keys.clear();
        true
    }

    pub fn is_visible(&self) -> bool {
        !self.keys.is_empty()
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }
}
