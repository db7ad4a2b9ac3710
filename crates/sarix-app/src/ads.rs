// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};

pub const ADS_UNAVAILABLE_NOTICE: &str = "ads not available";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdRequest {
    pub publisher: String,
    pub app: String,
    pub test: bool,
    pub width: u16,
    pub height: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdEvent {
    Ready,
    Display(String),
    Click,
    Close,
    Error(String),
}

/// A source of banner advertisements.
///
/// Providers report their lifecycle through `sink` instead of return values
/// so SDK-style callbacks map onto it directly. An `Err` from `request` means
/// the provider cannot serve at all.
pub trait AdProvider {
    fn request(&mut self, request: &AdRequest, sink: &mut dyn FnMut(AdEvent)) -> Result<()>;

    fn click(&mut self, _sink: &mut dyn FnMut(AdEvent)) {}
}

/// Serves one fixed creative from configuration. Without text it reports
/// itself unavailable, which leaves the inline notice in the banner slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HouseBanner {
    text: Option<String>,
}

impl HouseBanner {
    pub fn new(text: Option<&str>) -> Self {
        Self {
            text: text
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(str::to_owned),
        }
    }
}

impl AdProvider for HouseBanner {
    fn request(&mut self, request: &AdRequest, sink: &mut dyn FnMut(AdEvent)) -> Result<()> {
        let Some(text) = &self.text else {
            bail!("no house banner configured; set [ads].banner");
        };
        sink(AdEvent::Ready);
        let creative = if request.test {
            format!("[test] {text}")
        } else {
            text.clone()
        };
        sink(AdEvent::Display(creative));
        Ok(())
    }

    fn click(&mut self, sink: &mut dyn FnMut(AdEvent)) {
        sink(AdEvent::Click);
        sink(AdEvent::Close);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BannerState {
    creative: Option<String>,
    notice: Option<String>,
    visible: bool,
    hide_token: u64,
}

impl BannerState {
    /// Applies one provider event. Returns a hide-timer token when the
    /// banner was just shown.
    pub fn apply(&mut self, event: &AdEvent) -> Option<u64> {
        match event {
            AdEvent::Display(creative) => {
                self.creative = Some(creative.clone());
                self.visible = true;
                self.hide_token = self.hide_token.wrapping_add(1);
                Some(self.hide_token)
            }
            AdEvent::Close => {
                self.visible = false;
                None
            }
            AdEvent::Ready | AdEvent::Click | AdEvent::Error(_) => None,
        }
    }

    pub fn expire(&mut self, token: u64) -> bool {
        if token != self.hide_token || !self.visible {
            return false;
        }
        self.visible = false;
        true
    }

    pub fn mark_unavailable(&mut self) {
        self.visible = false;
        self.notice = Some(ADS_UNAVAILABLE_NOTICE.to_owned());
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Text for the banner slot, if anything should be drawn there.
    pub fn text(&self) -> Option<&str> {
        if self.visible {
            return self.creative.as_deref();
        }
        self.notice.as_deref()
    }
}
