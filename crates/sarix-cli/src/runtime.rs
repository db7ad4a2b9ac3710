// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use sarix_app::{AdEvent, AdProvider, AdRequest, RoomMap, Session, resolve_homeserver};
use sarix_matrix::{Client, TransactionIds};
use sarix_store::Store;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub default_homeserver: String,
    pub timeout: Duration,
    pub device_name: String,
}

pub struct MatrixRuntime<'a> {
    store: &'a Store,
    settings: ClientSettings,
    client: Option<Client>,
    txn_ids: TransactionIds,
    ads: Option<(Box<dyn AdProvider>, AdRequest)>,
}

impl<'a> MatrixRuntime<'a> {
    pub fn new(store: &'a Store, settings: ClientSettings) -> Self {
        Self {
            store,
            settings,
            client: None,
            txn_ids: TransactionIds::default(),
            ads: None,
        }
    }

    pub fn with_ads(mut self, provider: Box<dyn AdProvider>, request: AdRequest) -> Self {
        self.ads = Some((provider, request));
        self
    }

    /// Builds the client for `base` up front so bad homeserver URLs surface
    /// before the UI starts.
    pub fn connect(&mut self, base: &str) -> Result<()> {
        connect(&mut self.client, base, &self.settings)?;
        Ok(())
    }
}

fn connect<'c>(
    slot: &'c mut Option<Client>,
    base: &str,
    settings: &ClientSettings,
) -> Result<&'c Client> {
    let base = base.trim().trim_end_matches('/');
    let reusable = slot
        .as_ref()
        .is_some_and(|client| client.base_url() == base);
    if !reusable {
        let client = Client::new(base, settings.timeout, &settings.device_name).with_context(
            || format!("connect to homeserver {base}; check [matrix].homeserver or the login form"),
        )?;
        *slot = Some(client);
    }
    slot.as_ref()
        .ok_or_else(|| anyhow!("homeserver client for {base} is unavailable"))
}

impl sarix_tui::AppRuntime for MatrixRuntime<'_> {
    fn login(
        &mut self,
        session: &mut Session,
        rooms: &RoomMap,
        homeserver: &str,
        username: &str,
        password: &str,
    ) -> Result<()> {
        let base = resolve_homeserver(homeserver, &self.settings.default_homeserver);
        let client = connect(&mut self.client, &base, &self.settings)?;
        let credentials = client.login(username, password)?;

        let updated = Session {
            base: client.base_url().to_owned(),
            access_token: Some(credentials.access_token),
            sync_cursor: None,
            user_id: Some(credentials.user_id),
        };
        self.store
            .save_session(&updated, rooms)
            .context("save session after login")?;
        *session = updated;
        Ok(())
    }

    fn sync(&mut self, session: &mut Session, rooms: &mut RoomMap) -> Result<()> {
        let Some(access_token) = session.access_token.as_deref() else {
            bail!("not logged in; log in before syncing");
        };
        let client = connect(&mut self.client, &session.base, &self.settings)?;
        let batch = client.sync(access_token, session.sync_cursor.as_deref())?;

        let mut merged = rooms.clone();
        merged.merge(batch.joined);
        let updated = Session {
            sync_cursor: Some(batch.next_batch),
            ..session.clone()
        };
        self.store
            .save_session(&updated, &merged)
            .context("save sync result")?;
        *session = updated;
        *rooms = merged;
        Ok(())
    }

    fn send_message(&mut self, session: &Session, room_id: &str, text: &str) -> Result<bool> {
        let Some(access_token) = session.access_token.as_deref() else {
            bail!("not logged in; log in before sending");
        };
        let client = connect(&mut self.client, &session.base, &self.settings)?;
        let txn_id = self.txn_ids.next_id();
        let sent = client.send_text(access_token, room_id, &txn_id, text)?;
        if sent {
            info!(room_id, txn_id, "message sent");
        }
        Ok(sent)
    }

    fn logout(&mut self, session: &mut Session, rooms: &mut RoomMap) -> Result<()> {
        self.store.clear_session().context("clear stored session")?;
        *session = Session {
            base: session.base.clone(),
            ..Session::default()
        };
        *rooms = RoomMap::new();
        self.client = None;
        info!("logged out");
        Ok(())
    }

    fn request_ads(&mut self, sink: &mut dyn FnMut(AdEvent)) -> Result<()> {
        match &mut self.ads {
            Some((provider, request)) => provider.request(request, sink),
            None => Ok(()),
        }
    }

    fn click_ad(&mut self, sink: &mut dyn FnMut(AdEvent)) {
        if let Some((provider, _)) = &mut self.ads {
            provider.click(sink);
        }
    }
}
