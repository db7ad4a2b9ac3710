// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "SARIX_LOG";
const LOG_FILE_NAME: &str = "sarix.log";

/// Installs the global subscriber. The terminal belongs to the UI, so
/// records are appended to a file in the data directory instead.
pub fn init(configured_level: &str) -> Result<PathBuf> {
    let path = log_path()?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;

    let directive = filter_directive(env::var(LOG_ENV).ok().as_deref(), configured_level);
    let filter = EnvFilter::try_new(&directive).with_context(|| {
        format!("invalid log filter {directive:?}; set {LOG_ENV} or [log].level to a level like \"info\"")
    })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))?;
    Ok(path)
}

pub fn log_path() -> Result<PathBuf> {
    Ok(sarix_store::data_dir()?.join(LOG_FILE_NAME))
}

fn filter_directive(env_value: Option<&str>, configured_level: &str) -> String {
    match env_value.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_owned(),
        _ => configured_level.trim().to_owned(),
    }
}
