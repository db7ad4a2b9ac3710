// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result};
use config::Config;
use runtime::{ClientSettings, MatrixRuntime};
use sarix_app::{AppState, HouseBanner};
use sarix_store::Store;
use std::env;
use std::path::PathBuf;
use tracing::info;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `sarix --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let db_path = config.db_path()?;
    if options.print_db_path {
        println!("{}", db_path.display());
        return Ok(());
    }

    let log_path = logging::init(config.log_level())?;

    let store = Store::open(&db_path).with_context(|| {
        format!(
            "open database {} -- if this path is wrong, set [storage].db_path or SARIX_DB_PATH",
            db_path.display()
        )
    })?;
    store.bootstrap()?;

    if options.logout {
        store.clear_session()?;
        info!(db = %db_path.display(), "session cleared from command line");
        println!("logged out; session removed from {}", db_path.display());
        return Ok(());
    }

    let (mut session, rooms) = store.load_session()?;
    if !session.is_logged_in() {
        session.base = config.homeserver();
    }

    let ui_options = config.ui_options()?;
    let settings = ClientSettings {
        default_homeserver: config.homeserver(),
        timeout: config.matrix_timeout()?,
        device_name: config.device_name().to_owned(),
    };
    let mut runtime = MatrixRuntime::new(&store, settings);
    runtime.connect(&session.base).with_context(|| {
        format!(
            "invalid homeserver in {}; fix [matrix].homeserver or run `sarix --logout`",
            options.config_path.display()
        )
    })?;
    if config.ads_enabled() {
        runtime = runtime.with_ads(
            Box::new(HouseBanner::new(config.banner_text())),
            config.ad_request(),
        );
    }
    if options.check_only {
        return Ok(());
    }

    info!(
        log = %log_path.display(),
        db = %db_path.display(),
        logged_in = session.is_logged_in(),
        rooms = rooms.len(),
        "starting"
    );
    let mut state = AppState::with_session(session, rooms);
    state.timeline_limit = config.timeline_limit();
    sarix_tui::run_app(&mut state, &mut runtime, ui_options)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_db_path: bool,
    print_example: bool,
    check_only: bool,
    logout: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_db_path: false,
        print_example: false,
        check_only: false,
        logout: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-path" => {
                options.print_db_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--logout" => {
                options.logout = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("sarix: keypad-first Matrix chat");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-path             Print resolved database path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --check                  Validate config + DB + homeserver URL");
    println!("  --logout                 Forget the stored session and rooms");
    println!("  --help                   Show this help");
    println!();
    println!("keys: arrows or 2/4/6/8 move, enter or 5 select, F1/F2 soft keys,");
    println!("      F3 help, esc back, ctrl+q or F4 quit");
}
