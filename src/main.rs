use std::{
    process::ExitCode,
    sync::{Arc, Mutex},
};

use clap::Parser;
use tokio::sync::mpsc::unbounded_channel;

use rxscreen::{
    config::{Config, Opt},
    fetch::HttpFetcher,
    logging,
    orchestration::{MainScreen, ScreenContext, ScreenEvent},
    scheduler::{IoScheduler, Looper},
};

fn main() -> ExitCode {
    // Read command-line arguments
    let opt = Opt::parse();

    // Load configuration with optional override
    let config = Config::load_yaml_with_opt_override(&opt).expect("Failed to load configuration");

    // Initialize logging
    logging::init_logger(&config.log).expect("Failed to initialize logging");

    log::info!("Starting looper...");
    let looper = Looper::spawn(&config.scheduler.looper_name).expect("Failed to start looper");

    log::info!("Starting IO scheduler...");
    let io = IoScheduler::new(config.scheduler.io_threads).expect("Failed to start IO scheduler");

    let fetcher = HttpFetcher::new(&config.fetch).expect("Failed to build HTTP client");

    let context = ScreenContext {
        ui: Arc::new(looper.scheduler()),
        io: Arc::new(io),
        fetcher: Arc::new(fetcher),
        primary_url: config.fetch.primary_url.clone(),
        secondary_url: config.fetch.secondary_url.clone(),
    };

    let (events_tx, mut events_rx) = unbounded_channel();
    let screen = Arc::new(Mutex::new(MainScreen::new(context).with_events(events_tx)));

    log::info!("Creating screen...");
    let host = screen.clone();
    looper
        .post(move || {
            // Failures are reported as ScreenEvent::CreateFailed.
            let _ = host.lock().unwrap_or_else(|e| e.into_inner()).on_create(None);
        })
        .expect("Failed to post screen creation");

    let mut exit = ExitCode::SUCCESS;
    while let Some(event) = events_rx.blocking_recv() {
        match event {
            ScreenEvent::ResultDisplayed(text) => {
                println!("{text}");
            }
            ScreenEvent::CreateFailed(err) => {
                eprintln!("screen creation failed: {err}");
                exit = ExitCode::FAILURE;
                break;
            }
            ScreenEvent::FetchFailed(err) => {
                eprintln!("fetch failed: {err}");
                exit = ExitCode::FAILURE;
                break;
            }
            ScreenEvent::FetchCompleted => break,
        }
    }

    log::info!("Destroying screen...");
    let host = screen.clone();
    if looper
        .post(move || host.lock().unwrap_or_else(|e| e.into_inner()).on_destroy())
        .is_err()
    {
        log::warn!("Looper already stopped");
    }
    looper.quit();

    exit
}
