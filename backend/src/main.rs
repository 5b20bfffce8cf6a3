mod bot;
mod config;
mod error;
mod ingest;
mod job_controller;
mod pipeline;
mod services;
mod store;
mod transport;

use crate::bot::BotContext;
use crate::config::{Config, UpdateMode};
use crate::job_controller::state::JobsState;
use crate::services::webhook::WebhookState;
use crate::store::HttpRecordStore;
use crate::transport::TelegramClient;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::info;
use std::io;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Updates waiting for the event loop before intake blocks.
const UPDATE_QUEUE: usize = 100;
const JOB_QUEUE: usize = 100;

fn startup_error(e: impl std::fmt::Display) -> io::Error {
    io::Error::other(e.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // A missing .env file is fine; the environment may already be set.
    let _ = dotenvy::dotenv();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(startup_error)?;
    info!(
        "Starting in {:?} mode with {} admins",
        config.variant,
        config.admins.len() + config.superadmins.len()
    );

    let telegram = Arc::new(
        TelegramClient::new(
            config.telegram_api_url.as_str(),
            config.bot_token.as_str(),
            config.poll_timeout_secs,
        )
        .map_err(startup_error)?,
    );
    let store =
        Arc::new(HttpRecordStore::new(config.store_url.as_str(), config.store_timeout).map_err(startup_error)?);

    // Initialize job controller state
    let (jobs_state, jobs_rx) = JobsState::new(JOB_QUEUE);
    let updater_state = jobs_state.clone();
    tokio::spawn(async move {
        job_controller::state::start_job_updater(updater_state, jobs_rx).await;
    });

    let (update_tx, update_rx) = mpsc::channel(UPDATE_QUEUE);
    let ctx = BotContext::new(&config, store, telegram.clone(), jobs_state.clone());
    tokio::spawn(bot::run_event_loop(ctx, update_rx));

    let webhook_state = match config.update_mode {
        UpdateMode::Polling => {
            tokio::spawn(transport::polling::run_long_polling(
                telegram.clone(),
                update_tx,
            ));
            None
        }
        UpdateMode::Webhook => {
            let url = config.webhook_url.as_deref().unwrap_or_default();
            telegram
                .set_webhook(url, config.webhook_secret.as_deref())
                .await
                .map_err(startup_error)?;
            Some(WebhookState {
                tx: update_tx,
                secret: config.webhook_secret.clone(),
            })
        }
    };

    let host = config.http_host.clone();
    let port = config.http_port;
    info!("Server running at http://{}:{}", host, port);

    HttpServer::new(move || {
        let webhook_state = webhook_state.clone();
        App::new()
            .app_data(web::Data::new(jobs_state.clone()))
            .service(services::uploads::configure_routes())
            .configure(move |cfg| {
                if let Some(state) = webhook_state {
                    cfg.app_data(web::Data::new(state))
                        .service(services::webhook::configure_routes());
                }
            })
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
