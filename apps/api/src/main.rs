mod admin;
mod config;
mod errors;
mod intake;
mod models;
mod notify;
mod routes;
mod state;
mod store;
mod uploads;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::notify::mailer::{MailTransport, NoopMailer, SmtpMailer};
use crate::notify::Notifier;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::ApplicationStore;
use crate::uploads::{UploadArea, MAX_REQUEST_BYTES};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (everything has a default)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let crate_name = env!("CARGO_PKG_NAME").replace('-', "_");
            EnvFilter::new(format!("{crate_name}={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting intake API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the store file location
    tokio::fs::create_dir_all(&config.data_dir).await?;
    let store = ApplicationStore::new(config.store_file());
    info!("Store file: {}", store.path().display());

    // Initialize the upload tree (videos/, documents/, portfolio/, other/)
    let uploads = UploadArea::new(&config.upload_dir);
    uploads.ensure_directories().await?;
    info!("Upload root: {}", config.upload_dir.display());

    // Pick the mail transport: real SMTP only when fully configured
    let transport: Arc<dyn MailTransport> = match config.mail() {
        Some(mail) => {
            info!("SMTP transport configured (host: {})", mail.host);
            Arc::new(SmtpMailer::new(&mail)?)
        }
        None => {
            info!("Email disabled or not fully configured; notifications will be logged only");
            Arc::new(NoopMailer)
        }
    };

    // Start the background notification worker
    let (notifier, _worker) = Notifier::spawn(transport, config.notify_settings());

    let state = AppState {
        store,
        uploads,
        notifier,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()) // TODO: tighten CORS in production
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES));

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
