use crate::app::Services;
use crate::config::MediVoiceConfig;
use crate::http::{AppState, HttpOptions};
use crate::metrics::MediVoiceMetrics;
use medivoice_core::{TelegramClient, WebhookNotifier};
use std::sync::Arc;
use tracing::{info, warn};

pub async fn run(config: MediVoiceConfig) -> anyhow::Result<()> {
    info!(
        "Starting {} server v{}",
        config.server.app_name,
        env!("CARGO_PKG_VERSION")
    );
    info!("HTTP: {}", config.server.http_addr);
    info!("Data: {:?}", config.server.data_dir);

    // Fail fast on auth misconfiguration before loading anything heavy.
    let auth_enabled = config.security.auth_enabled;
    let auth_token = config.security.resolved_token();
    if auth_enabled {
        if auth_token.is_none() {
            return Err(anyhow::anyhow!(
                "[security] auth_enabled = true but no token found. \
                 Set MEDIVOICE_AUTH_TOKEN env var or set auth_token in [security] config."
            ));
        }
        info!("Bearer token auth: enabled");
    } else {
        warn!("Auth disabled: MediVoice is open to all connections on {}", config.server.http_addr);
    }
    let addr = config.http_addr()?;

    let services = Services::build(&config, true)?;
    let seeded = services.load_seed(&config)?;
    if seeded > 0 {
        info!("Seeded {} knowledge passages", seeded);
    }

    let webhook = match config.webhook.resolved_url() {
        Some(url) => {
            info!("Appointment webhook: enabled");
            Some(WebhookNotifier::new(url, config.webhook.resolved_key())?)
        }
        None => {
            info!("Appointment webhook: disabled");
            None
        }
    };

    let telegram = match config.telegram.resolved_token() {
        Some(token) => {
            info!("Telegram bot: enabled");
            Some(TelegramClient::new(token)?)
        }
        None => {
            info!("Telegram bot: disabled");
            None
        }
    };

    let http_task = {
        let app_state = AppState {
            storage: services.storage.clone(),
            pipeline: services.pipeline.clone(),
            webhook,
            telegram,
            metrics: Arc::new(MediVoiceMetrics::new()),
            app_name: config.server.app_name.clone(),
            start_time: std::time::Instant::now(),
        };
        let options = HttpOptions {
            auth_enabled,
            auth_token,
            allowed_origins: config.server.allowed_origins.clone(),
        };
        let app = crate::http::create_app(app_state, &options);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Starting HTTP server on {}", addr);
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("HTTP server failed: {}", e);
            }
        })
    };

    info!("{} ready", config.server.app_name);

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, terminating...");

    http_task.abort();

    Ok(())
}
