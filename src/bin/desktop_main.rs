//! Desktop demo: the signal with web UI, MQTT, and a keyboard "button".
//!
//! Lamps are logged through `tracing` instead of driven on hardware.
//! Press Enter to request a wait.
//!
//! # Usage
//!
//! ```sh
//! cargo run --bin crossing_desktop --features desktop
//! RUST_LOG=rs_crossing=debug cargo run --bin crossing_desktop --features desktop
//! ```
//!
//! # Configuration
//!
//! Edit the `Config::default()` call in `main()` to customize settings.

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use rs_crossing::hal::LogLamps;
use rs_crossing::services::{
    build_router, run_ticker, MqttHandler, MqttRuntimeConfig, SharedSignalState, WebServerConfig,
};
use rs_crossing::{CommandSource, Config, SignalController};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Central configuration - modify this for your setup
    let config = Config::default();
    // Example of customization:
    // let config = Config::default()
    //     .with_timing(rs_crossing::TimingConfig::default().with_green_ms(12_000))
    //     .with_mqtt(rs_crossing::MqttConfig::default()
    //         .with_host("192.168.1.100")
    //         .with_topic_prefix("city/main-st"))
    //     .with_web(rs_crossing::WebConfig::default().with_port(3000));

    let controller = SignalController::with_timing(LogLamps::new(), config.timing)
        .context("invalid timing configuration")?;

    // =========================================================================
    // SINGLE shared state for every service
    // =========================================================================
    let state = Arc::new(SharedSignalState::new(controller));

    let ticker = tokio::spawn(run_ticker(Arc::clone(&state)));

    if config.web.enabled {
        let web_config = WebServerConfig::from_config(&config.web);
        let router = build_router(Arc::clone(&state), &web_config);
        let listener = tokio::net::TcpListener::bind(web_config.addr)
            .await
            .with_context(|| format!("failed to bind {}", web_config.addr))?;
        tracing::info!("web UI at http://{}", web_config.addr);
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::warn!(error = %e, "web server stopped");
            }
        });
    }

    if config.mqtt.enabled {
        let mqtt_config = MqttRuntimeConfig::from_config(&config.mqtt);
        let handler = MqttHandler::with_shared_state(Arc::clone(&state), mqtt_config);
        tokio::spawn(async move {
            if let Err(e) = handler.run().await {
                tracing::warn!(error = %e, "MQTT handler stopped");
            }
        });
    }

    // Keyboard stands in for the crossing button
    tracing::info!("press Enter to request a wait");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(_line) = lines.next_line().await.context("failed to read stdin")? {
        let outcome = state.request_wait(CommandSource::Button);
        tracing::info!(outcome = outcome.as_str(), "button pressed");
    }

    // Stdin closed; keep the lights running
    if let Err(never) = ticker.await.context("ticker task failed")? {
        match never {}
    }
    Ok(())
}
