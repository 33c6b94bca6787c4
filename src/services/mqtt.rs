//! MQTT client handler for the signal controller.
//!
//! Subscribes to the wait topic and publishes indicator changes:
//!
//! **Subscribe Topics:**
//! - `crossing/wait` - Request a wait (any payload)
//!
//! **Publish Topics:**
//! - `crossing/indicator/<name>` - `on`/`off`, or the button color (retained)
//! - `crossing/phase` - Active phase name (retained)
//! - `crossing/wait/result` - `accepted` or `ignored_not_vehicle_green`
//! - `crossing/state` - Full state JSON (on change + heartbeat)
//!
//! # Shared State
//!
//! The handler never ticks the controller. It shares state with the ticker
//! and the web server and polls for changes:
//!
//! ```ignore
//! let state = Arc::new(SharedSignalState::new(controller));
//! let handler = MqttHandler::with_shared_state(Arc::clone(&state), mqtt_config);
//! tokio::spawn(handler.run());
//! ```

use std::sync::Arc;
use std::time::Duration;

use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use tokio::sync::mpsc;

use crate::config::MqttConfig as SharedMqttConfig;
use crate::traits::IndicatorOutput;
use crate::{CommandOutcome, CommandSource, SignalController};

use super::api::StateResponse;
use super::shared::{ChangeSet, SharedSignalState};

// ============================================================================
// Configuration
// ============================================================================

/// Runtime MQTT client configuration for `rumqttc`.
///
/// This struct uses `String` for runtime compatibility with the `rumqttc` library.
/// For embedded/no-alloc contexts, use [`crate::config::MqttConfig`] which uses
/// fixed-size `ShortString` types and convert with [`MqttRuntimeConfig::from_config`].
#[derive(Debug, Clone)]
pub struct MqttRuntimeConfig {
    /// MQTT broker hostname
    pub host: String,
    /// MQTT broker port
    pub port: u16,
    /// Client ID
    pub client_id: String,
    /// Topic prefix (default: "crossing")
    pub topic_prefix: String,
    /// Username and password, if the broker requires them
    pub credentials: Option<(String, String)>,
    /// Heartbeat interval in milliseconds
    pub heartbeat_ms: u64,
    /// Change polling interval in milliseconds
    pub change_poll_ms: u64,
    /// Keep-alive interval in seconds
    pub keep_alive_secs: u16,
}

impl Default for MqttRuntimeConfig {
    fn default() -> Self {
        Self::from_config(&SharedMqttConfig::default())
    }
}

impl MqttRuntimeConfig {
    /// Create a new config with the given broker address
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Create from shared MqttConfig
    pub fn from_config(config: &SharedMqttConfig) -> Self {
        Self {
            host: config.host.as_str().to_string(),
            port: config.port,
            client_id: config.client_id.as_str().to_string(),
            topic_prefix: config.topic_prefix.as_str().to_string(),
            credentials: config.has_auth().then(|| {
                (
                    config.username.as_str().to_string(),
                    config.password.as_str().to_string(),
                )
            }),
            heartbeat_ms: u64::from(config.heartbeat_ms),
            change_poll_ms: u64::from(config.change_poll_ms),
            keep_alive_secs: config.keep_alive_secs,
        }
    }

    /// Set the client ID
    pub fn client_id(mut self, id: impl Into<String>) -> Self {
        self.client_id = id.into();
        self
    }

    /// Set the topic prefix
    pub fn topic_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.topic_prefix = prefix.into();
        self
    }

    /// Set the heartbeat interval
    pub fn heartbeat_ms(mut self, ms: u64) -> Self {
        self.heartbeat_ms = ms;
        self
    }

    fn topic(&self, suffix: &str) -> String {
        format!("{}/{}", self.topic_prefix, suffix)
    }
}

// ============================================================================
// Outbound Messages
// ============================================================================

/// Something the publisher task has to send.
#[derive(Debug, Clone)]
pub enum Outbound {
    /// Phase and indicator changes found by change detection.
    Changed(ChangeSet),
    /// Periodic full state.
    Heartbeat(StateResponse),
    /// Outcome of a wait request received over MQTT.
    WaitResult(CommandOutcome),
}

/// One MQTT publish, independent of the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    /// Full topic
    pub topic: String,
    /// Payload bytes
    pub payload: Vec<u8>,
    /// Retain flag
    pub retain: bool,
}

impl Outbound {
    /// Expand into the publishes it stands for.
    pub fn publications(&self, config: &MqttRuntimeConfig) -> Vec<Publication> {
        match self {
            Outbound::Changed(changes) => {
                let mut out: Vec<Publication> = changes
                    .indicators
                    .iter()
                    .map(|change| Publication {
                        topic: config.topic(&format!("indicator/{}", change.indicator.as_str())),
                        payload: change.value.as_str().as_bytes().to_vec(),
                        retain: true,
                    })
                    .collect();

                if let Some(phase) = changes.phase {
                    out.push(Publication {
                        topic: config.topic("phase"),
                        payload: phase.as_str().as_bytes().to_vec(),
                        retain: true,
                    });
                }

                out.push(state_publication(config, &StateResponse::from(&changes.state)));
                out
            }
            Outbound::Heartbeat(state) => vec![state_publication(config, state)],
            Outbound::WaitResult(outcome) => vec![Publication {
                topic: config.topic("wait/result"),
                payload: outcome.as_str().as_bytes().to_vec(),
                retain: false,
            }],
        }
    }
}

fn state_publication(config: &MqttRuntimeConfig, state: &StateResponse) -> Publication {
    Publication {
        topic: config.topic("state"),
        payload: serde_json::to_vec(state).unwrap_or_default(),
        retain: false,
    }
}

// ============================================================================
// MQTT Handler
// ============================================================================

/// MQTT handler that bridges MQTT messages to the signal controller
pub struct MqttHandler<O: IndicatorOutput + Send + 'static> {
    state: Arc<SharedSignalState<O>>,
    config: MqttRuntimeConfig,
}

impl<O: IndicatorOutput + Send + 'static> MqttHandler<O> {
    /// Create a new MQTT handler with its own state.
    ///
    /// Nothing ticks a controller owned only by the handler; use
    /// `with_shared_state()` alongside `run_ticker` for a live signal.
    pub fn new(controller: SignalController<O>, config: MqttRuntimeConfig) -> Self {
        Self {
            state: Arc::new(SharedSignalState::new(controller)),
            config,
        }
    }

    /// Create a new MQTT handler with shared state.
    pub fn with_shared_state(state: Arc<SharedSignalState<O>>, config: MqttRuntimeConfig) -> Self {
        Self { state, config }
    }

    /// Get a reference to the shared state.
    pub fn state(&self) -> Arc<SharedSignalState<O>> {
        Arc::clone(&self.state)
    }

    /// Run the MQTT handler
    ///
    /// This function blocks and handles MQTT messages until shutdown.
    pub async fn run(self) -> Result<(), MqttError> {
        let mut options =
            MqttOptions::new(&self.config.client_id, &self.config.host, self.config.port);
        options.set_keep_alive(Duration::from_secs(u64::from(self.config.keep_alive_secs)));
        if let Some((username, password)) = &self.config.credentials {
            options.set_credentials(username, password);
        }

        let (client, mut eventloop) = AsyncClient::new(options, 10);

        let wait_topic = self.config.topic("wait");
        client.subscribe(&wait_topic, QoS::AtLeastOnce).await?;

        tracing::info!(
            host = %self.config.host,
            port = self.config.port,
            topic = %wait_topic,
            "MQTT connected"
        );

        // Everything published goes through one channel
        let (tx, mut rx) = mpsc::channel::<Outbound>(32);

        // Start from the current state; the first poll publishes nothing
        self.state.sync_change_detection();
        let snapshot = self.state.state();
        let retained = Outbound::Changed(ChangeSet {
            phase: Some(snapshot.phase),
            indicators: snapshot.indicators.changes(),
            state: snapshot,
        });
        let _ = tx.send(retained).await;

        // Spawn heartbeat task
        let heartbeat_tx = tx.clone();
        let heartbeat_interval = self.config.heartbeat_ms;
        let state_for_heartbeat = Arc::clone(&self.state);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(heartbeat_interval));
            loop {
                interval.tick().await;
                let response = StateResponse::from(&state_for_heartbeat.state());
                if heartbeat_tx.send(Outbound::Heartbeat(response)).await.is_err() {
                    break;
                }
            }
        });

        // Spawn change polling task
        let changes_tx = tx.clone();
        let poll_interval = self.config.change_poll_ms;
        let state_for_changes = Arc::clone(&self.state);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(poll_interval));
            loop {
                interval.tick().await;
                if let Some(changes) = state_for_changes.check_changes() {
                    if changes_tx.send(Outbound::Changed(changes)).await.is_err() {
                        break;
                    }
                }
            }
        });

        // Spawn publisher task
        let client_for_publish = client.clone();
        let config_for_publish = self.config.clone();
        tokio::spawn(async move {
            while let Some(update) = rx.recv().await {
                for publication in update.publications(&config_for_publish) {
                    if let Err(e) = client_for_publish
                        .publish(
                            publication.topic,
                            QoS::AtLeastOnce,
                            publication.retain,
                            publication.payload,
                        )
                        .await
                    {
                        tracing::warn!(error = %e, "MQTT publish failed");
                    }
                }
            }
        });

        // Main event loop
        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    self.handle_message(&publish.topic, &publish.payload, &tx)
                        .await;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "MQTT connection error, retrying in 5s");
                    tokio::time::sleep(Duration::from_secs(5)).await;
                }
            }
        }
    }

    async fn handle_message(&self, topic: &str, _payload: &[u8], tx: &mpsc::Sender<Outbound>) {
        let suffix = topic
            .strip_prefix(&self.config.topic_prefix)
            .map(|s| s.trim_start_matches('/'))
            .unwrap_or(topic);

        if suffix == "wait" {
            let outcome = self.state.request_wait(CommandSource::Mqtt);
            let _ = tx.send(Outbound::WaitResult(outcome)).await;
        }
    }
}

/// MQTT-related errors
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    /// Failed to subscribe to topic
    #[error("MQTT subscribe failed: {0}")]
    Subscribe(#[from] rumqttc::ClientError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::MockLamps;
    use crate::{Phase, RejectReason};

    fn shared() -> Arc<SharedSignalState<MockLamps>> {
        Arc::new(SharedSignalState::new(SignalController::new(MockLamps::new())))
    }

    fn payload(publication: &Publication) -> &str {
        std::str::from_utf8(&publication.payload).unwrap()
    }

    // ========================================================================
    // MqttRuntimeConfig tests
    // ========================================================================

    #[test]
    fn test_mqtt_config_default() {
        let config = MqttRuntimeConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 1883);
        assert_eq!(config.client_id, "rs-crossing");
        assert_eq!(config.topic_prefix, "crossing");
        assert_eq!(config.heartbeat_ms, 5000);
        assert_eq!(config.change_poll_ms, 100);
        assert!(config.credentials.is_none());
    }

    #[test]
    fn test_mqtt_config_builder_chaining() {
        let config = MqttRuntimeConfig::new("mqtt.example.com", 8883)
            .client_id("corner-1")
            .topic_prefix("city/main")
            .heartbeat_ms(1000);
        assert_eq!(config.host, "mqtt.example.com");
        assert_eq!(config.port, 8883);
        assert_eq!(config.client_id, "corner-1");
        assert_eq!(config.topic("wait"), "city/main/wait");
        assert_eq!(config.heartbeat_ms, 1000);
    }

    #[test]
    fn test_mqtt_config_from_config_with_auth() {
        let shared = SharedMqttConfig::default().with_auth("user", "secret");
        let config = MqttRuntimeConfig::from_config(&shared);
        assert_eq!(
            config.credentials,
            Some(("user".to_string(), "secret".to_string()))
        );
    }

    // ========================================================================
    // Publication tests
    // ========================================================================

    #[test]
    fn test_changed_publications() {
        let state = shared();
        for _ in 0..3 {
            state.tick().unwrap();
        }
        let changes = state.check_changes().unwrap();
        let publications = Outbound::Changed(changes).publications(&MqttRuntimeConfig::default());

        // Two lamps, the phase, then the full state
        assert_eq!(publications.len(), 4);
        assert_eq!(publications[0].topic, "crossing/indicator/vehicle_red");
        assert_eq!(payload(&publications[0]), "on");
        assert!(publications[0].retain);
        assert_eq!(publications[1].topic, "crossing/indicator/pedestrian_green");
        assert_eq!(publications[2].topic, "crossing/phase");
        assert_eq!(payload(&publications[2]), "vehicle_red");
        assert_eq!(publications[3].topic, "crossing/state");
        assert!(!publications[3].retain);
    }

    #[test]
    fn test_button_color_payload() {
        let state = shared();
        while state.state().phase != Phase::VehicleGreen {
            state.tick().unwrap();
        }
        state.sync_change_detection();
        state.request_wait(CommandSource::Mqtt);
        state.tick().unwrap();

        let changes = state.check_changes().unwrap();
        let publications = Outbound::Changed(changes).publications(&MqttRuntimeConfig::default());
        assert_eq!(publications[0].topic, "crossing/indicator/crossing_button");
        assert_eq!(payload(&publications[0]), "acknowledged");
        // No phase change, so no phase topic
        assert_eq!(publications.len(), 2);
    }

    #[test]
    fn test_heartbeat_publication_is_json() {
        let state = shared();
        let response = StateResponse::from(&state.state());
        let publications = Outbound::Heartbeat(response).publications(&MqttRuntimeConfig::default());

        assert_eq!(publications.len(), 1);
        let json: serde_json::Value = serde_json::from_slice(&publications[0].payload).unwrap();
        assert_eq!(json["phase"], "off");
    }

    #[test]
    fn test_wait_result_publication() {
        let publications = Outbound::WaitResult(CommandOutcome::Ignored(
            RejectReason::NotVehicleGreen,
        ))
        .publications(&MqttRuntimeConfig::default());
        assert_eq!(publications[0].topic, "crossing/wait/result");
        assert_eq!(payload(&publications[0]), "ignored_not_vehicle_green");
    }

    // ========================================================================
    // handle_message tests
    // ========================================================================

    #[tokio::test]
    async fn test_handle_message_wait_ignored_outside_green() {
        let state = shared();
        let handler = MqttHandler::with_shared_state(state.clone(), MqttRuntimeConfig::default());
        let (tx, mut rx) = mpsc::channel::<Outbound>(32);

        handler.handle_message("crossing/wait", b"", &tx).await;

        match rx.try_recv().unwrap() {
            Outbound::WaitResult(outcome) => assert!(!outcome.is_accepted()),
            other => panic!("unexpected {other:?}"),
        }
        assert!(!state.state().wait_pending);
    }

    #[tokio::test]
    async fn test_handle_message_wait_during_green() {
        let state = shared();
        while state.state().phase != Phase::VehicleGreen {
            state.tick().unwrap();
        }
        let handler = MqttHandler::with_shared_state(state.clone(), MqttRuntimeConfig::default());
        let (tx, mut rx) = mpsc::channel::<Outbound>(32);

        handler.handle_message("crossing/wait", b"please", &tx).await;

        assert!(matches!(
            rx.try_recv().unwrap(),
            Outbound::WaitResult(CommandOutcome::Accepted)
        ));
        assert!(state.state().wait_pending);
    }

    #[tokio::test]
    async fn test_handle_message_unknown_topic() {
        let state = shared();
        let handler = MqttHandler::with_shared_state(state.clone(), MqttRuntimeConfig::default());
        let (tx, mut rx) = mpsc::channel::<Outbound>(32);

        handler.handle_message("crossing/phase", b"vehicle_green", &tx).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_handle_message_custom_prefix() {
        let state = shared();
        let config = MqttRuntimeConfig::default().topic_prefix("city/main");
        let handler = MqttHandler::with_shared_state(state, config);
        let (tx, mut rx) = mpsc::channel::<Outbound>(32);

        handler.handle_message("city/main/wait", b"", &tx).await;
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn test_handler_state_sharing() {
        let state = shared();
        let handler = MqttHandler::with_shared_state(Arc::clone(&state), MqttRuntimeConfig::default());
        state.tick().unwrap();
        assert_eq!(handler.state().state().ticks, 1);
    }

    #[test]
    fn test_handler_new_owns_state() {
        let handler = MqttHandler::new(
            SignalController::new(MockLamps::new()),
            MqttRuntimeConfig::default(),
        );
        assert_eq!(handler.state().state().phase, Phase::Off);
    }
}
