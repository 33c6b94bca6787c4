//! Shared configuration for the controller and its services.
//!
//! Uses `heapless::String` for `no_std` compatibility while remaining
//! ergonomic to use on desktop with `std`. Configuration is assembled in
//! code; nothing is read from files or the environment.
//!
//! # Example
//!
//! ```rust
//! use rs_crossing::config::{Config, MqttConfig, TimingConfig, WebConfig};
//!
//! // Use defaults
//! let config = Config::default();
//! assert!(config.timing.validate().is_ok());
//!
//! // Or customize
//! let config = Config::default()
//!     .with_timing(TimingConfig::default().with_first_red_ms(8000))
//!     .with_mqtt(MqttConfig::default().with_host("192.168.1.100"))
//!     .with_web(WebConfig::default().with_port(3000));
//! ```

use heapless::String as HString;

use crate::indicator::Indicators;
use crate::phase::{Phase, PhaseConfig};

/// Maximum length for short config strings (hostnames, client IDs)
pub const MAX_SHORT_STRING: usize = 64;

/// Maximum length for longer config strings (topics)
pub const MAX_LONG_STRING: usize = 128;

/// Type alias for short config strings
pub type ShortString = HString<MAX_SHORT_STRING>;

/// Type alias for longer config strings
pub type LongString = HString<MAX_LONG_STRING>;

/// Create a ShortString from a &str, truncating at a character boundary
pub fn short_string(s: &str) -> ShortString {
    let mut hs = ShortString::new();
    let _ = hs.push_str(truncate(s, MAX_SHORT_STRING));
    hs
}

/// Create a LongString from a &str, truncating at a character boundary
pub fn long_string(s: &str) -> LongString {
    let mut hs = LongString::new();
    let _ = hs.push_str(truncate(s, MAX_LONG_STRING));
    hs
}

fn truncate(s: &str, max: usize) -> &str {
    let end = s
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .take_while(|end| *end <= max)
        .last()
        .unwrap_or(0);
    &s[..end]
}

// ============================================================================
// Errors
// ============================================================================

/// Invalid timing configuration.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A tick interval of zero would never advance the countdown.
    #[error("{name} must be greater than zero")]
    ZeroInterval {
        /// Name of the offending field.
        name: &'static str,
    },

    /// Blink sub-ticks must be shorter than a normal tick and fit evenly into it.
    #[error("blink interval {blink_tick_ms}ms is not a proper divisor of tick interval {tick_ms}ms")]
    BlinkIntervalMismatch {
        /// Normal tick interval.
        tick_ms: u32,
        /// Blink tick interval.
        blink_tick_ms: u32,
    },

    /// A phase would end between two ticks.
    #[error("{} lasts {duration_ms}ms, not a multiple of its {interval_ms}ms tick", phase.as_str())]
    UnalignedDuration {
        /// Phase with the bad duration.
        phase: Phase,
        /// Configured duration.
        duration_ms: u32,
        /// Interval the phase ticks at.
        interval_ms: u32,
    },

    /// The wait extension would end between two green ticks.
    #[error("wait extension {wait_extension_ms}ms is not a positive multiple of the {tick_ms}ms tick")]
    UnalignedWaitExtension {
        /// Configured extension.
        wait_extension_ms: u32,
        /// Normal tick interval.
        tick_ms: u32,
    },
}

// ============================================================================
// Main Config
// ============================================================================

/// Complete application configuration
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Phase durations and tick intervals
    pub timing: TimingConfig,
    /// Web server configuration
    pub web: WebConfig,
    /// MQTT client configuration
    pub mqtt: MqttConfig,
}

impl Config {
    /// Set timing configuration
    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    /// Set web configuration
    pub fn with_web(mut self, web: WebConfig) -> Self {
        self.web = web;
        self
    }

    /// Set MQTT configuration
    pub fn with_mqtt(mut self, mqtt: MqttConfig) -> Self {
        self.mqtt = mqtt;
        self
    }
}

// ============================================================================
// Timing Config
// ============================================================================

/// Phase durations and tick intervals, all in milliseconds.
///
/// The first vehicle-red phase after start-up and the red phases of later
/// cycles are configured separately (`first_red_ms` / `red_ms`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimingConfig {
    /// Dark start-up phase
    pub off_ms: u32,
    /// Vehicle red on the first cycle
    pub first_red_ms: u32,
    /// Vehicle red on every later cycle
    pub red_ms: u32,
    /// Pedestrian green blinking before vehicles get red-yellow
    pub blink_warning_ms: u32,
    /// Vehicle red-yellow
    pub red_yellow_ms: u32,
    /// Vehicle green
    pub green_ms: u32,
    /// Vehicle green blinking before yellow
    pub blink_end_ms: u32,
    /// Vehicle yellow
    pub yellow_ms: u32,
    /// Green time left after an accepted wait request
    pub wait_extension_ms: u32,
    /// Normal tick interval (one time unit)
    pub tick_ms: u32,
    /// Tick interval while blinking (half a unit)
    pub blink_tick_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            off_ms: 3000,
            first_red_ms: 10_000,
            red_ms: 8000,
            blink_warning_ms: 1000,
            red_yellow_ms: 2000,
            green_ms: 8000,
            blink_end_ms: 2000,
            yellow_ms: 1000,
            wait_extension_ms: 2000,
            tick_ms: 1000,
            blink_tick_ms: 500,
        }
    }
}

impl TimingConfig {
    /// Set the start-up dark phase duration
    pub fn with_off_ms(mut self, ms: u32) -> Self {
        self.off_ms = ms;
        self
    }

    /// Set the first-cycle red duration
    pub fn with_first_red_ms(mut self, ms: u32) -> Self {
        self.first_red_ms = ms;
        self
    }

    /// Set the steady-state red duration
    pub fn with_red_ms(mut self, ms: u32) -> Self {
        self.red_ms = ms;
        self
    }

    /// Set the green duration
    pub fn with_green_ms(mut self, ms: u32) -> Self {
        self.green_ms = ms;
        self
    }

    /// Set the green time left after a wait request
    pub fn with_wait_extension_ms(mut self, ms: u32) -> Self {
        self.wait_extension_ms = ms;
        self
    }

    /// Set both tick intervals
    pub fn with_intervals(mut self, tick_ms: u32, blink_tick_ms: u32) -> Self {
        self.tick_ms = tick_ms;
        self.blink_tick_ms = blink_tick_ms;
        self
    }

    /// Nominal duration of a phase.
    pub fn duration_ms(&self, phase: Phase, first_cycle: bool) -> u32 {
        match phase {
            Phase::Off => self.off_ms,
            Phase::VehicleRed if first_cycle => self.first_red_ms,
            Phase::VehicleRed => self.red_ms,
            Phase::PedestrianBlinkWarning => self.blink_warning_ms,
            Phase::VehicleRedYellow => self.red_yellow_ms,
            Phase::VehicleGreen => self.green_ms,
            Phase::PedestrianBlinkEnd => self.blink_end_ms,
            Phase::VehicleYellow => self.yellow_ms,
        }
    }

    /// Tick interval used while in a phase.
    pub fn interval_ms(&self, phase: Phase) -> u32 {
        if phase.is_blinking() {
            self.blink_tick_ms
        } else {
            self.tick_ms
        }
    }

    /// Full static configuration of a phase.
    pub fn phase_config(&self, phase: Phase, first_cycle: bool) -> PhaseConfig {
        PhaseConfig {
            phase,
            duration_ms: self.duration_ms(phase, first_cycle),
            interval_ms: self.interval_ms(phase),
            entry: Indicators::for_phase(phase, false),
            blink: phase.blink_lamp(),
        }
    }

    /// Length of one pass from vehicle red back to vehicle red.
    ///
    /// ```
    /// use rs_crossing::TimingConfig;
    ///
    /// let timing = TimingConfig::default();
    /// assert_eq!(timing.cycle_length_ms(true), 24_000);
    /// assert_eq!(timing.cycle_length_ms(false), 22_000);
    /// ```
    pub fn cycle_length_ms(&self, first_cycle: bool) -> u32 {
        Phase::CYCLE
            .iter()
            .map(|phase| self.duration_ms(*phase, first_cycle))
            .sum()
    }

    /// Check that every phase ends exactly on a tick.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 {
            return Err(ConfigError::ZeroInterval { name: "tick_ms" });
        }
        if self.blink_tick_ms == 0 {
            return Err(ConfigError::ZeroInterval {
                name: "blink_tick_ms",
            });
        }
        if self.blink_tick_ms >= self.tick_ms || self.tick_ms % self.blink_tick_ms != 0 {
            return Err(ConfigError::BlinkIntervalMismatch {
                tick_ms: self.tick_ms,
                blink_tick_ms: self.blink_tick_ms,
            });
        }

        let phases = [Phase::Off].into_iter().chain(Phase::CYCLE);
        for phase in phases {
            let interval_ms = self.interval_ms(phase);
            for first_cycle in [true, false] {
                let duration_ms = self.duration_ms(phase, first_cycle);
                if duration_ms % interval_ms != 0 {
                    return Err(ConfigError::UnalignedDuration {
                        phase,
                        duration_ms,
                        interval_ms,
                    });
                }
            }
        }

        if self.wait_extension_ms == 0 || self.wait_extension_ms % self.tick_ms != 0 {
            return Err(ConfigError::UnalignedWaitExtension {
                wait_extension_ms: self.wait_extension_ms,
                tick_ms: self.tick_ms,
            });
        }

        Ok(())
    }
}

// ============================================================================
// Web Config
// ============================================================================

/// Web server configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WebConfig {
    /// Port to listen on
    pub port: u16,
    /// Whether to enable CORS for all origins
    pub cors_permissive: bool,
    /// Whether web server is enabled
    pub enabled: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            cors_permissive: true,
            enabled: true,
        }
    }
}

impl WebConfig {
    /// Set the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set CORS mode
    pub fn with_cors(mut self, permissive: bool) -> Self {
        self.cors_permissive = permissive;
        self
    }

    /// Enable or disable web server
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

// ============================================================================
// MQTT Config
// ============================================================================

/// MQTT client configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MqttConfig {
    /// Broker hostname or IP
    pub host: ShortString,
    /// Broker port
    pub port: u16,
    /// Client ID (should be unique per device)
    pub client_id: ShortString,
    /// Topic prefix for all pub/sub (e.g., "crossing" -> "crossing/wait")
    pub topic_prefix: ShortString,
    /// Username for authentication (empty = no auth)
    pub username: ShortString,
    /// Password for authentication
    pub password: ShortString,
    /// Full state publish interval in milliseconds
    pub heartbeat_ms: u32,
    /// How often indicator changes are checked for publishing
    pub change_poll_ms: u32,
    /// Keep-alive interval in seconds
    pub keep_alive_secs: u16,
    /// Whether MQTT is enabled
    pub enabled: bool,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: short_string("localhost"),
            port: 1883,
            client_id: short_string("rs-crossing"),
            topic_prefix: short_string("crossing"),
            username: ShortString::new(),
            password: ShortString::new(),
            heartbeat_ms: 5000,
            change_poll_ms: 100,
            keep_alive_secs: 30,
            enabled: true,
        }
    }
}

impl MqttConfig {
    /// Set the broker host
    pub fn with_host(mut self, host: &str) -> Self {
        self.host = short_string(host);
        self
    }

    /// Set the broker port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the client ID
    pub fn with_client_id(mut self, id: &str) -> Self {
        self.client_id = short_string(id);
        self
    }

    /// Set the topic prefix
    pub fn with_topic_prefix(mut self, prefix: &str) -> Self {
        self.topic_prefix = short_string(prefix);
        self
    }

    /// Set authentication credentials
    pub fn with_auth(mut self, username: &str, password: &str) -> Self {
        self.username = short_string(username);
        self.password = short_string(password);
        self
    }

    /// Set the heartbeat interval
    pub fn with_heartbeat_ms(mut self, ms: u32) -> Self {
        self.heartbeat_ms = ms;
        self
    }

    /// Set the change polling interval
    pub fn with_change_poll_ms(mut self, ms: u32) -> Self {
        self.change_poll_ms = ms;
        self
    }

    /// Enable or disable MQTT
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Build a topic string with the configured prefix
    pub fn topic(&self, suffix: &str) -> LongString {
        let mut topic = LongString::new();
        let _ = topic.push_str(self.topic_prefix.as_str());
        let _ = topic.push('/');
        let _ = topic.push_str(suffix);
        topic
    }

    /// Check if authentication is configured
    pub fn has_auth(&self) -> bool {
        !self.username.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
