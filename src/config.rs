use std::ops::RangeInclusive;
use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::lockout::LockoutState;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub serial: SerialConfig,
    #[serde(default)]
    pub sensor: SensorConfig,
    #[serde(default)]
    pub led: LedConfig,
    #[serde(default)]
    pub lockout: LockoutConfig,
    #[serde(default)]
    pub library: LibraryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SerialConfig {
    #[serde(default = "default_port")]
    pub port: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Read timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SensorConfig {
    /// Module address, 0xffffffff out of the box
    #[serde(default = "default_address")]
    pub address: u32,
    #[serde(default)]
    pub password: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LedConfig {
    /// BCM pin number. The binary's `--no-led` flag clears it.
    #[serde(default = "default_gpio_pin")]
    pub gpio_pin: Option<u8>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LockoutConfig {
    /// Consecutive failed attempts before locking out
    #[serde(default = "default_threshold")]
    pub threshold: u32,
    /// Lockout length in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LibraryConfig {
    #[serde(default = "default_first_slot")]
    pub first_slot: u16,
    #[serde(default = "default_last_slot")]
    pub last_slot: u16,
}

fn default_port() -> String {
    "/dev/ttyUSB0".to_string()
}

fn default_baud_rate() -> u32 {
    57_600
}

fn default_timeout_ms() -> u64 {
    1_000
}

fn default_address() -> u32 {
    0xFFFF_FFFF
}

fn default_gpio_pin() -> Option<u8> {
    Some(13)
}

fn default_threshold() -> u32 {
    4
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_first_slot() -> u16 {
    1
}

fn default_last_slot() -> u16 {
    127
}

impl Settings {
    /// Loads settings from `config/default` (optional), then `path` if given,
    /// then `R502_*` environment variables, e.g. `R502_SERIAL__PORT`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let mut builder = Config::builder().add_source(File::with_name("config/default").required(false));
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        let settings: Self = builder
            .add_source(
                Environment::with_prefix("R502")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Rejects settings the console cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.library.first_slot > self.library.last_slot {
            return Err(ConfigError::Message(format!(
                "library.first_slot ({}) is after library.last_slot ({})",
                self.library.first_slot, self.library.last_slot
            )));
        }
        Ok(())
    }
}

impl SerialConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl LockoutConfig {
    pub fn initial_state(&self) -> LockoutState {
        LockoutState::new(self.threshold, Duration::from_secs(self.timeout_secs))
    }
}

impl LibraryConfig {
    pub fn slots(&self) -> RangeInclusive<u16> {
        self.first_slot..=self.last_slot
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            baud_rate: default_baud_rate(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            password: 0,
        }
    }
}

impl Default for LedConfig {
    fn default() -> Self {
        Self {
            gpio_pin: default_gpio_pin(),
        }
    }
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            first_slot: default_first_slot(),
            last_slot: default_last_slot(),
        }
    }
}
