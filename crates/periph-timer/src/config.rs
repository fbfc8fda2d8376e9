//! Console configuration.

use std::time::Duration;

/// Runtime options for a [`TimerTester`](crate::TimerTester).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TesterConfig {
    /// Board name reported by `get_metadata`.
    pub board: String,
    /// Application name reported by `get_metadata`.
    pub application: String,
    /// Upper bound on how long an arm command waits for its interrupt.
    /// `None` waits forever.
    #[cfg_attr(feature = "serde", serde(rename = "wait_timeout_ms", with = "millis"))]
    pub wait_timeout: Option<Duration>,
}

impl Default for TesterConfig {
    fn default() -> Self {
        Self {
            board: "native".to_owned(),
            application: "tests_periph_timer".to_owned(),
            wait_timeout: None,
        }
    }
}

impl TesterConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> TesterConfigBuilder {
        TesterConfigBuilder::default()
    }
}

/// Builder for ergonomic configuration construction.
#[derive(Debug, Clone, Default)]
pub struct TesterConfigBuilder {
    config: TesterConfig,
}

impl TesterConfigBuilder {
    /// Sets the board name.
    pub fn board(mut self, board: impl Into<String>) -> Self {
        self.config.board = board.into();
        self
    }

    /// Sets the application name.
    pub fn application(mut self, application: impl Into<String>) -> Self {
        self.config.application = application.into();
        self
    }

    /// Bounds the wait of `timer_set` and `timer_set_absolute`.
    pub fn wait_timeout(mut self, timeout: Duration) -> Self {
        self.config.wait_timeout = Some(timeout);
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> TesterConfig {
        self.config
    }
}

#[cfg(feature = "serde")]
mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, ser: S) -> Result<S::Ok, S::Error> {
        value
            .map(|timeout| timeout.as_millis() as u64)
            .serialize(ser)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(de)?.map(Duration::from_millis))
    }
}
