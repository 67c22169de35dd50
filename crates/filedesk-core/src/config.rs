//! Dispatch configuration.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Configuration for the action router and its dispatcher.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct DispatchConfig {
    /// Capacity of the broadcast channel carrying published events.
    #[builder(default = "100")]
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,

    /// Session id handed to the service when building download URLs.
    #[builder(default)]
    #[serde(default)]
    pub session_id: Option<String>,
}

fn default_event_channel_capacity() -> usize {
    100
}

impl DispatchConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.event_channel_capacity == Some(0) {
            return Err("Event channel capacity must be greater than zero".to_string());
        }
        Ok(())
    }
}

impl DispatchConfig {
    /// Create a new dispatch config builder.
    pub fn builder() -> DispatchConfigBuilder {
        DispatchConfigBuilder::default()
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: default_event_channel_capacity(),
            session_id: None,
        }
    }
}
