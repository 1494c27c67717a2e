//! # Gate Configuration
//!
//! File and environment driven choices for assembling a gate: which handler
//! table lifecycle to use and which execution channel should run scheduled
//! commands.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use command_gate::config::{ConfigManager, TableMode};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Reads COMMAND_GATE_CONFIG (if set) and COMMAND_GATE__* variables
//! let manager = ConfigManager::load()?;
//!
//! if manager.config().table.mode == TableMode::Lazy {
//!     println!("handler table will build on start()");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Environment variables use `__` as the nesting separator, for example
//! `COMMAND_GATE__CHANNEL__KIND=queue`.

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};

pub use error::ConfigurationError;
pub use loader::ConfigManager;

/// Root gate configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GateConfig {
    pub table: TableConfig,
    pub channel: ChannelConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TableConfig {
    pub mode: TableMode,
}

/// When the handler table is built
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableMode {
    /// Build while the gate is assembled
    #[default]
    Eager,
    /// Build on an explicit start signal
    Lazy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub kind: ChannelKind,

    /// Bound for the queue channel; unbounded when absent. A host supplied
    /// queue must have the same bound.
    pub queue_capacity: Option<usize>,
}

/// Which execution channel runs scheduled commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// Run on the scheduling thread
    Inline,
    /// Run on a host-owned tokio runtime
    Tokio,
    /// Queue for host-owned worker threads
    Queue,
    /// Not chosen by configuration; a host supplied channel is used as is
    #[default]
    None,
}

impl GateConfig {
    /// Validate configuration for consistency
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.channel.queue_capacity == Some(0) {
            return Err(ConfigurationError::invalid_value(
                "channel.queue_capacity",
                "0",
                "queue capacity must be greater than 0",
            ));
        }

        if self.channel.queue_capacity.is_some() && self.channel.kind != ChannelKind::Queue {
            return Err(ConfigurationError::invalid_value(
                "channel.queue_capacity",
                &format!("{:?}", self.channel.queue_capacity),
                "queue capacity only applies to the queue channel",
            ));
        }

        Ok(())
    }
}
