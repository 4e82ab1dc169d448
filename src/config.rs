//! Shell configuration record (see spec §6.1), loaded the way the
//! teacher's own `Config::from_file` loads `config.json` — `serde_json`
//! over a plain `Deserialize` struct, validated once at the boundary.

use serde::Deserialize;

use crate::editor::{MAX_CAPACITY as MAX_CMD_BUFFER, MIN_CAPACITY as MIN_CMD_BUFFER};
use crate::history::{MAX_CAPACITY as MAX_HISTORY, MIN_CAPACITY as MIN_HISTORY};
use crate::registry::MAX_COMMANDS;
use crate::status::Status;

pub const MAX_PROMPT_LEN: usize = 16;
pub const DEFAULT_PROMPT: &str = "nexus> ";

/// Tunable parameters for a [`crate::shell::Shell`] instance.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub prompt: String,
    pub cmd_buffer_size: usize,
    pub history_depth: usize,
    /// Hint only; the registry itself enforces [`MAX_COMMANDS`] as a hard
    /// cap regardless of this value.
    pub max_commands: usize,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            cmd_buffer_size: 128,
            history_depth: 16,
            max_commands: MAX_COMMANDS,
        }
    }
}

impl ShellConfig {
    /// Validate the record against the bounds in spec §6.1. Called once
    /// by `Shell::init` before anything is allocated.
    pub fn validate(&self) -> Result<(), Status> {
        if self.prompt.len() > MAX_PROMPT_LEN {
            return Err(Status::InvalidParam);
        }
        if !(MIN_CMD_BUFFER..=MAX_CMD_BUFFER).contains(&self.cmd_buffer_size) {
            return Err(Status::InvalidParam);
        }
        if !(MIN_HISTORY..=MAX_HISTORY).contains(&self.history_depth) {
            return Err(Status::InvalidParam);
        }
        Ok(())
    }

    /// Load and validate a configuration from a JSON file, mirroring the
    /// teacher's `Config::from_file`. Library callers needing only
    /// validation should construct a `ShellConfig` directly and call
    /// [`ShellConfig::validate`]; this helper is for host applications
    /// (such as the demo binary) that keep tuning in a file on disk.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ShellConfig = serde_json::from_str(&content)?;
        config.validate().map_err(|status| anyhow::anyhow!(status.message()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ShellConfig::default().validate().is_ok());
    }

    #[test]
    fn prompt_too_long_is_rejected() {
        let mut cfg = ShellConfig::default();
        cfg.prompt = "a".repeat(MAX_PROMPT_LEN + 1);
        assert_eq!(cfg.validate().unwrap_err(), Status::InvalidParam);
    }

    #[test]
    fn cmd_buffer_size_out_of_range_is_rejected() {
        let mut cfg = ShellConfig::default();
        cfg.cmd_buffer_size = MIN_CMD_BUFFER - 1;
        assert_eq!(cfg.validate().unwrap_err(), Status::InvalidParam);

        cfg.cmd_buffer_size = MAX_CMD_BUFFER + 1;
        assert_eq!(cfg.validate().unwrap_err(), Status::InvalidParam);
    }

    #[test]
    fn history_depth_out_of_range_is_rejected() {
        let mut cfg = ShellConfig::default();
        cfg.history_depth = MIN_HISTORY - 1;
        assert_eq!(cfg.validate().unwrap_err(), Status::InvalidParam);

        cfg.history_depth = MAX_HISTORY + 1;
        assert_eq!(cfg.validate().unwrap_err(), Status::InvalidParam);
    }
}
