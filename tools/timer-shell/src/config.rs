use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use periph_timer::TesterConfig;
use periph_timer_port_host::SimTimerConfig;
use serde::{Deserialize, Serialize};

/// Shape of the simulated timer block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerSection {
    pub devices: usize,
    pub channels: usize,
    pub max_frequency: u32,
}

impl Default for TimerSection {
    fn default() -> Self {
        let sim = SimTimerConfig::default();
        Self {
            devices: sim.devices,
            channels: sim.channels,
            max_frequency: sim.max_frequency,
        }
    }
}

impl From<TimerSection> for SimTimerConfig {
    fn from(section: TimerSection) -> Self {
        Self {
            devices: section.devices,
            channels: section.channels,
            max_frequency: section.max_frequency,
        }
    }
}

/// Everything the console reads from a `--config` JSON file.
///
/// ```json
/// { "board": "native", "wait_timeout_ms": 2000, "timer": { "devices": 3 } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    #[serde(flatten)]
    pub tester: TesterConfig,
    pub timer: TimerSection,
}

impl ShellConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("invalid console configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("in {}", path.display()))
    }
}
