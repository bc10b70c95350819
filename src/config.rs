use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const CURVES_PER_JOINT: usize = 3;

/// Runtime tunables, every field falls back to its default when missing from the file.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct AnimSettings {
    /// Event windows longer than this (seconds) are dropped, e.g. after a hitch or a teleport.
    pub max_event_window: f32,
    /// Events closer than this (seconds) are merged into one output event.
    pub event_time_epsilon: f32,
    pub max_joints: usize,
    pub worker_threads: usize,
}

impl Default for AnimSettings {
    fn default() -> Self {
        Self {
            max_event_window: 0.25,
            event_time_epsilon: 0.01,
            max_joints: 1024,
            worker_threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
        }
    }
}

impl AnimSettings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn max_curves(&self) -> usize {
        self.max_joints * CURVES_PER_JOINT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let settings = AnimSettings::from_json_str(r#"{ "max_event_window": 0.5 }"#).unwrap();
        assert_eq!(settings.max_event_window, 0.5);
        assert_eq!(settings.event_time_epsilon, 0.01);
        assert_eq!(settings.max_joints, 1024);
        assert!(settings.worker_threads >= 1);
        assert_eq!(settings.max_curves(), 3072);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(AnimSettings::from_json_str("{ max_joints: }").is_err());
    }
}
