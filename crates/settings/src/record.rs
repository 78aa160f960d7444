//! The persisted options record.
//!
//! One flat JSON object, rebuilt from live state on every save and fully
//! replaced on disk. There is no version field: a file written by a
//! different layout fails to parse and surfaces as
//! [`SettingsError::Format`].

use crate::device::VolumeChannel;
use crate::errors::SettingsError;
use serde::{Deserialize, Serialize};

/// Snapshot of every persisted option.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SettingsRecord {
    pub full_screen_mode: i32,
    /// Signed on the wire; a negative size never matches an offered mode.
    pub resolution_width: i32,
    pub resolution_height: i32,
    /// Position in the deduplicated resolution list, `-1` if the active
    /// resolution was not in the list.
    pub current_resolution_index: i32,
    /// Decibels per channel, in [`VolumeChannel::ALL`] order.
    pub volume: [f32; VolumeChannel::COUNT],
    pub quality_level: i32,
    pub key_names: Vec<String>,
    pub key_values: Vec<String>,
    pub is_mouse_inverted: bool,
    pub current_cursor: i32,
}

impl SettingsRecord {
    /// Parse and validate a record.
    pub fn from_json(text: &str) -> Result<Self, SettingsError> {
        let record: SettingsRecord = serde_json::from_str(text)?;
        record.validate()?;
        Ok(record)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Structural checks that serde cannot express.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.key_names.len() != self.key_values.len() {
            return Err(SettingsError::Format(format!(
                "keyNames has {} entries but keyValues has {}",
                self.key_names.len(),
                self.key_values.len()
            )));
        }
        Ok(())
    }
}
