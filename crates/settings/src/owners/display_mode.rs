use crate::device::{DisplayMode, DisplayModeApplier};
use crate::owner::{SettingOwner, clamp_index, read, write};
use std::sync::{Arc, RwLock};

/// Owns the window presentation mode.
pub struct DisplayModeOwner {
    mode: RwLock<DisplayMode>,
    applier: Arc<dyn DisplayModeApplier>,
}

impl DisplayModeOwner {
    /// Starts at the engine default without touching the device.
    pub fn new(applier: Arc<dyn DisplayModeApplier>) -> Self {
        Self {
            mode: RwLock::new(DisplayMode::default()),
            applier,
        }
    }

    pub fn mode(&self) -> DisplayMode {
        read(&self.mode)
    }

    /// Switch mode and tell the device.
    pub fn set_mode(&self, mode: DisplayMode) {
        write(&self.mode, mode);
        self.applier.set_display_mode(mode);
    }
}

impl SettingOwner for DisplayModeOwner {
    type Value = i32;

    fn capture(&self) -> i32 {
        self.mode().index()
    }

    fn apply(&self, index: i32) {
        if let Some(i) = clamp_index("display_mode", index, DisplayMode::ALL.len()) {
            self.set_mode(DisplayMode::ALL[i]);
        }
    }
}
