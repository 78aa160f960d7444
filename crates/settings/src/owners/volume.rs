use crate::device::{VolumeApplier, VolumeChannel};
use crate::owner::{SettingOwner, read};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

pub const MIN_DECIBELS: f32 = -80.0;
pub const MAX_DECIBELS: f32 = 20.0;
pub const DEFAULT_DECIBELS: f32 = 0.0;

/// Clamp into `[MIN_DECIBELS, MAX_DECIBELS]`; NaN and infinities become the default.
pub fn clamp_decibels(decibels: f32) -> f32 {
    if decibels.is_finite() {
        decibels.clamp(MIN_DECIBELS, MAX_DECIBELS)
    } else {
        DEFAULT_DECIBELS
    }
}

/// Slider position for a level, `0.0` at the floor and `1.0` at the ceiling.
pub fn volume_percent(decibels: f32) -> f32 {
    ((clamp_decibels(decibels) - MIN_DECIBELS) / (MAX_DECIBELS - MIN_DECIBELS)).clamp(0.0, 1.0)
}

/// Owns the mixer level of every [`VolumeChannel`].
pub struct VolumeOwner {
    levels: RwLock<[f32; VolumeChannel::COUNT]>,
    applier: Arc<dyn VolumeApplier>,
}

impl VolumeOwner {
    pub fn new(applier: Arc<dyn VolumeApplier>) -> Self {
        Self {
            levels: RwLock::new([DEFAULT_DECIBELS; VolumeChannel::COUNT]),
            applier,
        }
    }

    pub fn level(&self, channel: VolumeChannel) -> f32 {
        read(&self.levels)[channel.index()]
    }

    /// Adjust one channel, as a slider does.
    pub fn set_channel(&self, channel: VolumeChannel, decibels: f32) {
        let decibels = clamp_decibels(decibels);
        self.levels.write().unwrap_or_else(PoisonError::into_inner)[channel.index()] = decibels;
        self.applier.set_channel_volume(channel, decibels);
    }
}

impl SettingOwner for VolumeOwner {
    type Value = [f32; VolumeChannel::COUNT];

    fn capture(&self) -> Self::Value {
        read(&self.levels)
    }

    fn apply(&self, levels: Self::Value) {
        for channel in VolumeChannel::ALL {
            let raw = levels[channel.index()];
            let clamped = clamp_decibels(raw);
            if clamped != raw {
                debug!(channel = channel.name(), raw, clamped, "volume clamped");
            }
            self.set_channel(channel, clamped);
        }
    }
}
