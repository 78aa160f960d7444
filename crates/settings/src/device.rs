//! Narrow capability interfaces onto the engine and platform.
//!
//! Owners push values through these traits and never talk to a window,
//! mixer or renderer directly. One platform object typically implements
//! several of them.

use std::fmt;

/// A width/height pair as reported by the display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {}", self.width, self.height)
    }
}

/// Window presentation mode. The discriminant is the persisted index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DisplayMode {
    #[default]
    ExclusiveFullScreen = 0,
    FullScreenWindow = 1,
    Windowed = 2,
}

impl DisplayMode {
    pub const ALL: [DisplayMode; 3] = [
        DisplayMode::ExclusiveFullScreen,
        DisplayMode::FullScreenWindow,
        DisplayMode::Windowed,
    ];

    pub fn index(self) -> i32 {
        self as i32
    }

    /// Exact lookup; `None` for indices outside the enum.
    pub fn from_index(index: i32) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }
}

/// Mixer channels with an independent volume.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VolumeChannel {
    Master,
    Music,
    Sfx,
}

impl VolumeChannel {
    pub const COUNT: usize = 3;

    /// Persisted order.
    pub const ALL: [VolumeChannel; Self::COUNT] =
        [VolumeChannel::Master, VolumeChannel::Music, VolumeChannel::Sfx];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Name of the exposed mixer parameter.
    pub fn name(self) -> &'static str {
        match self {
            VolumeChannel::Master => "Master",
            VolumeChannel::Music => "Music",
            VolumeChannel::Sfx => "SFX",
        }
    }
}

/// Enumerates display resolutions and switches between them.
pub trait ResolutionProvider: Send + Sync {
    /// Every mode the display supports, possibly with repeats (one entry per
    /// refresh rate, for example).
    fn supported_resolutions(&self) -> Vec<Resolution>;

    /// The resolution currently in use.
    fn current_resolution(&self) -> Resolution;

    /// Switch resolution, keeping whatever display mode is active.
    fn set_resolution(&self, resolution: Resolution);
}

pub trait DisplayModeApplier: Send + Sync {
    fn set_display_mode(&self, mode: DisplayMode);
}

pub trait QualityApplier: Send + Sync {
    /// Number of configured quality tiers; valid indices are `0..tier_count`.
    fn tier_count(&self) -> usize;

    fn set_quality_tier(&self, tier: usize);
}

pub trait VolumeApplier: Send + Sync {
    fn set_channel_volume(&self, channel: VolumeChannel, decibels: f32);
}

pub trait PointerIconApplier: Send + Sync {
    /// Number of selectable icons; valid indices are `0..icon_count`.
    fn icon_count(&self) -> usize;

    fn set_pointer_icon(&self, index: usize);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mode_indices() {
        for mode in DisplayMode::ALL {
            assert_eq!(DisplayMode::from_index(mode.index()), Some(mode));
        }
        assert_eq!(DisplayMode::from_index(-1), None);
        assert_eq!(DisplayMode::from_index(3), None);
    }

    #[test]
    fn volume_channel_order() {
        assert_eq!(VolumeChannel::ALL.len(), VolumeChannel::COUNT);
        for (i, channel) in VolumeChannel::ALL.iter().enumerate() {
            assert_eq!(channel.index(), i);
        }
        assert_eq!(VolumeChannel::Sfx.name(), "SFX");
    }

    #[test]
    fn resolution_label() {
        assert_eq!(Resolution::new(1920, 1080).to_string(), "1920 x 1080");
    }
}
