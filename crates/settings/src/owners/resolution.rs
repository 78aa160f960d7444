use crate::device::{Resolution, ResolutionProvider};
use crate::owner::{SettingOwner, clamp_index};
use indexmap::IndexSet;
use std::sync::Arc;
use tracing::debug;

/// Persisted index when the active resolution is not in the option list.
pub const UNMATCHED_INDEX: i32 = -1;

/// Drop repeated width/height pairs, keeping first-seen order.
pub fn dedup_resolutions(modes: impl IntoIterator<Item = Resolution>) -> Vec<Resolution> {
    modes.into_iter().collect::<IndexSet<_>>().into_iter().collect()
}

/// Owns the screen resolution.
///
/// The supported modes are enumerated once at construction. Displays report
/// one mode per refresh rate, so the list is deduplicated by size and the
/// persisted index points into the deduplicated list.
pub struct ResolutionOwner {
    provider: Arc<dyn ResolutionProvider>,
    options: Vec<Resolution>,
}

impl ResolutionOwner {
    pub fn new(provider: Arc<dyn ResolutionProvider>) -> Self {
        let options = dedup_resolutions(provider.supported_resolutions());
        debug!(count = options.len(), "resolution options enumerated");
        Self { provider, options }
    }

    pub fn options(&self) -> &[Resolution] {
        &self.options
    }

    /// UI label for option `index`, e.g. `"1920 x 1080"`.
    pub fn label(&self, index: usize) -> Option<String> {
        self.options.get(index).map(ToString::to_string)
    }

    pub fn labels(&self) -> Vec<String> {
        self.options.iter().map(ToString::to_string).collect()
    }

    pub fn current(&self) -> Resolution {
        self.provider.current_resolution()
    }

    pub fn index_of(&self, resolution: Resolution) -> Option<usize> {
        self.options.iter().position(|r| *r == resolution)
    }

    /// Switch to option `index`. The display mode is left as it is.
    pub fn select(&self, index: usize) -> bool {
        match self.options.get(index) {
            Some(&resolution) => {
                self.provider.set_resolution(resolution);
                true
            }
            None => false,
        }
    }

    /// Restore a saved resolution.
    ///
    /// A saved size that is still offered wins over the index, since the index
    /// shifts when the display list changes. Otherwise an unmatched index
    /// leaves the device alone and any other index is clamped.
    pub fn restore(&self, index: i32, width: i32, height: i32) {
        let saved = u32::try_from(width)
            .ok()
            .zip(u32::try_from(height).ok())
            .and_then(|(w, h)| self.index_of(Resolution::new(w, h)));
        if let Some(i) = saved {
            self.select(i);
        } else if index == UNMATCHED_INDEX {
            debug!(width, height, "saved resolution not offered, keeping current");
        } else {
            self.apply(index);
        }
    }
}

impl SettingOwner for ResolutionOwner {
    type Value = i32;

    fn capture(&self) -> i32 {
        self.index_of(self.current())
            .and_then(|i| i32::try_from(i).ok())
            .unwrap_or(UNMATCHED_INDEX)
    }

    fn apply(&self, index: i32) {
        if let Some(i) = clamp_index("resolution", index, self.options.len()) {
            self.select(i);
        }
    }
}
