use crate::device::QualityApplier;
use crate::owner::{SettingOwner, clamp_index, read, write};
use std::sync::{Arc, RwLock};

/// Owns the renderer quality tier.
pub struct QualityOwner {
    tier: RwLock<usize>,
    applier: Arc<dyn QualityApplier>,
}

impl QualityOwner {
    pub fn new(applier: Arc<dyn QualityApplier>, initial_tier: usize) -> Self {
        Self {
            tier: RwLock::new(initial_tier),
            applier,
        }
    }

    pub fn tier(&self) -> usize {
        read(&self.tier)
    }

    pub fn tier_count(&self) -> usize {
        self.applier.tier_count()
    }

    /// Select a tier from the UI. Out-of-range tiers are ignored.
    pub fn set_tier(&self, tier: usize) -> bool {
        if tier >= self.applier.tier_count() {
            return false;
        }
        write(&self.tier, tier);
        self.applier.set_quality_tier(tier);
        true
    }
}

impl SettingOwner for QualityOwner {
    type Value = i32;

    fn capture(&self) -> i32 {
        i32::try_from(self.tier()).unwrap_or(i32::MAX)
    }

    fn apply(&self, index: i32) {
        if let Some(tier) = clamp_index("quality", index, self.applier.tier_count()) {
            self.set_tier(tier);
        }
    }
}
