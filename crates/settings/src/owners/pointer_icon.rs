use crate::device::PointerIconApplier;
use crate::owner::{SettingOwner, clamp_index, read, write};
use std::sync::{Arc, RwLock};

/// Owns the selected mouse pointer icon.
pub struct PointerIconOwner {
    current: RwLock<usize>,
    applier: Arc<dyn PointerIconApplier>,
}

impl PointerIconOwner {
    pub fn new(applier: Arc<dyn PointerIconApplier>) -> Self {
        Self {
            current: RwLock::new(0),
            applier,
        }
    }

    pub fn current(&self) -> usize {
        read(&self.current)
    }

    pub fn icon_count(&self) -> usize {
        self.applier.icon_count()
    }

    pub fn select(&self, index: usize) -> bool {
        if index >= self.applier.icon_count() {
            return false;
        }
        write(&self.current, index);
        self.applier.set_pointer_icon(index);
        true
    }
}

impl SettingOwner for PointerIconOwner {
    type Value = i32;

    fn capture(&self) -> i32 {
        i32::try_from(self.current()).unwrap_or(i32::MAX)
    }

    fn apply(&self, index: i32) {
        if let Some(i) = clamp_index("pointer_icon", index, self.applier.icon_count()) {
            self.select(i);
        }
    }
}
