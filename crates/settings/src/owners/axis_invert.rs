use crate::owner::SettingOwner;
use std::sync::atomic::{AtomicBool, Ordering};

/// Owns the vertical look-axis inversion flag read by camera code.
#[derive(Default)]
pub struct AxisInvertOwner {
    inverted: AtomicBool,
}

impl AxisInvertOwner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted.load(Ordering::Relaxed)
    }

    pub fn set_inverted(&self, inverted: bool) {
        self.inverted.store(inverted, Ordering::Relaxed);
    }

    /// Pitch change for a vertical pointer delta. Moving the pointer up
    /// looks up unless the axis is inverted.
    pub fn vertical_look(&self, pointer_delta_y: f32) -> f32 {
        if self.is_inverted() {
            pointer_delta_y
        } else {
            -pointer_delta_y
        }
    }
}

impl SettingOwner for AxisInvertOwner {
    type Value = bool;

    fn capture(&self) -> bool {
        self.is_inverted()
    }

    fn apply(&self, inverted: bool) {
        self.set_inverted(inverted);
    }
}
