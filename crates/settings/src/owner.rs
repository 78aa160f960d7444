//! The contract every settings facet implements.

use std::sync::{PoisonError, RwLock};
use tracing::debug;

/// Holds the authoritative live value of one settings facet.
///
/// `Value` is the persisted representation. [`SettingOwner::apply`] must
/// accept anything that representation can hold and clamp it into the
/// owner's valid domain before touching the device.
pub trait SettingOwner: Send + Sync {
    type Value;

    /// Read the live value.
    fn capture(&self) -> Self::Value;

    /// Push `value` into the live engine / device state.
    fn apply(&self, value: Self::Value);
}

/// Clamp a persisted index into `0..len`.
///
/// Saved indices point into machine-dependent lists, so an index past the
/// end is moved to the last entry and a negative one to the first. Returns
/// `None` only when there is nothing to select.
pub fn clamp_index(facet: &'static str, raw: i32, len: usize) -> Option<usize> {
    if len == 0 {
        debug!(facet, raw, "no options available, index ignored");
        return None;
    }
    let last = len - 1;
    let clamped = usize::try_from(raw).map_or(0, |i| i.min(last));
    if usize::try_from(raw).ok() != Some(clamped) {
        debug!(facet, raw, clamped, "index out of range, clamped");
    }
    Some(clamped)
}

pub(crate) fn read<T: Copy>(lock: &RwLock<T>) -> T {
    *lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<T>(lock: &RwLock<T>, value: T) {
    *lock.write().unwrap_or_else(PoisonError::into_inner) = value;
}
