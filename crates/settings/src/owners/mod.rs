//! One owner per persisted facet.

mod axis_invert;
mod display_mode;
mod pointer_icon;
mod quality;
mod resolution;
mod volume;

pub use axis_invert::AxisInvertOwner;
pub use display_mode::DisplayModeOwner;
pub use pointer_icon::PointerIconOwner;
pub use quality::QualityOwner;
pub use resolution::{ResolutionOwner, UNMATCHED_INDEX, dedup_resolutions};
pub use volume::{
    DEFAULT_DECIBELS, MAX_DECIBELS, MIN_DECIBELS, VolumeOwner, clamp_decibels, volume_percent,
};
