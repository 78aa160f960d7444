//! Options persistence: one record gathered from every settings owner,
//! written atomically, read back once at startup.

pub mod device;
mod errors;
mod file;
pub mod owner;
pub mod owners;
mod record;
mod store;

pub use device::{
    DisplayMode, DisplayModeApplier, PointerIconApplier, QualityApplier, Resolution,
    ResolutionProvider, VolumeApplier, VolumeChannel,
};
pub use errors::SettingsError;
pub use file::SettingsFile;
pub use owner::SettingOwner;
pub use owners::{
    AxisInvertOwner, DisplayModeOwner, PointerIconOwner, QualityOwner, ResolutionOwner,
    VolumeOwner,
};
pub use record::SettingsRecord;
pub use store::{LoadOutcome, OptionsStore, OptionsStoreBuilder};
