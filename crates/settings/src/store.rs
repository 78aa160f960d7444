use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use keymap::BindingTable;
use tracing::{info, warn};

use crate::SettingsError;
use crate::file::SettingsFile;
use crate::owner::SettingOwner;
use crate::owners::{
    AxisInvertOwner, DisplayModeOwner, PointerIconOwner, QualityOwner, ResolutionOwner,
    VolumeOwner,
};
use crate::record::SettingsRecord;

/// What [`OptionsStore::load`] found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No options file yet; every owner keeps its engine default.
    FirstRun,
    /// The file was applied. `skipped_bindings` counts binding entries that
    /// could not be imported.
    Restored { skipped_bindings: usize },
}

/// Builder for [`OptionsStore`]. Every part is required.
#[derive(Default)]
pub struct OptionsStoreBuilder {
    settings_file: Option<PathBuf>,
    bindings: Option<Arc<BindingTable>>,
    display_mode: Option<Arc<DisplayModeOwner>>,
    resolution: Option<Arc<ResolutionOwner>>,
    quality: Option<Arc<QualityOwner>>,
    volume: Option<Arc<VolumeOwner>>,
    pointer_icon: Option<Arc<PointerIconOwner>>,
    axis_invert: Option<Arc<AxisInvertOwner>>,
}

impl OptionsStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.settings_file = Some(path.into());
        self
    }

    pub fn with_bindings(mut self, table: Arc<BindingTable>) -> Self {
        self.bindings = Some(table);
        self
    }

    pub fn with_display_mode(mut self, owner: Arc<DisplayModeOwner>) -> Self {
        self.display_mode = Some(owner);
        self
    }

    pub fn with_resolution(mut self, owner: Arc<ResolutionOwner>) -> Self {
        self.resolution = Some(owner);
        self
    }

    pub fn with_quality(mut self, owner: Arc<QualityOwner>) -> Self {
        self.quality = Some(owner);
        self
    }

    pub fn with_volume(mut self, owner: Arc<VolumeOwner>) -> Self {
        self.volume = Some(owner);
        self
    }

    pub fn with_pointer_icon(mut self, owner: Arc<PointerIconOwner>) -> Self {
        self.pointer_icon = Some(owner);
        self
    }

    pub fn with_axis_invert(mut self, owner: Arc<AxisInvertOwner>) -> Self {
        self.axis_invert = Some(owner);
        self
    }

    pub fn build(self) -> Result<OptionsStore, SettingsError> {
        let path = self
            .settings_file
            .ok_or(SettingsError::Invalid("settings file not specified"))?;
        Ok(OptionsStore {
            file: SettingsFile::new(path),
            bindings: self
                .bindings
                .ok_or(SettingsError::Invalid("binding table not specified"))?,
            display_mode: self
                .display_mode
                .ok_or(SettingsError::Invalid("display mode owner not specified"))?,
            resolution: self
                .resolution
                .ok_or(SettingsError::Invalid("resolution owner not specified"))?,
            quality: self
                .quality
                .ok_or(SettingsError::Invalid("quality owner not specified"))?,
            volume: self
                .volume
                .ok_or(SettingsError::Invalid("volume owner not specified"))?,
            pointer_icon: self
                .pointer_icon
                .ok_or(SettingsError::Invalid("pointer icon owner not specified"))?,
            axis_invert: self
                .axis_invert
                .ok_or(SettingsError::Invalid("axis invert owner not specified"))?,
            save_lock: Mutex::new(()),
        })
    }
}

/// Collects every owner into one [`SettingsRecord`] on save and hands the
/// fields back out on load.
///
/// Saves are serialized in-process by a mutex and across processes by the
/// file lock in [`SettingsFile`].
pub struct OptionsStore {
    file: SettingsFile,
    bindings: Arc<BindingTable>,
    display_mode: Arc<DisplayModeOwner>,
    resolution: Arc<ResolutionOwner>,
    quality: Arc<QualityOwner>,
    volume: Arc<VolumeOwner>,
    pointer_icon: Arc<PointerIconOwner>,
    axis_invert: Arc<AxisInvertOwner>,
    save_lock: Mutex<()>,
}

impl OptionsStore {
    pub fn builder() -> OptionsStoreBuilder {
        OptionsStoreBuilder::new()
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn bindings(&self) -> &Arc<BindingTable> {
        &self.bindings
    }

    pub fn display_mode(&self) -> &Arc<DisplayModeOwner> {
        &self.display_mode
    }

    pub fn resolution(&self) -> &Arc<ResolutionOwner> {
        &self.resolution
    }

    pub fn quality(&self) -> &Arc<QualityOwner> {
        &self.quality
    }

    pub fn volume(&self) -> &Arc<VolumeOwner> {
        &self.volume
    }

    pub fn pointer_icon(&self) -> &Arc<PointerIconOwner> {
        &self.pointer_icon
    }

    pub fn axis_invert(&self) -> &Arc<AxisInvertOwner> {
        &self.axis_invert
    }

    /// Snapshot of the live state of every owner.
    pub fn capture(&self) -> SettingsRecord {
        let snapshot = self.bindings.export();
        let resolution = self.resolution.current();
        SettingsRecord {
            full_screen_mode: self.display_mode.capture(),
            resolution_width: i32::try_from(resolution.width).unwrap_or(i32::MAX),
            resolution_height: i32::try_from(resolution.height).unwrap_or(i32::MAX),
            current_resolution_index: self.resolution.capture(),
            volume: self.volume.capture(),
            quality_level: self.quality.capture(),
            key_names: snapshot.names,
            key_values: snapshot.values,
            is_mouse_inverted: self.axis_invert.capture(),
            current_cursor: self.pointer_icon.capture(),
        }
    }

    /// Write the current state. On failure the previous file is unchanged.
    pub fn save(&self) -> Result<(), SettingsError> {
        let _guard = self.save_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let json = self.capture().to_json()?;
        self.file.write_atomic(json.as_bytes()).map_err(|err| {
            warn!(path = %self.file.path().display(), %err, "saving options failed");
            SettingsError::Io(err)
        })?;
        info!(path = %self.file.path().display(), "options saved");
        Ok(())
    }

    /// Read the options file and distribute it to every owner.
    ///
    /// The record is fully parsed and validated before anything is applied,
    /// so a [`SettingsError::Format`] leaves the binding table and all
    /// owners untouched.
    pub fn load(&self) -> Result<LoadOutcome, SettingsError> {
        let Some(bytes) = self.file.read()? else {
            info!(path = %self.file.path().display(), "no options file, keeping defaults");
            return Ok(LoadOutcome::FirstRun);
        };
        let record = String::from_utf8(bytes)
            .map_err(|err| SettingsError::Format(format!("options file is not UTF-8: {err}")))
            .and_then(|text| SettingsRecord::from_json(&text))
            .inspect_err(|err| {
                warn!(path = %self.file.path().display(), %err, "options file rejected");
            })?;
        let skipped_bindings = self.distribute(&record);
        info!(
            path = %self.file.path().display(),
            skipped_bindings, "options restored"
        );
        Ok(LoadOutcome::Restored { skipped_bindings })
    }

    fn distribute(&self, record: &SettingsRecord) -> usize {
        let report = self.bindings.import(&record.key_names, &record.key_values);
        // Display mode first so the resolution switch keeps it.
        self.display_mode.apply(record.full_screen_mode);
        self.resolution.restore(
            record.current_resolution_index,
            record.resolution_width,
            record.resolution_height,
        );
        self.quality.apply(record.quality_level);
        self.volume.apply(record.volume);
        self.pointer_icon.apply(record.current_cursor);
        self.axis_invert.apply(record.is_mouse_inverted);
        report.skipped
    }
}
