use std::path::PathBuf;
use std::sync::Arc;

use keymap::{BindingTable, InputBus, defaults};
use settings::{
    AxisInvertOwner, DisplayModeApplier, DisplayModeOwner, LoadOutcome, OptionsStore,
    PointerIconApplier, PointerIconOwner, QualityApplier, QualityOwner, ResolutionOwner,
    ResolutionProvider, SettingsError, VolumeApplier, VolumeOwner,
};
use tracing::{info, warn};

/// Everything the options engine needs from the engine and OS.
pub trait Platform:
    ResolutionProvider
    + DisplayModeApplier
    + QualityApplier
    + VolumeApplier
    + PointerIconApplier
    + 'static
{
}

impl<T> Platform for T where
    T: ResolutionProvider
        + DisplayModeApplier
        + QualityApplier
        + VolumeApplier
        + PointerIconApplier
        + 'static
{
}

/// Result of the startup sequence.
#[derive(Debug)]
pub struct StartupReport {
    /// What loading the options file did. An error means defaults stayed active.
    pub load: Result<LoadOutcome, SettingsError>,
    /// Whether the default bindings were inserted into an empty table.
    pub seeded_defaults: bool,
    /// Default actions re-added because the saved file lacked them.
    pub filled_defaults: usize,
}

/// Owns the binding table, the input bus it listens on, and the options
/// store. UI code borrows owners from here.
pub struct OptionsRoot {
    input: Arc<InputBus>,
    store: OptionsStore,
}

impl OptionsRoot {
    /// Wire a fresh table and one owner per facet against `platform`, then
    /// run [`OptionsRoot::start`].
    pub fn assemble<P: Platform>(
        options_file: impl Into<PathBuf>,
        platform: Arc<P>,
        initial_quality: usize,
    ) -> Result<(Self, StartupReport), SettingsError> {
        let input = Arc::new(InputBus::new());
        let bindings = Arc::new(
            BindingTable::builder()
                .with_input_source(input.clone())
                .build(),
        );
        let store = OptionsStore::builder()
            .with_settings_file(options_file)
            .with_bindings(bindings)
            .with_display_mode(Arc::new(DisplayModeOwner::new(platform.clone())))
            .with_resolution(Arc::new(ResolutionOwner::new(platform.clone())))
            .with_quality(Arc::new(QualityOwner::new(platform.clone(), initial_quality)))
            .with_volume(Arc::new(VolumeOwner::new(platform.clone())))
            .with_pointer_icon(Arc::new(PointerIconOwner::new(platform)))
            .with_axis_invert(Arc::new(AxisInvertOwner::new()))
            .build()?;
        Ok(Self::start(input, store))
    }

    /// Load once, then bootstrap bindings and re-add any default action the
    /// file did not restore. Never fails: a load error is logged, defaults
    /// stay, and the file is left for the next save to replace.
    pub fn start(input: Arc<InputBus>, store: OptionsStore) -> (Self, StartupReport) {
        let load = store.load();
        if let Err(err) = &load {
            warn!(path = %store.path().display(), %err, "options not restored, using defaults");
        }
        let seeded_defaults = defaults::bootstrap(store.bindings());
        if seeded_defaults {
            info!("default bindings seeded");
        }
        let filled_defaults = defaults::fill_missing(store.bindings());
        (
            Self { input, store },
            StartupReport {
                load,
                seeded_defaults,
                filled_defaults,
            },
        )
    }

    pub fn bindings(&self) -> &Arc<BindingTable> {
        self.store.bindings()
    }

    /// Where platform input is published while a rebind is pending.
    pub fn input(&self) -> &Arc<InputBus> {
        &self.input
    }

    pub fn store(&self) -> &OptionsStore {
        &self.store
    }

    /// Persist the current state, e.g. on the options menu's confirm.
    pub fn save(&self) -> Result<(), SettingsError> {
        self.store.save()
    }
}
