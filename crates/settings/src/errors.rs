use thiserror::Error;

/// Failures surfaced by [`OptionsStore::save`](crate::OptionsStore::save) and
/// [`OptionsStore::load`](crate::OptionsStore::load).
///
/// Rebind conflicts and out-of-range indices are not errors: the first is a
/// [`keymap::RebindOutcome::Rejected`] value, the second is clamped.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The options file could not be read or written.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The options file exists but is not a valid record.
    #[error("malformed options file: {0}")]
    Format(String),

    /// The store was assembled without a required part.
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

impl From<serde_json::Error> for SettingsError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            SettingsError::Io(err.into())
        } else {
            SettingsError::Format(err.to_string())
        }
    }
}

impl SettingsError {
    pub fn is_format(&self) -> bool {
        matches!(self, SettingsError::Format(_))
    }

    pub fn is_io(&self) -> bool {
        matches!(self, SettingsError::Io(_))
    }
}
