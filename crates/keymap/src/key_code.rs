//! Input codes that can be assigned to actions.
//!
//! Codes are stored as their symbolic name (`"W"`, `"Space"`, `"LeftShift"`,
//! `"Mouse0"`), which is also what ends up in the options file. Parsing is
//! case-sensitive and accepts exactly the names produced by `Display`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// A discrete keyboard key or mouse button.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
pub enum KeyCode {
    // Letters
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,

    // Number row
    Alpha0,
    Alpha1,
    Alpha2,
    Alpha3,
    Alpha4,
    Alpha5,
    Alpha6,
    Alpha7,
    Alpha8,
    Alpha9,

    // Function keys
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,

    // Navigation / editing
    Space,
    Return,
    Escape,
    Tab,
    Backspace,
    Delete,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    UpArrow,
    DownArrow,
    LeftArrow,
    RightArrow,

    // Modifiers
    LeftShift,
    RightShift,
    LeftControl,
    RightControl,
    LeftAlt,
    RightAlt,
    CapsLock,

    // Mouse buttons
    Mouse0,
    Mouse1,
    Mouse2,
    Mouse3,
    Mouse4,
    Mouse5,
    Mouse6,
}

impl KeyCode {
    /// Parse a code from its symbolic name. Returns `None` for unknown names.
    pub fn parse(name: &str) -> Option<Self> {
        KeyCode::from_str(name).ok()
    }

    /// The symbolic name used in the options file.
    pub fn name(self) -> &'static str {
        self.into()
    }
}

impl Serialize for KeyCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for KeyCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        KeyCode::parse(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown key code: {value}")))
    }
}
