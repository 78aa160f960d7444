//! Compiled-in default bindings and the first-run bootstrap.
//!
//! # Usage
//!
//! ```ignore
//! use keymap::{BindingTable, defaults};
//!
//! let table = BindingTable::new();
//! // Safe before or after loading saved options: a populated table is left alone.
//! defaults::bootstrap(&table);
//! ```

use crate::key_code::KeyCode;
use crate::table::BindingTable;

/// Default action set for on-foot player control.
pub const DEFAULT_BINDINGS: &[(&str, KeyCode)] = &[
    ("Forward", KeyCode::W),
    ("Backward", KeyCode::S),
    ("Left", KeyCode::A),
    ("Right", KeyCode::D),
    ("Jump", KeyCode::Space),
    ("Sprint", KeyCode::LeftShift),
    ("Crouch", KeyCode::LeftControl),
    ("Interact", KeyCode::E),
];

/// Seed `table` with [`DEFAULT_BINDINGS`] if it is still empty.
///
/// Returns `true` if the defaults were inserted.
pub fn bootstrap(table: &BindingTable) -> bool {
    table.bootstrap(DEFAULT_BINDINGS.iter().copied())
}

/// Bind every default action that is absent from `table` to its default
/// code, provided that code is still free. Returns how many were added.
pub fn fill_missing(table: &BindingTable) -> usize {
    table.fill_missing(DEFAULT_BINDINGS.iter().copied())
}
