//! Action-to-input bindings for player controls.
//!
//! The crate owns the live [`BindingTable`], the rebind protocol that keeps
//! every input code assigned to at most one action, the input-event plumbing
//! the table listens on while a rebind is pending, and the compiled-in
//! defaults used on first run. Persisting the table is left to the
//! `settings` crate, which only sees the [`BindingSnapshot`] form.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use keymap::{BindingTable, InputBus, KeyCode, defaults};
//!
//! let bus = Arc::new(InputBus::new());
//! let table = BindingTable::builder().with_input_source(bus.clone()).build();
//! defaults::bootstrap(&table);
//!
//! table.begin_rebind("Jump");
//! bus.publish(KeyCode::J);
//! let outcome = table.pump();
//! ```

pub mod binding;
pub mod defaults;
pub mod input;
pub mod key_code;
pub mod table;

// Re-export main types
pub use binding::{ActionBinding, ActionId};
pub use input::{InputBus, InputEventSource};
pub use key_code::KeyCode;
pub use table::{
    BindingSnapshot, BindingTable, BindingTableBuilder, ImportReport, RebindOutcome, RebindState,
    TableVersion,
};
