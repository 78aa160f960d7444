//! The binding table: the live `action -> code` mapping and the rebind
//! protocol that keeps it free of duplicate codes.
//!
//! The table is created once by the application root and shared behind an
//! `Arc`. All state sits behind one mutex, so [`BindingTable::export`] always
//! observes a consistent snapshot and a commit can never interleave with it.
//!
//! Rebinding is a two-state machine:
//!
//! ```text
//!            begin_rebind(a)                 input (free code / own code)
//!   Idle ───────────────────▶ AwaitingInput(a) ───────────────────────▶ Idle  (committed)
//!     ▲                         │    │  input (code held by another action)
//!     │                         │    └───────────────────────────────▶ Idle  (rejected)
//!     │                         │ begin_rebind(b): a is abandoned, nothing committed
//!     └─────────────────────────┘
//! ```

use crate::binding::{ActionBinding, ActionId};
use crate::input::InputEventSource;
use crate::key_code::KeyCode;
use crossbeam::channel::Receiver;
use indexmap::IndexMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// An opaque identifier of the table contents. Changes whenever a binding is
/// added, replaced or removed.
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub struct TableVersion(usize);

/// Where the rebind protocol currently stands.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RebindState {
    #[default]
    Idle,
    AwaitingInput { target: ActionId },
}

/// Result of feeding one input event to the table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RebindOutcome {
    /// No rebind was pending; the event was not for us.
    Ignored,
    /// `action` now maps to `code`.
    Committed {
        action: ActionId,
        code: KeyCode,
        previous: Option<KeyCode>,
    },
    /// `code` already belongs to `holder`; nothing changed.
    Rejected {
        action: ActionId,
        code: KeyCode,
        holder: ActionId,
    },
}

impl RebindOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, RebindOutcome::Committed { .. })
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, RebindOutcome::Rejected { .. })
    }
}

/// The table flattened into two parallel sequences, as persisted.
///
/// The order is only meaningful within one snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BindingSnapshot {
    pub names: Vec<String>,
    pub values: Vec<String>,
}

impl BindingSnapshot {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Counts of what [`BindingTable::import`] kept and dropped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
}

/// Builder for creating a [`BindingTable`].
#[derive(Default)]
pub struct BindingTableBuilder {
    input_source: Option<Arc<dyn InputEventSource>>,
}

impl BindingTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source the table subscribes to while a rebind is pending.
    pub fn with_input_source(mut self, source: Arc<dyn InputEventSource>) -> Self {
        self.input_source = Some(source);
        self
    }

    pub fn build(self) -> BindingTable {
        BindingTable {
            input_source: self.input_source,
            inner: Mutex::new(TableInner::default()),
        }
    }
}

#[derive(Default)]
struct TableInner {
    bindings: IndexMap<ActionId, KeyCode>,
    state: RebindState,
    // Present only while `state` is `AwaitingInput`.
    listener: Option<Receiver<KeyCode>>,
    version: TableVersion,
}

impl TableInner {
    fn holder_of(&self, code: KeyCode) -> Option<&ActionId> {
        self.bindings
            .iter()
            .find(|(_, bound)| **bound == code)
            .map(|(action, _)| action)
    }

    fn reset_rebind(&mut self) {
        self.state = RebindState::Idle;
        self.listener = None;
    }

    fn bump(&mut self) {
        self.version.0 += 1;
    }
}

/// Mapping from action name to assigned input code.
pub struct BindingTable {
    input_source: Option<Arc<dyn InputEventSource>>,
    inner: Mutex<TableInner>,
}

impl Default for BindingTable {
    fn default() -> Self {
        Self::new()
    }
}

impl BindingTable {
    /// Create an empty table without an input source. Rebinds can still be
    /// driven through [`BindingTable::consume_input_event`].
    pub fn new() -> Self {
        BindingTableBuilder::new().build()
    }

    pub fn builder() -> BindingTableBuilder {
        BindingTableBuilder::new()
    }

    fn lock(&self) -> MutexGuard<'_, TableInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.lock().bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().bindings.is_empty()
    }

    pub fn version(&self) -> TableVersion {
        self.lock().version
    }

    pub fn contains(&self, action: &str) -> bool {
        self.lock().bindings.contains_key(action)
    }

    /// Code currently assigned to `action`.
    pub fn get(&self, action: &str) -> Option<KeyCode> {
        self.lock().bindings.get(action).copied()
    }

    /// Action currently using `code`.
    pub fn action_for(&self, code: KeyCode) -> Option<ActionId> {
        self.lock().holder_of(code).cloned()
    }

    /// Snapshot of all bindings in table order.
    pub fn bindings(&self) -> Vec<ActionBinding> {
        self.lock()
            .bindings
            .iter()
            .map(|(action, code)| ActionBinding {
                action: action.clone(),
                code: *code,
            })
            .collect()
    }

    pub fn state(&self) -> RebindState {
        self.lock().state.clone()
    }

    pub fn is_listening(&self) -> bool {
        matches!(self.lock().state, RebindState::AwaitingInput { .. })
    }

    /// Seed the table with `defaults`, but only if it is still empty.
    ///
    /// Returns `true` when entries were inserted. A default whose code is
    /// already taken by an earlier default is skipped.
    pub fn bootstrap<I, A>(&self, defaults: I) -> bool
    where
        I: IntoIterator<Item = (A, KeyCode)>,
        A: Into<ActionId>,
    {
        let mut inner = self.lock();
        if !inner.bindings.is_empty() {
            debug!(
                bindings = inner.bindings.len(),
                "binding table already populated, bootstrap skipped"
            );
            return false;
        }

        for (action, code) in defaults {
            let action = action.into();
            if let Some(holder) = inner.holder_of(code) {
                warn!(%action, %code, %holder, "default binding collides, skipped");
                continue;
            }
            inner.bindings.entry(action).or_insert(code);
        }
        inner.bump();

        info!(bindings = inner.bindings.len(), "binding table seeded with defaults");
        !inner.bindings.is_empty()
    }

    /// Add every default whose action is missing and whose code is free.
    ///
    /// Unlike [`BindingTable::bootstrap`] this also runs on a populated
    /// table, so an action dropped by [`BindingTable::import`] becomes
    /// bindable again. Existing bindings are never changed. Returns the
    /// number of bindings added.
    pub fn fill_missing<I, A>(&self, defaults: I) -> usize
    where
        I: IntoIterator<Item = (A, KeyCode)>,
        A: Into<ActionId>,
    {
        let mut inner = self.lock();
        let mut added = 0;
        for (action, code) in defaults {
            let action = action.into();
            if inner.bindings.contains_key(&action) {
                continue;
            }
            if let Some(holder) = inner.holder_of(code) {
                warn!(%action, %code, %holder, "default code taken, action left unbound");
                continue;
            }
            info!(%action, %code, "missing action restored to its default");
            inner.bindings.insert(action, code);
            added += 1;
        }
        if added > 0 {
            inner.bump();
        }
        added
    }

    /// Start listening for a new code for `action`.
    ///
    /// Any rebind already pending is abandoned without touching its binding.
    /// Returns `false` (and stays idle) if `action` is not in the table.
    pub fn begin_rebind(&self, action: impl Into<ActionId>) -> bool {
        let action = action.into();
        let mut inner = self.lock();

        if let RebindState::AwaitingInput { target } = &inner.state {
            debug!(abandoned = %target, next = %action, "pending rebind abandoned");
        }
        inner.reset_rebind();

        if !inner.bindings.contains_key(&action) {
            warn!(%action, "rebind requested for unknown action");
            return false;
        }

        inner.listener = self.input_source.as_ref().map(|source| source.subscribe());
        debug!(%action, "awaiting input for rebind");
        inner.state = RebindState::AwaitingInput { target: action };
        true
    }

    /// Feed one discrete input event to the rebind protocol.
    ///
    /// In `Idle` this returns [`RebindOutcome::Ignored`]. Otherwise the table
    /// always returns to `Idle`, either committing the code or rejecting it
    /// because another action already holds it.
    pub fn consume_input_event(&self, code: KeyCode) -> RebindOutcome {
        let mut inner = self.lock();
        Self::consume_locked(&mut inner, code)
    }

    /// Drain events delivered by the input source since the last call.
    ///
    /// Returns the outcome once a pending rebind finishes, `None` otherwise.
    /// Meant to be called from the host's per-frame tick.
    pub fn pump(&self) -> Option<RebindOutcome> {
        let mut inner = self.lock();
        loop {
            let code = inner.listener.as_ref()?.try_recv().ok()?;
            match Self::consume_locked(&mut inner, code) {
                RebindOutcome::Ignored => continue,
                outcome => return Some(outcome),
            }
        }
    }

    fn consume_locked(inner: &mut TableInner, code: KeyCode) -> RebindOutcome {
        let target = match &inner.state {
            RebindState::Idle => return RebindOutcome::Ignored,
            RebindState::AwaitingInput { target } => target.clone(),
        };
        inner.reset_rebind();

        if let Some(holder) = inner.holder_of(code).filter(|holder| **holder != target) {
            let holder = holder.clone();
            debug!(action = %target, %code, %holder, "rebind rejected, code in use");
            return RebindOutcome::Rejected {
                action: target,
                code,
                holder,
            };
        }

        let previous = inner.bindings.insert(target.clone(), code);
        if previous != Some(code) {
            inner.bump();
        }
        info!(action = %target, %code, "rebind committed");
        RebindOutcome::Committed {
            action: target,
            code,
            previous,
        }
    }

    /// Flatten the table into parallel name / value sequences.
    pub fn export(&self) -> BindingSnapshot {
        let inner = self.lock();
        let mut snapshot = BindingSnapshot {
            names: Vec::with_capacity(inner.bindings.len()),
            values: Vec::with_capacity(inner.bindings.len()),
        };
        for (action, code) in &inner.bindings {
            snapshot.names.push(action.to_string());
            snapshot.values.push(code.to_string());
        }
        snapshot
    }

    /// Replace the table contents with `names[i] -> values[i]`.
    ///
    /// Entries that cannot be parsed, repeat an action name, or reuse a code
    /// already imported are skipped and logged; the remaining entries still
    /// load. A pending rebind is cancelled.
    pub fn import<N, V>(&self, names: &[N], values: &[V]) -> ImportReport
    where
        N: AsRef<str>,
        V: AsRef<str>,
    {
        let mut inner = self.lock();
        inner.reset_rebind();
        inner.bindings.clear();

        let mut report = ImportReport::default();
        if names.len() != values.len() {
            warn!(
                names = names.len(),
                values = values.len(),
                "binding name/value counts differ, unpaired entries dropped"
            );
            report.skipped += names.len().abs_diff(values.len());
        }

        for (name, value) in names.iter().zip(values) {
            let (name, value) = (name.as_ref(), value.as_ref());

            let Some(code) = KeyCode::parse(value) else {
                warn!(action = name, value, "unparseable key code, binding skipped");
                report.skipped += 1;
                continue;
            };
            if inner.bindings.contains_key(name) {
                warn!(action = name, "duplicate action in import, binding skipped");
                report.skipped += 1;
                continue;
            }
            if let Some(holder) = inner.holder_of(code) {
                warn!(action = name, %code, %holder, "code already bound, binding skipped");
                report.skipped += 1;
                continue;
            }

            inner.bindings.insert(ActionId::from(name), code);
            report.imported += 1;
        }
        inner.bump();

        info!(
            imported = report.imported,
            skipped = report.skipped,
            "bindings imported"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputBus;
    use std::collections::HashSet;

    fn seeded() -> BindingTable {
        let table = BindingTable::new();
        table.bootstrap([
            ("Forward", KeyCode::W),
            ("Jump", KeyCode::Space),
            ("Crouch", KeyCode::LeftControl),
        ]);
        table
    }

    fn assert_codes_unique(table: &BindingTable) {
        let bindings = table.bindings();
        let codes: HashSet<_> = bindings.iter().map(|b| b.code).collect();
        assert_eq!(codes.len(), bindings.len(), "duplicate code in {bindings:?}");
    }

    #[test]
    fn bootstrap_fills_empty_table_once() {
        let table = BindingTable::new();
        assert!(table.bootstrap([("Jump", KeyCode::Space)]));
        assert!(!table.bootstrap([("Jump", KeyCode::J), ("Fire", KeyCode::Mouse0)]));

        assert_eq!(table.len(), 1);
        assert_eq!(table.get("Jump"), Some(KeyCode::Space));
        assert!(!table.contains("Fire"));
    }

    #[test]
    fn bootstrap_skips_colliding_defaults() {
        let table = BindingTable::new();
        table.bootstrap([("Jump", KeyCode::Space), ("Dash", KeyCode::Space)]);

        assert_eq!(table.len(), 1);
        assert_eq!(table.action_for(KeyCode::Space).unwrap().as_str(), "Jump");
    }

    #[test]
    fn fill_missing_restores_dropped_actions_only() {
        let table = BindingTable::new();
        let report = table.import(&["Forward", "Jump", "Crouch"], &["W", "Spacebar", "C"]);
        assert_eq!(report.skipped, 1);
        assert!(!table.begin_rebind("Jump"));
        let before = table.version();

        let added = table.fill_missing([
            ("Forward", KeyCode::UpArrow),
            ("Jump", KeyCode::Space),
            ("Crouch", KeyCode::LeftControl),
        ]);

        assert_eq!(added, 1);
        assert_ne!(table.version(), before);
        assert_eq!(table.get("Forward"), Some(KeyCode::W));
        assert_eq!(table.get("Jump"), Some(KeyCode::Space));
        assert_eq!(table.get("Crouch"), Some(KeyCode::C));
        assert!(table.begin_rebind("Jump"));
    }

    #[test]
    fn fill_missing_leaves_action_unbound_when_default_is_taken() {
        let table = BindingTable::new();
        table.import(&["Forward"], &["Space"]);
        let before = table.version();

        assert_eq!(table.fill_missing([("Jump", KeyCode::Space)]), 0);
        assert!(!table.contains("Jump"));
        assert_eq!(table.version(), before);
        assert_codes_unique(&table);
    }

    #[test]
    fn rebind_commits_free_code() {
        let table = seeded();
        assert!(table.begin_rebind("Jump"));
        assert!(table.is_listening());

        let outcome = table.consume_input_event(KeyCode::J);
        assert_eq!(
            outcome,
            RebindOutcome::Committed {
                action: ActionId::from("Jump"),
                code: KeyCode::J,
                previous: Some(KeyCode::Space),
            }
        );
        assert_eq!(table.get("Jump"), Some(KeyCode::J));
        assert_eq!(table.state(), RebindState::Idle);
    }

    #[test]
    fn rebind_to_code_of_other_action_is_rejected_and_resets() {
        let table = seeded();
        table.begin_rebind("Jump");

        let outcome = table.consume_input_event(KeyCode::W);
        assert!(outcome.is_rejected());
        assert_eq!(
            outcome,
            RebindOutcome::Rejected {
                action: ActionId::from("Jump"),
                code: KeyCode::W,
                holder: ActionId::from("Forward"),
            }
        );

        // Neither side moved, and the table stopped listening.
        assert_eq!(table.get("Jump"), Some(KeyCode::Space));
        assert_eq!(table.get("Forward"), Some(KeyCode::W));
        assert_eq!(table.state(), RebindState::Idle);

        // A follow-up press is no longer treated as a rebind attempt.
        assert_eq!(table.consume_input_event(KeyCode::K), RebindOutcome::Ignored);
        assert_eq!(table.get("Jump"), Some(KeyCode::Space));
    }

    #[test]
    fn rebind_to_own_code_commits_without_version_change() {
        let table = seeded();
        let before = table.version();
        table.begin_rebind("Jump");

        assert!(table.consume_input_event(KeyCode::Space).is_committed());
        assert_eq!(table.version(), before);
    }

    #[test]
    fn starting_new_rebind_abandons_previous() {
        let table = seeded();
        table.begin_rebind("Jump");
        table.begin_rebind("Crouch");

        assert_eq!(
            table.state(),
            RebindState::AwaitingInput {
                target: ActionId::from("Crouch")
            }
        );
        table.consume_input_event(KeyCode::C);

        assert_eq!(table.get("Jump"), Some(KeyCode::Space));
        assert_eq!(table.get("Crouch"), Some(KeyCode::C));
    }

    #[test]
    fn unknown_action_abandons_and_stays_idle() {
        let table = seeded();
        table.begin_rebind("Jump");
        assert!(!table.begin_rebind("Fly"));

        assert_eq!(table.state(), RebindState::Idle);
        assert_eq!(table.consume_input_event(KeyCode::F), RebindOutcome::Ignored);
        assert!(!table.contains("Fly"));
    }

    #[test]
    fn idle_table_ignores_input() {
        let table = seeded();
        let before = table.bindings();
        assert_eq!(table.consume_input_event(KeyCode::Q), RebindOutcome::Ignored);
        assert_eq!(table.bindings(), before);
    }

    #[test]
    fn codes_stay_unique_across_rebind_sequences() {
        let table = seeded();
        let script = [
            ("Jump", KeyCode::W),
            ("Forward", KeyCode::Space),
            ("Forward", KeyCode::Q),
            ("Jump", KeyCode::W),
            ("Crouch", KeyCode::Q),
            ("Crouch", KeyCode::C),
            ("Forward", KeyCode::C),
        ];
        for (action, code) in script {
            table.begin_rebind(action);
            table.consume_input_event(code);
            assert_codes_unique(&table);
        }
        assert_eq!(table.get("Forward"), Some(KeyCode::Q));
        assert_eq!(table.get("Jump"), Some(KeyCode::W));
        assert_eq!(table.get("Crouch"), Some(KeyCode::C));
    }

    #[test]
    fn pump_consumes_published_events_and_unsubscribes() {
        let bus = Arc::new(InputBus::new());
        let table = BindingTable::builder()
            .with_input_source(bus.clone())
            .build();
        table.bootstrap([("Jump", KeyCode::Space), ("Forward", KeyCode::W)]);

        // Nothing is listening before a rebind starts.
        assert_eq!(bus.publish(KeyCode::J), 0);
        assert_eq!(table.pump(), None);

        table.begin_rebind("Jump");
        assert_eq!(bus.publish(KeyCode::J), 1);
        let outcome = table.pump().unwrap();
        assert!(outcome.is_committed());
        assert_eq!(table.get("Jump"), Some(KeyCode::J));

        // The subscription went away with the commit.
        assert_eq!(bus.publish(KeyCode::K), 0);
        assert_eq!(table.pump(), None);
    }

    #[test]
    fn abandoned_rebind_drops_its_subscription() {
        let bus = Arc::new(InputBus::new());
        let table = BindingTable::builder()
            .with_input_source(bus.clone())
            .build();
        table.bootstrap([("Jump", KeyCode::Space), ("Forward", KeyCode::W)]);

        table.begin_rebind("Jump");
        table.begin_rebind("Forward");

        // Only the second rebind is still subscribed.
        assert_eq!(bus.publish(KeyCode::Q), 1);
        assert_eq!(
            table.pump(),
            Some(RebindOutcome::Committed {
                action: ActionId::from("Forward"),
                code: KeyCode::Q,
                previous: Some(KeyCode::W),
            })
        );
        assert_eq!(table.get("Jump"), Some(KeyCode::Space));
    }

    #[test]
    fn export_produces_parallel_sequences() {
        let table = seeded();
        let snapshot = table.export();

        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.names.len(), snapshot.values.len());
        for (name, value) in snapshot.names.iter().zip(&snapshot.values) {
            assert_eq!(table.get(name).unwrap().to_string(), *value);
        }
    }

    #[test]
    fn import_replaces_contents_and_skips_bad_entries() {
        let table = seeded();
        let report = table.import(
            &["Forward", "Jump", "Jump", "Dash", "Fire"],
            &["Z", "NotAKey", "J", "Z", "Mouse0"],
        );

        assert_eq!(report, ImportReport { imported: 3, skipped: 2 });
        assert_eq!(table.get("Forward"), Some(KeyCode::Z));
        assert_eq!(table.get("Jump"), Some(KeyCode::J));
        assert_eq!(table.get("Fire"), Some(KeyCode::Mouse0));
        assert!(!table.contains("Dash"));
        assert!(!table.contains("Crouch"));
        assert_codes_unique(&table);
    }

    #[test]
    fn import_cancels_pending_rebind() {
        let table = seeded();
        table.begin_rebind("Jump");
        table.import(&["Jump"], &["Space"]);

        assert_eq!(table.state(), RebindState::Idle);
        assert_eq!(table.consume_input_event(KeyCode::J), RebindOutcome::Ignored);
    }

    #[test]
    fn import_of_export_restores_table() {
        let table = seeded();
        table.begin_rebind("Crouch");
        table.consume_input_event(KeyCode::C);
        let snapshot = table.export();

        let restored = BindingTable::new();
        let report = restored.import(&snapshot.names, &snapshot.values);
        assert_eq!(report.skipped, 0);
        assert_eq!(restored.bindings(), table.bindings());
    }
}
