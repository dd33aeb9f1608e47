use runtime::Event;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::event::{SelectedObject, SelectionAction, SelectionEvent};

/// A typed selection item; `kind` tells features which entries are theirs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionEntry<T> {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: T,
}

impl<T> SelectionEntry<T> {
    pub fn new(kind: impl Into<String>, value: T) -> Self {
        Self {
            kind: kind.into(),
            value,
        }
    }
}

/// A feature that turns picked objects into its own selection entries.
pub trait SelectionResponder<T> {
    /// Classification tag stamped on entries this responder creates.
    fn kind(&self) -> &str;

    /// Converts a picked object, or `None` if this feature ignores it.
    fn convert(&self, object: &SelectedObject) -> Option<T>;

    /// Whether an existing entry belongs to this responder, i.e. whether a
    /// replace from this responder may evict it.
    fn should_respond(&self, entry: &SelectionEntry<T>) -> bool {
        entry.kind == self.kind()
    }
}

/// Current selection, shared by every feature.
///
/// Invariants:
/// - No two entries are equal (kind and value).
/// - A replace only evicts entries the acting responder claims.
///
/// `changed` fires after every mutation that altered the collection.
pub struct SelectionStore<T: 'static> {
    entries: Vec<SelectionEntry<T>>,
    pub changed: Event<[SelectionEntry<T>]>,
}

impl<T: 'static> Default for SelectionStore<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            changed: Event::new(),
        }
    }
}

impl<T: Clone + PartialEq + 'static> SelectionStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[SelectionEntry<T>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries claimed by `responder`, in selection order.
    pub fn entries_for<'a>(
        &'a self,
        responder: &'a dyn SelectionResponder<T>,
    ) -> impl Iterator<Item = &'a SelectionEntry<T>> + 'a {
        self.entries.iter().filter(|e| responder.should_respond(e))
    }

    /// Applies a committed event on behalf of `responder`.
    pub fn apply(&mut self, responder: &dyn SelectionResponder<T>, event: &SelectionEvent) {
        let values = event
            .objects()
            .iter()
            .filter_map(|o| responder.convert(o))
            .collect::<Vec<_>>();
        trace!(
            kind = responder.kind(),
            action = ?event.action(),
            values = values.len(),
            "applying selection event"
        );
        match event.action() {
            SelectionAction::Replace => self.replace(responder, values),
            SelectionAction::Add => self.add(responder, values),
            SelectionAction::Remove => self.remove(responder, values),
        }
    }

    pub fn replace(&mut self, responder: &dyn SelectionResponder<T>, values: Vec<T>) {
        let before = self.entries.len();
        self.entries.retain(|e| !responder.should_respond(e));
        let evicted = before != self.entries.len();
        let inserted = self.insert_missing(responder.kind(), values);
        if evicted || inserted {
            self.notify();
        }
    }

    /// Appends values not already selected; equality is by value.
    pub fn add(&mut self, responder: &dyn SelectionResponder<T>, values: Vec<T>) {
        if self.insert_missing(responder.kind(), values) {
            self.notify();
        }
    }

    pub fn remove(&mut self, responder: &dyn SelectionResponder<T>, values: Vec<T>) {
        let before = self.entries.len();
        self.entries
            .retain(|e| !(responder.should_respond(e) && values.contains(&e.value)));
        if before != self.entries.len() {
            self.notify();
        }
    }

    pub fn clear(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        self.entries.clear();
        self.notify();
    }

    fn insert_missing(&mut self, kind: &str, values: Vec<T>) -> bool {
        let mut inserted = false;
        for value in values {
            let exists = self
                .entries
                .iter()
                .any(|e| e.kind == kind && e.value == value);
            if exists {
                continue;
            }
            self.entries.push(SelectionEntry::new(kind, value));
            inserted = true;
        }
        inserted
    }

    fn notify(&mut self) {
        self.changed.dispatch(&self.entries);
    }
}
