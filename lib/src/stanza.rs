//! Ordered grouping of thin rows by their stanza column.

use crate::row::ThinRow;
use std::collections::HashMap;

/// An ordered mapping from stanza identifier to its thin-row sequence.
/// Stanzas iterate in insertion order of first appearance, rows in insertion
/// order within each stanza. Duplicate rows are preserved; each is processed
/// independently downstream.
#[derive(Debug, Default, Clone)]
pub struct StanzaStore {
    order: Vec<String>,
    rows: HashMap<String, Vec<ThinRow>>,
}

impl StanzaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = ThinRow>,
    {
        let mut store = Self::new();
        for row in rows {
            store.add_row(row);
        }
        store
    }

    /// Appends the row to the sequence keyed by its stanza column, creating
    /// the sequence if this is the stanza's first row.
    pub fn add_row(&mut self, row: ThinRow) {
        if !self.rows.contains_key(&row.stanza) {
            self.order.push(row.stanza.clone());
        }
        self.rows.entry(row.stanza.clone()).or_default().push(row);
    }

    /// Iterates `(stanza_id, rows)` pairs in first-appearance order.
    /// Restartable and finite.
    pub fn stanzas(&self) -> impl Iterator<Item = (&str, &[ThinRow])> + '_ {
        self.order
            .iter()
            .map(|id| (id.as_str(), self.rows[id].as_slice()))
    }

    pub fn get(&self, stanza: &str) -> Option<&[ThinRow]> {
        self.rows.get(stanza).map(|rows| rows.as_slice())
    }

    /// Number of stanzas.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Total number of thin rows across all stanzas.
    pub fn num_rows(&self) -> usize {
        self.rows.values().map(|rows| rows.len()).sum()
    }
}
