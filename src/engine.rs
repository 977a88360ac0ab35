//! The dataset engine: owns the loaded records and the filtered, sorted view
//! that is shown to the user.
//!
//! The view is a mapping of view position to record index, rebuilt in full
//! on every `load`, `search` and `sort`.

use std::sync::Arc;

use rayon::prelude::*;
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::fields::{FieldId, SortDirection};
use crate::format::DisplayRow;
use crate::record::Record;

/// Receives the formatted rows every time the view is recomputed. An empty
/// slice means there is nothing to show.
pub trait ViewSink {
    fn render(&mut self, rows: &[DisplayRow]);
}

pub struct DatasetEngine {
    records: Vec<Record>,
    view: Arc<Vec<usize>>,
    sort_field: FieldId,
    sort_direction: SortDirection,
    search_term: String,
    sinks: Vec<Box<dyn ViewSink>>,
}

impl Default for DatasetEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetEngine {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            view: Arc::new(Vec::new()),
            sort_field: FieldId::Name,
            sort_direction: SortDirection::Ascending,
            search_term: String::new(),
            sinks: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, sink: Box<dyn ViewSink>) {
        self.sinks.push(sink);
    }

    /// Replaces the record set from raw json. Anything but an array loads as
    /// empty, and array elements that are not json objects are skipped.
    pub fn load(&mut self, data: Value) {
        let records = match data {
            Value::Array(items) => {
                let total = items.len();
                let records: Vec<Record> = items
                    .into_iter()
                    .enumerate()
                    .filter_map(|(idx, item)| match serde_json::from_value::<Record>(item) {
                        Ok(r) => Some(r),
                        Err(e) => {
                            warn!("Skipping record {idx}: {e}");
                            None
                        }
                    })
                    .collect();
                debug!("Parsed {} of {} records", records.len(), total);
                records
            }
            other => {
                warn!("Expected a json array, got {}", json_kind(&other));
                Vec::new()
            }
        };
        self.load_records(records);
    }

    pub fn load_records(&mut self, records: Vec<Record>) {
        self.records = records;
        self.search_term.clear();
        self.refresh();
    }

    /// Keeps the records whose name contains `term`, ignoring case.
    pub fn search(&mut self, term: &str) {
        self.search_term = term.to_string();
        self.refresh();
    }

    /// Sorts by the field with the given key. Unknown keys leave everything
    /// untouched and return `false`.
    pub fn sort(&mut self, field: &str) -> bool {
        match field.parse::<FieldId>() {
            Ok(id) => {
                self.sort_by(id);
                true
            }
            Err(e) => {
                debug!("Ignoring sort on unknown field {:?}", e.0);
                false
            }
        }
    }

    /// Selecting the active field flips the direction, any other field
    /// starts ascending.
    pub fn sort_by(&mut self, field: FieldId) {
        if field == self.sort_field {
            self.sort_direction = self.sort_direction.flip();
        } else {
            self.sort_field = field;
            self.sort_direction = SortDirection::Ascending;
        }
        self.refresh();
    }

    /// Sets the sort outright, without the toggle a repeated `sort_by` does.
    pub fn set_sort(&mut self, field: FieldId, direction: SortDirection) {
        self.sort_field = field;
        self.sort_direction = direction;
        self.refresh();
    }

    pub fn current_view(&self) -> Vec<&Record> {
        self.view.iter().map(|&idx| &self.records[idx]).collect()
    }

    pub fn record_at(&self, view_idx: usize) -> Option<&Record> {
        self.view.get(view_idx).map(|&idx| &self.records[idx])
    }

    pub fn rows(&self) -> Vec<DisplayRow> {
        self.view
            .iter()
            .map(|&idx| DisplayRow::from_record(&self.records[idx]))
            .collect()
    }

    /// Formatted rows for every loaded record, ignoring the search.
    pub fn all_rows(&self) -> Vec<DisplayRow> {
        self.records.iter().map(DisplayRow::from_record).collect()
    }

    /// Formatted rows for a window of the view.
    pub fn rows_in(&self, begin: usize, end: usize) -> Vec<DisplayRow> {
        let end = end.min(self.view.len());
        let begin = begin.min(end);
        self.view[begin..end]
            .iter()
            .map(|&idx| DisplayRow::from_record(&self.records[idx]))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.view.len()
    }

    pub fn is_empty(&self) -> bool {
        self.view.is_empty()
    }

    pub fn total(&self) -> usize {
        self.records.len()
    }

    pub fn sort_state(&self) -> (FieldId, SortDirection) {
        (self.sort_field, self.sort_direction)
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    fn refresh(&mut self) {
        let needle = self.search_term.to_lowercase();
        let records = &self.records;

        // Filter first so the sort only ever sees the visible subset.
        let mut rows: Vec<usize> = if needle.is_empty() {
            (0..records.len()).collect()
        } else {
            (0..records.len())
                .into_par_iter()
                .filter(|&idx| records[idx].name.to_lowercase().contains(&needle))
                .collect()
        };

        // `sort_by` is stable, and the reversed comparator keeps ties in
        // load order for descending sorts too.
        let field = self.sort_field.descriptor();
        let direction = self.sort_direction;
        rows.sort_by(|&a, &b| direction.apply(field.compare(&records[a], &records[b])));

        trace!(
            "View: {} of {} rows, search {:?}, sort {:?} {:?}",
            rows.len(),
            records.len(),
            self.search_term,
            self.sort_field,
            self.sort_direction
        );
        self.view = Arc::new(rows);
        self.notify();
    }

    fn notify(&mut self) {
        if self.sinks.is_empty() {
            return;
        }
        let rows = self.rows();
        for sink in self.sinks.iter_mut() {
            sink.render(&rows);
        }
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
