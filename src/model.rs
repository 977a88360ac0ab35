use arboard::Clipboard;
use ratatui::crossterm::event::KeyEvent;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::domain::{HELP_TEXT, InputMode, Message, ViewerConfig, FvError};
use crate::engine::DatasetEngine;
use crate::fields::{FIELDS, FieldId, SortDirection};
use crate::format::DisplayRow;
use crate::inputter::{InputResult, Inputter};
use crate::loader::{self, Source};
use crate::ui::{CMDLINE_HEIGH, COLUMN_WIDTH_MARGIN, TABLE_BORDER_HEIGHT, TABLE_HEADER_HEIGHT};

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    POPUP,
    CMDINPUT,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HeaderCell {
    pub label: String,
    pub width: usize,
    pub sorted: Option<SortDirection>,
}

pub struct UIData {
    pub name: String,
    pub header: Vec<HeaderCell>,
    pub rows: Vec<DisplayRow>, // Only the rows of the current page
    pub nrows: usize,          // Rows in the current view
    pub total: usize,          // Rows loaded
    pub selected_row: usize,
    pub selected_column: usize,
    pub abs_selected_row: usize,
    pub show_popup: bool,
    pub popup_message: String,
    pub layout: UILayout,
    pub last_update: Instant,
    pub cmdinput: InputResult,
    pub cmd_mode: Option<InputMode>,
    pub active_cmdinput: bool,
    pub search_term: String,
    pub status_message: String,
}

impl UIData {
    pub fn empty() -> Self {
        UIData {
            name: String::new(),
            header: Vec::new(),
            rows: Vec::new(),
            nrows: 0,
            total: 0,
            selected_row: 0,
            selected_column: 0,
            abs_selected_row: 0,
            show_popup: false,
            popup_message: String::new(),
            layout: UILayout::default(),
            last_update: Instant::now(),
            cmdinput: InputResult::default(),
            cmd_mode: None,
            active_cmdinput: false,
            search_term: String::new(),
            status_message: String::new(),
        }
    }
}

#[derive(Default, Clone, Debug, PartialEq)]
pub struct UILayout {
    pub width: usize,
    pub height: usize,
    pub table_width: usize,
    pub table_height: usize,
    pub statusline_width: usize,
    pub statusline_height: usize,
}

impl UILayout {
    pub fn from_values(ui_width: usize, ui_height: usize) -> Self {
        let layout = UILayout {
            width: ui_width,
            height: ui_height,
            table_width: ui_width.saturating_sub(2),
            table_height: ui_height
                .saturating_sub(CMDLINE_HEIGH + TABLE_HEADER_HEIGHT + TABLE_BORDER_HEIGHT)
                .max(1),
            statusline_width: ui_width,
            statusline_height: CMDLINE_HEIGH,
        };
        trace!("Build UILayout: {:?}", layout);
        layout
    }
}

pub struct Model {
    name: String,
    config: ViewerConfig,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    engine: DatasetEngine,
    curser_row: usize,
    offset_row: usize,
    curser_column: usize,
    column_widths: Vec<usize>,
    uilayout: UILayout,
    uidata: UIData,
    clipboard: Option<Clipboard>,
    input: Inputter,
    last_input: InputResult,
    active_cmdinput: bool,
    status_message: String,
}

impl Model {
    pub fn init(
        config: &ViewerConfig,
        ui_width: usize,
        ui_height: usize,
        clipboard: Option<Clipboard>,
    ) -> Self {
        let mut model = Self {
            name: String::new(),
            config: config.clone(),
            status: Status::READY,
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            engine: DatasetEngine::new(),
            curser_row: 0,
            offset_row: 0,
            curser_column: 0,
            column_widths: Vec::new(),
            uilayout: UILayout::from_values(ui_width, ui_height),
            uidata: UIData::empty(),
            clipboard,
            input: Inputter::default(),
            last_input: InputResult::default(),
            active_cmdinput: false,
            status_message: "Loading ...".to_string(),
        };
        model.update_table_data();
        model
    }

    /// Loads a source; failures leave an empty table and end up in the
    /// status line.
    pub fn load_source(&mut self, source: &Source) {
        let start_time = Instant::now();
        self.name = source.name();
        let message = match loader::load_into(&mut self.engine, source) {
            Ok(n) => format!(
                "Loaded {n} records in {}ms ...",
                start_time.elapsed().as_millis()
            ),
            Err(e) => format!("Could not load {}: {e}", self.name),
        };
        self.after_load(message);
    }

    pub fn load_value(&mut self, name: &str, data: Value) {
        self.name = name.to_string();
        self.engine.load(data);
        let message = format!("Loaded {} records ...", self.engine.total());
        self.after_load(message);
    }

    fn after_load(&mut self, message: String) {
        self.apply_initial_settings();
        // Widths cover the whole record set and stay put while searching.
        self.calculate_column_widths();
        self.reset_selection();
        self.set_status_message(message);
    }

    fn apply_initial_settings(&mut self) {
        if let Some(field) = self.config.initial_sort.clone() {
            match field.parse::<FieldId>() {
                Ok(id) => self.engine.set_sort(id, SortDirection::Ascending),
                Err(e) => warn!("Unknown sort field {:?}", e.0),
            }
        }
        if let Some(term) = self.config.initial_search.clone() {
            self.engine.search(&term);
            self.input.set(&term);
        }
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    pub fn engine(&self) -> &DatasetEngine {
        &self.engine
    }

    pub fn raw_keyevents(&self) -> bool {
        self.active_cmdinput
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        debug!("Status: {}", self.status_message);
        self.uidata.status_message = self.status_message.clone();
        self.uidata.last_update = Instant::now();
    }

    fn calculate_column_widths(&mut self) {
        let max_width = self.config.max_column_width;
        let mut widths: Vec<usize> = FIELDS
            .iter()
            .map(|f| f.label.chars().count() + 2) // Room for the sort marker
            .collect();
        for row in self.engine.all_rows() {
            for (w, cell) in widths.iter_mut().zip(row.cells()) {
                *w = (*w).max(cell.chars().count());
            }
        }
        self.column_widths = widths
            .into_iter()
            .map(|w| (w + COLUMN_WIDTH_MARGIN).min(max_width))
            .collect();
    }

    fn update_table_data(&mut self) {
        let (sort_field, sort_direction) = self.engine.sort_state();
        if self.column_widths.is_empty() {
            self.calculate_column_widths();
        }

        let rbegin = self.offset_row;
        let rend = rbegin + self.uilayout.table_height;
        trace!(
            "Table: Cr {}, Cc {}, Or {}, Rb {}, Re {}, th {}",
            self.curser_row,
            self.curser_column,
            self.offset_row,
            rbegin,
            rend,
            self.uilayout.table_height
        );

        self.uidata = UIData {
            name: self.name.clone(),
            header: FIELDS
                .iter()
                .zip(self.column_widths.iter())
                .map(|(f, &width)| HeaderCell {
                    label: f.label.to_string(),
                    width,
                    sorted: (f.id == sort_field).then_some(sort_direction),
                })
                .collect(),
            rows: self.engine.rows_in(rbegin, rend),
            nrows: self.engine.len(),
            total: self.engine.total(),
            selected_row: self.curser_row,
            selected_column: self.curser_column,
            abs_selected_row: self.offset_row + self.curser_row,
            show_popup: self.modus == Modus::POPUP,
            popup_message: if self.modus == Modus::POPUP {
                HELP_TEXT.to_string()
            } else {
                String::new()
            },
            layout: self.uilayout.clone(),
            cmdinput: self.last_input.clone(),
            cmd_mode: self.active_cmdinput.then_some(InputMode::Search),
            active_cmdinput: self.active_cmdinput,
            search_term: self.engine.search_term().to_string(),
            last_update: Instant::now(),
            status_message: self.status_message.clone(),
        };
    }

    fn reset_selection(&mut self) {
        self.curser_row = 0;
        self.offset_row = 0;
        self.update_table_data();
    }

    fn ui_resize(&mut self, width: usize, height: usize) {
        trace!(
            "UI was resized! w:{}->{}, h:{}->{}",
            self.uilayout.width, width, self.uilayout.height, height
        );
        self.uilayout = UILayout::from_values(width, height);
        let abs = self.offset_row + self.curser_row;
        self.select_row(abs);
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<(), FvError> {
        if let Some(msg) = message {
            match self.modus {
                Modus::TABLE => match msg {
                    Message::Quit => self.quit(),
                    Message::MoveDown => self.move_selection_down(1),
                    Message::MoveUp => self.move_selection_up(1),
                    Message::MovePageDown => self.move_selection_down(self.uilayout.table_height),
                    Message::MovePageUp => self.move_selection_up(self.uilayout.table_height),
                    Message::MoveBeginning => self.select_row(0),
                    Message::MoveEnd => self.select_row(self.engine.len().saturating_sub(1)),
                    Message::MoveLeft => self.move_column(-1),
                    Message::MoveRight => self.move_column(1),
                    Message::SortSelected | Message::Enter => self.sort_column(self.curser_column),
                    Message::SortColumn(idx) => self.sort_column(idx),
                    Message::Search => self.enter_cmd_mode(),
                    Message::CopyRow => self.copy_table_row(),
                    Message::Help => self.show_help(),
                    Message::Exit => self.clear_search(),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    Message::RawKey(_) => (),
                },
                Modus::POPUP => match msg {
                    Message::Quit => self.quit(),
                    Message::Exit | Message::Enter | Message::Help => self.exit_popup(),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    _ => (),
                },
                Modus::CMDINPUT => match msg {
                    Message::RawKey(key) => self.raw_input(key),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    _ => (),
                },
            }
        }
        Ok(())
    }

    // -------------------- Control handling functions ---------------------- //

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
        self.update_table_data();
    }

    fn exit_popup(&mut self) {
        trace!("Close popup ...");
        self.modus = self.previous_modus;
        self.previous_modus = Modus::POPUP;
        self.update_table_data();
    }

    fn enter_cmd_mode(&mut self) {
        trace!("Entering search mode ...");
        self.previous_modus = self.modus;
        self.modus = Modus::CMDINPUT;
        self.active_cmdinput = true;
        self.input.set(self.engine.search_term());
        self.last_input = self.input.get();
        self.update_table_data();
    }

    fn raw_input(&mut self, key: KeyEvent) {
        self.last_input = self.input.read(key);
        if self.last_input.changed {
            // Filter on every keystroke
            let term = self.last_input.input.clone();
            self.search(&term);
        }
        if self.last_input.finished {
            self.active_cmdinput = false;
            self.modus = self.previous_modus;
            self.previous_modus = Modus::CMDINPUT;
            self.input.clear();
            self.last_input = self.input.get();
            self.update_table_data();
        }
    }

    fn search(&mut self, term: &str) {
        let start_time = Instant::now();
        self.engine.search(term);
        trace!(
            "Search {:?} found {} rows in {}ms",
            term,
            self.engine.len(),
            start_time.elapsed().as_millis()
        );
        if term.is_empty() {
            self.status_message = format!("{} records", self.engine.total());
        } else if self.engine.is_empty() {
            self.status_message = "Found no matches!".to_string();
        } else {
            self.status_message = format!("Found {} results", self.engine.len());
        }
        self.reset_selection();
    }

    fn clear_search(&mut self) {
        if !self.engine.search_term().is_empty() {
            self.search("");
        }
    }

    fn sort_column(&mut self, idx: usize) {
        let Some(field) = FieldId::from_column(idx) else {
            trace!("No column {idx} to sort by");
            return;
        };
        self.engine.sort_by(field);
        self.curser_column = idx;
        let (_, direction) = self.engine.sort_state();
        info!("Sorted by {} {:?}", field.key(), direction);
        self.set_status_message(format!(
            "Sorted by {} {}",
            field.descriptor().label,
            direction.marker()
        ));
        self.reset_selection();
    }

    fn copy_table_row(&mut self) {
        let Some(row) = self
            .engine
            .record_at(self.offset_row + self.curser_row)
            .map(DisplayRow::from_record)
        else {
            return;
        };
        let content = row.to_csv();
        trace!("Row content: {}", content);

        let message = match self.clipboard.as_mut() {
            Some(clipboard) => match clipboard.set_text(content) {
                Ok(_) => "Copied row to clipboard.".to_string(),
                Err(e) => {
                    trace!("Error copying to clipboard: {:?}", e);
                    format!("Error copying to clipboard: {e}")
                }
            },
            None => "Clipboard is not available.".to_string(),
        };
        self.set_status_message(message);
    }

    fn move_column(&mut self, step: i32) {
        let last = FIELDS.len() - 1;
        self.curser_column = if step < 0 {
            self.curser_column.saturating_sub(1)
        } else {
            (self.curser_column + 1).min(last)
        };
        self.update_table_data();
    }

    fn move_selection_up(&mut self, size: usize) {
        let abs = self.offset_row + self.curser_row;
        self.select_row(abs.saturating_sub(size));
    }

    fn move_selection_down(&mut self, size: usize) {
        let abs = self.offset_row + self.curser_row;
        self.select_row(abs + size);
    }

    /// Moves the cursor to an absolute view row, scrolling the page so it
    /// stays visible.
    fn select_row(&mut self, row: usize) {
        let height = self.uilayout.table_height.max(1);
        let row = row.min(self.engine.len().saturating_sub(1));
        if row < self.offset_row {
            self.offset_row = row;
        } else if row >= self.offset_row + height {
            self.offset_row = row + 1 - height;
        }
        self.curser_row = row - self.offset_row;
        self.update_table_data();
    }
}
