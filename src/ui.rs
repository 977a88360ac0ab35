use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};
use std::time::Instant;
use tracing::trace;

use crate::domain::{NO_DATA, ViewerConfig};
use crate::model::{Model, UIData};

pub const CMDLINE_HEIGH: usize = 3;
pub const TABLE_HEADER_HEIGHT: usize = 2;
pub const TABLE_BORDER_HEIGHT: usize = 2;
pub const COLUMN_WIDTH_MARGIN: usize = 1;

const POPUP_WIDTH: u16 = 60;
const POPUP_HEIGHT: u16 = 18;

#[derive(Debug)]
pub struct TableUI {
    max_column_width: usize,
    last_draw: Instant,
}

impl TableUI {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            max_column_width: config.max_column_width,
            last_draw: Instant::now(),
        }
    }

    pub fn draw(&mut self, model: &Model, frame: &mut Frame) {
        let uidata = model.get_uidata();
        let [table_area, status_area] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(CMDLINE_HEIGH as u16),
        ])
        .areas(frame.area());

        self.render_table(uidata, frame, table_area);
        self.render_statusline(uidata, frame, status_area);
        if uidata.show_popup {
            Self::render_popup(&uidata.popup_message, frame);
        }

        trace!(
            "Drew {} rows, {}ms since last draw",
            uidata.rows.len(),
            self.last_draw.elapsed().as_millis()
        );
        self.last_draw = Instant::now();
    }

    fn render_table(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let header = Row::new(uidata.header.iter().enumerate().map(|(idx, h)| {
            let label = match h.sorted {
                Some(direction) => format!("{} {}", h.label, direction.marker()),
                None => h.label.clone(),
            };
            let style = if idx == uidata.selected_column {
                Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            Cell::from(label).style(style)
        }))
        .bottom_margin(1);

        let widths: Vec<Constraint> = uidata
            .header
            .iter()
            .map(|h| Constraint::Length(h.width.min(self.max_column_width) as u16))
            .collect();

        let rows: Vec<Row> = if uidata.rows.is_empty() {
            vec![Row::new(vec![Cell::from(NO_DATA.italic())])]
        } else {
            uidata
                .rows
                .iter()
                .map(|r| Row::new(r.cells().map(|c| Cell::from(c.to_string()))))
                .collect()
        };

        let title = Line::from(vec![
            " ".into(),
            uidata.name.clone().bold(),
            format!(" [{}/{}] ", uidata.nrows, uidata.total).into(),
        ]);
        let block = Block::bordered()
            .title(title.centered())
            .border_set(border::THICK);

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .column_spacing(1)
            .row_highlight_style(Style::default().bg(Color::DarkGray));

        let mut state = TableState::default();
        if !uidata.rows.is_empty() {
            state.select(Some(uidata.selected_row));
        }
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn render_statusline(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let block = Block::bordered();
        if uidata.active_cmdinput {
            let line = Line::from(vec!["/".blue().bold(), Span::raw(&uidata.cmdinput.input)]);
            frame.render_widget(Paragraph::new(line).block(block), area);
            // Inside the border, after the "/" prompt
            let x = area.x + 2 + uidata.cmdinput.curser_pos as u16;
            frame.set_cursor_position(Position::new(x.min(area.right().saturating_sub(2)), area.y + 1));
        } else {
            let mut spans = vec![Span::raw(uidata.status_message.clone())];
            if !uidata.search_term.is_empty() {
                spans.push(" | search: ".into());
                spans.push(uidata.search_term.clone().yellow());
            }
            spans.push(" | ".into());
            spans.push("?".blue().bold());
            spans.push(" help ".into());
            spans.push("q".blue().bold());
            spans.push(" quit".into());
            frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
        }
    }

    fn render_popup(message: &str, frame: &mut Frame) {
        let area = frame.area();
        let width = POPUP_WIDTH.min(area.width);
        let height = POPUP_HEIGHT.min(area.height);
        let popup = Rect {
            x: area.x + (area.width - width) / 2,
            y: area.y + (area.height - height) / 2,
            width,
            height,
        };
        let block = Block::bordered()
            .title(Line::from(" Help ".bold()).centered())
            .border_set(border::THICK);
        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(message).block(block).wrap(Wrap { trim: false }),
            popup,
        );
    }
}
