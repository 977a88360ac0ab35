use std::io::Write;

use tracing::error;

use crate::domain::NO_DATA;
use crate::engine::ViewSink;
use crate::fields::FIELDS;
use crate::format::DisplayRow;

/// Writes every view it receives as an aligned plain-text table.
pub struct TextSink<W: Write> {
    out: W,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn write_table(&mut self, rows: &[DisplayRow]) -> std::io::Result<()> {
        let mut widths: Vec<usize> = FIELDS.iter().map(|f| f.label.chars().count()).collect();
        for row in rows {
            for (w, cell) in widths.iter_mut().zip(row.cells()) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let header: Vec<&str> = FIELDS.iter().map(|f| f.label).collect();
        self.write_line(&header, &widths)?;
        if rows.is_empty() {
            writeln!(self.out, "{NO_DATA}")?;
        }
        for row in rows {
            self.write_line(&row.cells(), &widths)?;
        }
        self.out.flush()
    }

    fn write_line(&mut self, cells: &[&str], widths: &[usize]) -> std::io::Result<()> {
        let line = cells
            .iter()
            .zip(widths)
            .map(|(c, &w)| format!("{c:<w$}"))
            .collect::<Vec<String>>()
            .join("  ");
        writeln!(self.out, "{}", line.trim_end())
    }
}

impl<W: Write> ViewSink for TextSink<W> {
    fn render(&mut self, rows: &[DisplayRow]) {
        if let Err(e) = self.write_table(rows) {
            error!("Could not write table: {e}");
        }
    }
}
