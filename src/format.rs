use crate::domain::NOT_AVAILABLE;
use crate::record::{Metric, Record, TOTAL_RECEIPTS};

/// Formats an amount as en-US dollars with two decimals, e.g. `$1,234.50`.
pub fn format_currency(value: Option<f64>) -> String {
    let Some(v) = value.filter(|v| v.is_finite()) else {
        return NOT_AVAILABLE.to_string();
    };
    let fixed = format!("{:.2}", v.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    // Rounding can turn -0.004 into "0.00", which should not carry a sign.
    let sign = if v < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}${}.{cents}", group_thousands(whole))
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, chr) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(chr);
    }
    out
}

/// `N/A` for a missing metric, otherwise the amount followed by its rank.
pub fn format_metric(metric: Option<&Metric>) -> String {
    match metric {
        None => NOT_AVAILABLE.to_string(),
        Some(m) => {
            let rank = m
                .rank
                .map(|r| r.to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string());
            format!("{} (Rank: {rank})", format_currency(m.value))
        }
    }
}

/// One table row, already formatted for display.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRow {
    pub name: String,
    pub role: String,
    pub state: String,
    pub party: String,
    pub current_receipts: String,
    pub career_receipts: String,
}

impl DisplayRow {
    pub fn from_record(record: &Record) -> Self {
        let or_na = |s: &Option<String>| s.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let name = if record.name.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            record.name.clone()
        };
        DisplayRow {
            name,
            role: or_na(&record.role),
            state: or_na(&record.state),
            party: or_na(&record.party),
            current_receipts: format_metric(record.current(TOTAL_RECEIPTS)),
            career_receipts: format_metric(record.career(TOTAL_RECEIPTS)),
        }
    }

    /// Cells in display column order.
    pub fn cells(&self) -> [&str; 6] {
        [
            &self.name,
            &self.role,
            &self.state,
            &self.party,
            &self.current_receipts,
            &self.career_receipts,
        ]
    }

    /// The row as one csv line, quoting cells that need it.
    pub fn to_csv(&self) -> String {
        self.cells()
            .iter()
            .map(|c| wrap_cell_content(c))
            .collect::<Vec<String>>()
            .join(",")
    }
}

fn wrap_cell_content(c: &str) -> String {
    let needs_escaping = c.contains('"');
    let needs_wrapping = needs_escaping || c.chars().any(|c| c == ' ' || c == '\t' || c == ',');
    let out = if needs_escaping {
        c.replace('"', "\"\"")
    } else {
        c.to_string()
    };
    if needs_wrapping { format!("\"{out}\"") } else { out }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_has_two_decimals_and_grouping() {
        assert_eq!(format_currency(Some(100.0)), "$100.00");
        assert_eq!(format_currency(Some(0.0)), "$0.00");
        assert_eq!(format_currency(Some(1234.5)), "$1,234.50");
        assert_eq!(format_currency(Some(1234567.891)), "$1,234,567.89");
        assert_eq!(format_currency(Some(999.999)), "$1,000.00");
        assert_eq!(format_currency(Some(-42.1)), "-$42.10");
        assert_eq!(format_currency(Some(-0.001)), "$0.00");
    }

    #[test]
    fn missing_currency_is_na() {
        assert_eq!(format_currency(None), "N/A");
        assert_eq!(format_currency(Some(f64::NAN)), "N/A");
    }

    #[test]
    fn metric_with_and_without_rank() {
        let m = Metric {
            value: Some(100.0),
            rank: Some(3),
        };
        assert_eq!(format_metric(Some(&m)), "$100.00 (Rank: 3)");
        let m = Metric {
            value: Some(5.0),
            rank: None,
        };
        assert_eq!(format_metric(Some(&m)), "$5.00 (Rank: N/A)");
        assert_eq!(format_metric(Some(&Metric::default())), "N/A (Rank: N/A)");
        assert_eq!(format_metric(None), "N/A");
    }

    #[test]
    fn row_uses_placeholders() {
        let row = DisplayRow::from_record(&Record::new("Ann"));
        assert_eq!(row.cells(), ["Ann", "N/A", "N/A", "N/A", "N/A", "N/A"]);
    }

    #[test]
    fn csv_quotes_cells() {
        let mut r = Record::new("Smith, \"Bob\"");
        r.state = Some("OH".into());
        let row = DisplayRow::from_record(&r);
        assert_eq!(row.to_csv(), "\"Smith, \"\"Bob\"\"\",N/A,OH,N/A,N/A,N/A");
    }
}
