//! Column descriptors: which part of a [`Record`] a column shows and how
//! it compares.

use std::cmp::Ordering;
use std::str::FromStr;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::record::{Record, TOTAL_RECEIPTS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    Name,
    Role,
    State,
    Party,
    CurrentReceipts,
    CareerReceipts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flip(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn apply(self, ord: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }

    pub fn marker(self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

/// Value a field resolves to for one record. `None` means missing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(Option<&'a str>),
    Number(Option<f64>),
}

pub struct FieldDescriptor {
    pub id: FieldId,
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    accessor: fn(&Record) -> FieldValue<'_>,
}

impl FieldDescriptor {
    pub fn value<'a>(&self, record: &'a Record) -> FieldValue<'a> {
        (self.accessor)(record)
    }

    /// Compares two records ascending. Missing text compares as `""`,
    /// missing or non-finite numbers as `0`.
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        match self.kind {
            FieldKind::Number => self
                .number(a)
                .partial_cmp(&self.number(b))
                .unwrap_or(Ordering::Equal),
            FieldKind::String => collate(self.text(a), self.text(b)),
        }
    }

    fn number(&self, record: &Record) -> f64 {
        match self.value(record) {
            FieldValue::Number(Some(v)) if v.is_finite() => v,
            _ => 0.0,
        }
    }

    fn text<'a>(&self, record: &'a Record) -> &'a str {
        match self.value(record) {
            FieldValue::Text(Some(s)) => s,
            _ => "",
        }
    }
}

/// Case-insensitive order that sorts accented letters next to their base
/// letter. Accents only break ties between otherwise equal strings, case
/// never does.
pub fn collate(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(&base_letters(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
}

fn base_letters(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

fn name_of(r: &Record) -> FieldValue<'_> {
    FieldValue::Text(Some(r.name.as_str()))
}

fn role_of(r: &Record) -> FieldValue<'_> {
    FieldValue::Text(r.role.as_deref())
}

fn state_of(r: &Record) -> FieldValue<'_> {
    FieldValue::Text(r.state.as_deref())
}

fn party_of(r: &Record) -> FieldValue<'_> {
    FieldValue::Text(r.party.as_deref())
}

fn current_receipts_of(r: &Record) -> FieldValue<'_> {
    FieldValue::Number(r.current(TOTAL_RECEIPTS).and_then(|m| m.value))
}

fn career_receipts_of(r: &Record) -> FieldValue<'_> {
    FieldValue::Number(r.career(TOTAL_RECEIPTS).and_then(|m| m.value))
}

pub static FIELDS: [FieldDescriptor; 6] = [
    FieldDescriptor {
        id: FieldId::Name,
        key: "name",
        label: "Name",
        kind: FieldKind::String,
        accessor: name_of,
    },
    FieldDescriptor {
        id: FieldId::Role,
        key: "role",
        label: "Role",
        kind: FieldKind::String,
        accessor: role_of,
    },
    FieldDescriptor {
        id: FieldId::State,
        key: "state",
        label: "State",
        kind: FieldKind::String,
        accessor: state_of,
    },
    FieldDescriptor {
        id: FieldId::Party,
        key: "party",
        label: "Party",
        kind: FieldKind::String,
        accessor: party_of,
    },
    FieldDescriptor {
        id: FieldId::CurrentReceipts,
        key: "currentReceipts",
        label: "Current Receipts",
        kind: FieldKind::Number,
        accessor: current_receipts_of,
    },
    FieldDescriptor {
        id: FieldId::CareerReceipts,
        key: "careerReceipts",
        label: "Career Receipts",
        kind: FieldKind::Number,
        accessor: career_receipts_of,
    },
];

impl FieldId {
    pub const ALL: [FieldId; 6] = [
        FieldId::Name,
        FieldId::Role,
        FieldId::State,
        FieldId::Party,
        FieldId::CurrentReceipts,
        FieldId::CareerReceipts,
    ];

    pub fn descriptor(self) -> &'static FieldDescriptor {
        &FIELDS[self.column()]
    }

    /// Position of the field in the display columns.
    pub fn column(self) -> usize {
        self as usize
    }

    pub fn from_column(idx: usize) -> Option<FieldId> {
        Self::ALL.get(idx).copied()
    }

    pub fn key(self) -> &'static str {
        self.descriptor().key
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownField(pub String);

impl FromStr for FieldId {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = match s.trim() {
            "name" => FieldId::Name,
            "role" => FieldId::Role,
            "state" => FieldId::State,
            "party" => FieldId::Party,
            "currentReceipts" | "current_receipts" | "current_stats.Total Receipts.value" => {
                FieldId::CurrentReceipts
            }
            "careerReceipts" | "career_receipts" | "career_stats.Total Receipts.value" => {
                FieldId::CareerReceipts
            }
            other => return Err(UnknownField(other.to_string())),
        };
        Ok(id)
    }
}
