use std::collections::HashMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub const TOTAL_RECEIPTS: &str = "Total Receipts";

/// A `{value, rank}` pair for one named financial statistic.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Metric {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub value: Option<f64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub rank: Option<i64>,
}

/// One legislator's profile and finance snapshot.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Record {
    #[serde(default, deserialize_with = "lenient_name")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub party: Option<String>,
    #[serde(default, alias = "currentStats", deserialize_with = "lenient_stats")]
    pub current_stats: HashMap<String, Metric>,
    #[serde(default, alias = "careerStats", deserialize_with = "lenient_stats")]
    pub career_stats: HashMap<String, Metric>,
}

impl Record {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn current(&self, label: &str) -> Option<&Metric> {
        self.current_stats.get(label)
    }

    pub fn career(&self, label: &str) -> Option<&Metric> {
        self.career_stats.get(label)
    }
}

// Field data that has the wrong shape is treated as absent instead of
// rejecting the whole record.

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(Value::deserialize(d)?.as_f64())
}

fn lenient_i64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(v.as_i64().or_else(|| {
        v.as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
            .map(|f| f as i64)
    }))
}

fn lenient_name<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    match Value::deserialize(d)? {
        Value::String(s) => Ok(s),
        _ => Ok(String::new()),
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    match Value::deserialize(d)? {
        Value::String(s) if !s.is_empty() => Ok(Some(s)),
        _ => Ok(None),
    }
}

fn lenient_stats<'de, D: Deserializer<'de>>(d: D) -> Result<HashMap<String, Metric>, D::Error> {
    let Value::Object(map) = Value::deserialize(d)? else {
        return Ok(HashMap::new());
    };
    Ok(map
        .into_iter()
        .filter_map(|(label, v)| {
            serde_json::from_value::<Metric>(v)
                .ok()
                .map(|metric| (label, metric))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_full_record() {
        let r: Record = serde_json::from_value(json!({
            "name": "Bob",
            "role": "Senator",
            "state": "OH",
            "party": "D",
            "current_stats": {"Total Receipts": {"value": 100.5, "rank": 3}},
            "career_stats": {"Total Receipts": {"value": 2000}}
        }))
        .unwrap();
        assert_eq!(r.name, "Bob");
        assert_eq!(r.role.as_deref(), Some("Senator"));
        assert_eq!(r.current(TOTAL_RECEIPTS).unwrap().value, Some(100.5));
        assert_eq!(r.current(TOTAL_RECEIPTS).unwrap().rank, Some(3));
        assert_eq!(r.career(TOTAL_RECEIPTS).unwrap().value, Some(2000.0));
        assert_eq!(r.career(TOTAL_RECEIPTS).unwrap().rank, None);
    }

    #[test]
    fn accepts_camel_case_stats() {
        let r: Record = serde_json::from_value(json!({
            "name": "Ann",
            "currentStats": {"Total Receipts": {"value": 7}}
        }))
        .unwrap();
        assert_eq!(r.current(TOTAL_RECEIPTS).unwrap().value, Some(7.0));
    }

    #[test]
    fn malformed_fields_become_absent() {
        let r: Record = serde_json::from_value(json!({
            "name": "Cy",
            "role": 12,
            "party": "",
            "current_stats": {"Total Receipts": {"value": "lots", "rank": "first"}},
            "career_stats": "nope"
        }))
        .unwrap();
        assert_eq!(r.role, None);
        assert_eq!(r.party, None);
        assert_eq!(r.current(TOTAL_RECEIPTS), Some(&Metric::default()));
        assert!(r.career_stats.is_empty());
    }

    #[test]
    fn missing_or_malformed_name_becomes_empty() {
        let r: Record = serde_json::from_value(json!({"role": "Rep", "state": "CA"})).unwrap();
        assert_eq!(r.name, "");
        assert_eq!(r.state.as_deref(), Some("CA"));
        let r: Record = serde_json::from_value(json!({"name": null})).unwrap();
        assert_eq!(r.name, "");
        let r: Record = serde_json::from_value(json!({"name": 7})).unwrap();
        assert_eq!(r.name, "");
    }

    #[test]
    fn out_of_range_rank_is_absent() {
        let m: Metric = serde_json::from_value(json!({"value": 1, "rank": 1e30})).unwrap();
        assert_eq!(m.rank, None);
        let m: Metric = serde_json::from_value(json!({"rank": -1e30})).unwrap();
        assert_eq!(m.rank, None);
        let m: Metric = serde_json::from_value(json!({"rank": 12.0})).unwrap();
        assert_eq!(m.rank, Some(12));
    }

    #[test]
    fn non_object_is_not_a_record() {
        assert!(serde_json::from_value::<Record>(json!(42)).is_err());
        assert!(serde_json::from_value::<Record>(json!(null)).is_err());
    }
}
