use std::cell::RefCell;
use std::rc::Rc;

use fv::{DatasetEngine, DisplayRow, FieldId, Record, SortDirection, ViewSink, format_metric};
use serde_json::{Value, json};

fn congress() -> Value {
    json!([
        {"name": "Sherrod Brown", "role": "Senator", "state": "OH", "party": "D",
         "current_stats": {"Total Receipts": {"value": 41000000.5, "rank": 2}},
         "career_stats": {"Total Receipts": {"value": 90000000, "rank": 5}}},
        {"name": "Ann Wagner", "role": "Representative", "state": "MO", "party": "R",
         "current_stats": {"Total Receipts": {"value": 3200000, "rank": 40}},
         "career_stats": {"Total Receipts": {"value": 15000000}}},
        {"name": "bernie sanders", "role": "Senator", "state": "VT", "party": "I",
         "current_stats": {"Total Receipts": {"value": 3200000, "rank": 41}}},
        {"name": "Zoe Lofgren", "role": "Representative", "state": "CA", "party": "D",
         "current_stats": {}},
        {"name": "Adam Schiff", "role": "Representative", "state": "CA", "party": "D",
         "current_stats": {"Total Receipts": {"value": 35000000, "rank": 1}}},
        {"name": "Brian Mast", "state": "FL"},
    ])
}

fn loaded() -> DatasetEngine {
    let mut engine = DatasetEngine::new();
    engine.load(congress());
    engine
}

fn names(engine: &DatasetEngine) -> Vec<String> {
    engine.current_view().iter().map(|r| r.name.clone()).collect()
}

fn receipts(r: &Record) -> f64 {
    r.current("Total Receipts").and_then(|m| m.value).unwrap_or(0.0)
}

#[test]
fn empty_search_is_identity() {
    let mut engine = loaded();
    engine.search("");
    assert_eq!(engine.len(), engine.total());
    assert_eq!(engine.len(), 6);
}

#[test]
fn search_keeps_exactly_the_matches() {
    let mut engine = loaded();
    let all: Vec<String> = names(&engine);
    for term in ["an", "AN", "s", "Brown", "x", " ", "ADAM S"] {
        engine.search(term);
        let shown = names(&engine);
        let needle = term.to_lowercase();
        for name in &all {
            let matches = name.to_lowercase().contains(&needle);
            assert_eq!(shown.contains(name), matches, "term {term:?}, name {name:?}");
        }
    }
}

#[test]
fn second_sort_on_same_field_reverses() {
    let mut engine = loaded();
    engine.sort("state");
    engine.sort("name");
    let ascending = names(&engine);
    engine.sort("name");
    let mut descending = names(&engine);
    descending.reverse();
    assert_eq!(ascending, descending);
    assert_eq!(engine.sort_state(), (FieldId::Name, SortDirection::Descending));
}

#[test]
fn name_sort_ignores_case() {
    let mut engine = loaded();
    engine.sort("role");
    engine.sort("name");
    assert_eq!(
        names(&engine),
        [
            "Adam Schiff",
            "Ann Wagner",
            "bernie sanders",
            "Brian Mast",
            "Sherrod Brown",
            "Zoe Lofgren"
        ]
    );
}

#[test]
fn numeric_sort_is_monotonic_with_missing_as_zero() {
    let mut engine = loaded();
    engine.sort("currentReceipts");
    let values: Vec<f64> = engine.current_view().iter().map(|r| receipts(r)).collect();
    assert!(values.windows(2).all(|w| w[0] <= w[1]), "{values:?}");
    assert_eq!(&names(&engine)[..2], ["Zoe Lofgren", "Brian Mast"]);

    engine.sort("currentReceipts");
    let values: Vec<f64> = engine.current_view().iter().map(|r| receipts(r)).collect();
    assert!(values.windows(2).all(|w| w[0] >= w[1]), "{values:?}");
}

#[test]
fn third_click_matches_first() {
    let mut engine = loaded();
    engine.sort("careerReceipts");
    let first = names(&engine);
    engine.sort("careerReceipts");
    engine.sort("careerReceipts");
    assert_eq!(names(&engine), first);
    assert_eq!(
        engine.sort_state(),
        (FieldId::CareerReceipts, SortDirection::Ascending)
    );
}

#[test]
fn ties_keep_their_relative_order() {
    let mut engine = loaded();
    // Ann Wagner and bernie sanders both have 3,200,000.
    engine.sort("currentReceipts");
    let shown = names(&engine);
    let ann = shown.iter().position(|n| n == "Ann Wagner").unwrap();
    let bernie = shown.iter().position(|n| n == "bernie sanders").unwrap();
    assert_eq!(bernie, ann + 1);

    engine.sort("currentReceipts");
    let shown = names(&engine);
    let ann = shown.iter().position(|n| n == "Ann Wagner").unwrap();
    let bernie = shown.iter().position(|n| n == "bernie sanders").unwrap();
    assert_eq!(bernie, ann + 1);
}

#[test]
fn bob_and_ann_scenario() {
    let mut engine = DatasetEngine::new();
    engine.load(json!([
        {"name": "Bob", "current_stats": {"Total Receipts": {"value": 100, "rank": 3}}},
        {"name": "Ann", "current_stats": {}},
    ]));
    engine.sort("state");
    engine.sort("name");
    assert_eq!(names(&engine), ["Ann", "Bob"]);

    let view = engine.current_view();
    assert_eq!(format_metric(view[0].current("Total Receipts")), "N/A");
    assert_eq!(
        format_metric(view[1].current("Total Receipts")),
        "$100.00 (Rank: 3)"
    );
}

struct LastFrame(Rc<RefCell<Option<Vec<DisplayRow>>>>);

impl ViewSink for LastFrame {
    fn render(&mut self, rows: &[DisplayRow]) {
        *self.0.borrow_mut() = Some(rows.to_vec());
    }
}

#[test]
fn bad_input_gives_empty_view() {
    for bad in [Value::Null, json!("not an array"), json!({"name": "Bob"}), json!(7)] {
        let frame = Rc::new(RefCell::new(None));
        let mut engine = DatasetEngine::new();
        engine.subscribe(Box::new(LastFrame(Rc::clone(&frame))));
        engine.load(bad);
        assert!(engine.current_view().is_empty());
        assert_eq!(frame.borrow().as_ref().map(|rows| rows.len()), Some(0));

        // Still interactive afterwards
        engine.search("bob");
        engine.sort("party");
        assert!(engine.is_empty());
    }
}

#[test]
fn unknown_field_changes_nothing() {
    let mut engine = loaded();
    engine.sort("party");
    let before = names(&engine);
    assert!(!engine.sort("current_stats.Total Receipts"));
    assert!(!engine.sort(""));
    assert_eq!(names(&engine), before);
    assert_eq!(engine.sort_state(), (FieldId::Party, SortDirection::Ascending));
}

#[test]
fn dotted_path_keys_still_sort() {
    let mut engine = loaded();
    assert!(engine.sort("current_stats.Total Receipts.value"));
    assert_eq!(engine.sort_state().0, FieldId::CurrentReceipts);
}

#[test]
fn display_rows_follow_the_view() {
    let mut engine = loaded();
    engine.search("brian");
    let rows = engine.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].cells(),
        ["Brian Mast", "N/A", "FL", "N/A", "N/A", "N/A"]
    );

    engine.search("sherrod");
    assert_eq!(
        engine.rows()[0].current_receipts,
        "$41,000,000.50 (Rank: 2)"
    );
    assert_eq!(
        engine.rows()[0].career_receipts,
        "$90,000,000.00 (Rank: 5)"
    );
}

#[test]
fn loads_fixture_file() {
    let mut engine = DatasetEngine::new();
    let source = fv::Source::parse(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/fixtures/congress_data.json"
    ));
    // The record without a name is kept and sorts first.
    assert_eq!(fv::loader::load_into(&mut engine, &source).unwrap(), 4);
    assert_eq!(names(&engine), ["", "Ann Wagner", "Sherrod Brown", "Zoe Lofgren"]);
    let rows = engine.rows();
    assert_eq!(rows[0].name, "N/A");
    assert_eq!(rows[0].state, "TX");
    assert_eq!(rows[3].current_receipts, "N/A");
}

#[test]
fn record_without_name_is_kept() {
    let mut engine = DatasetEngine::new();
    engine.load(json!([{"name": "Bob"}, {"role": "Rep", "state": "CA"}]));
    assert_eq!(engine.total(), 2);
    assert_eq!(engine.rows()[0].name, "N/A");
    engine.search("bob");
    assert_eq!(names(&engine), ["Bob"]);
}

#[test]
fn accented_names_sort_with_their_base_letter() {
    let mut engine = DatasetEngine::new();
    engine.load(json!([
        {"name": "Zeldin"},
        {"name": "Nydia Velázquez"},
        {"name": "Ángel Cruz"},
        {"name": "Bob"},
        {"name": "Émile"},
    ]));
    assert_eq!(
        names(&engine),
        ["Ángel Cruz", "Bob", "Émile", "Nydia Velázquez", "Zeldin"]
    );
    engine.sort("name");
    assert_eq!(names(&engine)[0], "Zeldin");
    assert_eq!(names(&engine)[4], "Ángel Cruz");
}
