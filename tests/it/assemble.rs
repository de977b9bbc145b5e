use dremel::assemble::{assemble, RowIter};
use dremel::error::Error;
use dremel::schema::types::Repetition;
use dremel::schema::SchemaTree;
use dremel::shred::shred;
use dremel::table::Table;
use dremel::value::{TypeInfo, Value};

use super::{dremel_records, dremel_schema};

/// Assembly materializes every declared field: absent optionals come back
/// as nulls and absent repetitions as empty lists.
#[test]
fn dremel_paper_round_trip() {
    let table = shred(&dremel_records(), dremel_schema()).unwrap();
    let rows = assemble(&table).unwrap();

    let expected: Vec<Value> = [
        serde_json::json!({
            "DocId": 10,
            "Name": [
                {
                    "Url": "http://A",
                    "Language": [
                        {"Code": "en-us", "Country": "us"},
                        {"Code": "en", "Country": null}
                    ]
                },
                {"Url": "http://B", "Language": []},
                {
                    "Url": null,
                    "Language": [{"Code": "en-gb", "Country": "gb"}]
                }
            ],
            "Links": {"Forward": [20, 40, 60], "Backward": []}
        }),
        serde_json::json!({
            "DocId": 20,
            "Name": [{"Url": "http://C", "Language": []}],
            "Links": {"Forward": [80], "Backward": [10, 30]}
        }),
    ]
    .into_iter()
    .map(Value::from)
    .collect();

    assert_eq!(rows, expected);
}

/// Shredding what was assembled reproduces the table exactly: the coerced
/// forms (empty list, null optional) shred to the very same levels.
#[test]
fn shred_after_assemble_is_identity() {
    let cases: Vec<(Vec<Value>, SchemaTree)> = vec![
        (dremel_records(), dremel_schema()),
        (
            [
                serde_json::json!({ "v": null }),
                serde_json::json!({ "v": [] }),
                serde_json::json!({ "v": [null] }),
                serde_json::json!({ "v": [null, null] }),
            ]
            .into_iter()
            .map(Value::from)
            .collect(),
            {
                let mut schema = SchemaTree::new_locked();
                schema
                    .add(
                        "v",
                        &[Repetition::Repeated, Repetition::Optional],
                        TypeInfo::group(),
                    )
                    .unwrap();
                schema
            },
        ),
        (
            [
                serde_json::json!({}),
                serde_json::json!({"a": {"b": {"c": 1}}}),
                serde_json::json!({"a": {"b": {"c": 2, "d": [3]}}}),
                serde_json::json!({"a": {"b": {"c": 4, "d": [5, 6]}}}),
            ]
            .into_iter()
            .map(Value::from)
            .collect(),
            {
                let mut schema = SchemaTree::new_locked();
                schema
                    .add("a", &[Repetition::Optional], TypeInfo::group())
                    .unwrap();
                schema
                    .add("a.b", &[Repetition::Required], TypeInfo::group())
                    .unwrap();
                schema
                    .add("a.b.c", &[Repetition::Required], TypeInfo::int64())
                    .unwrap();
                schema
                    .add("a.b.d", &[Repetition::Repeated], TypeInfo::int64())
                    .unwrap();
                schema
            },
        ),
    ];

    for (records, schema) in cases {
        let table = shred(&records, schema.clone()).unwrap();
        let rows = assemble(&table).unwrap();
        let again = shred(&rows, schema).unwrap();
        assert_eq!(again, table);
    }
}

#[test]
fn primitive_round_trip_preserves_types() {
    let records = [Value::from(serde_json::json!({
        "b": true,
        "i": -42,
        "f": 1.5,
        "t": "text",
    }))];
    let table = shred(&records, SchemaTree::new()).unwrap();
    let rows = assemble(&table).unwrap();

    let Value::Object(fields) = &rows[0] else {
        panic!("expected an object");
    };
    assert_eq!(fields["b"], Value::Bool(true));
    assert_eq!(fields["i"], Value::Int(-42));
    assert_eq!(fields["f"], Value::Float(1.5));
    assert_eq!(fields["t"], Value::Text("text".to_string()));
}

#[test]
fn rows_come_out_one_by_one() {
    let table = shred(&dremel_records(), dremel_schema()).unwrap();
    let mut rows = RowIter::new(&table).unwrap();

    let first = rows.next().unwrap().unwrap();
    let Value::Object(fields) = &first else {
        panic!("expected an object");
    };
    assert_eq!(fields["DocId"], Value::Int(10));
    assert!(rows.next().is_some());
    assert!(rows.next().is_none());
}

#[test]
fn empty_schema_assembles_empty_rows() {
    let table = shred(
        &[Value::from(serde_json::json!({})), Value::from(serde_json::json!({}))],
        SchemaTree::new(),
    )
    .unwrap();
    let rows = assemble(&table).unwrap();
    assert_eq!(
        rows,
        vec![Value::Object(Default::default()), Value::Object(Default::default())]
    );
}

fn single_column_table(reps: Vec<u32>, defs: Vec<u32>, values: Vec<Value>, num_rows: usize) -> Table {
    let mut schema = SchemaTree::new_locked();
    schema
        .add("v", &[Repetition::Optional], TypeInfo::int64())
        .unwrap();
    Table::new(
        std::iter::once(("v".to_string(), values)).collect(),
        std::iter::once(("v".to_string(), reps)).collect(),
        std::iter::once(("v".to_string(), defs)).collect(),
        num_rows,
        schema,
    )
}

#[test]
fn corrupt_levels_are_detected() {
    // a row that does not start at repetition level 0
    let table = single_column_table(vec![1], vec![1], vec![Value::Int(1)], 1);
    assert!(matches!(assemble(&table), Err(Error::OutOfSpec(_))));

    // a defined entry with no value behind it
    let table = single_column_table(vec![0], vec![1], vec![], 1);
    assert!(matches!(assemble(&table), Err(Error::OutOfSpec(_))));

    // fewer entries than rows
    let table = single_column_table(vec![0], vec![1], vec![Value::Int(1)], 2);
    assert!(matches!(assemble(&table), Err(Error::OutOfSpec(_))));

    // entries past the last row
    let table = single_column_table(
        vec![0, 0],
        vec![1, 1],
        vec![Value::Int(1), Value::Int(2)],
        1,
    );
    assert!(matches!(assemble(&table), Err(Error::OutOfSpec(_))));
}

#[test]
fn mismatched_level_arrays_are_detected() {
    let table = single_column_table(vec![0, 0], vec![1], vec![Value::Int(1)], 2);
    assert!(matches!(assemble(&table), Err(Error::OutOfSpec(_))));
}
