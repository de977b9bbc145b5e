use dremel::schema::types::Repetition;
use dremel::schema::SchemaTree;
use dremel::value::{TypeInfo, Value};

mod assemble;
mod schema;
mod table;

/// The canonical document pair from the Dremel paper.
pub fn dremel_records() -> Vec<Value> {
    [
        serde_json::json!({
            "DocId": 10,
            "Links": {
                "Forward": [20, 40, 60]
            },
            "Name": [
                {
                    "Language": [
                        {"Code": "en-us", "Country": "us"},
                        {"Code": "en"}
                    ],
                    "Url": "http://A"
                },
                {"Url": "http://B"},
                {
                    "Language": [
                        {"Code": "en-gb", "Country": "gb"}
                    ]
                }
            ]
        }),
        serde_json::json!({
            "DocId": 20,
            "Links": {
                "Backward": [10, 30],
                "Forward": [80]
            },
            "Name": [
                {"Url": "http://C"}
            ]
        }),
    ]
    .into_iter()
    .map(Value::from)
    .collect()
}

pub fn dremel_schema() -> SchemaTree {
    let mut schema = SchemaTree::new_locked();
    schema
        .add("DocId", &[Repetition::Required], TypeInfo::int64())
        .unwrap();
    schema
        .add("Name", &[Repetition::Repeated], TypeInfo::group())
        .unwrap();
    schema
        .add("Name.Url", &[Repetition::Optional], TypeInfo::utf8())
        .unwrap();
    schema
        .add("Links", &[Repetition::Optional], TypeInfo::group())
        .unwrap();
    schema
        .add("Links.Forward", &[Repetition::Repeated], TypeInfo::int64())
        .unwrap();
    schema
        .add("Links.Backward", &[Repetition::Repeated], TypeInfo::int64())
        .unwrap();
    schema
        .add("Name.Language", &[Repetition::Repeated], TypeInfo::group())
        .unwrap();
    schema
        .add("Name.Language.Code", &[Repetition::Required], TypeInfo::utf8())
        .unwrap();
    schema
        .add(
            "Name.Language.Country",
            &[Repetition::Optional],
            TypeInfo::utf8(),
        )
        .unwrap();
    schema
}

/// Text is stored in its physical form.
pub fn bytes(text: &str) -> Value {
    Value::Bytes(text.as_bytes().to_vec())
}

pub fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().copied().map(Value::Int).collect()
}
