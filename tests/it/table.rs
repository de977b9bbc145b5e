use dremel::assemble::assemble;
use dremel::encoding::{levels, plain};
use dremel::shred::shred;
use dremel::value::Value;

use super::{bytes, dremel_records, dremel_schema, ints};

#[test]
fn slicing_counts_boundaries_per_leaf() {
    let table = shred(&dremel_records(), dremel_schema()).unwrap();

    let second = table.slice(1, 2).unwrap();
    assert_eq!(second.num_rows(), 1);
    assert_eq!(second.values("DocId"), Some(&ints(&[20])[..]));
    assert_eq!(second.values("Name.Url"), Some(&[bytes("http://C")][..]));
    assert_eq!(second.reps("Name.Url"), Some(&[0u32][..]));
    assert_eq!(second.defs("Name.Url"), Some(&[2u32][..]));
    assert_eq!(second.values("Links.Backward"), Some(&ints(&[10, 30])[..]));
    assert_eq!(second.reps("Links.Backward"), Some(&[0u32, 1][..]));

    let first = table.slice(0, 1).unwrap();
    assert_eq!(first.num_rows(), 1);
    assert_eq!(
        first.values("Name.Language.Code"),
        Some(&[bytes("en-us"), bytes("en"), bytes("en-gb")][..])
    );
    assert_eq!(first.reps("Name.Language.Code"), Some(&[0u32, 2, 1, 1][..]));
    assert_eq!(first.values("Links.Backward"), Some(&[][..]));
    assert_eq!(first.defs("Links.Backward"), Some(&[1u32][..]));

    // a full-range slice is the table itself
    assert_eq!(table.slice(0, 2).unwrap(), table);
    // sliced rows assemble on their own
    let rows = assemble(&second).unwrap();
    assert_eq!(rows.len(), 1);
}

#[test]
fn selection_restricts_leaves_and_schema() {
    let table = shred(&dremel_records(), dremel_schema()).unwrap();

    let links = table.select("Links");
    assert_eq!(links.columns(), vec!["Links.Forward", "Links.Backward"]);
    assert_eq!(links.num_rows(), 2);
    assert_eq!(links.schema().leaves(), vec!["Links.Forward", "Links.Backward"]);

    // the selection still assembles, restricted to its branch
    let rows = assemble(&links).unwrap();
    let expected: Vec<Value> = [
        serde_json::json!({"Links": {"Forward": [20, 40, 60], "Backward": []}}),
        serde_json::json!({"Links": {"Forward": [80], "Backward": [10, 30]}}),
    ]
    .into_iter()
    .map(Value::from)
    .collect();
    assert_eq!(rows, expected);

    let single = table.select("Name.Url");
    assert_eq!(single.columns(), vec!["Name.Url"]);
}

#[test]
fn equality_is_pairwise_over_the_arrays() {
    let table = shred(&dremel_records(), dremel_schema()).unwrap();
    let again = shred(&dremel_records(), dremel_schema()).unwrap();
    assert_eq!(table, again);

    let shorter = shred(&dremel_records()[..1], dremel_schema()).unwrap();
    assert_ne!(table, shorter);
}

#[test]
fn column_projections_carry_their_levels() {
    let table = shred(&dremel_records(), dremel_schema()).unwrap();

    let column = table.get_column("Name.Language.Country").unwrap();
    assert_eq!(column.max_repetition_level, 2);
    assert_eq!(column.max_definition_level, 3);
    assert_eq!(column.num_rows, 2);
    assert_eq!(column.values, &[bytes("us"), bytes("gb")][..]);

    assert!(table.get_column("Name.Language").is_err());
    assert!(table.get_column("nope").is_err());
}

#[test]
fn columns_serialize_to_level_streams_and_plain_values() {
    let table = shred(&dremel_records(), dremel_schema()).unwrap();

    // DocId has level widths 0: both streams are omitted
    let chunk = table.get_column("DocId").unwrap().serialize().unwrap();
    assert!(chunk.reps.is_empty());
    assert!(chunk.defs.is_empty());
    assert_eq!(chunk.values.len(), 16);
    assert_eq!(&chunk.values[..8], &10i64.to_le_bytes());

    let column = table.get_column("Name.Language.Code").unwrap();
    let chunk = column.serialize().unwrap();
    assert_eq!(
        levels::decode(&chunk.reps, column.max_repetition_level, column.reps.len()).unwrap(),
        column.reps
    );
    assert_eq!(
        levels::decode(&chunk.defs, column.max_definition_level, column.defs.len()).unwrap(),
        column.defs
    );
    // plain byte arrays: 4-byte length prefixes
    assert_eq!(&chunk.values[..4], &5u32.to_le_bytes());
    assert_eq!(&chunk.values[4..9], b"en-us");
    assert_eq!(
        plain::decode_byte_array(&chunk.values).unwrap(),
        vec![b"en-us".as_slice(), b"en", b"en-gb"]
    );

    // the embedded length prefix accounts for the whole stream
    let total = u32::from_le_bytes(chunk.defs[..4].try_into().unwrap()) as usize;
    assert_eq!(chunk.defs.len(), 4 + total);
}
