use parquet_format_safe::{FieldRepetitionType, SchemaElement, Type};

use dremel::error::Error;
use dremel::schema::types::Repetition;
use dremel::schema::SchemaTree;
use dremel::value::TypeInfo;

use super::dremel_schema;

#[test]
fn metadata_is_preordered_and_sorted() {
    let elements = dremel_schema().to_parquet_metadata();

    let names = elements
        .iter()
        .map(|element| element.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        vec![
            ".",
            "DocId",
            "Links",
            "Links.Backward",
            "Links.Forward",
            "Name",
            "Name.Language",
            "Name.Language.Code",
            "Name.Language.Country",
            "Name.Url",
        ]
    );

    assert_eq!(elements[0].repetition_type, None);
    assert_eq!(elements[0].num_children, Some(3));
    assert_eq!(elements[1].type_, Some(Type::INT64));
    assert_eq!(
        elements[1].repetition_type,
        Some(FieldRepetitionType::REQUIRED)
    );
    assert_eq!(elements[2].num_children, Some(2));
    assert_eq!(elements[2].type_, None);
    assert_eq!(
        elements[5].repetition_type,
        Some(FieldRepetitionType::REPEATED)
    );
}

#[test]
fn metadata_round_trip_is_isomorphic() {
    // equality is insensitive to child order, so the sorted output loads
    // back equal to the declaration-ordered tree; `locked` is not carried
    // by the metadata, hence the unlocked reference tree
    let loaded =
        SchemaTree::from_parquet_metadata(&dremel_schema().to_parquet_metadata()).unwrap();

    let mut declared = SchemaTree::new();
    for element in [
        ("DocId", vec![Repetition::Required], TypeInfo::int64()),
        ("Name", vec![Repetition::Repeated], TypeInfo::group()),
        ("Name.Url", vec![Repetition::Optional], TypeInfo::utf8()),
        ("Links", vec![Repetition::Optional], TypeInfo::group()),
        ("Links.Forward", vec![Repetition::Repeated], TypeInfo::int64()),
        ("Links.Backward", vec![Repetition::Repeated], TypeInfo::int64()),
        ("Name.Language", vec![Repetition::Repeated], TypeInfo::group()),
        ("Name.Language.Code", vec![Repetition::Required], TypeInfo::utf8()),
        ("Name.Language.Country", vec![Repetition::Optional], TypeInfo::utf8()),
    ] {
        declared.add(element.0, &element.1, element.2).unwrap();
    }

    assert_eq!(loaded, declared);
}

#[test]
fn synthetic_layers_round_trip() {
    let mut schema = SchemaTree::new();
    schema
        .add(
            "v",
            &[Repetition::Repeated, Repetition::Optional],
            TypeInfo::utf8(),
        )
        .unwrap();

    let elements = schema.to_parquet_metadata();
    // the outer layer is a single-child group sharing the terminal's name
    assert_eq!(elements.len(), 3);
    assert_eq!(elements[1].name, "v");
    assert_eq!(elements[1].num_children, Some(1));
    assert_eq!(
        elements[1].repetition_type,
        Some(FieldRepetitionType::REPEATED)
    );
    assert_eq!(elements[2].name, "v");
    assert_eq!(elements[2].num_children, None);
    assert_eq!(
        elements[2].repetition_type,
        Some(FieldRepetitionType::OPTIONAL)
    );

    let loaded = SchemaTree::from_parquet_metadata(&elements).unwrap();
    assert_eq!(loaded, schema);
    assert_eq!(loaded.max_definition_level("v").unwrap(), 2);
    assert_eq!(loaded.max_repetition_level("v").unwrap(), 1);
}

#[test]
fn any_first_element_is_the_root() {
    let elements = vec![
        SchemaElement {
            type_: None,
            type_length: None,
            repetition_type: None,
            name: "spark_schema".to_string(),
            num_children: Some(1),
            converted_type: None,
            scale: None,
            precision: None,
            field_id: None,
            logical_type: None,
        },
        SchemaElement {
            type_: Some(Type::INT64),
            type_length: None,
            repetition_type: Some(FieldRepetitionType::OPTIONAL),
            name: "a".to_string(),
            num_children: None,
            converted_type: None,
            scale: None,
            precision: None,
            field_id: None,
            logical_type: None,
        },
    ];

    let loaded = SchemaTree::from_parquet_metadata(&elements).unwrap();
    assert_eq!(loaded.name(), ".");
    assert_eq!(loaded.leaves(), vec!["a"]);
    assert_eq!(loaded.max_definition_level("a").unwrap(), 1);
}

#[test]
fn bad_preorder_counts_are_rejected() {
    let mut elements = dremel_schema().to_parquet_metadata();

    // a truncated list under-runs the declared child counts
    let truncated = &elements[..elements.len() - 1];
    assert!(matches!(
        SchemaTree::from_parquet_metadata(truncated),
        Err(Error::OutOfSpec(_))
    ));

    // counts that do not cover the whole list are rejected too
    elements[0].num_children = Some(2);
    assert!(matches!(
        SchemaTree::from_parquet_metadata(&elements),
        Err(Error::OutOfSpec(_))
    ));

    assert!(matches!(
        SchemaTree::from_parquet_metadata(&[]),
        Err(Error::OutOfSpec(_))
    ));
}

#[test]
fn types_no_column_can_hold_are_rejected() {
    let elements = vec![
        SchemaElement {
            type_: None,
            type_length: None,
            repetition_type: None,
            name: ".".to_string(),
            num_children: Some(1),
            converted_type: None,
            scale: None,
            precision: None,
            field_id: None,
            logical_type: None,
        },
        SchemaElement {
            type_: Some(Type::INT96),
            type_length: None,
            repetition_type: Some(FieldRepetitionType::OPTIONAL),
            name: "ts".to_string(),
            num_children: None,
            converted_type: None,
            scale: None,
            precision: None,
            field_id: None,
            logical_type: None,
        },
    ];

    assert!(matches!(
        SchemaTree::from_parquet_metadata(&elements),
        Err(Error::OutOfSpec(_))
    ));
}
