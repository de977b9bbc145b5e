use parquet_format_safe::SchemaElement;

use crate::schema::tree::SchemaTree;

impl SchemaTree {
    /// Converts to a parquet `SchemaElement` vector: pre-order, interior
    /// nodes first with their `num_children`, children sorted by simple name
    /// at each level to stabilize the output. Elements carry full dotted
    /// names; the root comes first, named `.`, with no repetition.
    pub fn to_parquet_metadata(&self) -> Vec<SchemaElement> {
        let mut elements = vec![];
        to_thrift_helper(self, true, &mut elements);
        elements
    }
}

fn to_thrift_helper(node: &SchemaTree, is_root: bool, elements: &mut Vec<SchemaElement>) {
    let (type_, type_length) = match node.physical_type() {
        Some(physical_type) => {
            let (type_, fixed_length) = physical_type.to_thrift();
            (Some(type_), node.type_length().or(fixed_length))
        }
        None => (None, None),
    };

    elements.push(SchemaElement {
        type_,
        type_length,
        repetition_type: if is_root {
            // the root's repetition is implicit
            None
        } else {
            Some(node.repetition().into())
        },
        name: if is_root {
            ".".to_string()
        } else {
            node.name().to_string()
        },
        num_children: if node.children().is_empty() {
            None
        } else {
            Some(node.children().len() as i32)
        },
        converted_type: node.converted_type().map(|converted| converted.into()),
        scale: None,
        precision: None,
        field_id: None,
        logical_type: None,
    });

    let mut keys = node.children().keys().collect::<Vec<_>>();
    keys.sort();
    for key in keys {
        to_thrift_helper(&node.children()[key], false, elements);
    }
}
