use parquet_format_safe::SchemaElement;

use crate::error::{Error, Result};
use crate::schema::path;
use crate::schema::tree::SchemaTree;
use crate::schema::types::{PhysicalType, Repetition};

const KNOWN_ROOT_NAMES: &[&str] = &[".", "schema", "spark_schema", "hive_schema", "root"];

impl SchemaTree {
    /// Builds a schema tree from a parquet `SchemaElement` vector.
    ///
    /// The first element is treated as the root regardless of its own name;
    /// an element naming its parent's full path is re-attached as a
    /// synthetic `.` layer. Child names may be full dotted paths (as this
    /// crate writes them) or plain simple names.
    pub fn from_parquet_metadata(elements: &[SchemaElement]) -> Result<SchemaTree> {
        let first = elements
            .first()
            .ok_or_else(|| Error::OutOfSpec("a parquet schema has a root element".to_string()))?;
        if !KNOWN_ROOT_NAMES.contains(&first.name.as_str()) {
            tracing::warn!("the root element is named {:?}; the name is ignored", first.name);
        }

        let (consumed, _, root) = from_thrift_helper(elements, 0, None)?;
        if consumed != elements.len() {
            return Err(Error::OutOfSpec(format!(
                "the pre-order child counts cover {} of {} schema elements",
                consumed,
                elements.len()
            )));
        }
        Ok(root)
    }
}

/// Constructs the node starting at `index`; `parent` is the raw name of the
/// enclosing element paired with its re-qualified path, or `None` at the
/// root. Returns the index of the next sibling, the child key and the node.
fn from_thrift_helper(
    elements: &[SchemaElement],
    index: usize,
    parent: Option<(&str, &str)>,
) -> Result<(usize, String, SchemaTree)> {
    let element = elements.get(index).ok_or_else(|| {
        Error::OutOfSpec("a schema element's num_children overflows the list".to_string())
    })?;

    let (key, qualified) = match parent {
        None => (String::new(), ".".to_string()),
        Some((raw, qualified)) => {
            let rel = path::relative(&element.name, raw).unwrap_or(&element.name);
            if rel == "." {
                // an element naming its parent carries a synthetic layer
                (".".to_string(), qualified.to_string())
            } else if rel.contains('.') {
                return Err(Error::OutOfSpec(format!(
                    "{:?} is not a direct child of {:?}",
                    element.name, raw
                )));
            } else {
                (rel.to_string(), path::concat(qualified, rel))
            }
        }
    };

    let num_children = element.num_children.unwrap_or(0);
    let repetition = match (parent, element.repetition_type) {
        (None, _) => Repetition::Required,
        (Some(_), Some(repetition)) => repetition.try_into()?,
        (Some(_), None) if num_children > 0 => Repetition::Optional,
        (Some(_), None) => {
            return Err(Error::OutOfSpec(format!(
                "the leaf element {:?} declares no repetition",
                element.name
            )))
        }
    };

    if num_children <= 0 {
        let physical_type = element
            .type_
            .map(|type_| PhysicalType::try_from_thrift(type_, element.type_length))
            .transpose()?;
        let converted_type = element
            .converted_type
            .map(TryInto::try_into)
            .transpose()?;
        let node = SchemaTree::from_parts(
            qualified,
            repetition,
            physical_type,
            converted_type,
            element.type_length,
        );
        return Ok((index + 1, key, node));
    }

    let mut node = SchemaTree::from_parts(qualified.clone(), repetition, None, None, None);
    let mut next = index + 1;
    for _ in 0..num_children {
        let (after, child_key, child) =
            from_thrift_helper(elements, next, Some((&element.name, &qualified)))?;
        next = after;
        node.insert_child(child_key, child);
    }
    Ok((next, key, node))
}
