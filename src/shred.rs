//! Shredding of nested records into per-leaf columnar triples.

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::schema::path;
use crate::schema::types::{PhysicalType, Repetition};
use crate::schema::SchemaTree;
use crate::table::Table;
use crate::value::{Category, Value};

/// Shreds `records` against `schema`, returning the columnar [`Table`].
///
/// The schema may keep growing while shredding unless it is locked.
pub fn shred(records: &[Value], schema: SchemaTree) -> Result<Table> {
    let mut shredder = Shredder::new(schema);
    for record in records {
        shredder.push(record)?;
    }
    Ok(shredder.finish())
}

/// An incremental shredder: records are pushed one at a time.
///
/// `push` is atomic: a failed record leaves every column exactly as it was,
/// so a caller may skip bad rows and keep going.
pub struct Shredder {
    schema: SchemaTree,
    columns: Columns,
    num_rows: usize,
}

impl Shredder {
    pub fn new(schema: SchemaTree) -> Self {
        let mut columns = Columns::default();
        for leaf in schema.leaves() {
            columns.init(&leaf, 0);
        }
        Self {
            schema,
            columns,
            num_rows: 0,
        }
    }

    /// Shreds one record, appending to every leaf column.
    pub fn push(&mut self, record: &Value) -> Result<()> {
        let snapshot = self.columns.lengths();
        let mut counters = vec![self.num_rows];
        let mut dropped = vec![];
        let result = value_to_column(
            &mut self.columns,
            &mut dropped,
            record,
            &mut self.schema,
            Repetition::Required,
            &mut counters,
            0,
        );
        if let Err(error) = result {
            self.columns.rollback(&snapshot, self.num_rows);
            // schema growth is kept even on failure, so nodes that gained
            // fields mid-row stop being columns either way
            for path in dropped {
                self.columns.drop_column(&path);
            }
            return Err(error);
        }
        for path in dropped {
            self.columns.drop_column(&path);
        }
        self.num_rows += 1;
        Ok(())
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn schema(&self) -> &SchemaTree {
        &self.schema
    }

    pub fn finish(self) -> Table {
        Table::new(
            self.columns.values,
            self.columns.reps,
            self.columns.defs,
            self.num_rows,
            self.schema,
        )
    }
}

#[derive(Default)]
struct Columns {
    values: IndexMap<String, Vec<Value>>,
    reps: IndexMap<String, Vec<u32>>,
    defs: IndexMap<String, Vec<u32>>,
}

impl Columns {
    /// Opens the arrays of a leaf, back-filling `backfill` neutral entries
    /// so that every column stays one-boundary-per-row aligned.
    fn init(&mut self, path: &str, backfill: usize) {
        self.values.entry(path.to_string()).or_default();
        self.reps
            .entry(path.to_string())
            .or_insert_with(|| vec![0; backfill]);
        self.defs
            .entry(path.to_string())
            .or_insert_with(|| vec![0; backfill]);
    }

    fn drop_column(&mut self, path: &str) {
        self.values.shift_remove(path);
        self.reps.shift_remove(path);
        self.defs.shift_remove(path);
    }

    fn push_levels(&mut self, path: &str, rep: u32, def: u32) {
        self.reps.entry(path.to_string()).or_default().push(rep);
        self.defs.entry(path.to_string()).or_default().push(def);
    }

    fn push_value(&mut self, path: &str, value: Value) {
        self.values.entry(path.to_string()).or_default().push(value);
    }

    fn lengths(&self) -> IndexMap<String, (usize, usize)> {
        self.reps
            .iter()
            .map(|(path, reps)| {
                let values = self.values.get(path).map(Vec::len).unwrap_or(0);
                (path.clone(), (values, reps.len()))
            })
            .collect()
    }

    /// Restores every column to its pre-row length. Columns grown by the
    /// failed row keep their back-fill so that later rows stay aligned.
    fn rollback(&mut self, snapshot: &IndexMap<String, (usize, usize)>, num_rows: usize) {
        for (path, values) in self.values.iter_mut() {
            values.truncate(snapshot.get(path).map(|s| s.0).unwrap_or(0));
        }
        for (path, reps) in self.reps.iter_mut() {
            reps.truncate(snapshot.get(path).map(|s| s.1).unwrap_or(num_rows));
        }
        for (path, defs) in self.defs.iter_mut() {
            defs.truncate(snapshot.get(path).map(|s| s.1).unwrap_or(num_rows));
        }
    }
}

static NULL: Value = Value::Null;

/// The deepest repeated dimension that advanced; 0 starts a new record.
fn rep_level(counters: &[usize]) -> u32 {
    counters
        .iter()
        .rposition(|counter| *counter > 0)
        .map(|index| index as u32)
        .unwrap_or(0)
}

/// Emits one placeholder entry for every leaf under `node`.
fn none_to_column(columns: &mut Columns, node: &SchemaTree, rep: u32, def: u32) {
    for leaf in node.leaves() {
        columns.push_levels(&leaf, rep, def);
    }
}

fn value_to_column(
    columns: &mut Columns,
    dropped: &mut Vec<String>,
    value: &Value,
    node: &mut SchemaTree,
    repetition: Repetition,
    counters: &mut Vec<usize>,
    def_level: u32,
) -> Result<()> {
    if repetition == Repetition::Repeated {
        return list_to_column(columns, dropped, value, node, counters, def_level);
    }
    match value {
        Value::List(_) => Err(Error::Structural {
            path: node.name().to_string(),
            row: counters[0],
            message: "only a repeated field takes a list".to_string(),
        }),
        Value::Null => {
            if repetition == Repetition::Required {
                Err(Error::Structural {
                    path: node.name().to_string(),
                    row: counters[0],
                    message: "the field is required".to_string(),
                })
            } else {
                none_to_column(columns, node, rep_level(counters), def_level);
                Ok(())
            }
        }
        Value::Object(fields) => {
            object_to_column(columns, dropped, fields, node, repetition, counters, def_level)
        }
        primitive => {
            primitive_to_column(columns, primitive, node, repetition, counters, def_level)
        }
    }
}

/// A repeated layer: null and empty coincide, scalars coerce to singleton
/// lists, and each element descends with its index appended to `counters`.
fn list_to_column(
    columns: &mut Columns,
    dropped: &mut Vec<String>,
    value: &Value,
    node: &mut SchemaTree,
    counters: &mut Vec<usize>,
    def_level: u32,
) -> Result<()> {
    let items: &[Value] = match value {
        Value::Null => &[],
        Value::List(items) => items,
        scalar => std::slice::from_ref(scalar),
    };
    if items.is_empty() {
        none_to_column(columns, node, rep_level(counters), def_level);
        return Ok(());
    }

    // a childless, typeless repeated node learns its element layer from the
    // first item; when locked, elements fall through as required entries
    if node.children().is_empty() && node.physical_type().is_none() && !node.is_locked() {
        node.grow_synthetic(items[0].type_info());
    }

    for (index, item) in items.iter().enumerate() {
        counters.push(index);
        let result = if node.children().contains_key(".") {
            let inner = match node.children_mut().get_mut(".") {
                Some(inner) => inner,
                None => unreachable!("checked above"),
            };
            let repetition = inner.repetition();
            value_to_column(columns, dropped, item, inner, repetition, counters, def_level + 1)
        } else {
            value_to_column(
                columns,
                dropped,
                item,
                node,
                Repetition::Required,
                counters,
                def_level + 1,
            )
        };
        counters.pop();
        result?;
    }
    Ok(())
}

fn object_to_column(
    columns: &mut Columns,
    dropped: &mut Vec<String>,
    fields: &IndexMap<String, Value>,
    node: &mut SchemaTree,
    repetition: Repetition,
    counters: &mut Vec<usize>,
    def_level: u32,
) -> Result<()> {
    if node.physical_type().is_some() {
        return Err(Error::Structural {
            path: node.name().to_string(),
            row: counters[0],
            message: "expected a primitive value, got an object".to_string(),
        });
    }
    let child_def = match repetition {
        Repetition::Required => def_level,
        _ => def_level + 1,
    };

    // the root is not a column; an empty schema records nothing for a row
    if node.children().is_empty() && node.name() != "." {
        if fields.is_empty() {
            if repetition == Repetition::Required {
                return Err(Error::Structural {
                    path: node.name().to_string(),
                    row: counters[0],
                    message: "no fields are declared here".to_string(),
                });
            }
            // a fieldless object at a column node degrades to a null marker
            columns.push_levels(node.name(), rep_level(counters), def_level);
            return Ok(());
        }
        if node.is_locked() {
            return Err(Error::SchemaClosed {
                path: node.name().to_string(),
                row: counters[0],
            });
        }
        // the node stops being a column once it gains declared fields
        dropped.push(node.name().to_string());
    }

    for (name, child) in node.children_mut().iter_mut() {
        let value = fields.get(name.as_str()).unwrap_or(&NULL);
        let repetition = child.repetition();
        value_to_column(columns, dropped, value, child, repetition, counters, child_def)?;
    }

    for (name, value) in fields {
        if node.children().contains_key(name) {
            continue;
        }
        if node.is_locked() {
            return Err(Error::SchemaClosed {
                path: path::concat(node.name(), name),
                row: counters[0],
            });
        }
        let repetition = match value.category() {
            Category::List => Repetition::Repeated,
            _ => Repetition::Optional,
        };
        let child = node.grow_child(name, repetition, value.type_info())?;
        let child_path = child.name().to_string();
        columns.init(&child_path, counters[0]);
        let repetition = child.repetition();
        value_to_column(columns, dropped, value, child, repetition, counters, child_def)?;
    }
    Ok(())
}

fn primitive_to_column(
    columns: &mut Columns,
    value: &Value,
    node: &mut SchemaTree,
    repetition: Repetition,
    counters: &mut Vec<usize>,
    def_level: u32,
) -> Result<()> {
    if !node.children().is_empty() {
        return Err(Error::Structural {
            path: node.name().to_string(),
            row: counters[0],
            message: "expected an object, got a primitive value".to_string(),
        });
    }
    let info = value.type_info();
    let found = match info.physical_type {
        Some(found) => found,
        None => unreachable!("the registry assigns every primitive a physical type"),
    };
    match node.physical_type() {
        None => {
            if node.is_locked() {
                return Err(Error::TypeMismatch {
                    path: node.name().to_string(),
                    row: counters[0],
                    expected: None,
                    found,
                });
            }
            node.record_type(&info);
        }
        Some(declared) => {
            if !compatible(declared, found) {
                return Err(Error::TypeMismatch {
                    path: node.name().to_string(),
                    row: counters[0],
                    expected: Some(declared),
                    found,
                });
            }
            if declared == PhysicalType::ByteArray {
                node.widen(info.byte_width);
            }
        }
    }

    let def = match repetition {
        Repetition::Required => def_level,
        _ => def_level + 1,
    };
    columns.push_value(node.name(), encode_primitive(value));
    columns.push_levels(node.name(), rep_level(counters), def);
    Ok(())
}

/// Whether a value of physical type `found` may fill a `declared` leaf.
fn compatible(declared: PhysicalType, found: PhysicalType) -> bool {
    use PhysicalType::*;
    matches!(
        (declared, found),
        (Boolean, Boolean)
            | (Int32 | Int64, Int64)
            | (Float | Double, Double)
            | (ByteArray | FixedLenByteArray(_), ByteArray)
    )
}

/// Text reaches the column store in its physical form, as UTF-8 bytes.
fn encode_primitive(value: &Value) -> Value {
    match value {
        Value::Text(text) => Value::Bytes(text.as_bytes().to_vec()),
        other => other.clone(),
    }
}
