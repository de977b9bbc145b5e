//! The read-only bundle of shredded columns.

use indexmap::IndexMap;

use crate::encoding::{bitpacked, levels, plain};
use crate::error::{Error, Result};
use crate::schema::path;
use crate::schema::types::PhysicalType;
use crate::schema::SchemaTree;
use crate::value::Value;

/// An immutable bundle of the three per-leaf arrays, the row count and the
/// schema. Equality compares the arrays pairwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    values: IndexMap<String, Vec<Value>>,
    reps: IndexMap<String, Vec<u32>>,
    defs: IndexMap<String, Vec<u32>>,
    num_rows: usize,
    schema: SchemaTree,
}

impl Table {
    pub fn new(
        values: IndexMap<String, Vec<Value>>,
        reps: IndexMap<String, Vec<u32>>,
        defs: IndexMap<String, Vec<u32>>,
        num_rows: usize,
        schema: SchemaTree,
    ) -> Self {
        Self {
            values,
            reps,
            defs,
            num_rows,
            schema,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn schema(&self) -> &SchemaTree {
        &self.schema
    }

    /// The column paths, in schema order.
    pub fn columns(&self) -> Vec<&str> {
        self.values.keys().map(String::as_str).collect()
    }

    pub fn values(&self, name: &str) -> Option<&[Value]> {
        self.values.get(name).map(Vec::as_slice)
    }

    pub fn reps(&self, name: &str) -> Option<&[u32]> {
        self.reps.get(name).map(Vec::as_slice)
    }

    pub fn defs(&self, name: &str) -> Option<&[u32]> {
        self.defs.get(name).map(Vec::as_slice)
    }

    /// Returns the projection of a single leaf column.
    pub fn get_column(&self, name: &str) -> Result<Column<'_>> {
        let node = self
            .schema
            .lookup(name)
            .ok_or_else(|| general_err!("no column is named {:?}", name))?;
        let values = self
            .values
            .get(name)
            .ok_or_else(|| general_err!("the table holds no values for {:?}", name))?;
        let reps = self
            .reps
            .get(name)
            .ok_or_else(|| general_err!("the table holds no repetition levels for {:?}", name))?;
        let defs = self
            .defs
            .get(name)
            .ok_or_else(|| general_err!("the table holds no definition levels for {:?}", name))?;
        Ok(Column {
            name: node.name(),
            values,
            reps,
            defs,
            num_rows: self.num_rows,
            max_repetition_level: self.schema.max_repetition_level(name)?,
            max_definition_level: self.schema.max_definition_level(name)?,
            node,
        })
    }

    /// Restricts the table to the leaves whose path starts with `prefix`,
    /// pruning the schema accordingly.
    pub fn select(&self, prefix: &str) -> Table {
        let keep = |map: &IndexMap<String, Vec<_>>| -> IndexMap<String, Vec<_>> {
            map.iter()
                .filter(|(name, _)| path::starts_with(name, prefix))
                .map(|(name, array)| (name.clone(), array.clone()))
                .collect()
        };
        Table {
            values: self
                .values
                .iter()
                .filter(|(name, _)| path::starts_with(name, prefix))
                .map(|(name, array)| (name.clone(), array.clone()))
                .collect(),
            reps: keep(&self.reps),
            defs: keep(&self.defs),
            num_rows: self.num_rows,
            schema: self.schema.select(prefix),
        }
    }

    /// Returns the rows `start..stop`. Array positions are found per leaf by
    /// counting `rep == 0` boundaries; this is linear in the entry count.
    pub fn slice(&self, start: usize, stop: usize) -> Result<Table> {
        let stop = stop.min(self.num_rows);
        let start = start.min(stop);
        if start == 0 && stop == self.num_rows {
            return Ok(self.clone());
        }

        let mut values = IndexMap::new();
        let mut reps = IndexMap::new();
        let mut defs = IndexMap::new();
        for (name, column_reps) in &self.reps {
            let column_defs = self
                .defs
                .get(name)
                .ok_or_else(|| general_err!("the table holds no definition levels for {:?}", name))?;
            let column_values = self
                .values
                .get(name)
                .ok_or_else(|| general_err!("the table holds no values for {:?}", name))?;
            let max_def = self.schema.max_definition_level(name)?;

            let (first, last) = row_bounds(column_reps, start, stop);
            let defined = |defs: &[u32]| defs.iter().filter(|def| **def == max_def).count();
            let value_first = defined(&column_defs[..first]);
            let value_last = value_first + defined(&column_defs[first..last]);
            let sliced_values = column_values
                .get(value_first..value_last)
                .ok_or_else(|| {
                    Error::OutOfSpec(format!(
                        "column {:?} holds fewer values than its definition levels declare",
                        name
                    ))
                })?;

            values.insert(name.clone(), sliced_values.to_vec());
            reps.insert(name.clone(), column_reps[first..last].to_vec());
            defs.insert(name.clone(), column_defs[first..last].to_vec());
        }
        Ok(Table {
            values,
            reps,
            defs,
            num_rows: stop - start,
            schema: self.schema.clone(),
        })
    }
}

/// The first and one-past-last entry positions of rows `start..stop`.
fn row_bounds(reps: &[u32], start: usize, stop: usize) -> (usize, usize) {
    let mut first = reps.len();
    let mut last = reps.len();
    let mut row = 0;
    for (index, rep) in reps.iter().enumerate() {
        if *rep == 0 {
            if row == start {
                first = index;
            }
            if row == stop {
                last = index;
                break;
            }
            row += 1;
        }
    }
    (first, last)
}

/// A borrowed projection of one leaf column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column<'a> {
    pub name: &'a str,
    pub values: &'a [Value],
    pub reps: &'a [u32],
    pub defs: &'a [u32],
    pub num_rows: usize,
    pub max_repetition_level: u32,
    pub max_definition_level: u32,
    node: &'a SchemaTree,
}

/// The on-wire bytes of one leaf column: the two level streams (each empty
/// at bit width 0) and the plain-encoded values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnChunk {
    pub reps: Vec<u8>,
    pub defs: Vec<u8>,
    pub values: Vec<u8>,
}

impl<'a> Column<'a> {
    pub fn physical_type(&self) -> Option<PhysicalType> {
        self.node.physical_type()
    }

    /// Serializes the column for the wire.
    pub fn serialize(&self) -> Result<ColumnChunk> {
        let mut reps = vec![];
        levels::encode(&mut reps, self.reps, self.max_repetition_level)?;
        let mut defs = vec![];
        levels::encode(&mut defs, self.defs, self.max_definition_level)?;
        Ok(ColumnChunk {
            reps,
            defs,
            values: self.serialize_values()?,
        })
    }

    fn serialize_values(&self) -> Result<Vec<u8>> {
        let physical_type = match self.node.physical_type() {
            Some(physical_type) => physical_type,
            None => return Ok(vec![]),
        };
        let mut buffer = vec![];
        match physical_type {
            PhysicalType::Boolean => {
                let bits = self
                    .values
                    .iter()
                    .map(|value| match value {
                        Value::Bool(value) => Ok(u32::from(*value)),
                        other => Err(self.unserializable(other)),
                    })
                    .collect::<Result<Vec<u32>>>()?;
                bitpacked::encode(&bits, 1, &mut buffer);
            }
            PhysicalType::Int32 => {
                let integers = self.integers()?;
                plain::encode_native(&mut buffer, integers.iter().map(|x| *x as i32));
            }
            PhysicalType::Int64 => {
                plain::encode_native(&mut buffer, self.integers()?.into_iter());
            }
            PhysicalType::Float => {
                let floats = self.floats()?;
                plain::encode_native(&mut buffer, floats.iter().map(|x| *x as f32));
            }
            PhysicalType::Double => {
                plain::encode_native(&mut buffer, self.floats()?.into_iter());
            }
            PhysicalType::ByteArray => {
                let arrays = self.byte_arrays()?;
                plain::encode_byte_array(&mut buffer, arrays.into_iter());
            }
            PhysicalType::FixedLenByteArray(_) => {
                for array in self.byte_arrays()? {
                    buffer.extend_from_slice(array);
                }
            }
        }
        Ok(buffer)
    }

    fn integers(&self) -> Result<Vec<i64>> {
        self.values
            .iter()
            .map(|value| match value {
                Value::Int(value) => Ok(*value),
                other => Err(self.unserializable(other)),
            })
            .collect()
    }

    fn floats(&self) -> Result<Vec<f64>> {
        self.values
            .iter()
            .map(|value| match value {
                Value::Float(value) => Ok(*value),
                other => Err(self.unserializable(other)),
            })
            .collect()
    }

    fn byte_arrays(&self) -> Result<Vec<&[u8]>> {
        self.values
            .iter()
            .map(|value| match value {
                Value::Bytes(bytes) => Ok(bytes.as_slice()),
                other => Err(self.unserializable(other)),
            })
            .collect()
    }

    fn unserializable(&self, value: &Value) -> Error {
        general_err!(
            "column {:?} declares {:?} but holds a {:?}",
            self.name,
            self.node.physical_type(),
            value
        )
    }
}
