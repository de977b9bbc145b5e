//! Assembly of records from per-leaf columnar triples: the inverse of
//! shredding, driven by a dispatcher indexed on each node's repetition.

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::schema::types::{PrimitiveConvertedType, Repetition};
use crate::schema::SchemaTree;
use crate::table::Table;
use crate::value::Value;

/// Assembles every row of `table`.
pub fn assemble(table: &Table) -> Result<Vec<Value>> {
    RowIter::new(table)?.collect()
}

/// An iterator over the assembled rows of a [`Table`].
pub struct RowIter<'a> {
    reader: RecordReader<'a>,
    row: usize,
    num_rows: usize,
    failed: bool,
}

impl<'a> RowIter<'a> {
    pub fn new(table: &'a Table) -> Result<Self> {
        Ok(Self {
            reader: RecordReader::new(table)?,
            row: 0,
            num_rows: table.num_rows(),
            failed: false,
        })
    }
}

impl<'a> Iterator for RowIter<'a> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        if self.row == self.num_rows {
            return match self.reader.check_exhausted() {
                Ok(()) => None,
                Err(error) => {
                    self.failed = true;
                    Some(Err(error))
                }
            };
        }
        self.row += 1;
        let row = self.reader.next_row();
        if row.is_err() {
            self.failed = true;
        }
        Some(row)
    }
}

/// A cursor over one leaf's triple stream. `i` walks the level arrays; `vi`
/// walks the value array and only advances on defined values.
struct Cursor<'a> {
    path: &'a str,
    values: &'a [Value],
    reps: &'a [u32],
    defs: &'a [u32],
    max_def: u32,
    utf8: bool,
    i: usize,
    vi: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<(u32, u32)> {
        Some((*self.reps.get(self.i)?, *self.defs.get(self.i)?))
    }

    fn peek_or_err(&self) -> Result<(u32, u32)> {
        self.peek().ok_or_else(|| {
            Error::OutOfSpec(format!(
                "column {:?} is exhausted at entry {}",
                self.path, self.i
            ))
        })
    }

    /// Consumes one placeholder, which must sit below `def_limit`.
    fn skip_placeholder(&mut self, def_limit: u32) -> Result<()> {
        let (_, def) = self.peek_or_err()?;
        if def >= def_limit {
            return Err(Error::OutOfSpec(format!(
                "column {:?} entry {}: definition level {} contradicts an absent parent",
                self.path, self.i, def
            )));
        }
        self.i += 1;
        Ok(())
    }

    /// Consumes one entry that must carry a value.
    fn take_value(&mut self) -> Result<Value> {
        let (_, def) = self.peek_or_err()?;
        if def != self.max_def {
            return Err(Error::OutOfSpec(format!(
                "column {:?} entry {}: expected a defined value, found definition level {}",
                self.path, self.i, def
            )));
        }
        let value = self.values.get(self.vi).cloned().ok_or_else(|| {
            Error::OutOfSpec(format!(
                "column {:?}: the value array is exhausted at {}",
                self.path, self.vi
            ))
        })?;
        self.i += 1;
        self.vi += 1;
        self.decode(value)
    }

    /// Consumes one entry: the value when defined, null otherwise.
    fn take_optional(&mut self) -> Result<Value> {
        let (_, def) = self.peek_or_err()?;
        if def == self.max_def {
            self.take_value()
        } else {
            self.i += 1;
            Ok(Value::Null)
        }
    }

    fn decode(&self, value: Value) -> Result<Value> {
        match value {
            Value::Bytes(bytes) if self.utf8 => String::from_utf8(bytes)
                .map(Value::Text)
                .map_err(|error| {
                    Error::OutOfSpec(format!(
                        "column {:?} holds invalid UTF-8: {}",
                        self.path, error
                    ))
                }),
            other => Ok(other),
        }
    }

    fn is_exhausted(&self) -> bool {
        self.i >= self.reps.len()
    }
}

struct RecordReader<'a> {
    schema: &'a SchemaTree,
    cursors: Vec<Cursor<'a>>,
}

impl<'a> RecordReader<'a> {
    fn new(table: &'a Table) -> Result<Self> {
        let schema = table.schema();
        let mut cursors = vec![];
        for leaf in schema.leaves() {
            let node = schema
                .lookup(&leaf)
                .ok_or_else(|| general_err!("no column is named {:?}", leaf))?;
            let values = table
                .values(&leaf)
                .ok_or_else(|| general_err!("the table holds no values for {:?}", leaf))?;
            let reps = table
                .reps(&leaf)
                .ok_or_else(|| general_err!("the table holds no repetition levels for {:?}", leaf))?;
            let defs = table
                .defs(&leaf)
                .ok_or_else(|| general_err!("the table holds no definition levels for {:?}", leaf))?;
            if reps.len() != defs.len() {
                return Err(Error::OutOfSpec(format!(
                    "column {:?} holds {} repetition but {} definition levels",
                    leaf,
                    reps.len(),
                    defs.len()
                )));
            }
            cursors.push(Cursor {
                path: node.name(),
                values,
                reps,
                defs,
                max_def: schema.max_definition_level(&leaf)?,
                utf8: node.converted_type() == Some(PrimitiveConvertedType::Utf8),
                i: 0,
                vi: 0,
            });
        }
        Ok(Self { schema, cursors })
    }

    fn next_row(&mut self) -> Result<Value> {
        for cursor in &self.cursors {
            let (rep, _) = cursor.peek_or_err()?;
            if rep != 0 {
                return Err(Error::OutOfSpec(format!(
                    "column {:?} entry {}: expected a record boundary, found repetition level {}",
                    cursor.path, cursor.i, rep
                )));
            }
        }
        let schema = self.schema;
        self.assemble_group(schema, (0, self.cursors.len()), 0, 0)
    }

    fn check_exhausted(&self) -> Result<()> {
        for cursor in &self.cursors {
            if !cursor.is_exhausted() {
                return Err(Error::OutOfSpec(format!(
                    "column {:?} holds {} entries past the last record",
                    cursor.path,
                    cursor.reps.len() - cursor.i
                )));
            }
        }
        Ok(())
    }

    /// Dispatches on the node's repetition; `def` and `rep` are the levels
    /// including the node's own contribution.
    fn assemble_field(
        &mut self,
        node: &'a SchemaTree,
        range: (usize, usize),
        def: u32,
        rep: u32,
    ) -> Result<Value> {
        match node.repetition() {
            Repetition::Required => self.assemble_required(node, range, def, rep),
            Repetition::Optional => self.assemble_optional(node, range, def, rep),
            Repetition::Repeated => self.assemble_repeated(node, range, def, rep),
        }
    }

    fn assemble_required(
        &mut self,
        node: &'a SchemaTree,
        range: (usize, usize),
        def: u32,
        rep: u32,
    ) -> Result<Value> {
        if node.children().is_empty() {
            self.cursors[range.0].take_value()
        } else {
            self.assemble_group(node, range, def, rep)
        }
    }

    fn assemble_optional(
        &mut self,
        node: &'a SchemaTree,
        range: (usize, usize),
        def: u32,
        rep: u32,
    ) -> Result<Value> {
        if node.children().is_empty() {
            return self.cursors[range.0].take_optional();
        }
        let (_, next_def) = self.cursors[range.0].peek_or_err()?;
        if next_def < def {
            self.skip_range(range, def)?;
            return Ok(Value::Null);
        }
        self.assemble_group(node, range, def, rep)
    }

    fn assemble_repeated(
        &mut self,
        node: &'a SchemaTree,
        range: (usize, usize),
        def: u32,
        rep: u32,
    ) -> Result<Value> {
        let (_, next_def) = self.cursors[range.0].peek_or_err()?;
        if next_def < def {
            // an absent list and an empty one coincide
            self.skip_range(range, def)?;
            return Ok(Value::List(vec![]));
        }
        let mut items = vec![self.assemble_element(node, range, def, rep)?];
        loop {
            match self.cursors[range.0].peek() {
                Some((next_rep, _)) if next_rep == rep => {
                    items.push(self.assemble_element(node, range, def, rep)?);
                }
                Some((next_rep, _)) if next_rep > rep => {
                    let cursor = &self.cursors[range.0];
                    return Err(Error::OutOfSpec(format!(
                        "column {:?} entry {}: repetition level {} re-opens a closed list",
                        cursor.path, cursor.i, next_rep
                    )));
                }
                _ => break,
            }
        }
        Ok(Value::List(items))
    }

    fn assemble_element(
        &mut self,
        node: &'a SchemaTree,
        range: (usize, usize),
        def: u32,
        rep: u32,
    ) -> Result<Value> {
        if let Some(inner) = node.children().get(".") {
            let (def, rep) = child_levels(inner, def, rep);
            return self.assemble_field(inner, range, def, rep);
        }
        if node.children().is_empty() {
            return self.cursors[range.0].take_value();
        }
        self.assemble_group(node, range, def, rep)
    }

    fn assemble_group(
        &mut self,
        node: &'a SchemaTree,
        range: (usize, usize),
        def: u32,
        rep: u32,
    ) -> Result<Value> {
        if let Some(inner) = node.children().get(".") {
            let (def, rep) = child_levels(inner, def, rep);
            return self.assemble_field(inner, range, def, rep);
        }
        let mut fields = IndexMap::with_capacity(node.children().len());
        let mut offset = range.0;
        for (name, child) in node.children() {
            let count = child.leaf_count();
            let (child_def, child_rep) = child_levels(child, def, rep);
            let value = self.assemble_field(child, (offset, count), child_def, child_rep)?;
            fields.insert(name.clone(), value);
            offset += count;
        }
        Ok(Value::Object(fields))
    }

    fn skip_range(&mut self, range: (usize, usize), def_limit: u32) -> Result<()> {
        for cursor in &mut self.cursors[range.0..range.0 + range.1] {
            cursor.skip_placeholder(def_limit)?;
        }
        Ok(())
    }
}

fn child_levels(child: &SchemaTree, def: u32, rep: u32) -> (u32, u32) {
    match child.repetition() {
        Repetition::Required => (def, rep),
        Repetition::Optional => (def + 1, rep),
        Repetition::Repeated => (def + 1, rep + 1),
    }
}
