use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::value::TypeInfo;

use super::path;
use super::types::{PhysicalType, PrimitiveConvertedType, Repetition};

/// A node of the schema tree.
///
/// Every node carries its full dotted path as `name`; the root is REQUIRED
/// and named `.`. A list-of-nullable declaration threads synthetic layers,
/// keyed `.` in `children`, which share the terminal's full name and which
/// navigation traverses transparently.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaTree {
    name: String,
    repetition: Repetition,
    physical_type: Option<PhysicalType>,
    converted_type: Option<PrimitiveConvertedType>,
    type_length: Option<i32>,
    children: IndexMap<String, SchemaTree>,
    locked: bool,
}

impl Default for SchemaTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaTree {
    /// An empty schema, open to growth while shredding.
    pub fn new() -> Self {
        Self::root(false)
    }

    /// An empty schema that rejects fields it does not declare.
    pub fn new_locked() -> Self {
        Self::root(true)
    }

    fn root(locked: bool) -> Self {
        Self {
            name: ".".to_string(),
            repetition: Repetition::Required,
            physical_type: None,
            converted_type: None,
            type_length: None,
            children: IndexMap::new(),
            locked,
        }
    }

    pub(crate) fn from_parts(
        name: String,
        repetition: Repetition,
        physical_type: Option<PhysicalType>,
        converted_type: Option<PrimitiveConvertedType>,
        type_length: Option<i32>,
    ) -> Self {
        Self {
            name,
            repetition,
            physical_type,
            converted_type,
            type_length,
            children: IndexMap::new(),
            locked: false,
        }
    }

    /// The full dotted path of this node.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn repetition(&self) -> Repetition {
        self.repetition
    }

    pub fn physical_type(&self) -> Option<PhysicalType> {
        self.physical_type
    }

    pub fn converted_type(&self) -> Option<PrimitiveConvertedType> {
        self.converted_type
    }

    pub fn type_length(&self) -> Option<i32> {
        self.type_length
    }

    pub fn children(&self) -> &IndexMap<String, SchemaTree> {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Freezes this subtree against growth.
    pub fn lock(&mut self) {
        self.locked = true;
        for child in self.children.values_mut() {
            child.lock();
        }
    }

    /// Declares the field at `full_name`. Missing interior nodes are created
    /// as OPTIONAL groups. `repetition` reads outer to inner: every element
    /// but the last threads a synthetic `.` layer, so `[Repeated, Optional]`
    /// declares a list of nullable values in a single call.
    pub fn add(&mut self, full_name: &str, repetition: &[Repetition], info: TypeInfo) -> Result<()> {
        let rel = path::relative(full_name, &self.name)
            .ok_or_else(|| general_err!("{:?} is not under {:?}", full_name, self.name))?;
        let segments = path::split(rel);
        let (terminal, interior) = match segments.split_last() {
            Some(split) => split,
            None => {
                return Err(Error::Redefinition {
                    path: full_name.to_string(),
                })
            }
        };

        let mut node = skip_synthetic_mut(self);
        for segment in interior {
            let qualified = path::concat(&node.name, segment);
            let locked = node.locked;
            node = node
                .children
                .entry((*segment).to_string())
                .or_insert_with(|| Self {
                    name: qualified,
                    repetition: Repetition::Optional,
                    physical_type: None,
                    converted_type: None,
                    type_length: None,
                    children: IndexMap::new(),
                    locked,
                });
            node = skip_synthetic_mut(node);
            if node.physical_type.is_some() {
                return Err(general_err!(
                    "cannot declare {:?} under the leaf {:?}",
                    full_name,
                    node.name
                ));
            }
        }

        if node.children.contains_key(*terminal) {
            return Err(Error::Redefinition {
                path: full_name.to_string(),
            });
        }
        let qualified = path::concat(&node.name, terminal);
        let child = Self::chain(&qualified, repetition, info, node.locked)?;
        node.children.insert((*terminal).to_string(), child);
        Ok(())
    }

    fn chain(name: &str, repetition: &[Repetition], info: TypeInfo, locked: bool) -> Result<Self> {
        let (first, rest) = repetition
            .split_first()
            .ok_or_else(|| general_err!("a field declares at least one repetition"))?;
        let mut node = Self {
            name: name.to_string(),
            repetition: *first,
            physical_type: None,
            converted_type: None,
            type_length: None,
            children: IndexMap::new(),
            locked,
        };
        if rest.is_empty() {
            node.physical_type = info.physical_type;
            node.converted_type = info.converted_type;
            node.type_length = info.byte_width;
        } else {
            node.children
                .insert(".".to_string(), Self::chain(name, rest, info, locked)?);
        }
        Ok(node)
    }

    /// Returns the node at `full_name`, traversing synthetic layers
    /// transparently; for a list-of-nullable this is the innermost layer.
    pub fn lookup(&self, full_name: &str) -> Option<&SchemaTree> {
        let rel = path::relative(full_name, &self.name)?;
        let mut node = self.skip_synthetic();
        for segment in path::split(rel) {
            node = node.children.get(segment)?.skip_synthetic();
        }
        Some(node)
    }

    fn skip_synthetic(&self) -> &SchemaTree {
        let mut node = self;
        while let Some(inner) = node.children.get(".") {
            node = inner;
        }
        node
    }

    /// Every node on the expanded path to `full_name`, synthetic layers
    /// included.
    fn expanded(&self, full_name: &str) -> Option<Vec<&SchemaTree>> {
        let rel = path::relative(full_name, &self.name)?;
        let mut nodes = vec![self];
        let mut node = self;
        while let Some(inner) = node.children.get(".") {
            node = inner;
            nodes.push(node);
        }
        for segment in path::split(rel) {
            node = node.children.get(segment)?;
            nodes.push(node);
            while let Some(inner) = node.children.get(".") {
                node = inner;
                nodes.push(node);
            }
        }
        Some(nodes)
    }

    /// The number of non-REQUIRED nodes on the path to `full_name`.
    pub fn max_definition_level(&self, full_name: &str) -> Result<u32> {
        let nodes = self
            .expanded(full_name)
            .ok_or_else(|| general_err!("no column is named {:?}", full_name))?;
        Ok(nodes
            .iter()
            .filter(|node| node.repetition != Repetition::Required)
            .count() as u32)
    }

    /// The number of REPEATED nodes on the path to `full_name`.
    pub fn max_repetition_level(&self, full_name: &str) -> Result<u32> {
        let nodes = self
            .expanded(full_name)
            .ok_or_else(|| general_err!("no column is named {:?}", full_name))?;
        Ok(nodes
            .iter()
            .filter(|node| node.repetition == Repetition::Repeated)
            .count() as u32)
    }

    /// The leaf column paths, in tree order. Childless nodes are columns
    /// even before a physical type is known for them.
    pub fn leaves(&self) -> Vec<String> {
        let mut leaves = vec![];
        self.leaves_into(&mut leaves);
        leaves
    }

    fn leaves_into(&self, leaves: &mut Vec<String>) {
        if self.children.is_empty() {
            if self.name != "." {
                leaves.push(self.name.clone());
            }
        } else {
            for child in self.children.values() {
                child.leaves_into(leaves);
            }
        }
    }

    pub(crate) fn leaf_count(&self) -> usize {
        if self.children.is_empty() {
            usize::from(self.name != ".")
        } else {
            self.children.values().map(Self::leaf_count).sum()
        }
    }

    /// Returns a copy pruned to the branches intersecting `prefix`.
    pub fn select(&self, prefix: &str) -> SchemaTree {
        let mut selected = self.clone_shallow();
        for (key, child) in &self.children {
            if path::starts_with(&child.name, prefix) {
                selected.children.insert(key.clone(), child.clone());
            } else if path::starts_with(prefix, &child.name) {
                selected.children.insert(key.clone(), child.select(prefix));
            }
        }
        selected
    }

    fn clone_shallow(&self) -> SchemaTree {
        Self {
            name: self.name.clone(),
            repetition: self.repetition,
            physical_type: self.physical_type,
            converted_type: self.converted_type,
            type_length: self.type_length,
            children: IndexMap::new(),
            locked: self.locked,
        }
    }

    pub(crate) fn children_mut(&mut self) -> &mut IndexMap<String, SchemaTree> {
        &mut self.children
    }

    pub(crate) fn insert_child(&mut self, key: String, child: SchemaTree) {
        self.children.insert(key, child);
    }

    /// Appends an undeclared child while shredding an unlocked schema.
    pub(crate) fn grow_child(
        &mut self,
        simple: &str,
        repetition: Repetition,
        info: TypeInfo,
    ) -> Result<&mut SchemaTree> {
        let qualified = path::concat(&self.name, simple);
        tracing::debug!("schema grows the undeclared column {:?}", qualified);
        let child = Self::chain(&qualified, &[repetition], info, self.locked)?;
        Ok(self.children.entry(simple.to_string()).or_insert(child))
    }

    /// Gives a repeated node the element layer inferred from its first item.
    pub(crate) fn grow_synthetic(&mut self, info: TypeInfo) {
        let name = self.name.clone();
        let locked = self.locked;
        self.children.entry(".".to_string()).or_insert_with(|| Self {
            name,
            repetition: Repetition::Optional,
            physical_type: info.physical_type,
            converted_type: info.converted_type,
            type_length: info.byte_width,
            children: IndexMap::new(),
            locked,
        });
    }

    /// Records the type a still-typeless leaf first observes.
    pub(crate) fn record_type(&mut self, info: &TypeInfo) {
        self.physical_type = info.physical_type;
        self.converted_type = info.converted_type;
        self.type_length = info.byte_width;
    }

    /// Widens the recorded byte width, keeping the maximum seen.
    pub(crate) fn widen(&mut self, byte_width: Option<i32>) {
        self.type_length = match (self.type_length, byte_width) {
            (Some(current), Some(new)) => Some(current.max(new)),
            (current, new) => current.or(new),
        };
    }
}

fn skip_synthetic_mut(node: &mut SchemaTree) -> &mut SchemaTree {
    let mut node = node;
    while node.children.contains_key(".") {
        node = match node.children.get_mut(".") {
            Some(inner) => inner,
            None => unreachable!("checked above"),
        };
    }
    node
}
