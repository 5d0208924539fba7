use crate::error::ModelError;

use super::{Element, Node, Position, Range, Schema, Selection};

/// A single applied mutation, recorded for the history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    Insert { position: Position, nodes: Vec<Node> },
    Remove { position: Position, nodes: Vec<Node> },
}

/// Mutation scope handed out by [`crate::Document::enqueue_changes`].
///
/// Every change made through a writer is collected into the same batch and
/// becomes part of one undoable unit.
pub struct Writer<'a> {
    root: &'a mut Element,
    selection: &'a mut Selection,
    schema: &'a Schema,
    operations: Vec<Operation>,
    selection_changed: bool,
}

impl<'a> Writer<'a> {
    pub(crate) fn new(
        root: &'a mut Element,
        selection: &'a mut Selection,
        schema: &'a Schema,
    ) -> Self {
        Self {
            root,
            selection,
            schema,
            operations: Vec::new(),
            selection_changed: false,
        }
    }

    pub(crate) fn finish(self) -> (Vec<Operation>, bool) {
        (self.operations, self.selection_changed)
    }

    pub fn root(&self) -> &Element {
        &*self.root
    }

    pub fn schema(&self) -> &Schema {
        self.schema
    }

    pub fn selection(&self) -> &Selection {
        &*self.selection
    }

    pub fn set_selection(&mut self, selection: Selection) {
        if *self.selection != selection {
            *self.selection = selection;
            self.selection_changed = true;
        }
    }

    pub fn insert(&mut self, position: &Position, node: impl Into<Node>) -> Result<(), ModelError> {
        self.insert_nodes(position, vec![node.into()])
    }

    /// Inserts `nodes` at `position`, refusing anything the schema does not
    /// allow in the parent.
    pub fn insert_nodes(&mut self, position: &Position, nodes: Vec<Node>) -> Result<(), ModelError> {
        if nodes.is_empty() {
            return Ok(());
        }
        let schema = self.schema;
        let parent = self
            .root
            .descendant_mut(position.parent_path())
            .ok_or_else(|| ModelError::InvalidPosition(position.clone()))?;
        if position.offset() > parent.max_offset() {
            return Err(ModelError::InvalidPosition(position.clone()));
        }
        if let Some(rejected) = nodes
            .iter()
            .find(|node| !schema.check_child(parent.name(), node.schema_name()))
        {
            return Err(ModelError::SchemaViolation {
                child: rejected.schema_name().to_string(),
                parent: parent.name().to_string(),
            });
        }
        parent.insert_at(position.offset(), nodes.clone());
        self.operations.push(Operation::Insert {
            position: position.clone(),
            nodes,
        });
        Ok(())
    }

    /// Removes everything `range` spans and returns the removed nodes in
    /// document order. Non-flat ranges are removed flat range by flat range,
    /// last one first, so earlier paths stay valid.
    pub fn remove(&mut self, range: &Range) -> Result<Vec<Node>, ModelError> {
        let flat_ranges = range.minimal_flat_ranges(&*self.root)?;
        let mut removed = Vec::new();
        for flat in flat_ranges.iter().rev() {
            let parent = self
                .root
                .descendant_mut(flat.start().parent_path())
                .ok_or_else(|| ModelError::InvalidPosition(flat.start().clone()))?;
            if flat.end().offset() > parent.max_offset() {
                return Err(ModelError::InvalidPosition(flat.end().clone()));
            }
            let nodes = parent.remove_range(flat.start().offset(), flat.end().offset());
            removed.splice(0..0, nodes.iter().cloned());
            self.operations.push(Operation::Remove {
                position: flat.start().clone(),
                nodes,
            });
        }
        Ok(removed)
    }
}
