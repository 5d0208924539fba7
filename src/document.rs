use tracing::trace;

use crate::error::ModelError;
use crate::history::{BatchId, History};
use crate::model::{
    Element, Node, Position, ROOT, Schema, Selection, TEXT, Writer, import_tdoc, parse_markup,
    stringify,
};

/// A model tree together with its selection, schema and change history.
#[derive(Clone, Debug)]
pub struct Document {
    root: Element,
    selection: Selection,
    schema: Schema,
    history: History,
    version: u64,
    selection_version: u64,
    last_batch: Option<BatchId>,
    read_only: bool,
}

impl Document {
    /// Wraps `root`, placing the selection at the first position that can
    /// hold text.
    pub fn new(root: Element) -> Self {
        let schema = Schema::default();
        let selection = Selection::collapsed(first_text_position(&root, &schema));
        Self {
            root,
            selection,
            schema,
            history: History::new(),
            version: 0,
            selection_version: 0,
            last_batch: None,
            read_only: false,
        }
    }

    pub fn empty() -> Self {
        Self::new(Element::new(ROOT))
    }

    pub fn from_tdoc(document: &tdoc::Document) -> Self {
        Self::new(import_tdoc(document))
    }

    /// Parses markup such as `<paragraph>fo[]o</paragraph>`. Without
    /// selection markers the default selection is used.
    pub fn from_markup(markup: &str) -> Result<Self, ModelError> {
        let (root, selection) = parse_markup(markup)?;
        let document = Self::new(root);
        match selection {
            Some(selection) => document.with_selection(selection),
            None => Ok(document),
        }
    }

    /// Swaps the schema. A caret that sits where the new schema no longer
    /// allows text moves to the first position that does; any other
    /// selection is kept.
    pub fn with_schema(mut self, schema: Schema) -> Self {
        let caret_fits = !self.selection.is_collapsed()
            || self
                .selection
                .first_position()
                .parent(&self.root)
                .is_ok_and(|parent| schema.check_child(parent.name(), TEXT));
        if !caret_fits {
            self.selection = Selection::collapsed(first_text_position(&self.root, &schema));
            self.selection_version += 1;
        }
        self.schema = schema;
        self
    }

    pub fn with_selection(mut self, selection: Selection) -> Result<Self, ModelError> {
        self.set_selection(selection)?;
        Ok(self)
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Replaces the selection outside of any batch. Every position must
    /// resolve inside the tree.
    pub fn set_selection(&mut self, selection: Selection) -> Result<(), ModelError> {
        for range in selection.ranges() {
            range.start().validate(&self.root)?;
            range.end().validate(&self.root)?;
        }
        if self.selection != selection {
            self.selection = selection;
            self.selection_version += 1;
        }
        Ok(())
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    /// Incremented whenever a batch applies at least one operation.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Incremented whenever the selection changes.
    pub fn selection_version(&self) -> u64 {
        self.selection_version
    }

    /// Batch of the most recent change that applied operations.
    pub fn last_batch(&self) -> Option<BatchId> {
        self.last_batch
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Path of the nearest limit element around the selection.
    pub fn limit_element(&self) -> Vec<usize> {
        self.schema.limit_element(&self.root, &self.selection)
    }

    pub fn to_markup(&self) -> String {
        stringify(&self.root, Some(&self.selection))
    }

    /// Applies `f` as one atomic update recorded under `batch`.
    ///
    /// If `f` fails, the tree and the selection are restored and nothing is
    /// recorded.
    pub fn enqueue_changes<T, F>(&mut self, batch: BatchId, f: F) -> Result<T, ModelError>
    where
        F: FnOnce(&mut Writer<'_>) -> Result<T, ModelError>,
    {
        let root_snapshot = self.root.clone();
        let selection_snapshot = self.selection.clone();

        let mut writer = Writer::new(&mut self.root, &mut self.selection, &self.schema);
        let result = f(&mut writer);
        let (operations, selection_changed) = writer.finish();

        match result {
            Ok(value) => {
                if !operations.is_empty() {
                    trace!(batch = batch.get(), operations = operations.len(), "applied changes");
                    self.history.record(batch, operations);
                    self.version += 1;
                    self.last_batch = Some(batch);
                }
                if selection_changed {
                    self.selection_version += 1;
                }
                Ok(value)
            }
            Err(err) => {
                trace!(batch = batch.get(), %err, "rolled back changes");
                self.root = root_snapshot;
                self.selection = selection_snapshot;
                Err(err)
            }
        }
    }

    /// Applies `f` in a fresh batch that is closed as its own undo step.
    pub fn change<T, F>(&mut self, f: F) -> Result<T, ModelError>
    where
        F: FnOnce(&mut Writer<'_>) -> Result<T, ModelError>,
    {
        let batch = self.history.create_batch();
        let result = self.enqueue_changes(batch, f);
        self.history.close_step(batch, 0);
        result
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

/// First position, in document order, whose parent accepts text. Falls back
/// to the start of the root.
pub(crate) fn first_text_position(root: &Element, schema: &Schema) -> Position {
    let mut path = Vec::new();
    find_text_position(root, schema, &mut path).unwrap_or_else(|| Position::at_start(&[]))
}

fn find_text_position(element: &Element, schema: &Schema, path: &mut Vec<usize>) -> Option<Position> {
    if schema.item(element.name()).is_some_and(|item| item.allow_text) {
        return Some(Position::at_start(path));
    }
    let mut offset = 0;
    for child in element.children() {
        if let Node::Element(child) = child {
            path.push(offset);
            let found = find_text_position(child, schema, path);
            path.pop();
            if found.is_some() {
                return found;
            }
        }
        offset += child.offset_size();
    }
    None
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod document_tests;
