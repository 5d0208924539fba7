//! The delete and forward-delete command.
//!
//! A collapsed selection is first extended by one unit in the command
//! direction. Whatever the extended selection covers is removed and the
//! number of removed units is reported to the command's [`ChangeBuffer`], so
//! that a run of keystrokes ends up as one undo step. When there is nothing
//! left to extend into and the document is otherwise empty, the remaining
//! block is turned into a default block.

use tracing::{debug, trace};

use crate::change_buffer::{ChangeBuffer, ChangeBufferConfig, ChangeScope};
use crate::document::Document;
use crate::error::{ChangeBufferError, DeleteError};
use crate::model::{Position, Selection};
use crate::services::{
    ContentRemover, DeleteContentOptions, ModelContentRemover, ModelSelectionExtender,
    SelectionExtender, replace_entire_content,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Delete: removes what follows the caret.
    Forward,
    /// Backspace: removes what precedes the caret.
    #[default]
    Backward,
}

/// Granularity a collapsed selection is extended by.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DeleteUnit {
    /// One user-perceived character (extended grapheme cluster).
    #[default]
    Character,
    /// One Unicode scalar value.
    CodePoint,
    /// Up to the next word boundary.
    Word,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeleteOptions {
    pub unit: DeleteUnit,
    /// Position of this request in a run of repeated key events. `0` counts
    /// as `1`.
    pub sequence: usize,
    /// Deletes this selection instead of the document selection.
    pub selection: Option<Selection>,
}

impl Default for DeleteOptions {
    fn default() -> Self {
        Self {
            unit: DeleteUnit::default(),
            sequence: 1,
            selection: None,
        }
    }
}

impl DeleteOptions {
    pub fn with_unit(mut self, unit: DeleteUnit) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_sequence(mut self, sequence: usize) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = Some(selection);
        self
    }
}

#[derive(Clone, Debug)]
pub struct DeleteCommand<E = ModelSelectionExtender, R = ModelContentRemover> {
    direction: Direction,
    buffer: ChangeBuffer,
    extender: E,
    remover: R,
}

impl DeleteCommand {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            buffer: ChangeBuffer::default(),
            extender: ModelSelectionExtender,
            remover: ModelContentRemover,
        }
    }

    pub fn backward() -> Self {
        Self::new(Direction::Backward)
    }

    pub fn forward() -> Self {
        Self::new(Direction::Forward)
    }
}

impl<E, R> DeleteCommand<E, R>
where
    E: SelectionExtender,
    R: ContentRemover,
{
    pub fn with_config(mut self, config: ChangeBufferConfig) -> Self {
        self.buffer = ChangeBuffer::new(config);
        self
    }

    /// Swaps the selection extender and content remover.
    pub fn with_services<E2, R2>(self, extender: E2, remover: R2) -> DeleteCommand<E2, R2>
    where
        E2: SelectionExtender,
        R2: ContentRemover,
    {
        DeleteCommand {
            direction: self.direction,
            buffer: self.buffer,
            extender,
            remover,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn buffer(&self) -> &ChangeBuffer {
        &self.buffer
    }

    /// Opens an outer step. Every execution until the matching
    /// [`DeleteCommand::unlock`] lands in the same undo step.
    pub fn lock(&mut self, document: &mut Document) {
        self.buffer.lock(document);
    }

    pub fn unlock(&mut self, document: &mut Document) -> Result<(), ChangeBufferError> {
        self.buffer.unlock(document)
    }

    pub fn flush(&mut self, document: &mut Document) -> Result<(), ChangeBufferError> {
        self.buffer.flush(document)
    }

    pub fn execute(&mut self, document: &mut Document, options: DeleteOptions) -> Result<(), DeleteError> {
        let direction = self.direction;
        let mut scope = ChangeScope::open(&mut self.buffer, document);
        if scope.document().is_read_only() {
            debug!("document is read-only, nothing deleted");
            return Ok(());
        }

        let sequence = options.sequence.max(1);
        let mut working = match options.selection {
            Some(selection) => {
                let root = scope.document().root();
                for range in selection.ranges() {
                    range.start().validate(root)?;
                    range.end().validate(root)?;
                }
                selection
            }
            None => scope.document().selection().clone(),
        }
        .without_collapsed_ranges();

        let was_collapsed = working.is_collapsed();
        if was_collapsed {
            self.extender
                .extend(scope.document(), &mut working, direction, options.unit);
        }

        if working.is_collapsed() {
            if sequence > 1 {
                debug!(sequence, "repeated delete with nothing to remove, skipped");
                return Ok(());
            }
            if should_replace_entire_content(scope.document(), &working, sequence) {
                let document = scope.document();
                let limit = document.schema().limit_element(document.root(), &working);
                debug!(?limit, "replacing the only block with a default block");
                let batch = scope.batch();
                scope.document().enqueue_changes(batch, |writer| {
                    let position = replace_entire_content(writer, &limit)?;
                    writer.set_selection(Selection::collapsed(position));
                    Ok(())
                })?;
            }
            return Ok(());
        }

        let change_count = working.first_range().count_units(scope.document().root())?;
        trace!(change_count, was_collapsed, "deleting selection");

        let batch = scope.batch();
        let remover = &self.remover;
        let options = DeleteContentOptions {
            do_not_reset_entire_content: was_collapsed,
            direction,
        };
        scope.document().enqueue_changes(batch, |writer| {
            remover.delete_content(writer, &mut working, options)?;
            writer.set_selection(working);
            Ok(())
        })?;
        scope.input(change_count)?;
        Ok(())
    }
}

/// Whether a collapsed selection that cannot be extended sits in an
/// otherwise empty limit element whose only block is not a default block.
fn should_replace_entire_content(document: &Document, selection: &Selection, sequence: usize) -> bool {
    if sequence != 1 {
        return false;
    }
    let root = document.root();
    let schema = document.schema();
    let limit = schema.limit_element(root, selection);
    let Some(limit_element) = root.descendant(&limit) else {
        return false;
    };

    let limit_start = Position::at_start(&limit);
    let limit_end = Position::at(&limit, limit_element.max_offset());
    if !selection.first_position().is_touching(&limit_start, root)
        || !selection.last_position().is_touching(&limit_end, root)
    {
        return false;
    }
    if !schema.check_child(limit_element.name(), schema.default_block()) {
        return false;
    }
    let ancestor = selection.first_range().common_ancestor();
    root.descendant(&ancestor)
        .is_some_and(|element| element.name() != schema.default_block())
}

#[cfg(test)]
#[path = "delete_tests.rs"]
mod delete_tests;
