use tracing::trace;

use crate::delete::{DeleteUnit, Direction};
use crate::document::Document;
use crate::model::{ChildRef, Element, Position, Schema, Selection, TEXT};
use crate::text::{
    next_grapheme_boundary, next_word_boundary, previous_grapheme_boundary, previous_word_boundary,
};

use super::SelectionExtender;

/// Moves the focus through the tree the way a caret moves.
///
/// Inside text the focus moves by the requested unit. Objects are jumped
/// over as a whole. Crossing into or out of an element stops at the first
/// position that can hold text, and the walk never leaves the limit element.
#[derive(Clone, Copy, Debug, Default)]
pub struct ModelSelectionExtender;

impl SelectionExtender for ModelSelectionExtender {
    fn extend(
        &self,
        document: &Document,
        selection: &mut Selection,
        direction: Direction,
        unit: DeleteUnit,
    ) {
        let root = document.root();
        let schema = document.schema();
        let limit = schema.limit_element(root, selection);
        let focus = selection.focus().clone();
        match next_focus(root, schema, &limit, focus, direction, unit) {
            Some(target) => {
                trace!(?target, ?direction, ?unit, "extended selection");
                selection.set_focus(target);
            }
            None => trace!(?direction, ?unit, "selection cannot be extended"),
        }
    }
}

fn allows_text(schema: &Schema, element: &Element) -> bool {
    schema.check_child(element.name(), TEXT)
}

fn next_focus(
    root: &Element,
    schema: &Schema,
    limit: &[usize],
    mut position: Position,
    direction: Direction,
    unit: DeleteUnit,
) -> Option<Position> {
    loop {
        let parent = root.descendant(position.parent_path())?;
        let offset = position.offset();
        let item = match direction {
            Direction::Forward => parent.item_after(offset),
            Direction::Backward => parent.item_before(offset),
        };

        match item {
            Some(ChildRef::Text { .. }) => {
                let (run_start, run) = parent.text_run_at(offset)?;
                let local = offset - run_start;
                let moved = match (direction, unit) {
                    (Direction::Forward, DeleteUnit::Character) => next_grapheme_boundary(&run, local),
                    (Direction::Forward, DeleteUnit::CodePoint) => local + 1,
                    (Direction::Forward, DeleteUnit::Word) => next_word_boundary(&run, local),
                    (Direction::Backward, DeleteUnit::Character) => {
                        previous_grapheme_boundary(&run, local)
                    }
                    (Direction::Backward, DeleteUnit::CodePoint) => local.saturating_sub(1),
                    (Direction::Backward, DeleteUnit::Word) => previous_word_boundary(&run, local),
                };
                return Some(position.with_offset(run_start + moved));
            }
            Some(ChildRef::Element {
                element,
                offset: child_offset,
            }) => {
                let node = position.with_offset(child_offset);
                if schema.is_object(element.name()) {
                    return match direction {
                        Direction::Forward => Position::after(node.path()),
                        Direction::Backward => Position::before(node.path()),
                    }
                    .ok();
                }
                position = match direction {
                    Direction::Forward => Position::at_start(node.path()),
                    Direction::Backward => Position::at(node.path(), element.max_offset()),
                };
                if allows_text(schema, element) {
                    return Some(position);
                }
            }
            None => {
                let parent_path = position.parent_path();
                if parent_path.is_empty()
                    || parent_path == limit
                    || schema.is_limit(parent.name())
                {
                    return None;
                }
                position = match direction {
                    Direction::Forward => Position::after(parent_path),
                    Direction::Backward => Position::before(parent_path),
                }
                .ok()?;
                let outer = root.descendant(position.parent_path())?;
                if allows_text(schema, outer) {
                    return Some(position);
                }
            }
        }
    }
}
