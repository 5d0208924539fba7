use tracing::{debug, trace};

use crate::error::ModelError;
use crate::model::{ChildRef, Element, Node, Position, Range, Selection, TEXT, Writer};

use super::{ContentRemover, DeleteContentOptions};

/// Removes selected content and stitches the remaining blocks together.
///
/// After removal the block holding the end of the range is merged into the
/// block holding its start, unless a limit element sits in between. When
/// the start block was emptied and the end block was not, the start block
/// goes away instead, so the surviving block keeps its type.
#[derive(Clone, Copy, Debug, Default)]
pub struct ModelContentRemover;

impl ContentRemover for ModelContentRemover {
    fn delete_content(
        &self,
        writer: &mut Writer<'_>,
        selection: &mut Selection,
        options: DeleteContentOptions,
    ) -> Result<(), ModelError> {
        if selection.is_collapsed() {
            return Ok(());
        }
        let range = selection.first_range().clone();
        let limit = writer.schema().limit_element(writer.root(), selection);

        if !options.do_not_reset_entire_content && contains_entire_content(writer, &range, &limit)? {
            debug!(?limit, "selection spans the whole limit element, resetting it");
            let position = replace_entire_content(writer, &limit)?;
            *selection = Selection::collapsed(position);
            return Ok(());
        }

        writer.remove(&range)?;
        let mut collapse = range.start().clone();
        if !range.is_flat() {
            collapse = merge_branches(writer, &range)?;
        }
        let collapse = ensure_text_position(writer, collapse)?;
        trace!(?collapse, "content removed");
        *selection = Selection::collapsed(collapse);
        Ok(())
    }
}

/// Empties the element at `limit` and puts a single default block in it.
/// Returns the position inside that block.
pub(crate) fn replace_entire_content(
    writer: &mut Writer<'_>,
    limit: &[usize],
) -> Result<Position, ModelError> {
    let content = Range::in_element(writer.root(), limit)?;
    writer.remove(&content)?;
    let block = Element::new(writer.schema().default_block());
    let at = Position::at_start(limit);
    writer.insert(&at, block)?;
    Ok(Position::at_start(at.path()))
}

fn contains_entire_content(
    writer: &Writer<'_>,
    range: &Range,
    limit: &[usize],
) -> Result<bool, ModelError> {
    if range.is_flat() {
        return Ok(false);
    }
    let root = writer.root();
    let limit_element = root
        .descendant(limit)
        .ok_or_else(|| ModelError::NotAnElement(limit.to_vec()))?;
    let limit_start = Position::at_start(limit);
    let limit_end = Position::at(limit, limit_element.max_offset());
    Ok(range.start().is_touching(&limit_start, root)
        && range.end().is_touching(&limit_end, root)
        && writer
            .schema()
            .check_child(limit_element.name(), writer.schema().default_block()))
}

/// Joins the block the range ended in with the block it started in. Called
/// after the range content was removed. Returns where the selection
/// collapses.
fn merge_branches(writer: &mut Writer<'_>, range: &Range) -> Result<Position, ModelError> {
    let start = range.start().clone();
    let start_parent = start.parent_path().to_vec();
    let common = range.common_ancestor().len();
    let end_depth = range.end().parent_path().len();
    if start_parent.len() == common || end_depth == common {
        return Ok(start);
    }

    // The end branch now directly follows the start branch below the common
    // ancestor, and its deeper ancestors start at offset zero.
    let mut end_parent = start_parent[..common].to_vec();
    end_parent.push(start_parent[common] + 1);
    end_parent.resize(end_depth, 0);

    let root = writer.root();
    let schema = writer.schema();
    for depth in common + 1..=start_parent.len().max(end_depth) {
        let crosses_limit = [&start_parent, &end_parent]
            .into_iter()
            .filter(|path| path.len() >= depth)
            .filter_map(|path| root.descendant(&path[..depth]))
            .any(|element| schema.is_limit(element.name()));
        if crosses_limit {
            trace!("merge stopped at a limit element");
            return Ok(start);
        }
    }

    let start_element = root
        .descendant(&start_parent)
        .ok_or_else(|| ModelError::NotAnElement(start_parent.clone()))?;
    let end_element = root
        .descendant(&end_parent)
        .ok_or_else(|| ModelError::NotAnElement(end_parent.clone()))?;

    let siblings = start_parent.len() == common + 1 && end_depth == common + 1;
    if siblings && start_element.is_empty() && !end_element.is_empty() {
        trace!("merging into the end block");
        writer.remove(&Range::on_node(&start_parent)?)?;
        return Ok(Position::at_start(&start_parent));
    }

    let moved: Vec<Node> = end_element.children().to_vec();
    if moved
        .iter()
        .any(|child| !schema.check_child(start_element.name(), child.schema_name()))
    {
        trace!("end block content not allowed in start block");
        return Ok(start);
    }

    let at = Position::at(&start_parent, start_element.max_offset());
    writer.insert_nodes(&at, moved)?;
    writer.remove(&Range::on_node(&end_parent)?)?;

    let mut path = end_parent;
    path.pop();
    while path.len() > common {
        if !writer.root().descendant(&path).is_some_and(Element::is_empty) {
            break;
        }
        writer.remove(&Range::on_node(&path)?)?;
        path.pop();
    }
    Ok(start)
}

/// Moves `position` into a block that can hold text when it landed directly
/// in a container. Prefers a neighbouring text block and falls back to
/// inserting a fresh default block.
fn ensure_text_position(writer: &mut Writer<'_>, position: Position) -> Result<Position, ModelError> {
    let schema = writer.schema();
    let parent = position.parent(writer.root())?;
    if schema.check_child(parent.name(), TEXT)
        || !schema.check_child(parent.name(), schema.default_block())
    {
        return Ok(position);
    }

    let offset = position.offset();
    if let Some(ChildRef::Element { element, .. }) = parent.item_after(offset) {
        if schema.check_child(element.name(), TEXT) {
            return Ok(Position::at_start(position.path()));
        }
    }
    if let Some(ChildRef::Element {
        element,
        offset: before,
    }) = parent.item_before(offset)
    {
        if schema.check_child(element.name(), TEXT) {
            return Ok(Position::at(
                position.with_offset(before).path(),
                element.max_offset(),
            ));
        }
    }

    debug!(?position, "inserting a default block at the collapse point");
    let block = Element::new(schema.default_block());
    writer.insert(&position, block)?;
    Ok(Position::at_start(position.path()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::model::stringify;

    fn removed(markup: &str, do_not_reset_entire_content: bool) -> String {
        let mut document = Document::from_markup(markup).unwrap();
        let mut selection = document.selection().clone();
        let options = DeleteContentOptions {
            do_not_reset_entire_content,
            ..DeleteContentOptions::default()
        };
        document
            .change(|writer| {
                ModelContentRemover.delete_content(writer, &mut selection, options)?;
                writer.set_selection(selection.clone());
                Ok(())
            })
            .unwrap();
        stringify(document.root(), Some(document.selection()))
    }

    #[test]
    fn removes_text_inside_one_block() {
        assert_eq!(
            removed("<paragraph>He[llo] World</paragraph>", false),
            "<paragraph>He[] World</paragraph>"
        );
    }

    #[test]
    fn merges_end_block_into_start_block() {
        assert_eq!(
            removed("<paragraph>a[b</paragraph><heading1>c]d</heading1>", true),
            "<paragraph>a[]d</paragraph>"
        );
        assert_eq!(
            removed("<paragraph>ab[</paragraph><paragraph>]cd</paragraph>", true),
            "<paragraph>ab[]cd</paragraph>"
        );
    }

    #[test]
    fn keeps_end_block_when_start_block_is_emptied() {
        assert_eq!(
            removed("<paragraph>[</paragraph><heading1>]cd</heading1>", true),
            "<heading1>[]cd</heading1>"
        );
    }

    #[test]
    fn drops_containers_emptied_by_the_merge() {
        assert_eq!(
            removed(
                "<paragraph>a[b</paragraph><blockQuote><paragraph>c]d</paragraph></blockQuote>",
                true
            ),
            "<paragraph>a[]d</paragraph>"
        );
        assert_eq!(
            removed(
                "<paragraph>a[b</paragraph><blockQuote><paragraph>c]d</paragraph><paragraph>e</paragraph></blockQuote>",
                true
            ),
            "<paragraph>a[]d</paragraph><blockQuote><paragraph>e</paragraph></blockQuote>"
        );
    }

    #[test]
    fn resets_entire_content_unless_suppressed() {
        assert_eq!(
            removed("<heading1>[ab</heading1><paragraph>cd]</paragraph>", false),
            "<paragraph>[]</paragraph>"
        );
        assert_eq!(
            removed("<heading1>[ab</heading1><paragraph>cd]</paragraph>", true),
            "<heading1>[]</heading1>"
        );
    }

    #[test]
    fn removed_object_leaves_selection_in_next_block() {
        assert_eq!(
            removed(
                "<paragraph>a</paragraph>[<horizontalLine></horizontalLine><paragraph>]b</paragraph>",
                true
            ),
            "<paragraph>a</paragraph><paragraph>[]b</paragraph>"
        );
    }

    #[test]
    fn inserts_default_block_when_nothing_can_hold_text() {
        assert_eq!(
            removed("[<horizontalLine></horizontalLine>]", true),
            "<paragraph>[]</paragraph>"
        );
    }

    #[test]
    fn does_not_merge_across_table_cells() {
        let markup = "<table><tableRow>\
            <tableCell><paragraph>a[b</paragraph></tableCell>\
            <tableCell><paragraph>c]d</paragraph></tableCell>\
            </tableRow></table>";
        assert_eq!(
            removed(markup, true),
            "<table><tableRow><tableCell><paragraph>a[]</paragraph></tableCell>\
             <tableCell><paragraph>d</paragraph></tableCell></tableRow></table>"
        );
    }
}
