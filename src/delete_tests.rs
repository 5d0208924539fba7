use std::cell::Cell;

use super::*;
use crate::error::ModelError;
use crate::model::{Element, Range, Schema, Writer};

fn backspace(markup: &str) -> (Document, DeleteCommand) {
    let mut document = Document::from_markup(markup).unwrap();
    let mut command = DeleteCommand::backward();
    command.execute(&mut document, DeleteOptions::default()).unwrap();
    (document, command)
}

fn forward(markup: &str, unit: DeleteUnit) -> String {
    let mut document = Document::from_markup(markup).unwrap();
    DeleteCommand::forward()
        .execute(&mut document, DeleteOptions::default().with_unit(unit))
        .unwrap();
    document.to_markup()
}

#[test]
fn removes_selected_text_and_counts_characters() -> anyhow::Result<()> {
    let (mut document, mut command) = backspace("<paragraph>He[llo] World</paragraph>");
    assert_eq!(document.to_markup(), "<paragraph>He[] World</paragraph>");
    assert_eq!(command.buffer().size(), 3);
    assert!(!command.buffer().is_locked());

    command.flush(&mut document)?;
    let steps = document.history().steps();
    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0].units, 3);
    Ok(())
}

#[test]
fn empty_heading_becomes_default_block() -> anyhow::Result<()> {
    let (mut document, mut command) = backspace("<heading1>[]</heading1>");
    assert_eq!(document.to_markup(), "<paragraph>[]</paragraph>");
    assert_eq!(command.buffer().size(), 0);

    command.flush(&mut document)?;
    let steps = document.history().steps();
    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0].units, 0);
    assert_eq!(steps[0].operations.len(), 2);
    Ok(())
}

#[test]
fn repeated_delete_with_nothing_to_remove_is_a_no_op() {
    let mut document = Document::from_markup("<heading1>[]</heading1>").unwrap();
    let mut command = DeleteCommand::backward();
    command
        .execute(&mut document, DeleteOptions::default().with_sequence(2))
        .unwrap();
    assert_eq!(document.to_markup(), "<heading1>[]</heading1>");
    assert_eq!(document.version(), 0);
    assert_eq!(document.history().open_batches().count(), 0);
}

#[test]
fn empty_block_stays_when_default_block_is_not_allowed_in_limit() -> anyhow::Result<()> {
    let mut document = Document::from_markup("<heading1>[]</heading1>")?
        .with_schema(Schema::default().with_default_block("caption"));
    let mut command = DeleteCommand::backward();
    command.execute(&mut document, DeleteOptions::default())?;

    assert_eq!(document.to_markup(), "<heading1>[]</heading1>");
    assert_eq!(document.version(), 0);
    assert_eq!(command.buffer().size(), 0);
    Ok(())
}

#[test]
fn lone_empty_default_block_is_left_alone() {
    let (document, command) = backspace("<paragraph>[]</paragraph>");
    assert_eq!(document.to_markup(), "<paragraph>[]</paragraph>");
    assert_eq!(document.version(), 0);
    assert_eq!(command.buffer().size(), 0);
}

#[test]
fn sequence_zero_counts_as_first_press() {
    let mut document = Document::from_markup("<heading2>[]</heading2>").unwrap();
    DeleteCommand::backward()
        .execute(&mut document, DeleteOptions::default().with_sequence(0))
        .unwrap();
    assert_eq!(document.to_markup(), "<paragraph>[]</paragraph>");
}

#[test]
fn backspace_at_start_of_non_empty_document_does_nothing() {
    let (document, _) = backspace("<paragraph>[]ab</paragraph>");
    assert_eq!(document.to_markup(), "<paragraph>[]ab</paragraph>");
    assert_eq!(document.version(), 0);
}

#[test]
fn collapsed_backspace_removes_one_character() {
    let (document, command) = backspace("<paragraph>ab[]c</paragraph>");
    assert_eq!(document.to_markup(), "<paragraph>a[]c</paragraph>");
    assert_eq!(command.buffer().size(), 1);
}

#[test]
fn forward_delete_uses_the_requested_unit() {
    assert_eq!(
        forward("<paragraph>a[]bc</paragraph>", DeleteUnit::Character),
        "<paragraph>a[]c</paragraph>"
    );
    assert_eq!(
        forward("<paragraph>[]foo bar</paragraph>", DeleteUnit::Word),
        "<paragraph>[]bar</paragraph>"
    );
    assert_eq!(
        forward("<paragraph>a[]e\u{301}b</paragraph>", DeleteUnit::CodePoint),
        "<paragraph>a[]\u{301}b</paragraph>"
    );
}

#[test]
fn word_backspace_removes_the_previous_word() {
    let mut document = Document::from_markup("<paragraph>foo bar[]</paragraph>").unwrap();
    let mut command = DeleteCommand::backward();
    command
        .execute(&mut document, DeleteOptions::default().with_unit(DeleteUnit::Word))
        .unwrap();
    assert_eq!(document.to_markup(), "<paragraph>foo []</paragraph>");
    assert_eq!(command.buffer().size(), 3);
}

#[test]
fn backspace_at_block_start_merges_into_previous_block() {
    let (document, command) = backspace("<paragraph>ab</paragraph><heading1>[]cd</heading1>");
    assert_eq!(document.to_markup(), "<paragraph>ab[]cd</paragraph>");
    assert_eq!(command.buffer().size(), 0);
}

#[test]
fn backspace_after_empty_block_keeps_the_current_block() {
    let (document, _) = backspace("<paragraph></paragraph><heading1>[]cd</heading1>");
    assert_eq!(document.to_markup(), "<heading1>[]cd</heading1>");
}

#[test]
fn backspace_after_object_removes_it_whole() {
    let (document, command) =
        backspace("<paragraph>a</paragraph><horizontalLine></horizontalLine><paragraph>[]b</paragraph>");
    assert_eq!(
        document.to_markup(),
        "<paragraph>a</paragraph><paragraph>[]b</paragraph>"
    );
    assert_eq!(command.buffer().size(), 1);
}

#[test]
fn selection_over_everything_resets_to_default_block() {
    let (document, command) = backspace("<heading1>[ab</heading1><paragraph>cd]</paragraph>");
    assert_eq!(document.to_markup(), "<paragraph>[]</paragraph>");
    assert_eq!(command.buffer().size(), 4);
}

#[test]
fn empty_block_in_table_cell_is_reset_inside_the_cell() {
    let (document, _) = backspace(
        "<table><tableRow><tableCell><codeBlock>[]</codeBlock></tableCell></tableRow></table>",
    );
    assert_eq!(
        document.to_markup(),
        "<table><tableRow><tableCell><paragraph>[]</paragraph></tableCell></tableRow></table>"
    );
}

#[test]
fn consecutive_deletes_share_one_undo_step() -> anyhow::Result<()> {
    let mut document = Document::from_markup("<paragraph>abcd[]</paragraph>")?;
    let mut command = DeleteCommand::backward();
    for _ in 0..3 {
        command.execute(&mut document, DeleteOptions::default())?;
    }
    assert_eq!(document.to_markup(), "<paragraph>a[]</paragraph>");
    assert!(document.history().steps().is_empty());

    command.flush(&mut document)?;
    let steps = document.history().steps();
    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0].units, 3);
    assert_eq!(steps[0].operations.len(), 3);
    Ok(())
}

#[test]
fn nested_lock_groups_executions_into_one_step() -> anyhow::Result<()> {
    let mut document = Document::from_markup("<paragraph>abc[]</paragraph>")?;
    let mut command = DeleteCommand::backward();

    command.lock(&mut document);
    command.execute(&mut document, DeleteOptions::default())?;
    command.execute(&mut document, DeleteOptions::default())?;
    command.unlock(&mut document)?;
    assert!(document.history().steps().is_empty());
    assert_eq!(command.buffer().size(), 2);

    command.flush(&mut document)?;
    let steps = document.history().steps();
    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0].units, 2);
    assert_eq!(document.to_markup(), "<paragraph>a[]</paragraph>");
    Ok(())
}

#[test]
fn size_threshold_splits_unlocked_executions() -> anyhow::Result<()> {
    let mut document = Document::from_markup("<paragraph>abc[]</paragraph>")?;
    let config = ChangeBufferConfig::default().with_undo_step_size(1);
    let mut command = DeleteCommand::backward().with_config(config);
    command.execute(&mut document, DeleteOptions::default())?;
    command.execute(&mut document, DeleteOptions::default())?;
    assert_eq!(document.history().steps().len(), 2);
    Ok(())
}

#[test]
fn lock_misuse_is_reported() {
    let mut document = Document::from_markup("<paragraph>ab[]</paragraph>").unwrap();
    let mut command = DeleteCommand::backward();
    assert_eq!(command.unlock(&mut document), Err(ChangeBufferError::Unbalanced));

    command.lock(&mut document);
    assert_eq!(command.flush(&mut document), Err(ChangeBufferError::Locked(1)));
    command.unlock(&mut document).unwrap();
}

#[test]
fn read_only_document_is_untouched() {
    let mut document = Document::from_markup("<paragraph>ab[]</paragraph>").unwrap();
    document.set_read_only(true);
    let mut command = DeleteCommand::backward();
    command.execute(&mut document, DeleteOptions::default()).unwrap();
    assert_eq!(document.to_markup(), "<paragraph>ab[]</paragraph>");
    assert!(!command.buffer().is_locked());
}

#[test]
fn explicit_selection_is_deleted_instead_of_document_selection() -> anyhow::Result<()> {
    let mut document = Document::from_markup("<paragraph>[]ab cd</paragraph>")?;
    let target = Selection::from_range(Range::new(Position::at(&[0], 2), Position::at(&[0], 5)), false);
    DeleteCommand::backward().execute(&mut document, DeleteOptions::default().with_selection(target))?;
    assert_eq!(document.to_markup(), "<paragraph>ab[]</paragraph>");
    Ok(())
}

#[test]
fn explicit_selection_outside_the_tree_is_rejected() {
    let mut document = Document::from_markup("<paragraph>ab[]</paragraph>").unwrap();
    let mut command = DeleteCommand::backward();
    let target = Selection::collapsed(Position::at(&[3], 0));
    let err = command
        .execute(&mut document, DeleteOptions::default().with_selection(target))
        .unwrap_err();
    assert!(matches!(err, DeleteError::Model(ModelError::InvalidPosition(_))));
    assert!(!command.buffer().is_locked());
}

#[test]
fn collapsed_ranges_are_dropped_from_multi_range_selections() -> anyhow::Result<()> {
    let mut document = Document::from_markup("<paragraph>ab</paragraph><paragraph>cd</paragraph>")?;
    let mut command = DeleteCommand::backward();
    let target = Selection::from_ranges(
        vec![
            Range::collapsed(Position::at(&[0], 1)),
            Range::new(Position::at(&[1], 0), Position::at(&[1], 2)),
        ],
        false,
    )
    .unwrap();
    command.execute(&mut document, DeleteOptions::default().with_selection(target))?;

    assert_eq!(document.to_markup(), "<paragraph>ab</paragraph><paragraph>[]</paragraph>");
    assert_eq!(document.version(), 1);
    assert_eq!(command.buffer().size(), 2);
    Ok(())
}

#[test]
fn selection_of_only_collapsed_ranges_acts_as_a_caret() -> anyhow::Result<()> {
    let mut document = Document::from_markup("<paragraph>ab</paragraph><paragraph>cd</paragraph>")?;
    let mut command = DeleteCommand::backward();
    let target = Selection::from_ranges(
        vec![
            Range::collapsed(Position::at(&[0], 1)),
            Range::collapsed(Position::at(&[1], 1)),
        ],
        false,
    )
    .unwrap();
    command.execute(&mut document, DeleteOptions::default().with_selection(target))?;

    assert_eq!(document.to_markup(), "<paragraph>[]b</paragraph><paragraph>cd</paragraph>");
    assert_eq!(command.buffer().size(), 1);
    Ok(())
}

/// Removes the range, then breaks the schema.
struct InvalidRemover;

impl ContentRemover for InvalidRemover {
    fn delete_content(
        &self,
        writer: &mut Writer<'_>,
        selection: &mut Selection,
        _options: DeleteContentOptions,
    ) -> Result<(), ModelError> {
        writer.remove(selection.first_range())?;
        writer.insert(selection.first_position(), Element::new("heading1"))
    }
}

#[test]
fn failed_removal_rolls_the_document_back() {
    let mut document = Document::from_markup("<paragraph>ab[]</paragraph>").unwrap();
    let mut command = DeleteCommand::backward().with_services(ModelSelectionExtender, InvalidRemover);
    let err = command
        .execute(&mut document, DeleteOptions::default())
        .unwrap_err();

    assert!(matches!(err, DeleteError::Model(ModelError::SchemaViolation { .. })));
    assert_eq!(document.to_markup(), "<paragraph>ab[]</paragraph>");
    assert_eq!(document.version(), 0);
    assert_eq!(command.buffer().size(), 0);
    assert!(!command.buffer().is_locked());
}

/// Remembers the options it was called with and removes nothing.
#[derive(Default)]
struct RecordingRemover {
    reset_suppressed: Cell<Option<bool>>,
}

impl ContentRemover for RecordingRemover {
    fn delete_content(
        &self,
        _writer: &mut Writer<'_>,
        _selection: &mut Selection,
        options: DeleteContentOptions,
    ) -> Result<(), ModelError> {
        self.reset_suppressed
            .set(Some(options.do_not_reset_entire_content));
        Ok(())
    }
}

#[test]
fn remover_reset_is_suppressed_only_for_extended_selections() {
    let mut document = Document::from_markup("<paragraph>ab[]</paragraph>").unwrap();
    let mut command =
        DeleteCommand::backward().with_services(ModelSelectionExtender, RecordingRemover::default());
    command.execute(&mut document, DeleteOptions::default()).unwrap();
    assert_eq!(command.remover.reset_suppressed.get(), Some(true));

    let mut document = Document::from_markup("<paragraph>[ab]</paragraph>").unwrap();
    command.execute(&mut document, DeleteOptions::default()).unwrap();
    assert_eq!(command.remover.reset_suppressed.get(), Some(false));
}

/// Never moves the selection.
struct StuckExtender;

impl SelectionExtender for StuckExtender {
    fn extend(&self, _: &Document, _: &mut Selection, _: Direction, _: DeleteUnit) {}
}

#[test]
fn selection_that_cannot_be_extended_removes_nothing() {
    let mut document = Document::from_markup("<paragraph>ab[]</paragraph>").unwrap();
    let mut command = DeleteCommand::forward().with_services(StuckExtender, ModelContentRemover);
    command.execute(&mut document, DeleteOptions::default()).unwrap();
    assert_eq!(document.to_markup(), "<paragraph>ab[]</paragraph>");
    assert_eq!(command.direction(), Direction::Forward);
}
