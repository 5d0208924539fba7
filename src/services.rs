//! Collaborators of the delete command: moving the selection focus and
//! removing selected content.

use crate::delete::{DeleteUnit, Direction};
use crate::document::Document;
use crate::error::ModelError;
use crate::model::{Selection, Writer};

mod delete_content;
mod modify_selection;

pub use delete_content::ModelContentRemover;
pub(crate) use delete_content::replace_entire_content;
pub use modify_selection::ModelSelectionExtender;

/// Moves the focus of a selection by one unit.
pub trait SelectionExtender {
    /// Extends `selection` by one `unit` in `direction`. Leaves it untouched
    /// when there is nowhere to go inside the limit element.
    fn extend(
        &self,
        document: &Document,
        selection: &mut Selection,
        direction: Direction,
        unit: DeleteUnit,
    );
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeleteContentOptions {
    /// Never replace the limit element content with a fresh default block.
    pub do_not_reset_entire_content: bool,
    pub direction: Direction,
}

/// Removes the content of a non-collapsed selection.
pub trait ContentRemover {
    /// Removes what `selection` spans and collapses it where the content
    /// was.
    fn delete_content(
        &self,
        writer: &mut Writer<'_>,
        selection: &mut Selection,
        options: DeleteContentOptions,
    ) -> Result<(), ModelError>;
}
