//! Delete and forward-delete for tree-shaped rich-text documents.
//!
//! [`DeleteCommand`] turns a backspace or delete key press into model
//! changes: it extends a collapsed selection by one unit, removes what the
//! selection covers and reports the removed units to a [`ChangeBuffer`],
//! which groups consecutive presses into one undo step in the document's
//! [`History`].
//!
//! ```
//! use pure_delete::{DeleteCommand, DeleteOptions, Document};
//!
//! let mut document = Document::from_markup("<paragraph>Hello[]</paragraph>").unwrap();
//! let mut backspace = DeleteCommand::backward();
//! backspace.execute(&mut document, DeleteOptions::default()).unwrap();
//! assert_eq!(document.to_markup(), "<paragraph>Hell[]</paragraph>");
//! ```

pub mod change_buffer;
pub mod delete;
pub mod document;
pub mod error;
pub mod history;
pub mod model;
pub mod services;
pub mod text;

pub use change_buffer::{ChangeBuffer, ChangeBufferConfig};
pub use delete::{DeleteCommand, DeleteOptions, DeleteUnit, Direction};
pub use document::Document;
pub use error::{ChangeBufferError, DeleteError, ModelError};
pub use history::{BatchId, History, UndoStep};
pub use services::{
    ContentRemover, DeleteContentOptions, ModelContentRemover, ModelSelectionExtender,
    SelectionExtender,
};
