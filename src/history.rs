//! Operation log grouped into undo steps.
//!
//! Operations are recorded per batch while the batch is open. Closing a
//! batch turns everything recorded so far into one [`UndoStep`]. Replaying
//! steps is left to the caller.

use std::collections::BTreeMap;

use crate::model::Operation;

/// Identifier of a group of operations that will be undone together.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BatchId(u64);

impl BatchId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// One undoable unit: the operations of a batch and the number of atomic
/// units the user perceives as changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UndoStep {
    pub batch: BatchId,
    pub units: usize,
    pub operations: Vec<Operation>,
}

#[derive(Clone, Debug, Default)]
pub struct History {
    next_batch: u64,
    open: BTreeMap<BatchId, Vec<Operation>>,
    steps: Vec<UndoStep>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_batch(&mut self) -> BatchId {
        let batch = BatchId(self.next_batch);
        self.next_batch += 1;
        self.open.insert(batch, Vec::new());
        batch
    }

    /// Appends applied operations to `batch`, reopening it if needed.
    pub fn record(&mut self, batch: BatchId, operations: Vec<Operation>) {
        self.open.entry(batch).or_default().extend(operations);
    }

    /// Closes `batch` as one undo step carrying `units`. A batch without
    /// operations produces no step.
    pub fn close_step(&mut self, batch: BatchId, units: usize) -> Option<&UndoStep> {
        let operations = self.open.remove(&batch)?;
        if operations.is_empty() {
            return None;
        }
        self.steps.push(UndoStep {
            batch,
            units,
            operations,
        });
        self.steps.last()
    }

    pub fn steps(&self) -> &[UndoStep] {
        &self.steps
    }

    /// Batches that have operations recorded but no closed step yet.
    pub fn open_batches(&self) -> impl Iterator<Item = BatchId> + '_ {
        self.open
            .iter()
            .filter(|(_, operations)| !operations.is_empty())
            .map(|(batch, _)| *batch)
    }

    /// Operations recorded so far for a batch that is still open.
    pub fn pending(&self, batch: BatchId) -> &[Operation] {
        self.open.get(&batch).map(Vec::as_slice).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Element, Position};

    fn insert_op(offset: usize) -> Operation {
        Operation::Insert {
            position: Position::at(&[], offset),
            nodes: vec![Element::new("paragraph").into()],
        }
    }

    #[test]
    fn closing_a_batch_produces_one_step() {
        let mut history = History::new();
        let batch = history.create_batch();
        history.record(batch, vec![insert_op(0)]);
        history.record(batch, vec![insert_op(1)]);
        assert_eq!(history.open_batches().collect::<Vec<_>>(), vec![batch]);

        let step = history.close_step(batch, 7).unwrap();
        assert_eq!(step.units, 7);
        assert_eq!(step.operations.len(), 2);
        assert_eq!(history.steps().len(), 1);
        assert_eq!(history.open_batches().count(), 0);
    }

    #[test]
    fn empty_batches_leave_no_step() {
        let mut history = History::new();
        let batch = history.create_batch();
        assert!(history.close_step(batch, 3).is_none());
        assert!(history.steps().is_empty());
    }

    #[test]
    fn batch_ids_are_unique_and_ordered() {
        let mut history = History::new();
        let first = history.create_batch();
        let second = history.create_batch();
        assert!(first < second);
        assert_eq!(second.get(), first.get() + 1);
    }
}
