use super::{Position, Range};

/// One or more ranges plus the direction the user made the selection in.
///
/// A selection always holds at least one range; ranges are kept in document
/// order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    ranges: Vec<Range>,
    backward: bool,
}

impl Selection {
    pub fn collapsed(position: Position) -> Self {
        Self {
            ranges: vec![Range::collapsed(position)],
            backward: false,
        }
    }

    pub fn from_range(range: Range, backward: bool) -> Self {
        Self {
            ranges: vec![range],
            backward,
        }
    }

    /// Returns `None` when `ranges` is empty.
    pub fn from_ranges(mut ranges: Vec<Range>, backward: bool) -> Option<Self> {
        if ranges.is_empty() {
            return None;
        }
        ranges.sort_by(|a, b| a.start().cmp(b.start()));
        Some(Self { ranges, backward })
    }

    pub fn ranges(&self) -> &[Range] {
        &self.ranges
    }

    pub fn first_range(&self) -> &Range {
        &self.ranges[0]
    }

    pub fn is_backward(&self) -> bool {
        self.backward
    }

    pub fn is_collapsed(&self) -> bool {
        self.ranges.len() == 1 && self.ranges[0].is_collapsed()
    }

    /// Drops collapsed ranges as long as at least one range is left. A
    /// selection made only of collapsed ranges keeps its first one.
    pub fn without_collapsed_ranges(mut self) -> Self {
        if self.ranges.len() > 1 {
            let first = self.ranges[0].clone();
            self.ranges.retain(|range| !range.is_collapsed());
            if self.ranges.is_empty() {
                self.ranges.push(first);
            }
        }
        self
    }

    pub fn first_position(&self) -> &Position {
        self.first_range().start()
    }

    pub fn last_position(&self) -> &Position {
        self.ranges
            .iter()
            .map(Range::end)
            .max()
            .unwrap_or_else(|| self.first_range().end())
    }

    pub fn anchor(&self) -> &Position {
        let range = self.ranges.last().unwrap_or(&self.ranges[0]);
        if self.backward { range.end() } else { range.start() }
    }

    pub fn focus(&self) -> &Position {
        let range = self.ranges.last().unwrap_or(&self.ranges[0]);
        if self.backward { range.start() } else { range.end() }
    }

    /// Moves the focus, keeping the anchor. Collapses any additional ranges.
    pub fn set_focus(&mut self, focus: Position) {
        let anchor = self.anchor().clone();
        self.backward = focus < anchor;
        self.ranges = vec![Range::new(anchor, focus)];
    }
}
