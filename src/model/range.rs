use crate::error::ModelError;

use super::{ChildRef, Element, Position};

/// An ordered pair of positions. `start <= end` always holds.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Range {
    start: Position,
    end: Position,
}

/// One step of a shallow walk over a flat range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkItem<'a> {
    Character(char),
    ElementStart(&'a Element),
}

impl Range {
    /// Builds a range from two positions in any order.
    pub fn new(a: Position, b: Position) -> Self {
        if b < a {
            Self { start: b, end: a }
        } else {
            Self { start: a, end: b }
        }
    }

    pub fn collapsed(position: Position) -> Self {
        Self {
            start: position.clone(),
            end: position,
        }
    }

    /// Range spanning the whole content of the element at `element`.
    pub fn in_element(root: &Element, element: &[usize]) -> Result<Self, ModelError> {
        Ok(Self {
            start: Position::at_start(element),
            end: Position::at_end(root, element)?,
        })
    }

    /// Range spanning the node at `node` itself.
    pub fn on_node(node: &[usize]) -> Result<Self, ModelError> {
        Ok(Self {
            start: Position::before(node)?,
            end: Position::after(node)?,
        })
    }

    pub fn start(&self) -> &Position {
        &self.start
    }

    pub fn end(&self) -> &Position {
        &self.end
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Whether both ends share the same parent element.
    pub fn is_flat(&self) -> bool {
        self.start.parent_path() == self.end.parent_path()
    }

    /// Path of the deepest element containing both ends.
    pub fn common_ancestor(&self) -> Vec<usize> {
        self.start
            .parent_path()
            .iter()
            .zip(self.end.parent_path())
            .take_while(|(a, b)| a == b)
            .map(|(a, _)| *a)
            .collect()
    }

    /// Splits the range into the smallest set of flat ranges that together
    /// cover the same content.
    ///
    /// `<p>a[b</p><p>c</p><p>d]e</p>` yields three ranges: `b` inside the
    /// first paragraph, the second paragraph inside the root, and `d` inside
    /// the last paragraph.
    pub fn minimal_flat_ranges(&self, root: &Element) -> Result<Vec<Range>, ModelError> {
        let mut ranges = Vec::new();
        let diff_at = self.start.common_path_len(&self.end);
        let mut position = self.start.clone();

        // Climb out of the start branch.
        while position.depth() > diff_at + 1 {
            let parent = position.parent(root)?;
            let how_many = parent
                .max_offset()
                .checked_sub(position.offset())
                .ok_or_else(|| ModelError::InvalidPosition(position.clone()))?;
            if how_many != 0 {
                ranges.push(Range {
                    start: position.clone(),
                    end: position.shifted_by(how_many),
                });
            }
            position = Position::after(position.parent_path())?;
        }

        // Descend into the end branch.
        while position.depth() <= self.end.depth() {
            let offset = self.end.path()[position.depth() - 1];
            let how_many = offset.checked_sub(position.offset()).ok_or_else(|| {
                ModelError::InvalidRange {
                    start: self.start.clone(),
                    end: self.end.clone(),
                }
            })?;
            if how_many != 0 {
                ranges.push(Range {
                    start: position.clone(),
                    end: position.shifted_by(how_many),
                });
            }
            position = Position::at_start(position.with_offset(offset).path());
        }

        Ok(ranges)
    }

    /// Shallow walk over a flat range: one item per character, one per
    /// element start. Element ends are never reported and elements are not
    /// entered.
    pub fn shallow_items<'a>(&self, root: &'a Element) -> Result<Vec<WalkItem<'a>>, ModelError> {
        if !self.is_flat() {
            return Err(ModelError::InvalidRange {
                start: self.start.clone(),
                end: self.end.clone(),
            });
        }
        let parent = self.start.parent(root)?;
        let mut items = Vec::new();
        let mut offset = self.start.offset();
        while offset < self.end.offset() {
            match parent.child_at(offset) {
                Some(ChildRef::Element { element, .. }) => {
                    items.push(WalkItem::ElementStart(element));
                    offset += 1;
                }
                Some(ChildRef::Text { text, start }) => {
                    let skip = offset - start;
                    let take = (self.end.offset() - offset).min(text.len() - skip);
                    items.extend(text.data().chars().skip(skip).take(take).map(WalkItem::Character));
                    offset += take;
                }
                None => return Err(ModelError::InvalidPosition(self.end.clone())),
            }
        }
        Ok(items)
    }

    /// Number of atomic units the range covers, summed over its minimal flat
    /// ranges.
    pub fn count_units(&self, root: &Element) -> Result<usize, ModelError> {
        self.minimal_flat_ranges(root)?
            .iter()
            .map(|flat| flat.shallow_items(root).map(|items| items.len()))
            .sum()
    }
}

#[cfg(test)]
#[path = "range_tests.rs"]
mod range_tests;
