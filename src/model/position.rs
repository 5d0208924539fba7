use crate::error::ModelError;

use super::Element;

/// A location in the tree, as a path of offsets from the root.
///
/// The last entry is the offset inside the parent element, every earlier
/// entry is the offset of an ancestor element inside its own parent. Paths
/// compare lexicographically, which matches document order.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    path: Vec<usize>,
}

impl Position {
    /// Fails with [`ModelError::EmptyPath`] for an empty path, which would
    /// address the root itself rather than an offset inside it.
    pub fn new(path: Vec<usize>) -> Result<Self, ModelError> {
        if path.is_empty() {
            return Err(ModelError::EmptyPath);
        }
        Ok(Self { path })
    }

    /// Position at `offset` inside the element at `parent`.
    pub fn at(parent: &[usize], offset: usize) -> Self {
        let mut path = Vec::with_capacity(parent.len() + 1);
        path.extend_from_slice(parent);
        path.push(offset);
        Self { path }
    }

    pub fn at_start(element: &[usize]) -> Self {
        Self::at(element, 0)
    }

    pub fn at_end(root: &Element, element: &[usize]) -> Result<Self, ModelError> {
        let target = root
            .descendant(element)
            .ok_or_else(|| ModelError::NotAnElement(element.to_vec()))?;
        Ok(Self::at(element, target.max_offset()))
    }

    /// Position right before the node whose path is `node`. The root has no
    /// position before it.
    pub fn before(node: &[usize]) -> Result<Self, ModelError> {
        Self::new(node.to_vec())
    }

    /// Position right after the node whose path is `node`.
    pub fn after(node: &[usize]) -> Result<Self, ModelError> {
        let mut path = node.to_vec();
        let last = path.last_mut().ok_or(ModelError::EmptyPath)?;
        *last += 1;
        Ok(Self { path })
    }

    pub fn path(&self) -> &[usize] {
        &self.path
    }

    pub fn parent_path(&self) -> &[usize] {
        &self.path[..self.path.len() - 1]
    }

    pub fn offset(&self) -> usize {
        self.path[self.path.len() - 1]
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    pub fn with_offset(&self, offset: usize) -> Self {
        Self::at(self.parent_path(), offset)
    }

    pub fn shifted_by(&self, how_many: usize) -> Self {
        self.with_offset(self.offset() + how_many)
    }

    pub fn parent<'a>(&self, root: &'a Element) -> Result<&'a Element, ModelError> {
        root.descendant(self.parent_path())
            .ok_or_else(|| ModelError::InvalidPosition(self.clone()))
    }

    /// Checks that the position resolves inside `root`.
    pub fn validate(&self, root: &Element) -> Result<(), ModelError> {
        let parent = self.parent(root)?;
        if self.offset() > parent.max_offset() {
            return Err(ModelError::InvalidPosition(self.clone()));
        }
        Ok(())
    }

    /// Length of the common prefix of both paths.
    pub fn common_path_len(&self, other: &Position) -> usize {
        self.path
            .iter()
            .zip(other.path.iter())
            .take_while(|(a, b)| a == b)
            .count()
    }

    /// Whether only element boundaries, and no content, lie between `self`
    /// and `other`.
    ///
    /// `<p>foo]</p><p>[bar</p>` touch, `<p>foo]</p><p></p><p>[bar</p>` do
    /// not, because a whole (empty) element sits between them.
    pub fn is_touching(&self, other: &Position, root: &Element) -> bool {
        let common = self.path.len().min(other.path.len());
        for level in 0..common {
            let (a, b) = (self.path[level], other.path[level]);
            if a == b {
                continue;
            }
            if a + 1 == b {
                return touching_branch(self, other, level, root);
            }
            if b + 1 == a {
                return touching_branch(other, self, level, root);
            }
            return false;
        }

        match self.path.len().cmp(&other.path.len()) {
            std::cmp::Ordering::Equal => true,
            std::cmp::Ordering::Greater => only_zeroes(&self.path, common),
            std::cmp::Ordering::Less => only_zeroes(&other.path, common),
        }
    }
}

fn touching_branch(left: &Position, right: &Position, level: usize, root: &Element) -> bool {
    // `[2]` vs `[3, ...]`: the node at `[2]` separates them.
    if level + 1 == left.path.len() {
        return false;
    }
    only_max_offsets(left, level + 1, root) && only_zeroes(&right.path, level + 1)
}

fn only_zeroes(path: &[usize], from: usize) -> bool {
    path.iter().skip(from).all(|&offset| offset == 0)
}

fn only_max_offsets(position: &Position, from: usize, root: &Element) -> bool {
    let mut add = 0;
    for idx in (from..position.path.len()).rev() {
        let Some(parent) = root.descendant(&position.path[..idx]) else {
            return false;
        };
        if position.path[idx] + add != parent.max_offset() {
            return false;
        }
        add = 1;
    }
    true
}
