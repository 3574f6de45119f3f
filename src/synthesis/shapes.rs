//! Enumeration of series/parallel tree shapes.
//!
//! Shapes are generated modulo child order: a left subtree is never larger
//! than its right sibling, and siblings of equal size appear in enumeration
//! order. Every internal node is independently series or parallel, which
//! yields 1, 2, 4 and 14 shapes for one to four leaves.

use crate::network::{Expression, Operator, Token, Tree};

/// Postfix skeleton of one shape with numbered leaf slots.
#[derive(Debug, Clone)]
pub(crate) struct Template {
    /// Slot-numbered tree; slots count up left to right.
    pub tree: Tree<usize>,
    /// Postfix encoding where each leaf holds its slot number.
    pub expression: Expression<usize>,
    /// Token index of every slot.
    pub slot_positions: Vec<usize>,
    /// For the first slot of a right child whose sibling has the same shape:
    /// the sibling's first slot. Assignments must be non-decreasing across it
    /// so mirror images are generated once.
    pub min_from: Vec<Option<usize>>,
}

impl Template {
    fn from_shape(shape: &Tree<()>) -> Self {
        let leaves = shape.leaf_count();
        let mut next = 0;
        let mut min_from = vec![None; leaves];
        let tree = number_slots(shape, &mut next, &mut min_from);
        let expression = tree.to_expression();
        let mut slot_positions = vec![0; leaves];
        for (position, token) in expression.tokens().iter().enumerate() {
            if let Token::Leaf(slot) = token {
                slot_positions[*slot] = position;
            }
        }
        Self {
            tree,
            expression,
            slot_positions,
            min_from,
        }
    }

    pub fn slots(&self) -> usize {
        self.slot_positions.len()
    }
}

fn number_slots(shape: &Tree<()>, next: &mut usize, min_from: &mut [Option<usize>]) -> Tree<usize> {
    match shape {
        Tree::Leaf(()) => {
            let slot = *next;
            *next += 1;
            Tree::Leaf(slot)
        }
        Tree::Node { op, left, right } => {
            let left_first = *next;
            let numbered_left = number_slots(left, next, min_from);
            let right_first = *next;
            let numbered_right = number_slots(right, next, min_from);
            if left == right {
                min_from[right_first] = Some(left_first);
            }
            Tree::node(*op, numbered_left, numbered_right)
        }
    }
}

/// All distinct shapes with exactly `leaves` (at least one) leaves.
fn shapes(leaves: usize) -> Vec<Tree<()>> {
    let mut by_size: Vec<Vec<Tree<()>>> = vec![Vec::new(), vec![Tree::Leaf(())]];
    for n in 2..=leaves {
        let mut level = Vec::new();
        for left_size in 1..=n / 2 {
            let right_size = n - left_size;
            for (i, left) in by_size[left_size].iter().enumerate() {
                for (j, right) in by_size[right_size].iter().enumerate() {
                    if left_size == right_size && j < i {
                        continue;
                    }
                    for op in Operator::ALL {
                        level.push(Tree::node(op, left.clone(), right.clone()));
                    }
                }
            }
        }
        by_size.push(level);
    }
    by_size.swap_remove(leaves)
}

/// Postfix templates for every shape with `leaves` leaves.
pub(crate) fn templates(leaves: usize) -> Vec<Template> {
    if leaves == 0 {
        return Vec::new();
    }
    shapes(leaves).iter().map(Template::from_shape).collect()
}
