//! Postfix expression tree storage.
//!
//! A [`Tree`] is an ordered sequence of [`Node`]s in postfix order: every
//! node follows all of its descendants and the root is the last element.
//! Each node records its subtree length, so walking the children of node
//! `p` is O(arity): the first child is at `p - 1` and each next child at
//! `i - length(i) - 1`. That walk is load-bearing for evaluator
//! performance — no parent pointers or index maps are needed.

use super::hash::update_calculated_hashes;
use super::node::Node;

// =============================================================================
// TreeValidationError
// =============================================================================

/// Structural validation errors for [`Tree`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeValidationError {
    /// Tree has no nodes.
    #[error("tree has no nodes")]
    EmptyTree,

    /// The root's subtree length does not span the whole tree.
    #[error("root length {got} does not span the tree ({expected} descendants)")]
    RootLengthMismatch { expected: usize, got: usize },

    /// A child walk stepped past the start of the array.
    #[error("child walk underflowed at node {node} (arity {arity})")]
    ChildWalkUnderflow { node: usize, arity: u16 },

    /// A node's recorded length disagrees with its children's lengths.
    #[error("node {node} has length {got}, children account for {expected}")]
    LengthMismatch {
        node: usize,
        expected: usize,
        got: usize,
    },

    /// A leaf node carries a non-zero arity or length.
    #[error("leaf node {node} has arity {arity} and length {length}")]
    LeafWithChildren { node: usize, arity: u16, length: u16 },

    /// An operator node has no children.
    #[error("operator node {node} has arity 0")]
    OperatorWithoutChildren { node: usize },
}

// =============================================================================
// Tree
// =============================================================================

/// An expression tree stored as a postfix node array.
///
/// Trees are immutable during evaluation. The only sanctioned mutation is
/// tuning leaf payloads through [`Tree::nodes_mut`] (the local-optimizer
/// surface); structural edits belong to external tree operators, which
/// construct new trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Create a tree from postfix-ordered nodes and compute subtree lengths
    /// and calculated hashes.
    ///
    /// Nodes only need their kind/arity/payload set; `length` fields are
    /// overwritten here. Structurally inconsistent input is accepted and
    /// reported later by [`Tree::validate`].
    pub fn new(nodes: Vec<Node>) -> Self {
        let mut tree = Self { nodes };
        tree.update_metadata();
        tree
    }

    /// Number of nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The nodes in postfix order.
    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Mutable node access, for tuning constant values in place.
    ///
    /// Callers that change anything beyond leaf payloads must rebuild the
    /// tree with [`Tree::new`] to keep lengths and hashes consistent.
    #[inline]
    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    /// Index of the root node (the last element).
    #[inline]
    pub fn root_index(&self) -> usize {
        debug_assert!(!self.nodes.is_empty());
        self.nodes.len() - 1
    }

    /// Two trees are structurally equivalent iff their root calculated
    /// hashes match.
    pub fn is_equivalent_to(&self, other: &Tree) -> bool {
        match (self.nodes.last(), other.nodes.last()) {
            (Some(a), Some(b)) => a.calculated_hash() == b.calculated_hash(),
            (None, None) => true,
            _ => false,
        }
    }

    /// Longest root-to-leaf path in edges; a single leaf has depth 0.
    pub fn depth(&self) -> usize {
        let n = self.nodes.len();
        if n == 0 {
            return 0;
        }
        let mut depths = vec![0usize; n];
        let mut max_depth = 0;
        // Parents precede children in descending index order, so one
        // right-to-left sweep settles every node's depth.
        for parent in (0..n).rev() {
            let node = &self.nodes[parent];
            if node.is_leaf() || node.arity() == 0 || parent == 0 {
                continue;
            }
            let child_depth = depths[parent] + 1;
            max_depth = max_depth.max(child_depth);
            let mut child = parent - 1;
            for step in 0..node.arity() {
                depths[child] = child_depth;
                if step + 1 < node.arity() {
                    match child.checked_sub(self.nodes[child].length() as usize + 1) {
                        Some(next) => child = next,
                        None => break,
                    }
                }
            }
        }
        max_depth
    }

    /// Index range `[start, index]` covered by the subtree rooted at `index`.
    #[inline]
    pub fn subtree_range(&self, index: usize) -> std::ops::RangeInclusive<usize> {
        let length = self.nodes[index].length() as usize;
        (index - length)..=index
    }

    /// Child indices of `index` in canonical left-to-right source order.
    ///
    /// The leftward postfix walk encounters children right-to-left; this
    /// reverses it so kernels and hashing agree on operand order.
    pub fn child_indices(&self, index: usize) -> Vec<usize> {
        let node = &self.nodes[index];
        let mut children = Vec::with_capacity(node.arity() as usize);
        let mut child = index.wrapping_sub(1);
        for _ in 0..node.arity() {
            children.push(child);
            child = child.wrapping_sub(self.nodes[child].length() as usize + 1);
        }
        children.reverse();
        children
    }

    /// Check the postfix structural invariants by per-node length
    /// accounting.
    pub fn validate(&self) -> Result<(), TreeValidationError> {
        let n = self.nodes.len();
        if n == 0 {
            return Err(TreeValidationError::EmptyTree);
        }

        for (index, node) in self.nodes.iter().enumerate() {
            if node.is_leaf() {
                if node.arity() != 0 || node.length() != 0 {
                    return Err(TreeValidationError::LeafWithChildren {
                        node: index,
                        arity: node.arity(),
                        length: node.length(),
                    });
                }
                continue;
            }
            if node.arity() == 0 {
                return Err(TreeValidationError::OperatorWithoutChildren { node: index });
            }

            // Sum the subtree sizes of the children; they must tile the
            // node's recorded length exactly.
            let mut accounted = 0usize;
            let mut child = index;
            for _ in 0..node.arity() {
                let step = if child == index {
                    1
                } else {
                    self.nodes[child].length() as usize + 1
                };
                child = child.checked_sub(step).ok_or(
                    TreeValidationError::ChildWalkUnderflow {
                        node: index,
                        arity: node.arity(),
                    },
                )?;
                accounted += self.nodes[child].length() as usize + 1;
            }
            if accounted != node.length() as usize {
                return Err(TreeValidationError::LengthMismatch {
                    node: index,
                    expected: accounted,
                    got: node.length() as usize,
                });
            }
        }

        let root_length = self.nodes[n - 1].length() as usize;
        if root_length != n - 1 {
            return Err(TreeValidationError::RootLengthMismatch {
                expected: n - 1,
                got: root_length,
            });
        }
        Ok(())
    }

    /// Recompute subtree lengths bottom-up, then calculated hashes.
    ///
    /// On structurally broken input the sweep stops early and leaves the
    /// remaining metadata untouched; [`Tree::validate`] reports the defect.
    pub fn update_metadata(&mut self) {
        if !self.update_lengths() {
            return;
        }
        let mut scratch = Vec::new();
        update_calculated_hashes(&mut self.nodes, &mut scratch);
    }

    fn update_lengths(&mut self) -> bool {
        for index in 0..self.nodes.len() {
            let node = &self.nodes[index];
            if node.is_leaf() {
                self.nodes[index].set_length(0);
                continue;
            }
            let mut descendants = 0usize;
            let mut child = index;
            for _ in 0..node.arity() {
                let step = if child == index {
                    1
                } else {
                    self.nodes[child].length() as usize + 1
                };
                child = match child.checked_sub(step) {
                    Some(c) => c,
                    None => return false,
                };
                descendants += self.nodes[child].length() as usize + 1;
            }
            if descendants > u16::MAX as usize {
                return false;
            }
            self.nodes[index].set_length(descendants as u16);
        }
        true
    }
}

// =============================================================================
// Tests
// =============================================================================
