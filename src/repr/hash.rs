//! Subtree identity hashing.
//!
//! Calculated hashes are recomputed bottom-up over the postfix array:
//! a leaf mixes its structural hash with its payload bits, an internal node
//! mixes its structural hash with the calculated hashes of its children.
//! For commutative kinds the child hashes are sorted first, so `a + b` and
//! `b + a` share identity. This is what makes calculated hashes usable for
//! structural-equivalence checks and caching.

use std::hash::Hasher;

use rustc_hash::FxHasher;

use super::node::Node;

/// Mix a structural hash with payload bits (leaf nodes).
#[inline]
pub(crate) fn hash_leaf(structural: u64, payload_bits: u64) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write_u64(structural);
    hasher.write_u64(payload_bits);
    hasher.finish()
}

/// Mix a structural hash with child subtree hashes (internal nodes).
///
/// `child_hashes` must already be in the desired order; the caller sorts
/// them for commutative kinds.
#[inline]
pub(crate) fn hash_internal(structural: u64, child_hashes: &[u64]) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write_u64(structural);
    for &hash in child_hashes {
        hasher.write_u64(hash);
    }
    hasher.finish()
}

/// Recompute `calculated_hash` for every node of a postfix array.
///
/// Assumes subtree lengths are already consistent (children of node `i`
/// reachable by the leftward walk). `scratch` buffers child hashes between
/// nodes to avoid reallocating.
pub(crate) fn update_calculated_hashes(nodes: &mut [Node], scratch: &mut Vec<u64>) {
    for index in 0..nodes.len() {
        let node = nodes[index];

        if node.is_leaf() {
            // Constants hash by kind alone (their values are tunable and
            // must not change tree identity); variable identity includes
            // the weight.
            let calculated = if node.is_variable() {
                hash_leaf(node.hash(), node.value().to_bits())
            } else {
                node.hash()
            };
            nodes[index].set_calculated_hash(calculated);
            continue;
        }

        scratch.clear();
        let mut child = index - 1;
        for _ in 0..node.arity() {
            scratch.push(nodes[child].calculated_hash());
            child = child.wrapping_sub(nodes[child].length() as usize + 1);
        }
        if node.is_commutative() {
            scratch.sort();
        }
        nodes[index].set_calculated_hash(hash_internal(node.hash(), scratch));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repr::{NodeType, Tree};

    #[test]
    fn commutative_children_share_identity() {
        let a = Tree::new(vec![
            Node::constant(1.0),
            Node::constant(2.0),
            Node::new(NodeType::Add),
        ]);
        let b = Tree::new(vec![
            Node::constant(2.0),
            Node::constant(1.0),
            Node::new(NodeType::Add),
        ]);
        assert_eq!(
            a.nodes()[2].calculated_hash(),
            b.nodes()[2].calculated_hash()
        );
    }

    #[test]
    fn noncommutative_children_do_not() {
        let a = Tree::new(vec![
            Node::constant(1.0),
            Node::constant(2.0),
            Node::new(NodeType::Sub),
        ]);
        let b = Tree::new(vec![
            Node::constant(2.0),
            Node::constant(1.0),
            Node::new(NodeType::Sub),
        ]);
        assert_ne!(
            a.nodes()[2].calculated_hash(),
            b.nodes()[2].calculated_hash()
        );
    }

    #[test]
    fn variable_weight_changes_identity() {
        let light = Node::variable(7, 1.0);
        let heavy = Node::variable(7, 2.0);
        let a = Tree::new(vec![light]);
        let b = Tree::new(vec![heavy]);
        assert_ne!(
            a.nodes()[0].calculated_hash(),
            b.nodes()[0].calculated_hash()
        );
    }

    #[test]
    fn constant_value_does_not_change_identity() {
        let a = Tree::new(vec![Node::constant(1.0)]);
        let b = Tree::new(vec![Node::constant(3.0)]);
        assert_eq!(
            a.nodes()[0].calculated_hash(),
            b.nodes()[0].calculated_hash()
        );
    }
}
