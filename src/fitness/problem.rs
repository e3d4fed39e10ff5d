//! The regression problem and candidate individuals.

use crate::data::{Dataset, DatasetError, Range, Variable};
use crate::grammar::PrimitiveSet;
use crate::repr::Tree;
use crate::Scalar;

// =============================================================================
// Problem
// =============================================================================

/// A symbolic-regression problem: the dataset, the target variable, the
/// training/test row ranges, and the primitive set tree operators sample
/// from.
#[derive(Debug, Clone)]
pub struct Problem {
    dataset: Dataset,
    primitive_set: PrimitiveSet,
    target: Variable,
    training_range: Range,
    test_range: Range,
}

impl Problem {
    /// Create a problem over `dataset` predicting `target_name`.
    ///
    /// # Errors
    ///
    /// [`DatasetError::UnknownVariable`] when the target is not a dataset
    /// column.
    pub fn new(
        dataset: Dataset,
        target_name: &str,
        training_range: Range,
        test_range: Range,
    ) -> Result<Self, DatasetError> {
        let target = dataset
            .variable_by_name(target_name)
            .ok_or_else(|| DatasetError::UnknownVariable {
                name: target_name.to_owned(),
            })?
            .clone();
        Ok(Self {
            dataset,
            primitive_set: PrimitiveSet::default(),
            target,
            training_range,
            test_range,
        })
    }

    #[inline]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    #[inline]
    pub fn primitive_set(&self) -> &PrimitiveSet {
        &self.primitive_set
    }

    #[inline]
    pub fn primitive_set_mut(&mut self) -> &mut PrimitiveSet {
        &mut self.primitive_set
    }

    #[inline]
    pub fn target(&self) -> &Variable {
        &self.target
    }

    /// The target column over all rows.
    pub fn target_values(&self) -> &[Scalar] {
        self.dataset
            .values_by_hash(self.target.hash)
            .expect("target variable was resolved at construction")
    }

    /// The target column restricted to the training range.
    pub fn training_target(&self) -> &[Scalar] {
        let range = self.training_range;
        &self.target_values()[range.start()..range.end()]
    }

    #[inline]
    pub fn training_range(&self) -> Range {
        self.training_range
    }

    #[inline]
    pub fn test_range(&self) -> Range {
        self.test_range
    }

    /// All variables except the target, in name order.
    pub fn input_variables(&self) -> Vec<Variable> {
        self.dataset
            .variables()
            .iter()
            .filter(|v| v.hash != self.target.hash)
            .cloned()
            .collect()
    }
}

// =============================================================================
// Individual
// =============================================================================

/// A candidate solution: a tree plus its fitness slot.
#[derive(Debug, Clone)]
pub struct Individual {
    pub tree: Tree,
    pub fitness: Scalar,
}

impl Individual {
    /// Wrap a tree with an unset (worst-case) fitness.
    pub fn new(tree: Tree) -> Self {
        Self {
            tree,
            fitness: Scalar::MAX,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
