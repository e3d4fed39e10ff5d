//! Primitive set: which node kinds a run may use, and under what shape.
//!
//! The [`PrimitiveSet`] is read by tree creators and mutators when
//! sampling node kinds; the evaluator itself accepts any structurally valid
//! tree. [`PrimitiveSet::validate_tree`] is the bridge: it reports trees
//! that reference disabled kinds or violate the configured arity bounds.

use std::ops::{BitAnd, BitOr, Not};

use crate::repr::{NodeType, Tree};

// =============================================================================
// PrimitiveSetConfig
// =============================================================================

/// Bitmask over [`NodeType`] kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimitiveSetConfig(u16);

impl PrimitiveSetConfig {
    /// The default configuration: {Add, Sub, Mul, Div, Constant, Variable}.
    pub const ARITHMETIC: Self = Self(
        NodeType::Add.bits()
            | NodeType::Sub.bits()
            | NodeType::Mul.bits()
            | NodeType::Div.bits()
            | NodeType::Constant.bits()
            | NodeType::Variable.bits(),
    );

    /// No kinds enabled.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Every kind enabled.
    pub const fn all() -> Self {
        let mut bits = 0u16;
        let mut i = 0;
        while i < NodeType::COUNT {
            bits |= 1 << i;
            i += 1;
        }
        Self(bits)
    }

    #[inline]
    pub const fn contains(self, kind: NodeType) -> bool {
        self.0 & kind.bits() != 0
    }

    #[inline]
    pub const fn bits(self) -> u16 {
        self.0
    }
}

impl Default for PrimitiveSetConfig {
    fn default() -> Self {
        Self::ARITHMETIC
    }
}

impl From<NodeType> for PrimitiveSetConfig {
    fn from(kind: NodeType) -> Self {
        Self(kind.bits())
    }
}

impl BitOr for PrimitiveSetConfig {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOr<NodeType> for PrimitiveSetConfig {
    type Output = Self;
    fn bitor(self, rhs: NodeType) -> Self {
        Self(self.0 | rhs.bits())
    }
}

impl BitAnd for PrimitiveSetConfig {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl Not for PrimitiveSetConfig {
    type Output = Self;
    fn not(self) -> Self {
        Self(!self.0 & Self::all().0)
    }
}

// =============================================================================
// GrammarError
// =============================================================================

/// Configuration and tree-admissibility errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GrammarError {
    /// Arity bounds are only configurable for the n-ary arithmetic kinds.
    #[error("arity bounds are not configurable for {kind}")]
    ArityNotConfigurable { kind: NodeType },

    /// Bounds must satisfy `1 <= min <= max`.
    #[error("invalid arity bounds for {kind}: min {min}, max {max}")]
    InvalidArityBounds { kind: NodeType, min: u16, max: u16 },

    /// Frequency weights must be non-negative and finite.
    #[error("invalid frequency {frequency} for {kind}")]
    InvalidFrequency { kind: NodeType, frequency: f64 },

    /// A tree references a kind that is not enabled.
    #[error("tree uses disabled primitive {kind} at node {node}")]
    DisabledPrimitive { kind: NodeType, node: usize },

    /// A tree node's arity falls outside the configured bounds.
    #[error("node {node} ({kind}) has arity {arity}, allowed {min}..={max}")]
    ArityOutOfBounds {
        kind: NodeType,
        node: usize,
        arity: u16,
        min: u16,
        max: u16,
    },
}

// =============================================================================
// PrimitiveSet
// =============================================================================

/// Enabled kinds with per-kind frequency weights and arity bounds.
///
/// Frequencies bias kind sampling in tree creators (a weight of 0 makes a
/// kind admissible but never sampled). Arity bounds apply to the four
/// arithmetic kinds, which the evaluator treats as n-ary; unary kinds are
/// fixed at 1 and leaves at 0.
#[derive(Debug, Clone)]
pub struct PrimitiveSet {
    config: PrimitiveSetConfig,
    frequencies: [f64; NodeType::COUNT],
    arity_bounds: [(u16, u16); NodeType::COUNT],
}

impl PrimitiveSet {
    /// Create a primitive set with the given enabled kinds, unit
    /// frequencies, and default arity bounds.
    pub fn new(config: PrimitiveSetConfig) -> Self {
        let mut arity_bounds = [(0, 0); NodeType::COUNT];
        for kind in NodeType::ALL {
            let arity = kind.default_arity();
            arity_bounds[kind.index()] = (arity, arity);
        }
        Self {
            config,
            frequencies: [1.0; NodeType::COUNT],
            arity_bounds,
        }
    }

    #[inline]
    pub fn config(&self) -> PrimitiveSetConfig {
        self.config
    }

    pub fn set_config(&mut self, config: PrimitiveSetConfig) {
        self.config = config;
    }

    #[inline]
    pub fn is_enabled(&self, kind: NodeType) -> bool {
        self.config.contains(kind)
    }

    pub fn enable(&mut self, kind: NodeType) {
        self.config = self.config | kind;
    }

    pub fn disable(&mut self, kind: NodeType) {
        self.config = self.config & !PrimitiveSetConfig::from(kind);
    }

    /// Sampling weight of a kind.
    #[inline]
    pub fn frequency(&self, kind: NodeType) -> f64 {
        self.frequencies[kind.index()]
    }

    /// Set the sampling weight of a kind.
    ///
    /// # Errors
    ///
    /// [`GrammarError::InvalidFrequency`] for negative or non-finite weights.
    pub fn set_frequency(&mut self, kind: NodeType, frequency: f64) -> Result<(), GrammarError> {
        if !frequency.is_finite() || frequency < 0.0 {
            return Err(GrammarError::InvalidFrequency { kind, frequency });
        }
        self.frequencies[kind.index()] = frequency;
        Ok(())
    }

    #[inline]
    pub fn min_arity(&self, kind: NodeType) -> u16 {
        self.arity_bounds[kind.index()].0
    }

    #[inline]
    pub fn max_arity(&self, kind: NodeType) -> u16 {
        self.arity_bounds[kind.index()].1
    }

    /// Configure arity bounds for an n-ary arithmetic kind.
    ///
    /// # Errors
    ///
    /// [`GrammarError::ArityNotConfigurable`] for unary kinds and leaves,
    /// [`GrammarError::InvalidArityBounds`] unless `1 <= min <= max`.
    pub fn set_min_max_arity(
        &mut self,
        kind: NodeType,
        min: u16,
        max: u16,
    ) -> Result<(), GrammarError> {
        if !kind.is_arithmetic() {
            return Err(GrammarError::ArityNotConfigurable { kind });
        }
        if min == 0 || min > max {
            return Err(GrammarError::InvalidArityBounds { kind, min, max });
        }
        self.arity_bounds[kind.index()] = (min, max);
        Ok(())
    }

    /// Check that a tree only uses enabled kinds within their arity bounds.
    pub fn validate_tree(&self, tree: &Tree) -> Result<(), GrammarError> {
        for (index, node) in tree.nodes().iter().enumerate() {
            let kind = node.kind();
            if !self.is_enabled(kind) {
                return Err(GrammarError::DisabledPrimitive { kind, node: index });
            }
            let (min, max) = self.arity_bounds[kind.index()];
            if node.arity() < min || node.arity() > max {
                return Err(GrammarError::ArityOutOfBounds {
                    kind,
                    node: index,
                    arity: node.arity(),
                    min,
                    max,
                });
            }
        }
        Ok(())
    }
}

impl Default for PrimitiveSet {
    fn default() -> Self {
        Self::new(PrimitiveSetConfig::ARITHMETIC)
    }
}

// =============================================================================
// Tests
// =============================================================================
