//! End-to-end evaluator scenarios.

mod common;

use common::{hash_of, ramp_dataset, single_row_xy};
use symreg::{Dataset, Node, NodeType, Range, Scalar, Tree, TreeEvaluator};

#[test]
fn constant_tree_over_range() {
    // [Const=3.0] over [0,4) -> [3, 3, 3, 3]
    let dataset = ramp_dataset(4);
    let tree = Tree::new(vec![Node::constant(3.0)]);
    let output = TreeEvaluator::new()
        .evaluate(&tree, &dataset, Range::new(0, 4))
        .unwrap();
    assert_eq!(output, vec![3.0, 3.0, 3.0, 3.0]);
}

#[test]
fn weighted_variable_sum() {
    // [Var x (w=2); Var y (w=1); Add] on row (x=1, y=4) -> [6]
    let dataset = single_row_xy();
    let tree = Tree::new(vec![
        Node::variable(hash_of(&dataset, "x"), 2.0),
        Node::variable(hash_of(&dataset, "y"), 1.0),
        Node::new(NodeType::Add),
    ]);
    let output = TreeEvaluator::new()
        .evaluate(&tree, &dataset, Range::new(0, 1))
        .unwrap();
    assert_eq!(output, vec![6.0]);
}

#[test]
fn ternary_mul() {
    // [2; 3; 4; Mul/3] -> [24]
    let dataset = ramp_dataset(1);
    let tree = Tree::new(vec![
        Node::constant(2.0),
        Node::constant(3.0),
        Node::constant(4.0),
        Node::new(NodeType::Mul).with_arity(3),
    ]);
    let output = TreeEvaluator::new()
        .evaluate(&tree, &dataset, Range::new(0, 1))
        .unwrap();
    assert_eq!(output, vec![24.0]);
}

#[test]
fn ternary_sub() {
    // [10; 2; 3; Sub/3] -> [5] (= 10 - 2 - 3)
    let dataset = ramp_dataset(1);
    let tree = Tree::new(vec![
        Node::constant(10.0),
        Node::constant(2.0),
        Node::constant(3.0),
        Node::new(NodeType::Sub).with_arity(3),
    ]);
    let output = TreeEvaluator::new()
        .evaluate(&tree, &dataset, Range::new(0, 1))
        .unwrap();
    assert_eq!(output, vec![5.0]);
}

#[test]
fn ternary_div() {
    // [24; 2; 3; Div/3] -> [4] (= 24 / (2·3))
    let dataset = ramp_dataset(1);
    let tree = Tree::new(vec![
        Node::constant(24.0),
        Node::constant(2.0),
        Node::constant(3.0),
        Node::new(NodeType::Div).with_arity(3),
    ]);
    let output = TreeEvaluator::new()
        .evaluate(&tree, &dataset, Range::new(0, 1))
        .unwrap();
    assert_eq!(output, vec![4.0]);
}

#[test]
fn log_of_one_is_zero() {
    let dataset = ramp_dataset(1);
    let tree = Tree::new(vec![Node::constant(1.0), Node::new(NodeType::Log)]);
    let output = TreeEvaluator::new()
        .evaluate(&tree, &dataset, Range::new(0, 1))
        .unwrap();
    assert_eq!(output, vec![0.0]);
}

#[test]
fn log_of_negative_is_nan_not_error() {
    let dataset = ramp_dataset(1);
    let tree = Tree::new(vec![Node::constant(-1.0), Node::new(NodeType::Log)]);
    let output = TreeEvaluator::new()
        .evaluate(&tree, &dataset, Range::new(0, 1))
        .unwrap();
    assert_eq!(output.len(), 1);
    assert!(output[0].is_nan());
}

#[test]
fn output_length_matches_range() {
    let dataset = ramp_dataset(200);
    let x = hash_of(&dataset, "x");
    let tree = Tree::new(vec![
        Node::variable(x, 1.0),
        Node::constant(1.0),
        Node::new(NodeType::Add),
        Node::new(NodeType::Sqrt),
    ]);
    let evaluator = TreeEvaluator::new();
    for range in [
        Range::new(0, 200),
        Range::new(0, 1),
        Range::new(50, 150),
        Range::new(64, 128),
        Range::new(10, 10),
    ] {
        let output = evaluator.evaluate(&tree, &dataset, range).unwrap();
        assert_eq!(output.len(), range.size());
    }
}

#[test]
fn evaluation_is_bitwise_deterministic() {
    let dataset = symreg::testing::synthetic_dataset(2, 300, 7);
    let x1 = hash_of(&dataset, "x1");
    let x2 = hash_of(&dataset, "x2");
    // exp(0.3·x1) · sin(x2) + x1/x2
    let tree = Tree::new(vec![
        Node::variable(x1, 0.3),
        Node::new(NodeType::Exp),
        Node::variable(x2, 1.0),
        Node::new(NodeType::Sin),
        Node::new(NodeType::Mul),
        Node::variable(x1, 1.0),
        Node::variable(x2, 1.0),
        Node::new(NodeType::Div),
        Node::new(NodeType::Add),
    ]);
    let evaluator = TreeEvaluator::new();
    let range = Range::new(0, 300);
    let first = evaluator.evaluate(&tree, &dataset, range).unwrap();
    let second = evaluator.evaluate(&tree, &dataset, range).unwrap();
    let bits = |v: &[Scalar]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&first), bits(&second));
}

#[test]
fn nary_add_close_to_nested_binary() {
    let dataset = symreg::testing::synthetic_dataset(3, 128, 21);
    let x1 = hash_of(&dataset, "x1");
    let x2 = hash_of(&dataset, "x2");
    let x3 = hash_of(&dataset, "x3");

    let nary = Tree::new(vec![
        Node::variable(x1, 1.0),
        Node::variable(x2, 1.0),
        Node::variable(x3, 1.0),
        Node::new(NodeType::Add).with_arity(3),
    ]);
    let nested = Tree::new(vec![
        Node::variable(x1, 1.0),
        Node::variable(x2, 1.0),
        Node::new(NodeType::Add),
        Node::variable(x3, 1.0),
        Node::new(NodeType::Add),
    ]);

    let evaluator = TreeEvaluator::new();
    let range = Range::new(0, 128);
    let a = evaluator.evaluate(&nary, &dataset, range).unwrap();
    let b = evaluator.evaluate(&nested, &dataset, range).unwrap();
    for (&x, &y) in a.iter().zip(&b) {
        // identical association modulo one regrouping: a few ULPs at most
        assert!((x - y).abs() <= 1e-12 * x.abs().max(y.abs()).max(1.0));
    }
}

#[test]
fn wide_arity_crosses_group_boundary() {
    // 13 constants under one Add: exercises two 5-groups plus a tail of 3.
    let dataset = ramp_dataset(1);
    let mut nodes: Vec<Node> = (1..=13).map(|i| Node::constant(i as Scalar)).collect();
    nodes.push(Node::new(NodeType::Add).with_arity(13));
    let tree = Tree::new(nodes);
    let output = TreeEvaluator::new()
        .evaluate(&tree, &dataset, Range::new(0, 1))
        .unwrap();
    assert_eq!(output, vec![91.0]);

    // Same for Sub: 100 - (1 + ... + 13) + nothing else
    let mut nodes = vec![Node::constant(100.0)];
    nodes.extend((1..=13).map(|i| Node::constant(i as Scalar)));
    nodes.push(Node::new(NodeType::Sub).with_arity(14));
    let tree = Tree::new(nodes);
    let output = TreeEvaluator::new()
        .evaluate(&tree, &dataset, Range::new(0, 1))
        .unwrap();
    assert_eq!(output, vec![9.0]);
}

#[test]
fn unary_kernels_match_std_math() {
    let dataset = Dataset::from_columns(vec![("x".into(), vec![0.25, 0.5, 1.0, 2.0])]).unwrap();
    let x = hash_of(&dataset, "x");
    let range = Range::new(0, 4);
    let evaluator = TreeEvaluator::new();
    let column = dataset.values_by_name("x").unwrap().to_vec();

    let cases: Vec<(NodeType, fn(Scalar) -> Scalar)> = vec![
        (NodeType::Log, |x| x.ln()),
        (NodeType::Exp, |x| x.exp()),
        (NodeType::Sin, |x| x.sin()),
        (NodeType::Cos, |x| x.cos()),
        (NodeType::Tan, |x| x.tan()),
        (NodeType::Sqrt, |x| x.sqrt()),
        (NodeType::Cbrt, |x| x.cbrt()),
    ];
    for (kind, f) in cases {
        let tree = Tree::new(vec![Node::variable(x, 1.0), Node::new(kind)]);
        let output = evaluator.evaluate(&tree, &dataset, range).unwrap();
        let expected: Vec<Scalar> = column.iter().map(|&v| f(v)).collect();
        assert_eq!(output, expected, "kernel {kind} diverged from std");
    }
}

#[test]
fn unary_forms_of_sub_and_div() {
    let dataset = ramp_dataset(1);
    let negate = Tree::new(vec![
        Node::constant(4.0),
        Node::new(NodeType::Sub).with_arity(1),
    ]);
    let recip = Tree::new(vec![
        Node::constant(4.0),
        Node::new(NodeType::Div).with_arity(1),
    ]);
    let evaluator = TreeEvaluator::new();
    assert_eq!(
        evaluator
            .evaluate(&negate, &dataset, Range::new(0, 1))
            .unwrap(),
        vec![-4.0]
    );
    assert_eq!(
        evaluator
            .evaluate(&recip, &dataset, Range::new(0, 1))
            .unwrap(),
        vec![0.25]
    );
}

#[test]
fn division_by_zero_flows_through() {
    let dataset = ramp_dataset(2); // x = 0, 1
    let x = hash_of(&dataset, "x");
    let tree = Tree::new(vec![
        Node::constant(1.0),
        Node::variable(x, 1.0),
        Node::new(NodeType::Div),
    ]);
    let output = TreeEvaluator::new()
        .evaluate(&tree, &dataset, Range::new(0, 2))
        .unwrap();
    assert_eq!(output[0], Scalar::INFINITY);
    assert_eq!(output[1], 1.0);
}
