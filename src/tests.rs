extern crate std;

use std::{ops::Range, prelude::v1::*};

use proptest::prelude::*;

use crate::model::{self, TestNode};

use super::*;

fn key_of(node: NonNull<TestNode>) -> u32 {
    unsafe { node.as_ref().key }
}

fn balance_of(node: NonNull<TestNode>) -> i8 {
    unsafe { TestNode::links(node).as_ref().balance() }
}

fn left_of(node: NonNull<TestNode>) -> Link<TestNode> {
    unsafe { TestNode::links(node).as_ref().left() }
}

fn right_of(node: NonNull<TestNode>) -> Link<TestNode> {
    unsafe { TestNode::links(node).as_ref().right() }
}

fn height(link: Link<TestNode>) -> usize {
    match link {
        None => 0,
        Some(node) => 1 + height(left_of(node)).max(height(right_of(node))),
    }
}

fn build(keys: &[u32]) -> AvlTree<TestNode> {
    let mut tree: AvlTree<TestNode> = AvlTree::new();

    for &key in keys {
        tree.insert(TestNode::new(key));
        tree.assert_invariants();
    }

    tree
}

// Per-node (key, balance, parent, left, right) tuples in key order; two trees
// with equal snapshots are structurally identical.
fn snapshot(tree: &AvlTree<TestNode>) -> Vec<(u32, i8, Option<u32>, Option<u32>, Option<u32>)> {
    tree.iter()
        .map(|node| {
            (
                node.key,
                node.links.balance(),
                node.links.parent().map(key_of),
                node.links.left().map(key_of),
                node.links.right().map(key_of),
            )
        })
        .collect()
}

fn insert_find_all(keys: &[u32]) {
    let mut tree: AvlTree<TestNode> = AvlTree::new();

    for &key in keys {
        tree.insert(Box::new(TestNode {
            links: Links::new(),
            key,
        }));
        tree.assert_invariants();
    }

    for key in keys {
        let node = tree.get_raw(key).expect("item not found");
        assert_eq!(unsafe { node.as_ref().key() }, key);
    }
}

#[test]
fn zero_elems_find() {
    insert_find_all(&[]);
}

#[test]
fn single_elem_find() {
    insert_find_all(&[0]);
}

#[test]
fn two_elems_find() {
    insert_find_all(&[0, 1]);
    insert_find_all(&[1, 0]);
}

#[test]
fn three_elems_find() {
    insert_find_all(&[0, 1, 2]);
    insert_find_all(&[0, 2, 1]);
    insert_find_all(&[1, 0, 2]);
    insert_find_all(&[1, 2, 0]);
    insert_find_all(&[2, 0, 1]);
    insert_find_all(&[2, 1, 0]);
}

#[test]
fn four_elems_find() {
    insert_find_all(&[0, 1, 2, 3]);
    insert_find_all(&[0, 1, 3, 2]);
    insert_find_all(&[0, 2, 1, 3]);
    insert_find_all(&[0, 2, 3, 1]);
    insert_find_all(&[0, 3, 1, 2]);
    insert_find_all(&[0, 3, 2, 1]);

    insert_find_all(&[1, 0, 2, 3]);
    insert_find_all(&[1, 0, 3, 2]);
    insert_find_all(&[1, 2, 0, 3]);
    insert_find_all(&[1, 2, 3, 0]);
    insert_find_all(&[1, 3, 0, 2]);
    insert_find_all(&[1, 3, 2, 0]);

    insert_find_all(&[2, 0, 1, 3]);
    insert_find_all(&[2, 0, 3, 1]);
    insert_find_all(&[2, 1, 0, 3]);
    insert_find_all(&[2, 1, 3, 0]);
    insert_find_all(&[2, 3, 0, 1]);
    insert_find_all(&[2, 3, 1, 0]);

    insert_find_all(&[3, 0, 1, 2]);
    insert_find_all(&[3, 0, 2, 1]);
    insert_find_all(&[3, 1, 0, 2]);
    insert_find_all(&[3, 1, 2, 0]);
    insert_find_all(&[3, 2, 0, 1]);
    insert_find_all(&[3, 2, 1, 0]);
}

fn insert_remove_all(keys: &[u32]) {
    let mut tree: AvlTree<TestNode> = AvlTree::new();

    for &key in keys {
        tree.insert(Box::new(TestNode {
            links: Links::new(),
            key,
        }));
        tree.assert_invariants();
    }

    for key in keys {
        let node = tree.get_raw(key).expect("item not found");
        unsafe { tree.remove_at(node) };
        tree.assert_invariants();
    }

    for &key in keys {
        tree.insert(Box::new(TestNode {
            links: Links::new(),
            key,
        }));
        tree.assert_invariants();
    }

    for key in keys.iter().rev() {
        let node = tree.get_raw(key).expect("item not found");
        unsafe { tree.remove_at(node) };
        tree.assert_invariants();
    }
}

#[test]
fn remove_one() {
    insert_remove_all(&[0]);
}

#[test]
fn remove_two() {
    insert_remove_all(&[0, 1]);
    insert_remove_all(&[1, 0]);
}

#[test]
fn remove_three() {
    insert_remove_all(&[0, 1, 2]);
    insert_remove_all(&[0, 2, 1]);
    insert_remove_all(&[1, 0, 2]);
    insert_remove_all(&[1, 2, 0]);
    insert_remove_all(&[2, 0, 1]);
    insert_remove_all(&[2, 1, 0]);
}

#[test]
fn remove_four() {
    insert_remove_all(&[0, 1, 2, 3]);
    insert_remove_all(&[0, 1, 3, 2]);
    insert_remove_all(&[0, 2, 1, 3]);
    insert_remove_all(&[0, 2, 3, 1]);
    insert_remove_all(&[0, 3, 1, 2]);
    insert_remove_all(&[0, 3, 2, 1]);

    insert_remove_all(&[1, 0, 2, 3]);
    insert_remove_all(&[1, 0, 3, 2]);
    insert_remove_all(&[1, 2, 0, 3]);
    insert_remove_all(&[1, 2, 3, 0]);
    insert_remove_all(&[1, 3, 0, 2]);
    insert_remove_all(&[1, 3, 2, 0]);

    insert_remove_all(&[2, 0, 1, 3]);
    insert_remove_all(&[2, 0, 3, 1]);
    insert_remove_all(&[2, 1, 0, 3]);
    insert_remove_all(&[2, 1, 3, 0]);
    insert_remove_all(&[2, 3, 0, 1]);
    insert_remove_all(&[2, 3, 1, 0]);

    insert_remove_all(&[3, 0, 1, 2]);
    insert_remove_all(&[3, 0, 2, 1]);
    insert_remove_all(&[3, 1, 0, 2]);
    insert_remove_all(&[3, 1, 2, 0]);
    insert_remove_all(&[3, 2, 0, 1]);
    insert_remove_all(&[3, 2, 1, 0]);
}

// Each of the four rotation cases pinned to the shape it must produce: a
// three-node ascending insert leans right and resolves with a single left
// rotation, and so on through the mirrors and both double-rotation shapes.
// All four converge on the same balanced triangle.
fn assert_balanced_triangle(tree: &AvlTree<TestNode>) {
    let root = tree.root.expect("tree must not be empty");
    let left = left_of(root).expect("root must have a left child");
    let right = right_of(root).expect("root must have a right child");

    assert_eq!(key_of(root), 20);
    assert_eq!(key_of(left), 10);
    assert_eq!(key_of(right), 30);

    assert_eq!(balance_of(root), 0);
    assert_eq!(balance_of(left), 0);
    assert_eq!(balance_of(right), 0);
}

#[test]
fn insert_rotates_single_left() {
    assert_balanced_triangle(&build(&[10, 20, 30]));
}

#[test]
fn insert_rotates_single_right() {
    assert_balanced_triangle(&build(&[30, 20, 10]));
}

#[test]
fn insert_rotates_double_left_right() {
    assert_balanced_triangle(&build(&[30, 10, 20]));
}

#[test]
fn insert_rotates_double_right_left() {
    assert_balanced_triangle(&build(&[10, 30, 20]));
}

#[test]
fn remove_root_of_perfect_tree() {
    let mut tree = build(&[40, 20, 60, 10, 30, 50, 70]);
    assert_eq!(key_of(tree.root.unwrap()), 40);

    let removed = tree.remove(&40).expect("root key must be present");
    assert_eq!(removed.key, 40);

    tree.assert_invariants();
    assert_eq!(tree.len(), 6);
    assert_eq!(
        tree.iter().map(|node| node.key).collect::<Vec<_>>(),
        [10, 20, 30, 50, 60, 70]
    );
}

#[test]
fn remove_absent_key_is_noop() {
    let mut tree = build(&[40, 20, 60]);

    let before = snapshot(&tree);
    assert!(tree.remove(&99).is_none());

    tree.assert_invariants();
    assert_eq!(snapshot(&tree), before);
    assert_eq!(tree.len(), 3);
}

#[test]
fn duplicate_insert_preserves_topology() {
    let mut tree = build(&[40, 20, 60, 10, 30, 50, 70]);

    let before = snapshot(&tree);
    let old = tree.insert(TestNode::new(30)).expect("key already present");
    assert_eq!(old.key, 30);

    tree.assert_invariants();
    assert_eq!(snapshot(&tree), before);
    assert_eq!(tree.len(), 7);
}

#[test]
fn insert_then_remove_round_trip() {
    let mut tree = build(&[50, 30, 70, 20, 40, 60, 80, 10]);

    let before: Vec<u32> = tree.iter().map(|node| node.key).collect();

    tree.insert(TestNode::new(45));
    tree.assert_invariants();
    tree.remove(&45).expect("key was just inserted");
    tree.assert_invariants();

    let after: Vec<u32> = tree.iter().map(|node| node.key).collect();
    assert_eq!(before, after);
}

#[test]
fn height_stays_logarithmic() {
    let mut tree: AvlTree<TestNode> = AvlTree::new();

    for key in 0..1000 {
        tree.insert(TestNode::new(key));
    }
    tree.assert_invariants();

    let height = height(tree.root) as f64;
    let bound = 1.44 * ((tree.len() + 2) as f64).log2();
    assert!(height <= bound, "height {height} exceeds AVL bound {bound}");
}

#[test]
fn equal_depth_empty_tree() {
    let tree: AvlTree<TestNode> = AvlTree::new();
    assert!(tree.all_leaves_equal_depth());
}

#[test]
fn equal_depth_single_node() {
    assert!(build(&[1]).all_leaves_equal_depth());
}

#[test]
fn equal_depth_perfect_tree() {
    // All leaves at depth 2.
    assert!(build(&[40, 20, 60, 10, 30, 50, 70]).all_leaves_equal_depth());
}

#[test]
fn equal_depth_ragged_tree() {
    // Leaf 10 sits at depth 1, leaf 40 at depth 2.
    assert!(!build(&[20, 10, 30, 40]).all_leaves_equal_depth());

    // A full bottom row except for one leaf hanging at depth 3.
    assert!(!build(&[8, 4, 12, 2, 6, 10, 14, 1]).all_leaves_equal_depth());
}

#[test]
fn map_insert_overwrites_value() {
    let mut map: AvlMap<u32, &str> = AvlMap::new();

    assert_eq!(map.insert(1, "one"), None);
    assert_eq!(map.insert(2, "two"), None);
    assert_eq!(map.insert(1, "uno"), Some("one"));

    assert_eq!(map.get(&1), Some(&"uno"));
    assert_eq!(map.len(), 2);

    assert_eq!(map.remove(&3), None);
    assert_eq!(map.remove(&2), Some("two"));
    assert_eq!(map.len(), 1);
}

#[test]
fn map_iterates_in_key_order() {
    let mut map: AvlMap<u32, u32> = AvlMap::new();

    for key in [5, 1, 4, 2, 3] {
        map.insert(key, key * 10);
    }

    let pairs: Vec<(u32, u32)> = map.iter().map(|(&k, &v)| (k, v)).collect();
    assert_eq!(pairs, [(1, 10), (2, 20), (3, 30), (4, 40), (5, 50)]);

    assert_eq!(map.first_key_value(), Some((&1, &10)));
    assert_eq!(map.last_key_value(), Some((&5, &50)));
    assert_eq!(map.pop_first(), Some((1, 10)));
    assert_eq!(map.pop_last(), Some((5, 50)));
}

#[cfg(miri)]
const FUZZ_RANGE: Range<usize> = 0..10;

#[cfg(not(miri))]
const FUZZ_RANGE: Range<usize> = 0..1000;

proptest::proptest! {
    #![proptest_config(ProptestConfig {
        max_shrink_iters: 65536,
        .. ProptestConfig::default()
    })]

    #[test]
    fn btree_equivalence(ops in proptest::collection::vec(model::op_strategy(), FUZZ_RANGE)) {
        model::run_btree_equivalence(ops);
    }
}
