//! Tests for the B-tree: split/merge shapes, the borrow paths and
//! model-checked random workloads

use std::collections::BTreeSet;

use proptest::prelude::*;

use super::*;

/// Keys of every child of the root, left to right
fn root_children(tree: &BTree) -> Vec<Vec<Key>> {
    let root = tree.get_node(tree.root_id()).unwrap();
    root.children
        .iter()
        .map(|&id| tree.get_node(id).unwrap().keys.clone())
        .collect()
}

fn root_keys(tree: &BTree) -> Vec<Key> {
    tree.get_node(tree.root_id()).unwrap().keys.clone()
}

fn build(order: usize, keys: &[Key]) -> BTree {
    let mut tree = BTree::new(order).unwrap();
    for &key in keys {
        tree.insert(key).unwrap();
    }
    tree
}

/// Order 4 tree from the reference walkthrough:
/// root [10 20] with leaves [5 6 7] [12 17] [30]
fn scenario_tree() -> BTree {
    build(4, &[10, 20, 5, 6, 12, 30, 7, 17])
}

#[test]
fn test_new_tree() {
    let tree = BTree::new(4).unwrap();
    assert!(tree.is_empty());
    assert_eq!(tree.len(), 0);
    assert_eq!(tree.height(), 0);
    assert_eq!(tree.order(), 4);
    assert_eq!(tree.max_keys(), 3);
    assert_eq!(tree.min_keys(), 1);
    assert_eq!(tree.node_count(), 1);
    assert!(tree.validate().is_ok());
}

#[test]
fn test_invalid_order() {
    for order in [0, 1, 2, 3, 5, 7] {
        assert_eq!(BTree::new(order).unwrap_err(), BTreeError::InvalidOrder(order));
    }
    for order in [4, 6, 8, 100] {
        assert!(BTree::new(order).is_ok());
    }
}

#[test]
fn test_odd_orders_cannot_hold_minimum_after_split() {
    // order 3: a full node has 2 keys, so a split leaves an empty sibling
    assert!(!is_valid_order(3));
    // order 5: 4 keys split into 1 + median + 2, below minKeys = 2
    assert!(!is_valid_order(5));
    assert!(is_valid_order(4));
    assert!(is_valid_order(DEFAULT_ORDER));
}

#[test]
fn test_default_order() {
    let tree = BTree::default();
    assert_eq!(tree.order(), DEFAULT_ORDER);
    assert!(tree.is_empty());
}

#[test]
fn test_inserts_without_split() {
    let tree = build(4, &[20, 10, 30]);

    assert_eq!(tree.len(), 3);
    assert_eq!(tree.height(), 1);
    assert_eq!(root_keys(&tree), vec![10, 20, 30]);
    assert!(tree.contains(10));
    assert!(tree.contains(30));
    assert!(!tree.contains(15));
}

#[test]
fn test_root_split() {
    let tree = build(4, &[1, 2, 3, 4]);

    assert_eq!(tree.height(), 2);
    assert_eq!(root_keys(&tree), vec![2]);
    assert_eq!(root_children(&tree), vec![vec![1], vec![3, 4]]);
    assert!(tree.validate().is_ok());
}

#[test]
fn test_split_counts_for_several_orders() {
    for order in [4, 6, 8, 10] {
        let max_keys = order - 1;
        let mid = max_keys / 2;
        let keys: Vec<Key> = (1..=(max_keys as Key + 1)).collect();
        let tree = build(order, &keys);

        assert_eq!(root_keys(&tree), vec![mid as Key + 1], "order {}", order);
        let children = root_children(&tree);
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].len(), mid);
        // The right half gets maxKeys - mid - 1 keys plus the new, largest key
        assert_eq!(children[1].len(), max_keys - mid - 1 + 1);
        assert!(tree.validate().is_ok());
    }
}

#[test]
fn test_reference_scenario() {
    let mut tree = scenario_tree();

    assert_eq!(tree.keys(), vec![5, 6, 7, 10, 12, 17, 20, 30]);
    assert_eq!(root_keys(&tree), vec![10, 20]);
    assert_eq!(
        root_children(&tree),
        vec![vec![5, 6, 7], vec![12, 17], vec![30]]
    );

    tree.delete(6).unwrap();
    assert_eq!(tree.delete(13), Err(BTreeError::KeyNotFound(13)));

    assert_eq!(tree.keys(), vec![5, 7, 10, 12, 17, 20, 30]);
    assert_eq!(tree.len(), 7);
    assert!(tree.validate().is_ok());
}

#[test]
fn test_delete_from_empty_tree() {
    let mut tree = BTree::new(4).unwrap();

    assert_eq!(tree.delete(1), Err(BTreeError::EmptyTree));
    assert!(tree.is_empty());
    assert!(!tree.contains(1));
    assert!(tree.validate().is_ok());
}

#[test]
fn test_duplicate_insert_rejected() {
    let mut tree = scenario_tree();
    let before = tree.traverse(Traversal::PreOrder);

    assert_eq!(tree.insert(12), Err(BTreeError::DuplicateKey(12)));
    assert_eq!(tree.len(), 8);
    assert_eq!(tree.traverse(Traversal::PreOrder), before);
}

#[test]
fn test_delete_from_leaf() {
    let mut tree = build(4, &[10, 20, 30]);

    tree.delete(20).unwrap();
    assert_eq!(root_keys(&tree), vec![10, 30]);
    assert_eq!(tree.len(), 2);
}

#[test]
fn test_delete_until_empty() {
    let mut tree = build(4, &[10, 20, 30]);

    for key in [10, 20, 30] {
        tree.delete(key).unwrap();
    }

    assert!(tree.is_empty());
    assert_eq!(tree.height(), 0);
    assert_eq!(tree.delete(10), Err(BTreeError::EmptyTree));
    assert!(tree.validate().is_ok());
}

#[test]
fn test_borrow_from_next() {
    let mut tree = build(4, &[1, 2, 3, 4]);

    // [1] is minimal and its right sibling [3 4] can lend
    tree.delete(1).unwrap();

    assert_eq!(root_keys(&tree), vec![3]);
    assert_eq!(root_children(&tree), vec![vec![2], vec![4]]);
    assert!(tree.validate().is_ok());
}

#[test]
fn test_borrow_from_prev() {
    let mut tree = build(4, &[1, 2, 3, 4, 0]);
    tree.delete(4).unwrap();
    assert_eq!(root_children(&tree), vec![vec![0, 1], vec![3]]);

    // [3] is minimal and its left sibling [0 1] can lend
    tree.delete(3).unwrap();

    assert_eq!(root_keys(&tree), vec![1]);
    assert_eq!(root_children(&tree), vec![vec![0], vec![2]]);
    assert!(tree.validate().is_ok());
}

#[test]
fn test_merge_shape() {
    let mut tree = build(4, &[1, 2, 3, 4]);
    tree.delete(4).unwrap();
    assert_eq!(root_children(&tree), vec![vec![1], vec![3]]);

    let root = tree.root_id();
    let parent_keys = root_keys(&tree).len();
    tree.merge(root, 0).unwrap();

    assert_eq!(root_keys(&tree).len(), parent_keys - 1);
    let merged = root_children(&tree);
    assert_eq!(merged, vec![vec![1, 2, 3]]);
    assert_eq!(merged[0].len(), 2 * tree.min_keys() + 1);
    assert_eq!(tree.node_count(), 2);

    tree.collapse_root().unwrap();
    assert_eq!(tree.height(), 1);
    assert!(tree.validate().is_ok());
}

#[test]
fn test_merge_collapses_root() {
    let mut tree = build(4, &[1, 2, 3, 4]);
    tree.delete(4).unwrap();

    // Both neighbours of 2 are minimal, so they merge around it
    tree.delete(2).unwrap();

    assert_eq!(tree.height(), 1);
    assert_eq!(root_keys(&tree), vec![1, 3]);
    assert_eq!(tree.node_count(), 1);
    assert!(tree.validate().is_ok());
}

#[test]
fn test_delete_internal_uses_predecessor() {
    let mut tree = scenario_tree();

    tree.delete(10).unwrap();

    assert_eq!(root_keys(&tree), vec![7, 20]);
    assert_eq!(
        root_children(&tree),
        vec![vec![5, 6], vec![12, 17], vec![30]]
    );
    assert!(tree.validate().is_ok());
}

#[test]
fn test_delete_internal_uses_successor() {
    let mut tree = scenario_tree();
    tree.delete(12).unwrap();
    tree.insert(35).unwrap();
    assert_eq!(
        root_children(&tree),
        vec![vec![5, 6, 7], vec![17], vec![30, 35]]
    );

    tree.delete(20).unwrap();

    assert_eq!(root_keys(&tree), vec![10, 30]);
    assert_eq!(
        root_children(&tree),
        vec![vec![5, 6, 7], vec![17], vec![35]]
    );
    assert!(tree.validate().is_ok());
}

#[test]
fn test_absent_key_after_refill_keeps_tree_valid() {
    let mut tree = build(4, &[1, 2, 3, 4]);
    tree.delete(4).unwrap();

    // Descending towards 5 merges [1] [2] [3], emptying the root
    assert_eq!(tree.delete(5), Err(BTreeError::KeyNotFound(5)));

    assert_eq!(tree.len(), 3);
    assert_eq!(tree.height(), 1);
    assert_eq!(tree.keys(), vec![1, 2, 3]);
    assert!(tree.validate().is_ok());
}

#[test]
fn test_merge_with_previous_sibling_reindexes_descent() {
    // Root [2 4] over [1] [3] [5]: deleting 5 merges the last child into
    // its previous sibling, so the descent must continue at index 1
    let mut tree = build(4, &[1, 2, 3, 4, 5, 6]);
    tree.delete(6).unwrap();
    assert_eq!(root_keys(&tree), vec![2, 4]);
    assert_eq!(root_children(&tree), vec![vec![1], vec![3], vec![5]]);

    tree.delete(5).unwrap();

    assert_eq!(root_keys(&tree), vec![2]);
    assert_eq!(root_children(&tree), vec![vec![1], vec![3, 4]]);
    assert!(tree.validate().is_ok());
}

#[test]
fn test_traversals() {
    let tree = scenario_tree();

    assert_eq!(
        tree.traverse(Traversal::PreOrder),
        vec![10, 20, 5, 6, 7, 12, 17, 30]
    );
    assert_eq!(
        tree.traverse(Traversal::InOrder),
        vec![5, 6, 7, 10, 12, 17, 20, 30]
    );
    assert_eq!(
        tree.traverse(Traversal::PostOrder),
        vec![5, 6, 7, 12, 17, 30, 10, 20]
    );
    assert_eq!(
        tree.traverse(Traversal::LevelOrder),
        vec![10, 20, 5, 6, 7, 12, 17, 30]
    );
    assert_eq!(
        tree.levels(),
        vec![
            vec![vec![10, 20]],
            vec![vec![5, 6, 7], vec![12, 17], vec![30]],
        ]
    );
}

#[test]
fn test_contains_does_not_mutate() {
    let tree = scenario_tree();
    let before = tree.traverse(Traversal::PreOrder);

    for _ in 0..3 {
        assert!(tree.contains(17));
        assert!(!tree.contains(18));
    }

    assert_eq!(tree.traverse(Traversal::PreOrder), before);
    assert_eq!(tree.node_count(), 4);
}

#[test]
fn test_insert_then_delete_round_trip() {
    let mut tree = scenario_tree();
    let before = tree.keys();

    tree.insert(11).unwrap();
    tree.delete(11).unwrap();

    assert_eq!(tree.keys(), before);
    assert!(tree.validate().is_ok());
}

#[test]
fn test_min_max_and_clear() {
    let mut tree = scenario_tree();
    assert_eq!(tree.min(), Some(5));
    assert_eq!(tree.max(), Some(30));

    tree.clear();
    assert!(tree.is_empty());
    assert_eq!(tree.min(), None);
    assert_eq!(tree.max(), None);
    assert_eq!(tree.order(), 4);
}

#[test]
fn test_negative_keys() {
    let tree = build(4, &[-10, 0, 10, -20, 5]);

    assert_eq!(tree.keys(), vec![-20, -10, 0, 5, 10]);
    assert!(tree.contains(-20));
    assert!(!tree.contains(-5));
}

#[test]
fn test_freed_nodes_are_recycled() {
    let mut tree = build(4, &(0..20).collect::<Vec<_>>());
    let allocated = tree.nodes.len();

    for key in 0..20 {
        tree.delete(key).unwrap();
    }
    for key in 0..20 {
        tree.insert(key).unwrap();
    }

    assert_eq!(tree.nodes.len(), allocated);
    assert!(tree.validate().is_ok());
}

#[test]
fn test_stress_insert_delete() {
    for order in [4, 6, 8] {
        let mut tree = BTree::new(order).unwrap();

        for i in 0..200 {
            tree.insert((i * 37) % 200).unwrap();
        }
        assert_eq!(tree.len(), 200);
        assert!(tree.height() >= 2);
        assert!(tree.validate().is_ok());

        for i in (0..200).step_by(2) {
            tree.delete(i).unwrap();
            if let Err(e) = tree.validate() {
                panic!("order {} after delete({}): {}", order, i, e);
            }
        }

        assert_eq!(tree.len(), 100);
        for i in 0..200 {
            assert_eq!(tree.contains(i), i % 2 == 1);
        }
    }
}

#[derive(Debug, Clone)]
enum Op {
    Insert(Key),
    Delete(Key),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (-64i64..64).prop_map(Op::Insert),
        (-64i64..64).prop_map(Op::Delete),
    ]
}

proptest! {
    #[test]
    fn btree_behaves_like_btreeset(
        order in prop_oneof![Just(4usize), Just(6), Just(8)],
        ops in prop::collection::vec(op_strategy(), 0..400),
    ) {
        let mut tree = BTree::new(order).unwrap();
        let mut model = BTreeSet::new();

        for op in ops {
            match op {
                Op::Insert(key) => {
                    let result = tree.insert(key);
                    if model.insert(key) {
                        prop_assert_eq!(result, Ok(()));
                    } else {
                        prop_assert_eq!(result, Err(BTreeError::DuplicateKey(key)));
                    }
                }
                Op::Delete(key) => {
                    let result = tree.delete(key);
                    if model.is_empty() {
                        prop_assert_eq!(result, Err(BTreeError::EmptyTree));
                    } else if model.remove(&key) {
                        prop_assert_eq!(result, Ok(()));
                    } else {
                        prop_assert_eq!(result, Err(BTreeError::KeyNotFound(key)));
                    }
                }
            }

            let validation = tree.validate();
            prop_assert!(validation.is_ok(), "{:?}", validation);
            prop_assert_eq!(tree.len(), model.len());
            prop_assert_eq!(tree.keys(), model.iter().copied().collect::<Vec<_>>());
        }
    }
}
