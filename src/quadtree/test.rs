use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::bbox::BoundingBox;
use crate::error::KdQuadError;
use crate::quadtree::QuadTree;

const MIN_VALUE: f64 = -500.0;
const MAX_VALUE: f64 = 500.0;

fn bb(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> BoundingBox {
    BoundingBox::new(min_x, min_y, max_x, max_y).unwrap()
}

/// The envelopes of triangle ABC `(0,0) (0,1) (1,1)` and triangle DEF `(2,0) (2,2) (4,2)`.
fn triangles() -> QuadTree<&'static str> {
    let mut tree = QuadTree::new();
    tree.add("ABC", bb(0.0, 0.0, 1.0, 1.0)).unwrap();
    tree.add("DEF", bb(2.0, 0.0, 4.0, 2.0)).unwrap();
    tree
}

fn random_box(rng: &mut StdRng, max_size: f64) -> BoundingBox {
    let x = rng.gen_range(MIN_VALUE..MAX_VALUE);
    let y = rng.gen_range(MIN_VALUE..MAX_VALUE);
    let w = rng.gen_range(0.0..max_size);
    let h = rng.gen_range(0.0..max_size);
    bb(x, y, x + w, y + h)
}

#[test]
fn constructors() {
    let tree = QuadTree::<u32>::new();
    assert_eq!(
        tree.max_items_per_node(),
        QuadTree::<u32>::DEFAULT_MAX_ITEMS_PER_NODE
    );
    assert!(tree.root_envelope().is_none());
    assert!(tree.is_empty());

    let tree = QuadTree::<u32>::new_with_max_items(12);
    assert_eq!(tree.max_items_per_node(), 12);
    assert!(tree.root_envelope().is_none());

    let tree = QuadTree::<u32>::new_with_bounds(MIN_VALUE, MIN_VALUE, MAX_VALUE, MAX_VALUE, 5)
        .unwrap();
    assert_eq!(tree.max_items_per_node(), 5);
    assert_eq!(
        tree.root_envelope(),
        Some(&bb(MIN_VALUE, MIN_VALUE, MAX_VALUE, MAX_VALUE))
    );
    assert!(tree.is_empty());

    let envelope = bb(0.0, 0.0, 10.0, 4.0);
    let tree = QuadTree::<u32>::new_with_envelope(&envelope, 6);
    assert_eq!(tree.root_envelope(), Some(&bb(0.0, -3.0, 10.0, 7.0)));

    assert!(matches!(
        QuadTree::<u32>::new_with_bounds(1.0, 0.0, 0.0, 1.0, 8),
        Err(KdQuadError::InvalidArgument(_))
    ));

    let tree: QuadTree<u32> = Default::default();
    assert_eq!(tree.max_items_per_node(), 8);
}

#[test]
fn add_and_remove() {
    let mut tree = QuadTree::new();
    tree.add("a", BoundingBox::from_point(10.0, -20.0, 1e-9))
        .unwrap();
    tree.add_bounds("b", 30.0, 40.0, 31.0, 41.0).unwrap();
    tree.add_rect("c", &bb(-5.0, -5.0, 5.0, 5.0)).unwrap();
    assert_eq!(tree.len(), 3);
    assert_eq!(tree.items().copied().collect::<Vec<_>>(), vec!["a", "b", "c"]);

    assert!(tree.remove(&"a"));
    assert!(!tree.remove(&"a"));
    assert!(!tree.remove(&"missing"));
    assert_eq!(tree.len(), 2);

    let items: HashSet<_> = tree.items().copied().collect();
    assert_eq!(items, HashSet::from(["b", "c"]));
    let bounds: Vec<_> = tree
        .items_with_bounds()
        .map(|(item, bounds)| (*item, *bounds))
        .collect();
    assert!(bounds.contains(&("b", bb(30.0, 40.0, 31.0, 41.0))));

    assert!(tree.query_distinct_point(10.0, -20.0).is_empty());
    assert_eq!(tree.query_distinct_point(30.5, 40.5), vec![&"b"]);
}

#[test]
fn add_rejects_invalid_input() {
    let mut tree = triangles();
    assert_eq!(
        tree.add("ABC", bb(10.0, 10.0, 11.0, 11.0)),
        Err(KdQuadError::DuplicateItem)
    );
    assert!(matches!(
        tree.add_bounds("GHI", 1.0, 1.0, 0.0, 0.0),
        Err(KdQuadError::InvalidArgument(_))
    ));
    assert!(matches!(
        tree.add_bounds("JKL", f64::NAN, 0.0, 1.0, 1.0),
        Err(KdQuadError::InvalidArgument(_))
    ));
    assert_eq!(tree.len(), 2);
    assert_eq!(tree.items().count(), 2);
    // The rejected boxes did not disturb the root
    assert_eq!(tree.query_distinct_point(0.75, 0.75), vec![&"ABC"]);
}

#[test]
fn query_distinct_by_point() {
    let tree = triangles();
    assert_eq!(tree.len(), 2);
    assert_eq!(tree.query_distinct_point(0.75, 0.75), vec![&"ABC"]);
    assert_eq!(tree.query_distinct_point(2.75, 0.75), vec![&"DEF"]);
    assert!(tree.query_distinct_point(1.5, 0.5).is_empty());
    assert_eq!(tree.query_non_distinct_point(0.75, 0.75), vec![&"ABC"]);
}

#[test]
fn query_distinct_by_box() {
    let tree = triangles();
    assert_eq!(tree.query_distinct(&bb(0.0, 0.0, 1.0, 1.0)), vec![&"ABC"]);
    assert_eq!(tree.query_distinct(&bb(2.0, 0.0, 4.0, 2.0)), vec![&"DEF"]);
    assert_eq!(
        tree.query_rect(&bb(0.5, 0.5, 2.5, 0.6)).unwrap(),
        vec![&"ABC", &"DEF"]
    );
}

#[test]
fn query_empty_tree() {
    let tree = QuadTree::<u32>::new_with_bounds(0.0, 0.0, 1.0, 1.0, 8).unwrap();
    assert!(tree.query_non_distinct(&bb(0.0, 0.0, 1.0, 1.0)).is_empty());
    assert!(QuadTree::<u32>::new().query_distinct_point(0.0, 0.0).is_empty());
}

#[test]
fn root_grows_to_contain_new_items() {
    let mut tree = QuadTree::new_with_max_items(2);
    for i in 0..10 {
        let v = i as f64;
        tree.add(i, bb(v, v, v + 0.5, v + 0.5)).unwrap();
    }
    let before: HashSet<u32> = tree.items().copied().collect();

    let far = bb(1000.0, -1000.0, 1001.0, -999.0);
    tree.add(10, far).unwrap();

    let root = *tree.root_envelope().unwrap();
    assert!(root.contains(far.min_x(), far.min_y()) && root.contains(far.max_x(), far.max_y()));
    assert!(root.contains(0.0, 0.0) && root.contains(9.5, 9.5));

    let after: HashSet<u32> = tree.items().copied().collect();
    assert!(after.is_superset(&before));
    assert_eq!(tree.len(), 11);

    for i in 0..10 {
        let v = i as f64 + 0.25;
        assert_eq!(tree.query_distinct_point(v, v), vec![&i]);
    }
    assert_eq!(tree.query_distinct_point(1000.5, -999.5), vec![&10]);
}

#[test]
fn first_point_item_then_growth() {
    let mut tree = QuadTree::new();
    tree.add(0, BoundingBox::from_point(3.0, 3.0, 0.0)).unwrap();
    assert_eq!(tree.root_envelope(), Some(&bb(3.0, 3.0, 3.0, 3.0)));

    tree.add(1, BoundingBox::from_point(-3.0, 8.0, 0.0)).unwrap();
    assert_eq!(tree.query_distinct_point(3.0, 3.0), vec![&0]);
    assert_eq!(tree.query_distinct_point(-3.0, 8.0), vec![&1]);
}

#[test]
fn non_distinct_repeats_items_spanning_children() {
    let mut tree = QuadTree::new_with_bounds(0.0, 0.0, 10.0, 10.0, 4).unwrap();
    tree.add(0, bb(1.0, 1.0, 2.0, 2.0)).unwrap();
    tree.add(1, bb(1.0, 8.0, 2.0, 9.0)).unwrap();
    tree.add(2, bb(8.0, 1.0, 9.0, 2.0)).unwrap();
    tree.add(3, bb(8.0, 8.0, 9.0, 9.0)).unwrap();
    // Covers the root centroid without touching a corner, so it is pushed into every quadrant
    tree.add(4, bb(4.0, 4.0, 6.0, 6.0)).unwrap();

    assert_eq!(tree.query_non_distinct_point(5.0, 5.0), vec![&4; 4]);
    assert_eq!(tree.query_distinct_point(5.0, 5.0), vec![&4]);

    // Covers the centroid and a corner, so it stays at the root
    tree.add(5, bb(0.0, 0.0, 10.0, 5.1)).unwrap();
    assert_eq!(tree.root_envelope(), Some(&bb(0.0, 0.0, 10.0, 10.0)));
    let hits = tree.query_non_distinct_point(0.5, 5.0);
    assert_eq!(hits, vec![&5]);
}

#[test]
fn remove_everything_collapses_children() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut tree = QuadTree::new_with_max_items(4);
    let boxes: Vec<BoundingBox> = (0..200).map(|_| random_box(&mut rng, 20.0)).collect();
    for (id, item_bb) in boxes.iter().enumerate() {
        tree.add(id, *item_bb).unwrap();
    }
    assert_eq!(tree.len(), 200);

    for id in 0..200 {
        assert!(tree.remove(&id));
        assert_eq!(tree.len(), 199 - id);
    }
    assert!(tree.is_empty());
    assert_eq!(tree.items().count(), 0);
    assert!(tree
        .query_non_distinct(&bb(MIN_VALUE, MIN_VALUE, MAX_VALUE, MAX_VALUE))
        .is_empty());
}

#[test]
fn query_matches_brute_force() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut tree = QuadTree::new();
    let boxes: Vec<BoundingBox> = (0..1000).map(|_| random_box(&mut rng, 30.0)).collect();
    for (id, item_bb) in boxes.iter().enumerate() {
        tree.add(id, *item_bb).unwrap();
    }

    // Remove a share of the items to exercise unsplitting
    for id in (0..1000).step_by(7) {
        assert!(tree.remove(&id));
    }

    for _ in 0..100 {
        let query = random_box(&mut rng, 100.0);
        let expected: HashSet<usize> = boxes
            .iter()
            .enumerate()
            .filter(|(id, item_bb)| id % 7 != 0 && item_bb.intersects(&query))
            .map(|(id, _)| id)
            .collect();

        let distinct = tree.query_distinct(&query);
        assert_eq!(distinct.len(), expected.len());
        let distinct: HashSet<usize> = distinct.into_iter().copied().collect();
        assert_eq!(distinct, expected);

        let non_distinct: HashSet<usize> =
            tree.query_non_distinct(&query).into_iter().copied().collect();
        assert_eq!(non_distinct, expected);
    }
}

#[test]
fn narrow_boxes_match_brute_force() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut tree = QuadTree::new_with_max_items(3);
    let mut boxes = vec![];
    for id in 0..300 {
        // Long thin strips crossing many nodes
        let item_bb = if id % 2 == 0 {
            let y = rng.gen_range(MIN_VALUE..MAX_VALUE);
            let x = rng.gen_range(MIN_VALUE..0.0);
            bb(x, y, x + rng.gen_range(100.0..800.0), y + 0.01)
        } else {
            let x = rng.gen_range(MIN_VALUE..MAX_VALUE);
            let y = rng.gen_range(MIN_VALUE..0.0);
            bb(x, y, x + 0.01, y + rng.gen_range(100.0..800.0))
        };
        tree.add(id, item_bb).unwrap();
        boxes.push(item_bb);
    }

    for _ in 0..100 {
        let x = rng.gen_range(MIN_VALUE..MAX_VALUE);
        let y = rng.gen_range(MIN_VALUE..MAX_VALUE);
        let query = bb(x, y, x + 25.0, y + 25.0);
        let expected: HashSet<usize> = boxes
            .iter()
            .enumerate()
            .filter(|(_, item_bb)| item_bb.intersects(&query))
            .map(|(id, _)| id)
            .collect();
        let result: HashSet<usize> = tree.query_distinct(&query).into_iter().copied().collect();
        assert_eq!(result, expected);
    }
}
