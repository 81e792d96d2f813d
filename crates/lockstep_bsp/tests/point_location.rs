//! Randomized point-location checks against trees with a known answer.

use lockstep_bsp::{BspTree, Node, Subsector};
use lockstep_math::Fixed;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Builds a balanced tree of vertical splits over sorted `cuts`.
///
/// Leaf `i` is the column between `cuts[i - 1]` and `cuts[i]`. A point
/// exactly on a cut belongs to the column on its left whichever way the
/// line points, so the answer is the number of cuts strictly left of x.
fn column_tree(cuts: &[i32], rng: &mut ChaCha8Rng) -> BspTree {
    fn build(
        cuts: &[i32],
        first_leaf: u16,
        nodes: &mut Vec<Node>,
        rng: &mut ChaCha8Rng,
    ) -> u16 {
        if cuts.is_empty() {
            return Node::leaf(first_leaf);
        }
        let mid = cuts.len() / 2;
        let left = build(&cuts[..mid], first_leaf, nodes, rng);
        let right = build(&cuts[mid + 1..], first_leaf + mid as u16 + 1, nodes, rng);

        let x = Fixed::from_int(cuts[mid]);
        let node = if rng.gen_bool(0.5) {
            // North-pointing: left is back.
            Node::new(x, Fixed::ZERO, Fixed::ZERO, Fixed::from_int(64), right, left)
        } else {
            // South-pointing: left is front.
            Node::new(x, Fixed::ZERO, Fixed::ZERO, Fixed::from_int(-64), left, right)
        };
        nodes.push(node);
        (nodes.len() - 1) as u16
    }

    let mut nodes = Vec::new();
    build(cuts, 0, &mut nodes, rng);
    let subsectors = (0..=cuts.len() as u16)
        .map(|i| Subsector {
            sector: i,
            num_lines: 4,
            first_line: 0,
        })
        .collect();
    BspTree::new(nodes, subsectors).unwrap()
}

fn random_cuts(rng: &mut ChaCha8Rng, count: usize) -> Vec<i32> {
    let mut cuts: Vec<i32> = (0..count).map(|_| rng.gen_range(-4000..4000)).collect();
    cuts.sort_unstable();
    cuts.dedup();
    cuts
}

#[test]
fn test_locate_leaf_matches_column() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x5EED_0001);

    for _ in 0..32 {
        let count = rng.gen_range(1..200);
        let cuts = random_cuts(&mut rng, count);
        let tree = column_tree(&cuts, &mut rng);

        for _ in 0..256 {
            let x = rng.gen_range(-4200..4200);
            let y = rng.gen_range(-4200..4200);
            let expected = cuts.iter().filter(|&&c| c < x).count() as u16;
            let leaf = tree.locate_leaf(Fixed::from_int(x), Fixed::from_int(y));
            assert_eq!(leaf, expected, "x = {x}, cuts = {cuts:?}");
        }
    }
}

#[test]
fn test_point_on_cut_goes_left() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x5EED_0002);
    let cuts = random_cuts(&mut rng, 50);
    let tree = column_tree(&cuts, &mut rng);

    for (i, &cut) in cuts.iter().enumerate() {
        let leaf = tree.locate_leaf(Fixed::from_int(cut), Fixed::from_int(17));
        assert_eq!(usize::from(leaf), i);
    }
}

#[test]
fn test_walk_covers_every_leaf_once() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x5EED_0003);
    let cuts = random_cuts(&mut rng, 100);
    let tree = column_tree(&cuts, &mut rng);

    let x = rng.gen_range(-4000..4000);
    let mut seen = vec![0_u32; tree.subsector_count()];
    let mut order = Vec::new();
    tree.walk_front_to_back(Fixed::from_int(x), Fixed::ZERO, |leaf| {
        seen[usize::from(leaf)] += 1;
        order.push(leaf);
    });

    assert!(seen.iter().all(|&n| n == 1));
    assert_eq!(order[0], tree.locate_leaf(Fixed::from_int(x), Fixed::ZERO));
}

#[test]
fn test_walk_orders_columns_by_distance() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x5EED_0004);
    let cuts = random_cuts(&mut rng, 40);
    let tree = column_tree(&cuts, &mut rng);
    let x = Fixed::from_int(cuts[cuts.len() / 2] + 1);

    let mut order = Vec::new();
    tree.walk_front_to_back(x, Fixed::ZERO, |leaf| order.push(i32::from(leaf)));

    // Columns on the same side of the viewer must come out nearest first.
    let here = order[0];
    let right: Vec<i32> = order.iter().copied().filter(|&l| l > here).collect();
    let left: Vec<i32> = order.iter().copied().filter(|&l| l < here).collect();
    assert!(right.windows(2).all(|w| w[0] < w[1]));
    assert!(left.windows(2).all(|w| w[0] > w[1]));
}
