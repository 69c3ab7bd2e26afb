//! Regular, single-threaded prove-or-split recursion (§4.3 steps 1-6).
//!
//! Grounded on the teacher's `binary_tree/tree_builder.rs` dispatch shape;
//! the recursion itself is this spec's own algorithm since the teacher has
//! no equivalent prove-or-split concept.

use crate::geometry::Rectangle;
use crate::node::Node;
use crate::oracle::Oracle;

use super::{
    brute_force_uniform, forced_brute_force, root_rectangle, sample_and_check_unanimous,
    BuildConfig, BuildError,
};

pub struct SingleThreadedBuilder;

pub(super) fn build(
    oracle: &dyn Oracle,
    config: &BuildConfig,
    cancel: Option<triggered::Listener>,
) -> Result<Node, BuildError> {
    let rect = root_rectangle(config);
    build_node(oracle, rect, config, 0, cancel.as_ref())
}

fn build_node(
    oracle: &dyn Oracle,
    rect: Rectangle,
    config: &BuildConfig,
    depth: u32,
    cancel: Option<&triggered::Listener>,
) -> Result<Node, BuildError> {
    if let Some(listener) = cancel {
        if listener.is_triggered() {
            return Err(BuildError::Cancelled);
        }
    }

    // Step 1: singleton.
    if rect.is_point() {
        let id = oracle.country_at(rect.y0, rect.x0)?;
        return Ok(Node::Leaf(id));
    }

    // Step 6: depth guard, checked before sampling so a pathological
    // worst-case border never recurses past `max_depth`.
    if depth >= config.max_depth {
        log::warn!(
            "depth limit {} reached at rect ({},{})-({},{}); forcing brute force",
            config.max_depth,
            rect.x0,
            rect.y0,
            rect.x1,
            rect.y1
        );
        return forced_brute_force(oracle, rect);
    }

    // Step 2: sample.
    let unanimous = sample_and_check_unanimous(oracle, &rect, config)?;

    if let Some(id) = unanimous {
        let point_count = rect.point_count();
        // Step 3: prove by brute force when small enough.
        if point_count <= config.brute_force_threshold && brute_force_uniform(oracle, &rect, id)? {
            return Ok(Node::Leaf(id));
        }
        // Step 4: conservative split (samples agree, but either too big to
        // prove or brute force found a disagreement the samples missed).
    }
    // Step 2 disagreement or step 4: fall through to split.

    // Step 5: split and recurse.
    let mut children = Vec::new();
    for (_, child_rect) in rect.children() {
        children.push(build_node(oracle, child_rect, config, depth + 1, cancel)?);
    }
    Ok(Node::Internal(children).collapse_if_uniform())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{RectangleOracle, SimpleOracle, SinglePointOracle, UniformOracle};
    use crate::quantize::Precision;

    fn config(precision: u8) -> BuildConfig {
        BuildConfig {
            precision: Precision::from_u8(precision),
            ..BuildConfig::default()
        }
    }

    #[test]
    fn s1_uniform_oracle_collapses_to_one_leaf() {
        let oracle = UniformOracle { id: 7 };
        let node = build(&oracle, &config(0), None).unwrap();
        assert_eq!(node, Node::Leaf(7));
    }

    #[test]
    fn s2_north_south_split_resolves_correctly() {
        let oracle = SimpleOracle { y_max: 180 };
        let node = build(&oracle, &config(0), None).unwrap();
        let rect = Rectangle::root(360, 180);
        let bytes = crate::serialize::serialize(
            &node,
            rect,
            Precision::from_u8(0),
            &crate::country::CountryTable::new(vec![
                crate::country::IsoCode::EMPTY,
                crate::country::IsoCode::from_str("AAA").unwrap(),
                crate::country::IsoCode::from_str("BBB").unwrap(),
            ])
            .unwrap(),
        );
        let table = crate::runtime::Table::decode(&bytes).unwrap();
        assert_eq!(table.lookup(45.0, 0.0).unwrap(), 1);
        assert_eq!(table.lookup(-45.0, 0.0).unwrap(), 2);
        assert_eq!(table.lookup_lattice(90, 0).unwrap(), 2);
    }

    #[test]
    fn s3_rectangle_oracle_every_point_correct() {
        let oracle = RectangleOracle {
            rect_ilon: (100, 200),
            rect_ilat: (50, 80),
            id: 5,
        };
        let node = build(&oracle, &config(0), None).unwrap();
        for ilat in 0..=180u32 {
            for ilon in (0..=360u32).step_by(7) {
                let expected = oracle.country_at(ilat, ilon).unwrap();
                let actual = lookup_in_tree(&node, Rectangle::root(360, 180), ilat, ilon);
                assert_eq!(actual, expected, "mismatch at ({ilat},{ilon})");
            }
        }
    }

    #[test]
    fn s4_single_point_island_isolated() {
        let oracle = SinglePointOracle { ilat: 100, ilon: 200, id: 9 };
        let node = build(&oracle, &config(0), None).unwrap();
        let rect = Rectangle::root(360, 180);
        assert_eq!(lookup_in_tree(&node, rect, 100, 200), 9);
        for (dlat, dlon) in [(-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0), (1, 1)] {
            let ilat = (100i64 + dlat) as u32;
            let ilon = (200i64 + dlon) as u32;
            assert_eq!(lookup_in_tree(&node, rect, ilat, ilon), 0);
        }
        assert!(has_point_leaf(&node, rect));
    }

    #[test]
    fn s6_depth_safety_with_low_max_depth_still_correct() {
        let oracle = SinglePointOracle { ilat: 100, ilon: 200, id: 9 };
        let mut cfg = config(0);
        cfg.max_depth = 3;
        let node = build(&oracle, &cfg, None).unwrap();
        let rect = Rectangle::root(360, 180);
        assert_eq!(lookup_in_tree(&node, rect, 100, 200), 9);
        assert_eq!(lookup_in_tree(&node, rect, 99, 200), 0);
    }

    #[test]
    fn cancellation_aborts_build() {
        let (trigger, listener) = triggered::trigger();
        trigger.trigger();
        let oracle = UniformOracle { id: 1 };
        let result = build_node(&oracle, Rectangle::root(360, 180), &config(0), 0, Some(&listener));
        assert!(matches!(result, Err(BuildError::Cancelled)));
    }

    fn lookup_in_tree(node: &Node, rect: Rectangle, ilat: u32, ilon: u32) -> u16 {
        match node {
            Node::Leaf(id) => *id,
            Node::Internal(children) => {
                let (wanted_idx, wanted_rect) = rect.child_containing(ilat, ilon);
                let child = rect
                    .children()
                    .into_iter()
                    .zip(children.iter())
                    .find(|((idx, _), _)| *idx == wanted_idx)
                    .map(|(_, child)| child)
                    .expect("child must exist");
                lookup_in_tree(child, wanted_rect, ilat, ilon)
            }
        }
    }

    fn has_point_leaf(node: &Node, rect: Rectangle) -> bool {
        match node {
            Node::Leaf(_) => rect.is_point(),
            Node::Internal(children) => rect
                .children()
                .into_iter()
                .zip(children.iter())
                .any(|((_, child_rect), child)| has_point_leaf(child, child_rect)),
        }
    }
}
