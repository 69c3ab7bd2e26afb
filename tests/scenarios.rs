//! Cross-module scenario tests (§8): full build → serialize → decode round
//! trips. Scenarios already exercised at the node level inside
//! `builder::single_threaded`'s unit tests (S2, S4, S6) are not repeated
//! here; this file covers the ones that need the whole pipeline wired
//! together.

use quadgeo::builder::TreeBuilder;
use quadgeo::country::{CountryTable, IsoCode};
use quadgeo::geometry::Rectangle;
use quadgeo::oracle::{RectangleOracle, UniformOracle};
use quadgeo::quantize::Precision;
use quadgeo::runtime::Table;
use quadgeo::serialize::serialize;

fn table() -> CountryTable {
    CountryTable::new(vec![IsoCode::EMPTY, IsoCode::from_str("USA").unwrap()]).unwrap()
}

/// S1: a uniform world collapses to a single leaf and every queried point,
/// anywhere on the lattice, resolves to that one id.
#[test]
fn uniform_world_round_trips_through_the_whole_pipeline() {
    let precision = Precision::from_u8(1);
    let oracle = UniformOracle { id: 7 };
    let tree = TreeBuilder::new()
        .with_precision(precision)
        .build_using_single_threaded_algorithm(&oracle)
        .unwrap();
    assert_eq!(tree.internal_count(), 0);

    let root_rect = Rectangle::root(precision.x_max(), precision.y_max());
    let blob = serialize(&tree, root_rect, precision, &table());
    let decoded = Table::decode(&blob).unwrap();

    for (lat, lon) in [(0.0, 0.0), (89.9, -179.9), (-89.9, 179.9), (45.0, 45.0)] {
        assert_eq!(decoded.lookup(lat, lon).unwrap(), 7);
    }
}

/// S3: a rectangular country is correctly isolated from the ocean
/// surrounding it, end to end through the serialized blob.
#[test]
fn rectangular_country_is_isolated_through_the_whole_pipeline() {
    let precision = Precision::from_u8(0);
    let oracle = RectangleOracle {
        rect_ilon: (100, 200),
        rect_ilat: (50, 80),
        id: 3,
    };
    let tree = TreeBuilder::new()
        .with_precision(precision)
        .with_brute_force_threshold(16)
        .build_using_single_threaded_algorithm(&oracle)
        .unwrap();

    let root_rect = Rectangle::root(precision.x_max(), precision.y_max());
    let blob = serialize(&tree, root_rect, precision, &table());
    let decoded = Table::decode(&blob).unwrap();

    assert_eq!(decoded.lookup_lattice(65, 150).unwrap(), 3);
    assert_eq!(decoded.lookup_lattice(50, 100).unwrap(), 3);
    assert_eq!(decoded.lookup_lattice(80, 200).unwrap(), 3);
    assert_eq!(decoded.lookup_lattice(49, 150).unwrap(), 0);
    assert_eq!(decoded.lookup_lattice(81, 150).unwrap(), 0);
    assert_eq!(decoded.lookup_lattice(65, 99).unwrap(), 0);
    assert_eq!(decoded.lookup_lattice(65, 201).unwrap(), 0);
}

/// S5 (determinism, §8 property): two independent builds of the same
/// oracle under the same config produce byte-identical serialized blobs.
#[test]
fn identical_config_produces_byte_identical_blobs() {
    let precision = Precision::from_u8(0);
    let oracle = RectangleOracle {
        rect_ilon: (10, 90),
        rect_ilat: (10, 90),
        id: 2,
    };

    let build_once = || {
        let tree = TreeBuilder::new()
            .with_precision(precision)
            .with_rng_seed(42)
            .build_using_single_threaded_algorithm(&oracle)
            .unwrap();
        let root_rect = Rectangle::root(precision.x_max(), precision.y_max());
        serialize(&tree, root_rect, precision, &table())
    };

    assert_eq!(build_once(), build_once());
}

/// Single- and multi-threaded builders must agree bit-for-bit on the
/// serialized output for the same oracle and config.
#[test]
fn single_and_multi_threaded_builders_agree_on_serialized_bytes() {
    let precision = Precision::from_u8(0);
    let oracle = RectangleOracle {
        rect_ilon: (10, 90),
        rect_ilat: (10, 90),
        id: 2,
    };
    let root_rect = Rectangle::root(precision.x_max(), precision.y_max());

    let single = TreeBuilder::new()
        .with_precision(precision)
        .build_using_single_threaded_algorithm(&oracle)
        .unwrap();
    let multi = TreeBuilder::new()
        .with_precision(precision)
        .build_using_multi_threaded_algorithm(&oracle)
        .unwrap();

    let single_bytes = serialize(&single, root_rect, precision, &table());
    let multi_bytes = serialize(&multi, root_rect, precision, &table());
    assert_eq!(single_bytes, multi_bytes);
}
