//! Approximate and structural comparison helpers.
//!
//! A text cycle converts angles through degrees, so angle fields are
//! compared with a tolerance; everything else is expected exact.

#![allow(dead_code)]

use cadrw::types::Coord;
use cadrw::Entity;

pub const ANGLE_EPS: f64 = 1e-9;

pub fn assert_close(actual: f64, expected: f64, what: &str) {
    assert!(
        (actual - expected).abs() < ANGLE_EPS,
        "{what}: {actual} vs {expected}"
    );
}

pub fn assert_coord_eq(actual: Coord, expected: Coord, what: &str) {
    assert_eq!(actual, expected, "{what}");
}

/// Kind-for-kind equality of two batches, with a usable diff message.
pub fn assert_same_entities(actual: &[Entity], expected: &[Entity]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "entity counts differ: {:?} vs {:?}",
        actual.iter().map(Entity::type_name).collect::<Vec<_>>(),
        expected.iter().map(Entity::type_name).collect::<Vec<_>>(),
    );
    for (i, (a, b)) in actual.iter().zip(expected).enumerate() {
        assert_eq!(a, b, "entity {i} ({}) differs", b.type_name());
    }
}
