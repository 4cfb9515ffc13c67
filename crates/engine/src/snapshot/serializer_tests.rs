// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tw_core::{Direction, Position};

fn entity(unit: Option<u64>, x: f64) -> WorldEntity {
    WorldEntity {
        unit_number: unit,
        name: "stone-furnace".into(),
        position: Position::new(x, 2.0),
        direction: Direction::South,
        config: serde_json::json!({"recipe": "iron-plate"}),
    }
}

#[test]
fn unit_number_is_the_key() {
    let record = DefaultSerializer.serialize(&entity(Some(17), 1.0)).unwrap();
    assert_eq!(record.key, "17");
    assert_eq!(record.direction, Direction::South);
    assert_eq!(record.config["recipe"], "iron-plate");
}

#[test]
fn entities_without_unit_number_key_by_name_and_position() {
    let record = DefaultSerializer.serialize(&entity(None, 1.5)).unwrap();
    assert_eq!(record.key, "stone-furnace@1.5,2");
}

#[test]
fn non_finite_position_is_an_error() {
    let err = DefaultSerializer.serialize(&entity(Some(1), f64::INFINITY)).unwrap_err();
    assert_eq!(err.entity, "stone-furnace");
}
