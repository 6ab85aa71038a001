use bricklayer_core::{course_positions, BondKind, Geometry, Span, Unit};
use bricklayer_system_bond::BondGenerator;
use bricklayer_system_zoning::ZonePartitioner;

fn partitioned(bond: BondKind) -> (Vec<Vec<Unit>>, Vec<Vec<u32>>) {
    let geometry = Geometry::default();
    let mut rows = BondGenerator::default()
        .generate(bond, &geometry, 0x2b_d1ce)
        .expect("default wall");
    let positions: Vec<Vec<u32>> = rows
        .iter()
        .map(|course| course_positions(course, geometry.head_joint))
        .collect();
    let _ = ZonePartitioner.partition(bond, &geometry, &mut rows, &positions);
    (rows, positions)
}

#[test]
fn every_unit_receives_a_zone() {
    for bond in BondKind::ALL {
        let (rows, _) = partitioned(bond);
        for (row, course) in rows.iter().enumerate() {
            for (column, unit) in course.iter().enumerate() {
                assert!(
                    unit.zone().is_some(),
                    "{bond} unit ({row}, {column}) left without a zone",
                );
            }
        }
    }
}

#[test]
fn ground_course_zones_follow_reach_windows() {
    let (rows, positions) = partitioned(BondKind::Stretcher);
    for (unit, left) in rows[0].iter().zip(&positions[0]) {
        let expected = left / 800;
        assert_eq!(unit.zone().map(|zone| zone.get()), Some(expected));
    }
    let upper = &rows[25];
    assert_eq!(upper[0].zone().map(|zone| zone.get()), Some(3));
}

#[test]
fn english_headers_share_the_zone_of_the_stretcher_beneath() {
    let (rows, positions) = partitioned(BondKind::English);
    for row in (1..rows.len()).step_by(2) {
        for (unit, &left) in rows[row].iter().zip(&positions[row]) {
            assert!(unit.is_header());
            let footprint = Span::from_start(left, unit.length());
            let beneath = rows[row - 1]
                .iter()
                .zip(&positions[row - 1])
                .find(|&(below, &below_left)| {
                    Span::from_start(below_left, below.length()).overlaps(&footprint)
                })
                .map(|(below, _)| below.zone());
            assert_eq!(
                Some(unit.zone()),
                beneath,
                "header at course {row}, x = {left} left its stretcher's zone",
            );
        }
    }
}

#[test]
fn zone_grid_is_returned_for_consumers() {
    let geometry = Geometry::default();
    let mut rows = BondGenerator::default()
        .generate(BondKind::Flemish, &geometry, 1)
        .expect("default wall");
    let positions: Vec<Vec<u32>> = rows
        .iter()
        .map(|course| course_positions(course, geometry.head_joint))
        .collect();
    let grid = ZonePartitioner.partition(BondKind::Flemish, &geometry, &mut rows, &positions);
    assert_eq!(grid.len(), 6);
    assert!(rows
        .iter()
        .flatten()
        .filter_map(Unit::zone)
        .all(|zone| grid.zone(zone).is_some()));
}
