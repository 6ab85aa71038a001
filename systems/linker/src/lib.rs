#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Dependency linker recording which units of the course below carry a unit.

use bricklayer_core::{BondKind, Geometry, Span, Unit, UnitCoord};

/// Horizontal footprint of a unit after the bond's row offset is applied.
#[must_use]
pub fn footprint(bond: BondKind, geometry: &Geometry, row: usize, left: u32, unit: &Unit) -> Span {
    Span::from_start(left + bond.row_offset(row, geometry), unit.length())
}

/// Pure system linking every unit to the units it rests on.
#[derive(Clone, Copy, Debug, Default)]
pub struct DependencyLinker;

impl DependencyLinker {
    /// Stores the supports of every unit above the ground course.
    ///
    /// A unit rests on every unit of the course directly below whose
    /// offset-adjusted footprint shares a non-empty stretch with its own.
    pub fn link(
        &self,
        bond: BondKind,
        geometry: &Geometry,
        rows: &mut [Vec<Unit>],
        positions: &[Vec<u32>],
    ) {
        for row in 1..rows.len() {
            let (below, above) = rows.split_at_mut(row);
            let below = &below[row - 1];
            let below_spans: Vec<Span> = below
                .iter()
                .zip(&positions[row - 1])
                .map(|(unit, &left)| footprint(bond, geometry, row - 1, left, unit))
                .collect();

            for (unit, &left) in above[0].iter_mut().zip(&positions[row]) {
                let span = footprint(bond, geometry, row, left, unit);
                let supports = below_spans
                    .iter()
                    .enumerate()
                    .filter(|(_, below_span)| below_span.overlaps(&span))
                    .map(|(column, _)| UnitCoord::new(row - 1, column))
                    .collect();
                unit.link_supports(supports);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bricklayer_core::{LengthClass, UnitRole};

    fn course(classes: &[LengthClass], geometry: &Geometry) -> Vec<Unit> {
        classes
            .iter()
            .map(|&class| Unit::new(class, UnitRole::STRETCHER, geometry))
            .collect()
    }

    #[test]
    fn half_offset_unit_rests_on_two_stretchers() {
        let geometry = Geometry::default();
        let mut rows = vec![
            course(&[LengthClass::Full, LengthClass::Full], &geometry),
            course(&[LengthClass::Half, LengthClass::Full], &geometry),
        ];
        let positions = vec![vec![0, 220], vec![0, 110]];
        DependencyLinker.link(BondKind::Stretcher, &geometry, &mut rows, &positions);

        assert!(rows[0][0].supports().is_empty());
        assert_eq!(rows[1][0].supports(), &[UnitCoord::new(0, 0)]);
        assert_eq!(
            rows[1][1].supports(),
            &[UnitCoord::new(0, 0), UnitCoord::new(0, 1)]
        );
    }

    #[test]
    fn flemish_offset_shifts_the_upper_course() {
        let geometry = Geometry::default();
        let mut rows = vec![
            course(&[LengthClass::Full, LengthClass::Half], &geometry),
            course(&[LengthClass::Half, LengthClass::Full], &geometry),
        ];
        let positions = vec![vec![0, 220], vec![0, 110]];
        DependencyLinker.link(BondKind::Flemish, &geometry, &mut rows, &positions);

        // Shifted by a quarter, the leading half spans [52, 152).
        assert_eq!(rows[1][0].supports(), &[UnitCoord::new(0, 0)]);
        // The full spans [162, 372) and reaches the half at [220, 320).
        assert_eq!(
            rows[1][1].supports(),
            &[UnitCoord::new(0, 0), UnitCoord::new(0, 1)]
        );
    }
}
