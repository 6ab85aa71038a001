#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Zone partitioner that tiles the wall into the robot's reach windows.
//!
//! Zones are enumerated band by band from the ground course upwards and left
//! to right within a band. Every unit is labelled with the first zone of its
//! band that its footprint reaches into; bonds with an interlocking override
//! then rewrite the labels of their headers.

use std::ops::Range;

use bricklayer_core::{BondKind, Geometry, Span, Unit, ZoneId, ZoneOverride};
use tracing::debug;

/// Rectangular reach window labelled with a zone identifier.
#[derive(Clone, Debug, PartialEq)]
pub struct Zone {
    id: ZoneId,
    left: u32,
    right: u32,
    bottom: f32,
    rows: Range<usize>,
}

impl Zone {
    /// Identifier assigned in enumeration order.
    #[must_use]
    pub const fn id(&self) -> ZoneId {
        self.id
    }

    /// Left edge of the zone in millimetres.
    #[must_use]
    pub const fn left(&self) -> u32 {
        self.left
    }

    /// Right edge of the zone in millimetres.
    #[must_use]
    pub const fn right(&self) -> u32 {
        self.right
    }

    /// Height of the zone's bottom edge in millimetres.
    #[must_use]
    pub const fn bottom(&self) -> f32 {
        self.bottom
    }

    /// Courses belonging to the zone's height band.
    #[must_use]
    pub fn rows(&self) -> Range<usize> {
        self.rows.clone()
    }

    fn reaches(&self, footprint: Span) -> bool {
        let starts_inside = self.left <= footprint.left() && footprint.left() < self.right;
        let ends_inside = self.left < footprint.right() && footprint.right() <= self.right;
        starts_inside || ends_inside
    }
}

/// Every zone of a wall in enumeration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ZoneGrid {
    zones: Vec<Zone>,
}

impl ZoneGrid {
    /// Tiles a wall of `rows` courses with reach windows.
    #[must_use]
    pub fn tile(geometry: &Geometry, rows: usize) -> Self {
        let mut zones = Vec::new();
        let mut next_id = 0;
        let mut top = 0;
        while top < geometry.wall_height {
            let first_row = (top as f32 / geometry.course_height).floor() as usize;
            let end_row = (((top + geometry.build_height) as f32 / geometry.course_height).floor()
                as usize)
                .min(rows);
            let mut left = 0;
            while left < geometry.wall_width {
                zones.push(Zone {
                    id: ZoneId::new(next_id),
                    left,
                    right: left + geometry.build_width,
                    bottom: top as f32,
                    rows: first_row.min(end_row)..end_row,
                });
                next_id += 1;
                left += geometry.build_width;
            }
            top += geometry.build_height;
        }
        Self { zones }
    }

    /// Zones in enumeration order.
    #[must_use]
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Number of zones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Reports whether the wall holds no zone at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Looks up a zone by identifier.
    #[must_use]
    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.get(id.get() as usize)
    }

    fn locate(&self, row: usize, footprint: Span) -> Option<ZoneId> {
        let mut last = None;
        for zone in self.zones.iter().filter(|zone| zone.rows.contains(&row)) {
            if zone.reaches(footprint) {
                return Some(zone.id);
            }
            last = Some(zone.id);
        }
        last
    }
}

/// Pure system assigning reach-zones to the units of a wall.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZonePartitioner;

impl ZonePartitioner {
    /// Labels every unit with a zone and returns the zone tiling.
    ///
    /// `positions` holds the left edge of every unit before the bond's row
    /// offset is applied.
    pub fn partition(
        &self,
        bond: BondKind,
        geometry: &Geometry,
        rows: &mut [Vec<Unit>],
        positions: &[Vec<u32>],
    ) -> ZoneGrid {
        let grid = ZoneGrid::tile(geometry, rows.len());

        for (row, (course, lefts)) in rows.iter_mut().zip(positions).enumerate() {
            let offset = bond.row_offset(row, geometry);
            for (unit, &left) in course.iter_mut().zip(lefts) {
                let footprint = Span::from_start(left + offset, unit.length());
                if let Some(zone) = grid.locate(row, footprint) {
                    unit.assign_zone(zone);
                }
            }
        }

        if let Some(rule) = bond.zone_override() {
            apply_override(rule, bond, geometry, rows, positions);
        }

        debug!(bond = bond.name(), zones = grid.len(), "partitioned wall");
        grid
    }
}

fn apply_override(
    rule: ZoneOverride,
    bond: BondKind,
    geometry: &Geometry,
    rows: &mut [Vec<Unit>],
    positions: &[Vec<u32>],
) {
    match rule {
        ZoneOverride::HeadersFollowStretchers => {
            for row in 1..rows.len() {
                let (below, above) = rows.split_at_mut(row);
                let below = &below[row - 1];
                let course = &mut above[0];
                let offset = bond.row_offset(row, geometry);
                let below_offset = bond.row_offset(row - 1, geometry);

                for (unit, &left) in course.iter_mut().zip(&positions[row]) {
                    if !unit.is_header() {
                        continue;
                    }
                    let footprint = Span::from_start(left + offset, unit.length());
                    let beneath = below
                        .iter()
                        .zip(&positions[row - 1])
                        .find(|&(candidate, &below_left)| {
                            !candidate.is_header()
                                && Span::from_start(below_left + below_offset, candidate.length())
                                    .overlaps(&footprint)
                        })
                        .and_then(|(candidate, _)| candidate.zone());
                    if let Some(zone) = beneath {
                        unit.assign_zone(zone);
                    }
                }
            }
        }
    }
}
