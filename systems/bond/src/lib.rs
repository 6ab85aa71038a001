#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Bond generator that lays out the courses of a wall for each masonry bond.
//!
//! Deterministic bonds fill every course greedily from the left with a
//! bond-specific sequence of length classes. The wild bond samples courses at
//! random and rejects them until they satisfy its joint constraints.

mod wild;

use bricklayer_core::{BondKind, Geometry, LengthClass, PlanError, Unit, UnitRole};
use tracing::debug;

pub use wild::joint_positions;

/// Tuning knobs of the randomized wild bond.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomBondTuning {
    /// Probability of drawing a half bat where one is allowed.
    pub half_probability: f64,
    /// Number of course samples drawn before generation gives up.
    pub max_attempts: u32,
    /// Longest accepted run of consecutive joints lapping a joint below by less
    /// than `lap_tolerance`.
    pub chain_limit: usize,
    /// Minimum horizontal distance between a joint and the joints beneath it
    /// for the joint to count as properly lapped. `None` uses the geometry's
    /// quarter length.
    pub lap_tolerance: Option<u32>,
}

impl RandomBondTuning {
    /// Lap tolerance in millimetres for walls of the provided geometry.
    #[must_use]
    pub fn lap_tolerance_for(&self, geometry: &Geometry) -> u32 {
        self.lap_tolerance.unwrap_or(geometry.quarter)
    }
}

impl Default for RandomBondTuning {
    fn default() -> Self {
        Self {
            half_probability: 0.4,
            max_attempts: 1_000,
            chain_limit: 3,
            lap_tolerance: None,
        }
    }
}

/// Pure system producing the course grid of a wall.
#[derive(Clone, Debug, Default)]
pub struct BondGenerator {
    tuning: RandomBondTuning,
}

impl BondGenerator {
    /// Creates a generator using the provided wild bond tuning.
    #[must_use]
    pub fn new(tuning: RandomBondTuning) -> Self {
        Self { tuning }
    }

    /// Lays out every course of the wall, ground course first.
    ///
    /// `seed` drives the wild bond only; deterministic bonds ignore it.
    pub fn generate(
        &self,
        bond: BondKind,
        geometry: &Geometry,
        seed: u64,
    ) -> Result<Vec<Vec<Unit>>, PlanError> {
        geometry.validate()?;

        let mut rows = match bond {
            BondKind::Stretcher => (0..geometry.course_count())
                .map(|row| stretcher_course(row, geometry))
                .collect(),
            BondKind::Flemish => (0..geometry.course_count())
                .map(|row| flemish_course(row, geometry))
                .collect(),
            BondKind::English => (0..geometry.course_count())
                .map(|row| english_course(row, geometry))
                .collect(),
            BondKind::Wild => wild::generate(geometry, &self.tuning, seed)?,
        };

        for (row, course) in rows.iter_mut().enumerate() {
            if bond.needs_second_pass(row) {
                course.iter_mut().for_each(Unit::require_second_pass);
            }
        }

        debug!(
            bond = bond.name(),
            courses = rows.len(),
            units = rows.iter().map(Vec::len).sum::<usize>(),
            "generated bond layout"
        );
        Ok(rows)
    }
}

/// Accumulates units left to right while tracking the occupied width.
struct CourseBuilder<'a> {
    geometry: &'a Geometry,
    units: Vec<Unit>,
    length: u32,
}

impl<'a> CourseBuilder<'a> {
    fn new(geometry: &'a Geometry) -> Self {
        Self {
            geometry,
            units: Vec::new(),
            length: 0,
        }
    }

    /// Appends a unit followed by its joint if both fit into the wall width.
    fn push_if_fits(&mut self, class: LengthClass, role: UnitRole) -> bool {
        let unit = self.geometry.length_of(class) + self.geometry.head_joint;
        if self.length + unit > self.geometry.wall_width {
            return false;
        }
        self.units.push(Unit::new(class, role, self.geometry));
        self.length += unit;
        true
    }

    /// Appends a trailing closer, which needs no joint after it.
    fn close_with(&mut self, class: LengthClass, role: UnitRole) {
        let unit = self.geometry.length_of(class);
        if self.length + unit <= self.geometry.wall_width {
            self.units.push(Unit::new(class, role, self.geometry));
            self.length += unit;
        }
    }

    fn finish(self) -> Vec<Unit> {
        self.units
    }
}

fn stretcher_course(row: usize, geometry: &Geometry) -> Vec<Unit> {
    let mut course = CourseBuilder::new(geometry);
    if row % 2 == 1 {
        let _ = course.push_if_fits(LengthClass::Half, UnitRole::STRETCHER);
    }
    while course.push_if_fits(LengthClass::Full, UnitRole::STRETCHER) {}
    course.close_with(LengthClass::Half, UnitRole::STRETCHER);
    course.finish()
}

fn flemish_course(row: usize, geometry: &Geometry) -> Vec<Unit> {
    let mut course = CourseBuilder::new(geometry);
    if row % 2 == 1 {
        let _ = course.push_if_fits(LengthClass::Half, UnitRole::STRETCHER);
    }
    let mut next_full = true;
    loop {
        let class = if next_full {
            LengthClass::Full
        } else {
            LengthClass::Half
        };
        if !course.push_if_fits(class, UnitRole::STRETCHER) {
            break;
        }
        next_full = !next_full;
    }
    course.finish()
}

fn english_course(row: usize, geometry: &Geometry) -> Vec<Unit> {
    let mut course = CourseBuilder::new(geometry);
    if row % 2 == 0 {
        while course.push_if_fits(LengthClass::Full, UnitRole::STRETCHER) {}
        course.close_with(LengthClass::Half, UnitRole::STRETCHER);
        return course.finish();
    }

    let _ = course.push_if_fits(LengthClass::Quarter, UnitRole::QUARTER_CLOSER);
    let _ = course.push_if_fits(LengthClass::Half, UnitRole::HEADER);
    while course.push_if_fits(LengthClass::Header, UnitRole::HEADER) {}
    course.finish()
}
