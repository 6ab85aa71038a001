//! Randomized wild bond: rejection sampling of whole courses.

use bricklayer_core::{Geometry, LengthClass, PlanError, Unit, UnitRole};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

use crate::RandomBondTuning;

/// Reasons a sampled course was thrown away.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Rejection {
    /// The crop left a course narrower than the wall or a sliver at an edge.
    Crop,
    /// Two half bats sit next to each other.
    AdjacentHalves,
    /// Too many consecutive joints sit almost on top of joints below.
    AlignedChain,
    /// A joint continues a joint of the course below.
    CoincidentJoint,
}

pub(crate) fn generate(
    geometry: &Geometry,
    tuning: &RandomBondTuning,
    seed: u64,
) -> Result<Vec<Vec<Unit>>, PlanError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let half_probability = tuning.half_probability.clamp(0.0, 1.0);
    let count = geometry.course_count();
    let mut rows: Vec<Vec<Unit>> = Vec::with_capacity(count);

    for row in 0..count {
        let below = rows
            .last()
            .map(|course| joint_positions(course, geometry.head_joint))
            .unwrap_or_default();
        let stagger = geometry.quarter * (row % 4) as u32;

        let mut accepted = None;
        for attempt in 1..=tuning.max_attempts {
            let sampled = draw_course(stagger, geometry, half_probability, &mut rng);
            let outcome = crop_course(&sampled, stagger, geometry)
                .ok_or(Rejection::Crop)
                .and_then(|course| check_course(&course, &below, geometry, tuning).map(|()| course));
            match outcome {
                Ok(course) => {
                    debug!(row, attempt, units = course.len(), "accepted wild course");
                    accepted = Some(course);
                    break;
                }
                Err(reason) => trace!(row, attempt, ?reason, "rejected wild course"),
            }
        }

        let course = accepted.ok_or(PlanError::Exhausted {
            row,
            attempts: tuning.max_attempts,
        })?;
        rows.push(course);
    }

    Ok(rows)
}

/// Right edges of every unit but the last, i.e. where the vertical joints start.
#[must_use]
pub fn joint_positions(course: &[Unit], joint: u32) -> Vec<u32> {
    let mut x = 0;
    let mut joints = Vec::with_capacity(course.len().saturating_sub(1));
    for unit in course.iter().take(course.len().saturating_sub(1)) {
        x += unit.length();
        joints.push(x);
        x += joint;
    }
    joints
}

/// Samples half and full units until the overshoot width is reached, then
/// closes the gap with one filler.
fn draw_course<R: Rng>(
    stagger: u32,
    geometry: &Geometry,
    half_probability: f64,
    rng: &mut R,
) -> Vec<Unit> {
    let overshoot = stagger + geometry.wall_width + geometry.full + geometry.head_joint;
    let mut units = Vec::new();
    let mut length = 0;
    let mut after_half = false;

    loop {
        let class = if !after_half && rng.gen_bool(half_probability) {
            LengthClass::Half
        } else {
            LengthClass::Full
        };
        let step = geometry.length_of(class) + geometry.head_joint;
        if length + step > overshoot {
            break;
        }
        units.push(Unit::new(class, UnitRole::STRETCHER, geometry));
        length += step;
        after_half = class == LengthClass::Half;
    }

    let gap = overshoot.saturating_sub(length);
    if gap >= geometry.full {
        units.push(Unit::new(LengthClass::Full, UnitRole::FILLER, geometry));
    } else if gap >= geometry.half {
        units.push(Unit::new(LengthClass::Half, UnitRole::FILLER, geometry));
    }
    units
}

/// Drops the first `stagger` millimetres and trims the course to the wall
/// width, rebasing it at x = 0.
///
/// Returns `None` when the visible course would not span the wall exactly or a
/// cut piece would be shorter than a quarter closer.
fn crop_course(sampled: &[Unit], stagger: u32, geometry: &Geometry) -> Option<Vec<Unit>> {
    let width = geometry.wall_width;
    let mut course = Vec::new();
    let mut origin = None;
    let mut x = 0;

    for unit in sampled {
        let left = x;
        let right = left + unit.length();
        x = right + geometry.head_joint;
        if right <= stagger {
            continue;
        }

        let origin = *origin.get_or_insert(left.max(stagger));
        let visible_left = left.max(origin) - origin;
        if visible_left >= width {
            break;
        }
        let visible_right = (right - origin).min(width);
        let length = visible_right - visible_left;
        if length != unit.length() && length < geometry.quarter {
            return None;
        }
        course.push(Unit::with_length(unit.class(), unit.role(), length));
        if visible_right == width {
            return Some(course);
        }
    }

    None
}

fn check_course(
    course: &[Unit],
    below: &[u32],
    geometry: &Geometry,
    tuning: &RandomBondTuning,
) -> Result<(), Rejection> {
    if course
        .windows(2)
        .any(|pair| pair[0].class() == LengthClass::Half && pair[1].class() == LengthClass::Half)
    {
        return Err(Rejection::AdjacentHalves);
    }

    if below.is_empty() {
        return Ok(());
    }

    let tolerance = tuning.lap_tolerance_for(geometry);
    let mut chain = 0;
    for joint in joint_positions(course, geometry.head_joint) {
        let nearest = nearest_distance(below, joint);
        if nearest == 0 {
            return Err(Rejection::CoincidentJoint);
        }
        if nearest < tolerance {
            chain += 1;
            if chain > tuning.chain_limit {
                return Err(Rejection::AlignedChain);
            }
        } else {
            chain = 0;
        }
    }
    Ok(())
}

/// Distance from `x` to the closest entry of the sorted `joints`.
fn nearest_distance(joints: &[u32], x: u32) -> u32 {
    let index = joints.partition_point(|&joint| joint < x);
    let after = joints.get(index).map(|&joint| joint - x);
    let before = index
        .checked_sub(1)
        .and_then(|i| joints.get(i))
        .map(|&joint| x - joint);
    match (before, after) {
        (Some(a), Some(b)) => a.min(b),
        (Some(a), None) | (None, Some(a)) => a,
        (None, None) => u32::MAX,
    }
}
