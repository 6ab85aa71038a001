#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the bricklayer wall planner.
//!
//! This crate defines the vocabulary that connects the adapters, the
//! authoritative world, and the pure planning systems. The bond generator,
//! zone partitioner, dependency linker and build-order planner all exchange
//! [`Unit`] grids addressed by [`UnitCoord`], parameterised by an immutable
//! [`Geometry`]. Adapters submit [`Command`] values to the world, which answers
//! with [`Event`] values describing what changed.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Nominal length of a full stretcher in millimetres.
pub const FULL_LENGTH: u32 = 210;
/// Nominal length of a half bat in millimetres.
pub const HALF_LENGTH: u32 = 100;
/// Nominal footprint of a header in millimetres.
pub const HEADER_LENGTH: u32 = 100;
/// Width of the mortar joint between adjacent units in a course.
pub const HEAD_JOINT: u32 = 10;
/// Height of one course including its bed joint.
pub const COURSE_HEIGHT: f32 = 62.5;
/// Nominal wall width in millimetres.
pub const WALL_WIDTH: u32 = 2300;
/// Nominal wall height in millimetres.
pub const WALL_HEIGHT: u32 = 2000;
/// Width of the region the robot reaches without repositioning.
pub const BUILD_WIDTH: u32 = 800;
/// Height of the region the robot reaches without repositioning.
pub const BUILD_HEIGHT: u32 = 1300;

/// Length category of a laid unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LengthClass {
    /// Whole stretcher.
    Full,
    /// Half bat.
    Half,
    /// Header laid end-on.
    Header,
    /// Quarter closer.
    Quarter,
}

/// Orientation and provenance flags attached to a unit.
///
/// The flags are independent of [`LengthClass`]: a quarter closer in a header
/// course is both `header` and `quarter`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitRole {
    /// Unit is laid end-on with its short face visible.
    pub header: bool,
    /// Unit is a quarter closer.
    pub quarter: bool,
    /// Unit was appended to fill the gap at the end of a randomized course.
    pub filler: bool,
}

impl UnitRole {
    /// Long-face stretcher with no special provenance.
    pub const STRETCHER: Self = Self {
        header: false,
        quarter: false,
        filler: false,
    };

    /// End-on header.
    pub const HEADER: Self = Self {
        header: true,
        quarter: false,
        filler: false,
    };

    /// Quarter closer opening a header course.
    pub const QUARTER_CLOSER: Self = Self {
        header: true,
        quarter: true,
        filler: false,
    };

    /// Gap filler closing a randomized course.
    pub const FILLER: Self = Self {
        header: false,
        quarter: false,
        filler: true,
    };
}

/// Location of a unit within the wall expressed as course and position.
///
/// Ordering is row-major: lower courses sort first, then units further left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitCoord {
    row: usize,
    column: usize,
}

impl UnitCoord {
    /// Creates a new unit coordinate.
    #[must_use]
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// Zero-based course index, 0 being the ground course.
    #[must_use]
    pub const fn row(&self) -> usize {
        self.row
    }

    /// Zero-based index of the unit within its course, counted from the left.
    #[must_use]
    pub const fn column(&self) -> usize {
        self.column
    }
}

impl fmt::Display for UnitCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// Identifier of a reach-zone (stride) in which the robot can work.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ZoneId(u32);

impl ZoneId {
    /// Creates a new zone identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Half-open horizontal interval `[left, right)` measured in millimetres.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Span {
    left: u32,
    right: u32,
}

impl Span {
    /// Creates a span starting at `left` that is `length` millimetres long.
    #[must_use]
    pub const fn from_start(left: u32, length: u32) -> Self {
        Self {
            left,
            right: left + length,
        }
    }

    /// Left edge of the span.
    #[must_use]
    pub const fn left(&self) -> u32 {
        self.left
    }

    /// Right edge of the span.
    #[must_use]
    pub const fn right(&self) -> u32 {
        self.right
    }

    /// Reports whether both spans share a non-empty stretch of the axis.
    ///
    /// Spans that merely touch at an edge do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Span) -> bool {
        self.left.max(other.left) < self.right.min(other.right)
    }
}

/// Rule that rewrites zone assignments after the geometric pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ZoneOverride {
    /// Headers inherit the zone of the first stretcher beneath them.
    HeadersFollowStretchers,
}

/// Masonry bond patterns the planner can lay out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BondKind {
    /// Every course made of stretchers, odd courses offset by a half bat.
    Stretcher,
    /// Alternating full and half units, odd courses shifted by a quarter.
    Flemish,
    /// Stretcher courses alternating with header courses.
    English,
    /// Randomized half and full units subject to joint constraints.
    Wild,
}

impl BondKind {
    /// Every supported bond in presentation order.
    pub const ALL: [BondKind; 4] = [Self::Stretcher, Self::Flemish, Self::English, Self::Wild];

    /// Canonical name of the bond.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Stretcher => "stretcher",
            Self::Flemish => "flemish",
            Self::English => "english",
            Self::Wild => "wild",
        }
    }

    /// Horizontal shift applied to every unit of the provided course.
    #[must_use]
    pub const fn row_offset(self, row: usize, geometry: &Geometry) -> u32 {
        match self {
            Self::Flemish if row % 2 == 1 => geometry.quarter,
            _ => 0,
        }
    }

    /// Zone rewrite that runs after the geometric zone pass, if any.
    #[must_use]
    pub const fn zone_override(self) -> Option<ZoneOverride> {
        match self {
            Self::English => Some(ZoneOverride::HeadersFollowStretchers),
            _ => None,
        }
    }

    /// Reports whether the units of a course need two build actions.
    ///
    /// Only the stretcher courses of the English bond qualify: they are laid
    /// as back-to-back leaves, closers included.
    #[must_use]
    pub const fn needs_second_pass(self, row: usize) -> bool {
        matches!(self, Self::English) && row % 2 == 0
    }

    /// Reports whether the bond draws on a random source.
    #[must_use]
    pub const fn is_randomized(self) -> bool {
        matches!(self, Self::Wild)
    }
}

impl fmt::Display for BondKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BondKind {
    type Err = PlanError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "stretcher" | "uniform-stretcher" => Ok(Self::Stretcher),
            "flemish" | "alternating" | "alternating-half-full" => Ok(Self::Flemish),
            "english" | "header-stretcher" => Ok(Self::English),
            "wild" | "random" | "randomized" => Ok(Self::Wild),
            _ => Err(PlanError::UnsupportedBond(value.to_owned())),
        }
    }
}

/// Fixed geometric constants of the wall, its units, and the robot's reach.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Nominal wall width in millimetres.
    pub wall_width: u32,
    /// Nominal wall height in millimetres.
    pub wall_height: u32,
    /// Mortar joint between adjacent units of a course.
    pub head_joint: u32,
    /// Height of a course including its bed joint.
    pub course_height: f32,
    /// Length of a full stretcher.
    pub full: u32,
    /// Length of a half bat.
    pub half: u32,
    /// Footprint length of a header.
    pub header: u32,
    /// Length of a quarter closer.
    pub quarter: u32,
    /// Width of the reach window.
    pub build_width: u32,
    /// Height of the reach window.
    pub build_height: u32,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            wall_width: WALL_WIDTH,
            wall_height: WALL_HEIGHT,
            head_joint: HEAD_JOINT,
            course_height: COURSE_HEIGHT,
            full: FULL_LENGTH,
            half: HALF_LENGTH,
            header: HEADER_LENGTH,
            quarter: FULL_LENGTH / 4,
            build_width: BUILD_WIDTH,
            build_height: BUILD_HEIGHT,
        }
    }
}

impl Geometry {
    /// Nominal length of a unit of the provided class.
    #[must_use]
    pub const fn length_of(&self, class: LengthClass) -> u32 {
        match class {
            LengthClass::Full => self.full,
            LengthClass::Half => self.half,
            LengthClass::Header => self.header,
            LengthClass::Quarter => self.quarter,
        }
    }

    /// Number of whole courses that fit into the wall height.
    #[must_use]
    pub fn course_count(&self) -> usize {
        (self.wall_height as f32 / self.course_height).floor() as usize
    }

    /// Height of the bottom edge of the provided course.
    #[must_use]
    pub fn course_bottom(&self, row: usize) -> f32 {
        row as f32 * self.course_height
    }

    /// Height of the top edge of the provided course.
    #[must_use]
    pub fn course_top(&self, row: usize) -> f32 {
        (row + 1) as f32 * self.course_height
    }

    /// Checks that the constants describe a plannable wall.
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.wall_width == 0 || self.wall_height == 0 {
            return Err(PlanError::InvalidGeometry("wall dimensions must be non-zero"));
        }
        if !self.course_height.is_finite() || self.course_height <= 0.0 {
            return Err(PlanError::InvalidGeometry("course height must be positive"));
        }
        if self.full == 0 || self.half == 0 || self.header == 0 || self.quarter == 0 {
            return Err(PlanError::InvalidGeometry("unit lengths must be non-zero"));
        }
        if self.full + self.head_joint > self.wall_width {
            return Err(PlanError::InvalidGeometry(
                "a full unit and its joint must fit into the wall width",
            ));
        }
        if self.build_width == 0 || self.build_height == 0 {
            return Err(PlanError::InvalidGeometry("reach window must be non-empty"));
        }
        Ok(())
    }
}

/// A single brick-like block laid by the robot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    class: LengthClass,
    length: u32,
    role: UnitRole,
    second_pass_needed: bool,
    zone: Option<ZoneId>,
    built: bool,
    completed_second_pass: bool,
    supports: Vec<UnitCoord>,
}

impl Unit {
    /// Creates an unbuilt unit with the nominal length of its class.
    #[must_use]
    pub const fn new(class: LengthClass, role: UnitRole, geometry: &Geometry) -> Self {
        Self::with_length(class, role, geometry.length_of(class))
    }

    /// Creates an unbuilt unit cut to an explicit length.
    #[must_use]
    pub const fn with_length(class: LengthClass, role: UnitRole, length: u32) -> Self {
        Self {
            class,
            length,
            role,
            second_pass_needed: false,
            zone: None,
            built: false,
            completed_second_pass: false,
            supports: Vec::new(),
        }
    }

    /// Length class the unit was cut from.
    #[must_use]
    pub const fn class(&self) -> LengthClass {
        self.class
    }

    /// Laid length in millimetres.
    #[must_use]
    pub const fn length(&self) -> u32 {
        self.length
    }

    /// Orientation and provenance flags.
    #[must_use]
    pub const fn role(&self) -> UnitRole {
        self.role
    }

    /// Whether the unit shows its short face.
    #[must_use]
    pub const fn is_header(&self) -> bool {
        self.role.header
    }

    /// Whether the unit is a quarter closer.
    #[must_use]
    pub const fn is_quarter(&self) -> bool {
        self.role.quarter
    }

    /// Whether the unit requires two build actions.
    #[must_use]
    pub const fn second_pass_needed(&self) -> bool {
        self.second_pass_needed
    }

    /// Reach-zone assigned by the partitioner, if any.
    #[must_use]
    pub const fn zone(&self) -> Option<ZoneId> {
        self.zone
    }

    /// Whether the first build action happened.
    #[must_use]
    pub const fn is_built(&self) -> bool {
        self.built
    }

    /// Whether the second build action happened.
    #[must_use]
    pub const fn completed_second_pass(&self) -> bool {
        self.completed_second_pass
    }

    /// Units in the course below that carry this unit.
    #[must_use]
    pub fn supports(&self) -> &[UnitCoord] {
        &self.supports
    }

    /// Reports whether every required build action happened.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.built && (!self.second_pass_needed || self.completed_second_pass)
    }

    /// Flags the unit as needing a second build action.
    pub fn require_second_pass(&mut self) {
        self.second_pass_needed = true;
    }

    /// Records the reach-zone the unit belongs to.
    pub fn assign_zone(&mut self, zone: ZoneId) {
        self.zone = Some(zone);
    }

    /// Records the units beneath that carry this one.
    pub fn link_supports(&mut self, supports: Vec<UnitCoord>) {
        self.supports = supports;
    }

    /// Performs the first build action.
    pub fn lay(&mut self) {
        self.built = true;
    }

    /// Performs the second build action.
    pub fn finish_second_pass(&mut self) {
        self.completed_second_pass = true;
    }
}

/// Left edges of the units in a course, separated by one joint each.
#[must_use]
pub fn course_positions(units: &[Unit], joint: u32) -> Vec<u32> {
    let mut x = 0;
    units
        .iter()
        .map(|unit| {
            let left = x;
            x += unit.length() + joint;
            left
        })
        .collect()
}

/// Strategy used to order the build of a planned wall.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStrategy {
    /// Greedy order minimising robot repositioning between placements.
    #[default]
    MinimumMovement,
    /// Order grouped by ascending zone, bottom course first within a zone.
    ZoneSorted,
}

impl fmt::Display for OrderStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MinimumMovement => "min-movement",
            Self::ZoneSorted => "zone-sorted",
        })
    }
}

impl FromStr for OrderStrategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "min-movement" | "minimum-movement" => Ok(Self::MinimumMovement),
            "zone" | "zone-sorted" => Ok(Self::ZoneSorted),
            other => Err(format!("unknown order strategy '{other}'")),
        }
    }
}

/// Build action recorded when the cursor lays a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildPass {
    /// First action; completes single-pass units.
    First,
    /// Second action of a back-to-back stretcher.
    Second,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Plans a fresh wall for the provided bond, replacing the current one.
    SelectBond {
        /// Bond pattern to lay out.
        bond: BondKind,
        /// Seed for randomized bonds; ignored by deterministic ones.
        seed: u64,
    },
    /// Performs the next build action of the current plan.
    AdvanceBuild,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A new wall was planned and replaced the previous one.
    WallPlanned {
        /// Bond of the new wall.
        bond: BondKind,
        /// Number of units in the wall.
        units: usize,
        /// Number of reach windows the plan visits.
        strides: u32,
    },
    /// Planning failed; the previous wall, if any, is still active.
    PlanningFailed {
        /// Bond that was requested.
        bond: BondKind,
        /// Reason the wall could not be planned.
        error: PlanError,
    },
    /// The cursor performed a build action on a unit.
    UnitLaid {
        /// Unit that received the action.
        unit: UnitCoord,
        /// Which action was performed.
        pass: BuildPass,
    },
    /// Every unit of the wall is complete.
    WallCompleted {
        /// Bond of the completed wall.
        bond: BondKind,
        /// Number of units laid.
        units: usize,
    },
}

/// Reasons a wall cannot be planned.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// The bond name does not match any supported pattern.
    #[error("unsupported bond type '{0}'")]
    UnsupportedBond(String),
    /// The geometric constants cannot describe a wall.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(&'static str),
    /// The randomized generator could not produce a valid course.
    #[error("no valid layout for course {row} after {attempts} attempts")]
    Exhausted {
        /// Course that could not be generated.
        row: usize,
        /// Number of samples drawn before giving up.
        attempts: u32,
    },
    /// The planner found no buildable unit while units remained.
    #[error("no buildable unit left after placing {placed}, {remaining} remain")]
    Deadlock {
        /// Units already ordered.
        placed: usize,
        /// Units that could not be ordered.
        remaining: usize,
    },
}
