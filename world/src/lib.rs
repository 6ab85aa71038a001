#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative wall state and build playback for the bricklaying robot.

use bricklayer_core::{
    course_positions, BondKind, BuildPass, Command, Event, Geometry, OrderStrategy, PlanError,
    Span, Unit, UnitCoord,
};
use bricklayer_system_bond::{BondGenerator, RandomBondTuning};
use bricklayer_system_linker::{footprint, DependencyLinker};
use bricklayer_system_sequencing::{BuildOrderPlanner, BuildPlan, PlannedStep};
use bricklayer_system_zoning::{ZoneGrid, ZonePartitioner};
use tracing::{info, warn};

/// Configuration shared by every wall the world plans.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorldConfig {
    /// Wall, unit and reach-window dimensions.
    pub geometry: Geometry,
    /// Sampling parameters of the randomized bond.
    pub tuning: RandomBondTuning,
    /// Strategy ordering the build.
    pub strategy: OrderStrategy,
}

/// Fully planned wall together with its build cursor.
#[derive(Clone, Debug)]
pub struct Wall {
    bond: BondKind,
    geometry: Geometry,
    rows: Vec<Vec<Unit>>,
    positions: Vec<Vec<u32>>,
    zones: ZoneGrid,
    plan: BuildPlan,
    ranks: Vec<Vec<usize>>,
    cursor: usize,
}

impl Wall {
    /// Lays out, zones, links and orders a wall for the provided bond.
    ///
    /// Either every stage succeeds or no wall is produced.
    pub fn plan(bond: BondKind, config: &WorldConfig, seed: u64) -> Result<Self, PlanError> {
        let geometry = config.geometry.clone();
        let mut rows =
            BondGenerator::new(config.tuning.clone()).generate(bond, &geometry, seed)?;
        let positions: Vec<Vec<u32>> = rows
            .iter()
            .map(|course| course_positions(course, geometry.head_joint))
            .collect();
        let zones = ZonePartitioner.partition(bond, &geometry, &mut rows, &positions);
        DependencyLinker.link(bond, &geometry, &mut rows, &positions);
        let plan =
            BuildOrderPlanner::new(config.strategy).plan(bond, &geometry, &rows, &positions)?;

        let mut ranks: Vec<Vec<usize>> = rows.iter().map(|course| vec![0; course.len()]).collect();
        for (rank, step) in plan.steps().iter().enumerate() {
            ranks[step.unit().row()][step.unit().column()] = rank;
        }

        info!(
            bond = bond.name(),
            seed,
            courses = rows.len(),
            units = plan.len(),
            strides = plan.stride_count(),
            "wall planned"
        );

        Ok(Self {
            bond,
            geometry,
            rows,
            positions,
            zones,
            plan,
            ranks,
            cursor: 0,
        })
    }

    /// Plans a wall for a bond given by name, such as `"english"` or `"wild"`.
    pub fn from_name(name: &str, config: &WorldConfig, seed: u64) -> Result<Self, PlanError> {
        Self::plan(name.parse()?, config, seed)
    }

    /// Bond the wall was laid out with.
    #[must_use]
    pub const fn bond(&self) -> BondKind {
        self.bond
    }

    /// Geometry the wall was planned with.
    #[must_use]
    pub const fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Courses of the wall, ground course first.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Unit>] {
        &self.rows
    }

    /// Left edges of every unit before the bond's row offset.
    #[must_use]
    pub fn positions(&self) -> &[Vec<u32>] {
        &self.positions
    }

    /// Number of units in the wall.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plan.len()
    }

    /// Reports whether the wall holds no unit at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plan.is_empty()
    }

    /// Retrieves the unit at the provided coordinate.
    #[must_use]
    pub fn unit(&self, coord: UnitCoord) -> Option<&Unit> {
        self.rows.get(coord.row())?.get(coord.column())
    }

    /// Horizontal extent of a unit with the bond's row offset applied.
    #[must_use]
    pub fn extent(&self, coord: UnitCoord) -> Option<Span> {
        let unit = self.unit(coord)?;
        let left = self.positions[coord.row()][coord.column()];
        Some(footprint(self.bond, &self.geometry, coord.row(), left, unit))
    }

    /// Reach windows tiling the wall.
    #[must_use]
    pub const fn zones(&self) -> &ZoneGrid {
        &self.zones
    }

    /// Build plan fixed at construction.
    #[must_use]
    pub const fn build_plan(&self) -> &BuildPlan {
        &self.plan
    }

    /// Plan step that lays the unit.
    #[must_use]
    pub fn step_of(&self, coord: UnitCoord) -> Option<&PlannedStep> {
        let rank = *self.ranks.get(coord.row())?.get(coord.column())?;
        self.plan.steps().get(rank)
    }

    /// Stride label of the plan step that lays the unit.
    #[must_use]
    pub fn stride_of(&self, coord: UnitCoord) -> Option<u32> {
        self.step_of(coord).map(PlannedStep::stride)
    }

    /// Number of completed build steps and the total number of steps.
    #[must_use]
    pub fn progress(&self) -> (usize, usize) {
        (self.cursor, self.plan.len())
    }

    /// Reports whether every unit of the plan is complete.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.cursor >= self.plan.len()
    }

    /// Performs the next build action, returning whether anything changed.
    pub fn advance(&mut self) -> bool {
        self.step().is_some()
    }

    fn step(&mut self) -> Option<(UnitCoord, BuildPass)> {
        let coord = *self.plan.order().get(self.cursor)?;
        let unit = &mut self.rows[coord.row()][coord.column()];

        if unit.second_pass_needed() && !unit.is_built() {
            unit.lay();
            return Some((coord, BuildPass::First));
        }

        let pass = if unit.second_pass_needed() {
            unit.finish_second_pass();
            BuildPass::Second
        } else {
            unit.lay();
            BuildPass::First
        };
        self.cursor += 1;
        Some((coord, pass))
    }
}

/// Represents the authoritative state of a bricklaying session.
#[derive(Debug, Default)]
pub struct World {
    config: WorldConfig,
    wall: Option<Wall>,
}

impl World {
    /// Creates a session without a wall using the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session without a wall using the provided configuration.
    #[must_use]
    pub fn with_config(config: WorldConfig) -> Self {
        Self { config, wall: None }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SelectBond { bond, seed } => match Wall::plan(bond, &world.config, seed) {
            Ok(wall) => {
                out_events.push(Event::WallPlanned {
                    bond,
                    units: wall.len(),
                    strides: wall.build_plan().stride_count(),
                });
                world.wall = Some(wall);
            }
            Err(error) => {
                warn!(bond = bond.name(), %error, "planning failed, keeping previous wall");
                out_events.push(Event::PlanningFailed { bond, error });
            }
        },
        Command::AdvanceBuild => {
            let Some(wall) = world.wall.as_mut() else {
                return;
            };
            let Some((unit, pass)) = wall.step() else {
                return;
            };
            out_events.push(Event::UnitLaid { unit, pass });
            if wall.is_complete() {
                out_events.push(Event::WallCompleted {
                    bond: wall.bond(),
                    units: wall.len(),
                });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use bricklayer_core::{Geometry, LengthClass, Span, UnitCoord, UnitRole, ZoneId};

    use super::{Wall, World, WorldConfig};

    /// Provides read-only access to the session configuration.
    #[must_use]
    pub fn config(world: &World) -> &WorldConfig {
        &world.config
    }

    /// Provides read-only access to the geometry new walls are planned with.
    #[must_use]
    pub fn geometry(world: &World) -> &Geometry {
        &world.config.geometry
    }

    /// Provides read-only access to the current wall, if one was planned.
    #[must_use]
    pub fn wall(world: &World) -> Option<&Wall> {
        world.wall.as_ref()
    }

    /// Build progress of the current wall as `(completed, total)` steps.
    #[must_use]
    pub fn progress(world: &World) -> Option<(usize, usize)> {
        world.wall.as_ref().map(Wall::progress)
    }

    /// Units of the current wall in build order.
    #[must_use]
    pub fn build_order(world: &World) -> &[UnitCoord] {
        world
            .wall
            .as_ref()
            .map(|wall| wall.build_plan().order())
            .unwrap_or_default()
    }

    /// Captures a read-only view of every unit, ground course first.
    #[must_use]
    pub fn unit_views(world: &World) -> Vec<UnitView> {
        let Some(wall) = world.wall.as_ref() else {
            return Vec::new();
        };
        let geometry = wall.geometry();

        let mut views = Vec::with_capacity(wall.len());
        for (row, course) in wall.rows().iter().enumerate() {
            for (column, unit) in course.iter().enumerate() {
                let coord = UnitCoord::new(row, column);
                let Some(extent) = wall.extent(coord) else {
                    continue;
                };
                views.push(UnitView {
                    coord,
                    class: unit.class(),
                    role: unit.role(),
                    left: wall.positions()[row][column],
                    extent,
                    bottom: geometry.course_bottom(row),
                    top: geometry.course_top(row),
                    zone: unit.zone(),
                    stride: wall.stride_of(coord).unwrap_or_default(),
                    second_pass_needed: unit.second_pass_needed(),
                    built: unit.is_built(),
                    complete: unit.is_complete(),
                });
            }
        }
        views
    }

    /// Immutable representation of a single unit used by renderers.
    #[derive(Clone, Debug, PartialEq)]
    pub struct UnitView {
        /// Position of the unit in the wall's arena.
        pub coord: UnitCoord,
        /// Nominal length class.
        pub class: LengthClass,
        /// Orientation and closer flags.
        pub role: UnitRole,
        /// Left edge before the bond's row offset.
        pub left: u32,
        /// Horizontal extent after the bond's row offset.
        pub extent: Span,
        /// Height of the unit's bottom face.
        pub bottom: f32,
        /// Height of the unit's top face.
        pub top: f32,
        /// Reach-zone label.
        pub zone: Option<ZoneId>,
        /// Stride label of the step laying the unit.
        pub stride: u32,
        /// Whether the unit needs a second build action.
        pub second_pass_needed: bool,
        /// Whether the first build action happened.
        pub built: bool,
        /// Whether every required build action happened.
        pub complete: bool,
    }
}
