#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Build-order planner deciding in which sequence the robot lays the units.
//!
//! Both strategies only release a unit once every unit it rests on has been
//! ordered. [`OrderStrategy::MinimumMovement`] then greedily picks the
//! released unit that needs the least repositioning of the reach window;
//! [`OrderStrategy::ZoneSorted`] picks by zone label, then course, then column.

mod reach;

use std::{
    cmp::{Ordering, Reverse},
    collections::BinaryHeap,
};

use bricklayer_core::{BondKind, Geometry, OrderStrategy, PlanError, Span, Unit, UnitCoord};
use tracing::{debug, trace};

pub use reach::{Footprint, Reach, ReachAnchor};

/// One entry of a build plan.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlannedStep {
    unit: UnitCoord,
    stride: u32,
    cost: f32,
    anchor: ReachAnchor,
}

impl PlannedStep {
    /// Unit laid by this step.
    #[must_use]
    pub const fn unit(&self) -> UnitCoord {
        self.unit
    }

    /// Label of the reach window the unit is laid from.
    #[must_use]
    pub const fn stride(&self) -> u32 {
        self.stride
    }

    /// L1 distance the window moved to reach the unit, in millimetres.
    #[must_use]
    pub const fn cost(&self) -> f32 {
        self.cost
    }

    /// Bottom-left corner of the reach window while laying the unit.
    #[must_use]
    pub const fn anchor(&self) -> ReachAnchor {
        self.anchor
    }
}

/// Total order over every unit of a wall.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BuildPlan {
    order: Vec<UnitCoord>,
    steps: Vec<PlannedStep>,
}

impl BuildPlan {
    fn push(&mut self, step: PlannedStep) {
        self.order.push(step.unit);
        self.steps.push(step);
    }

    /// Units in build order.
    #[must_use]
    pub fn order(&self) -> &[UnitCoord] {
        &self.order
    }

    /// Build steps with their stride labels and costs.
    #[must_use]
    pub fn steps(&self) -> &[PlannedStep] {
        &self.steps
    }

    /// Number of planned units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Reports whether the plan is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of distinct stride labels used by the plan.
    #[must_use]
    pub fn stride_count(&self) -> u32 {
        let mut strides: Vec<u32> = self.steps.iter().map(PlannedStep::stride).collect();
        strides.sort_unstable();
        strides.dedup();
        strides.len() as u32
    }

    /// Sum of all window movements in millimetres.
    #[must_use]
    pub fn total_cost(&self) -> f32 {
        self.steps.iter().map(PlannedStep::cost).sum()
    }
}

/// Pure system ordering the units of a linked, zoned wall.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuildOrderPlanner {
    strategy: OrderStrategy,
}

impl BuildOrderPlanner {
    /// Creates a planner using the provided strategy.
    #[must_use]
    pub const fn new(strategy: OrderStrategy) -> Self {
        Self { strategy }
    }

    /// Orders every unit so that each follows all of its supports.
    pub fn plan(
        &self,
        bond: BondKind,
        geometry: &Geometry,
        rows: &[Vec<Unit>],
        positions: &[Vec<u32>],
    ) -> Result<BuildPlan, PlanError> {
        let mut graph = SupportGraph::new(bond, geometry, rows, positions);
        let reach = Reach::new(geometry);
        let plan = match self.strategy {
            OrderStrategy::MinimumMovement => minimum_movement(&mut graph, &reach)?,
            OrderStrategy::ZoneSorted => zone_sorted(&mut graph, &reach)?,
        };
        debug!(
            bond = bond.name(),
            strategy = %self.strategy,
            units = plan.len(),
            strides = plan.stride_count(),
            cost = plan.total_cost(),
            "planned build order"
        );
        Ok(plan)
    }
}

/// Flattened view of the wall with release counters for every unit.
struct SupportGraph {
    coords: Vec<UnitCoord>,
    footprints: Vec<Footprint>,
    zones: Vec<u32>,
    diagonals: Vec<f32>,
    waiting: Vec<usize>,
    dependents: Vec<Vec<usize>>,
}

impl SupportGraph {
    fn new(bond: BondKind, geometry: &Geometry, rows: &[Vec<Unit>], positions: &[Vec<u32>]) -> Self {
        let mut base = Vec::with_capacity(rows.len());
        let mut total = 0;
        for course in rows {
            base.push(total);
            total += course.len();
        }

        let mut graph = Self {
            coords: Vec::with_capacity(total),
            footprints: Vec::with_capacity(total),
            zones: Vec::with_capacity(total),
            diagonals: Vec::with_capacity(total),
            waiting: Vec::with_capacity(total),
            dependents: vec![Vec::new(); total],
        };

        for (row, (course, lefts)) in rows.iter().zip(positions).enumerate() {
            let offset = bond.row_offset(row, geometry);
            for (column, (unit, &left)) in course.iter().zip(lefts).enumerate() {
                let index = base[row] + column;
                let span = Span::from_start(left + offset, unit.length());
                graph.coords.push(UnitCoord::new(row, column));
                graph
                    .footprints
                    .push(Footprint::of(span, geometry.course_bottom(row), geometry.course_top(row)));
                graph
                    .zones
                    .push(unit.zone().map_or(u32::MAX, |zone| zone.get()));
                graph
                    .diagonals
                    .push(row as f32 + span.left() as f32 / geometry.full as f32);
                graph.waiting.push(unit.supports().len());
                for support in unit.supports() {
                    graph.dependents[base[support.row()] + support.column()].push(index);
                }
            }
        }
        graph
    }

    fn len(&self) -> usize {
        self.coords.len()
    }

    fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.waiting
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count == 0)
            .map(|(index, _)| index)
    }

    /// Marks `index` as ordered and returns the units it released.
    fn release(&mut self, index: usize) -> Vec<usize> {
        let mut released = Vec::new();
        for &dependent in &self.dependents[index] {
            self.waiting[dependent] -= 1;
            if self.waiting[dependent] == 0 {
                released.push(dependent);
            }
        }
        released
    }

    fn zone_key(&self, index: usize) -> Reverse<ZoneKey> {
        Reverse(ZoneKey {
            zone: self.zones[index],
            unit: self.coords[index],
            index,
        })
    }

    fn deadlock(&self, placed: usize) -> PlanError {
        PlanError::Deadlock {
            placed,
            remaining: self.len() - placed,
        }
    }
}

fn minimum_movement(graph: &mut SupportGraph, reach: &Reach) -> Result<BuildPlan, PlanError> {
    let mut plan = BuildPlan::default();
    let mut eligible: Vec<usize> = graph.roots().collect();
    let mut anchor = ReachAnchor::ORIGIN;
    let mut stride = 0;

    while plan.len() < graph.len() {
        let best = eligible
            .iter()
            .enumerate()
            .map(|(slot, &index)| {
                let (cost, target) = reach.placement(anchor, &graph.footprints[index]);
                (slot, index, cost, target)
            })
            .min_by(|a, b| {
                a.2.total_cmp(&b.2)
                    .then_with(|| graph.diagonals[a.1].total_cmp(&graph.diagonals[b.1]))
                    .then_with(|| graph.coords[a.1].cmp(&graph.coords[b.1]))
            });
        let Some((slot, index, cost, target)) = best else {
            return Err(graph.deadlock(plan.len()));
        };

        let _ = eligible.swap_remove(slot);
        if cost > 0.0 {
            stride += 1;
            anchor = target;
            trace!(stride, x = anchor.x(), y = anchor.y(), "moved reach window");
        }
        plan.push(PlannedStep {
            unit: graph.coords[index],
            stride,
            cost,
            anchor,
        });
        eligible.extend(graph.release(index));
    }

    Ok(plan)
}

/// Heap entry ordered by zone label, then course, then column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ZoneKey {
    zone: u32,
    unit: UnitCoord,
    index: usize,
}

impl Ord for ZoneKey {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.zone, self.unit, self.index).cmp(&(other.zone, other.unit, other.index))
    }
}

impl PartialOrd for ZoneKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn zone_sorted(graph: &mut SupportGraph, reach: &Reach) -> Result<BuildPlan, PlanError> {
    let mut plan = BuildPlan::default();
    let mut heap: BinaryHeap<Reverse<ZoneKey>> =
        graph.roots().map(|index| graph.zone_key(index)).collect();
    let mut anchor = ReachAnchor::ORIGIN;

    while plan.len() < graph.len() {
        let Some(Reverse(next)) = heap.pop() else {
            return Err(graph.deadlock(plan.len()));
        };

        let (cost, target) = reach.placement(anchor, &graph.footprints[next.index]);
        anchor = target;
        plan.push(PlannedStep {
            unit: next.unit,
            stride: next.zone,
            cost,
            anchor,
        });
        for released in graph.release(next.index) {
            heap.push(graph.zone_key(released));
        }
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bricklayer_core::{LengthClass, UnitRole, ZoneId};

    fn unit(class: LengthClass, zone: u32, supports: Vec<UnitCoord>) -> Unit {
        let mut unit = Unit::new(class, UnitRole::STRETCHER, &Geometry::default());
        unit.assign_zone(ZoneId::new(zone));
        unit.link_supports(supports);
        unit
    }

    #[test]
    fn cyclic_supports_deadlock() {
        let geometry = Geometry::default();
        let rows = vec![vec![
            unit(LengthClass::Full, 0, vec![UnitCoord::new(0, 1)]),
            unit(LengthClass::Full, 0, vec![UnitCoord::new(0, 0)]),
        ]];
        let positions = vec![vec![0, 220]];
        for strategy in [OrderStrategy::MinimumMovement, OrderStrategy::ZoneSorted] {
            assert_eq!(
                BuildOrderPlanner::new(strategy).plan(
                    BondKind::Stretcher,
                    &geometry,
                    &rows,
                    &positions
                ),
                Err(PlanError::Deadlock {
                    placed: 0,
                    remaining: 2
                })
            );
        }
    }

    #[test]
    fn zone_sorted_defers_unit_until_supports_are_laid() {
        let geometry = Geometry::default();
        let rows = vec![
            vec![
                unit(LengthClass::Full, 0, Vec::new()),
                unit(LengthClass::Full, 1, Vec::new()),
            ],
            vec![unit(
                LengthClass::Full,
                0,
                vec![UnitCoord::new(0, 0), UnitCoord::new(0, 1)],
            )],
        ];
        let positions = vec![vec![0, 220], vec![110]];
        let plan = BuildOrderPlanner::new(OrderStrategy::ZoneSorted)
            .plan(BondKind::Stretcher, &geometry, &rows, &positions)
            .expect("acyclic wall");
        assert_eq!(
            plan.order(),
            &[
                UnitCoord::new(0, 0),
                UnitCoord::new(0, 1),
                UnitCoord::new(1, 0)
            ]
        );
        assert_eq!(plan.steps()[1].stride(), 1);
    }

    #[test]
    fn ties_prefer_lower_diagonal() {
        let geometry = Geometry::default();
        let rows = vec![
            vec![
                unit(LengthClass::Full, 0, Vec::new()),
                unit(LengthClass::Full, 0, Vec::new()),
            ],
            vec![unit(LengthClass::Full, 0, vec![UnitCoord::new(0, 0)])],
        ];
        let positions = vec![vec![0, 440], vec![0]];
        let plan = BuildOrderPlanner::default()
            .plan(BondKind::Stretcher, &geometry, &rows, &positions)
            .expect("acyclic wall");
        // (1, 0) has diagonal 1.0, (0, 1) has 440 / 210 > 2.
        assert_eq!(
            plan.order(),
            &[
                UnitCoord::new(0, 0),
                UnitCoord::new(1, 0),
                UnitCoord::new(0, 1)
            ]
        );
        assert_eq!(plan.total_cost(), 0.0);
        assert_eq!(plan.stride_count(), 1);
    }

    #[test]
    fn cheaper_unit_beats_lower_diagonal() {
        let geometry = Geometry::default();
        let rows = vec![
            vec![
                unit(LengthClass::Full, 0, Vec::new()),
                unit(LengthClass::Full, 1, Vec::new()),
            ],
            vec![unit(LengthClass::Full, 0, vec![UnitCoord::new(0, 0)])],
            vec![unit(LengthClass::Full, 0, vec![UnitCoord::new(1, 0)])],
        ];
        let positions = vec![vec![0, 820], vec![0], vec![440]];
        let plan = BuildOrderPlanner::default()
            .plan(BondKind::Stretcher, &geometry, &rows, &positions)
            .expect("acyclic wall");
        // (0, 1) has diagonal 820 / 210 < 4 but lies outside the first
        // window; (2, 0) has diagonal 2 + 440 / 210 > 4 and costs nothing.
        assert_eq!(
            plan.order(),
            &[
                UnitCoord::new(0, 0),
                UnitCoord::new(1, 0),
                UnitCoord::new(2, 0),
                UnitCoord::new(0, 1)
            ]
        );
        let last = plan.steps()[3];
        assert_eq!(last.cost(), 400.0);
        assert_eq!(last.stride(), 1);
        assert_eq!(last.anchor(), ReachAnchor::new(400.0, 0.0));
        assert_eq!(plan.total_cost(), 400.0);
        assert_eq!(plan.stride_count(), 2);
    }
}
