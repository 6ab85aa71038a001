#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plans a wall and plays back its build order.

mod elevation;

use anyhow::{bail, Context, Result};
use bricklayer_core::{BondKind, Command, Event, Geometry, OrderStrategy};
use bricklayer_system_bond::RandomBondTuning;
use bricklayer_system_sequencing::{PlannedStep, ReachAnchor};
use bricklayer_world::{apply, query, World, WorldConfig};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Directive applied when `RUST_LOG` is unset or unparsable.
const DEFAULT_LOG_DIRECTIVE: &str = "warn";

/// Builds the log filter from a `RUST_LOG` value, falling back to warnings.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_DIRECTIVE))
}

/// Plans a bricklaying robot's wall and steps through its build order.
#[derive(Parser, Debug)]
#[command(name = "bricklayer")]
#[command(about = "Lay out a wall in a masonry bond and play back its build order")]
struct Args {
    /// Bond pattern: stretcher, flemish, english or wild.
    #[arg(long, short = 'b', default_value = "stretcher")]
    bond: BondKind,

    /// Seed for the wild bond.
    #[arg(long, short = 's', default_value_t = 0)]
    seed: u64,

    /// Number of build actions to perform; builds the whole wall when omitted.
    #[arg(long, short = 'n')]
    steps: Option<usize>,

    /// Build order strategy: min-movement or zone-sorted.
    #[arg(long, default_value = "min-movement")]
    order: OrderStrategy,

    /// Wall width in millimetres.
    #[arg(long)]
    wall_width: Option<u32>,

    /// Wall height in millimetres.
    #[arg(long)]
    wall_height: Option<u32>,

    /// Samples drawn per wild course before giving up.
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Print every build action.
    #[arg(long)]
    list: bool,

    /// Print the reach windows tiling the wall.
    #[arg(long)]
    zones: bool,

    /// Print a text elevation of the wall after playback.
    #[arg(long)]
    elevation: bool,
}

impl Args {
    fn config(&self) -> WorldConfig {
        let defaults = Geometry::default();
        let geometry = Geometry {
            wall_width: self.wall_width.unwrap_or(defaults.wall_width),
            wall_height: self.wall_height.unwrap_or(defaults.wall_height),
            ..defaults
        };
        let mut tuning = RandomBondTuning::default();
        if let Some(max_attempts) = self.max_attempts {
            tuning.max_attempts = max_attempts;
        }
        WorldConfig {
            geometry,
            tuning,
            strategy: self.order,
        }
    }
}

/// Entry point for the bricklayer command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref()))
        .init();

    let args = Args::parse();
    let mut world = World::with_config(args.config());
    let mut events = Vec::new();

    apply(
        &mut world,
        Command::SelectBond {
            bond: args.bond,
            seed: args.seed,
        },
        &mut events,
    );
    for event in events.drain(..) {
        match event {
            Event::WallPlanned {
                bond,
                units,
                strides,
            } => {
                let strategy = query::config(&world).strategy;
                print!("planned {bond} wall");
                if bond.is_randomized() {
                    print!(" (seed {})", args.seed);
                }
                println!(": {units} units in {strides} strides, {strategy} order");
            }
            Event::PlanningFailed { bond, error } => {
                return Err(error).with_context(|| format!("planning a {bond} wall"));
            }
            other => bail!("unexpected event while planning: {other:?}"),
        }
    }

    if args.zones {
        let wall = query::wall(&world).context("no wall after planning")?;
        for zone in wall.zones().zones() {
            let rows = zone.rows();
            println!(
                "zone {:>2}  x {:>4}..{:<4}  from {:>6.1} mm  courses {:>2}..{:<2}",
                zone.id().get(),
                zone.left(),
                zone.right(),
                zone.bottom(),
                rows.start,
                rows.end
            );
        }
    }

    let (_, total) = query::progress(&world).context("no wall after planning")?;
    let limit = args.steps.unwrap_or(usize::MAX);
    let mut actions = 0;
    while actions < limit {
        apply(&mut world, Command::AdvanceBuild, &mut events);
        if events.is_empty() {
            break;
        }
        actions += 1;
        for event in events.drain(..) {
            match event {
                Event::UnitLaid { unit, pass } if args.list => {
                    let step = query::wall(&world).and_then(|wall| wall.step_of(unit));
                    let stride = step.map(PlannedStep::stride).unwrap_or_default();
                    let anchor = step.map_or(ReachAnchor::ORIGIN, PlannedStep::anchor);
                    println!(
                        "{actions:>5}  course {:>2} unit {:>2}  stride {stride:>2}  window ({:>4.0}, {:>6.1})  {pass:?}",
                        unit.row(),
                        unit.column(),
                        anchor.x(),
                        anchor.y()
                    );
                }
                Event::WallCompleted { bond, units } => {
                    println!("completed {bond} wall of {units} units");
                }
                _ => {}
            }
        }
    }

    let (done, _) = query::progress(&world).context("wall disappeared during playback")?;
    let cost = query::wall(&world)
        .map(|wall| wall.build_plan().total_cost())
        .unwrap_or_default();
    println!("{actions} actions, {done}/{total} units complete, {cost:.0} mm of window travel");

    if args.elevation {
        let width = query::geometry(&world).wall_width;
        for line in elevation::render(&query::unit_views(&world), width) {
            println!("{line}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn rust_log_level_is_honoured() {
        assert_eq!(
            log_filter(Some("debug")).max_level_hint(),
            Some(LevelFilter::DEBUG)
        );
        assert_eq!(
            log_filter(Some("bricklayer_world=trace")).max_level_hint(),
            Some(LevelFilter::TRACE)
        );
    }

    #[test]
    fn missing_or_invalid_rust_log_falls_back_to_warnings() {
        for directives in [None, Some(""), Some("bricklayer_world=loud")] {
            assert_eq!(
                log_filter(directives).max_level_hint(),
                Some(LevelFilter::WARN),
                "{directives:?}"
            );
        }
    }
}
