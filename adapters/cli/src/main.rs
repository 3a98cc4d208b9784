#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives a headless courier delivery run.
//!
//! The binary synthesizes or decodes a terrain map, loads it into the
//! authoritative world, and then lets the ticker and dispatch systems stand
//! in for the interactive shell: every event the world emits is narrated on
//! stdout, rejections abort the run with a non-zero exit, and a completed
//! hand-over ends it.

mod scenario_transfer;

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use courier_core::{CellCoord, Command, Event, TerrainMap};
use courier_system_dispatch::Dispatch;
use courier_system_ticker::{Config as TickerConfig, Ticker};
use courier_world::{apply, query, Config as WorldConfig, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use scenario_transfer::{ScenarioSnapshot, BLOCKED_SURFACE, ROAD_SURFACE};

const SAMPLE_ATTEMPT_LIMIT: u32 = 10_000;

/// Command-line arguments accepted by the courier binary.
#[derive(Debug, Parser)]
#[command(
    name = "courier",
    about = "Runs a headless courier delivery simulation."
)]
struct Args {
    /// Number of terrain columns when synthesizing a map.
    #[arg(long, default_value_t = 10)]
    columns: u32,
    /// Number of terrain rows when synthesizing a map.
    #[arg(long, default_value_t = 10)]
    rows: u32,
    /// Fraction of synthesized cells turned into non-road obstacles.
    #[arg(long, default_value_t = 0.0)]
    obstacle_ratio: f64,
    /// Scenario transfer string to load instead of synthesizing a map.
    #[arg(long)]
    scenario: Option<String>,
    /// Print the scenario transfer string for the map and exit.
    #[arg(long)]
    print_scenario: bool,
    /// Seed shared by map synthesis and endpoint sampling.
    #[arg(long)]
    seed: Option<u64>,
    /// Simulated milliseconds between movement ticks.
    #[arg(long, default_value_t = 10)]
    tick_ms: u64,
    /// Upper bound on movement ticks before the run is abandoned.
    #[arg(long, default_value_t = 100_000)]
    max_ticks: u64,
}

/// Entry point for the courier command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);

    let map = match args.scenario.as_deref() {
        Some(encoded) => ScenarioSnapshot::decode(encoded)
            .context("could not decode the scenario string")?
            .into_map()
            .context("could not materialize the scenario")?,
        None => synthesize_map(args.columns, args.rows, args.obstacle_ratio, seed)?,
    };

    if args.print_scenario {
        println!("{}", ScenarioSnapshot::capture(&map).encode());
        return Ok(());
    }

    run_delivery(map, seed, args.tick_ms, args.max_ticks)
}

/// Builds a terrain map with obstacles sprinkled in from the seed.
fn synthesize_map(columns: u32, rows: u32, obstacle_ratio: f64, seed: u64) -> Result<TerrainMap> {
    if !(0.0..=1.0).contains(&obstacle_ratio) {
        bail!("obstacle ratio must lie in 0.0..=1.0, got {obstacle_ratio}");
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let cell_count = u64::from(columns) * u64::from(rows);
    let mut cells = Vec::new();
    for _ in 0..cell_count {
        let blocked = rng.gen_bool(obstacle_ratio);
        cells.push(if blocked { BLOCKED_SURFACE } else { ROAD_SURFACE });
    }

    TerrainMap::from_cells(columns, rows, cells).context("could not synthesize the terrain map")
}

/// Drives one delivery from staging to hand-over, narrating every event.
fn run_delivery(map: TerrainMap, seed: u64, tick_ms: u64, max_ticks: u64) -> Result<()> {
    if tick_ms == 0 {
        bail!("tick interval must be positive");
    }

    let mut world = World::with_config(WorldConfig::new(seed, SAMPLE_ATTEMPT_LIMIT));
    println!("{}", query::welcome_banner(&world));

    let tick_interval = Duration::from_millis(tick_ms);
    let mut ticker = Ticker::new(TickerConfig::new(tick_interval));
    let dispatch = Dispatch::new();

    let mut events = Vec::new();
    apply(&mut world, Command::LoadMap { map }, &mut events);
    apply(&mut world, Command::Randomize, &mut events);

    let mut ticks: u64 = 0;
    loop {
        let mut commands = Vec::new();
        dispatch.handle(&events, &mut commands);

        let mut delivered = false;
        for event in events.drain(..) {
            println!("{}", describe(&event));
            match event {
                Event::StagingRejected { reason } => {
                    bail!("could not stage a delivery: {reason}")
                }
                Event::StartRejected { reason } => bail!("start was rejected: {reason}"),
                Event::PackageDelivered { .. } => delivered = true,
                _ => {}
            }
        }
        if delivered {
            println!("Parcel delivered after {ticks} ticks.");
            return Ok(());
        }

        ticker.handle(tick_interval, &mut commands);
        ticks += commands
            .iter()
            .filter(|command| matches!(command, Command::Tick))
            .count() as u64;
        if ticks > max_ticks {
            bail!("courier failed to deliver within {max_ticks} ticks");
        }

        for command in commands {
            apply(&mut world, command, &mut events);
        }
    }
}

/// Renders one event as a line of narration.
fn describe(event: &Event) -> String {
    match event {
        Event::MapLoaded { columns, rows } => {
            format!("map loaded: {columns}x{rows} cells")
        }
        Event::DeliveryStaged {
            courier,
            facing,
            source,
            destination,
        } => format!(
            "delivery staged: courier at {} facing {facing:?}, parcel at {}, drop-off at {}",
            describe_cell(*courier),
            describe_cell(*source),
            describe_cell(*destination),
        ),
        Event::StagingRejected { reason } => format!("staging rejected: {reason}"),
        Event::PackagePickedUp { at } => {
            format!("parcel collected at {}", describe_cell(*at))
        }
        Event::RoutePlanned { from, to, length } => format!(
            "route planned: {} -> {} across {length} cells",
            describe_cell(*from),
            describe_cell(*to),
        ),
        Event::StartRejected { reason } => format!("start rejected: {reason}"),
        Event::CourierAdvanced { from, to, facing } => format!(
            "courier moved {} -> {} facing {facing:?}",
            describe_cell(*from),
            describe_cell(*to),
        ),
        Event::CourierArrived { at } => {
            format!("courier arrived at {}", describe_cell(*at))
        }
        Event::PackageDelivered { at } => {
            format!("parcel handed over at {}", describe_cell(*at))
        }
    }
}

fn describe_cell(cell: CellCoord) -> String {
    format!("({}, {})", cell.column(), cell.row())
}
