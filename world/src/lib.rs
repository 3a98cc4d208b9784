#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative simulation state for the courier dispatch desk.
//!
//! The [`World`] owns the terrain map, the courier aggregate, and the staged
//! delivery endpoints. Adapters and systems mutate it exclusively through
//! [`apply`], which executes one [`Command`] and appends the resulting
//! [`Event`] values; read access goes through the [`query`] module. There is
//! no hidden process-wide state: callers own the world value and every
//! outcome, including rejections, is reported as an event rather than a
//! panic, so a tick driver never unwinds.

mod routing;
mod sampling;

use courier_core::{
    CellCoord, Command, DeliveryPhase, Direction, Event, StagingError, StartError, TerrainMap,
    WELCOME_BANNER,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const ENDPOINT_SAMPLING_SEED: u64 = 0x6c1f_52b8_a03d_94e7;
const DEFAULT_SAMPLE_ATTEMPT_LIMIT: u32 = 10_000;

/// Facing assigned to a freshly staged courier when no target direction can
/// be derived.
const DEFAULT_FACING: Direction = Direction::East;

/// Configuration parameters required to construct a world.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
    sample_attempt_limit: u32,
}

impl Config {
    /// Creates a new configuration using the provided seed and endpoint
    /// sampling attempt budget.
    #[must_use]
    pub const fn new(rng_seed: u64, sample_attempt_limit: u32) -> Self {
        Self {
            rng_seed,
            sample_attempt_limit,
        }
    }
}

/// Represents the authoritative courier simulation state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    terrain: Option<TerrainMap>,
    courier: Option<Courier>,
    source: Option<CellCoord>,
    destination: Option<CellCoord>,
    phase: DeliveryPhase,
    rng: ChaCha8Rng,
    sample_attempt_limit: u32,
}

impl World {
    /// Creates a new world ready for map loading, using the default seed and
    /// sampling budget.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::new(
            ENDPOINT_SAMPLING_SEED,
            DEFAULT_SAMPLE_ATTEMPT_LIMIT,
        ))
    }

    /// Creates a new world using the supplied configuration.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            banner: WELCOME_BANNER,
            terrain: None,
            courier: None,
            source: None,
            destination: None,
            phase: DeliveryPhase::NotReady,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            sample_attempt_limit: config.sample_attempt_limit,
        }
    }

    fn install_map(&mut self, map: TerrainMap, out_events: &mut Vec<Event>) {
        out_events.push(Event::MapLoaded {
            columns: map.columns(),
            rows: map.rows(),
        });
        self.terrain = Some(map);
        self.courier = None;
        self.source = None;
        self.destination = None;
        self.phase = DeliveryPhase::NotReady;
    }

    fn stage_delivery(&mut self, out_events: &mut Vec<Event>) {
        let Some(terrain) = self.terrain.as_ref() else {
            out_events.push(Event::StagingRejected {
                reason: StagingError::MapMissing,
            });
            return;
        };

        let source = match sampling::sample_road_cell(terrain, &mut self.rng, self.sample_attempt_limit)
        {
            Ok(cell) => cell,
            Err(reason) => {
                out_events.push(Event::StagingRejected { reason });
                return;
            }
        };
        let destination =
            match sampling::sample_road_cell(terrain, &mut self.rng, self.sample_attempt_limit) {
                Ok(cell) => cell,
                Err(reason) => {
                    out_events.push(Event::StagingRejected { reason });
                    return;
                }
            };

        let courier_cell = staging_cell(terrain, source);
        let facing = Direction::toward(courier_cell, source).unwrap_or(DEFAULT_FACING);
        self.courier = Some(Courier::staged(courier_cell, facing));
        self.source = Some(source);
        self.destination = Some(destination);
        self.phase = DeliveryPhase::ReadyToPickup;
        out_events.push(Event::DeliveryStaged {
            courier: courier_cell,
            facing,
            source,
            destination,
        });
    }

    fn start_leg(&mut self, out_events: &mut Vec<Event>) {
        match self.phase {
            DeliveryPhase::ReadyToPickup => self.collect_parcel(out_events),
            DeliveryPhase::EnRouteToDestination => self.attempt_handover(out_events),
            // Valid command on a consistent state; nothing to do.
            _ => {}
        }
    }

    fn collect_parcel(&mut self, out_events: &mut Vec<Event>) {
        let (Some(terrain), Some(courier), Some(source), Some(destination)) = (
            self.terrain.as_ref(),
            self.courier.as_mut(),
            self.source,
            self.destination,
        ) else {
            return;
        };

        if !courier.facing.is_facing(courier.cell, source) {
            out_events.push(Event::StartRejected {
                reason: StartError::NotFacingSource,
            });
            return;
        }

        let route = routing::shortest_route(terrain, courier.cell, destination);
        if route.is_empty() {
            out_events.push(Event::StartRejected {
                reason: StartError::RouteUnavailable,
            });
            return;
        }

        let length = route.len();
        courier.carrying = true;
        courier.assign_route(route);
        out_events.push(Event::PackagePickedUp { at: courier.cell });
        out_events.push(Event::RoutePlanned {
            from: courier.cell,
            to: destination,
            length,
        });
        self.phase = DeliveryPhase::EnRouteToDestination;
    }

    fn attempt_handover(&mut self, out_events: &mut Vec<Event>) {
        let (Some(courier), Some(destination)) = (self.courier.as_ref(), self.destination) else {
            return;
        };

        // Still moving; arrival is only acted on once the route is consumed.
        if courier.next_step().is_some() {
            return;
        }

        if !courier.facing.is_facing(courier.cell, destination) {
            out_events.push(Event::StartRejected {
                reason: StartError::NotFacingDestination,
            });
            return;
        }

        let at = courier.cell;
        self.phase = DeliveryPhase::Delivered;
        out_events.push(Event::PackageDelivered { at });
    }

    fn advance_courier(&mut self, out_events: &mut Vec<Event>) {
        if self.phase != DeliveryPhase::EnRouteToDestination {
            return;
        }
        let Some(courier) = self.courier.as_mut() else {
            return;
        };
        let Some(next) = courier.next_step() else {
            return;
        };

        let from = courier.cell;
        // The first route cell equals the staged cell; keep the facing then.
        if let Some(facing) = Direction::toward(from, next) {
            courier.facing = facing;
        }
        courier.advance(next);
        out_events.push(Event::CourierAdvanced {
            from,
            to: next,
            facing: courier.facing,
        });

        if courier.next_step().is_none() {
            out_events.push(Event::CourierArrived { at: courier.cell });
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::LoadMap { map } => world.install_map(map, out_events),
        Command::Randomize => world.stage_delivery(out_events),
        Command::Start => world.start_leg(out_events),
        Command::Tick => world.advance_courier(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use courier_core::{CellCoord, CourierSnapshot, DeliveryPhase, TerrainMap};

    /// Retrieves the welcome banner that adapters may display to operators.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Reports the currently active delivery phase.
    #[must_use]
    pub fn phase(world: &World) -> DeliveryPhase {
        world.phase
    }

    /// Captures a read-only snapshot of the courier, if one is staged.
    #[must_use]
    pub fn courier(world: &World) -> Option<CourierSnapshot> {
        world.courier.as_ref().map(|courier| CourierSnapshot {
            cell: courier.cell,
            facing: courier.facing,
            carrying: courier.carrying,
            next_hop: courier.next_step(),
            steps_remaining: courier.steps_remaining(),
        })
    }

    /// Full planned route of the active leg, for visualization.
    #[must_use]
    pub fn route(world: &World) -> &[CellCoord] {
        world
            .courier
            .as_ref()
            .map_or(&[], |courier| courier.route.as_slice())
    }

    /// Cell holding the parcel awaiting pickup, if staged.
    #[must_use]
    pub fn source(world: &World) -> Option<CellCoord> {
        world.source
    }

    /// Cell the parcel must be delivered to, if staged.
    #[must_use]
    pub fn destination(world: &World) -> Option<CellCoord> {
        world.destination
    }

    /// Provides read-only access to the loaded terrain map.
    #[must_use]
    pub fn terrain(world: &World) -> Option<&TerrainMap> {
        world.terrain.as_ref()
    }
}

#[derive(Clone, Debug)]
struct Courier {
    cell: CellCoord,
    facing: Direction,
    carrying: bool,
    route: Vec<CellCoord>,
    cursor: usize,
}

impl Courier {
    fn staged(cell: CellCoord, facing: Direction) -> Self {
        Self {
            cell,
            facing,
            carrying: false,
            route: Vec::new(),
            cursor: 0,
        }
    }

    fn assign_route(&mut self, route: Vec<CellCoord>) {
        self.route = route;
        self.cursor = 0;
    }

    fn next_step(&self) -> Option<CellCoord> {
        self.route.get(self.cursor).copied()
    }

    fn advance(&mut self, destination: CellCoord) {
        self.cell = destination;
        self.cursor += 1;
    }

    fn steps_remaining(&self) -> usize {
        self.route.len().saturating_sub(self.cursor)
    }
}

/// Picks the cell the courier is staged on, one column behind the source.
///
/// A source on the west edge stages the courier on its east side instead; a
/// single-column map leaves the courier on the source cell itself. The staged
/// cell may be off the road, the route search still departs from it.
fn staging_cell(terrain: &TerrainMap, source: CellCoord) -> CellCoord {
    if let Some(column) = source.column().checked_sub(1) {
        return CellCoord::new(column, source.row());
    }

    let east = source.column() + 1;
    if east < terrain.columns() {
        CellCoord::new(east, source.row())
    } else {
        source
    }
}
