#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the courier dispatch simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems and
//! shells to react to deterministically. Systems consume event streams and
//! respond exclusively with new command batches; shells render query
//! snapshots and forward user intent.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the dispatch desk boots.
pub const WELCOME_BANNER: &str = "Welcome to the courier dispatch desk.";

/// Lowest channel value still classified as road surface.
pub const ROAD_CHANNEL_MIN: u8 = 90;

/// Highest channel value still classified as road surface.
pub const ROAD_CHANNEL_MAX: u8 = 150;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the terrain map, invalidating any staged delivery.
    LoadMap {
        /// Validated terrain grid supplied by the shell.
        map: TerrainMap,
    },
    /// Samples fresh pickup and drop-off points and stages the courier.
    Randomize,
    /// Attempts the next leg of the delivery: collecting the parcel before
    /// the journey, or handing it over once the route is consumed.
    Start,
    /// Advances the courier one cell along the active route.
    Tick,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a terrain map became the active navigation surface.
    MapLoaded {
        /// Number of cell columns in the loaded map.
        columns: u32,
        /// Number of cell rows in the loaded map.
        rows: u32,
    },
    /// Confirms that pickup and drop-off points were staged for a new run.
    DeliveryStaged {
        /// Cell the courier was placed on.
        courier: CellCoord,
        /// Facing assigned to the courier while staging.
        facing: Direction,
        /// Cell holding the parcel awaiting pickup.
        source: CellCoord,
        /// Cell the parcel must be delivered to.
        destination: CellCoord,
    },
    /// Reports that a randomize request could not stage a delivery.
    StagingRejected {
        /// Specific reason staging failed.
        reason: StagingError,
    },
    /// Confirms that the courier collected the parcel at the pickup point.
    PackagePickedUp {
        /// Cell the courier occupied while collecting the parcel.
        at: CellCoord,
    },
    /// Announces the route the courier will follow to the drop-off point.
    RoutePlanned {
        /// First cell of the route; equals the courier's current cell.
        from: CellCoord,
        /// Final cell of the route; equals the drop-off cell.
        to: CellCoord,
        /// Number of cells composing the route, endpoints included.
        length: usize,
    },
    /// Reports that a start request was rejected.
    StartRejected {
        /// Specific reason the start failed.
        reason: StartError,
    },
    /// Confirms that the courier advanced one cell along its route.
    CourierAdvanced {
        /// Cell the courier occupied before the step.
        from: CellCoord,
        /// Cell the courier occupies after the step.
        to: CellCoord,
        /// Facing held by the courier after the step.
        facing: Direction,
    },
    /// Signals that the courier consumed the final cell of its route.
    ///
    /// Arrival stops movement but never transitions the delivery phase by
    /// itself; the next [`Command::Start`] acts on it.
    CourierArrived {
        /// Cell the courier came to rest on.
        at: CellCoord,
    },
    /// Confirms that the parcel was handed over at the drop-off point.
    PackageDelivered {
        /// Cell where the hand-over took place.
        at: CellCoord,
    },
}

/// Reasons a terrain map may be rejected before it is ever loaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum MapError {
    /// The grid described zero columns or zero rows.
    #[error("terrain grid must have nonzero dimensions, got {columns}x{rows}")]
    EmptyGrid {
        /// Number of columns in the rejected grid.
        columns: u32,
        /// Number of rows in the rejected grid.
        rows: u32,
    },
    /// The flat cell buffer did not match the declared dimensions.
    #[error("terrain grid declared {expected} cells but {actual} were supplied")]
    CellCountMismatch {
        /// Cell count implied by the declared dimensions.
        expected: usize,
        /// Cell count actually supplied.
        actual: usize,
    },
}

/// Reasons a randomize request may fail to stage a delivery.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum StagingError {
    /// No terrain map has been loaded yet.
    #[error("no terrain map has been loaded")]
    MapMissing,
    /// Sampling exhausted its attempt budget without hitting a road cell.
    #[error("no road cell found within {attempts} sampling attempts")]
    NoRoadCells {
        /// Number of draws consumed before giving up.
        attempts: u32,
    },
}

/// Reasons a start request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum StartError {
    /// The courier does not face the pickup point closely enough to collect
    /// the parcel.
    #[error("courier must face the pickup point to collect the parcel")]
    NotFacingSource,
    /// The courier does not face the drop-off point closely enough to hand
    /// the parcel over.
    #[error("courier must face the drop-off point to hand the parcel over")]
    NotFacingDestination,
    /// No road route connects the courier to the drop-off point.
    #[error("no road route reaches the drop-off point")]
    RouteUnavailable,
}

/// Color sample captured from one terrain cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TerrainColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl TerrainColor {
    /// Creates a new terrain color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }

    /// Reports whether the color classifies as drivable road surface.
    ///
    /// A cell is road iff every channel lies in the closed range
    /// [`ROAD_CHANNEL_MIN`]..=[`ROAD_CHANNEL_MAX`].
    #[must_use]
    pub const fn is_road(&self) -> bool {
        in_road_range(self.red) && in_road_range(self.green) && in_road_range(self.blue)
    }
}

const fn in_road_range(channel: u8) -> bool {
    ROAD_CHANNEL_MIN <= channel && channel <= ROAD_CHANNEL_MAX
}

/// Immutable dense grid of terrain color samples.
///
/// The map is read-only for the duration of a simulation run; replacing it
/// invalidates any previously staged delivery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerrainMap {
    columns: u32,
    rows: u32,
    cells: Vec<TerrainColor>,
}

impl TerrainMap {
    /// Builds a terrain map from a row-major cell buffer.
    ///
    /// Rejects zero-sized grids and buffers whose length disagrees with the
    /// declared dimensions, so every constructed map is searchable.
    pub fn from_cells(
        columns: u32,
        rows: u32,
        cells: Vec<TerrainColor>,
    ) -> Result<Self, MapError> {
        if columns == 0 || rows == 0 {
            return Err(MapError::EmptyGrid { columns, rows });
        }

        let expected_u64 = u64::from(columns) * u64::from(rows);
        let expected = usize::try_from(expected_u64).map_err(|_| MapError::CellCountMismatch {
            expected: usize::MAX,
            actual: cells.len(),
        })?;
        if cells.len() != expected {
            return Err(MapError::CellCountMismatch {
                expected,
                actual: cells.len(),
            });
        }

        Ok(Self {
            columns,
            rows,
            cells,
        })
    }

    /// Number of cell columns in the map.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of cell rows in the map.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Total number of cells held by the map.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the cell lies within the map bounds.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Color sample captured at the provided cell, if it is in bounds.
    #[must_use]
    pub fn color(&self, cell: CellCoord) -> Option<TerrainColor> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Reports whether the cell is in bounds and classified as road.
    #[must_use]
    pub fn is_road(&self, cell: CellCoord) -> bool {
        self.color(cell).map_or(false, |color| color.is_road())
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

/// Cardinal facings available to the courier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Facing toward decreasing row indices.
    North,
    /// Facing toward increasing column indices.
    East,
    /// Facing toward increasing row indices.
    South,
    /// Facing toward decreasing column indices.
    West,
}

impl Direction {
    /// Derives the dominant facing from `from` toward `to`.
    ///
    /// Horizontal wins only when `|dx| > |dy|`; ties between the axes fall to
    /// the vertical branch. Returns `None` for the zero vector so callers can
    /// keep their current facing when a step goes nowhere.
    #[must_use]
    pub fn toward(from: CellCoord, to: CellCoord) -> Option<Direction> {
        let (dx, dy) = deltas(from, to);
        if dx == 0 && dy == 0 {
            return None;
        }

        if dx.abs() > dy.abs() {
            Some(if dx > 0 { Self::East } else { Self::West })
        } else if dy > 0 {
            Some(Self::South)
        } else {
            Some(Self::North)
        }
    }

    /// Reports whether this facing points at `to` from `from` within the
    /// facing tolerance.
    ///
    /// Each facing accepts targets whose displacement leans at least as far
    /// along its own axis as along the other, so exact diagonals satisfy both
    /// the horizontal and the vertical facing of matching sign. This rule is
    /// deliberately looser than [`Direction::toward`] on ties. A courier
    /// standing on its target has nothing left to face and passes the check.
    #[must_use]
    pub fn is_facing(self, from: CellCoord, to: CellCoord) -> bool {
        let (dx, dy) = deltas(from, to);
        if dx == 0 && dy == 0 {
            return true;
        }

        match self {
            Self::East => dx > 0 && dx.abs() >= dy.abs(),
            Self::West => dx < 0 && dx.abs() >= dy.abs(),
            Self::North => dy < 0 && dy.abs() >= dx.abs(),
            Self::South => dy > 0 && dy.abs() >= dx.abs(),
        }
    }
}

fn deltas(from: CellCoord, to: CellCoord) -> (i64, i64) {
    (
        i64::from(to.column()) - i64::from(from.column()),
        i64::from(to.row()) - i64::from(from.row()),
    )
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }
}

/// Lifecycle phases of a staged delivery.
///
/// Exactly one phase is active at a time, and phases change only in response
/// to explicit commands and ticks, never spontaneously.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeliveryPhase {
    /// No map or no staged endpoints; nothing can run yet.
    NotReady,
    /// Endpoints staged; the courier stands beside the pickup point.
    ReadyToPickup,
    /// The courier travels toward the pickup point.
    EnRouteToSource,
    /// The courier waits beside the parcel until its facing satisfies the
    /// pickup tolerance.
    AwaitingPickupFacing,
    /// The parcel is on board but no route has been consumed yet.
    PickedUp,
    /// The courier travels toward the drop-off point.
    EnRouteToDestination,
    /// The parcel was handed over; the run is complete.
    Delivered,
}

/// Immutable representation of the courier's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CourierSnapshot {
    /// Grid cell currently occupied by the courier.
    pub cell: CellCoord,
    /// Facing currently held by the courier.
    pub facing: Direction,
    /// Indicates whether the parcel is on board.
    pub carrying: bool,
    /// Next cell the courier will step onto, if a route is active.
    pub next_hop: Option<CellCoord>,
    /// Number of route cells not yet consumed.
    pub steps_remaining: usize,
}

#[cfg(test)]
mod tests {
    use super::{
        CellCoord, Direction, MapError, StagingError, StartError, TerrainColor, TerrainMap,
        ROAD_CHANNEL_MAX, ROAD_CHANNEL_MIN,
    };
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn road_classification_accepts_closed_channel_range() {
        let low = TerrainColor::from_rgb(ROAD_CHANNEL_MIN, ROAD_CHANNEL_MIN, ROAD_CHANNEL_MIN);
        let high = TerrainColor::from_rgb(ROAD_CHANNEL_MAX, ROAD_CHANNEL_MAX, ROAD_CHANNEL_MAX);
        let mid = TerrainColor::from_rgb(120, 120, 120);

        assert!(low.is_road());
        assert!(high.is_road());
        assert!(mid.is_road());
    }

    #[test]
    fn road_classification_rejects_any_channel_out_of_range() {
        assert!(!TerrainColor::from_rgb(89, 120, 120).is_road());
        assert!(!TerrainColor::from_rgb(120, 151, 120).is_road());
        assert!(!TerrainColor::from_rgb(120, 120, 0).is_road());
        assert!(!TerrainColor::from_rgb(255, 255, 255).is_road());
    }

    #[test]
    fn terrain_map_rejects_zero_dimensions() {
        assert_eq!(
            TerrainMap::from_cells(0, 4, Vec::new()),
            Err(MapError::EmptyGrid {
                columns: 0,
                rows: 4
            })
        );
        assert_eq!(
            TerrainMap::from_cells(4, 0, Vec::new()),
            Err(MapError::EmptyGrid {
                columns: 4,
                rows: 0
            })
        );
    }

    #[test]
    fn terrain_map_rejects_cell_count_mismatch() {
        let cells = vec![TerrainColor::from_rgb(120, 120, 120); 5];
        assert_eq!(
            TerrainMap::from_cells(2, 3, cells),
            Err(MapError::CellCountMismatch {
                expected: 6,
                actual: 5
            })
        );
    }

    #[test]
    fn terrain_map_classifies_cells_in_bounds_only() {
        let road = TerrainColor::from_rgb(120, 120, 120);
        let wall = TerrainColor::from_rgb(30, 30, 30);
        let map = TerrainMap::from_cells(2, 1, vec![road, wall]).expect("map builds");

        assert!(map.is_road(CellCoord::new(0, 0)));
        assert!(!map.is_road(CellCoord::new(1, 0)));
        assert!(!map.is_road(CellCoord::new(2, 0)));
        assert!(!map.is_road(CellCoord::new(0, 1)));
        assert_eq!(map.color(CellCoord::new(1, 0)), Some(wall));
        assert_eq!(map.color(CellCoord::new(2, 0)), None);
    }

    #[test]
    fn toward_prefers_horizontal_only_on_strict_majority() {
        let origin = CellCoord::new(10, 10);
        assert_eq!(
            Direction::toward(origin, CellCoord::new(14, 11)),
            Some(Direction::East)
        );
        assert_eq!(
            Direction::toward(origin, CellCoord::new(6, 9)),
            Some(Direction::West)
        );
    }

    #[test]
    fn toward_falls_to_vertical_axis_on_ties() {
        let origin = CellCoord::new(10, 10);
        assert_eq!(
            Direction::toward(origin, CellCoord::new(13, 13)),
            Some(Direction::South)
        );
        assert_eq!(
            Direction::toward(origin, CellCoord::new(7, 13)),
            Some(Direction::South)
        );
        assert_eq!(
            Direction::toward(origin, CellCoord::new(13, 7)),
            Some(Direction::North)
        );
    }

    #[test]
    fn toward_returns_none_for_zero_vector() {
        let origin = CellCoord::new(3, 3);
        assert_eq!(Direction::toward(origin, origin), None);
    }

    #[test]
    fn facing_tolerance_accepts_exact_diagonals() {
        let from = CellCoord::new(2, 2);
        let diagonal = CellCoord::new(7, 7);

        assert!(Direction::East.is_facing(from, diagonal));
        assert!(Direction::South.is_facing(from, diagonal));
        assert!(!Direction::West.is_facing(from, diagonal));
        assert!(!Direction::North.is_facing(from, diagonal));
    }

    #[test]
    fn facing_tolerance_rejects_minority_axis() {
        let from = CellCoord::new(2, 2);
        let target = CellCoord::new(7, 8);

        assert!(!Direction::East.is_facing(from, target));
        assert!(Direction::South.is_facing(from, target));
    }

    #[test]
    fn facing_is_vacuous_on_the_target_cell() {
        let cell = CellCoord::new(5, 5);
        assert!(Direction::East.is_facing(cell, cell));
        assert!(Direction::North.is_facing(cell, cell));
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn cell_coord_round_trips_through_bincode() {
        assert_round_trip(&CellCoord::new(17, 23));
    }

    #[test]
    fn map_error_round_trips_through_bincode() {
        assert_round_trip(&MapError::EmptyGrid {
            columns: 0,
            rows: 7,
        });
    }

    #[test]
    fn staging_error_round_trips_through_bincode() {
        assert_round_trip(&StagingError::NoRoadCells { attempts: 10_000 });
    }

    #[test]
    fn start_error_round_trips_through_bincode() {
        assert_round_trip(&StartError::NotFacingSource);
    }
}
