#![allow(clippy::missing_errors_doc)]

use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use courier_core::{CellCoord, MapError, TerrainColor, TerrainMap};
use serde::{Deserialize, Serialize};

const SNAPSHOT_DOMAIN: &str = "courier";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded scenario payload.
pub(crate) const SNAPSHOT_HEADER: &str = "courier:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Color written into cells listed as road by a decoded scenario.
pub(crate) const ROAD_SURFACE: TerrainColor = TerrainColor::from_rgb(120, 120, 120);
/// Color written into every other cell of a decoded scenario.
pub(crate) const BLOCKED_SURFACE: TerrainColor = TerrainColor::from_rgb(30, 30, 30);

/// Snapshot of a terrain map's road network and grid dimensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ScenarioSnapshot {
    /// Number of cell columns contained in the grid.
    pub(crate) columns: u32,
    /// Number of cell rows contained in the grid.
    pub(crate) rows: u32,
    /// Cells classified as road, in row-major order.
    pub(crate) roads: Vec<CellCoord>,
}

impl ScenarioSnapshot {
    /// Captures the road network of an existing terrain map.
    #[must_use]
    pub(crate) fn capture(map: &TerrainMap) -> Self {
        let mut roads = Vec::new();
        for row in 0..map.rows() {
            for column in 0..map.columns() {
                let cell = CellCoord::new(column, row);
                if map.is_road(cell) {
                    roads.push(cell);
                }
            }
        }

        Self {
            columns: map.columns(),
            rows: map.rows(),
            roads,
        }
    }

    /// Encodes the snapshot into a single-line string suitable for clipboard transfer.
    #[must_use]
    pub(crate) fn encode(&self) -> String {
        let payload = SerializableScenario {
            roads: self.roads.clone(),
        };
        let json =
            serde_json::to_vec(&payload).expect("scenario snapshot serialization never fails");
        let encoded = STANDARD_NO_PAD.encode(json);
        format!("{SNAPSHOT_HEADER}:{}x{}:{encoded}", self.columns, self.rows)
    }

    /// Decodes a snapshot from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, ScenarioTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ScenarioTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(ScenarioTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(ScenarioTransferError::MissingVersion)?;
        let dimensions = parts
            .next()
            .ok_or(ScenarioTransferError::MissingDimensions)?;
        let payload = parts.next().ok_or(ScenarioTransferError::MissingPayload)?;

        if domain != SNAPSHOT_DOMAIN {
            return Err(ScenarioTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != SNAPSHOT_VERSION {
            return Err(ScenarioTransferError::UnsupportedVersion(
                version.to_owned(),
            ));
        }

        let (columns, rows) = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(ScenarioTransferError::InvalidEncoding)?;
        let decoded: SerializableScenario =
            serde_json::from_slice(&bytes).map_err(ScenarioTransferError::InvalidPayload)?;

        for road in &decoded.roads {
            if road.column() >= columns || road.row() >= rows {
                return Err(ScenarioTransferError::RoadOutOfBounds {
                    cell: *road,
                    columns,
                    rows,
                });
            }
        }

        Ok(Self {
            columns,
            rows,
            roads: decoded.roads,
        })
    }

    /// Materializes the snapshot into a terrain map.
    pub(crate) fn into_map(self) -> Result<TerrainMap, ScenarioTransferError> {
        let cell_count = usize::try_from(u64::from(self.columns) * u64::from(self.rows))
            .map_err(|_| ScenarioTransferError::InvalidDimensions(format!(
                "{}x{}",
                self.columns, self.rows
            )))?;
        let mut cells = vec![BLOCKED_SURFACE; cell_count];

        let width = self.columns as usize;
        for road in &self.roads {
            let index = road.row() as usize * width + road.column() as usize;
            if let Some(slot) = cells.get_mut(index) {
                *slot = ROAD_SURFACE;
            }
        }

        TerrainMap::from_cells(self.columns, self.rows, cells)
            .map_err(ScenarioTransferError::InvalidGrid)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct SerializableScenario {
    roads: Vec<CellCoord>,
}

/// Errors that can occur while decoding scenario transfer strings.
#[derive(Debug)]
pub(crate) enum ScenarioTransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing from the encoded scenario.
    MissingPrefix,
    /// The encoded scenario did not contain a version segment.
    MissingVersion,
    /// The encoded scenario did not include grid dimensions.
    MissingDimensions,
    /// The encoded scenario did not include the payload segment.
    MissingPayload,
    /// The encoded scenario used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The encoded scenario used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed from the encoded scenario.
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The decoded payload could not be deserialised.
    InvalidPayload(serde_json::Error),
    /// The payload listed a road cell outside the declared grid.
    RoadOutOfBounds {
        /// Offending road cell.
        cell: CellCoord,
        /// Number of columns declared by the scenario.
        columns: u32,
        /// Number of rows declared by the scenario.
        rows: u32,
    },
    /// The declared dimensions do not describe a loadable terrain grid.
    InvalidGrid(MapError),
}

impl fmt::Display for ScenarioTransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "scenario payload was empty"),
            Self::MissingPrefix => write!(f, "scenario string is missing the prefix"),
            Self::MissingVersion => write!(f, "scenario string is missing the version"),
            Self::MissingDimensions => {
                write!(f, "scenario string is missing the grid dimensions")
            }
            Self::MissingPayload => write!(f, "scenario string is missing the payload"),
            Self::InvalidPrefix(prefix) => {
                write!(f, "scenario prefix '{prefix}' is not supported")
            }
            Self::UnsupportedVersion(version) => {
                write!(f, "scenario version '{version}' is not supported")
            }
            Self::InvalidDimensions(dimensions) => {
                write!(f, "could not parse grid dimensions '{dimensions}'")
            }
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode scenario payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not parse scenario payload: {error}")
            }
            Self::RoadOutOfBounds {
                cell,
                columns,
                rows,
            } => {
                write!(
                    f,
                    "road cell ({}, {}) lies outside the {columns}x{rows} grid",
                    cell.column(),
                    cell.row()
                )
            }
            Self::InvalidGrid(error) => write!(f, "scenario grid is not loadable: {error}"),
        }
    }
}

impl Error for ScenarioTransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            Self::InvalidGrid(error) => Some(error),
            _ => None,
        }
    }
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), ScenarioTransferError> {
    let (columns, rows) = dimensions
        .split_once(['x', 'X'])
        .ok_or_else(|| ScenarioTransferError::InvalidDimensions(dimensions.to_owned()))?;

    let columns = columns
        .trim()
        .parse::<u32>()
        .map_err(|_| ScenarioTransferError::InvalidDimensions(dimensions.to_owned()))?;
    let rows = rows
        .trim()
        .parse::<u32>()
        .map_err(|_| ScenarioTransferError::InvalidDimensions(dimensions.to_owned()))?;

    if columns == 0 || rows == 0 {
        return Err(ScenarioTransferError::InvalidDimensions(
            dimensions.to_owned(),
        ));
    }

    Ok((columns, rows))
}
