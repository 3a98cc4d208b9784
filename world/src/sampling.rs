//! Bounded rejection sampler used to place delivery endpoints.

use courier_core::{CellCoord, StagingError, TerrainMap};
use rand::Rng;

/// Draws a uniformly random road cell from the map.
///
/// Each attempt draws an unbiased in-bounds cell and keeps it iff it
/// classifies as road, so accepted cells are uniform over the road surface.
/// Gives up with [`StagingError::NoRoadCells`] once `attempt_limit` draws
/// have been rejected, keeping an all-wall map from spinning forever.
pub(crate) fn sample_road_cell<R: Rng>(
    map: &TerrainMap,
    rng: &mut R,
    attempt_limit: u32,
) -> Result<CellCoord, StagingError> {
    for _ in 0..attempt_limit {
        let column = rng.gen_range(0..map.columns());
        let row = rng.gen_range(0..map.rows());
        let cell = CellCoord::new(column, row);
        if map.is_road(cell) {
            return Ok(cell);
        }
    }

    Err(StagingError::NoRoadCells {
        attempts: attempt_limit,
    })
}
