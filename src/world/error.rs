//! Rejection reasons for structural edits
//!
//! A rejected edit leaves the map exactly as it was.

use thiserror::Error;

use super::{Direction, SectorPos};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("no sector at {0}")]
    NoSector(SectorPos),
    #[error("no neighboring sector at {0}")]
    NoNeighbor(SectorPos),
    #[error("surface at {0} is not flush")]
    NotFlush(SectorPos),
    #[error("ceiling at {0} conflicts with sky")]
    SkyConflict(SectorPos),
    #[error("wall is not adjoined")]
    NotAdjoined,
    #[error("surface at {0} is adjoined")]
    SurfaceAdjoined(SectorPos),
    #[error("sector at {0} has no door")]
    NoDoor(SectorPos),
    #[error("sector already in map at {0}")]
    Occupied(SectorPos),
    #[error("door position {0} is not 0, 1 or 2")]
    InvalidDoorPosition(u8),
    #[error("nothing selected")]
    NoSelection,
    #[error("no cell beyond {0}, it is at the edge of the grid")]
    EdgeOfGrid(SectorPos),
    #[error("floor {0} is too far from the other floors")]
    FloorOutOfRange(i32),
}

pub type EditResult = Result<(), EditError>;

/// A stored map that breaks one of the adjoin rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MapInvariantError {
    #[error("{} wall of {} has no matching adjoin", .1.label(), .0)]
    UnmatchedWall(SectorPos, Direction),
    #[error("floor of {0} has no matching adjoin")]
    UnmatchedFloor(SectorPos),
    #[error("ceiling of {0} has no matching adjoin")]
    UnmatchedCeiling(SectorPos),
    #[error("{} wall of {} blocks or aligns an adjoin it does not have", .1.label(), .0)]
    FlagsWithoutAdjoin(SectorPos, Direction),
    #[error("adjoined floor of {0} is not flush")]
    AdjoinedFloorNotFlush(SectorPos),
    #[error("adjoined ceiling of {0} is not flush")]
    AdjoinedCeilingNotFlush(SectorPos),
    #[error("ceiling of {0} is both adjoined and sky")]
    AdjoinedSky(SectorPos),
}
