//! Read-only view of the host world around an agent.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::geometry::{Direction, TilePos};

bitflags! {
    /// Terrain and structure flags of a single tile.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct TileTraits: u8 {
        const WALL = 0b0000_0001;
        const SWAMP = 0b0000_0010;
        const OBSTACLE = 0b0000_0100;
    }
}

impl Default for TileTraits {
    fn default() -> Self {
        Self::empty()
    }
}

impl TileTraits {
    /// Flags that make a tile impassable regardless of occupants.
    pub const BLOCKING: TileTraits = TileTraits::WALL.union(TileTraits::OBSTACLE);
}

/// Something on a tile the goal state machine reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PointOfInterest {
    /// Base structure that accepts carried resources.
    Home { stored: u32, capacity: u32 },
    /// Harvestable resource with its remaining yield.
    ResourceNode { available: u32 },
    /// Structure carried resources can be spent on.
    UpgradeTarget { owned: bool },
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileLook {
    pub traits: TileTraits,
    /// Another agent currently stands here.
    pub occupied: bool,
    pub points: Vec<PointOfInterest>,
}

impl TileLook {
    pub fn open() -> Self {
        Self::default()
    }

    /// Whether an agent could step here. Points of interest are structures and
    /// block movement like walls do.
    pub fn is_walkable(&self, ignore_occupied: bool) -> bool {
        !self.traits.intersects(TileTraits::BLOCKING)
            && self.points.is_empty()
            && (ignore_occupied || !self.occupied)
    }
}

/// Terrain, occupant and point-of-interest oracle supplied by the host.
pub trait WorldQuery {
    /// Returns `None` for tiles the host knows nothing about.
    fn look(&self, pos: TilePos) -> Option<TileLook>;
}

impl<W: WorldQuery + ?Sized> WorldQuery for &W {
    fn look(&self, pos: TilePos) -> Option<TileLook> {
        (**self).look(pos)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NeighborTile {
    pub direction: Direction,
    pub pos: TilePos,
    pub look: TileLook,
}

/// Adjacent home structure and its fill state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HomeSite {
    pub pos: TilePos,
    pub stored: u32,
    pub capacity: u32,
}

/// Everything an agent needs to know about its eight neighbours for one tick.
/// Built once per agent update so the world is queried a single time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Neighborhood {
    pub origin: TilePos,
    tiles: Vec<NeighborTile>,
}

impl Neighborhood {
    pub fn scan<W: WorldQuery + ?Sized>(world: &W, origin: TilePos) -> Self {
        let tiles = origin
            .neighbors()
            .filter_map(|(direction, pos)| {
                world.look(pos).map(|look| NeighborTile {
                    direction,
                    pos,
                    look,
                })
            })
            .collect();
        Self { origin, tiles }
    }

    /// Known neighbour tiles in clockwise order starting at `Top`.
    pub fn tiles(&self) -> &[NeighborTile] {
        &self.tiles
    }

    pub fn home(&self) -> Option<HomeSite> {
        self.tiles.iter().find_map(|tile| {
            tile.look.points.iter().find_map(|point| match *point {
                PointOfInterest::Home { stored, capacity } => Some(HomeSite {
                    pos: tile.pos,
                    stored,
                    capacity,
                }),
                _ => None,
            })
        })
    }

    /// First adjacent tile whose resource nodes all still have yield.
    pub fn harvestable_resource(&self) -> Option<TilePos> {
        self.tiles
            .iter()
            .find(|tile| {
                let mut nodes = tile
                    .look
                    .points
                    .iter()
                    .filter_map(|point| match *point {
                        PointOfInterest::ResourceNode { available } => Some(available),
                        _ => None,
                    })
                    .peekable();
                nodes.peek().is_some() && nodes.all(|available| available > 0)
            })
            .map(|tile| tile.pos)
    }

    pub fn owned_upgrade_target(&self) -> Option<TilePos> {
        self.tiles
            .iter()
            .find(|tile| {
                tile.look
                    .points
                    .iter()
                    .any(|point| matches!(point, PointOfInterest::UpgradeTarget { owned: true }))
            })
            .map(|tile| tile.pos)
    }
}
