use std::collections::HashMap;

use super::{NetworkStrength, NodeId, PowerGridError, PowerNode};
use crate::grid::TileCoord;
use crate::structures::DockType;

/// One physical link found by probing a node's docks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Adjacency {
    pub neighbor: NodeId,
    pub kind: DockType,
    pub vertical: bool,
}

impl Adjacency {
    pub fn strength(&self) -> NetworkStrength {
        NetworkStrength::classify(self.kind, self.vertical)
    }
}

/// Tile occupancy for every registered power structure, across all layers.
#[derive(Default, Debug, Clone)]
pub struct TopologyIndex {
    occupancy: HashMap<TileCoord, NodeId>,
}

impl TopologyIndex {
    /// Claims every tile of `node`. Nothing is claimed if any tile is taken.
    pub fn insert(&mut self, node: &PowerNode) -> Result<(), PowerGridError> {
        for tile in node.tiles() {
            if let Some(&occupant) = self.occupancy.get(&tile) {
                if occupant != node.id() {
                    return Err(PowerGridError::TileOccupied {
                        coord: tile,
                        occupant,
                    });
                }
            }
        }
        for tile in node.tiles() {
            self.occupancy.insert(tile, node.id());
        }
        Ok(())
    }

    pub fn remove(&mut self, node: &PowerNode) {
        for tile in node.tiles() {
            if self.occupancy.get(&tile) == Some(&node.id()) {
                self.occupancy.remove(&tile);
            }
        }
    }

    pub fn occupant(&self, coord: TileCoord) -> Option<NodeId> {
        self.occupancy.get(&coord).copied()
    }

    pub fn clear(&mut self) {
        self.occupancy.clear();
    }

    pub fn len(&self) -> usize {
        self.occupancy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occupancy.is_empty()
    }

    /// Probes the tile each power dock of `node` faces (the paired tile on the
    /// next layer for shaft docks) and keeps occupants that present a dock of the
    /// same kind facing straight back. Sorted by neighbor id; a neighbor reached
    /// through several dock pairs appears once per pair.
    pub fn find_adjacent(
        &self,
        node: &PowerNode,
        nodes: &HashMap<NodeId, PowerNode>,
    ) -> Vec<Adjacency> {
        let mut found = Vec::new();
        for dock in node.power_docks() {
            let probe = node.dock_tile(dock).step(dock.facing);
            let Some(occupant) = self.occupant(probe) else {
                continue;
            };
            if occupant == node.id() {
                continue;
            }
            let Some(neighbor) = nodes.get(&occupant) else {
                continue;
            };
            let facing_back = dock.facing.opposite();
            let compatible = neighbor.power_docks().iter().any(|other| {
                other.kind == dock.kind
                    && other.facing == facing_back
                    && neighbor.dock_tile(other) == probe
            });
            if compatible {
                found.push(Adjacency {
                    neighbor: occupant,
                    kind: dock.kind,
                    vertical: dock.facing.is_vertical(),
                });
            }
        }
        found.sort_by_key(|adjacency| adjacency.neighbor);
        found
    }
}
