use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use bevy::prelude::*;

use super::connectivity::Mutation;
use super::settlement::settle_network;
use super::{
    Adjacency, InvariantViolation, MembershipHandle, Network, NetworkId, NetworkStrength, NodeId,
    PowerGridError, PowerNode, PowerRole, TopologyIndex,
};
use crate::grid::TileCoord;

/// Every power network in the world, plus the index from structure to network.
///
/// Each registered node belongs to exactly one network, and each network's
/// members are connected through its edges.
#[derive(Resource, Default, Debug)]
pub struct PowerGrid {
    pub(super) nodes: HashMap<NodeId, PowerNode>,
    pub(super) topology: TopologyIndex,
    pub(super) networks: BTreeMap<NetworkId, Network>,
    pub(super) owners: HashMap<NodeId, NetworkId>,
    pub(super) next_network_id: u32,
    pub(super) membership: MembershipHandle,
}

impl PowerGrid {
    /// Places `node` and joins it to its neighbors' networks, merging them if it
    /// bridges several.
    ///
    /// # Errors
    /// Fails if the id is taken, a tile is occupied, the node has no power
    /// docks, or the grid's bookkeeping is found inconsistent.
    pub fn register_structure(&mut self, node: PowerNode) -> Result<NetworkId, PowerGridError> {
        let id = node.id();
        self.claim(node)?;
        let (network, mutation) = self.connect(id)?;
        self.publish(&mutation);
        Ok(network)
    }

    /// Removes a node, splitting its network if it was holding it together.
    ///
    /// # Errors
    /// Fails if the node is unknown or the grid's bookkeeping is inconsistent.
    pub fn unregister_structure(&mut self, id: NodeId) -> Result<PowerNode, PowerGridError> {
        let node = self
            .nodes
            .remove(&id)
            .ok_or(PowerGridError::UnknownNode(id))?;
        self.topology.remove(&node);
        let mutation = self.disconnect(id)?;
        self.publish(&mutation);
        Ok(node)
    }

    /// Rebuilds the grid from saved structures: every node is placed first, then
    /// connected in ascending id order, so shaft pairs on layers loaded later
    /// still find each other. The grid is left empty if loading fails.
    ///
    /// # Errors
    /// Same conditions as [`PowerGrid::register_structure`].
    pub fn load_structures(
        &mut self,
        nodes: impl IntoIterator<Item = PowerNode>,
    ) -> Result<usize, PowerGridError> {
        self.clear();
        let result = self.load_in_two_phases(nodes);
        match &result {
            Ok(count) => {
                self.clear_high_power_cache();
                self.membership.publish_all(&self.networks);
                info!(
                    "Power grid rebuilt: {} structures in {} networks",
                    count,
                    self.networks.len()
                );
            }
            Err(err) => {
                error!("Power grid rebuild failed: {err}");
                self.clear();
            }
        }
        result
    }

    fn load_in_two_phases(
        &mut self,
        nodes: impl IntoIterator<Item = PowerNode>,
    ) -> Result<usize, PowerGridError> {
        let mut loaded = Vec::new();
        for node in nodes {
            loaded.push(node.id());
            self.claim(node)?;
        }
        loaded.sort_unstable();
        for id in &loaded {
            self.connect(*id)?;
        }
        Ok(loaded.len())
    }

    fn claim(&mut self, node: PowerNode) -> Result<(), PowerGridError> {
        let id = node.id();
        if self.nodes.contains_key(&id) {
            return Err(PowerGridError::DuplicateNode(id));
        }
        if !node.has_power_docks() {
            return Err(PowerGridError::NoPowerDocks(id));
        }
        self.topology.insert(&node)?;
        self.nodes.insert(id, node);
        Ok(())
    }

    /// Settles every network once. Does nothing while paused or for an empty tick.
    pub fn update(&mut self, delta_time: f32, game_speed: f32) {
        if game_speed <= 0.0 || delta_time <= 0.0 {
            return;
        }
        let dt = delta_time * game_speed;
        let nodes = &mut self.nodes;
        for network in self.networks.values_mut() {
            settle_network(network, nodes, dt);
        }
    }

    /// Drops every node and network (new game).
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.topology.clear();
        self.networks.clear();
        self.owners.clear();
        self.next_network_id = 0;
        self.membership.publish_all(&self.networks);
    }

    /// Forces every network to recompute its cached ceiling on the next tick.
    pub fn clear_high_power_cache(&mut self) {
        for network in self.networks.values_mut() {
            network.mark_dirty();
        }
    }

    /// # Errors
    /// Fails if the node is unknown.
    pub fn set_active(&mut self, id: NodeId, active: bool) -> Result<(), PowerGridError> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(PowerGridError::UnknownNode(id))?;
        node.set_active(active);
        Ok(())
    }

    /// Deposits into a transformer at its configured maximum rate. The energy
    /// joins its network's generation on the next settlement.
    ///
    /// # Errors
    /// Fails if the node is unknown or is not a transformer.
    pub fn accept_power(&mut self, id: NodeId, amount: f32) -> Result<f32, PowerGridError> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(PowerGridError::UnknownNode(id))?;
        let PowerRole::Transformer { max_deposit_rate } = *node.role() else {
            return Err(PowerGridError::NotATransformer(id));
        };
        Ok(node.accept_power(amount, max_deposit_rate))
    }

    pub fn networks(&self) -> impl Iterator<Item = &Network> {
        self.networks.values()
    }

    pub fn network(&self, id: NetworkId) -> Option<&Network> {
        self.networks.get(&id)
    }

    pub fn network_id_of(&self, node: NodeId) -> Option<NetworkId> {
        self.owners.get(&node).copied()
    }

    pub fn network_of(&self, node: NodeId) -> Option<&Network> {
        self.network_id_of(node)
            .and_then(|id| self.networks.get(&id))
    }

    pub fn node(&self, id: NodeId) -> Option<&PowerNode> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut PowerNode> {
        self.nodes.get_mut(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &PowerNode> {
        self.nodes.values()
    }

    pub fn is_powered(&self, id: NodeId) -> bool {
        self.nodes.get(&id).is_some_and(PowerNode::is_powered)
    }

    pub fn occupant(&self, coord: TileCoord) -> Option<NodeId> {
        self.topology.occupant(coord)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn network_count(&self) -> usize {
        self.networks.len()
    }

    /// Physical neighbors of a registered node, whether or not they are connected yet.
    pub fn find_adjacent(&self, id: NodeId) -> Vec<Adjacency> {
        self.nodes
            .get(&id)
            .map(|node| self.topology.find_adjacent(node, &self.nodes))
            .unwrap_or_default()
    }

    /// Handle for reading network membership from another thread.
    pub fn membership_handle(&self) -> MembershipHandle {
        self.membership.clone()
    }

    /// Neighbor -> link tier, keeping the strongest tier when two nodes meet
    /// through several dock pairs.
    pub(super) fn adjacent_links(&self, node: &PowerNode) -> BTreeMap<NodeId, NetworkStrength> {
        let mut links: BTreeMap<NodeId, NetworkStrength> = BTreeMap::new();
        for adjacency in self.topology.find_adjacent(node, &self.nodes) {
            let strength = adjacency.strength();
            links
                .entry(adjacency.neighbor)
                .and_modify(|existing| *existing = (*existing).max(strength))
                .or_insert(strength);
        }
        links
    }

    pub(super) fn allocate_network_id(&mut self) -> NetworkId {
        let id = NetworkId(self.next_network_id);
        self.next_network_id += 1;
        id
    }

    fn publish(&self, mutation: &Mutation) {
        self.membership
            .publish(&self.networks, &mutation.changed, &mutation.removed);
    }

    /// Full check of the partition: ownership, connectivity, and that every
    /// recorded edge still matches the physical dock layout.
    ///
    /// # Errors
    /// Returns the first violation found.
    pub fn verify_partition(&self) -> Result<(), InvariantViolation> {
        for id in self.nodes.keys() {
            let recorded = *self
                .owners
                .get(id)
                .ok_or(InvariantViolation::Unowned(*id))?;
            let network = self
                .networks
                .get(&recorded)
                .ok_or(InvariantViolation::MissingNetwork(recorded))?;
            if !network.contains(*id) {
                return Err(match self.networks.values().find(|n| n.contains(*id)) {
                    Some(found) => InvariantViolation::OwnerMismatch {
                        node: *id,
                        recorded,
                        found_in: found.id(),
                    },
                    None => InvariantViolation::Unowned(*id),
                });
            }
        }

        for (&network_id, network) in &self.networks {
            if network.is_empty() {
                return Err(InvariantViolation::EmptyNetwork(network_id));
            }
            let mut counted = 0;
            for member in network.members() {
                let node = self
                    .nodes
                    .get(&member)
                    .ok_or(InvariantViolation::UnknownMember {
                        network: network_id,
                        node: member,
                    })?;
                match self.owners.get(&member) {
                    Some(&recorded) if recorded == network_id => {}
                    Some(&recorded) => {
                        return Err(InvariantViolation::OwnerMismatch {
                            node: member,
                            recorded,
                            found_in: network_id,
                        })
                    }
                    None => return Err(InvariantViolation::Unowned(member)),
                }
                for (other, _) in network.neighbors(member) {
                    if !network.contains(other) {
                        return Err(InvariantViolation::CrossNetworkEdge {
                            network: network_id,
                            from: member,
                            to: other,
                        });
                    }
                    if network.neighbors(other).all(|(back, _)| back != member) {
                        return Err(InvariantViolation::AsymmetricEdge {
                            from: member,
                            to: other,
                        });
                    }
                    counted += 1;
                }
                let recorded: BTreeMap<_, _> = network.neighbors(member).collect();
                if recorded != self.adjacent_links(node) {
                    return Err(InvariantViolation::StaleEdges(member));
                }
            }
            if counted / 2 != network.edge_count() {
                return Err(InvariantViolation::EdgeCountDrift {
                    network: network_id,
                    recorded: network.edge_count(),
                    counted: counted / 2,
                });
            }
            let reached = reachable_from_first(network);
            if reached != network.len() {
                return Err(InvariantViolation::Disconnected {
                    network: network_id,
                    reached,
                    members: network.len(),
                });
            }
        }
        Ok(())
    }
}

fn reachable_from_first(network: &Network) -> usize {
    let Some(start) = network.members().next() else {
        return 0;
    };
    let mut visited = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
        for (next, _) in network.neighbors(current) {
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }
    visited.len()
}
