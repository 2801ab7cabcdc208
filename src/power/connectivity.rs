//! Incremental maintenance of the network partition.
//!
//! Placing a node unions the networks around it (weighted: the largest network
//! absorbs the rest). Removing a node flood-fills from its former neighbors,
//! inside the network it left only, to find out whether the network fell apart.

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use bevy::prelude::*;

use super::grid::PowerGrid;
use super::{InvariantViolation, Network, NetworkId, NetworkStrength, NodeId, PowerGridError};

/// Networks touched by one structural change.
#[derive(Debug, Default)]
pub(super) struct Mutation {
    pub changed: Vec<NetworkId>,
    pub removed: Vec<NetworkId>,
}

impl PowerGrid {
    /// Attaches an already claimed node to the networks of its connected
    /// neighbors. Neighbors that are not connected yet are skipped; they pick up
    /// the edge when their own turn comes.
    pub(super) fn connect(&mut self, id: NodeId) -> Result<(NetworkId, Mutation), PowerGridError> {
        let node = self.nodes.get(&id).ok_or(PowerGridError::UnknownNode(id))?;
        let links: BTreeMap<NodeId, NetworkStrength> = self
            .adjacent_links(node)
            .into_iter()
            .filter(|(neighbor, _)| self.owners.contains_key(neighbor))
            .collect();
        let touched: Vec<NetworkId> = links
            .keys()
            .filter_map(|neighbor| self.owners.get(neighbor).copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut mutation = Mutation::default();
        let target = match touched.as_slice() {
            [] => {
                let created = self.allocate_network_id();
                self.networks.insert(created, Network::new(created));
                debug!("{id} starts {created}");
                created
            }
            [only] => *only,
            several => self.merge_networks(several, &mut mutation)?,
        };

        let network = self
            .networks
            .get_mut(&target)
            .ok_or(InvariantViolation::MissingNetwork(target))?;
        network.insert_member(id);
        for (&neighbor, &strength) in &links {
            network.link(id, neighbor, strength);
        }
        self.owners.insert(id, target);
        mutation.changed.push(target);
        Ok((target, mutation))
    }

    /// Folds `touched` into the one with the most members (lowest id on ties).
    fn merge_networks(
        &mut self,
        touched: &[NetworkId],
        mutation: &mut Mutation,
    ) -> Result<NetworkId, PowerGridError> {
        let mut survivor: Option<(usize, NetworkId)> = None;
        for &candidate in touched {
            let len = self
                .networks
                .get(&candidate)
                .ok_or(InvariantViolation::MissingNetwork(candidate))?
                .len();
            survivor = match survivor {
                Some((best, best_id)) if best >= len => Some((best, best_id)),
                _ => Some((len, candidate)),
            };
        }
        let Some((_, survivor)) = survivor else {
            return Err(PowerGridError::Invariant(InvariantViolation::MissingNetwork(
                NetworkId(u32::MAX),
            )));
        };

        for &absorbed_id in touched {
            if absorbed_id == survivor {
                continue;
            }
            let absorbed = self
                .networks
                .remove(&absorbed_id)
                .ok_or(InvariantViolation::MissingNetwork(absorbed_id))?;
            for member in absorbed.members() {
                self.owners.insert(member, survivor);
            }
            debug!(
                "{absorbed_id} ({} members) merges into {survivor}",
                absorbed.len()
            );
            self.networks
                .get_mut(&survivor)
                .ok_or(InvariantViolation::MissingNetwork(survivor))?
                .absorb(absorbed);
            mutation.removed.push(absorbed_id);
        }
        Ok(survivor)
    }

    /// Detaches a node that has already left the topology index and splits its
    /// former network into connected pieces. The largest piece keeps the
    /// network's identity.
    pub(super) fn disconnect(&mut self, id: NodeId) -> Result<Mutation, PowerGridError> {
        let network_id = self
            .owners
            .remove(&id)
            .ok_or(InvariantViolation::Unowned(id))?;
        let mut network = self
            .networks
            .remove(&network_id)
            .ok_or(InvariantViolation::MissingNetwork(network_id))?;
        let frontier = network.remove_member(id);

        let mut mutation = Mutation::default();
        if network.is_empty() {
            debug!("{network_id} lost its last member {id}");
            mutation.removed.push(network_id);
            return Ok(mutation);
        }

        // A leaf (or a node with no edges) cannot disconnect anything.
        let components = if frontier.len() > 1 {
            flood_components(&network, &frontier)
        } else {
            Vec::new()
        };

        if components.len() > 1 {
            let keep = largest_component(&components);
            for (index, component) in components.iter().enumerate() {
                if index == keep || component.is_empty() {
                    continue;
                }
                let split_id = self.allocate_network_id();
                let split = network.split_off(component, split_id);
                for member in split.members() {
                    self.owners.insert(member, split_id);
                }
                debug!(
                    "removing {id} split {split_id} ({} members) off {network_id}",
                    split.len()
                );
                self.networks.insert(split_id, split);
                mutation.changed.push(split_id);
            }
        }

        self.networks.insert(network_id, network);
        mutation.changed.push(network_id);
        Ok(mutation)
    }
}

/// Connected pieces of `network` reachable from `frontier`. Stops early once a
/// single piece already covers every member.
fn flood_components(network: &Network, frontier: &[NodeId]) -> Vec<BTreeSet<NodeId>> {
    let mut visited = HashSet::new();
    let mut components = Vec::new();
    for &start in frontier {
        if !network.contains(start) || !visited.insert(start) {
            continue;
        }
        let mut component = BTreeSet::new();
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            component.insert(current);
            for (next, _) in network.neighbors(current) {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        let covers_all = component.len() == network.len();
        components.push(component);
        if covers_all {
            break;
        }
    }
    components
}

/// Index of the component with the most members, lowest member id on ties.
fn largest_component(components: &[BTreeSet<NodeId>]) -> usize {
    components
        .iter()
        .enumerate()
        .max_by(|(_, left), (_, right)| {
            left.len()
                .cmp(&right.len())
                .then_with(|| right.first().cmp(&left.first()))
        })
        .map_or(0, |(index, _)| index)
}
