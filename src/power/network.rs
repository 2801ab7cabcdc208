use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::{NetworkStrength, NodeId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NetworkId(pub u32);

impl std::fmt::Display for NetworkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "network#{}", self.0)
    }
}

/// Undirected link between two nodes; `a < b` always.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Edge {
    pub a: NodeId,
    pub b: NodeId,
    pub strength: NetworkStrength,
}

impl Edge {
    pub fn new(x: NodeId, y: NodeId, strength: NetworkStrength) -> Self {
        let (a, b) = if x <= y { (x, y) } else { (y, x) };
        Self { a, b, strength }
    }

    pub fn capacity(&self) -> f32 {
        self.strength.max_power_per_second()
    }

    pub fn touches(&self, id: NodeId) -> bool {
        self.a == id || self.b == id
    }
}

/// Outcome of the last settlement of a network. Rates are per second, the rest
/// is energy for that tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SettlementReport {
    pub generation: f32,
    pub demand: f32,
    pub ceiling: f32,
    pub available: f32,
    pub delivered: f32,
    pub drained: f32,
    pub stored: f32,
    pub wasted: f32,
    pub deficit: f32,
    pub unserved: f32,
    pub powered_consumers: usize,
    pub unpowered_consumers: usize,
}

/// A maximal connected set of power nodes.
///
/// Membership and edges live in a single adjacency map: every member is a key,
/// and each edge is recorded under both of its endpoints.
#[derive(Clone, Debug)]
pub struct Network {
    id: NetworkId,
    links: BTreeMap<NodeId, BTreeMap<NodeId, NetworkStrength>>,
    edge_count: usize,
    ceiling: f32,
    dirty: bool,
    last_settlement: SettlementReport,
}

impl Network {
    pub(crate) fn new(id: NetworkId) -> Self {
        Self {
            id,
            links: BTreeMap::new(),
            edge_count: 0,
            ceiling: f32::INFINITY,
            dirty: true,
            last_settlement: SettlementReport::default(),
        }
    }

    pub fn id(&self) -> NetworkId {
        self.id
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.links.contains_key(&id)
    }

    /// Members in ascending id order.
    pub fn members(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.links.keys().copied()
    }

    pub fn neighbors(&self, id: NodeId) -> impl Iterator<Item = (NodeId, NetworkStrength)> + '_ {
        self.links
            .get(&id)
            .into_iter()
            .flat_map(|linked| linked.iter().map(|(&other, &strength)| (other, strength)))
    }

    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.links.iter().flat_map(|(&a, linked)| {
            linked
                .range(a..)
                .map(move |(&b, &strength)| Edge::new(a, b, strength))
        })
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Weakest tier capacity among the current edges. Unlimited without edges.
    pub fn ceiling_capacity(&self) -> f32 {
        if self.dirty {
            self.compute_ceiling()
        } else {
            self.ceiling
        }
    }

    pub fn weakest_link(&self) -> Option<NetworkStrength> {
        self.links
            .values()
            .flat_map(BTreeMap::values)
            .copied()
            .min()
    }

    pub fn last_settlement(&self) -> &SettlementReport {
        &self.last_settlement
    }

    pub(crate) fn refresh_cache(&mut self) {
        if self.dirty {
            self.ceiling = self.compute_ceiling();
            self.dirty = false;
        }
    }

    pub(crate) fn record_settlement(&mut self, report: SettlementReport) {
        self.last_settlement = report;
    }

    fn compute_ceiling(&self) -> f32 {
        self.weakest_link()
            .map_or(f32::INFINITY, NetworkStrength::max_power_per_second)
    }

    pub(crate) fn insert_member(&mut self, id: NodeId) {
        self.links.entry(id).or_default();
        self.dirty = true;
    }

    /// Records an edge between two members. A pair linked through several dock
    /// pairs keeps its strongest tier.
    pub(crate) fn link(&mut self, x: NodeId, y: NodeId, strength: NetworkStrength) {
        if x == y {
            return;
        }
        let previous = self.links.entry(x).or_default().get(&y).copied();
        let strength = previous.map_or(strength, |existing| existing.max(strength));
        self.links.entry(x).or_default().insert(y, strength);
        self.links.entry(y).or_default().insert(x, strength);
        if previous.is_none() {
            self.edge_count += 1;
        }
        self.dirty = true;
    }

    /// Drops `id` and all of its edges, returning its former neighbors in
    /// ascending order.
    pub(crate) fn remove_member(&mut self, id: NodeId) -> Vec<NodeId> {
        let Some(linked) = self.links.remove(&id) else {
            return Vec::new();
        };
        for other in linked.keys() {
            if let Some(back) = self.links.get_mut(other) {
                back.remove(&id);
            }
        }
        self.edge_count -= linked.len();
        self.dirty = true;
        linked.into_keys().collect()
    }

    /// Moves every member and edge of `other` into this network.
    pub(crate) fn absorb(&mut self, other: Network) {
        self.edge_count += other.edge_count;
        for (id, linked) in other.links {
            self.links.entry(id).or_default().extend(linked);
        }
        self.dirty = true;
    }

    /// Moves `component` (which must share no edge with the remaining members)
    /// into a new network called `id`.
    pub(crate) fn split_off(&mut self, component: &BTreeSet<NodeId>, id: NetworkId) -> Network {
        let mut split = Network::new(id);
        for member in component {
            if let Some(linked) = self.links.remove(member) {
                split.edge_count += linked.len();
                split.links.insert(*member, linked);
            }
        }
        split.edge_count /= 2;
        self.edge_count -= split.edge_count;
        self.dirty = true;
        split
    }
}
