use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;

use super::{Network, NetworkId, NodeId};

/// Network membership as seen by a background reader, e.g. the autosave writer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MembershipSnapshot {
    pub networks: BTreeMap<NetworkId, Vec<NodeId>>,
}

impl MembershipSnapshot {
    pub fn node_count(&self) -> usize {
        self.networks.values().map(Vec::len).sum()
    }

    pub fn network_of(&self, node: NodeId) -> Option<NetworkId> {
        self.networks
            .iter()
            .find(|(_, members)| members.binary_search(&node).is_ok())
            .map(|(&id, _)| id)
    }
}

/// Shared, lock-guarded copy of the grid's membership. The simulation thread
/// writes it while applying a structural change; other threads only read.
#[derive(Clone, Debug, Default)]
pub struct MembershipHandle {
    inner: Arc<RwLock<MembershipSnapshot>>,
}

impl MembershipHandle {
    /// Consistent copy of the current membership. Never observes a half-applied
    /// merge or split.
    pub fn snapshot(&self) -> MembershipSnapshot {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Rewrites the entries of `changed` and drops `removed`, under one write lock.
    pub(crate) fn publish(
        &self,
        networks: &BTreeMap<NetworkId, Network>,
        changed: &[NetworkId],
        removed: &[NetworkId],
    ) {
        let mut table = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        for id in removed {
            table.networks.remove(id);
        }
        for id in changed {
            match networks.get(id) {
                Some(network) => {
                    table.networks.insert(*id, network.members().collect());
                }
                None => {
                    table.networks.remove(id);
                }
            }
        }
    }

    pub(crate) fn publish_all(&self, networks: &BTreeMap<NetworkId, Network>) {
        let mut table = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        table.networks = networks
            .iter()
            .map(|(&id, network)| (id, network.members().collect()))
            .collect();
    }
}
