mod connectivity;
mod error;
mod grid;
mod network;
mod node;
mod settlement;
mod snapshot;
mod spanning_tree;
mod strength;
mod topology;


pub use error::{InvariantViolation, PowerGridError};
pub use grid::PowerGrid;
pub use network::{Edge, Network, NetworkId, SettlementReport};
pub use node::{NodeId, PowerNode, PowerRole};
pub use snapshot::{MembershipHandle, MembershipSnapshot};
pub use strength::NetworkStrength;
pub use topology::{Adjacency, TopologyIndex};
