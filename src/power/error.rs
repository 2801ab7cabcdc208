use super::{NetworkId, NodeId};
use crate::grid::TileCoord;

#[derive(Debug, Clone, PartialEq)]
pub enum PowerGridError {
    DuplicateNode(NodeId),
    UnknownNode(NodeId),
    TileOccupied { coord: TileCoord, occupant: NodeId },
    NoPowerDocks(NodeId),
    NotATransformer(NodeId),
    Invariant(InvariantViolation),
}

impl std::fmt::Display for PowerGridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PowerGridError::DuplicateNode(id) => write!(f, "{id} is already registered"),
            PowerGridError::UnknownNode(id) => write!(f, "{id} is not registered"),
            PowerGridError::TileOccupied { coord, occupant } => {
                write!(f, "tile {coord} is already occupied by {occupant}")
            }
            PowerGridError::NoPowerDocks(id) => write!(f, "{id} has no power docks"),
            PowerGridError::NotATransformer(id) => write!(f, "{id} cannot accept deposits"),
            PowerGridError::Invariant(violation) => {
                write!(f, "power grid invariant violated: {violation}")
            }
        }
    }
}

impl std::error::Error for PowerGridError {}

impl From<InvariantViolation> for PowerGridError {
    fn from(violation: InvariantViolation) -> Self {
        PowerGridError::Invariant(violation)
    }
}

/// Internal consistency failures. None of these can happen unless the
/// connectivity bookkeeping itself is broken.
#[derive(Debug, Clone, PartialEq)]
pub enum InvariantViolation {
    Unowned(NodeId),
    OwnerMismatch {
        node: NodeId,
        recorded: NetworkId,
        found_in: NetworkId,
    },
    MissingNetwork(NetworkId),
    EmptyNetwork(NetworkId),
    UnknownMember {
        network: NetworkId,
        node: NodeId,
    },
    Disconnected {
        network: NetworkId,
        reached: usize,
        members: usize,
    },
    AsymmetricEdge {
        from: NodeId,
        to: NodeId,
    },
    CrossNetworkEdge {
        network: NetworkId,
        from: NodeId,
        to: NodeId,
    },
    StaleEdges(NodeId),
    EdgeCountDrift {
        network: NetworkId,
        recorded: usize,
        counted: usize,
    },
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvariantViolation::Unowned(node) => write!(f, "{node} belongs to no network"),
            InvariantViolation::OwnerMismatch {
                node,
                recorded,
                found_in,
            } => write!(f, "{node} is indexed under {recorded} but is a member of {found_in}"),
            InvariantViolation::MissingNetwork(network) => {
                write!(f, "{network} is referenced but does not exist")
            }
            InvariantViolation::EmptyNetwork(network) => write!(f, "{network} has no members"),
            InvariantViolation::UnknownMember { network, node } => {
                write!(f, "{network} lists unregistered {node}")
            }
            InvariantViolation::Disconnected {
                network,
                reached,
                members,
            } => write!(f, "{network} reaches only {reached} of {members} members"),
            InvariantViolation::AsymmetricEdge { from, to } => {
                write!(f, "edge {from} -> {to} has no reverse entry")
            }
            InvariantViolation::CrossNetworkEdge { network, from, to } => {
                write!(f, "{network} holds edge {from} -> {to} leaving the network")
            }
            InvariantViolation::StaleEdges(node) => {
                write!(f, "edges of {node} do not match its physical neighbors")
            }
            InvariantViolation::EdgeCountDrift {
                network,
                recorded,
                counted,
            } => write!(f, "{network} records {recorded} edges but holds {counted}"),
        }
    }
}

impl std::error::Error for InvariantViolation {}
