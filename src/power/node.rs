use serde::{Deserialize, Serialize};

use crate::grid::TileCoord;
use crate::structures::Dock;

/// Stable identity of a structure taking part in the power graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// What a structure does with power. Rates are in power units per second,
/// storage amounts in power units.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PowerRole {
    Generator {
        rate: f32,
    },
    Consumer {
        demand: f32,
    },
    Storage {
        capacity: f32,
        max_discharge: f32,
        #[serde(default)]
        charge: f32,
    },
    Transformer {
        max_deposit_rate: f32,
    },
    Relay,
}

impl PowerRole {
    pub fn label(&self) -> &'static str {
        match self {
            PowerRole::Generator { .. } => "generator",
            PowerRole::Consumer { .. } => "consumer",
            PowerRole::Storage { .. } => "storage",
            PowerRole::Transformer { .. } => "transformer",
            PowerRole::Relay => "relay",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PowerNode {
    id: NodeId,
    origin: TileCoord,
    footprint: Vec<(i32, i32)>,
    docks: Vec<Dock>,
    role: PowerRole,
    active: bool,
    powered: bool,
    pending_deposit: f32,
}

impl PowerNode {
    pub fn new(id: NodeId, origin: TileCoord, role: PowerRole) -> Self {
        Self {
            id,
            origin,
            footprint: vec![(0, 0)],
            docks: Vec::new(),
            role,
            active: true,
            powered: false,
            pending_deposit: 0.0,
        }
    }

    /// Non-power docks are dropped; the engine never looks at them.
    #[must_use]
    pub fn with_docks(mut self, docks: impl IntoIterator<Item = Dock>) -> Self {
        self.docks
            .extend(docks.into_iter().filter(|dock| dock.kind.is_power()));
        self
    }

    #[must_use]
    pub fn with_footprint(mut self, footprint: Vec<(i32, i32)>) -> Self {
        if !footprint.is_empty() {
            self.footprint = footprint;
        }
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn origin(&self) -> TileCoord {
        self.origin
    }

    pub fn role(&self) -> &PowerRole {
        &self.role
    }

    pub fn power_docks(&self) -> &[Dock] {
        &self.docks
    }

    pub fn has_power_docks(&self) -> bool {
        !self.docks.is_empty()
    }

    /// Tiles covered by this structure.
    pub fn tiles(&self) -> impl Iterator<Item = TileCoord> + '_ {
        self.footprint
            .iter()
            .map(|&(dx, dy)| self.origin.offset(dx, dy))
    }

    pub fn dock_tile(&self, dock: &Dock) -> TileCoord {
        self.origin.offset(dock.offset.0, dock.offset.1)
    }

    pub fn is_shaft(&self) -> bool {
        self.docks.iter().any(|dock| dock.facing.is_vertical())
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    pub(crate) fn set_powered(&mut self, powered: bool) {
        self.powered = powered;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Generators out of fuel and idle consumers are inactive and contribute
    /// nothing to their network's totals.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn rated_generation(&self) -> f32 {
        match self.role {
            PowerRole::Generator { rate } if self.active => rate,
            _ => 0.0,
        }
    }

    pub fn rated_demand(&self) -> f32 {
        match self.role {
            PowerRole::Consumer { demand } if self.active => demand,
            _ => 0.0,
        }
    }

    pub fn storage_charge(&self) -> Option<f32> {
        match self.role {
            PowerRole::Storage { charge, .. } => Some(charge),
            _ => None,
        }
    }

    pub fn pending_deposit(&self) -> f32 {
        self.pending_deposit
    }

    /// Injects `amount` into a transformer, capped at `max_rate` per call.
    /// Returns what was accepted; anything that is not a transformer accepts nothing.
    pub fn accept_power(&mut self, amount: f32, max_rate: f32) -> f32 {
        if !matches!(self.role, PowerRole::Transformer { .. }) {
            return 0.0;
        }
        let accepted = amount.min(max_rate).max(0.0);
        self.pending_deposit += accepted;
        accepted
    }

    pub(crate) fn take_deposit(&mut self) -> f32 {
        std::mem::take(&mut self.pending_deposit)
    }

    /// Most energy storage could release over `dt`, without drawing it.
    pub fn dischargeable(&self, dt: f32) -> f32 {
        match self.role {
            PowerRole::Storage {
                max_discharge,
                charge,
                ..
            } => charge.min(max_discharge * dt).max(0.0),
            _ => 0.0,
        }
    }

    /// Draws up to `requested` from storage, limited by charge and by the
    /// discharge rate over `dt`. Returns the energy drawn.
    pub(crate) fn discharge(&mut self, requested: f32, dt: f32) -> f32 {
        let PowerRole::Storage {
            max_discharge,
            charge,
            ..
        } = &mut self.role
        else {
            return 0.0;
        };
        let drawn = requested.min(*charge).min(*max_discharge * dt).max(0.0);
        *charge -= drawn;
        drawn
    }

    /// Stores up to `offered` until full. Returns the energy stored.
    pub(crate) fn charge(&mut self, offered: f32) -> f32 {
        let PowerRole::Storage {
            capacity, charge, ..
        } = &mut self.role
        else {
            return 0.0;
        };
        let stored = offered.min(*capacity - *charge).max(0.0);
        *charge += stored;
        stored
    }
}
