use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::{rotate_offset, Dock, Facing};
use crate::grid::TileCoord;
use crate::power::{NodeId, PowerNode, PowerRole};

fn single_tile() -> Vec<(i32, i32)> {
    vec![(0, 0)]
}

fn default_color() -> (f32, f32, f32) {
    (0.5, 0.5, 0.5)
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StructureDef {
    pub name: String,
    #[serde(default = "single_tile")]
    pub footprint: Vec<(i32, i32)>,
    #[serde(default)]
    pub docks: Vec<Dock>,
    #[serde(default)]
    pub power: Option<PowerRole>,
    #[serde(default = "default_color")]
    pub color: (f32, f32, f32),
}

impl StructureDef {
    pub fn power_docks(&self) -> impl Iterator<Item = &Dock> {
        self.docks.iter().filter(|dock| dock.kind.is_power())
    }

    /// Footprint offsets after `rotation` clockwise quarter turns.
    pub fn rotated_footprint(&self, rotation: u8) -> Vec<(i32, i32)> {
        self.footprint
            .iter()
            .map(|&offset| rotate_offset(offset, rotation))
            .collect()
    }

    pub fn tiles(&self, origin: TileCoord, rotation: u8) -> Vec<TileCoord> {
        self.rotated_footprint(rotation)
            .into_iter()
            .map(|(dx, dy)| origin.offset(dx, dy))
            .collect()
    }

    /// Builds the engine-side node for this structure, or `None` when the
    /// structure takes no part in the power grid.
    pub fn power_node(&self, id: NodeId, origin: TileCoord, rotation: u8) -> Option<PowerNode> {
        let role = self.power.clone()?;
        Some(
            PowerNode::new(id, origin, role)
                .with_footprint(self.rotated_footprint(rotation))
                .with_docks(self.power_docks().map(|dock| dock.rotated(rotation))),
        )
    }

    pub fn validate(&self) -> Result<(), SchemaError> {
        let name = &self.name;
        if self.footprint.is_empty() {
            return Err(SchemaError::EmptyFootprint(name.clone()));
        }

        let mut seen = HashSet::new();
        for dock in &self.docks {
            if !seen.insert((dock.offset, dock.facing)) {
                return Err(SchemaError::DuplicateDock {
                    structure: name.clone(),
                    offset: dock.offset,
                    facing: dock.facing,
                });
            }
            if !self.footprint.contains(&dock.offset) {
                return Err(SchemaError::DockOutsideFootprint {
                    structure: name.clone(),
                    offset: dock.offset,
                });
            }
        }

        let has_power_docks = self.power_docks().next().is_some();
        match (&self.power, has_power_docks) {
            (Some(_), false) => return Err(SchemaError::RoleWithoutPowerDocks(name.clone())),
            (None, true) => return Err(SchemaError::PowerDocksWithoutRole(name.clone())),
            _ => {}
        }
        if let Some(role) = &self.power {
            validate_role(name, role)?;
        }

        let vertical_kind = |facing: Facing| {
            self.power_docks()
                .find(|dock| dock.facing == facing)
                .map(|dock| dock.kind)
        };
        if let (Some(up), Some(down)) = (vertical_kind(Facing::Up), vertical_kind(Facing::Down)) {
            if up != down {
                return Err(SchemaError::MismatchedShaftDocks(name.clone()));
            }
        }
        Ok(())
    }
}

fn validate_role(name: &str, role: &PowerRole) -> Result<(), SchemaError> {
    let check = |field: &'static str, value: f32| {
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(SchemaError::InvalidRate {
                structure: name.to_string(),
                field,
                value,
            })
        }
    };
    match *role {
        PowerRole::Generator { rate } => check("rate", rate),
        PowerRole::Consumer { demand } => check("demand", demand),
        PowerRole::Storage {
            capacity,
            max_discharge,
            charge,
        } => {
            check("capacity", capacity)?;
            check("max_discharge", max_discharge)?;
            check("charge", charge)?;
            if capacity <= 0.0 {
                return Err(SchemaError::NonPositiveCapacity {
                    structure: name.to_string(),
                    capacity,
                });
            }
            if charge > capacity {
                return Err(SchemaError::InvalidRate {
                    structure: name.to_string(),
                    field: "charge",
                    value: charge,
                });
            }
            Ok(())
        }
        PowerRole::Transformer { max_deposit_rate } => check("max_deposit_rate", max_deposit_rate),
        PowerRole::Relay => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaError {
    DuplicateName(String),
    EmptyFootprint(String),
    DuplicateDock {
        structure: String,
        offset: (i32, i32),
        facing: Facing,
    },
    DockOutsideFootprint {
        structure: String,
        offset: (i32, i32),
    },
    RoleWithoutPowerDocks(String),
    PowerDocksWithoutRole(String),
    InvalidRate {
        structure: String,
        field: &'static str,
        value: f32,
    },
    NonPositiveCapacity {
        structure: String,
        capacity: f32,
    },
    MismatchedShaftDocks(String),
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaError::DuplicateName(name) => write!(f, "structure '{name}' is defined twice"),
            SchemaError::EmptyFootprint(name) => write!(f, "'{name}' covers no tiles"),
            SchemaError::DuplicateDock {
                structure,
                offset,
                facing,
            } => write!(f, "'{structure}' has two docks at {offset:?} facing {facing:?}"),
            SchemaError::DockOutsideFootprint { structure, offset } => {
                write!(f, "'{structure}' has a dock at {offset:?}, outside its footprint")
            }
            SchemaError::RoleWithoutPowerDocks(name) => {
                write!(f, "'{name}' has a power role but no power docks")
            }
            SchemaError::PowerDocksWithoutRole(name) => {
                write!(f, "'{name}' has power docks but no power role")
            }
            SchemaError::InvalidRate {
                structure,
                field,
                value,
            } => write!(f, "'{structure}' has invalid {field} {value}"),
            SchemaError::NonPositiveCapacity {
                structure,
                capacity,
            } => write!(f, "'{structure}' stores at most {capacity}, must be positive"),
            SchemaError::MismatchedShaftDocks(name) => {
                write!(f, "'{name}' has Up and Down docks of different types")
            }
        }
    }
}

impl std::error::Error for SchemaError {}

/// Structure definitions loaded from RON and validated at startup.
#[derive(Resource, Debug)]
pub struct StructureRegistry {
    definitions: HashMap<String, StructureDef>,
}

impl StructureRegistry {
    pub fn from_ron(ron_content: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let definitions_vec: Vec<StructureDef> = ron::from_str(ron_content)?;
        Ok(Self::from_definitions(definitions_vec)?)
    }

    pub fn from_definitions(
        definitions_vec: impl IntoIterator<Item = StructureDef>,
    ) -> Result<Self, SchemaError> {
        let mut definitions = HashMap::new();
        for def in definitions_vec {
            def.validate()?;
            if definitions.contains_key(&def.name) {
                return Err(SchemaError::DuplicateName(def.name));
            }
            definitions.insert(def.name.clone(), def);
        }
        Ok(Self { definitions })
    }

    /// Load structure definitions from embedded assets.
    ///
    /// # Errors
    /// Returns an error if the embedded RON content fails to parse or validate.
    pub fn load_from_assets() -> Result<Self, Box<dyn std::error::Error>> {
        let ron_content = include_str!("assets/structures.ron");
        Self::from_ron(ron_content)
    }

    pub fn get_definition(&self, name: &str) -> Option<&StructureDef> {
        self.definitions.get(name)
    }

    /// Structure names in alphabetical order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

pub fn setup_registry(mut commands: Commands, mut exit: MessageWriter<AppExit>) {
    match StructureRegistry::load_from_assets() {
        Ok(registry) => {
            info!("Loaded {} structure definitions", registry.len());
            commands.insert_resource(registry);
        }
        Err(err) => {
            error!("Failed to load structure definitions: {err}");
            exit.write(AppExit::error());
        }
    }
}
