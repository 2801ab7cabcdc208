use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Facing {
    North,
    East,
    South,
    West,
    Up,
    Down,
}

impl Facing {
    pub const HORIZONTAL: [Facing; 4] = [Facing::North, Facing::East, Facing::South, Facing::West];

    pub fn opposite(self) -> Self {
        match self {
            Facing::North => Facing::South,
            Facing::East => Facing::West,
            Facing::South => Facing::North,
            Facing::West => Facing::East,
            Facing::Up => Facing::Down,
            Facing::Down => Facing::Up,
        }
    }

    /// `(dx, dy, dlayer)` of the tile this facing looks at. `y` grows northwards.
    pub fn delta(self) -> (i32, i32, i32) {
        match self {
            Facing::North => (0, 1, 0),
            Facing::East => (1, 0, 0),
            Facing::South => (0, -1, 0),
            Facing::West => (-1, 0, 0),
            Facing::Up => (0, 0, 1),
            Facing::Down => (0, 0, -1),
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Facing::Up | Facing::Down)
    }

    /// Clockwise quarter turns. Vertical facings are unaffected.
    pub fn rotated(self, quarter_turns: u8) -> Self {
        let mut facing = self;
        for _ in 0..quarter_turns % 4 {
            facing = match facing {
                Facing::North => Facing::East,
                Facing::East => Facing::South,
                Facing::South => Facing::West,
                Facing::West => Facing::North,
                vertical => vertical,
            };
        }
        facing
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DockType {
    Item,
    Power,
    BigPower,
}

impl DockType {
    pub fn is_power(self) -> bool {
        matches!(self, DockType::Power | DockType::BigPower)
    }
}

/// A connection point on a structure, relative to the structure's origin tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dock {
    #[serde(default)]
    pub offset: (i32, i32),
    pub facing: Facing,
    pub kind: DockType,
}

impl Dock {
    pub const fn new(offset: (i32, i32), facing: Facing, kind: DockType) -> Self {
        Self {
            offset,
            facing,
            kind,
        }
    }

    /// One dock of `kind` on every horizontal side of a single-tile structure.
    pub fn all_sides(kind: DockType) -> Vec<Dock> {
        Facing::HORIZONTAL
            .iter()
            .map(|&facing| Dock::new((0, 0), facing, kind))
            .collect()
    }

    pub fn rotated(self, quarter_turns: u8) -> Self {
        Self {
            offset: rotate_offset(self.offset, quarter_turns),
            facing: self.facing.rotated(quarter_turns),
            kind: self.kind,
        }
    }
}

pub fn rotate_offset(offset: (i32, i32), quarter_turns: u8) -> (i32, i32) {
    let (mut x, mut y) = offset;
    for _ in 0..quarter_turns % 4 {
        (x, y) = (y, -x);
    }
    (x, y)
}
