/// Tile kinds and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum TileKind {
    Wall,
    #[default]
    Floor,
    SmallItem,      // '.'
    LargeItem,      // 'o'
    Gate,           // Locked until the exit is unlocked
    PlayerSpawn,
    AdversarySpawn,
}

impl TileKind {
    /// Map a layout character to its tile kind. Unknown characters are floor.
    pub fn from_char(c: char) -> Self {
        match c {
            '#' => TileKind::Wall,
            '.' => TileKind::SmallItem,
            'o' => TileKind::LargeItem,
            'G' => TileKind::Gate,
            'P' => TileKind::PlayerSpawn,
            'M' => TileKind::AdversarySpawn,
            _ => TileKind::Floor,
        }
    }

    pub fn is_wall(self) -> bool {
        matches!(self, TileKind::Wall)
    }

    /// Can an entity occupy this tile, given the current gate state?
    pub fn is_passable(self, gates_open: bool) -> bool {
        match self {
            TileKind::Wall => false,
            TileKind::Gate => gates_open,
            _ => true,
        }
    }
}
