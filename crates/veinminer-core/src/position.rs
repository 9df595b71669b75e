//! Block positions and the six axis-aligned faces.

use std::fmt;

use serde::{Deserialize, Serialize};

const XZ_BITS: u32 = 27;
const Y_BITS: u32 = 64 - 2 * XZ_BITS; // 10
const XZ_MASK: u64 = (1 << XZ_BITS) - 1;
const Y_MASK: u64 = (1 << Y_BITS) - 1;

/// A set of x, y and z block coordinates in a world.
///
/// Positions pack into a single `u64` for hashing and wire transfer: `x` in
/// the low 27 bits, `z` in the next 27 bits and `y` in the top 10 bits, each
/// two's-complement within its field. The supported range is therefore
/// `-2^26 <= x, z < 2^26` and `-512 <= y < 512`; [`BlockPosition::unpack`] is
/// the exact inverse of [`BlockPosition::pack`] over that range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPosition {
    /// Smallest supported x/z coordinate.
    pub const MIN_XZ: i32 = -(1 << (XZ_BITS - 1));
    /// Largest supported x/z coordinate.
    pub const MAX_XZ: i32 = (1 << (XZ_BITS - 1)) - 1;
    /// Smallest supported y coordinate.
    pub const MIN_Y: i32 = -(1 << (Y_BITS - 1));
    /// Largest supported y coordinate.
    pub const MAX_Y: i32 = (1 << (Y_BITS - 1)) - 1;

    /// Creates a position at the given coordinates.
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Returns a new position offset by the given deltas.
    #[inline]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Returns the position adjacent to this one in the direction of `face`.
    #[inline]
    pub const fn relative(self, face: BlockFace) -> Self {
        let (dx, dy, dz) = face.offsets();
        self.offset(dx, dy, dz)
    }

    /// Squared euclidean distance to another position.
    pub fn distance_squared(self, other: Self) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        let dz = (self.z - other.z) as i64;
        dx * dx + dy * dy + dz * dz
    }

    /// Packs the coordinates into a single `u64`.
    #[inline]
    pub const fn pack(self) -> u64 {
        (self.x as u64 & XZ_MASK)
            | ((self.z as u64 & XZ_MASK) << XZ_BITS)
            | ((self.y as u64 & Y_MASK) << (2 * XZ_BITS))
    }

    /// Unpacks a position previously packed with [`BlockPosition::pack`].
    #[inline]
    pub const fn unpack(packed: u64) -> Self {
        Self::new(
            sign_extend(packed & XZ_MASK, XZ_BITS),
            sign_extend((packed >> (2 * XZ_BITS)) & Y_MASK, Y_BITS),
            sign_extend((packed >> XZ_BITS) & XZ_MASK, XZ_BITS),
        )
    }
}

impl fmt::Display for BlockPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl From<(i32, i32, i32)> for BlockPosition {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Self::new(x, y, z)
    }
}

#[inline]
const fn sign_extend(value: u64, bits: u32) -> i32 {
    ((value << (64 - bits)) as i64 >> (64 - bits)) as i32
}

/// One of the six axis-aligned block faces.
///
/// [`BlockFace::ALL`] fixes the neighbor visitation order used by the search
/// patterns: -X, +X, -Y, +Y, -Z, +Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockFace {
    /// -X
    West,
    /// +X
    East,
    /// -Y
    Down,
    /// +Y
    Up,
    /// -Z
    North,
    /// +Z
    South,
}

impl BlockFace {
    /// All faces, in deterministic search order.
    pub const ALL: [BlockFace; 6] = [
        BlockFace::West,
        BlockFace::East,
        BlockFace::Down,
        BlockFace::Up,
        BlockFace::North,
        BlockFace::South,
    ];

    /// The (dx, dy, dz) offsets of this face.
    #[inline]
    pub const fn offsets(self) -> (i32, i32, i32) {
        match self {
            BlockFace::West => (-1, 0, 0),
            BlockFace::East => (1, 0, 0),
            BlockFace::Down => (0, -1, 0),
            BlockFace::Up => (0, 1, 0),
            BlockFace::North => (0, 0, -1),
            BlockFace::South => (0, 0, 1),
        }
    }

    /// The face pointing in the opposite direction.
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            BlockFace::West => BlockFace::East,
            BlockFace::East => BlockFace::West,
            BlockFace::Down => BlockFace::Up,
            BlockFace::Up => BlockFace::Down,
            BlockFace::North => BlockFace::South,
            BlockFace::South => BlockFace::North,
        }
    }

    /// Whether this face points along the y axis.
    #[inline]
    pub const fn is_vertical(self) -> bool {
        matches!(self, BlockFace::Up | BlockFace::Down)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack_round_trips_known_values() {
        for (x, y, z) in [
            (0, 0, 0),
            (1, 2, 3),
            (-1, -2, -3),
            (BlockPosition::MAX_XZ, BlockPosition::MAX_Y, BlockPosition::MAX_XZ),
            (BlockPosition::MIN_XZ, BlockPosition::MIN_Y, BlockPosition::MIN_XZ),
            (12_345_678, -320, -54_321),
        ] {
            let position = BlockPosition::new(x, y, z);
            assert_eq!(BlockPosition::unpack(position.pack()), position);
        }
    }

    #[test]
    fn pack_layout_is_bit_exact() {
        // x occupies the low 27 bits, z the next 27, y the top 10.
        assert_eq!(BlockPosition::new(1, 0, 0).pack(), 1);
        assert_eq!(BlockPosition::new(0, 0, 1).pack(), 1 << 27);
        assert_eq!(BlockPosition::new(0, 1, 0).pack(), 1 << 54);
        assert_eq!(BlockPosition::new(-1, 0, 0).pack(), 0x7FF_FFFF);
        assert_eq!(BlockPosition::new(0, 0, -1).pack(), 0x7FF_FFFF << 27);
        assert_eq!(BlockPosition::new(0, -1, 0).pack(), 0x3FF << 54);
    }

    #[test]
    fn relative_follows_face_offsets() {
        let origin = BlockPosition::new(10, 20, 30);
        assert_eq!(origin.relative(BlockFace::West), BlockPosition::new(9, 20, 30));
        assert_eq!(origin.relative(BlockFace::Up), BlockPosition::new(10, 21, 30));
        assert_eq!(origin.relative(BlockFace::South), BlockPosition::new(10, 20, 31));
    }

    #[test]
    fn opposites_are_involutive() {
        for face in BlockFace::ALL {
            assert_eq!(face.opposite().opposite(), face);
            let (dx, dy, dz) = face.offsets();
            let (ox, oy, oz) = face.opposite().offsets();
            assert_eq!((dx + ox, dy + oy, dz + oz), (0, 0, 0));
        }
    }

    #[test]
    fn distance_squared_is_symmetric() {
        let a = BlockPosition::new(1, 2, 3);
        let b = BlockPosition::new(4, 6, 3);
        assert_eq!(a.distance_squared(b), 25);
        assert_eq!(b.distance_squared(a), 25);
    }
}
