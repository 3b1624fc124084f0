//! Collision layer bitmask used to filter scene queries.

/// Set of layers a collider belongs to, or a query accepts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CollisionLayers(pub u32);

impl CollisionLayers {
    pub const NONE: Self = Self(0);
    pub const PLANET: Self = Self(1 << 0);
    pub const STAR: Self = Self(1 << 1);
    pub const PLAYER: Self = Self(1 << 2);
    /// Visual-only shells; never matched by gameplay queries.
    pub const ATMOSPHERE: Self = Self(1 << 3);
    pub const ALL: Self = Self(u32::MAX);

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// True when the two sets share at least one layer.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for CollisionLayers {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_filtering() {
        let solid = CollisionLayers::PLANET | CollisionLayers::STAR;
        assert!(solid.intersects(CollisionLayers::PLANET));
        assert!(!solid.intersects(CollisionLayers::PLAYER));
        assert!(solid.contains(CollisionLayers::STAR));
        assert!(!CollisionLayers::PLANET.contains(solid));
        assert!(!CollisionLayers::NONE.intersects(CollisionLayers::ALL));
    }
}
