//! Single-step moves ([`Offset`]) and ordered sets of them
//! ([`MovementPattern`]).

use std::fmt;
use std::ops::Add;

use fpnav_core::{Fp, Point};

use crate::error::OffsetError;

/// A permitted single-step displacement and its relative cost.
///
/// Each component is in `{-1, 0, 1}` and they are never both zero. Lateral
/// steps cost `1`, diagonal steps `sqrt(2)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Offset {
    x: i32,
    y: i32,
    cost: Fp,
}

impl Offset {
    pub fn new(x: i32, y: i32) -> Result<Self, OffsetError> {
        if !(-1..=1).contains(&x) || !(-1..=1).contains(&y) {
            return Err(OffsetError::TooLarge { x, y });
        }
        if x == 0 && y == 0 {
            return Err(OffsetError::Zero);
        }
        Ok(Self::new_unchecked(x, y))
    }

    pub(crate) const fn new_unchecked(x: i32, y: i32) -> Self {
        let cost = if x != 0 && y != 0 { Fp::SQRT_2 } else { Fp::ONE };
        Self { x, y, cost }
    }

    /// The offset leading from `from` to the adjacent cell `to`, if any.
    pub fn between(from: Point, to: Point) -> Option<Self> {
        let d = to - from;
        Self::new(d.x, d.y).ok()
    }

    #[inline]
    pub const fn x(self) -> i32 {
        self.x
    }

    #[inline]
    pub const fn y(self) -> i32 {
        self.y
    }

    /// Relative cost multiplier of taking this step.
    #[inline]
    pub const fn cost(self) -> Fp {
        self.cost
    }

    #[inline]
    pub const fn is_diagonal(self) -> bool {
        self.x != 0 && self.y != 0
    }
}

impl Add<Offset> for Point {
    type Output = Point;
    #[inline]
    fn add(self, rhs: Offset) -> Point {
        self.shift(rhs.x, rhs.y)
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "offset ({}, {})", self.x, self.y)
    }
}

/// Lateral and diagonal moves.
pub const FULL: [Offset; 8] = [
    Offset::new_unchecked(-1, -1),
    Offset::new_unchecked(0, -1),
    Offset::new_unchecked(1, -1),
    Offset::new_unchecked(-1, 0),
    Offset::new_unchecked(1, 0),
    Offset::new_unchecked(-1, 1),
    Offset::new_unchecked(0, 1),
    Offset::new_unchecked(1, 1),
];

/// Up, left, right and down.
pub const LATERAL_ONLY: [Offset; 4] = [
    Offset::new_unchecked(0, -1),
    Offset::new_unchecked(-1, 0),
    Offset::new_unchecked(1, 0),
    Offset::new_unchecked(0, 1),
];

pub const DIAGONAL_ONLY: [Offset; 4] = [
    Offset::new_unchecked(-1, -1),
    Offset::new_unchecked(1, -1),
    Offset::new_unchecked(-1, 1),
    Offset::new_unchecked(1, 1),
];

/// An ordered, non-empty set of distinct offsets an agent may take.
///
/// The order is the order successors are considered in, which decides
/// between equally cheap paths.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MovementPattern {
    offsets: Vec<Offset>,
}

impl MovementPattern {
    pub fn new(offsets: Vec<Offset>) -> Result<Self, OffsetError> {
        if offsets.is_empty() {
            return Err(OffsetError::EmptyPattern);
        }
        for (i, o) in offsets.iter().enumerate() {
            if offsets[..i].contains(o) {
                return Err(OffsetError::Duplicate(*o));
            }
        }
        Ok(Self { offsets })
    }

    /// Eight-directional movement.
    pub fn full() -> Self {
        Self {
            offsets: FULL.to_vec(),
        }
    }

    /// Four-directional movement.
    pub fn lateral_only() -> Self {
        Self {
            offsets: LATERAL_ONLY.to_vec(),
        }
    }

    pub fn diagonal_only() -> Self {
        Self {
            offsets: DIAGONAL_ONLY.to_vec(),
        }
    }

    #[inline]
    pub fn offsets(&self) -> &[Offset] {
        &self.offsets
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Offset> {
        self.offsets.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Always `false`: empty patterns are rejected at construction.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn contains(&self, offset: Offset) -> bool {
        self.offsets.contains(&offset)
    }
}

impl Default for MovementPattern {
    fn default() -> Self {
        Self::full()
    }
}

impl<'a> IntoIterator for &'a MovementPattern {
    type Item = &'a Offset;
    type IntoIter = std::slice::Iter<'a, Offset>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
