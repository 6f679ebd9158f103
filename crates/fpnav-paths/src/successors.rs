//! Successor generation for the node-pooled engine.
//!
//! A footprint of volume `v` is approximated by a band of `2v + 1` cells
//! perpendicular to each moving axis, `v` cells beyond the target. A step is
//! only generated if the whole band lies inside the grid. The band is not
//! tested for blocked cells.

use fpnav_core::{BLOCKED, Fp, Grid, Point};

use crate::offset::Offset;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Successor {
    pub cell: Point,
    /// Cost of entering `cell` from the expanded node.
    pub cost: Fp,
}

/// Expansion order of a zero-volume agent.
pub(crate) const NEIGHBOR_ORDER: [Offset; 8] = [
    Offset::new_unchecked(-1, 0),
    Offset::new_unchecked(0, -1),
    Offset::new_unchecked(1, 0),
    Offset::new_unchecked(0, 1),
    Offset::new_unchecked(1, -1),
    Offset::new_unchecked(-1, 1),
    Offset::new_unchecked(1, 1),
    Offset::new_unchecked(-1, -1),
];

/// Expansion order of an agent with a footprint.
pub(crate) const VOLUME_ORDER: [Offset; 8] = [
    Offset::new_unchecked(1, 0),
    Offset::new_unchecked(-1, 0),
    Offset::new_unchecked(0, 1),
    Offset::new_unchecked(0, -1),
    Offset::new_unchecked(1, -1),
    Offset::new_unchecked(-1, 1),
    Offset::new_unchecked(1, 1),
    Offset::new_unchecked(-1, -1),
];

/// Whether an agent of `volume` standing on `cell` may take `offset`.
pub(crate) fn footprint_fits(grid: &Grid, cell: Point, offset: Offset, volume: u16) -> bool {
    let v = i32::from(volume);
    let target = cell + offset;
    if !grid.contains(target) {
        return false;
    }
    if offset.x() != 0 {
        let reach = target.x + offset.x().signum() * v;
        if !(-v..=v).all(|k| grid.contains(Point::new(reach, target.y + k))) {
            return false;
        }
    }
    if offset.y() != 0 {
        let reach = target.y + offset.y().signum() * v;
        if !(-v..=v).all(|k| grid.contains(Point::new(target.x + k, reach))) {
            return false;
        }
    }
    true
}

/// Fill `out` with the traversable successors of `cell`, in expansion order.
///
/// The cell the search arrived from is skipped.
pub(crate) fn generate(
    grid: &Grid,
    cell: Point,
    parent: Option<Point>,
    volume: u16,
    out: &mut Vec<Successor>,
) {
    out.clear();
    let order = if volume > 0 {
        &VOLUME_ORDER
    } else {
        &NEIGHBOR_ORDER
    };
    for &offset in order {
        let target = cell + offset;
        if Some(target) == parent || !footprint_fits(grid, cell, offset, volume) {
            continue;
        }
        let weight = grid.cell_cost_unchecked(target);
        if weight == BLOCKED {
            continue;
        }
        out.push(Successor {
            cell: target,
            cost: weight * offset.cost(),
        });
    }
}
