//! Uniform grid spatial index over the 16-D bounding hypercube.
//!
//! Neighbor-cell enumeration the way a 2-D/3-D uniform grid normally does
//! it is exponential in 16 dimensions (a radius-1 neighborhood alone is
//! `3^16 ≈ 43M` cells), so this index instead walks only the *occupied*
//! cells and tests each one's bounding box against the query annulus. That
//! keeps the cost bounded by the number of occupied cells — at most the
//! neuron count — while still guaranteeing no false negatives (see
//! `DESIGN.md`).

use crate::neuron::{Neuron, NeuronId};
use crate::space::{Vec16, DIMENSIONS};
use std::collections::HashMap;

type CellKey = [i64; DIMENSIONS];

/// Uniform grid over `[-S, +S]^16`, rebuilt once per cycle from current
/// neuron positions.
#[derive(Debug, Clone)]
pub struct UniformGrid {
    cell_size: f64,
    cells: HashMap<CellKey, Vec<NeuronId>>,
}

impl UniformGrid {
    pub fn new(cell_size: f64) -> Self {
        let cell_size = if cell_size > 0.0 {
            cell_size
        } else {
            log::warn!("spatial index cell size {} non-positive, falling back to floor of 1.0", cell_size);
            1.0
        };
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    fn cell_of(&self, p: &Vec16) -> CellKey {
        let mut key = [0i64; DIMENSIONS];
        for i in 0..DIMENSIONS {
            key[i] = (p.0[i] / self.cell_size).floor() as i64;
        }
        key
    }

    /// Rebuild the index from scratch. O(N), not incremental.
    pub fn build(&mut self, neurons: &[Neuron]) {
        self.cells.clear();
        for n in neurons {
            let key = self.cell_of(&n.position);
            self.cells.entry(key).or_default().push(n.id);
        }
    }

    /// Distance range `[min, max]` from `origin` to the axis-aligned box
    /// covering grid cell `key`.
    fn cell_distance_range(&self, key: &CellKey, origin: &Vec16) -> (f64, f64) {
        let mut min_sq = 0.0;
        let mut max_sq = 0.0;
        for i in 0..DIMENSIONS {
            let lo = key[i] as f64 * self.cell_size;
            let hi = lo + self.cell_size;
            let o = origin.0[i];

            let d_min = if o < lo {
                lo - o
            } else if o > hi {
                o - hi
            } else {
                0.0
            };
            let d_max = (o - lo).abs().max((o - hi).abs());

            min_sq += d_min * d_min;
            max_sq += d_max * d_max;
        }
        (min_sq.sqrt(), max_sq.sqrt())
    }

    /// Every neuron id whose cell bounding box could intersect the
    /// half-open annulus `[r_inner, r_outer)` around `origin`. No false
    /// negatives; callers must filter by exact distance.
    pub fn query_shell(&self, origin: &Vec16, r_inner: f64, r_outer: f64) -> Vec<NeuronId> {
        let mut out = Vec::new();
        for (key, ids) in self.cells.iter() {
            let (min_d, max_d) = self.cell_distance_range(key, origin);
            // The cell can contain a point in [r_inner, r_outer) iff its
            // distance range overlaps that interval.
            if max_d >= r_inner && min_d < r_outer {
                out.extend_from_slice(ids);
            }
        }
        out
    }

    pub fn query_ball(&self, origin: &Vec16, r: f64) -> Vec<NeuronId> {
        self.query_shell(origin, 0.0, r)
    }
}
