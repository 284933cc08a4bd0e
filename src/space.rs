//! Space primitives: a 16-dimensional point/vector type and the
//! handful of pure geometric functions the rest of the engine builds on.

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use std::ops::{Add, AddAssign, Mul, Sub};

/// Dimensionality of the space every neuron lives in.
pub const DIMENSIONS: usize = 16;

/// A point or displacement in the 16-dimensional space. Used both as a
/// neuron position and as a velocity/force vector — the representation is
/// identical, only the calling convention differs.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec16(pub [f64; DIMENSIONS]);

impl Vec16 {
    pub const ZERO: Vec16 = Vec16([0.0; DIMENSIONS]);

    pub fn new(coords: [f64; DIMENSIONS]) -> Self {
        Self(coords)
    }

    /// Euclidean (ℓ₂) norm.
    pub fn norm(&self) -> f64 {
        self.0.iter().map(|c| c * c).sum::<f64>().sqrt()
    }

    /// Euclidean distance between two points.
    pub fn distance(&self, other: &Vec16) -> f64 {
        (*self - *other).norm()
    }

    /// The unit vector pointing from `self` toward `other`, or `Vec16::ZERO`
    /// if the two points coincide (no well-defined direction).
    pub fn direction_to(&self, other: &Vec16) -> Vec16 {
        let delta = *other - *self;
        let n = delta.norm();
        if n > 0.0 {
            delta * (1.0 / n)
        } else {
            Vec16::ZERO
        }
    }

    pub fn scale(&self, factor: f64) -> Vec16 {
        *self * factor
    }
}

impl Add for Vec16 {
    type Output = Vec16;
    fn add(self, rhs: Vec16) -> Vec16 {
        let mut out = [0.0; DIMENSIONS];
        for i in 0..DIMENSIONS {
            out[i] = self.0[i] + rhs.0[i];
        }
        Vec16(out)
    }
}

impl AddAssign for Vec16 {
    fn add_assign(&mut self, rhs: Vec16) {
        *self = *self + rhs;
    }
}

impl Sub for Vec16 {
    type Output = Vec16;
    fn sub(self, rhs: Vec16) -> Vec16 {
        let mut out = [0.0; DIMENSIONS];
        for i in 0..DIMENSIONS {
            out[i] = self.0[i] - rhs.0[i];
        }
        Vec16(out)
    }
}

impl Mul<f64> for Vec16 {
    type Output = Vec16;
    fn mul(self, rhs: f64) -> Vec16 {
        let mut out = [0.0; DIMENSIONS];
        for i in 0..DIMENSIONS {
            out[i] = self.0[i] * rhs;
        }
        Vec16(out)
    }
}

/// Euclidean distance between two points (free-function form).
pub fn distance(p: &Vec16, q: &Vec16) -> f64 {
    p.distance(q)
}

/// Sample a point uniformly distributed inside the `radius`-ball centered
/// at the origin. Draws a standard-normal coordinate per axis, normalizes
/// to a uniform direction on the unit sphere, then scales by `U^(1/16)`
/// for a uniform draw `U` so the radial density matches the shell volume.
/// For `radius <= 0.0` this always returns the origin.
pub fn random_in_hypersphere<R: Rng + ?Sized>(radius: f64, rng: &mut R) -> Vec16 {
    if radius <= 0.0 {
        return Vec16::ZERO;
    }
    let mut coords = [0.0; DIMENSIONS];
    for c in coords.iter_mut() {
        *c = StandardNormal.sample(rng);
    }
    let direction = Vec16(coords);
    let norm = direction.norm();
    if norm == 0.0 {
        return Vec16::ZERO;
    }
    let u: f64 = rng.gen_range(0.0..1.0);
    let scale = radius * u.powf(1.0 / DIMENSIONS as f64) / norm;
    direction * scale
}

/// Scale a point that lies outside the `radius`-ball back onto its surface.
/// Points already inside (or exactly on) the ball are returned unchanged.
pub fn clamp_to_hypersphere(p: Vec16, radius: f64) -> Vec16 {
    let n = p.norm();
    if n <= radius || n == 0.0 {
        p
    } else {
        p * (radius / n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn distance_is_symmetric_and_zero_for_same_point() {
        let a = Vec16([1.0; DIMENSIONS]);
        let b = Vec16([2.0; DIMENSIONS]);
        assert!((distance(&a, &b) - distance(&b, &a)).abs() < 1e-12);
        assert_eq!(distance(&a, &a), 0.0);
    }

    #[test]
    fn random_in_hypersphere_stays_inside() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let p = random_in_hypersphere(3.0, &mut rng);
            assert!(p.norm() <= 3.0 + 1e-9);
        }
    }

    #[test]
    fn clamp_leaves_interior_points_untouched() {
        let p = Vec16([1.0, 0.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let clamped = clamp_to_hypersphere(p, 10.0);
        assert_eq!(p, clamped);
    }

    #[test]
    fn clamp_projects_exterior_points_to_surface() {
        let mut coords = [0.0; DIMENSIONS];
        coords[0] = 20.0;
        let p = Vec16(coords);
        let clamped = clamp_to_hypersphere(p, 5.0);
        assert!((clamped.norm() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn direction_to_is_unit_length() {
        let a = Vec16::ZERO;
        let mut coords = [0.0; DIMENSIONS];
        coords[1] = 4.0;
        let b = Vec16(coords);
        let dir = a.direction_to(&b);
        assert!((dir.norm() - 1.0).abs() < 1e-9);
    }
}
