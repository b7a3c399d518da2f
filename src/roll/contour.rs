use crate::StrError;
use russell_lab::Vector;
use serde::{Deserialize, Serialize};

/// Specifies the roll-surface geometry seen by the workpiece
///
/// The contour is the distance between the roll surface and the half-gap line, measured
/// vertically at the longitudinal position `x` (rolling direction, `x = 0` at the roll axis)
/// and the transverse position `z`.
pub trait RollContour {
    /// Returns the contour height at (x, z)
    fn surface(&self, x: f64, z: f64) -> f64;

    /// Returns the largest roll radius (at the groove rims)
    fn max_radius(&self) -> f64;

    /// Returns the contour heights at (x, zᵢ) for many transverse positions
    fn surface_many(&self, x: f64, zz: &[f64]) -> Vector {
        let mut res = Vector::new(zz.len());
        for (i, z) in zz.iter().enumerate() {
            res[i] = self.surface(x, *z);
        }
        res
    }

    /// Returns the local roll radius at the transverse position z
    fn local_radius(&self, z: f64) -> f64 {
        self.max_radius() - self.surface(0.0, z)
    }
}

/// Computes the height of a circle of radius r above its lowest point at the distance x
fn arc_height(max_radius: f64, r: f64, x: f64) -> f64 {
    max_radius - f64::sqrt(f64::max(r * r - x * x, 0.0))
}

/// Implements a roll with a flat barrel (no groove)
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct FlatRoll {
    /// Roll radius
    pub nominal_radius: f64,
}

impl FlatRoll {
    /// Allocates a new instance
    pub fn new(nominal_radius: f64) -> Result<Self, StrError> {
        if nominal_radius <= 0.0 {
            return Err("nominal_radius must be > 0.0");
        }
        Ok(FlatRoll { nominal_radius })
    }
}

impl RollContour for FlatRoll {
    fn surface(&self, x: f64, _z: f64) -> f64 {
        arc_height(self.nominal_radius, self.nominal_radius, x)
    }

    fn max_radius(&self) -> f64 {
        self.nominal_radius
    }
}

/// Implements a grooved roll with a piecewise-linear groove contour
///
/// The groove is symmetric about `z = 0` and given by (z, depth) points with `z ≥ 0`;
/// the depth is constant beyond the last point.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GroovedRoll {
    /// Roll radius at the groove rims
    pub nominal_radius: f64,

    /// Groove contour as (z, depth) points
    pub groove: Vec<[f64; 2]>,
}

impl GroovedRoll {
    /// Allocates a new instance
    pub fn new(nominal_radius: f64, groove: Vec<[f64; 2]>) -> Result<Self, StrError> {
        if nominal_radius <= 0.0 {
            return Err("nominal_radius must be > 0.0");
        }
        if groove.is_empty() {
            return Err("the groove requires at least one point");
        }
        if groove[0][0] != 0.0 {
            return Err("the groove must start at z = 0");
        }
        for i in 0..groove.len() {
            if i > 0 && groove[i][0] <= groove[i - 1][0] {
                return Err("the groove z-coordinates must be strictly increasing");
            }
            if groove[i][1] < 0.0 || groove[i][1] >= nominal_radius {
                return Err("the groove depth must satisfy 0 ≤ depth < nominal_radius");
            }
        }
        Ok(GroovedRoll { nominal_radius, groove })
    }

    /// Returns the groove depth at z
    pub fn depth(&self, z: f64) -> f64 {
        let z = f64::abs(z);
        let n = self.groove.len();
        if z >= self.groove[n - 1][0] {
            return self.groove[n - 1][1];
        }
        for i in 1..n {
            let (a, b) = (self.groove[i - 1], self.groove[i]);
            if z < b[0] {
                let t = (z - a[0]) / (b[0] - a[0]);
                return a[1] + t * (b[1] - a[1]);
            }
        }
        self.groove[n - 1][1]
    }
}

impl RollContour for GroovedRoll {
    fn surface(&self, x: f64, z: f64) -> f64 {
        let r = self.nominal_radius - self.depth(z);
        arc_height(self.nominal_radius, r, x)
    }

    fn max_radius(&self) -> f64 {
        self.nominal_radius
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{FlatRoll, GroovedRoll, RollContour};
    use crate::StrError;
    use russell_lab::approx_eq;

    #[test]
    fn flat_roll_works() -> Result<(), StrError> {
        let roll = FlatRoll::new(160.0)?;
        assert_eq!(roll.surface(0.0, 3.0), 0.0);
        approx_eq(roll.surface(-20.0, 3.0), 160.0 - f64::sqrt(160.0 * 160.0 - 400.0), 1e-12);
        assert_eq!(roll.surface(-20.0, 0.0), roll.surface(-20.0, 7.0));
        assert_eq!(roll.max_radius(), 160.0);
        assert_eq!(roll.local_radius(5.0), 160.0);
        let many = roll.surface_many(-20.0, &[0.0, 1.0, 2.0]);
        assert_eq!(many.dim(), 3);
        assert_eq!(many[2], roll.surface(-20.0, 2.0));
        assert_eq!(FlatRoll::new(0.0).err(), Some("nominal_radius must be > 0.0"));
        Ok(())
    }

    #[test]
    fn grooved_roll_works() -> Result<(), StrError> {
        // V-shaped groove: depth 2 at the center, vanishing at z = 4
        let roll = GroovedRoll::new(100.0, vec![[0.0, 2.0], [4.0, 0.0]])?;
        assert_eq!(roll.depth(0.0), 2.0);
        assert_eq!(roll.depth(2.0), 1.0);
        assert_eq!(roll.depth(-2.0), 1.0);
        assert_eq!(roll.depth(10.0), 0.0);
        assert_eq!(roll.surface(0.0, 0.0), 2.0);
        assert_eq!(roll.surface(0.0, 5.0), 0.0);
        approx_eq(roll.local_radius(0.0), 98.0, 1e-14);
        approx_eq(roll.surface(-10.0, 0.0), 100.0 - f64::sqrt(98.0 * 98.0 - 100.0), 1e-12);
        // beyond the roll circle the contour is capped
        assert_eq!(roll.surface(-200.0, 0.0), 100.0);
        Ok(())
    }

    #[test]
    fn grooved_roll_captures_errors() {
        assert_eq!(
            GroovedRoll::new(-1.0, vec![[0.0, 1.0]]).err(),
            Some("nominal_radius must be > 0.0")
        );
        assert_eq!(
            GroovedRoll::new(10.0, vec![]).err(),
            Some("the groove requires at least one point")
        );
        assert_eq!(
            GroovedRoll::new(10.0, vec![[1.0, 1.0]]).err(),
            Some("the groove must start at z = 0")
        );
        assert_eq!(
            GroovedRoll::new(10.0, vec![[0.0, 1.0], [0.0, 2.0]]).err(),
            Some("the groove z-coordinates must be strictly increasing")
        );
        assert_eq!(
            GroovedRoll::new(10.0, vec![[0.0, 10.0]]).err(),
            Some("the groove depth must satisfy 0 ≤ depth < nominal_radius")
        );
    }
}
