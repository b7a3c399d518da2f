use super::PillarSet;
use crate::base::{Config, Error, PillarType};
use crate::geometry::Polygon;
use crate::numerics::{NewtonSolver, RootSolver};
use log::debug;
use russell_lab::Vector;

/// Partitions the half cross-section into pillars
///
/// **Equidistant:** all widths equal `dw = (width/2) / (n - 0.5)`; the first center is at `z = 0`
/// and the first band spans `[-dw/2, dw/2]` (mirrored centerline pillar).
///
/// **Uniform area:** the widths are the unknowns of the nonlinear system
///
/// ```text
/// rᵢ = (wᵢ h(cᵢ) - w₀ h(c₀)) / a_ref     i = 1, ..., n-1
/// r₀ = (Σ wᵢ - w₀/2 - width/2) / (width/2)
/// ```
///
/// where `a_ref = area / (2n - 1)` and `cᵢ` are the centers implied by the widths.
/// The system is solved by Newton's method seeded with the equidistant widths.
pub struct Discretizer {
    /// Number of pillars
    pub pillar_count: usize,

    /// Partitioning policy
    pub pillar_type: PillarType,

    /// Nonlinear root finder (uniform-area pillars)
    solver: Box<dyn RootSolver>,
}

impl Discretizer {
    /// Allocates a new instance
    pub fn new(config: &Config) -> Result<Self, Error> {
        if let Some(message) = config.validate() {
            return Err(Error::InvalidConfig(message));
        }
        let solver = NewtonSolver::new(config.solver_n_max_iterations, config.solver_tol);
        Ok(Discretizer {
            pillar_count: config.pillar_count,
            pillar_type: config.pillar_type,
            solver: Box::new(solver),
        })
    }

    /// Replaces the nonlinear root finder
    pub fn set_solver(&mut self, solver: Box<dyn RootSolver>) -> &mut Self {
        self.solver = solver;
        self
    }

    /// Discretizes a symmetric cross-section
    pub fn discretize(&self, section: &Polygon) -> Result<PillarSet, Error> {
        let half_width = section.width() / 2.0;
        let (pillars, boundaries) = match self.pillar_type {
            PillarType::Equidistant => equidistant(self.pillar_count, half_width),
            PillarType::UniformArea => {
                if self.pillar_count == 1 {
                    equidistant(1, half_width)
                } else {
                    let widths = self.uniform_area_widths(section, half_width)?;
                    pillar_layout(&widths)
                }
            }
        };
        let set = PillarSet::measure(section, pillars, boundaries)?;
        if self.pillar_type == PillarType::UniformArea {
            if let Some(i) = set.pillar_heights.as_data().iter().position(|h| *h <= 0.0) {
                return Err(Error::Discretization(format!(
                    "the cross-section has zero height at the center of pillar {}",
                    i
                )));
            }
        }
        Ok(set)
    }

    /// Solves for the widths of the uniform-area pillars
    fn uniform_area_widths(&self, section: &Polygon, half_width: f64) -> Result<Vector, Error> {
        let n = self.pillar_count;
        let a_ref = section.area() / (2 * n - 1) as f64;
        if a_ref <= 0.0 || half_width <= 0.0 {
            return Err(Error::Discretization("the cross-section is degenerate".to_string()));
        }
        let seed = Vector::filled(n, half_width / (n as f64 - 0.5));
        let mut centers = Vector::new(n);
        let widths = self
            .solver
            .solve(&seed, &mut |rr, ww| {
                if let Some(i) = ww.as_data().iter().position(|w| !(*w > 0.0)) {
                    return Err(Error::Discretization(format!("found a non-positive width at pillar {}", i)));
                }
                pillar_centers(&mut centers, ww);
                let sum: f64 = ww.as_data().iter().sum();
                let a0 = ww[0] * section.vertical_extent(centers[0]);
                rr[0] = (sum - ww[0] / 2.0 - half_width) / half_width;
                for i in 1..n {
                    rr[i] = (ww[i] * section.vertical_extent(centers[i]) - a0) / a_ref;
                }
                Ok(())
            })
            .map_err(|e| Error::Discretization(format!("cannot find uniform-area pillars: {}", e)))?;
        debug!("uniform-area pillar widths = {:?}", widths.as_data());
        Ok(widths)
    }
}

/// Returns the pillar centers and boundaries of equidistant pillars
fn equidistant(n: usize, half_width: f64) -> (Vector, Vector) {
    let dw = half_width / (n as f64 - 0.5);
    let mut pillars = Vector::new(n);
    let mut boundaries = Vector::new(n + 1);
    for i in 0..n {
        pillars[i] = i as f64 * dw;
        boundaries[i] = (i as f64 - 0.5) * dw;
    }
    boundaries[n] = half_width;
    (pillars, boundaries)
}

/// Computes the pillar centers from the widths (the first center lies on the centerline)
fn pillar_centers(centers: &mut Vector, widths: &Vector) {
    let n = widths.dim();
    let mut left = widths[0] / 2.0;
    centers[0] = 0.0;
    for i in 1..n {
        centers[i] = left + widths[i] / 2.0;
        left += widths[i];
    }
}

/// Returns the pillar centers and boundaries corresponding to the widths
pub fn pillar_layout(widths: &Vector) -> (Vector, Vector) {
    let n = widths.dim();
    let mut pillars = Vector::new(n);
    let mut boundaries = Vector::new(n + 1);
    pillar_centers(&mut pillars, widths);
    boundaries[0] = -widths[0] / 2.0;
    for i in 0..n {
        boundaries[i + 1] = boundaries[i] + widths[i];
    }
    (pillars, boundaries)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{pillar_layout, Discretizer};
    use crate::base::{Config, Error, PillarType, SampleSections};
    use crate::geometry::Polygon;
    use russell_lab::{approx_eq, vec_approx_eq, Vector};

    #[test]
    fn new_captures_invalid_config() {
        let mut config = Config::new();
        config.pillar_count = 0;
        assert_eq!(
            Discretizer::new(&config).err(),
            Some(Error::InvalidConfig(
                "pillar_count = 0 is incorrect; it must be ≥ 1".to_string()
            ))
        );
    }

    #[test]
    fn equidistant_works() -> Result<(), Error> {
        let mut config = Config::new();
        config.set_pillar_count(4)?;
        let discretizer = Discretizer::new(&config)?;
        let rect = SampleSections::rectangle(14.0, 1.0)?;
        let set = discretizer.discretize(&rect)?;
        approx_eq(set.pillar_widths[0], 7.0 / 3.5, 1e-15);
        vec_approx_eq(&set.pillars, &[0.0, 2.0, 4.0, 6.0], 1e-14);
        vec_approx_eq(&set.pillar_boundaries, &[-1.0, 1.0, 3.0, 5.0, 7.0], 1e-14);
        vec_approx_eq(&set.pillar_heights, &[1.0, 1.0, 1.0, 1.0], 1e-15);
        approx_eq(set.covered_half_width(), 7.0, 1e-14);
        Ok(())
    }

    #[test]
    fn single_pillar_works() -> Result<(), Error> {
        let mut config = Config::new();
        config.set_pillar_count(1)?.set_pillar_type(PillarType::UniformArea)?;
        let discretizer = Discretizer::new(&config)?;
        let rect = SampleSections::rectangle(4.0, 1.0)?;
        let set = discretizer.discretize(&rect)?;
        vec_approx_eq(&set.pillars, &[0.0], 1e-15);
        vec_approx_eq(&set.pillar_boundaries, &[-2.0, 2.0], 1e-15);
        vec_approx_eq(&set.pillar_widths, &[4.0], 1e-15);
        Ok(())
    }

    #[test]
    fn uniform_area_works_for_the_square() -> Result<(), Error> {
        let mut config = Config::new();
        config.set_pillar_count(4)?.set_pillar_type(PillarType::UniformArea)?;
        let discretizer = Discretizer::new(&config)?;
        let square = SampleSections::square(14.0)?;
        let set = discretizer.discretize(&square)?;
        let areas = set.pillar_areas();
        for i in 1..4 {
            approx_eq(areas[i], areas[0], 1e-6);
        }
        approx_eq(set.half_width(), 7.0, 1e-6);
        approx_eq(set.covered_half_width(), 7.0, 1e-6);
        // the outer pillars are wider than the inner ones
        for i in 1..4 {
            assert!(set.pillar_widths[i] > set.pillar_widths[i - 1]);
        }
        Ok(())
    }

    #[test]
    fn uniform_area_matches_equidistant_for_rectangles() -> Result<(), Error> {
        let mut config = Config::new();
        config.set_pillar_count(5)?.set_pillar_type(PillarType::UniformArea)?;
        let discretizer = Discretizer::new(&config)?;
        let rect = SampleSections::rectangle(9.0, 2.0)?;
        let set = discretizer.discretize(&rect)?;
        vec_approx_eq(&set.pillar_widths, &[1.0, 1.0, 1.0, 1.0, 1.0], 1e-6);
        Ok(())
    }

    #[test]
    fn uniform_area_captures_zero_heights() -> Result<(), Error> {
        // two separate blocks: the section is empty around the centerline
        let section = Polygon::new(vec![[1.0, -1.0], [3.0, -1.0], [3.0, 1.0], [1.0, 1.0]])?;
        let mut config = Config::new();
        config.set_pillar_count(3)?.set_pillar_type(PillarType::UniformArea)?;
        let discretizer = Discretizer::new(&config)?;
        let res = discretizer.discretize(&section);
        assert!(matches!(res, Err(Error::Discretization(_))));
        Ok(())
    }

    #[test]
    fn layout_works() {
        let (pillars, boundaries) = pillar_layout(&Vector::from(&[2.0, 1.0, 3.0]));
        vec_approx_eq(&pillars, &[0.0, 1.5, 3.5], 1e-15);
        vec_approx_eq(&boundaries, &[-1.0, 1.0, 2.0, 5.0], 1e-15);
    }
}
