use crate::base::{Error, GEOMETRY_ZERO_TOL};
use crate::geometry::Polygon;
use russell_lab::Vector;
use serde::{Deserialize, Serialize};

/// Holds the pillars of a half cross-section
///
/// The centerline pillar is mirrored: `pillar_boundaries[0] = -pillar_boundaries[1]` and its
/// width covers both halves. Thus `Σ widths - widths[0] / 2` equals the half-width.
///
/// ```text
///  b₀    c₀    b₁      c₁      b₂      c₂      b₃
///  |     :     |       :       |       :       |
///  |     :     |       :       |       :       |
///  |←—— w₀ ——→|←—— w₁ ——→|←—— w₂ ——→|
///        ↑
///   centerline (z = 0)
/// ```
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PillarSet {
    /// Transverse coordinates of the pillar centers (npillar)
    pub pillars: Vector,

    /// Transverse coordinates of the pillar boundaries (npillar + 1)
    pub pillar_boundaries: Vector,

    /// Pillar widths `boundary[i+1] - boundary[i]` (npillar)
    pub pillar_widths: Vector,

    /// Vertical extents of the cross-section at the pillar centers (npillar)
    pub pillar_heights: Vector,

    /// Vertical extents of the cross-section at the pillar boundaries (npillar + 1)
    pub pillar_boundary_heights: Vector,
}

impl PillarSet {
    /// Allocates a new instance measuring all heights on the cross-section
    pub fn measure(section: &Polygon, pillars: Vector, pillar_boundaries: Vector) -> Result<Self, Error> {
        let mut heights = Vector::new(pillars.dim());
        for i in 0..pillars.dim() {
            heights[i] = section.vertical_extent(pillars[i]);
        }
        PillarSet::with_heights(section, pillars, pillar_boundaries, heights)
    }

    /// Allocates a new instance with given pillar heights
    ///
    /// Only the boundary heights are measured on the cross-section.
    pub fn with_heights(
        section: &Polygon,
        pillars: Vector,
        pillar_boundaries: Vector,
        pillar_heights: Vector,
    ) -> Result<Self, Error> {
        let n = pillars.dim();
        if pillar_boundaries.dim() != n + 1 {
            return Err(Error::Input("the number of boundaries must equal the number of pillars + 1"));
        }
        if pillar_heights.dim() != n {
            return Err(Error::Input("the number of heights must equal the number of pillars"));
        }
        let mut pillar_widths = Vector::new(n);
        for i in 0..n {
            pillar_widths[i] = pillar_boundaries[i + 1] - pillar_boundaries[i];
        }
        let mut pillar_boundary_heights = Vector::new(n + 1);
        for i in 0..(n + 1) {
            pillar_boundary_heights[i] = section.vertical_extent(pillar_boundaries[i]);
        }
        let set = PillarSet {
            pillars,
            pillar_boundaries,
            pillar_widths,
            pillar_heights,
            pillar_boundary_heights,
        };
        set.validate()?;
        Ok(set)
    }

    /// Checks the invariants of the pillar set
    pub fn validate(&self) -> Result<(), Error> {
        let n = self.pillars.dim();
        if n == 0 {
            return Err(Error::DegenerateGeometry("the pillar set is empty".to_string()));
        }
        for i in 0..n {
            if self.pillar_widths[i] <= GEOMETRY_ZERO_TOL {
                return Err(Error::DegenerateGeometry(format!(
                    "the width of pillar {} is not positive ({:?})",
                    i, self.pillar_widths[i]
                )));
            }
            if !(self.pillar_heights[i] >= 0.0) {
                return Err(Error::DegenerateGeometry(format!(
                    "the height of pillar {} is invalid ({:?})",
                    i, self.pillar_heights[i]
                )));
            }
            if i > 0 && self.pillars[i] <= self.pillars[i - 1] {
                return Err(Error::DegenerateGeometry(format!(
                    "the pillar centers must be strictly increasing (pillar {})",
                    i
                )));
            }
        }
        if self.pillars[0] < 0.0 {
            return Err(Error::DegenerateGeometry("the first pillar center must be ≥ 0".to_string()));
        }
        Ok(())
    }

    /// Returns the number of pillars
    pub fn npillar(&self) -> usize {
        self.pillars.dim()
    }

    /// Returns the transverse coordinate of the outer edge
    pub fn half_width(&self) -> f64 {
        self.pillar_boundaries[self.pillar_boundaries.dim() - 1]
    }

    /// Returns the half-width covered by the pillars (the mirrored centerline pillar counts half)
    pub fn covered_half_width(&self) -> f64 {
        let sum: f64 = self.pillar_widths.as_data().iter().sum();
        sum - self.pillar_widths[0] / 2.0
    }

    /// Returns the rectangular pillar areas `width · height`
    pub fn pillar_areas(&self) -> Vector {
        let n = self.npillar();
        let mut areas = Vector::new(n);
        for i in 0..n {
            areas[i] = self.pillar_widths[i] * self.pillar_heights[i];
        }
        areas
    }

    /// Returns the transverse derivatives of the pillar heights
    ///
    /// Computed from the boundary heights: `(h(b[i+1]) - h(b[i])) / w[i]`
    pub fn latitudinal_height_derivatives(&self) -> Vector {
        let n = self.npillar();
        let mut d = Vector::new(n);
        for i in 0..n {
            d[i] = (self.pillar_boundary_heights[i + 1] - self.pillar_boundary_heights[i]) / self.pillar_widths[i];
        }
        d
    }

    /// Returns the angles between the pillar tops and the transverse direction
    ///
    /// Negative angles mean that the surface descends towards the side.
    pub fn latitudinal_angles(&self) -> Vector {
        let d = self.latitudinal_height_derivatives();
        let mut angles = Vector::new(d.dim());
        for i in 0..d.dim() {
            angles[i] = f64::atan(d[i] / 2.0);
        }
        angles
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
