use super::{Discretizer, PillarSet};
use crate::base::Error;
use crate::geometry::Polygon;
use russell_lab::Vector;
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;

/// Holds the state of the workpiece at one longitudinal position
///
/// The pillar sections (the parts of the cross-section within each pillar band) are
/// computed on first access and kept until the geometry changes.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PillarProfile {
    /// Longitudinal coordinate (`x = 0` at the roll axis)
    pub x: f64,

    /// Accumulated equivalent strains of the pillars
    pub pillar_strains: Vector,

    /// Mean longitudinal velocity of the workpiece
    pub velocity: f64,

    /// Full (symmetric) cross-section
    cross_section: Polygon,

    /// Pillars of the half cross-section
    pillar_set: PillarSet,

    /// Pillar sections (lazy)
    #[serde(skip)]
    sections: OnceCell<Vec<Polygon>>,
}

impl PillarProfile {
    /// Allocates a new instance by discretizing the cross-section
    pub fn new(cross_section: Polygon, discretizer: &Discretizer) -> Result<Self, Error> {
        let pillar_set = discretizer.discretize(&cross_section)?;
        Ok(PillarProfile::from_parts(0.0, cross_section, pillar_set, 1.0))
    }

    /// Allocates a new instance from an existing pillar set (the strains start at zero)
    pub fn from_parts(x: f64, cross_section: Polygon, pillar_set: PillarSet, velocity: f64) -> Self {
        let pillar_strains = Vector::new(pillar_set.npillar());
        PillarProfile {
            x,
            pillar_strains,
            velocity,
            cross_section,
            pillar_set,
            sections: OnceCell::new(),
        }
    }

    /// Returns the cross-section
    pub fn cross_section(&self) -> &Polygon {
        &self.cross_section
    }

    /// Returns the pillar set
    pub fn pillar_set(&self) -> &PillarSet {
        &self.pillar_set
    }

    /// Returns the number of pillars
    pub fn npillar(&self) -> usize {
        self.pillar_set.npillar()
    }

    /// Replaces the geometry and drops the cached pillar sections
    pub fn set_geometry(&mut self, cross_section: Polygon, pillar_set: PillarSet) -> Result<&mut Self, Error> {
        if pillar_set.npillar() != self.pillar_strains.dim() {
            return Err(Error::Input("the number of pillars must not change"));
        }
        self.cross_section = cross_section;
        self.pillar_set = pillar_set;
        self.sections = OnceCell::new();
        Ok(self)
    }

    /// Returns the total width of the cross-section
    pub fn width(&self) -> f64 {
        self.cross_section.width()
    }

    /// Returns the total height of the cross-section
    pub fn height(&self) -> f64 {
        self.cross_section.height()
    }

    /// Returns the area of the full cross-section
    pub fn area(&self) -> f64 {
        self.cross_section.area()
    }

    /// Returns the parts of the cross-section within each pillar band
    pub fn pillar_sections(&self) -> Result<&[Polygon], Error> {
        if let Some(sections) = self.sections.get() {
            return Ok(sections);
        }
        let n = self.npillar();
        let boundaries = &self.pillar_set.pillar_boundaries;
        let mut sections = Vec::with_capacity(n);
        for i in 0..n {
            match self.cross_section.clip_band(boundaries[i], boundaries[i + 1])? {
                Some(section) => sections.push(section),
                None => {
                    return Err(Error::DegenerateGeometry(format!(
                        "the band of pillar {} does not intersect the cross-section",
                        i
                    )))
                }
            }
        }
        Ok(self.sections.get_or_init(|| sections))
    }

    /// Returns the exact areas of the pillar sections
    pub fn pillar_section_areas(&self) -> Result<Vector, Error> {
        let sections = self.pillar_sections()?;
        Ok(Vector::from(&sections.iter().map(|s| s.area()).collect::<Vec<_>>()))
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::PillarProfile;
    use crate::base::{Config, Error, SampleSections};
    use crate::pillars::Discretizer;
    use russell_lab::{approx_eq, vec_approx_eq};

    #[test]
    fn pillar_sections_work() -> Result<(), Error> {
        let mut config = Config::new();
        config.set_pillar_count(4)?;
        let discretizer = Discretizer::new(&config)?;
        let square = SampleSections::square(14.0)?;
        let profile = PillarProfile::new(square, &discretizer)?;
        assert_eq!(profile.npillar(), 4);
        approx_eq(profile.width(), 14.0, 1e-15);
        approx_eq(profile.height(), 14.0, 1e-15);
        let sections = profile.pillar_sections()?;
        assert_eq!(sections.len(), 4);
        // band [-1,1] of the diamond: 2·(14 - 1) = 26; band [1,3]: 2·10 = 20; ...
        let areas = profile.pillar_section_areas()?;
        vec_approx_eq(&areas, &[26.0, 20.0, 12.0, 4.0], 1e-12);
        // the mirrored half of the first band counts once
        let half_area = areas[0] / 2.0 + areas[1] + areas[2] + areas[3];
        approx_eq(half_area, profile.area() / 2.0, 1e-12);
        Ok(())
    }

    #[test]
    fn set_geometry_drops_the_cached_sections() -> Result<(), Error> {
        let mut config = Config::new();
        config.set_pillar_count(2)?;
        let discretizer = Discretizer::new(&config)?;
        let mut profile = PillarProfile::new(SampleSections::rectangle(3.0, 1.0)?, &discretizer)?;
        approx_eq(profile.pillar_section_areas()?[1], 1.0, 1e-15);
        let bigger = SampleSections::rectangle(3.0, 2.0)?;
        let set = discretizer.discretize(&bigger)?;
        profile.set_geometry(bigger, set)?;
        approx_eq(profile.pillar_section_areas()?[1], 2.0, 1e-15);
        vec_approx_eq(&profile.pillar_strains, &[0.0, 0.0], 1e-15);
        Ok(())
    }
}
