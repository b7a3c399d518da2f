use crate::base::{Error, GEOMETRY_ZERO_TOL};
use crate::geometry::reconstruct_cross_section;
use crate::pillars::{pillar_layout, PillarProfile, PillarSet};
use crate::roll::{RollContour, SpreadLaw};
use russell_lab::Vector;
use serde::{Deserialize, Serialize};

/// Defines the stages of the forming step of a disk element
///
/// The stages are visited in order once per forward sweep.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, Deserialize, Serialize)]
pub enum FormingStage {
    Unsolved,
    ContactEvaluated,
    HeightsResolved,
    SpreadResolved,
    StrainResolved,
}

/// Holds a thin longitudinal slice of a roll pass
///
/// ```text
///          x_in         x_out
///           |  length  |
///   ————————+——————————+————————→ x (rolling direction)
///       in_profile  out_profile
/// ```
///
/// All per-pillar arrays have the length of the inbound pillar set.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DiskElement {
    /// Position of the element within the pass
    pub index: usize,

    /// Longitudinal coordinate of the entry face
    pub x_in: f64,

    /// Longitudinal coordinate of the exit face
    pub x_out: f64,

    /// Extent along the rolling direction
    pub length: f64,

    /// Contact flags of the pillars
    pub pillars_in_contact: Vec<bool>,

    /// Ratios of outbound to inbound heights
    pub pillar_draughts: Vector,

    /// Ratios of outbound to inbound widths (corrected if the spread correction is active)
    pub pillar_spreads: Vector,

    /// Longitudinal extension factors `1 / (draught · spread)`
    pub pillar_elongations: Vector,

    pub pillar_log_draughts: Vector,
    pub pillar_log_spreads: Vector,
    pub pillar_log_elongations: Vector,

    /// Equivalent logarithmic strain increments
    pub pillar_strains: Vector,

    /// Equivalent strain rates
    pub pillar_strain_rates: Vector,

    /// Longitudinal velocities of the pillars
    pub pillar_velocities: Vector,

    /// Angles between the pillar tops and the rolling direction
    pub pillar_longitudinal_angles: Vector,

    /// Height derivatives along the rolling direction
    pub pillar_longitudinal_height_derivatives: Vector,

    stage: FormingStage,
    in_profile: PillarProfile,
    out_profile: Option<PillarProfile>,
    contour: Vector,
    out_heights: Vector,
}

impl DiskElement {
    /// Allocates a new instance
    pub fn new(index: usize, x_in: f64, x_out: f64, in_profile: PillarProfile) -> Result<Self, Error> {
        let length = x_out - x_in;
        if !(length > GEOMETRY_ZERO_TOL) {
            return Err(Error::DegenerateGeometry(format!(
                "the length of disk element {} must be positive; found {:?}",
                index, length
            )));
        }
        let n = in_profile.npillar();
        let mut element = DiskElement {
            index,
            x_in,
            x_out,
            length,
            pillars_in_contact: vec![false; n],
            pillar_draughts: Vector::new(n),
            pillar_spreads: Vector::new(n),
            pillar_elongations: Vector::new(n),
            pillar_log_draughts: Vector::new(n),
            pillar_log_spreads: Vector::new(n),
            pillar_log_elongations: Vector::new(n),
            pillar_strains: Vector::new(n),
            pillar_strain_rates: Vector::new(n),
            pillar_velocities: Vector::new(n),
            pillar_longitudinal_angles: Vector::new(n),
            pillar_longitudinal_height_derivatives: Vector::new(n),
            stage: FormingStage::Unsolved,
            in_profile,
            out_profile: None,
            contour: Vector::new(n),
            out_heights: Vector::new(n),
        };
        element.in_profile.x = x_in;
        Ok(element)
    }

    /// Replaces the inbound profile and restarts the forming step
    pub fn reset(&mut self, in_profile: PillarProfile) -> Result<(), Error> {
        if in_profile.npillar() != self.npillar() {
            return Err(Error::Input("the number of pillars must not change"));
        }
        self.in_profile = in_profile;
        self.in_profile.x = self.x_in;
        self.out_profile = None;
        self.stage = FormingStage::Unsolved;
        Ok(())
    }

    /// Returns the number of pillars
    pub fn npillar(&self) -> usize {
        self.pillars_in_contact.len()
    }

    /// Returns the current stage of the forming step
    pub fn stage(&self) -> FormingStage {
        self.stage
    }

    /// Returns the inbound profile
    pub fn in_profile(&self) -> &PillarProfile {
        &self.in_profile
    }

    /// Returns the outbound profile (available after the spread is resolved)
    pub fn out_profile(&self) -> Result<&PillarProfile, Error> {
        self.out_profile
            .as_ref()
            .ok_or(Error::Input("the outbound profile of the disk element is not resolved yet"))
    }

    /// Returns the outbound pillar heights (available after the heights are resolved)
    pub fn out_heights(&self) -> &Vector {
        &self.out_heights
    }

    /// Returns the mean velocity of the workpiece in this element (inbound velocity)
    pub fn velocity(&self) -> f64 {
        self.in_profile.velocity
    }

    fn require(&self, stage: FormingStage) -> Result<(), Error> {
        if self.stage != stage {
            return Err(Error::Input("the stages of the forming step must be run in order"));
        }
        Ok(())
    }

    /// Evaluates which pillars touch the roll at the exit face
    ///
    /// A pillar is in contact if half its inbound height exceeds the contour plus half the gap.
    pub fn evaluate_contact(&mut self, roll: &dyn RollContour, gap: f64) -> Result<(), Error> {
        self.require(FormingStage::Unsolved)?;
        let set = self.in_profile.pillar_set();
        self.contour = roll.surface_many(self.x_out, set.pillars.as_data());
        for i in 0..self.npillar() {
            self.pillars_in_contact[i] = set.pillar_heights[i] / 2.0 > self.contour[i] + gap / 2.0;
        }
        self.stage = FormingStage::ContactEvaluated;
        Ok(())
    }

    /// Computes the outbound heights, draughts and longitudinal angles
    pub fn resolve_heights(&mut self, gap: f64) -> Result<(), Error> {
        self.require(FormingStage::ContactEvaluated)?;
        let in_heights = &self.in_profile.pillar_set().pillar_heights;
        for i in 0..self.npillar() {
            let h_in = in_heights[i];
            if h_in <= GEOMETRY_ZERO_TOL {
                return Err(Error::DegenerateGeometry(format!(
                    "the inbound height of pillar {} in disk element {} is zero",
                    i, self.index
                )));
            }
            let h_out = if self.pillars_in_contact[i] {
                2.0 * self.contour[i] + gap
            } else {
                h_in
            };
            if h_out <= GEOMETRY_ZERO_TOL {
                return Err(Error::DegenerateGeometry(format!(
                    "the outbound height of pillar {} in disk element {} is not positive",
                    i, self.index
                )));
            }
            self.out_heights[i] = h_out;
            self.pillar_draughts[i] = h_out / h_in;
            self.pillar_log_draughts[i] = f64::ln(self.pillar_draughts[i]);
            self.pillar_longitudinal_height_derivatives[i] = (h_out - h_in) / self.length;
            self.pillar_longitudinal_angles[i] = f64::atan2((h_out - h_in) / 2.0, self.length);
        }
        self.stage = FormingStage::HeightsResolved;
        Ok(())
    }

    /// Computes the spreads, elongations and the outbound profile
    ///
    /// The spreads returned by the spread law are multiplied by the correction coefficients, if any.
    pub fn resolve_spread(&mut self, spread_law: &dyn SpreadLaw, coefficients: Option<&Vector>) -> Result<(), Error> {
        self.require(FormingStage::HeightsResolved)?;
        let n = self.npillar();
        let mut spreads = spread_law.pillar_spreads(self)?;
        if spreads.dim() != n {
            return Err(Error::Input("the spread law must return one value per pillar"));
        }
        if let Some(cc) = coefficients {
            if cc.dim() != n {
                return Err(Error::Input("the number of correction coefficients must equal the number of pillars"));
            }
            for i in 0..n {
                spreads[i] *= cc[i];
            }
        }
        if let Some(i) = spreads.as_data().iter().position(|s| !(*s > 0.0) || !s.is_finite()) {
            return Err(Error::DegenerateGeometry(format!(
                "the spread of pillar {} in disk element {} is invalid ({:?})",
                i, self.index, spreads[i]
            )));
        }
        let v_in = self.in_profile.velocity;
        let in_widths = &self.in_profile.pillar_set().pillar_widths;
        let mut out_widths = Vector::new(n);
        for i in 0..n {
            self.pillar_elongations[i] = 1.0 / (self.pillar_draughts[i] * spreads[i]);
            self.pillar_log_spreads[i] = f64::ln(spreads[i]);
            self.pillar_log_elongations[i] = f64::ln(self.pillar_elongations[i]);
            self.pillar_velocities[i] = v_in * self.pillar_elongations[i];
            out_widths[i] = in_widths[i] * spreads[i];
        }
        self.pillar_spreads = spreads;

        // outbound geometry
        let (pillars, boundaries) = pillar_layout(&out_widths);
        let section = reconstruct_cross_section(pillars.as_data(), self.out_heights.as_data(), boundaries[n])?;
        let set = PillarSet::with_heights(&section, pillars, boundaries, self.out_heights.clone())?;
        let area_out = section.area();
        let velocity = v_in * self.in_profile.area() / area_out;
        let mut out_profile = PillarProfile::from_parts(self.x_out, section, set, velocity);
        out_profile.pillar_strains = self.in_profile.pillar_strains.clone();
        self.out_profile = Some(out_profile);
        self.stage = FormingStage::SpreadResolved;
        Ok(())
    }

    /// Computes the strain increments and strain rates and accumulates the outbound strains
    ///
    /// # Input
    ///
    /// * `previous_contact` -- contact flags of the upstream element (all false for the first element)
    /// * `corner_strains` -- strains added to pillars changing from non-contact to contact
    /// * `local_radii` -- local roll radii at the pillars
    /// * `pass_velocity` -- velocity of the roll pass
    pub fn resolve_strain(
        &mut self,
        previous_contact: &[bool],
        corner_strains: &Vector,
        local_radii: &Vector,
        pass_velocity: f64,
    ) -> Result<(), Error> {
        self.require(FormingStage::SpreadResolved)?;
        let n = self.npillar();
        if previous_contact.len() != n || corner_strains.dim() != n || local_radii.dim() != n {
            return Err(Error::Input("the strain data must have one value per pillar"));
        }
        for i in 0..n {
            let (le, ls, ld) = (
                self.pillar_log_elongations[i],
                self.pillar_log_spreads[i],
                self.pillar_log_draughts[i],
            );
            let mut strain = f64::sqrt(2.0 / 3.0 * (le * le + ls * ls + ld * ld));
            if self.pillars_in_contact[i] && !previous_contact[i] {
                strain += corner_strains[i];
            }
            if !(local_radii[i] > 0.0) {
                return Err(Error::DegenerateGeometry(format!(
                    "the local roll radius at pillar {} is not positive",
                    i
                )));
            }
            self.pillar_strains[i] = strain;
            self.pillar_strain_rates[i] = pass_velocity * strain / local_radii[i];
        }
        let in_strains = &self.in_profile.pillar_strains;
        if let Some(out_profile) = self.out_profile.as_mut() {
            for i in 0..n {
                out_profile.pillar_strains[i] = in_strains[i] + self.pillar_strains[i];
            }
        }
        self.stage = FormingStage::StrainResolved;
        Ok(())
    }

    /// Runs all stages of the forming step
    pub fn form(
        &mut self,
        roll: &dyn RollContour,
        spread_law: &dyn SpreadLaw,
        gap: f64,
        coefficients: Option<&Vector>,
    ) -> Result<(), Error> {
        self.evaluate_contact(roll, gap)?;
        self.resolve_heights(gap)?;
        self.resolve_spread(spread_law, coefficients)
    }

    /// Returns the contact area of the element with both rolls
    ///
    /// The mirrored centerline pillar counts half.
    pub fn contact_area(&self) -> Result<f64, Error> {
        let in_widths = &self.in_profile.pillar_set().pillar_widths;
        let out_widths = &self.out_profile()?.pillar_set().pillar_widths;
        let mut width = 0.0;
        for i in 0..self.npillar() {
            if self.pillars_in_contact[i] {
                let w = in_widths[i] + out_widths[i];
                width += if i == 0 { w / 2.0 } else { w };
            }
        }
        Ok(width * self.length * 2.0)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
