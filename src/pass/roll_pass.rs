use super::{mean_elongation, pillar_contact_lengths, pillar_products, pillar_sums, CorrectionControl, DiskElement};
use crate::base::{new_entity_id, Attribute, Config, CornerCorrection, EntityId, Error, EvalCache, Evaluated};
use crate::base::SPREAD_CORRECTION_RELAXATION;
use crate::pillars::PillarProfile;
use crate::roll::{NoSpread, RollContour, SpreadLaw};
use crate::StrError;
use log::{debug, info, warn};
use russell_lab::{RootFinder, Vector};

/// Implements a roll pass divided into disk elements
///
/// The pass spans from the entry point (the most upstream position at which a pillar touches
/// the roll) to the roll axis at `x = 0`. Solving the pass repeats
///
/// 1. a forward sweep over all disk elements (the outbound profile of one element is the
///    inbound profile of the next one)
/// 2. the aggregation of the pillar quantities along the pass
/// 3. the relaxed update of the spread-correction coefficients
///
/// until the coefficients stabilize (if the elongation correction is enabled).
pub struct RollPass {
    /// Roll contour
    pub roll: Box<dyn RollContour>,

    /// Local spread law
    pub spread_law: Box<dyn SpreadLaw>,

    /// Nominal roll gap
    pub gap: f64,

    /// Rolling velocity
    pub velocity: f64,

    /// Number of disk elements
    pub disk_element_count: usize,

    /// Disk elements (available after solve)
    pub disk_elements: Vec<DiskElement>,

    id: EntityId,
    in_profile: Option<PillarProfile>,
    coefficients: Vector,
    entry_positions: Vec<Option<(f64, f64)>>,
    n_iterations: usize,
    cache: EvalCache,
}

impl RollPass {
    /// Allocates a new instance
    ///
    /// The spread law defaults to [NoSpread].
    pub fn new(roll: Box<dyn RollContour>, gap: f64, velocity: f64, disk_element_count: usize) -> Result<Self, StrError> {
        if gap <= 0.0 {
            return Err("gap must be > 0.0");
        }
        if velocity <= 0.0 {
            return Err("velocity must be > 0.0");
        }
        if disk_element_count < 1 {
            return Err("disk_element_count must be ≥ 1");
        }
        Ok(RollPass {
            roll,
            spread_law: Box::new(NoSpread),
            gap,
            velocity,
            disk_element_count,
            disk_elements: Vec::new(),
            id: new_entity_id(),
            in_profile: None,
            coefficients: Vector::new(0),
            entry_positions: Vec::new(),
            n_iterations: 0,
            cache: EvalCache::new(),
        })
    }

    /// Sets the spread law
    pub fn set_spread_law(&mut self, spread_law: Box<dyn SpreadLaw>) -> &mut Self {
        self.spread_law = spread_law;
        self
    }

    /// Returns the entity id used by the evaluation cache
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the evaluation cache
    pub fn cache(&self) -> &EvalCache {
        &self.cache
    }

    /// Returns the number of iterations of the last solve
    pub fn n_iterations(&self) -> usize {
        self.n_iterations
    }

    /// Returns the inbound profile (available after solve)
    pub fn in_profile(&self) -> Result<&PillarProfile, Error> {
        self.in_profile.as_ref().ok_or(Error::Input("the roll pass has not been solved yet"))
    }

    /// Returns the outbound profile (the outbound profile of the last disk element)
    pub fn out_profile(&self) -> Result<&PillarProfile, Error> {
        match self.disk_elements.last() {
            Some(element) => element.out_profile(),
            None => Err(Error::Input("the roll pass has not been solved yet")),
        }
    }

    /// Returns the number of pillars
    pub fn npillar(&self) -> usize {
        match &self.in_profile {
            Some(profile) => profile.npillar(),
            None => 0,
        }
    }

    /// Finds the entry point of the pass
    ///
    /// For each pillar touching the roll at `x = 0`, the position where the contour meets the
    /// top of the pillar is found by Brent's method on `[-max_radius, 0]`; the entry point is
    /// the most upstream one.
    pub fn entry_position(&self, profile: &PillarProfile) -> Result<f64, Error> {
        let set = profile.pillar_set();
        let x_min = -self.roll.max_radius();
        let solver = RootFinder::new();
        let mut x_entry = 0.0;
        let mut touching = false;
        for i in 0..set.npillar() {
            let z = set.pillars[i];
            let target = set.pillar_heights[i] / 2.0 - self.gap / 2.0;
            let f = |x: f64| self.roll.surface(x, z) - target;
            if f(0.0) >= 0.0 {
                continue;
            }
            touching = true;
            let x = if f(x_min) <= 0.0 {
                x_min
            } else {
                let (root, _) = solver.brent(x_min, 0.0, &mut 0, |x, _| Ok(f(x)))?;
                root
            };
            x_entry = f64::min(x_entry, x);
        }
        if !touching {
            return Err(Error::DegenerateGeometry(
                "the profile does not touch the rolls (the gap is too large)".to_string(),
            ));
        }
        Ok(x_entry)
    }

    /// Solves the roll pass
    pub fn solve(&mut self, in_profile: PillarProfile, config: &Config) -> Result<(), Error> {
        if let Some(message) = config.validate() {
            return Err(Error::InvalidConfig(message));
        }
        self.initialize(in_profile)?;
        info!(
            "roll pass {}: {} disk elements from x = {:.4} to x = 0",
            self.id,
            self.disk_element_count,
            self.disk_elements[0].x_in
        );

        if !config.elongation_correction {
            self.forward_sweep(config)?;
            self.n_iterations = 1;
            info!("roll pass {}: solved without spread correction", self.id);
            return Ok(());
        }

        let mut control = CorrectionControl::new(config);
        control.print_header();
        for iteration in 0..config.n_max_iterations {
            self.forward_sweep(config)?;
            self.n_iterations = iteration + 1;
            let previous = self.coefficients.clone();
            let updated = self.update_spread_correction()?;
            let mean = self.mean_elongation()?;
            control.analyze(iteration, &previous, &updated, mean)?;
            control.print_iteration();
            if control.converged() {
                control.print_footer();
                info!(
                    "roll pass {}: spread correction converged after {} iterations; mean elongation = {:.6}",
                    self.id, self.n_iterations, mean
                );
                return Ok(());
            }
        }
        control.print_footer();
        warn!(
            "roll pass {}: spread correction stopped after {} iterations; rel(Δc) = {:.3e}",
            self.id,
            config.n_max_iterations,
            control.rel_change()
        );
        Err(Error::Convergence(format!(
            "the spread correction did not converge after {} iterations; rel(Δc) = {:.3e}",
            config.n_max_iterations,
            control.rel_change()
        )))
    }

    /// Places the inbound profile at the entry point and allocates the disk elements
    fn initialize(&mut self, mut in_profile: PillarProfile) -> Result<(), Error> {
        let x_entry = self.entry_position(&in_profile)?;
        in_profile.x = x_entry;
        let count = self.disk_element_count;
        let dx = -x_entry / (count as f64);
        let mut elements = Vec::with_capacity(count);
        for i in 0..count {
            let x_in = x_entry + (i as f64) * dx;
            let x_out = if i == count - 1 { 0.0 } else { x_entry + ((i + 1) as f64) * dx };
            elements.push(DiskElement::new(i, x_in, x_out, in_profile.clone())?);
        }
        let n = in_profile.npillar();
        self.disk_elements = elements;
        self.coefficients = Vector::filled(n, 1.0);
        self.entry_positions = vec![None; n];
        self.in_profile = Some(in_profile);
        self.n_iterations = 0;
        self.cache.invalidate_entity(self.id);
        Ok(())
    }

    /// Runs the forming step of all disk elements in the rolling direction
    fn forward_sweep(&mut self, config: &Config) -> Result<(), Error> {
        let in_profile = match &self.in_profile {
            Some(profile) => profile.clone(),
            None => return Err(Error::Input("the roll pass has not been initialized")),
        };
        let n = in_profile.npillar();
        let coefficients = if config.elongation_correction {
            Some(self.pillar_spread_correction_coefficients())
        } else {
            None
        };
        let mut entry_positions: Vec<Option<(f64, f64)>> = vec![None; n];
        let mut inbound = in_profile;
        let mut previous_contact = vec![false; n];
        for element in self.disk_elements.iter_mut() {
            element.reset(inbound)?;
            element.form(&*self.roll, &*self.spread_law, self.gap, coefficients.as_ref())?;

            // local radii at the inbound centers of this element
            let centers = &element.in_profile().pillar_set().pillars;
            let mut radii = Vector::new(n);
            for i in 0..n {
                radii[i] = self.roll.local_radius(centers[i]);
            }

            // corner correction for pillars entering the roll gap
            let mut corner_strains = Vector::new(n);
            for i in 0..n {
                if !element.pillars_in_contact[i] || previous_contact[i] {
                    continue;
                }
                let first_entry = entry_positions[i].is_none();
                if first_entry {
                    entry_positions[i] = Some((element.x_in, radii[i]));
                }
                let apply = match config.corner_correction_policy {
                    CornerCorrection::EveryEntry => true,
                    CornerCorrection::FirstEntryOnly => first_entry,
                };
                if config.corner_correction && apply {
                    corner_strains[i] = corner_correction_strain(element.x_in, radii[i]);
                }
            }

            element.resolve_strain(&previous_contact, &corner_strains, &radii, self.velocity)?;
            previous_contact.copy_from_slice(&element.pillars_in_contact);
            inbound = element.out_profile()?.clone();
        }
        self.entry_positions = entry_positions;
        self.cache.invalidate_entity(self.id);
        debug!(
            "roll pass {}: forward sweep done; out width = {:.6}, out height = {:.6}",
            self.id,
            inbound.width(),
            inbound.height()
        );
        Ok(())
    }

    /// Returns the spread-correction coefficients used by the forming steps
    ///
    /// Returns ones if there are no disk elements yet or if the coefficients are being updated
    /// (reentrant request).
    pub fn pillar_spread_correction_coefficients(&self) -> Vector {
        let n = self.npillar();
        if self.disk_elements.is_empty() || self.coefficients.dim() != n {
            return Vector::filled(n, 1.0);
        }
        if self.cache.in_progress((self.id, Attribute::PillarSpreadCorrection)) {
            return Vector::filled(n, 1.0);
        }
        self.coefficients.clone()
    }

    /// Computes one relaxed update of the spread-correction coefficients
    ///
    /// ```text
    /// targetᵢ = 1 / (λ · Dᵢ · Sᵢ)
    /// cᵢ ← cᵢ + (cᵢ · targetᵢ - cᵢ) · relaxation / disk_element_count
    /// ```
    ///
    /// where `λ` is the mean elongation, `Dᵢ` the total draughts and `Sᵢ` the total spreads.
    ///
    /// Returns ones if there are no disk elements yet or if the update is already in
    /// progress (reentrant request). The stored coefficients are not modified.
    pub fn next_spread_correction(&self) -> Result<Vector, Error> {
        let n = self.npillar();
        if self.disk_elements.is_empty() || self.coefficients.dim() != n {
            return Ok(Vector::filled(n, 1.0));
        }
        let guard = match self.cache.guard((self.id, Attribute::PillarSpreadCorrection)) {
            Some(guard) => guard,
            None => return Ok(Vector::filled(n, 1.0)),
        };
        let mean = self.mean_elongation()?;
        let draughts = self.attribute(Attribute::TotalPillarDraughts)?;
        let spreads = self.attribute(Attribute::TotalPillarSpreads)?;
        let factor = SPREAD_CORRECTION_RELAXATION / (self.disk_element_count as f64);
        let mut updated = self.coefficients.clone();
        for i in 0..n {
            let target = 1.0 / (mean * draughts[i] * spreads[i]);
            updated[i] += (updated[i] * target - updated[i]) * factor;
        }
        drop(guard);
        Ok(updated)
    }

    /// Updates the spread-correction coefficients (see [RollPass::next_spread_correction])
    pub fn update_spread_correction(&mut self) -> Result<Vector, Error> {
        let updated = self.next_spread_correction()?;
        self.coefficients = updated.clone();
        self.cache.invalidate((self.id, Attribute::PillarSpreadCorrection));
        Ok(updated)
    }

    /// Returns a pass-level attribute (cached until the next forward sweep)
    pub fn attribute(&self, attribute: Attribute) -> Result<Vector, Error> {
        let key = (self.id, attribute);
        match self.cache.evaluate(key, || self.compute(attribute))? {
            Evaluated::Value(value) => Ok(value),
            Evaluated::Circular => Err(Error::Input("found a circular evaluation of a pass attribute")),
        }
    }

    fn compute(&self, attribute: Attribute) -> Result<Vector, Error> {
        let elements = &self.disk_elements;
        match attribute {
            Attribute::TotalPillarDraughts => pillar_products(elements, |e| &e.pillar_draughts),
            Attribute::TotalPillarSpreads => pillar_products(elements, |e| &e.pillar_spreads),
            Attribute::TotalPillarElongations => pillar_products(elements, |e| &e.pillar_elongations),
            Attribute::TotalPillarLogDraughts => pillar_sums(elements, |e| &e.pillar_log_draughts),
            Attribute::TotalPillarLogSpreads => pillar_sums(elements, |e| &e.pillar_log_spreads),
            Attribute::TotalPillarLogElongations => pillar_sums(elements, |e| &e.pillar_log_elongations),
            Attribute::TotalPillarStrains => pillar_sums(elements, |e| &e.pillar_strains),
            Attribute::TotalPillarStrainRates => pillar_sums(elements, |e| &e.pillar_strain_rates),
            Attribute::TotalPillarContactLengths => pillar_contact_lengths(elements),
            Attribute::PillarEntryAngles => self.compute_entry_angles(),
            Attribute::PillarSpreadCorrection => Ok(self.pillar_spread_correction_coefficients()),
        }
    }

    /// Returns the products of the pillar draughts along the pass
    pub fn total_pillar_draughts(&self) -> Result<Vector, Error> {
        self.attribute(Attribute::TotalPillarDraughts)
    }

    /// Returns the products of the pillar spreads along the pass
    pub fn total_pillar_spreads(&self) -> Result<Vector, Error> {
        self.attribute(Attribute::TotalPillarSpreads)
    }

    /// Returns the products of the pillar elongations along the pass
    pub fn total_pillar_elongations(&self) -> Result<Vector, Error> {
        self.attribute(Attribute::TotalPillarElongations)
    }

    /// Returns the sums of the pillar strain increments along the pass
    pub fn total_pillar_strains(&self) -> Result<Vector, Error> {
        self.attribute(Attribute::TotalPillarStrains)
    }

    /// Returns the sums of the pillar strain rates along the pass
    pub fn total_pillar_strain_rates(&self) -> Result<Vector, Error> {
        self.attribute(Attribute::TotalPillarStrainRates)
    }

    /// Returns the contact lengths of the pillars
    pub fn total_pillar_contact_lengths(&self) -> Result<Vector, Error> {
        self.attribute(Attribute::TotalPillarContactLengths)
    }

    /// Returns the entry angles of the pillars at their first entry (zero if never in contact)
    pub fn pillar_entry_angles(&self) -> Result<Vector, Error> {
        self.attribute(Attribute::PillarEntryAngles)
    }

    /// Returns the area-weighted harmonic mean of the total pillar elongations
    pub fn mean_elongation(&self) -> Result<f64, Error> {
        let out_areas = self.out_profile()?.pillar_set().pillar_areas();
        let elongations = self.total_pillar_elongations()?;
        mean_elongation(&out_areas, &elongations)
    }

    /// Returns the contact area of the pass with both rolls
    pub fn contact_area(&self) -> Result<f64, Error> {
        if self.disk_elements.is_empty() {
            return Err(Error::Input("the roll pass has not been solved yet"));
        }
        let mut area = 0.0;
        for element in &self.disk_elements {
            area += element.contact_area()?;
        }
        Ok(area)
    }

    /// Returns the corner-correction strains of the pillars
    ///
    /// Returns zeros if the corner correction is disabled.
    pub fn pillar_corner_correction_strains(&self, config: &Config) -> Result<Vector, Error> {
        let angles = self.pillar_entry_angles()?;
        let mut strains = Vector::new(angles.dim());
        if config.corner_correction {
            for i in 0..angles.dim() {
                strains[i] = corner_correction_from_angle(angles[i]);
            }
        }
        Ok(strains)
    }

    fn compute_entry_angles(&self) -> Result<Vector, Error> {
        let n = self.in_profile()?.npillar();
        let mut angles = Vector::new(n);
        for i in 0..n {
            if let Some(Some((x_entry, radius))) = self.entry_positions.get(i) {
                angles[i] = entry_angle(*x_entry, *radius)?;
            }
        }
        Ok(angles)
    }
}

/// Computes the angle between the roll surface and the rolling direction at the entry position
fn entry_angle(x_entry: f64, local_radius: f64) -> Result<f64, Error> {
    if !(local_radius > 0.0) {
        return Err(Error::DegenerateGeometry("the local roll radius is not positive".to_string()));
    }
    Ok(f64::asin(f64::max(-1.0, f64::min(1.0, x_entry / local_radius))))
}

/// Computes the shear strain of a pillar entering the roll gap at the given angle
fn corner_correction_from_angle(angle: f64) -> f64 {
    let t = f64::tan(angle);
    t * t / (2.0 * f64::sqrt(3.0))
}

fn corner_correction_strain(x_entry: f64, local_radius: f64) -> f64 {
    match entry_angle(x_entry, local_radius) {
        Ok(angle) => corner_correction_from_angle(angle),
        Err(_) => 0.0,
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
