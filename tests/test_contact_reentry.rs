use pillarsim::prelude::*;
use russell_lab::{approx_eq, vec_approx_eq};

// TEST GOAL
//
// This test verifies the corner correction of pillars that leave the roll contact and
// re-engage further downstream
//
// CONTOUR (piecewise linear in x, independent of z)
//
//   x         -10    -4    -3    -2    -1     0
//   surface    10   1.5   1.0  1.25   0.5  0.25
//
// The contour rises between x = -3 and x = -2; thus the pillars leave the contact in the
// second disk element and re-engage in the third one.
//
// CONFIGURATION AND PARAMETERS
//
// Box section 10 × 4; 3 equidistant pillars; gap 1
// 4 disk elements from x = -4 to x = 0 (element outlets at -3, -2, -1, 0)
// No spread; no spread correction

const GAP: f64 = 1.0;

/// Piecewise-linear contour independent of z
struct WavyRoll {
    knots: Vec<[f64; 2]>,
}

impl WavyRoll {
    fn new() -> Self {
        WavyRoll {
            knots: vec![
                [-10.0, 10.0],
                [-4.0, 1.5],
                [-3.0, 1.0],
                [-2.0, 1.25],
                [-1.0, 0.5],
                [0.0, 0.25],
            ],
        }
    }
}

impl RollContour for WavyRoll {
    fn surface(&self, x: f64, _z: f64) -> f64 {
        let n = self.knots.len();
        if x <= self.knots[0][0] {
            return self.knots[0][1];
        }
        for i in 1..n {
            let (a, b) = (self.knots[i - 1], self.knots[i]);
            if x <= b[0] {
                return a[1] + (x - a[0]) / (b[0] - a[0]) * (b[1] - a[1]);
            }
        }
        self.knots[n - 1][1]
    }

    fn max_radius(&self) -> f64 {
        10.0
    }
}

fn solve_pass(config: &Config) -> Result<RollPass, Error> {
    let discretizer = Discretizer::new(config)?;
    let profile = PillarProfile::new(SampleSections::rectangle(10.0, 4.0)?, &discretizer)?;
    let mut pass = RollPass::new(Box::new(WavyRoll::new()), GAP, 1.0, 4)?;
    pass.solve(profile, config)?;
    Ok(pass)
}

fn base_config() -> Result<Config, Error> {
    let mut config = Config::new();
    config.set_pillar_count(3)?.set_elongation_correction(false)?;
    Ok(config)
}

// shear strain of a pillar entering at x (local radius 10 - 0.25)
fn corner_strain(x: f64) -> f64 {
    let t = f64::tan(f64::asin(x / 9.75));
    t * t / (2.0 * f64::sqrt(3.0))
}

#[test]
fn test_contact_reentry_sequence() -> Result<(), Error> {
    let pass = solve_pass(&base_config()?)?;
    approx_eq(pass.disk_elements[0].x_in, -4.0, 1e-6);
    let contact: Vec<_> = pass.disk_elements.iter().map(|e| e.pillars_in_contact.clone()).collect();
    assert_eq!(contact[0], &[true, true, true]);
    assert_eq!(contact[1], &[false, false, false]);
    assert_eq!(contact[2], &[true, true, true]);
    assert_eq!(contact[3], &[true, true, true]);

    // the released pillars keep their height until the contour drops below it again
    let heights: Vec<_> = pass
        .disk_elements
        .iter()
        .map(|e| e.out_profile().map(|p| p.pillar_set().pillar_heights[1]))
        .collect::<Result<_, _>>()?;
    approx_eq(heights[0], 3.0, 1e-5);
    assert_eq!(heights[1], heights[0]);
    approx_eq(heights[2], 2.0, 1e-5);
    approx_eq(heights[3], 1.5, 1e-15);

    let dx = pass.disk_elements[0].length;
    vec_approx_eq(&pass.total_pillar_contact_lengths()?, &[3.0 * dx; 3], 1e-14);
    vec_approx_eq(&pass.disk_elements[1].pillar_strains, &[0.0; 3], 1e-15);
    Ok(())
}

#[test]
fn test_contact_reentry_corner_policies() -> Result<(), Error> {
    let mut config = base_config()?;
    let plain = solve_pass(&config)?;

    config.set_corner_correction(true)?;
    let every = solve_pass(&config)?;
    config.set_corner_correction_policy(CornerCorrection::FirstEntryOnly)?;
    let first = solve_pass(&config)?;

    let x_first = plain.disk_elements[0].x_in;
    let x_again = plain.disk_elements[2].x_in;
    approx_eq(x_again, -2.0, 1e-6);

    let s_plain = plain.total_pillar_strains()?;
    let s_every = every.total_pillar_strains()?;
    let s_first = first.total_pillar_strains()?;
    for i in 0..3 {
        // every entry adds one corner strain, at the inlet of the entering element
        approx_eq(s_every[i] - s_plain[i], corner_strain(x_first) + corner_strain(x_again), 1e-12);
        // only the first entry counts
        approx_eq(s_first[i] - s_plain[i], corner_strain(x_first), 1e-12);
    }

    // the re-entering element carries the second corner strain
    let e_plain = &plain.disk_elements[2].pillar_strains;
    let e_every = &every.disk_elements[2].pillar_strains;
    let e_first = &first.disk_elements[2].pillar_strains;
    approx_eq(e_every[0] - e_plain[0], corner_strain(x_again), 1e-12);
    approx_eq(e_first[0], e_plain[0], 1e-15);

    // entry angles refer to the first entry
    let angles = every.pillar_entry_angles()?;
    vec_approx_eq(&angles, &[f64::asin(x_first / 9.75); 3], 1e-14);
    let corner = first.pillar_corner_correction_strains(&config)?;
    vec_approx_eq(&corner, &[corner_strain(x_first); 3], 1e-14);
    Ok(())
}
