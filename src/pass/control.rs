use crate::base::Config;
use crate::StrError;
use russell_lab::Vector;

/// Controls the convergence of the spread-correction loop
///
/// The loop converges when the maximum relative change of the correction coefficients
/// over one iteration drops below `Config::tol_coefficients`:
///
/// ```text
///                /  |cᵢ⁽ᵏ⁺¹⁾ - cᵢ⁽ᵏ⁾|  \
/// rel(Δc) = max  | ———————————————— |
///             i  \     |cᵢ⁽ᵏ⁾|       /
/// ```
pub struct CorrectionControl<'a> {
    config: &'a Config,
    iteration: usize,
    rel_change_prev: f64,
    rel_change: f64,
    mean_elongation: f64,
    converged: bool,
    diverging: bool,
}

impl<'a> CorrectionControl<'a> {
    /// Allocates a new instance
    pub fn new(config: &'a Config) -> Self {
        CorrectionControl {
            config,
            iteration: 0,
            rel_change_prev: 0.0,
            rel_change: 0.0,
            mean_elongation: 0.0,
            converged: false,
            diverging: false,
        }
    }

    /// Returns true if the coefficients have converged
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Returns the maximum relative change of the last iteration
    pub fn rel_change(&self) -> f64 {
        self.rel_change
    }

    /// Analyzes the change of the correction coefficients
    ///
    /// Returns an error if NaN or Inf values are found.
    pub fn analyze(
        &mut self,
        iteration: usize,
        previous: &Vector,
        current: &Vector,
        mean_elongation: f64,
    ) -> Result<(), StrError> {
        if previous.dim() != current.dim() {
            return Err("the number of coefficients must not change");
        }
        self.iteration = iteration;
        self.mean_elongation = mean_elongation;

        // maximum relative change
        let mut rel = 0.0;
        for i in 0..current.dim() {
            let den = f64::abs(previous[i]);
            let num = f64::abs(current[i] - previous[i]);
            rel = f64::max(rel, if den > 0.0 { num / den } else { num });
        }
        self.rel_change = rel;

        // check for NaN or Inf
        let found_nan_or_inf =
            current.as_data().iter().any(|c| !c.is_finite()) || !rel.is_finite() || !mean_elongation.is_finite();

        self.converged = if found_nan_or_inf {
            false
        } else {
            rel < self.config.tol_coefficients
        };
        self.diverging = if found_nan_or_inf || iteration == 0 {
            false
        } else {
            rel > self.rel_change_prev
        };
        self.rel_change_prev = rel;

        if found_nan_or_inf {
            Err("Found NaN or Inf in the correction coefficients")
        } else {
            Ok(())
        }
    }

    /// Prints the header of the iteration table
    pub fn print_header(&self) {
        if self.config.verbose {
            println!("\nPILLARSIM === SPREAD CORRECTION ===============================================");
            println!("\nLegend:");
            println!("✅ ─ converged");
            println!("🔹 ─ converging");
            println!("🎈 ─ diverging");
            println!("\"iter\" means iteration\n");
            println!("{}", "─".repeat(79));
            println!("{:>5} {:>11} ➖ {:>13}", "iter", "rel(Δc)", "mean(λ)");
            println!("{}", "─".repeat(79));
        }
    }

    /// Prints the information of the last analyzed iteration
    pub fn print_iteration(&self) {
        if self.config.verbose {
            let icon = if self.converged {
                "✅"
            } else if self.diverging {
                "🎈"
            } else {
                "🔹"
            };
            println!(
                "{:>5} {:>11.2e} {} {:>13.8}",
                self.iteration, self.rel_change, icon, self.mean_elongation
            );
        }
    }

    /// Prints the horizontal line at the end of the loop
    pub fn print_footer(&self) {
        if self.config.verbose {
            println!("{}", "─".repeat(79));
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
