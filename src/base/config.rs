use super::{CornerCorrection, Error, PillarType, CONFIG_MIN_TOL, DEFAULT_PILLAR_COUNT};
use crate::StrError;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fmt;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

/// Holds the configuration of the pillar model
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Number of pillars on the half cross-section
    pub pillar_count: usize,

    /// Partitioning policy of the half cross-section
    pub pillar_type: PillarType,

    /// Enables the pass-level spread correction reconciling pillar elongations
    pub elongation_correction: bool,

    /// Enables the corner-correction strain of pillars entering the roll gap
    pub corner_correction: bool,

    /// When the corner-correction strain is added
    pub corner_correction_policy: CornerCorrection,

    /// Maximum number of iterations of the spread-correction loop
    pub n_max_iterations: usize,

    /// Tolerance on the maximum relative change of the spread-correction coefficients
    pub tol_coefficients: f64,

    /// Maximum number of iterations of the nonlinear root finder (uniform-area pillars)
    pub solver_n_max_iterations: usize,

    /// Tolerance on the (scaled) residual of the nonlinear root finder
    pub solver_tol: f64,

    /// Prints the iterations of the spread-correction loop
    pub verbose: bool,
}

impl Config {
    /// Allocates a new instance with default values
    pub fn new() -> Self {
        Config {
            pillar_count: DEFAULT_PILLAR_COUNT,
            pillar_type: PillarType::Equidistant,
            elongation_correction: true,
            corner_correction: false,
            corner_correction_policy: CornerCorrection::EveryEntry,
            n_max_iterations: 200,
            tol_coefficients: 1e-6,
            solver_n_max_iterations: 100,
            solver_tol: 1e-8,
            verbose: false,
        }
    }

    /// Sets the number of pillars
    pub fn set_pillar_count(&mut self, value: usize) -> Result<&mut Self, StrError> {
        if value < 1 {
            return Err("pillar_count must be ≥ 1");
        }
        self.pillar_count = value;
        Ok(self)
    }

    /// Sets the partitioning policy
    pub fn set_pillar_type(&mut self, value: PillarType) -> Result<&mut Self, StrError> {
        self.pillar_type = value;
        Ok(self)
    }

    /// Enables or disables the spread correction
    pub fn set_elongation_correction(&mut self, flag: bool) -> Result<&mut Self, StrError> {
        self.elongation_correction = flag;
        Ok(self)
    }

    /// Enables or disables the corner correction
    pub fn set_corner_correction(&mut self, flag: bool) -> Result<&mut Self, StrError> {
        self.corner_correction = flag;
        Ok(self)
    }

    /// Sets the corner-correction policy
    ///
    /// **Note:** This function also enables the corner correction.
    pub fn set_corner_correction_policy(&mut self, policy: CornerCorrection) -> Result<&mut Self, StrError> {
        self.corner_correction = true;
        self.corner_correction_policy = policy;
        Ok(self)
    }

    /// Sets the budget and tolerance of the spread-correction loop
    pub fn set_correction_loop(&mut self, n_max_iterations: usize, tol: f64) -> Result<&mut Self, StrError> {
        if n_max_iterations < 1 {
            return Err("n_max_iterations must be ≥ 1");
        }
        if tol < CONFIG_MIN_TOL {
            return Err("tol_coefficients must be ≥ 1e-15");
        }
        self.n_max_iterations = n_max_iterations;
        self.tol_coefficients = tol;
        Ok(self)
    }

    /// Sets the budget and tolerance of the nonlinear root finder
    pub fn set_solver(&mut self, n_max_iterations: usize, tol: f64) -> Result<&mut Self, StrError> {
        if n_max_iterations < 1 {
            return Err("solver_n_max_iterations must be ≥ 1");
        }
        if tol < CONFIG_MIN_TOL {
            return Err("solver_tol must be ≥ 1e-15");
        }
        self.solver_n_max_iterations = n_max_iterations;
        self.solver_tol = tol;
        Ok(self)
    }

    /// Sets the verbose mode
    pub fn set_verbose(&mut self, flag: bool) -> Result<&mut Self, StrError> {
        self.verbose = flag;
        Ok(self)
    }

    /// Validates all data
    ///
    /// Returns a message with the inconsistent data, or returns None if everything is all right.
    pub fn validate(&self) -> Option<String> {
        if self.pillar_count < 1 {
            return Some(format!(
                "pillar_count = {:?} is incorrect; it must be ≥ 1",
                self.pillar_count
            ));
        }
        if self.n_max_iterations < 1 {
            return Some(format!(
                "n_max_iterations = {:?} is incorrect; it must be ≥ 1",
                self.n_max_iterations
            ));
        }
        if self.tol_coefficients < CONFIG_MIN_TOL {
            return Some(format!(
                "tol_coefficients = {:?} is incorrect; it must be ≥ {:e}",
                self.tol_coefficients, CONFIG_MIN_TOL
            ));
        }
        if self.solver_n_max_iterations < 1 {
            return Some(format!(
                "solver_n_max_iterations = {:?} is incorrect; it must be ≥ 1",
                self.solver_n_max_iterations
            ));
        }
        if self.solver_tol < CONFIG_MIN_TOL {
            return Some(format!(
                "solver_tol = {:?} is incorrect; it must be ≥ {:e}",
                self.solver_tol, CONFIG_MIN_TOL
            ));
        }
        None // all good
    }

    /// Reads a JSON file containing the configuration
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn read_json<P>(full_path: &P) -> Result<Self, Error>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        let file = File::open(&path)?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)?;
        if let Some(msg) = config.validate() {
            return Err(Error::Io(msg));
        }
        Ok(config)
    }

    /// Writes a JSON file with the configuration
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn write_json<P>(&self, full_path: &P) -> Result<(), Error>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        if let Some(p) = path.parent() {
            fs::create_dir_all(p)?;
        }
        let mut file = File::create(&path)?;
        serde_json::to_writer_pretty(&mut file, &self)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Configuration data\n")?;
        write!(f, "==================\n")?;
        write!(f, "pillar_count = {:?}\n", self.pillar_count)?;
        write!(f, "pillar_type = {:?}\n", self.pillar_type)?;
        write!(f, "elongation_correction = {:?}\n", self.elongation_correction)?;
        write!(f, "corner_correction = {:?}\n", self.corner_correction)?;
        write!(f, "corner_correction_policy = {:?}\n", self.corner_correction_policy)?;
        write!(f, "n_max_iterations = {:?}\n", self.n_max_iterations)?;
        write!(f, "tol_coefficients = {:?}\n", self.tol_coefficients)?;
        write!(f, "solver_n_max_iterations = {:?}\n", self.solver_n_max_iterations)?;
        write!(f, "solver_tol = {:?}\n", self.solver_tol)?;
        write!(f, "verbose = {:?}\n", self.verbose)?;
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
